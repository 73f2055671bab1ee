//! Name-resolution fallback for templates whose field names drift between
//! revisions.
//!
//! For a data key that did not land on an exact field name, strategies are tried
//! in order until one writes something:
//!
//! 1. **Equivalents** - literal names registered for the same slot. All present
//!    copies are written, since one data point may appear several times in a form.
//! 2. **Positional group** (list values) - fields sharing a name fragment, ordered
//!    by their numeric suffix, receive the list items in order.
//! 3. **Fuzzy name** (scalar values) - normalized containment in either direction,
//!    restricted to fields whose kind can take the value.
//!
//! Every field written here is claimed in [`ConsumedFields`] and never reused by a
//! later key.

use super::{ConsumedFields, FieldIndex, FormFiller};
use crate::catalog::{GroupSpec, VariantCatalog};
use crate::config::DEFAULT_MIN_FUZZY_LEN;
use crate::form::{FormDocument, Kind};
use crate::names::{fuzzy_contains, normalize, numeric_suffix};
use crate::value::{parse_truthy, FormValue};

/// Fallback layer configuration.
#[derive(Debug, Clone)]
pub struct Fallback {
    equivalents: Vec<(&'static str, &'static [&'static str])>,
    groups: Vec<GroupSpec>,
    min_fuzzy_len: usize,
    fuzzy: bool,
    try_setters: bool,
}

impl Default for Fallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Fallback {
    /// Empty tables; fuzzy matching and setter fallback enabled.
    pub fn new() -> Self {
        Self {
            equivalents: Vec::new(),
            groups: Vec::new(),
            min_fuzzy_len: DEFAULT_MIN_FUZZY_LEN,
            fuzzy: true,
            try_setters: true,
        }
    }

    /// Tables of a variant catalog.
    pub fn from_catalog(catalog: &'static VariantCatalog) -> Self {
        Self {
            equivalents: catalog.equivalents.to_vec(),
            groups: catalog.groups.to_vec(),
            ..Self::new()
        }
    }

    /// Register literal names for a canonical key.
    pub fn with_equivalents(mut self, key: &'static str, names: &'static [&'static str]) -> Self {
        self.equivalents.push((key, names));
        self
    }

    /// Register a repeated block.
    pub fn with_group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    /// Minimum length of the contained side of a fuzzy match.
    pub fn with_min_fuzzy_len(mut self, len: usize) -> Self {
        self.min_fuzzy_len = len;
        self
    }

    /// Enable or disable fuzzy name matching.
    pub fn with_fuzzy(mut self, enabled: bool) -> Self {
        self.fuzzy = enabled;
        self
    }

    /// Enable or disable trying every setter on fields of unknown or guessed kind.
    pub fn with_setter_fallback(mut self, enabled: bool) -> Self {
        self.try_setters = enabled;
        self
    }

    pub(crate) fn tries_setters(&self) -> bool {
        self.try_setters
    }

    /// Literal names of the equivalence class `key` belongs to, either as the
    /// canonical key or as one of the literals.
    fn class_of(&self, key: &str) -> &[&'static str] {
        self.equivalents
            .iter()
            .find(|(canonical, names)| *canonical == key || names.contains(&key))
            .map(|(_, names)| *names)
            .unwrap_or(&[])
    }

    /// Resolve `key` beyond its exact name. Returns the number of fields written.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn fill_key(
        &self,
        filler: &FormFiller,
        doc: &mut dyn FormDocument,
        index: &FieldIndex,
        key: &str,
        value: &FormValue,
        exact: bool,
        consumed: &mut ConsumedFields,
    ) -> usize {
        let mut written = 0;
        for literal in self.class_of(key) {
            if *literal == key || !index.contains_key(*literal) || consumed.contains(literal) {
                continue;
            }
            if filler.write(doc, index, literal, value, consumed) {
                log::info!("Data key '{}' matched equivalent field '{}'", key, literal);
                written += 1;
            }
        }
        if exact || written > 0 {
            return written;
        }

        match value {
            FormValue::List(items) => self.fill_groups(filler, doc, index, key, items, consumed),
            _ if self.fuzzy => self.fill_fuzzy(filler, doc, index, key, value, consumed),
            _ => 0,
        }
    }

    fn fill_groups(
        &self,
        filler: &FormFiller,
        doc: &mut dyn FormDocument,
        index: &FieldIndex,
        key: &str,
        items: &[FormValue],
        consumed: &mut ConsumedFields,
    ) -> usize {
        let mut written = 0;
        for group in self.groups.iter().filter(|g| g.data_key == key) {
            let slots = group_slots(index, group.fragment, consumed);
            let values: Vec<Option<&FormValue>> = items
                .iter()
                .map(|item| match (group.attribute, item) {
                    (Some(attr), FormValue::Record(record)) => record.get(attr),
                    (None, FormValue::Record(_) | FormValue::List(_)) => None,
                    (None, scalar) => Some(scalar),
                    (Some(_), _) => None,
                })
                .collect();
            if values.iter().all(Option::is_none) {
                continue;
            }
            if slots.len() < items.len() {
                log::warn!(
                    "'{}' has {} entries but only {} free '{}' fields; the rest is dropped",
                    key,
                    items.len(),
                    slots.len(),
                    group.fragment
                );
            }
            for (slot, value) in slots.iter().zip(values) {
                let Some(value) = value.filter(|v| !v.is_blank()) else {
                    continue;
                };
                if filler.write(doc, index, slot, value, consumed) {
                    written += 1;
                }
            }
        }
        written
    }

    fn fill_fuzzy(
        &self,
        filler: &FormFiller,
        doc: &mut dyn FormDocument,
        index: &FieldIndex,
        key: &str,
        value: &FormValue,
        consumed: &mut ConsumedFields,
    ) -> usize {
        let wanted = normalize(key);
        let mut candidates: Vec<(bool, usize, usize, &str)> = index
            .iter()
            .enumerate()
            .filter(|(_, (name, field))| {
                !consumed.contains(name)
                    && accepts(field.kind, value)
                    && fuzzy_contains(key, name, self.min_fuzzy_len)
            })
            .map(|(position, (name, _))| {
                let normalized = normalize(name);
                let distance = normalized.chars().count().abs_diff(wanted.chars().count());
                (normalized != wanted, distance, position, name.as_str())
            })
            .collect();
        candidates.sort();

        for (_, _, _, name) in candidates {
            if filler.write(doc, index, name, value, consumed) {
                log::info!("Data key '{}' matched field '{}' by name similarity", key, name);
                return 1;
            }
        }
        0
    }
}

/// Unclaimed fields of a repeated block in suffix order. Unsuffixed fields
/// count as the first copy.
fn group_slots(index: &FieldIndex, fragment: &str, consumed: &ConsumedFields) -> Vec<String> {
    let fragment = normalize(fragment);
    let mut slots: Vec<&String> = index
        .keys()
        .filter(|name| !consumed.contains(name) && normalize(name).contains(&fragment))
        .collect();
    slots.sort_by_key(|name| numeric_suffix(name));
    slots.into_iter().cloned().collect()
}

/// Whether a field of `kind` can take `value`.
fn accepts(kind: Kind, value: &FormValue) -> bool {
    match (kind, value) {
        (Kind::Unknown, _) => true,
        (Kind::Checkbox, v) => parse_truthy(v).is_some(),
        (Kind::Radio, _) => true,
        (Kind::Text | Kind::Dropdown, FormValue::Bool(_)) => false,
        (Kind::Text | Kind::Dropdown, _) => true,
    }
}
