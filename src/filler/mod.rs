//! Form filling.
//!
//! A [`FormFiller`] projects a [`FormData`] map onto a [`FormDocument`]:
//!
//! ```text
//! for each (key, value):
//!     reserved by a rule?     → skip, the rule handles it
//!     exact field name?       → typed setter
//!     fallback layer enabled? → equivalents → positional group → fuzzy name
//! then every business rule, in order
//! ```
//!
//! Individual field failures are logged and skipped. Only a fill that writes
//! nothing at all is an error.

mod fallback;
pub mod rules;

pub use fallback::Fallback;
pub use rules::{
    BeneficialOwnershipRule, BusinessRule, IndustryRule, ListingRule, PepRule,
};

use crate::catalog::DocumentVariant;
use crate::config::FillConfig;
use crate::error::{Error, Result};
use crate::form::{FormDocument, Kind};
use crate::resolver::TypeResolver;
use crate::value::{parse_truthy, FormData, FormValue};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Outcome of a successful fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Field writes that succeeded, rule writes included
    pub filled: usize,
    /// Data keys that matched no field
    pub unmatched: usize,
    /// Data keys with blank values, left alone
    pub skipped: usize,
}

/// Fields already written during one fill pass.
///
/// Threaded through every resolution step and every rule so that no two keys
/// claim the same field.
#[derive(Debug, Clone, Default)]
pub struct ConsumedFields {
    names: HashSet<String>,
}

impl ConsumedFields {
    /// Mark a field as written.
    pub fn claim(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    /// Whether a field was already written.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of claimed fields.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing was claimed yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedField {
    pub(crate) kind: Kind,
    pub(crate) authoritative: bool,
    /// The document exposes a native kind for this field
    pub(crate) typed: bool,
}

/// Field name → resolved kind, built once per fill.
pub(crate) type FieldIndex = IndexMap<String, ResolvedField>;

/// Fills one form document from a data map.
#[derive(Debug)]
pub struct FormFiller {
    variant: DocumentVariant,
    resolver: TypeResolver,
    fallback: Option<Fallback>,
    rules: Vec<Box<dyn BusinessRule>>,
}

impl FormFiller {
    /// Filler without fallback layer or rules.
    pub fn new(variant: DocumentVariant, resolver: TypeResolver) -> Self {
        Self {
            variant,
            resolver,
            fallback: None,
            rules: Vec::new(),
        }
    }

    /// Exact-name filler for arbitrary templates.
    pub fn generic() -> Self {
        Self::new(DocumentVariant::Generic, TypeResolver::default())
    }

    /// Filler for a known variant, assembled from its field catalog.
    pub fn for_variant(variant: DocumentVariant, config: &FillConfig) -> Self {
        let mut filler = Self::new(variant, TypeResolver::new(config.resolution));
        if variant == DocumentVariant::Generic {
            return filler;
        }
        let catalog = variant.catalog();
        filler.fallback =
            Some(Fallback::from_catalog(catalog).with_min_fuzzy_len(config.min_fuzzy_len));
        if !catalog.industries.is_empty() {
            filler = filler.with_rule(IndustryRule::from_catalog(catalog.industries));
        }
        if let Some(listing) = &catalog.listing {
            filler = filler.with_rule(ListingRule::from_names(listing));
        }
        if let Some(pep) = &catalog.pep {
            filler = filler.with_rule(PepRule::from_names(pep));
        }
        if !catalog.ownership_pairs.is_empty() {
            filler = filler.with_rule(BeneficialOwnershipRule::new(catalog.ownership_pairs));
        }
        filler
    }

    /// Enable the name-resolution fallback layer.
    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Append a business rule. Rules run in insertion order after the key pass.
    pub fn with_rule(mut self, rule: impl BusinessRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Variant this filler was built for.
    pub fn variant(&self) -> DocumentVariant {
        self.variant
    }

    /// Names of the active rules, in order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Fill `doc` from `data`.
    ///
    /// Fails with [`Error::NoFieldsFilled`] when not a single field was written.
    pub fn fill(&self, doc: &mut dyn FormDocument, data: &FormData) -> Result<FillReport> {
        let index = self.index(doc);
        let reserved: HashSet<&str> = self
            .rules
            .iter()
            .flat_map(|r| r.data_keys().iter().copied())
            .collect();

        let mut consumed = ConsumedFields::default();
        let mut report = FillReport::default();

        for (key, value) in data {
            if reserved.contains(key.as_str()) {
                continue;
            }
            if value.is_blank() {
                report.skipped += 1;
                continue;
            }
            match self.fill_key(doc, &index, key, value, &mut consumed) {
                0 => {
                    log::debug!("No field for data key '{}'", key);
                    report.unmatched += 1;
                },
                n => report.filled += n,
            }
        }

        for rule in &self.rules {
            let written = rule.apply(doc, data, &mut consumed);
            log::debug!("Rule '{}' wrote {} fields", rule.name(), written);
            report.filled += written;
        }

        if report.filled == 0 {
            return Err(Error::NoFieldsFilled {
                attempted: data.len(),
            });
        }
        log::info!(
            "Filled {} fields ({} keys unmatched, {} blank) for variant {}",
            report.filled,
            report.unmatched,
            report.skipped,
            self.variant
        );
        Ok(report)
    }

    fn index(&self, doc: &dyn FormDocument) -> FieldIndex {
        doc.field_names()
            .into_iter()
            .map(|name| {
                let native = doc.native_kind(&name);
                let resolved = ResolvedField {
                    kind: self.resolver.resolve(&name, native, self.variant),
                    authoritative: self.resolver.is_authoritative(native),
                    typed: native.is_some(),
                };
                (name, resolved)
            })
            .collect()
    }

    fn fill_key(
        &self,
        doc: &mut dyn FormDocument,
        index: &FieldIndex,
        key: &str,
        value: &FormValue,
        consumed: &mut ConsumedFields,
    ) -> usize {
        if consumed.contains(key) {
            log::info!("Field '{}' was already filled by an earlier key, keeping it", key);
            return 0;
        }
        let exact = index.contains_key(key) && self.write(doc, index, key, value, consumed);
        match &self.fallback {
            Some(fallback) => {
                usize::from(exact) + fallback.fill_key(self, doc, index, key, value, exact, consumed)
            },
            None => usize::from(exact),
        }
    }

    /// Write one field through its typed setter; `true` if the field was written.
    pub(crate) fn write(
        &self,
        doc: &mut dyn FormDocument,
        index: &FieldIndex,
        name: &str,
        value: &FormValue,
        consumed: &mut ConsumedFields,
    ) -> bool {
        let Some(field) = index.get(name) else {
            return false;
        };
        let fallback_setters = self.fallback.as_ref().is_some_and(Fallback::tries_setters);
        let result = match field.kind {
            Kind::Unknown if fallback_setters => try_setters(doc, name, value),
            kind => match write_typed(doc, name, kind, value) {
                Err(e) if fallback_setters && !field.authoritative => {
                    log::debug!(
                        "Guessed {} setter failed for '{}' ({}), trying other setters",
                        kind,
                        name,
                        e
                    );
                    try_setters(doc, name, value)
                },
                // A guessed checkbox on an untyped field may still be a text slot.
                Ok(false) if fallback_setters && !field.typed => {
                    log::debug!(
                        "Guessed {} for '{}' did not take the value, trying other setters",
                        kind,
                        name
                    );
                    try_setters(doc, name, value)
                },
                other => other,
            },
        };
        match result {
            Ok(true) => {
                consumed.claim(name);
                true
            },
            Ok(false) => false,
            Err(e) => {
                log::warn!("Skipping field '{}': {}", name, e);
                false
            },
        }
    }
}

fn render(name: &str, value: &FormValue) -> Result<String> {
    value.render_text().ok_or_else(|| Error::UnparsableValue {
        name: name.to_string(),
        reason: "value has no text form".to_string(),
    })
}

/// Dispatch on the resolved kind. `Ok(false)` means the value was deliberately not written.
pub(crate) fn write_typed(
    doc: &mut dyn FormDocument,
    name: &str,
    kind: Kind,
    value: &FormValue,
) -> Result<bool> {
    match kind {
        Kind::Text => doc.set_text(name, &render(name, value)?).map(|_| true),
        Kind::Checkbox => match parse_truthy(value) {
            Some(checked) => doc.set_checkbox(name, checked).map(|_| true),
            None => {
                log::debug!("Value for checkbox '{}' is not a boolean, leaving it", name);
                Ok(false)
            },
        },
        Kind::Radio => doc.select_radio(name, &render(name, value)?).map(|_| true),
        Kind::Dropdown => doc.select_dropdown(name, &render(name, value)?).map(|_| true),
        Kind::Unknown => Err(Error::FieldTypeMismatch {
            name: name.to_string(),
            expected: "a fillable kind".to_string(),
            found: Kind::Unknown.to_string(),
        }),
    }
}

type Setter = fn(&mut dyn FormDocument, &str, &str) -> Result<()>;

/// Try setters in order until one accepts the value:
/// checkbox, text, untyped value, radio.
pub(crate) fn try_setters(
    doc: &mut dyn FormDocument,
    name: &str,
    value: &FormValue,
) -> Result<bool> {
    let mut last_error = None;
    if let Some(checked) = parse_truthy(value) {
        match doc.set_checkbox(name, checked) {
            Ok(()) => return Ok(true),
            Err(e) => last_error = Some(e),
        }
    }
    let text = render(name, value)?;
    let setters: [(&str, Setter); 3] = [
        ("text", |d: &mut dyn FormDocument, n: &str, v: &str| d.set_text(n, v)),
        ("value", |d: &mut dyn FormDocument, n: &str, v: &str| d.set_value(n, v)),
        ("radio", |d: &mut dyn FormDocument, n: &str, v: &str| d.select_radio(n, v)),
    ];
    for (label, setter) in setters {
        match setter(doc, name, &text) {
            Ok(()) => {
                log::debug!("Wrote '{}' with the {} setter", name, label);
                return Ok(true);
            },
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| Error::FieldNotFound(name.to_string())))
}
