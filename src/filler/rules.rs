//! Business rules.
//!
//! A rule turns one semantic data key into a coordinated set of field writes,
//! usually a pair of mutually exclusive checkboxes. Rules run after the key pass
//! and may overwrite what it wrote.
//!
//! Each rule addresses its fields through lists of literal name variants. The
//! first variant present in the document wins; exact names are tried before
//! names that only match after label normalization.

use super::ConsumedFields;
use crate::catalog::{LabelledCheckbox, ListingNames, PepNames};
use crate::form::FormDocument;
use crate::names::normalize_label;
use crate::value::{parse_truthy, FormData, FormValue};
use std::fmt;
use std::slice;

const INDUSTRY: &str = "industry";
const IS_LISTED: &str = "isListed";
const STOCK_EXCHANGE: &str = "stockExchange";
const HAS_PEP: &str = "hasPep";
const PEP_ROLE: &str = "pepRole";
const HAS_BENEFICIAL_OWNERS: &str = "hasBeneficialOwners";
const BENEFICIAL_OWNERS: &str = "beneficialOwners";

/// A semantic key → coordinated field writes mapping.
pub trait BusinessRule: Send + Sync + fmt::Debug {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Data keys this rule owns. The key pass leaves them alone.
    fn data_keys(&self) -> &'static [&'static str];

    /// Apply the rule; returns the number of fields written.
    ///
    /// Missing fields and setter failures are logged, never raised.
    fn apply(
        &self,
        doc: &mut dyn FormDocument,
        data: &FormData,
        consumed: &mut ConsumedFields,
    ) -> usize;
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// First name variant present in `doc`.
pub(crate) fn locate(doc: &dyn FormDocument, variants: &[String]) -> Option<String> {
    if let Some(hit) = variants.iter().find(|v| doc.has_field(v)) {
        if variants.first() != Some(hit) {
            log::info!("Using field variant '{}'", hit);
        }
        return Some(hit.clone());
    }
    let names = doc.field_names();
    for variant in variants {
        let wanted = normalize_label(variant);
        if let Some(hit) = names.iter().find(|n| normalize_label(n) == wanted) {
            log::info!("Field variant '{}' matched '{}' after normalization", variant, hit);
            return Some(hit.clone());
        }
    }
    None
}

fn write_box(
    doc: &mut dyn FormDocument,
    name: &str,
    checked: bool,
    consumed: &mut ConsumedFields,
    rule: &str,
) -> usize {
    match doc.set_checkbox(name, checked) {
        Ok(()) => {
            consumed.claim(name);
            1
        },
        Err(e) => {
            log::warn!("Rule '{}': {}", rule, e);
            0
        },
    }
}

fn set_box(
    doc: &mut dyn FormDocument,
    variants: &[String],
    checked: bool,
    consumed: &mut ConsumedFields,
    rule: &str,
) -> usize {
    match locate(doc, variants) {
        Some(name) => write_box(doc, &name, checked, consumed, rule),
        None => {
            log::warn!("Rule '{}': none of {:?} is present", rule, variants);
            0
        },
    }
}

/// Check `on`, uncheck `off`.
fn set_exclusive(
    doc: &mut dyn FormDocument,
    on: &[String],
    off: &[String],
    consumed: &mut ConsumedFields,
    rule: &str,
) -> usize {
    set_box(doc, on, true, consumed, rule) + set_box(doc, off, false, consumed, rule)
}

fn set_text(
    doc: &mut dyn FormDocument,
    variants: &[String],
    text: &str,
    consumed: &mut ConsumedFields,
    rule: &str,
) -> usize {
    let Some(name) = locate(doc, variants) else {
        log::warn!("Rule '{}': none of {:?} is present", rule, variants);
        return 0;
    };
    match doc.set_text(&name, text) {
        Ok(()) => {
            consumed.claim(&name);
            1
        },
        Err(e) => {
            log::warn!("Rule '{}': {}", rule, e);
            0
        },
    }
}

fn text_of(data: &FormData, key: &str) -> Option<String> {
    data.get(key)
        .filter(|v| !v.is_blank())
        .and_then(FormValue::render_text)
}

#[derive(Debug, Clone)]
struct Labelled {
    labels: Vec<String>,
    fields: Vec<String>,
}

impl Labelled {
    fn new(labels: &[&str], fields: &[&str]) -> Self {
        Self {
            labels: owned(labels),
            fields: owned(fields),
        }
    }

    fn from_catalog(entry: &LabelledCheckbox) -> Self {
        Self::new(entry.labels, entry.fields)
    }

    fn matches(&self, wanted: &str) -> bool {
        self.labels
            .iter()
            .chain(self.fields.iter())
            .any(|l| normalize_label(l) == wanted)
    }
}

/// Checks the one checkbox that matches the `industry` label.
///
/// Other industry checkboxes are not touched.
#[derive(Debug, Clone, Default)]
pub struct IndustryRule {
    industries: Vec<Labelled>,
}

impl IndustryRule {
    /// Rule without industries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Industry table of a variant catalog.
    pub fn from_catalog(industries: &[LabelledCheckbox]) -> Self {
        Self {
            industries: industries.iter().map(Labelled::from_catalog).collect(),
        }
    }

    /// Add an industry: accepted input labels and the checkbox name variants.
    pub fn with_industry(mut self, labels: &[&str], fields: &[&str]) -> Self {
        self.industries.push(Labelled::new(labels, fields));
        self
    }
}

impl BusinessRule for IndustryRule {
    fn name(&self) -> &'static str {
        "industry"
    }

    fn data_keys(&self) -> &'static [&'static str] {
        &[INDUSTRY]
    }

    fn apply(
        &self,
        doc: &mut dyn FormDocument,
        data: &FormData,
        consumed: &mut ConsumedFields,
    ) -> usize {
        let Some(label) = text_of(data, INDUSTRY) else {
            return 0;
        };
        let wanted = normalize_label(&label);
        match self.industries.iter().find(|i| i.matches(&wanted)) {
            Some(industry) => set_box(doc, &industry.fields, true, consumed, self.name()),
            None => {
                log::warn!("Unknown industry '{}'", label);
                0
            },
        }
    }
}

/// Listed/unlisted branching for stock corporations.
///
/// Listed: "listed" and "owner identification not needed" are checked, their
/// counterparts unchecked, and the named exchange (or "other" plus its free
/// text) is marked. Unlisted: the reverse pair states; exchanges are left alone.
#[derive(Debug, Clone)]
pub struct ListingRule {
    listed: Vec<String>,
    not_listed: Vec<String>,
    no_processing: Vec<String>,
    processing: Vec<String>,
    exchanges: Vec<Labelled>,
    other_exchange: Vec<String>,
    other_exchange_text: Vec<String>,
}

impl ListingRule {
    /// Rule for the given listed / not-listed checkbox variants.
    pub fn new(listed: &[&str], not_listed: &[&str]) -> Self {
        Self {
            listed: owned(listed),
            not_listed: owned(not_listed),
            no_processing: Vec::new(),
            processing: Vec::new(),
            exchanges: Vec::new(),
            other_exchange: Vec::new(),
            other_exchange_text: Vec::new(),
        }
    }

    /// Rule from a variant catalog.
    pub fn from_names(names: &ListingNames) -> Self {
        Self {
            listed: owned(names.listed),
            not_listed: owned(names.not_listed),
            no_processing: owned(names.no_processing),
            processing: owned(names.processing),
            exchanges: names.exchanges.iter().map(Labelled::from_catalog).collect(),
            other_exchange: owned(names.other_exchange),
            other_exchange_text: owned(names.other_exchange_text),
        }
    }

    /// Add the owner-identification checkbox pair.
    pub fn with_processing(mut self, not_needed: &[&str], needed: &[&str]) -> Self {
        self.no_processing = owned(not_needed);
        self.processing = owned(needed);
        self
    }

    /// Add a named exchange checkbox.
    pub fn with_exchange(mut self, labels: &[&str], fields: &[&str]) -> Self {
        self.exchanges.push(Labelled::new(labels, fields));
        self
    }

    /// Add the "other exchange" checkbox and its free-text field.
    pub fn with_other_exchange(mut self, checkbox: &[&str], text: &[&str]) -> Self {
        self.other_exchange = owned(checkbox);
        self.other_exchange_text = owned(text);
        self
    }

    fn mark_exchange(
        &self,
        doc: &mut dyn FormDocument,
        exchange: &str,
        consumed: &mut ConsumedFields,
    ) -> usize {
        let wanted = normalize_label(exchange);
        if let Some(known) = self.exchanges.iter().find(|e| e.matches(&wanted)) {
            return set_box(doc, &known.fields, true, consumed, self.name());
        }
        if self.other_exchange.is_empty() {
            log::warn!("Unknown exchange '{}' and no 'other' field", exchange);
            return 0;
        }
        set_box(doc, &self.other_exchange, true, consumed, self.name())
            + set_text(doc, &self.other_exchange_text, exchange, consumed, self.name())
    }
}

impl BusinessRule for ListingRule {
    fn name(&self) -> &'static str {
        "listing"
    }

    fn data_keys(&self) -> &'static [&'static str] {
        &[IS_LISTED, STOCK_EXCHANGE]
    }

    fn apply(
        &self,
        doc: &mut dyn FormDocument,
        data: &FormData,
        consumed: &mut ConsumedFields,
    ) -> usize {
        let Some(listed) = data.get(IS_LISTED).and_then(parse_truthy) else {
            return 0;
        };
        let rule = self.name();
        let has_processing = !self.processing.is_empty() || !self.no_processing.is_empty();

        if !listed {
            let mut written = set_exclusive(doc, &self.not_listed, &self.listed, consumed, rule);
            if has_processing {
                written += set_exclusive(doc, &self.processing, &self.no_processing, consumed, rule);
            }
            return written;
        }

        let mut written = set_exclusive(doc, &self.listed, &self.not_listed, consumed, rule);
        if has_processing {
            written += set_exclusive(doc, &self.no_processing, &self.processing, consumed, rule);
        }
        if let Some(exchange) = text_of(data, STOCK_EXCHANGE) {
            written += self.mark_exchange(doc, &exchange, consumed);
        }
        written
    }
}

/// Politically exposed person declaration.
///
/// `hasPep` decides which of the yes/no checkboxes is checked; the other one is
/// explicitly unchecked. With `hasPep` true, `pepRole` goes into the role field.
#[derive(Debug, Clone)]
pub struct PepRule {
    yes: Vec<String>,
    no: Vec<String>,
    role: Vec<String>,
}

impl PepRule {
    /// Rule for the given yes / no checkbox variants.
    pub fn new(yes: &[&str], no: &[&str]) -> Self {
        Self {
            yes: owned(yes),
            no: owned(no),
            role: Vec::new(),
        }
    }

    /// Rule from a variant catalog.
    pub fn from_names(names: &PepNames) -> Self {
        Self::new(names.yes, names.no).with_role(names.role)
    }

    /// Text field variants receiving the office held.
    pub fn with_role(mut self, role: &[&str]) -> Self {
        self.role = owned(role);
        self
    }
}

impl BusinessRule for PepRule {
    fn name(&self) -> &'static str {
        "pep"
    }

    fn data_keys(&self) -> &'static [&'static str] {
        &[HAS_PEP, PEP_ROLE]
    }

    fn apply(
        &self,
        doc: &mut dyn FormDocument,
        data: &FormData,
        consumed: &mut ConsumedFields,
    ) -> usize {
        let Some(is_pep) = data.get(HAS_PEP).and_then(parse_truthy) else {
            return 0;
        };
        if !is_pep {
            return set_exclusive(doc, &self.no, &self.yes, consumed, self.name());
        }
        let mut written = set_exclusive(doc, &self.yes, &self.no, consumed, self.name());
        if let Some(role) = text_of(data, PEP_ROLE).filter(|_| !self.role.is_empty()) {
            written += set_text(doc, &self.role, &role, consumed, self.name());
        }
        written
    }
}

/// Beneficial ownership declaration: exactly one of "no natural person holds
/// more than 25 %" and "the persons listed below hold more than 25 %" is checked.
///
/// Templates carry one of several historical name pairs; the first pair whose
/// two fields are both present is used. Owners are taken as present when
/// `hasBeneficialOwners` is truthy, or, without that flag, when
/// `beneficialOwners` is non-empty.
#[derive(Debug, Clone)]
pub struct BeneficialOwnershipRule {
    pairs: Vec<(String, String)>,
}

impl BeneficialOwnershipRule {
    /// Rule over (no-person, listed-persons) name pairs, in priority order.
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            pairs: pairs
                .iter()
                .map(|(none, listed)| (none.to_string(), listed.to_string()))
                .collect(),
        }
    }
}

impl BusinessRule for BeneficialOwnershipRule {
    fn name(&self) -> &'static str {
        "beneficial-ownership"
    }

    fn data_keys(&self) -> &'static [&'static str] {
        &[HAS_BENEFICIAL_OWNERS]
    }

    fn apply(
        &self,
        doc: &mut dyn FormDocument,
        data: &FormData,
        consumed: &mut ConsumedFields,
    ) -> usize {
        let has_owners = match data.get(HAS_BENEFICIAL_OWNERS).and_then(parse_truthy) {
            Some(flag) => flag,
            None => data.get(BENEFICIAL_OWNERS).is_some_and(|v| !v.is_blank()),
        };

        for (none, listed) in &self.pairs {
            let none = locate(doc, slice::from_ref(none));
            let listed = locate(doc, slice::from_ref(listed));
            let (Some(none), Some(listed)) = (none, listed) else {
                continue;
            };
            let (on, off) = if has_owners {
                (listed, none)
            } else {
                (none, listed)
            };
            return write_box(doc, &on, true, consumed, self.name())
                + write_box(doc, &off, false, consumed, self.name());
        }
        log::warn!("No beneficial ownership declaration pair in this template");
        0
    }
}
