//! Field-type resolution.
//!
//! The authoritative source of a field's kind is the document structure (/FT, /Ff).
//! Some templates do not carry usable type information, and some runtimes cannot
//! introspect it; for those the resolver falls back to name heuristics. The
//! heuristic path is self-contained in [`heuristic_kind`] and can be skipped
//! entirely when structural typing is always available.

use crate::catalog::DocumentVariant;
use crate::form::Kind;
use crate::names::normalize;
use serde::{Deserialize, Serialize};

/// Keywords that mark a checkbox when they appear as a whole word.
///
/// Short English words such as "no" or "on" are left out: they appear in text
/// labels ("Ausweis No", "Based on").
const CHECKBOX_WORDS: &[&str] = &["ja", "nein", "yes"];

/// Keywords that mark a checkbox anywhere in the name.
const CHECKBOX_SUBSTRINGS: &[&str] = &["check", "kontrollk", "ankreuz"];

/// Substrings that mark a dropdown.
const DROPDOWN_SUBSTRINGS: &[&str] = &["dropdown", "combo", "auswahlliste", "select"];

/// How field kinds are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStrategy {
    /// Use the document's native kind; heuristics only for untyped fields
    #[default]
    Structural,
    /// Ignore native kinds and resolve from names alone
    Heuristic,
}

/// Decides which setter a field gets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeResolver {
    strategy: ResolutionStrategy,
}

impl TypeResolver {
    /// Create a resolver with the given strategy.
    pub fn new(strategy: ResolutionStrategy) -> Self {
        Self { strategy }
    }

    /// Active strategy.
    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    /// Resolve the kind of a field.
    pub fn resolve(&self, name: &str, native: Option<Kind>, variant: DocumentVariant) -> Kind {
        match (self.strategy, native) {
            (ResolutionStrategy::Structural, Some(kind)) => kind,
            _ => heuristic_kind(name, variant),
        }
    }

    /// Whether [`resolve`](Self::resolve) trusts the native kind for this field.
    ///
    /// A non-authoritative kind is a guess; if its setter fails the filler tries
    /// the other setters.
    pub fn is_authoritative(&self, native: Option<Kind>) -> bool {
        self.strategy == ResolutionStrategy::Structural && native.is_some()
    }
}

/// Name-based kind guess.
///
/// Order: the variant's own checkbox and text lists, generic checkbox keywords,
/// dropdown markers; everything else is text.
pub fn heuristic_kind(name: &str, variant: DocumentVariant) -> Kind {
    let catalog = variant.catalog();
    if catalog.is_known_checkbox(name) {
        return Kind::Checkbox;
    }
    if catalog.is_known_text(name) {
        return Kind::Text;
    }
    let lowered = normalize(name);
    let is_checkbox_word = lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| CHECKBOX_WORDS.contains(&word));
    if is_checkbox_word || CHECKBOX_SUBSTRINGS.iter().any(|k| lowered.contains(k)) {
        return Kind::Checkbox;
    }
    if DROPDOWN_SUBSTRINGS.iter().any(|k| lowered.contains(k)) {
        return Kind::Dropdown;
    }
    Kind::Text
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_native_kind_is_authoritative() {
        let resolver = TypeResolver::default();
        assert_eq!(
            resolver.resolve("Ja", Some(Kind::Text), DocumentVariant::Generic),
            Kind::Text
        );
        assert_eq!(
            resolver.resolve("Land", Some(Kind::Dropdown), DocumentVariant::Generic),
            Kind::Dropdown
        );
        assert!(resolver.is_authoritative(Some(Kind::Radio)));
        assert!(!resolver.is_authoritative(None));
    }

    #[test]
    fn test_heuristic_strategy_ignores_native_kind() {
        let resolver = TypeResolver::new(ResolutionStrategy::Heuristic);
        assert_eq!(
            resolver.resolve("Nein", Some(Kind::Text), DocumentVariant::Generic),
            Kind::Checkbox
        );
        assert!(!resolver.is_authoritative(Some(Kind::Text)));
    }

    #[test]
    fn test_checkbox_keywords() {
        for name in ["Ja", "PEP Nein", "Ja_2", "yes", "Checkbox 4", "Bitte ankreuzen"] {
            assert_eq!(heuristic_kind(name, DocumentVariant::Generic), Kind::Checkbox, "{name}");
        }
    }

    #[test]
    fn test_short_keywords_need_whole_words() {
        assert_eq!(heuristic_kind("Jahresumsatz", DocumentVariant::Generic), Kind::Text);
        assert_eq!(heuristic_kind("Registernummer", DocumentVariant::Generic), Kind::Text);
        assert_eq!(heuristic_kind("Ort Datum", DocumentVariant::Generic), Kind::Text);
        assert_eq!(heuristic_kind("Ausweis No", DocumentVariant::Generic), Kind::Text);
        assert_eq!(heuristic_kind("Based on", DocumentVariant::Generic), Kind::Text);
    }

    #[test]
    fn test_variant_checkbox_list() {
        assert_eq!(heuristic_kind("Baugewerbe", DocumentVariant::Generic), Kind::Text);
        assert_eq!(
            heuristic_kind("Baugewerbe", DocumentVariant::KycStockCorporation),
            Kind::Checkbox
        );
        assert_eq!(
            heuristic_kind("Börse  München", DocumentVariant::KycStockCorporation),
            Kind::Checkbox
        );
    }

    #[test]
    fn test_variant_text_list_wins_over_markers() {
        assert_eq!(
            heuristic_kind("Ausgeübtes Amt bzw. Funktion", DocumentVariant::KycSoleProprietor),
            Kind::Text
        );
        assert_eq!(heuristic_kind("Land", DocumentVariant::KycStockCorporation), Kind::Text);
    }

    #[test]
    fn test_dropdown_markers() {
        assert_eq!(heuristic_kind("Land Dropdown", DocumentVariant::Generic), Kind::Dropdown);
        assert_eq!(heuristic_kind("Rechtsform_Combo", DocumentVariant::Generic), Kind::Dropdown);
    }

    fn any_kind() -> impl Strategy<Value = Option<Kind>> {
        prop_oneof![
            Just(None),
            Just(Some(Kind::Text)),
            Just(Some(Kind::Checkbox)),
            Just(Some(Kind::Radio)),
            Just(Some(Kind::Dropdown)),
            Just(Some(Kind::Unknown)),
        ]
    }

    proptest! {
        #[test]
        fn prop_resolution_is_idempotent(
            name in "[A-Za-zäöüß _0-9.]{0,40}",
            native in any_kind(),
            heuristic in proptest::bool::ANY,
        ) {
            let strategy = if heuristic { ResolutionStrategy::Heuristic } else { ResolutionStrategy::Structural };
            let resolver = TypeResolver::new(strategy);
            for variant in DocumentVariant::ALL {
                let first = resolver.resolve(&name, native, variant);
                let second = resolver.resolve(&name, native, variant);
                prop_assert_eq!(first, second);
            }
        }
    }
}
