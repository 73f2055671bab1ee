//! Field catalog: what each known form variant looks like.
//!
//! The literal names below are the union of every template revision seen in
//! production. Several entries differ only by doubled spaces, truncation or a
//! trailing ellipsis; not all of them are still live. They are kept as the input
//! corpus for name resolution, and the filler logs which literal actually matched.

use crate::error::{Error, Result};
use crate::names::normalize_label;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which filler and rule layer a template gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentVariant {
    /// Any fillable PDF; exact field names only
    #[default]
    Generic,
    /// GwG documentation form for stock corporations (Dokumentationsbogen AG)
    KycStockCorporation,
    /// GwG documentation form for sole proprietors and freelancers
    KycSoleProprietor,
}

impl DocumentVariant {
    /// All variants.
    pub const ALL: [DocumentVariant; 3] = [
        DocumentVariant::Generic,
        DocumentVariant::KycStockCorporation,
        DocumentVariant::KycSoleProprietor,
    ];

    /// Stable identifier, also used in storage paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentVariant::Generic => "generic",
            DocumentVariant::KycStockCorporation => "kyc-stock-corporation",
            DocumentVariant::KycSoleProprietor => "kyc-sole-proprietor",
        }
    }

    /// Legacy adapter: guess the variant from a template path.
    ///
    /// Older callers only sent a template locator. New callers name the variant
    /// explicitly and never reach this.
    pub fn infer_from_locator(locator: &str) -> DocumentVariant {
        let lowered = locator.to_lowercase();
        if !lowered.contains("dokumentationsbogen") {
            return DocumentVariant::Generic;
        }
        if ["einzel", "freiberuf"].iter().any(|k| lowered.contains(k)) {
            DocumentVariant::KycSoleProprietor
        } else {
            DocumentVariant::KycStockCorporation
        }
    }

    /// Field catalog of this variant.
    pub fn catalog(&self) -> &'static VariantCatalog {
        match self {
            DocumentVariant::Generic => &GENERIC,
            DocumentVariant::KycStockCorporation => &STOCK_CORPORATION,
            DocumentVariant::KycSoleProprietor => &SOLE_PROPRIETOR,
        }
    }
}

impl fmt::Display for DocumentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DocumentVariant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidRequest(format!("unknown document variant '{}'", s)))
    }
}

/// A repeated block of fields filled from a list value.
///
/// For a list of strings the group with `attribute: None` applies; for a list of
/// records each group picks one record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    /// Data map key holding the list
    pub data_key: &'static str,
    /// Record attribute, or `None` for plain string lists
    pub attribute: Option<&'static str>,
    /// Name fragment shared by every field of the block
    pub fragment: &'static str,
}

/// Checkbox chosen by a label (industry, stock exchange).
#[derive(Debug, Clone, Copy)]
pub struct LabelledCheckbox {
    /// Accepted input labels
    pub labels: &'static [&'static str],
    /// Literal field name variants
    pub fields: &'static [&'static str],
}

/// Field names used by the listed/unlisted rule.
#[derive(Debug, Clone, Copy)]
pub struct ListingNames {
    /// "is listed" checkbox
    pub listed: &'static [&'static str],
    /// "is not listed" checkbox
    pub not_listed: &'static [&'static str],
    /// Beneficial owner identification not needed (listed companies)
    pub no_processing: &'static [&'static str],
    /// Beneficial owner identification needed
    pub processing: &'static [&'static str],
    /// Exchanges with their own checkbox
    pub exchanges: &'static [LabelledCheckbox],
    /// "other exchange" checkbox
    pub other_exchange: &'static [&'static str],
    /// Free text naming the other exchange
    pub other_exchange_text: &'static [&'static str],
}

/// Field names used by the politically-exposed-person rule.
#[derive(Debug, Clone, Copy)]
pub struct PepNames {
    /// "is a PEP" checkbox
    pub yes: &'static [&'static str],
    /// "is not a PEP" checkbox
    pub no: &'static [&'static str],
    /// Free text describing the office
    pub role: &'static [&'static str],
}

/// Everything known about one form variant.
#[derive(Debug)]
pub struct VariantCatalog {
    /// Plain text fields
    pub text_fields: &'static [&'static str],
    /// Plain checkboxes
    pub checkbox_fields: &'static [&'static str],
    /// Checkboxes driven by business rules
    pub special_fields: &'static [&'static str],
    /// Canonical key → literal names of the same slot
    pub equivalents: &'static [(&'static str, &'static [&'static str])],
    /// Repeated blocks
    pub groups: &'static [GroupSpec],
    /// Industry label → checkbox
    pub industries: &'static [LabelledCheckbox],
    /// Listed/unlisted rule, if the form has one
    pub listing: Option<ListingNames>,
    /// PEP rule, if the form has one
    pub pep: Option<PepNames>,
    /// Beneficial ownership declaration pairs (no-person, listed-persons), newest revision first
    pub ownership_pairs: &'static [(&'static str, &'static str)],
}

impl VariantCatalog {
    /// Whether a field name is one of this form's checkboxes, tolerating authoring artifacts.
    pub fn is_known_checkbox(&self, name: &str) -> bool {
        let wanted = normalize_label(name);
        self.checkbox_fields
            .iter()
            .chain(self.special_fields.iter())
            .any(|f| normalize_label(f) == wanted)
    }

    /// Whether a field name is one of this form's text fields, tolerating authoring artifacts.
    pub fn is_known_text(&self, name: &str) -> bool {
        let wanted = normalize_label(name);
        self.text_fields.iter().any(|f| normalize_label(f) == wanted)
    }
}

static GENERIC: VariantCatalog = VariantCatalog {
    text_fields: &[],
    checkbox_fields: &[],
    special_fields: &[],
    equivalents: &[],
    groups: &[],
    industries: &[],
    listing: None,
    pep: None,
    ownership_pairs: &[],
};

const INDUSTRIES: &[LabelledCheckbox] = &[
    LabelledCheckbox {
        labels: &["Baugewerbe", "Bau", "construction"],
        fields: &["Baugewerbe"],
    },
    LabelledCheckbox {
        labels: &["Handel", "Groß- und Einzelhandel", "trade", "retail"],
        fields: &["Handel", "Groß- und Einzelhandel"],
    },
    LabelledCheckbox {
        labels: &["Immobilien", "Immobilienwirtschaft", "real-estate", "real estate"],
        fields: &["Immobilien", "Immobilienwirtschaft"],
    },
    LabelledCheckbox {
        labels: &["Finanzdienstleistungen", "Finanzen", "financial-services", "finance"],
        fields: &[
            "Finanzdienstleistungen",
            "Finanz- und Versicherungsdienstleistungen",
        ],
    },
    LabelledCheckbox {
        labels: &["IT", "Informationstechnologie", "IT und Telekommunikation", "technology"],
        fields: &["IT und Telekommunikation", "Information und Kommunikation"],
    },
    LabelledCheckbox {
        labels: &["Gastgewerbe", "Gastronomie", "hospitality"],
        fields: &["Gastgewerbe", "Gastronomie"],
    },
    LabelledCheckbox {
        labels: &["Produzierendes Gewerbe", "Industrie", "manufacturing"],
        fields: &["Produzierendes Gewerbe", "Verarbeitendes Gewerbe"],
    },
    LabelledCheckbox {
        labels: &["Gesundheitswesen", "Gesundheit", "healthcare"],
        fields: &["Gesundheitswesen", "Gesundheits- und Sozialwesen"],
    },
    LabelledCheckbox {
        labels: &["Beratung", "Freiberufliche Dienstleistungen", "consulting"],
        fields: &[
            "Freiberufliche Dienstleistungen",
            "Freiberufliche wissenschaftliche und technische Dienstleistungen",
        ],
    },
    LabelledCheckbox {
        labels: &["Sonstige", "Sonstiges", "other"],
        fields: &["Sonstige Branche", "Sonstiges"],
    },
];

const INDUSTRY_FIELDS: &[&str] = &[
    "Baugewerbe",
    "Handel",
    "Groß- und Einzelhandel",
    "Immobilien",
    "Immobilienwirtschaft",
    "Finanzdienstleistungen",
    "Finanz- und Versicherungsdienstleistungen",
    "IT und Telekommunikation",
    "Information und Kommunikation",
    "Gastgewerbe",
    "Gastronomie",
    "Produzierendes Gewerbe",
    "Verarbeitendes Gewerbe",
    "Gesundheitswesen",
    "Gesundheits- und Sozialwesen",
    "Freiberufliche Dienstleistungen",
    "Freiberufliche wissenschaftliche und technische Dienstleistungen",
    "Sonstige Branche",
    "Sonstiges",
];

const EXCHANGES: &[LabelledCheckbox] = &[
    LabelledCheckbox {
        labels: &["Frankfurt", "Frankfurter Wertpapierbörse", "FWB", "Xetra"],
        fields: &["Frankfurter Wertpapierbörse", "Börse Frankfurt"],
    },
    LabelledCheckbox {
        labels: &["Stuttgart", "Börse Stuttgart"],
        fields: &["Börse Stuttgart"],
    },
    LabelledCheckbox {
        labels: &["München", "Muenchen", "Munich", "Börse München"],
        fields: &["Börse München"],
    },
    LabelledCheckbox {
        labels: &["Düsseldorf", "Duesseldorf", "Börse Düsseldorf"],
        fields: &["Börse Düsseldorf"],
    },
    LabelledCheckbox {
        labels: &["Hamburg", "Börse Hamburg", "Hamburg-Hannover"],
        fields: &["Börse Hamburg", "Börsen Hamburg-Hannover"],
    },
    LabelledCheckbox {
        labels: &["Berlin", "Börse Berlin"],
        fields: &["Börse Berlin"],
    },
];

static STOCK_CORPORATION: VariantCatalog = VariantCatalog {
    text_fields: &[
        "Firma",
        "Firma  der Gesellschaft",
        "Rechtsform",
        "Sitz der Gesellschaft",
        "Registergericht",
        "Registernummer",
        "Handelsregisternummer",
        "Straße Hausnummer",
        "Straße  Hausnummer",
        "PLZ Ort",
        "PLZ  Ort",
        "Land",
        "Steuernummer",
        "LEI",
        "Name Vertreter",
        "Name Vertreter_2",
        "Name Vertreter_3",
        "Name Vertreter_4",
        "Funktion Vertreter",
        "Funktion Vertreter_2",
        "Funktion Vertreter_3",
        "Funktion Vertreter_4",
        "Geburtsdatum Vertreter",
        "Geburtsdatum Vertreter_2",
        "Geburtsdatum Vertreter_3",
        "Geburtsdatum Vertreter_4",
        "Name wirtschaftlich Berechtigter",
        "Name wirtschaftlich Berechtigter_2",
        "Name wirtschaftlich Berechtigter_3",
        "Name wirtschaftlich Berechtigter_4",
        "Geburtsdatum wirtschaftlich Berechtigter",
        "Geburtsdatum wirtschaftlich Berechtigter_2",
        "Geburtsdatum wirtschaftlich Berechtigter_3",
        "Geburtsdatum wirtschaftlich Berechtigter_4",
        "Anteil in Prozent",
        "Anteil in Prozent_2",
        "Anteil in Prozent_3",
        "Anteil in Prozent_4",
        "Name der sonstigen Börse",
        "Name der sonstigen Börse...",
        "Ausgeübtes Amt bzw. Funktion",
        "Ausgeübtes Amt bzw  Funktion",
        "Ort Datum",
    ],
    checkbox_fields: &[
        "Handelsregisterauszug liegt vor",
        "Transparenzregisterauszug liegt vor",
        "Gesellschafterliste liegt vor",
    ],
    special_fields: &[
        "Baugewerbe",
        "Handel",
        "Groß- und Einzelhandel",
        "Immobilien",
        "Immobilienwirtschaft",
        "Finanzdienstleistungen",
        "Finanz- und Versicherungsdienstleistungen",
        "IT und Telekommunikation",
        "Information und Kommunikation",
        "Gastgewerbe",
        "Gastronomie",
        "Produzierendes Gewerbe",
        "Verarbeitendes Gewerbe",
        "Gesundheitswesen",
        "Gesundheits- und Sozialwesen",
        "Freiberufliche Dienstleistungen",
        "Freiberufliche wissenschaftliche und technische Dienstleistungen",
        "Sonstige Branche",
        "Sonstiges",
        "Die Gesellschaft ist börsennotiert",
        "börsennotiert",
        "Die Gesellschaft ist nicht börsennotiert",
        "nicht börsennotiert",
        "Ermittlung wirtschaftlich Berechtigter entfällt",
        "Ermittlung wirtschaftlich Berechtigter erforderlich",
        "Frankfurter Wertpapierbörse",
        "Börse Frankfurt",
        "Börse Stuttgart",
        "Börse München",
        "Börse Düsseldorf",
        "Börse Hamburg",
        "Börsen Hamburg-Hannover",
        "Börse Berlin",
        "Sonstige Börse",
        "PEP Ja",
        "PEP Nein",
        "Keine natürliche Person hält mehr als 25 %",
        "Die nachstehend aufgeführten Personen halten mehr als 25 %",
        "Keine natürliche Person hält mehr als 25  %",
        "Die nachstehend aufgeführten Personen halten mehr als 25  %",
        "Keine natürliche Person hält unmittelbar oder mittelbar mehr als 25 % der Kapitalanteile...",
        "Folgende natürliche Personen halten unmittelbar oder mittelbar mehr als 25 % der...",
    ],
    equivalents: &[
        (
            "companyName",
            &[
                "Firma",
                "Firma  der Gesellschaft",
                "Firma der Gesellschaft",
                "Name der Gesellschaft",
            ],
        ),
        ("legalForm", &["Rechtsform"]),
        ("registeredOffice", &["Sitz der Gesellschaft", "Sitz"]),
        ("registerCourt", &["Registergericht", "Amtsgericht"]),
        (
            "registerNumber",
            &["Registernummer", "Handelsregisternummer", "HRB"],
        ),
        (
            "street",
            &["Straße Hausnummer", "Straße  Hausnummer", "Anschrift Straße"],
        ),
        ("postalCodeCity", &["PLZ Ort", "PLZ  Ort"]),
        ("country", &["Land", "Staat"]),
        ("taxNumber", &["Steuernummer"]),
        ("lei", &["LEI", "Legal Entity Identifier LEI"]),
        ("placeDate", &["Ort Datum", "Ort, Datum"]),
    ],
    groups: &[
        GroupSpec {
            data_key: "representatives",
            attribute: None,
            fragment: "Name Vertreter",
        },
        GroupSpec {
            data_key: "representatives",
            attribute: Some("name"),
            fragment: "Name Vertreter",
        },
        GroupSpec {
            data_key: "representatives",
            attribute: Some("role"),
            fragment: "Funktion Vertreter",
        },
        GroupSpec {
            data_key: "representatives",
            attribute: Some("birthDate"),
            fragment: "Geburtsdatum Vertreter",
        },
        GroupSpec {
            data_key: "beneficialOwners",
            attribute: None,
            fragment: "Name wirtschaftlich Berechtigter",
        },
        GroupSpec {
            data_key: "beneficialOwners",
            attribute: Some("name"),
            fragment: "Name wirtschaftlich Berechtigter",
        },
        GroupSpec {
            data_key: "beneficialOwners",
            attribute: Some("birthDate"),
            fragment: "Geburtsdatum wirtschaftlich Berechtigter",
        },
        GroupSpec {
            data_key: "beneficialOwners",
            attribute: Some("share"),
            fragment: "Anteil in Prozent",
        },
    ],
    industries: INDUSTRIES,
    listing: Some(ListingNames {
        listed: &["Die Gesellschaft ist börsennotiert", "börsennotiert"],
        not_listed: &["Die Gesellschaft ist nicht börsennotiert", "nicht börsennotiert"],
        no_processing: &["Ermittlung wirtschaftlich Berechtigter entfällt"],
        processing: &["Ermittlung wirtschaftlich Berechtigter erforderlich"],
        exchanges: EXCHANGES,
        other_exchange: &["Sonstige Börse"],
        other_exchange_text: &["Name der sonstigen Börse", "Name der sonstigen Börse..."],
    }),
    pep: Some(PepNames {
        yes: &["PEP Ja", "Ja"],
        no: &["PEP Nein", "Nein"],
        role: &[
            "Ausgeübtes Amt bzw. Funktion",
            "Ausgeübtes Amt bzw  Funktion",
            "Amt Funktion",
        ],
    }),
    ownership_pairs: &[
        (
            "Keine natürliche Person hält mehr als 25 %",
            "Die nachstehend aufgeführten Personen halten mehr als 25 %",
        ),
        (
            "Keine natürliche Person hält mehr als 25  %",
            "Die nachstehend aufgeführten Personen halten mehr als 25  %",
        ),
        (
            "Keine natürliche Person hält unmittelbar oder mittelbar mehr als 25 % der Kapitalanteile...",
            "Folgende natürliche Personen halten unmittelbar oder mittelbar mehr als 25 % der...",
        ),
    ],
};

static SOLE_PROPRIETOR: VariantCatalog = VariantCatalog {
    text_fields: &[
        "Name",
        "Vorname",
        "Geburtsname",
        "Geburtsdatum",
        "Geburtsort",
        "Staatsangehörigkeit",
        "Staatsangehörigkeit_2",
        "Staatsangehörigkeit_3",
        "Straße Hausnummer",
        "Straße  Hausnummer",
        "PLZ Ort",
        "Berufsbezeichnung",
        "Firma sofern vorhanden",
        "Ausweisnummer",
        "Ausstellende Behörde",
        "Gültig bis",
        "Ausgeübtes Amt bzw. Funktion",
        "Ort Datum",
    ],
    checkbox_fields: &["Personalausweis", "Reisepass", "Kopie Ausweis liegt vor"],
    special_fields: INDUSTRY_FIELDS,
    equivalents: &[
        ("lastName", &["Name", "Nachname", "Familienname"]),
        ("firstName", &["Vorname", "Vornamen"]),
        ("birthName", &["Geburtsname"]),
        ("birthDate", &["Geburtsdatum"]),
        ("birthPlace", &["Geburtsort"]),
        (
            "profession",
            &["Berufsbezeichnung", "Beruf", "Ausgeübter Beruf"],
        ),
        ("tradeName", &["Firma sofern vorhanden", "Firma"]),
        ("street", &["Straße Hausnummer", "Straße  Hausnummer"]),
        ("postalCodeCity", &["PLZ Ort", "PLZ  Ort"]),
        ("idNumber", &["Ausweisnummer", "Ausweis-Nr"]),
        ("issuingAuthority", &["Ausstellende Behörde"]),
        ("validUntil", &["Gültig bis"]),
        ("placeDate", &["Ort Datum", "Ort, Datum"]),
    ],
    groups: &[GroupSpec {
        data_key: "nationalities",
        attribute: None,
        fragment: "Staatsangehörigkeit",
    }],
    industries: INDUSTRIES,
    listing: None,
    pep: Some(PepNames {
        yes: &["Ja", "PEP Ja", "Ja_2"],
        no: &["Nein", "PEP Nein", "Nein_2"],
        role: &["Ausgeübtes Amt bzw. Funktion", "Amt Funktion"],
    }),
    ownership_pairs: &[],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_from_locator() {
        assert_eq!(
            DocumentVariant::infer_from_locator("templates/Dokumentationsbogen_AG_2024.pdf"),
            DocumentVariant::KycStockCorporation
        );
        assert_eq!(
            DocumentVariant::infer_from_locator("Dokumentationsbogen Einzelunternehmen.pdf"),
            DocumentVariant::KycSoleProprietor
        );
        assert_eq!(
            DocumentVariant::infer_from_locator("dokumentationsbogen_freiberufler.pdf"),
            DocumentVariant::KycSoleProprietor
        );
        assert_eq!(
            DocumentVariant::infer_from_locator("card-program/application.pdf"),
            DocumentVariant::Generic
        );
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!(
            "kyc-stock-corporation".parse::<DocumentVariant>().unwrap(),
            DocumentVariant::KycStockCorporation
        );
        assert!("kyc-gmbh".parse::<DocumentVariant>().is_err());
        let v: DocumentVariant = serde_json::from_str("\"kyc-sole-proprietor\"").unwrap();
        assert_eq!(v, DocumentVariant::KycSoleProprietor);
    }

    #[test]
    fn test_known_checkbox_tolerates_artifacts() {
        let catalog = DocumentVariant::KycStockCorporation.catalog();
        assert!(catalog.is_known_checkbox("Börse  Stuttgart"));
        assert!(catalog.is_known_checkbox(
            "Folgende natürliche Personen halten unmittelbar oder mittelbar mehr als 25 % der"
        ));
        assert!(!catalog.is_known_checkbox("Registernummer"));
        assert!(catalog.is_known_text("Registernummer"));
    }

    #[test]
    fn test_known_text_tolerates_artifacts() {
        let catalog = DocumentVariant::KycSoleProprietor.catalog();
        assert!(catalog.is_known_text("Ausweisnummer"));
        assert!(catalog.is_known_text("Ausgeübtes Amt  bzw. Funktion..."));
        assert!(!catalog.is_known_text("Personalausweis"));
    }

    #[test]
    fn test_equivalents_and_groups() {
        let catalog = DocumentVariant::KycStockCorporation.catalog();
        let street = catalog
            .equivalents
            .iter()
            .find(|(key, _)| *key == "street")
            .map(|(_, names)| *names)
            .unwrap();
        assert!(street.contains(&"Straße  Hausnummer"));
        let attrs: Vec<_> = catalog
            .groups
            .iter()
            .filter(|g| g.data_key == "representatives")
            .map(|g| g.attribute)
            .collect();
        assert_eq!(attrs, [None, Some("name"), Some("role"), Some("birthDate")]);
    }

    #[test]
    fn test_generic_catalog_is_empty() {
        let catalog = DocumentVariant::Generic.catalog();
        assert!(catalog.pep.is_none());
        assert!(catalog.industries.is_empty());
        assert!(!catalog.is_known_checkbox("Ja"));
    }
}
