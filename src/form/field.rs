//! Field kinds, flags and values.

use bitflags::bitflags;
use serde::Serialize;
use std::fmt;

/// Widget kind a field is treated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Single or multi-line text
    Text,
    /// Two-state button
    Checkbox,
    /// Group of mutually exclusive buttons
    Radio,
    /// Combo box or list box
    Dropdown,
    /// Push buttons, signatures and unrecognized field types
    Unknown,
}

impl Kind {
    /// Derive the kind from /FT and /Ff.
    ///
    /// Returns `None` when the field carries no /FT anywhere in its hierarchy.
    pub fn from_pdf(field_type: Option<&str>, flags: FieldFlags) -> Option<Kind> {
        let kind = match field_type? {
            "Tx" => Kind::Text,
            "Btn" if flags.contains(FieldFlags::PUSHBUTTON) => Kind::Unknown,
            "Btn" if flags.contains(FieldFlags::RADIO) => Kind::Radio,
            "Btn" => Kind::Checkbox,
            "Ch" => Kind::Dropdown,
            _ => Kind::Unknown,
        };
        Some(kind)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Text => "text",
            Kind::Checkbox => "checkbox",
            Kind::Radio => "radio",
            Kind::Dropdown => "dropdown",
            Kind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Field flags (/Ff), ISO 32000-1:2008 Tables 221, 226, 228 and 230.
    ///
    /// Bits are shared between field types; only the ones the filler reads are named.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u32 {
        /// Bit 1: user cannot change the value
        const READ_ONLY = 1 << 0;
        /// Bit 2: must have a value before submit
        const REQUIRED = 1 << 1;
        /// Bit 3: not exported by submit-form
        const NO_EXPORT = 1 << 2;
        /// Bit 13 (Tx): multiple lines
        const MULTILINE = 1 << 12;
        /// Bit 15 (Btn): at least one radio in the group stays on
        const NO_TOGGLE_TO_OFF = 1 << 14;
        /// Bit 16 (Btn): radio button
        const RADIO = 1 << 15;
        /// Bit 17 (Btn): push button
        const PUSHBUTTON = 1 << 16;
        /// Bit 18 (Ch): combo box rather than list box
        const COMBO = 1 << 17;
        /// Bit 19 (Ch): combo box accepts free text
        const EDIT = 1 << 18;
    }
}

/// Current value of a field (/V).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text string value
    Text(String),
    /// Checkbox state
    Boolean(bool),
    /// Name value (radio on-state)
    Name(String),
    /// Multiple values (multi-select list boxes)
    Array(Vec<String>),
    /// No value present
    None,
}

impl FieldValue {
    /// Get as text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether a checkbox holding this value is checked.
    pub fn is_checked(&self) -> bool {
        matches!(self, FieldValue::Boolean(true))
    }
}

/// One entry of a choice field's /Opt array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
    /// Value written to /V
    pub export: String,
    /// Text shown to the user
    pub display: String,
}

impl ChoiceOption {
    /// Option whose export and display values are the same.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            export: value.clone(),
            display: value,
        }
    }
}

/// Inventory entry produced by `FormTemplate::describe`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    /// Full qualified field name
    pub name: String,
    /// Kind from the document structure
    pub native_kind: Option<Kind>,
    /// Kind the filler will use
    pub resolved_kind: Kind,
    /// Raw /Ff bits
    pub flags: u32,
    /// Radio on-states or choice export values
    pub options: Vec<String>,
    /// Current value
    pub value: FieldValue,
}
