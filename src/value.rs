//! Semantic form data supplied by the caller.
//!
//! The data map is untrusted: keys may be literal field names, semantic keys only a
//! business rule understands, or nothing the template knows about at all.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered key/value map of form data. Insertion order is fill order.
pub type FormData = IndexMap<String, FormValue>;

/// A single value in the form data map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    /// Explicit null
    Null,
    /// Boolean flag (checkboxes, branching rules)
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Free text
    Text(String),
    /// Ordered list (repeated blocks)
    List(Vec<FormValue>),
    /// Structured record, e.g. one representative
    Record(IndexMap<String, FormValue>),
}

impl FormValue {
    /// Get as text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list, if this is a list value.
    pub fn as_list(&self) -> Option<&[FormValue]> {
        match self {
            FormValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as record, if this is a record value.
    pub fn as_record(&self) -> Option<&IndexMap<String, FormValue>> {
        match self {
            FormValue::Record(map) => Some(map),
            _ => None,
        }
    }

    /// Whether this value carries nothing worth writing.
    pub fn is_blank(&self) -> bool {
        match self {
            FormValue::Null => true,
            FormValue::Text(s) => s.trim().is_empty(),
            FormValue::List(items) => items.iter().all(FormValue::is_blank),
            FormValue::Record(map) => map.values().all(FormValue::is_blank),
            FormValue::Bool(_) | FormValue::Number(_) => false,
        }
    }

    /// Render the value for a text field.
    ///
    /// Returns `None` for values that have no sensible text form (records, lists of records).
    pub fn render_text(&self) -> Option<String> {
        match self {
            FormValue::Null => None,
            FormValue::Bool(true) => Some("Ja".to_string()),
            FormValue::Bool(false) => Some("Nein".to_string()),
            FormValue::Number(n) => Some(format_number(*n)),
            FormValue::Text(s) => Some(s.clone()),
            FormValue::List(items) => {
                let parts = items
                    .iter()
                    .filter(|item| !item.is_blank())
                    .map(|item| match item {
                        FormValue::List(_) | FormValue::Record(_) => None,
                        scalar => scalar.render_text(),
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(parts.join(", "))
            },
            FormValue::Record(_) => None,
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Number(value)
    }
}

impl<T: Into<FormValue>> From<Vec<T>> for FormValue {
    fn from(values: Vec<T>) -> Self {
        FormValue::List(values.into_iter().map(Into::into).collect())
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

const TRUTHY: &[&str] = &["yes", "ja", "true", "1", "on", "x"];
const FALSY: &[&str] = &["no", "nein", "false", "0", "off"];

/// Tolerant boolean parser for checkbox values.
///
/// `Some(true)` checks, `Some(false)` unchecks, `None` means the value is not a
/// recognizable boolean and the checkbox keeps its prior state.
pub fn parse_truthy(value: &FormValue) -> Option<bool> {
    match value {
        FormValue::Bool(b) => Some(*b),
        FormValue::Number(n) if *n == 1.0 => Some(true),
        FormValue::Number(n) if *n == 0.0 => Some(false),
        FormValue::Text(s) => parse_truthy_str(s),
        _ => None,
    }
}

/// String half of [`parse_truthy`].
pub fn parse_truthy_str(s: &str) -> Option<bool> {
    let lowered = s.trim().to_lowercase();
    if TRUTHY.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSY.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}
