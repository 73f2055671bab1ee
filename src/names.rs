//! Field name normalization.
//!
//! PDF authoring tools leave artifacts in field names: doubled spaces, truncated
//! labels ending in an ellipsis, and `_2`/`_3` suffixes on copied fields.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref TRAILING_NUMBER: Regex = Regex::new(r"(\d+)\s*$").unwrap();
    static ref TRAILING_ELLIPSIS: Regex = Regex::new(r"(\s*(\.{2,}|…))+\s*$").unwrap();
}

/// Collapse whitespace runs to one space, trim, lowercase.
pub fn normalize(name: &str) -> String {
    WHITESPACE.replace_all(name.trim(), " ").to_lowercase()
}

/// [`normalize`] plus removal of trailing ellipses and periods.
///
/// Used for literal-name tables, where "Angaben erforderlich..." and
/// "Angaben  erforderlich" denote the same checkbox.
pub fn normalize_label(name: &str) -> String {
    let stripped = TRAILING_ELLIPSIS.replace(name.trim(), "");
    normalize(stripped.trim_end_matches('.'))
}

/// Numeric suffix used to order repeated copies of a field.
///
/// `"Vertreter_2"` → 2, `"Name Vertreter 3"` → 3, `"Name Vertreter"` → 0.
pub fn numeric_suffix(name: &str) -> u32 {
    TRAILING_NUMBER
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Whether two names match by normalized containment in either direction.
///
/// The contained side must have at least `min_len` characters so that short
/// tokens like "Ja" do not match every field that happens to contain them.
pub fn fuzzy_contains(a: &str, b: &str, min_len: usize) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    short.chars().count() >= min_len && long.contains(&short)
}
