//! AcroForm document model.
//!
//! The filler never touches PDF objects directly. It works against the
//! [`FormDocument`] trait: a mutable set of named fields, each with an optional
//! native [`Kind`] and a handful of typed setters.
//!
//! ```text
//! template bytes ──load──► FormTemplate (lopdf::Document + field index)
//!                               │  FormDocument
//!                               ▼
//!                          FormFiller ──save──► filled bytes
//! ```

mod field;
mod template;
mod text;

#[cfg(test)]
pub(crate) mod memory;

pub use field::{ChoiceOption, FieldFlags, FieldInfo, FieldValue, Kind};
pub use template::FormTemplate;
pub use text::{decode_text_string, encode_text_string};

use crate::error::Result;

/// Mutable view of a fillable form.
///
/// Every setter either writes the field or returns a field-level error. Setters
/// never create or delete fields.
pub trait FormDocument {
    /// All field names, in document order.
    fn field_names(&self) -> Vec<String>;

    /// Whether a field with this exact name exists.
    fn has_field(&self, name: &str) -> bool;

    /// Kind derived from the document structure, if the document exposes one.
    fn native_kind(&self, name: &str) -> Option<Kind>;

    /// Write a text value.
    fn set_text(&mut self, name: &str, value: &str) -> Result<()>;

    /// Check or uncheck a checkbox.
    fn set_checkbox(&mut self, name: &str, checked: bool) -> Result<()>;

    /// Select one option of a radio group.
    fn select_radio(&mut self, name: &str, option: &str) -> Result<()>;

    /// Select one option of a combo or list box.
    fn select_dropdown(&mut self, name: &str, option: &str) -> Result<()>;

    /// Untyped value write, used when the field kind cannot be determined.
    fn set_value(&mut self, name: &str, value: &str) -> Result<()>;

    /// Current value of a field.
    fn value(&self, name: &str) -> Option<FieldValue>;
}
