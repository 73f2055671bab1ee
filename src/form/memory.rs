//! In-memory form used by unit tests.

use super::{FieldValue, FormDocument, Kind};
use crate::error::{Error, Result};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
struct MemoryField {
    kind: Option<Kind>,
    value: FieldValue,
    options: Vec<String>,
}

/// Form whose fields live in a map. `None` kinds behave like fields of a
/// document that does not expose structural typing.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryForm {
    fields: IndexMap<String, MemoryField>,
}

impl MemoryForm {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, name: &str, kind: Option<Kind>) -> Self {
        self.fields.insert(
            name.to_string(),
            MemoryField {
                kind,
                value: FieldValue::None,
                options: Vec::new(),
            },
        );
        self
    }

    pub(crate) fn text(self, name: &str) -> Self {
        self.with(name, Some(Kind::Text))
    }

    pub(crate) fn checkbox(self, name: &str) -> Self {
        self.with(name, Some(Kind::Checkbox))
    }

    pub(crate) fn choice(mut self, name: &str, kind: Kind, options: &[&str]) -> Self {
        self = self.with(name, Some(kind));
        if let Some(field) = self.fields.get_mut(name) {
            field.options = options.iter().map(|o| o.to_string()).collect();
        }
        self
    }

    pub(crate) fn checked(&self, name: &str) -> bool {
        self.value(name).map(|v| v.is_checked()).unwrap_or(false)
    }

    pub(crate) fn text_of(&self, name: &str) -> Option<String> {
        self.value(name).and_then(|v| v.as_text().map(str::to_string))
    }

    fn field_mut(&mut self, name: &str, allowed: &[Option<Kind>]) -> Result<&mut MemoryField> {
        let field = self
            .fields
            .get_mut(name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))?;
        if !allowed.contains(&field.kind) {
            return Err(Error::FieldTypeMismatch {
                name: name.to_string(),
                expected: format!("{:?}", allowed),
                found: format!("{:?}", field.kind),
            });
        }
        Ok(field)
    }
}

impl FormDocument for MemoryForm {
    fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn native_kind(&self, name: &str) -> Option<Kind> {
        self.fields.get(name).and_then(|f| f.kind)
    }

    fn set_text(&mut self, name: &str, value: &str) -> Result<()> {
        let field = self.field_mut(name, &[Some(Kind::Text), None])?;
        field.value = FieldValue::Text(value.to_string());
        Ok(())
    }

    fn set_checkbox(&mut self, name: &str, checked: bool) -> Result<()> {
        let field = self.field_mut(name, &[Some(Kind::Checkbox)])?;
        field.value = FieldValue::Boolean(checked);
        Ok(())
    }

    fn select_radio(&mut self, name: &str, option: &str) -> Result<()> {
        let field = self.field_mut(name, &[Some(Kind::Radio)])?;
        if !field.options.iter().any(|o| o == option) {
            return Err(Error::OptionNotFound {
                name: name.to_string(),
                value: option.to_string(),
            });
        }
        field.value = FieldValue::Name(option.to_string());
        Ok(())
    }

    fn select_dropdown(&mut self, name: &str, option: &str) -> Result<()> {
        let field = self.field_mut(name, &[Some(Kind::Dropdown)])?;
        if !field.options.iter().any(|o| o == option) {
            return Err(Error::OptionNotFound {
                name: name.to_string(),
                value: option.to_string(),
            });
        }
        field.value = FieldValue::Text(option.to_string());
        Ok(())
    }

    fn set_value(&mut self, name: &str, value: &str) -> Result<()> {
        let field = self.field_mut(name, &[Some(Kind::Text), Some(Kind::Unknown), None])?;
        field.value = FieldValue::Text(value.to_string());
        Ok(())
    }

    fn value(&self, name: &str) -> Option<FieldValue> {
        self.fields.get(name).map(|f| f.value.clone())
    }
}
