//! lopdf-backed AcroForm template.
//!
//! Field discovery walks the /AcroForm /Fields tree (ISO 32000-1:2008, Section 12.7.3):
//! - non-terminal fields contribute their partial name and inheritable /FT, /Ff, /MaxLen
//! - terminal fields own the value (/V); their widgets are either the field itself
//!   (merged dictionary) or /Kids entries without a /T
//! - several field objects sharing one full name are merged into one logical field

use super::field::{ChoiceOption, FieldFlags, FieldInfo, FieldValue, Kind};
use super::text::{decode_text_string, encode_text_string};
use super::FormDocument;
use crate::catalog::DocumentVariant;
use crate::error::{Error, Result};
use crate::resolver::TypeResolver;
use indexmap::IndexMap;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::fmt;

/// Deepest field hierarchy followed before giving up on a branch.
const MAX_FIELD_DEPTH: usize = 32;

#[derive(Debug, Clone)]
struct Widget {
    id: ObjectId,
    /// Appearance state other than /Off, if the widget has one
    on_state: Option<String>,
}

#[derive(Debug, Clone)]
struct FieldEntry {
    /// Field dictionaries holding /V
    ids: Vec<ObjectId>,
    widgets: Vec<Widget>,
    field_type: Option<String>,
    flags: FieldFlags,
    max_len: Option<usize>,
    options: Vec<ChoiceOption>,
}

impl FieldEntry {
    fn native_kind(&self) -> Option<Kind> {
        Kind::from_pdf(self.field_type.as_deref(), self.flags)
    }

    fn on_state(&self) -> Option<&str> {
        self.widgets.iter().find_map(|w| w.on_state.as_deref())
    }

    fn radio_states(&self) -> Vec<&str> {
        self.widgets.iter().filter_map(|w| w.on_state.as_deref()).collect()
    }

    /// On-state of the radio widget representing `option`.
    fn radio_state_for(&self, option: &str) -> Option<String> {
        let wanted = option.trim();
        if let Some(state) = self.radio_states().into_iter().find(|s| *s == wanted) {
            return Some(state.to_string());
        }
        // /Opt export values line up with the widget order
        if let Some(i) = self
            .options
            .iter()
            .position(|o| o.export == wanted || o.display == wanted)
        {
            return self.widgets.get(i).and_then(|w| w.on_state.clone());
        }
        let lowered = wanted.to_lowercase();
        self.radio_states()
            .into_iter()
            .find(|s| s.to_lowercase() == lowered)
            .map(str::to_string)
    }

    /// Export value of the choice option matching `option`.
    fn choice_for(&self, option: &str) -> Option<String> {
        let wanted = option.trim();
        if let Some(opt) = self
            .options
            .iter()
            .find(|o| o.export == wanted || o.display == wanted)
        {
            return Some(opt.export.clone());
        }
        let lowered = wanted.to_lowercase();
        self.options
            .iter()
            .find(|o| o.export.to_lowercase() == lowered || o.display.to_lowercase() == lowered)
            .map(|o| o.export.clone())
    }

    fn is_button(&self) -> bool {
        self.field_type.as_deref() == Some("Btn")
    }
}

#[derive(Debug, Clone, Default)]
struct Inherited {
    field_type: Option<String>,
    flags: Option<u32>,
    max_len: Option<usize>,
}

/// A loaded fillable PDF.
///
/// Each fill request loads its own template; nothing here is shared between requests.
pub struct FormTemplate {
    doc: Document,
    fields: IndexMap<String, FieldEntry>,
}

impl fmt::Debug for FormTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormTemplate")
            .field("fields", &self.fields.len())
            .finish()
    }
}

impl FormTemplate {
    /// Parse template bytes and index the AcroForm fields.
    ///
    /// Fails with [`Error::TemplateLoad`] if the bytes are not a PDF or the PDF has no AcroForm.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::TemplateLoad("template is empty".to_string()));
        }
        let doc = Document::load_mem(bytes).map_err(|e| Error::TemplateLoad(e.to_string()))?;
        let fields = index_fields(&doc)?;
        log::debug!("Loaded form template with {} fields", fields.len());
        Ok(Self { doc, fields })
    }

    /// Number of logical fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the form has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field inventory with the kind the filler would use for each field.
    pub fn describe(&self, resolver: &TypeResolver, variant: DocumentVariant) -> Vec<FieldInfo> {
        self.fields
            .iter()
            .map(|(name, entry)| {
                let native_kind = entry.native_kind();
                let options = match native_kind {
                    Some(Kind::Radio) => {
                        entry.radio_states().into_iter().map(str::to_string).collect()
                    },
                    _ => entry.options.iter().map(|o| o.export.clone()).collect(),
                };
                FieldInfo {
                    name: name.clone(),
                    native_kind,
                    resolved_kind: resolver.resolve(name, native_kind, variant),
                    flags: entry.flags.bits(),
                    options,
                    value: self.value(name).unwrap_or(FieldValue::None),
                }
            })
            .collect()
    }

    /// Serialize the (possibly modified) document.
    ///
    /// Sets /NeedAppearances so viewers rebuild appearance streams for the new values.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>> {
        self.set_need_appearances()?;
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    fn set_need_appearances(&mut self) -> Result<()> {
        let root = self.doc.trailer.get(b"Root")?.as_reference()?;
        let acroform = self.doc.get_object(root)?.as_dict()?.get(b"AcroForm")?.clone();
        match acroform {
            Object::Reference(id) => {
                dict_mut(&mut self.doc, id)?.set("NeedAppearances", Object::Boolean(true));
            },
            _ => {
                dict_mut(&mut self.doc, root)?
                    .get_mut(b"AcroForm")?
                    .as_dict_mut()?
                    .set("NeedAppearances", Object::Boolean(true));
            },
        }
        Ok(())
    }

    fn entry(&self, name: &str) -> Result<&FieldEntry> {
        self.fields
            .get(name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))
    }

    /// Entry for a write, rejecting read-only fields.
    fn writable(&self, name: &str) -> Result<FieldEntry> {
        let entry = self.entry(name)?;
        if entry.flags.contains(FieldFlags::READ_ONLY) {
            return Err(Error::ReadOnlyField(name.to_string()));
        }
        Ok(entry.clone())
    }

    fn write_value(&mut self, entry: &FieldEntry, value: Object) -> Result<()> {
        for id in &entry.ids {
            dict_mut(&mut self.doc, *id)?.set("V", value.clone());
        }
        Ok(())
    }
}

impl FormDocument for FormTemplate {
    fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn native_kind(&self, name: &str) -> Option<Kind> {
        self.fields.get(name).and_then(FieldEntry::native_kind)
    }

    fn set_text(&mut self, name: &str, value: &str) -> Result<()> {
        let entry = self.writable(name)?;
        match entry.native_kind() {
            None | Some(Kind::Text) => {},
            Some(Kind::Dropdown) if entry.flags.contains(FieldFlags::EDIT) => {},
            found => return Err(mismatch(name, Kind::Text, found)),
        }
        let value = match entry.max_len {
            Some(max) if value.chars().count() > max => {
                log::debug!("Truncating value for '{}' to /MaxLen {}", name, max);
                value.chars().take(max).collect()
            },
            _ => value.to_string(),
        };
        self.write_value(&entry, encode_text_string(&value))
    }

    fn set_checkbox(&mut self, name: &str, checked: bool) -> Result<()> {
        let entry = self.writable(name)?;
        match entry.native_kind() {
            Some(Kind::Checkbox) => {},
            None if entry.on_state().is_some() => {},
            found => return Err(mismatch(name, Kind::Checkbox, found)),
        }
        let on = entry.on_state().unwrap_or("Yes").to_string();
        let value = if checked { on.clone() } else { "Off".to_string() };
        self.write_value(&entry, Object::Name(value.into_bytes()))?;
        for widget in &entry.widgets {
            let state = match (&widget.on_state, checked) {
                (_, false) => "Off".to_string(),
                (Some(own), true) => own.clone(),
                (None, true) => on.clone(),
            };
            dict_mut(&mut self.doc, widget.id)?.set("AS", Object::Name(state.into_bytes()));
        }
        Ok(())
    }

    fn select_radio(&mut self, name: &str, option: &str) -> Result<()> {
        let entry = self.writable(name)?;
        match entry.native_kind() {
            Some(Kind::Radio) => {},
            None if entry.radio_states().len() > 1 => {},
            found => return Err(mismatch(name, Kind::Radio, found)),
        }
        let state = entry
            .radio_state_for(option)
            .ok_or_else(|| Error::OptionNotFound {
                name: name.to_string(),
                value: option.to_string(),
            })?;
        self.write_value(&entry, Object::Name(state.clone().into_bytes()))?;
        for widget in &entry.widgets {
            let appearance = if widget.on_state.as_deref() == Some(state.as_str()) {
                state.as_str()
            } else {
                "Off"
            };
            dict_mut(&mut self.doc, widget.id)?
                .set("AS", Object::Name(appearance.as_bytes().to_vec()));
        }
        Ok(())
    }

    fn select_dropdown(&mut self, name: &str, option: &str) -> Result<()> {
        let entry = self.writable(name)?;
        match entry.native_kind() {
            Some(Kind::Dropdown) => {},
            None if !entry.options.is_empty() => {},
            found => return Err(mismatch(name, Kind::Dropdown, found)),
        }
        let export = match entry.choice_for(option) {
            Some(export) => export,
            None if entry.flags.contains(FieldFlags::EDIT) => option.to_string(),
            None => {
                return Err(Error::OptionNotFound {
                    name: name.to_string(),
                    value: option.to_string(),
                })
            },
        };
        self.write_value(&entry, encode_text_string(&export))?;
        for id in &entry.ids {
            dict_mut(&mut self.doc, *id)?.remove(b"I");
        }
        Ok(())
    }

    fn set_value(&mut self, name: &str, value: &str) -> Result<()> {
        let entry = self.writable(name)?;
        let untypable = entry.flags.contains(FieldFlags::PUSHBUTTON)
            || entry.field_type.as_deref() == Some("Sig");
        if untypable {
            return Err(mismatch(name, Kind::Text, entry.native_kind()));
        }
        let object = if entry.is_button() {
            Object::Name(value.as_bytes().to_vec())
        } else {
            encode_text_string(value)
        };
        self.write_value(&entry, object)
    }

    fn value(&self, name: &str) -> Option<FieldValue> {
        let entry = self.fields.get(name)?;
        let dict = self.doc.get_object(*entry.ids.first()?).ok()?.as_dict().ok()?;
        let value = match dict.get(b"V").ok().and_then(|o| resolve(&self.doc, o)) {
            Some(v) => v,
            None => return Some(FieldValue::None),
        };
        let parsed = match value {
            Object::String(bytes, _) => FieldValue::Text(decode_text_string(bytes)),
            Object::Name(raw) => {
                let state = name_to_string(raw);
                match entry.native_kind() {
                    Some(Kind::Radio) if state == "Off" => FieldValue::None,
                    Some(Kind::Radio) => FieldValue::Name(state),
                    _ if entry.is_button() => FieldValue::Boolean(state != "Off"),
                    _ => FieldValue::Name(state),
                }
            },
            Object::Array(items) => FieldValue::Array(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Object::String(bytes, _) => Some(decode_text_string(bytes)),
                        Object::Name(raw) => Some(name_to_string(raw)),
                        _ => None,
                    })
                    .collect(),
            ),
            Object::Boolean(b) => FieldValue::Boolean(*b),
            _ => FieldValue::None,
        };
        Some(parsed)
    }
}

fn mismatch(name: &str, expected: Kind, found: Option<Kind>) -> Error {
    Error::FieldTypeMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        found: found.map_or_else(|| "untyped".to_string(), |k| k.to_string()),
    }
}

fn dict_mut(doc: &mut Document, id: ObjectId) -> Result<&mut Dictionary> {
    Ok(doc.get_object_mut(id)?.as_dict_mut()?)
}

/// Follow an indirect reference; direct objects are returned as is.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn name_to_string(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(_) => raw.iter().map(|&b| b as char).collect(),
    }
}

fn index_fields(doc: &Document) -> Result<IndexMap<String, FieldEntry>> {
    let no_form = || Error::TemplateLoad("document has no AcroForm fields".to_string());

    let root = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| Error::TemplateLoad("document has no catalog".to_string()))?;
    let catalog = doc
        .get_object(root)
        .and_then(Object::as_dict)
        .map_err(|_| Error::TemplateLoad("catalog is not a dictionary".to_string()))?;
    let acroform = catalog
        .get(b"AcroForm")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .ok_or_else(no_form)?;
    let top_level = acroform
        .get(b"Fields")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .ok_or_else(no_form)?;

    let mut fields = IndexMap::new();
    let mut visited = HashSet::new();
    for item in top_level {
        match item.as_reference() {
            Ok(id) => collect_field(
                doc,
                id,
                "",
                &Inherited::default(),
                &mut fields,
                &mut visited,
                0,
            ),
            Err(_) => log::debug!("Skipping direct field object in /Fields"),
        }
    }
    Ok(fields)
}

fn collect_field(
    doc: &Document,
    id: ObjectId,
    parent_name: &str,
    inherited: &Inherited,
    out: &mut IndexMap<String, FieldEntry>,
    visited: &mut HashSet<ObjectId>,
    depth: usize,
) {
    if depth > MAX_FIELD_DEPTH || !visited.insert(id) {
        log::warn!("Field hierarchy loop or depth limit at object {} {}", id.0, id.1);
        return;
    }
    let dict = match doc.get_object(id).and_then(Object::as_dict) {
        Ok(d) => d,
        Err(_) => return,
    };

    let partial_name = dict
        .get(b"T")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_str().ok())
        .map(decode_text_string);
    let full_name = match partial_name {
        Some(partial) if parent_name.is_empty() => partial,
        Some(partial) if partial.is_empty() => parent_name.to_string(),
        Some(partial) => format!("{}.{}", parent_name, partial),
        None => parent_name.to_string(),
    };

    let mut inherited = inherited.clone();
    if let Some(ft) = dict.get(b"FT").ok().and_then(|o| o.as_name().ok()) {
        inherited.field_type = Some(name_to_string(ft));
    }
    if let Some(ff) = dict
        .get(b"Ff")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_i64().ok())
    {
        inherited.flags = Some(ff as u32);
    }
    if let Some(max_len) = dict
        .get(b"MaxLen")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_i64().ok())
    {
        inherited.max_len = usize::try_from(max_len).ok();
    }

    let kids: Vec<ObjectId> = dict
        .get(b"Kids")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .map(|arr| arr.iter().filter_map(|k| k.as_reference().ok()).collect())
        .unwrap_or_default();
    let (child_fields, widget_kids): (Vec<ObjectId>, Vec<ObjectId>) =
        kids.iter().copied().partition(|kid| {
            doc.get_object(*kid)
                .and_then(Object::as_dict)
                .map(|d| d.has(b"T"))
                .unwrap_or(false)
        });

    for child in &child_fields {
        collect_field(doc, *child, &full_name, &inherited, out, visited, depth + 1);
    }
    if !child_fields.is_empty() && widget_kids.is_empty() {
        return;
    }
    if full_name.is_empty() {
        log::debug!("Skipping unnamed terminal field at object {} {}", id.0, id.1);
        return;
    }

    let widget_ids = if kids.is_empty() { vec![id] } else { widget_kids };
    let widgets = widget_ids
        .into_iter()
        .map(|wid| Widget {
            id: wid,
            on_state: widget_on_state(doc, wid),
        })
        .collect::<Vec<_>>();

    let entry = out.entry(full_name).or_insert_with(|| FieldEntry {
        ids: Vec::new(),
        widgets: Vec::new(),
        field_type: inherited.field_type.clone(),
        flags: FieldFlags::from_bits_truncate(inherited.flags.unwrap_or(0)),
        max_len: inherited.max_len,
        options: parse_options(doc, dict),
    });
    if !entry.ids.is_empty() {
        log::debug!("Merging duplicate field object {} {} into existing field", id.0, id.1);
    }
    entry.ids.push(id);
    entry.widgets.extend(widgets);
}

/// First /AP /N state name other than /Off.
fn widget_on_state(doc: &Document, id: ObjectId) -> Option<String> {
    let dict = doc.get_object(id).ok()?.as_dict().ok()?;
    let appearance = resolve(doc, dict.get(b"AP").ok()?)?.as_dict().ok()?;
    let normal = resolve(doc, appearance.get(b"N").ok()?)?.as_dict().ok()?;
    normal
        .iter()
        .map(|(key, _)| name_to_string(key))
        .find(|key| key != "Off")
}

fn parse_options(doc: &Document, dict: &Dictionary) -> Vec<ChoiceOption> {
    let Some(items) = dict
        .get(b"Opt")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
    else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match resolve(doc, item)? {
            Object::String(bytes, _) => Some(ChoiceOption::plain(decode_text_string(bytes))),
            Object::Array(pair) if pair.len() == 2 => Some(ChoiceOption {
                export: decode_text_string(pair[0].as_str().ok()?),
                display: decode_text_string(pair[1].as_str().ok()?),
            }),
            _ => None,
        })
        .collect()
}
