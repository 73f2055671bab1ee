//! Builds small AcroForm PDFs for integration tests.

#![allow(dead_code)]

use acrofill::form::encode_text_string;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

const RADIO: i64 = 1 << 15;
const COMBO: i64 = 1 << 17;
pub const READ_ONLY: i64 = 1;

/// Fluent builder for a one-page form.
pub struct FormBuilder {
    doc: Document,
    pages_id: ObjectId,
    page_id: ObjectId,
    fields: Vec<Object>,
    annots: Vec<Object>,
}

impl FormBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_id,
            fields: Vec::new(),
            annots: Vec::new(),
        }
    }

    fn widget(&self, name: Option<&str>) -> Dictionary {
        let mut dict = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Rect" => vec![0.into(), 0.into(), 120.into(), 18.into()],
            "P" => self.page_id,
        };
        if let Some(name) = name {
            dict.set("T", encode_text_string(name));
        }
        dict
    }

    fn appearance(&mut self, on_state: &str) -> Dictionary {
        let on = self.doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let off = self.doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let mut normal = Dictionary::new();
        normal.set(on_state, on);
        normal.set("Off", off);
        dictionary! { "N" => normal }
    }

    fn push(&mut self, dict: Dictionary) -> ObjectId {
        let id = self.doc.add_object(dict);
        self.fields.push(id.into());
        self.annots.push(id.into());
        id
    }

    pub fn text(self, name: &str) -> Self {
        self.text_with(name, 0, None)
    }

    pub fn text_with(mut self, name: &str, flags: i64, max_len: Option<i64>) -> Self {
        let mut dict = self.widget(Some(name));
        dict.set("FT", "Tx");
        dict.set("Ff", flags);
        if let Some(max) = max_len {
            dict.set("MaxLen", max);
        }
        self.push(dict);
        self
    }

    /// Text-like field without /FT anywhere in its hierarchy.
    pub fn untyped(mut self, name: &str) -> Self {
        let dict = self.widget(Some(name));
        self.push(dict);
        self
    }

    pub fn checkbox(self, name: &str) -> Self {
        self.checkbox_with_state(name, "Yes")
    }

    pub fn checkbox_with_state(mut self, name: &str, on_state: &str) -> Self {
        let mut dict = self.widget(Some(name));
        dict.set("FT", "Btn");
        dict.set("AP", self.appearance(on_state));
        dict.set("AS", "Off");
        dict.set("V", "Off");
        self.push(dict);
        self
    }

    pub fn radio(mut self, name: &str, states: &[&str]) -> Self {
        let parent_id = self.doc.new_object_id();
        let mut kids = Vec::new();
        for state in states {
            let mut widget = self.widget(None);
            widget.set("Parent", parent_id);
            widget.set("AP", self.appearance(state));
            widget.set("AS", "Off");
            let kid = self.doc.add_object(widget);
            self.annots.push(kid.into());
            kids.push(Object::from(kid));
        }
        let parent = dictionary! {
            "FT" => "Btn",
            "Ff" => RADIO,
            "T" => encode_text_string(name),
            "Kids" => kids,
            "V" => "Off",
        };
        self.doc.objects.insert(parent_id, Object::Dictionary(parent));
        self.fields.push(parent_id.into());
        self
    }

    pub fn dropdown(mut self, name: &str, options: &[&str]) -> Self {
        let mut dict = self.widget(Some(name));
        dict.set("FT", "Ch");
        dict.set("Ff", COMBO);
        dict.set(
            "Opt",
            options
                .iter()
                .map(|o| encode_text_string(o))
                .collect::<Vec<Object>>(),
        );
        self.push(dict);
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        let page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Annots" => self.annots.clone(),
        };
        self.doc.objects.insert(self.page_id, Object::Dictionary(page));
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![self.page_id.into()],
            "Count" => 1,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));
        let acroform = self.doc.add_object(dictionary! {
            "Fields" => self.fields.clone(),
        });
        let catalog = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
            "AcroForm" => acroform,
        });
        self.doc.trailer.set("Root", catalog);

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).expect("fixture serializes");
        bytes
    }
}

/// PDF with a page but no AcroForm.
pub fn pdf_without_form() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture serializes");
    bytes
}

/// Form data from JSON.
pub fn data(json: &str) -> acrofill::FormData {
    serde_json::from_str(json).expect("valid form data")
}
