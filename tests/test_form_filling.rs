//! End-to-end filling against real AcroForm documents.

mod common;

use acrofill::catalog::GroupSpec;
use acrofill::error::{Error, ErrorKind};
use acrofill::filler::{Fallback, IndustryRule, PepRule};
use acrofill::form::{FieldValue, FormDocument, FormTemplate, Kind};
use acrofill::gateway::{MemoryGateway, TemplateGateway};
use acrofill::{DocumentVariant, FormFiller, TypeResolver};
use common::{data, FormBuilder, READ_ONLY};

/// Fill, save and reload so assertions see what a viewer would see.
fn fill_and_reload(filler: &FormFiller, pdf: Vec<u8>, json: &str) -> (usize, FormTemplate) {
    let mut template = FormTemplate::load(&pdf).unwrap();
    let report = filler.fill(&mut template, &data(json)).unwrap();
    let bytes = template.save_to_bytes().unwrap();
    (report.filled, FormTemplate::load(&bytes).unwrap())
}

#[test]
fn test_pep_rule_on_generic_template() {
    let pdf = FormBuilder::new()
        .text("Name")
        .checkbox("Ja")
        .checkbox("Nein")
        .build();
    let filler = FormFiller::generic().with_rule(PepRule::new(&["Ja"], &["Nein"]));

    let (filled, form) =
        fill_and_reload(&filler, pdf, r#"{"Name": "Acme GmbH", "hasPep": false}"#);

    assert_eq!(filled, 3);
    assert_eq!(form.value("Name"), Some(FieldValue::Text("Acme GmbH".into())));
    assert_eq!(form.value("Nein"), Some(FieldValue::Boolean(true)));
    assert_eq!(form.value("Ja"), Some(FieldValue::Boolean(false)));
}

#[test]
fn test_positional_group_without_exact_match() {
    let pdf = FormBuilder::new()
        .text("Vertreter_1")
        .text("Vertreter_2")
        .build();
    let filler = FormFiller::generic().with_fallback(Fallback::new().with_group(GroupSpec {
        data_key: "representatives",
        attribute: None,
        fragment: "Vertreter",
    }));

    let (filled, form) = fill_and_reload(
        &filler,
        pdf,
        r#"{"representatives": ["Jane Doe", "John Roe"]}"#,
    );

    assert_eq!(filled, 2);
    assert_eq!(form.value("Vertreter_1"), Some(FieldValue::Text("Jane Doe".into())));
    assert_eq!(form.value("Vertreter_2"), Some(FieldValue::Text("John Roe".into())));
}

#[test]
fn test_no_matching_fields_is_fill_failure() {
    let pdf = FormBuilder::new().text("Firma").checkbox("Ja").build();
    let mut template = FormTemplate::load(&pdf).unwrap();

    let err = FormFiller::generic()
        .fill(&mut template, &data(r#"{"Rechtsform": "AG", "Sitz": "Berlin"}"#))
        .unwrap_err();

    assert!(matches!(err, Error::NoFieldsFilled { attempted: 2 }));
    assert_eq!(err.kind(), ErrorKind::FillFailed);
}

#[test]
fn test_industry_rule_touches_one_checkbox() {
    let pdf = FormBuilder::new()
        .checkbox("Baugewerbe")
        .checkbox("Handel")
        .checkbox("Gastgewerbe")
        .build();
    let filler = FormFiller::generic().with_rule(
        IndustryRule::new()
            .with_industry(&["Baugewerbe"], &["Baugewerbe"])
            .with_industry(&["Handel"], &["Handel"]),
    );

    let (filled, form) = fill_and_reload(&filler, pdf, r#"{"industry": "Baugewerbe"}"#);

    assert_eq!(filled, 1);
    assert_eq!(form.value("Baugewerbe"), Some(FieldValue::Boolean(true)));
    assert_eq!(form.value("Handel"), Some(FieldValue::Boolean(false)));
    assert_eq!(form.value("Gastgewerbe"), Some(FieldValue::Boolean(false)));
}

#[test]
fn test_empty_template_bytes_fail_before_filling() {
    let gateway = MemoryGateway::new().with_template("forms/empty.pdf", Vec::new());
    let err = gateway.resolve_template("forms/empty.pdf").unwrap_err();
    assert!(matches!(err, Error::TemplateUnavailable(_)));
    assert_eq!(err.kind(), ErrorKind::TemplateUnavailable);
}

#[test]
fn test_pdf_without_acroform_is_load_failure() {
    let err = FormTemplate::load(&common::pdf_without_form()).unwrap_err();
    assert!(matches!(err, Error::TemplateLoad(_)));
}

#[test]
fn test_radio_and_dropdown_selection() {
    let pdf = FormBuilder::new()
        .radio("Geschlecht", &["m", "w", "d"])
        .dropdown("Land", &["Deutschland", "Österreich", "Schweiz"])
        .build();

    let (filled, form) = fill_and_reload(
        &FormFiller::generic(),
        pdf,
        r#"{"Geschlecht": "W", "Land": "österreich"}"#,
    );

    assert_eq!(filled, 2);
    assert_eq!(form.value("Geschlecht"), Some(FieldValue::Name("w".into())));
    assert_eq!(form.value("Land"), Some(FieldValue::Text("Österreich".into())));
}

#[test]
fn test_checkbox_uses_widget_on_state() {
    let pdf = FormBuilder::new()
        .checkbox_with_state("Ausweis liegt vor", "On")
        .build();

    let (_, form) = fill_and_reload(&FormFiller::generic(), pdf, r#"{"Ausweis liegt vor": "x"}"#);

    assert_eq!(form.value("Ausweis liegt vor"), Some(FieldValue::Boolean(true)));
}

#[test]
fn test_text_respects_max_len_and_read_only() {
    let pdf = FormBuilder::new()
        .text_with("PLZ", 0, Some(5))
        .text_with("Kundennummer", READ_ONLY, None)
        .build();

    let (filled, form) = fill_and_reload(
        &FormFiller::generic(),
        pdf,
        r#"{"PLZ": "101150", "Kundennummer": "K-1"}"#,
    );

    assert_eq!(filled, 1);
    assert_eq!(form.value("PLZ"), Some(FieldValue::Text("10115".into())));
    assert_eq!(form.value("Kundennummer"), Some(FieldValue::None));
}

#[test]
fn test_unicode_names_and_values_survive_save() {
    let pdf = FormBuilder::new().text("Straße  Hausnummer").build();

    let (_, form) = fill_and_reload(
        &FormFiller::generic(),
        pdf,
        r#"{"Straße  Hausnummer": "Königsallee 1"}"#,
    );

    assert_eq!(
        form.value("Straße  Hausnummer"),
        Some(FieldValue::Text("Königsallee 1".into()))
    );
}

#[test]
fn test_numbers_and_booleans_render_into_text() {
    let pdf = FormBuilder::new()
        .text("Anteil in Prozent")
        .text("Gesellschafterliste")
        .build();

    let (_, form) = fill_and_reload(
        &FormFiller::generic(),
        pdf,
        r#"{"Anteil in Prozent": 30, "Gesellschafterliste": true}"#,
    );

    assert_eq!(form.value("Anteil in Prozent"), Some(FieldValue::Text("30".into())));
    assert_eq!(form.value("Gesellschafterliste"), Some(FieldValue::Text("Ja".into())));
}

#[test]
fn test_untyped_field_gets_heuristic_kind() {
    let pdf = FormBuilder::new().untyped("Bemerkung").text("Firma").build();
    let template = FormTemplate::load(&pdf).unwrap();
    assert_eq!(template.native_kind("Bemerkung"), None);

    let (filled, form) = fill_and_reload(
        &FormFiller::generic(),
        pdf,
        r#"{"Bemerkung": "keine", "Firma": "Acme"}"#,
    );
    assert_eq!(filled, 2);
    assert_eq!(form.value("Bemerkung"), Some(FieldValue::Text("keine".into())));
}

#[test]
fn test_describe_lists_native_and_resolved_kinds() {
    let pdf = FormBuilder::new()
        .text("Firma")
        .checkbox("PEP Ja")
        .radio("Status", &["aktiv", "ruhend"])
        .dropdown("Land", &["DE", "AT"])
        .untyped("Nein")
        .build();
    let template = FormTemplate::load(&pdf).unwrap();

    let fields = template.describe(&TypeResolver::default(), DocumentVariant::Generic);
    let kinds: Vec<(&str, Option<Kind>, Kind)> = fields
        .iter()
        .map(|f| (f.name.as_str(), f.native_kind, f.resolved_kind))
        .collect();
    assert_eq!(
        kinds,
        [
            ("Firma", Some(Kind::Text), Kind::Text),
            ("PEP Ja", Some(Kind::Checkbox), Kind::Checkbox),
            ("Status", Some(Kind::Radio), Kind::Radio),
            ("Land", Some(Kind::Dropdown), Kind::Dropdown),
            ("Nein", None, Kind::Checkbox),
        ]
    );
    assert_eq!(fields[2].options, ["aktiv", "ruhend"]);
}

#[test]
fn test_saved_form_asks_viewers_for_appearances() {
    let pdf = FormBuilder::new().text("Firma").build();
    let mut template = FormTemplate::load(&pdf).unwrap();
    FormFiller::generic()
        .fill(&mut template, &data(r#"{"Firma": "Acme"}"#))
        .unwrap();
    let bytes = template.save_to_bytes().unwrap();

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let acroform_id = doc
        .get_object(root)
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"AcroForm")
        .unwrap()
        .as_reference()
        .unwrap();
    let acroform = doc.get_object(acroform_id).unwrap().as_dict().unwrap();
    assert!(acroform.get(b"NeedAppearances").unwrap().as_bool().unwrap());
}
