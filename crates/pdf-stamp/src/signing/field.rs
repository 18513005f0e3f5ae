//! Invisible signature field
//!
//! Adds a `/Sig` value dictionary with placeholders, a zero-sized widget on
//! the first page and the AcroForm entries that make readers look for it.

use crate::constants::{
    BYTE_RANGE_PLACEHOLDER, SIGNATURE_APP_NAME, SIGNATURE_APP_VERSION, SIGNATURE_PLACEHOLDER_BYTES,
};
use crate::types::*;
use chrono::{DateTime, Local, TimeZone};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

/// AcroForm `/SigFlags`: SignaturesExist | AppendOnly
const SIG_FLAGS: i64 = 3;

/// Annotation flags: Print | Locked
const WIDGET_FLAGS: i64 = 132;

/// Descriptive entries of the signature dictionary
#[derive(Debug, Clone, Default)]
pub struct SignatureInfo {
    pub name: String,
    pub reason: Option<String>,
    pub location: Option<String>,
}

/// Add the signature field to `page_id` and return the `/Sig` dictionary id
pub fn insert_signature_field(
    doc: &mut Document,
    page_id: ObjectId,
    info: &SignatureInfo,
) -> Result<ObjectId> {
    let signature_id = doc.add_object(signature_dictionary(info, Local::now()));

    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let mut acro_form = owned_dict(doc, doc.get_dictionary(catalog_id)?.get(b"AcroForm").ok());
    let mut fields = owned_array(doc, acro_form.get(b"Fields").ok());

    let mut widget = Dictionary::new();
    widget.set("Type", Object::Name(b"Annot".to_vec()));
    widget.set("Subtype", Object::Name(b"Widget".to_vec()));
    widget.set("FT", Object::Name(b"Sig".to_vec()));
    widget.set(
        "T",
        Object::string_literal(format!("Signature{}", fields.len() + 1)),
    );
    widget.set("V", Object::Reference(signature_id));
    widget.set("Rect", Object::Array(vec![0.into(), 0.into(), 0.into(), 0.into()]));
    widget.set("F", Object::Integer(WIDGET_FLAGS));
    widget.set("P", Object::Reference(page_id));
    let widget_id = doc.add_object(widget);

    let mut annots = owned_array(doc, doc.get_dictionary(page_id)?.get(b"Annots").ok());
    annots.push(Object::Reference(widget_id));
    doc.get_dictionary_mut(page_id)?
        .set("Annots", Object::Array(annots));

    fields.push(Object::Reference(widget_id));
    acro_form.set("Fields", Object::Array(fields));
    acro_form.set("SigFlags", Object::Integer(SIG_FLAGS));
    doc.get_dictionary_mut(catalog_id)?
        .set("AcroForm", Object::Dictionary(acro_form));

    Ok(signature_id)
}

fn signature_dictionary<Tz: TimeZone>(info: &SignatureInfo, signed_at: DateTime<Tz>) -> Dictionary
where
    Tz::Offset: std::fmt::Display,
{
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"Sig".to_vec()));
    dict.set("Filter", Object::Name(b"Adobe.PPKLite".to_vec()));
    dict.set("SubFilter", Object::Name(b"adbe.pkcs7.detached".to_vec()));
    dict.set(
        "ByteRange",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(BYTE_RANGE_PLACEHOLDER),
            Object::Integer(BYTE_RANGE_PLACEHOLDER),
            Object::Integer(BYTE_RANGE_PLACEHOLDER),
        ]),
    );
    dict.set(
        "Contents",
        Object::String(
            vec![0; SIGNATURE_PLACEHOLDER_BYTES],
            StringFormat::Hexadecimal,
        ),
    );
    dict.set("M", Object::string_literal(pdf_date(&signed_at)));
    dict.set("Name", Object::string_literal(info.name.as_str()));
    if let Some(reason) = &info.reason {
        dict.set("Reason", Object::string_literal(reason.as_str()));
    }
    if let Some(location) = &info.location {
        dict.set("Location", Object::string_literal(location.as_str()));
    }

    let mut app = Dictionary::new();
    app.set("Name", Object::Name(SIGNATURE_APP_NAME.as_bytes().to_vec()));
    app.set("REx", Object::string_literal(SIGNATURE_APP_VERSION));
    let mut build = Dictionary::new();
    build.set("App", Object::Dictionary(app));
    dict.set("Prop_Build", Object::Dictionary(build));

    dict
}

/// PDF date string, `D:YYYYMMDDHHmmSS+HH'mm'`
fn pdf_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let offset = at.format("%z").to_string();
    let (hours, minutes) = offset.split_at(offset.len().min(3));
    format!("D:{}{}'{}'", at.format("%Y%m%d%H%M%S"), hours, minutes)
}

/// Clone a dictionary that may be inline or referenced
fn owned_dict(doc: &Document, obj: Option<&Object>) -> Dictionary {
    match obj {
        Some(Object::Reference(id)) => doc.get_dictionary(*id).cloned().unwrap_or_default(),
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    }
}

/// Clone an array that may be inline or referenced
fn owned_array(doc: &Document, obj: Option<&Object>) -> Vec<Object> {
    let resolved = match obj {
        Some(Object::Reference(id)) => doc.get_object(*id).ok(),
        other => other,
    };
    match resolved {
        Some(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}
