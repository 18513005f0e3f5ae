//! Detached digital signatures
//!
//! Signing runs after all stamps are drawn:
//! 1. Insert an invisible signature field with placeholders
//! 2. Serialize the document
//! 3. Patch `/ByteRange` and sign the covered bytes
//! 4. Embed the CMS signature in `/Contents`

mod byterange;
mod credentials;
mod detached;
mod field;

pub use byterange::{SignatureSlots, apply_signature};
pub use credentials::SigningContext;
pub use field::{SignatureInfo, insert_signature_field};

use crate::stamp::serialize_document;
use crate::types::*;
use lopdf::{Document, ObjectId};

/// Sign `doc` with `context`, placing the field on `page_id`, and return the
/// final file bytes.
pub fn sign_document(
    doc: &mut Document,
    page_id: ObjectId,
    context: &SigningContext,
    reason: Option<&str>,
    location: Option<&str>,
) -> Result<Vec<u8>> {
    let info = SignatureInfo {
        name: context.signer_name(),
        reason: reason.map(str::to_string),
        location: location.map(str::to_string),
    };
    insert_signature_field(doc, page_id, &info)?;

    let prepared = serialize_document(doc)?;
    apply_signature(prepared, |covered| context.sign_detached(covered))
}
