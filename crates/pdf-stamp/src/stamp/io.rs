//! Document I/O operations for stamping

use crate::types::*;
use lopdf::{Document, EncryptionState, EncryptionVersion, Object, Permissions, StringFormat};
use rand::RngCore;
use std::path::Path;

/// Key length used when protecting output documents
const ENCRYPTION_KEY_BITS: usize = 128;

/// Parse `bytes` and unlock them with `password` if the document is protected.
///
/// `path` only labels errors.
pub fn open_document(bytes: &[u8], path: &Path, password: Option<&str>) -> Result<Document> {
    let mut doc = Document::load_mem(bytes)?;

    if doc.is_encrypted() {
        let supplied = password.filter(|p| !p.is_empty());
        if let Err(err) = doc.decrypt(supplied.unwrap_or("")) {
            log::debug!("Decryption of {} failed: {}", path.display(), err);
            return Err(match supplied {
                Some(_) => StampError::InvalidPassword(path.to_path_buf()),
                None => StampError::PasswordRequired(path.to_path_buf()),
            });
        }
        doc.trailer.remove(b"Encrypt");
        log::debug!("Unlocked {}", path.display());
    }

    Ok(doc)
}

/// Protect `doc` with RC4 128-bit encryption and all permissions granted.
///
/// The same password opens the document and owns it.
pub fn encrypt_document(doc: &mut Document, password: &str) -> Result<()> {
    ensure_document_id(doc);

    let version = EncryptionVersion::V2 {
        document: &*doc,
        owner_password: password,
        user_password: password,
        key_length: ENCRYPTION_KEY_BITS,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version)
        .map_err(|e| StampError::Encryption(e.to_string()))?;
    doc.encrypt(&state)
        .map_err(|e| StampError::Encryption(e.to_string()))?;
    Ok(())
}

/// Serialize the whole document
pub fn serialize_document(doc: &mut Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}

/// Encryption keys are derived from the first `/ID` entry
fn ensure_document_id(doc: &mut Document) {
    if doc.trailer.has(b"ID") {
        return;
    }
    let mut id = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut id);
    let entry = Object::String(id.to_vec(), StringFormat::Hexadecimal);
    doc.trailer
        .set("ID", Object::Array(vec![entry.clone(), entry]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn one_page() -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 200.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_plain_document_opens_without_password() {
        let bytes = serialize_document(&mut one_page()).unwrap();
        let doc = open_document(&bytes, Path::new("plain.pdf"), None).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_encrypt_adds_id_and_encrypt_dictionary() {
        let mut doc = one_page();
        encrypt_document(&mut doc, "secret").unwrap();
        assert!(doc.trailer.has(b"ID"));

        let bytes = serialize_document(&mut doc).unwrap();
        assert!(bytes.windows(8).any(|w| w == b"/Encrypt"));
    }

    fn protected(password: &str) -> Vec<u8> {
        let mut doc = one_page();
        encrypt_document(&mut doc, password).unwrap();
        serialize_document(&mut doc).unwrap()
    }

    #[test]
    fn test_correct_password_unlocks() {
        let bytes = protected("pw");
        let doc = open_document(&bytes, Path::new("locked.pdf"), Some("pw")).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(!doc.trailer.has(b"Encrypt"));
    }

    #[test]
    fn test_missing_password() {
        let bytes = protected("pw");
        for password in [None, Some("")] {
            let err = open_document(&bytes, Path::new("locked.pdf"), password).unwrap_err();
            assert!(matches!(err, StampError::PasswordRequired(ref p) if p == Path::new("locked.pdf")));
        }
    }

    #[test]
    fn test_wrong_password() {
        let bytes = protected("pw");
        let err = open_document(&bytes, Path::new("locked.pdf"), Some("wrong")).unwrap_err();
        assert!(matches!(err, StampError::InvalidPassword(_)));
    }

    #[test]
    fn test_garbage_is_a_pdf_error() {
        let err = open_document(b"not a pdf", Path::new("x.pdf"), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Document);
    }
}
