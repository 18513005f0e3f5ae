//! ByteRange patching for PDF signatures.
//!
//! The document is serialized with a placeholder `/ByteRange` array and a
//! zero-filled hex `/Contents` string. Both are then located in the output,
//! the real ranges are written over the placeholder without changing its
//! length, and the signature over the covered bytes fills the hex string.

use crate::constants::{BYTE_RANGE_PLACEHOLDER, SIGNATURE_PLACEHOLDER_BYTES};
use crate::types::*;

const BYTE_RANGE_KEY: &[u8] = b"/ByteRange";

/// Byte offsets of the two patchable regions in a serialized document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureSlots {
    /// `[` through `]` of the placeholder array, end exclusive
    pub byte_range: (usize, usize),
    /// `<` through `>` of the placeholder string, end exclusive
    pub contents: (usize, usize),
}

impl SignatureSlots {
    /// Locate the placeholders in `pdf`
    pub fn locate(pdf: &[u8]) -> Result<Self> {
        let contents = find_contents_placeholder(pdf).ok_or_else(|| {
            StampError::Signing("Signature contents placeholder not found".to_string())
        })?;
        let byte_range = find_byte_range_placeholder(pdf).ok_or_else(|| {
            StampError::Signing("Signature byte range placeholder not found".to_string())
        })?;
        Ok(Self {
            byte_range,
            contents,
        })
    }

    /// `[0, before, after_start, after_len]` for a file of `file_size` bytes
    pub fn ranges(&self, file_size: usize) -> [usize; 4] {
        let (start, end) = self.contents;
        [0, start, end, file_size - end]
    }
}

/// Patch the byte range, sign the covered bytes with `sign` and embed the
/// result. `sign` receives exactly the bytes outside `/Contents`.
pub fn apply_signature<F>(mut pdf: Vec<u8>, sign: F) -> Result<Vec<u8>>
where
    F: FnOnce(&[u8]) -> Result<Vec<u8>>,
{
    let slots = SignatureSlots::locate(&pdf)?;
    let ranges = slots.ranges(pdf.len());
    write_byte_range(&mut pdf, slots.byte_range, &ranges)?;

    let (start, end) = slots.contents;
    let mut covered = Vec::with_capacity(pdf.len() - (end - start));
    covered.extend_from_slice(&pdf[..start]);
    covered.extend_from_slice(&pdf[end..]);

    let signature = sign(&covered)?;
    if signature.len() > SIGNATURE_PLACEHOLDER_BYTES {
        return Err(StampError::SignatureTooLarge {
            actual: signature.len(),
            reserved: SIGNATURE_PLACEHOLDER_BYTES,
        });
    }

    let encoded = hex::encode_upper(&signature);
    pdf[start + 1..start + 1 + encoded.len()].copy_from_slice(encoded.as_bytes());

    log::debug!(
        "Embedded {} byte signature, ByteRange {:?}",
        signature.len(),
        ranges
    );
    Ok(pdf)
}

/// Rewrite the placeholder array in place, padding with spaces
fn write_byte_range(pdf: &mut [u8], slot: (usize, usize), ranges: &[usize; 4]) -> Result<()> {
    let (start, end) = slot;
    let width = end - start;
    let text = format!("[{} {} {} {}", ranges[0], ranges[1], ranges[2], ranges[3]);
    if text.len() + 1 > width {
        return Err(StampError::Signing(format!(
            "ByteRange {:?} does not fit its {} byte placeholder",
            ranges, width
        )));
    }

    let mut patched = text.into_bytes();
    patched.resize(width - 1, b' ');
    patched.push(b']');
    pdf[start..end].copy_from_slice(&patched);
    Ok(())
}

fn find_contents_placeholder(pdf: &[u8]) -> Option<(usize, usize)> {
    let digits = SIGNATURE_PLACEHOLDER_BYTES * 2;
    let total = digits + 2;
    let mut offset = 0;
    while offset + total <= pdf.len() {
        let open = offset + pdf[offset..].iter().position(|&b| b == b'<')?;
        if open + total > pdf.len() {
            return None;
        }
        let body = &pdf[open + 1..open + 1 + digits];
        if pdf[open + 1 + digits] == b'>' && body.iter().all(|&b| b == b'0') {
            return Some((open, open + total));
        }
        offset = open + 1;
    }
    None
}

fn find_byte_range_placeholder(pdf: &[u8]) -> Option<(usize, usize)> {
    let marker = BYTE_RANGE_PLACEHOLDER.to_string();
    let mut offset = 0;
    while let Some(found) = find(&pdf[offset..], BYTE_RANGE_KEY) {
        let key_end = offset + found + BYTE_RANGE_KEY.len();
        let open = key_end + pdf[key_end..].iter().position(|&b| !b.is_ascii_whitespace())?;
        if pdf[open] == b'[' {
            let close = open + pdf[open..].iter().position(|&b| b == b']')?;
            if find(&pdf[open..close], marker.as_bytes()).is_some() {
                return Some((open, close + 1));
            }
        }
        offset = key_end;
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
