//! Image XObject creation
//!
//! The stamp is embedded as an RGB image with its alpha channel carried in a
//! DeviceGray soft mask, both Flate compressed.

use crate::types::*;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::RgbaImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

// =============================================================================
// XObject Creation
// =============================================================================

/// Add `image` to `doc` as an image XObject and return its object id.
///
/// Fully opaque images are written without a soft mask.
pub fn create_image_xobject(doc: &mut Document, image: &RgbaImage) -> Result<ObjectId> {
    let (width, height) = image.dimensions();
    let pixel_count = (width as usize) * (height as usize);

    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in image.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mut image_dict = image_dictionary(width, height, "DeviceRGB");

    if alpha.iter().any(|&a| a != u8::MAX) {
        let mask_dict = image_dictionary(width, height, "DeviceGray");
        let mask_id = doc.add_object(Stream::new(mask_dict, deflate(&alpha)?));
        image_dict.set("SMask", Object::Reference(mask_id));
    }

    Ok(doc.add_object(Stream::new(image_dict, deflate(&rgb)?)))
}

fn image_dictionary(width: u32, height: u32, color_space: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(i64::from(width)));
    dict.set("Height", Object::Integer(i64::from(height)));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    dict
}

/// Zlib compress raw sample data for a FlateDecode stream
fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_opaque_image_has_no_mask() {
        let mut doc = Document::with_version("1.7");
        let image = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        let id = create_image_xobject(&mut doc, &image).unwrap();

        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 3);
        assert_eq!(stream.dict.get(b"Height").unwrap().as_i64().unwrap(), 2);
        assert!(stream.dict.get(b"SMask").is_err());
        assert_eq!(
            stream.decompressed_content().unwrap(),
            vec![1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]
        );
    }

    #[test]
    fn test_alpha_goes_into_soft_mask() {
        let mut doc = Document::with_version("1.7");
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([9, 9, 9, 255]));
        image.put_pixel(1, 0, Rgba([9, 9, 9, 0]));
        let id = create_image_xobject(&mut doc, &image).unwrap();

        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        let mask_id = stream.dict.get(b"SMask").unwrap().as_reference().unwrap();
        let mask = doc.get_object(mask_id).unwrap().as_stream().unwrap();
        assert_eq!(
            mask.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceGray"
        );
        assert_eq!(mask.decompressed_content().unwrap(), vec![255, 0]);
    }
}
