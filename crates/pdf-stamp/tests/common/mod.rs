#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use lopdf::{Dictionary, Document, Object, Stream};
use pdf_stamp::StampingOptions;
use std::path::{Path, PathBuf};

pub fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc
}

pub fn write_test_pdf(path: &Path, num_pages: usize) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    create_test_pdf(num_pages).save(path).unwrap();
}

/// Red disc on a white background
pub fn write_stamp_png(path: &Path, width: u32, height: u32) {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let radius = cx.min(cy);
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        if dx * dx + dy * dy <= radius * radius {
            Rgba([200, 20, 20, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    image.save(path).unwrap();
}

/// Options writing stamped copies from `input` into `output_dir`
pub fn copy_options(input: PathBuf, stamp: PathBuf, output_dir: PathBuf) -> StampingOptions {
    StampingOptions {
        input_paths: vec![input],
        output_dir: Some(output_dir),
        stamp_image: Some(stamp),
        transparent: true,
        ..Default::default()
    }
}

/// Number of images registered in each page's resources
pub fn xobjects_per_page(doc: &Document) -> Vec<usize> {
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_dictionary(page_id).unwrap();
            let resources = match page.get(b"Resources") {
                Ok(Object::Reference(id)) => doc.get_dictionary(*id).unwrap(),
                Ok(Object::Dictionary(dict)) => dict,
                _ => return 0,
            };
            match resources.get(b"XObject") {
                Ok(Object::Reference(id)) => doc.get_dictionary(*id).unwrap().len(),
                Ok(Object::Dictionary(dict)) => dict.len(),
                _ => 0,
            }
        })
        .collect()
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
