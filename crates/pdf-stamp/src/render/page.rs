//! Drawing stamps onto existing pages
//!
//! Each stamp is appended as its own content stream. The first time a page is
//! touched its original content is wrapped in `q`/`Q` so any graphics state it
//! leaves behind cannot leak into the stamp.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::layout::{PageBox, Rect, StampPlacement, normalize_rotation, placement_transform};
use crate::types::*;
use image::RgbaImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashSet};

use super::xobject::create_image_xobject;

/// Upper bound on page tree depth when looking up inherited attributes
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Resource name prefix for stamp images
const IMAGE_NAME_PREFIX: &str = "PdfStamp";

// =============================================================================
// Page Stamper
// =============================================================================

/// Tracks per-document drawing state across many stamps
#[derive(Debug)]
pub struct PageStamper {
    pages: BTreeMap<u32, ObjectId>,
    wrapped: HashSet<ObjectId>,
    next_image: usize,
}

impl PageStamper {
    pub fn new(doc: &Document) -> Self {
        Self {
            pages: doc.get_pages(),
            wrapped: HashSet::new(),
            next_image: 0,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Object id of a 1-based page
    pub fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or_else(|| StampError::Config(format!("Page {} does not exist", page)))
    }

    /// MediaBox and `/Rotate` of a page, following page tree inheritance
    pub fn page_box(&self, doc: &Document, page: u32) -> Result<PageBox> {
        let page_id = self.page_id(page)?;

        let media_box = inherited(doc, page_id, b"MediaBox")
            .and_then(|obj| parse_rect(doc, obj))
            .unwrap_or_else(default_media_box);

        let rotation = inherited(doc, page_id, b"Rotate")
            .and_then(|obj| resolve(doc, obj).as_i64().ok())
            .map(normalize_rotation)
            .unwrap_or(0);

        Ok(PageBox {
            media_box,
            rotation,
        })
    }

    /// Draw `image` on its placement page
    pub fn draw_image(
        &mut self,
        doc: &mut Document,
        image: &RgbaImage,
        placement: &StampPlacement,
    ) -> Result<()> {
        let xobject_id = create_image_xobject(doc, image)?;
        self.draw_xobject(doc, xobject_id, placement)
    }

    /// Draw an already embedded image XObject, so one stamp can be shared
    /// by many pages
    pub fn draw_xobject(
        &mut self,
        doc: &mut Document,
        xobject_id: ObjectId,
        placement: &StampPlacement,
    ) -> Result<()> {
        let page_id = self.page_id(placement.page)?;
        let page_box = self.page_box(doc, placement.page)?;

        let name = self.next_image_name();
        register_xobject(doc, page_id, &name, xobject_id)?;

        self.wrap_existing_content(doc, page_id)?;

        let transform = placement_transform(placement, &page_box);
        let ops = format!("q {} /{} Do Q\n", transform.to_cm(), name);
        append_content(doc, page_id, ops.into_bytes())?;

        log::trace!("Drew stamp on page {} as /{}", placement.page, name);
        Ok(())
    }

    fn next_image_name(&mut self) -> String {
        self.next_image += 1;
        format!("{}{}", IMAGE_NAME_PREFIX, self.next_image)
    }

    fn wrap_existing_content(&mut self, doc: &mut Document, page_id: ObjectId) -> Result<()> {
        if !self.wrapped.insert(page_id) {
            return Ok(());
        }

        let existing = content_streams(doc, page_id)?;
        if existing.is_empty() {
            return Ok(());
        }

        let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let close_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(open_id));
        contents.extend(existing);
        contents.push(Object::Reference(close_id));

        doc.get_dictionary_mut(page_id)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }
}

// =============================================================================
// Page Dictionary Helpers
// =============================================================================

/// Follow a single indirect reference
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Look up `key` on the page or the nearest ancestor that defines it
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn parse_rect(doc: &Document, obj: &Object) -> Option<Rect> {
    let values: Vec<f32> = resolve(doc, obj)
        .as_array()
        .ok()?
        .iter()
        .map(|v| resolve(doc, v).as_float().ok())
        .collect::<Option<_>>()?;

    let [x0, y0, x1, y1] = values.as_slice() else {
        return None;
    };
    Some(Rect::new(
        x0.min(*x1),
        y0.min(*y1),
        (x1 - x0).abs(),
        (y1 - y0).abs(),
    ))
}

/// US Letter, used when a page has no MediaBox anywhere in its tree
fn default_media_box() -> Rect {
    Rect::new(0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1)
}

/// The page's content streams as a flat list of references
fn content_streams(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;
    let streams = match page.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        _ => Vec::new(),
    };
    Ok(streams)
}

fn append_content(doc: &mut Document, page_id: ObjectId, ops: Vec<u8>) -> Result<()> {
    let mut contents = content_streams(doc, page_id)?;
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), ops));
    contents.push(Object::Reference(stream_id));
    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Add `name -> xobject_id` to the page's XObject resources.
///
/// Inherited or shared resource dictionaries are copied onto the page first so
/// other pages don't see the stamp.
fn register_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    xobject_id: ObjectId,
) -> Result<()> {
    let mut resources = inherited(doc, page_id, b"Resources")
        .and_then(|obj| resolve(doc, obj).as_dict().ok())
        .cloned()
        .unwrap_or_default();

    let mut xobjects = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_dict().ok())
        .cloned()
        .unwrap_or_default();

    xobjects.set(name.as_bytes(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}
