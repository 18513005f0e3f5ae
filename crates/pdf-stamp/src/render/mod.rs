//! PDF rendering modules for stamping
//!
//! This module handles all PDF-specific drawing:
//! - Embedding the stamp bitmap as an image XObject
//! - Appending stamp content streams to existing pages

mod page;
mod xobject;

pub use page::PageStamper;
pub use xobject::create_image_xobject;
