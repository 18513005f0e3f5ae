//! Layout calculation modules for stamping
//!
//! This module handles all the geometric calculations for stamping:
//! - Scope resolution (which pages receive which stamp)
//! - Seam slicing (which bitmap columns go on which page)
//! - Placement (where a stamp lands on a rotated page)

mod geometry;
mod scope;
mod slices;
mod types;

pub use geometry::*;
pub use scope::*;
pub use slices::*;
pub use types::*;
