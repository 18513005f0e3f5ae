//! Shared constants for PDF stamping
//!
//! This module centralizes magic numbers and constants used throughout
//! the stamping process.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Millimeters per inch
pub const MM_PER_INCH: f32 = 25.4;

/// PDF user space units per inch
pub const DEFAULT_UNITS_PER_INCH: f32 = 72.0;

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Stamp Bitmap
// =============================================================================

/// Channel value above which a pixel counts as paper white
pub const WHITE_THRESHOLD: u8 = 230;

/// Default physical stamp width
pub const DEFAULT_STAMP_WIDTH_MM: f32 = 40.0;

// =============================================================================
// Seam Stamps
// =============================================================================

/// Default number of seam slices cropped and drawn at once
pub const DEFAULT_SEAM_BATCH_SIZE: usize = 20;

/// Default seam position along the edge, in percent
pub const DEFAULT_SEAM_OFFSET_PERCENT: f32 = 50.0;

// =============================================================================
// Page Stamp Jitter
// =============================================================================

/// Position jitter step as a page ratio
pub const JITTER_STEP: f32 = 0.01;

/// Largest number of steps in either direction
pub const JITTER_MAX_STEPS: i16 = 2;

/// Largest rotation jitter in degrees
pub const JITTER_MAX_ROTATION_DEG: i16 = 2;

// =============================================================================
// Output
// =============================================================================

/// Default suffix appended to output file stems
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_stamped";

// =============================================================================
// Signatures
// =============================================================================

/// Bytes reserved for the DER encoded CMS signature
pub const SIGNATURE_PLACEHOLDER_BYTES: usize = 8192;

/// Placeholder integer reserved in `/ByteRange` before patching
pub const BYTE_RANGE_PLACEHOLDER: i64 = 9_999_999_999;

/// Application recorded in the signature build properties
pub const SIGNATURE_APP_NAME: &str = "pdf-stamp";

/// Application version recorded alongside [`SIGNATURE_APP_NAME`]
pub const SIGNATURE_APP_VERSION: &str = env!("CARGO_PKG_VERSION");
