//! Stamp bitmap preparation
//!
//! Loads the stamp image once per batch and applies transparency, opacity and
//! rotation so every document reuses the same prepared pixels.

use crate::constants::WHITE_THRESHOLD;
use crate::layout::SliceSpan;
use crate::options::StampingOptions;
use crate::types::*;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use std::path::Path;

/// Pixel processing applied to the stamp image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitmapSettings {
    /// Turn near-white pixels transparent (ignored for images with alpha)
    pub transparent: bool,
    pub opacity_percent: u8,
    /// Clockwise rotation
    pub rotation_degrees: f32,
    /// Squeeze the rotated image back to the original width
    pub keep_bounds: bool,
}

impl Default for BitmapSettings {
    fn default() -> Self {
        Self {
            transparent: false,
            opacity_percent: 100,
            rotation_degrees: 0.0,
            keep_bounds: false,
        }
    }
}

impl From<&StampingOptions> for BitmapSettings {
    fn from(options: &StampingOptions) -> Self {
        Self {
            transparent: options.transparent,
            opacity_percent: options.opacity_percent,
            rotation_degrees: options.rotation_degrees,
            keep_bounds: options.keep_bounds,
        }
    }
}

/// The prepared stamp, ready to be sliced and drawn
#[derive(Debug, Clone)]
pub struct StampBitmap {
    image: RgbaImage,
    original_width: u32,
}

impl StampBitmap {
    /// Load and prepare the stamp image at `path`
    pub fn load(path: &Path, settings: &BitmapSettings) -> Result<Self> {
        if !path.is_file() {
            return Err(StampError::NotFound(path.to_path_buf()));
        }
        let source = image::open(path)?;
        Ok(Self::prepare(source, settings))
    }

    /// Prepare an already decoded image
    pub fn prepare(source: DynamicImage, settings: &BitmapSettings) -> Self {
        let original_width = source.width();
        let has_alpha = source.color().has_alpha();
        let mut image = source.to_rgba8();

        if settings.transparent && !has_alpha {
            clear_white_background(&mut image);
        }

        if settings.opacity_percent < 100 {
            apply_opacity(&mut image, settings.opacity_percent);
        }

        let image = rotate_bitmap(&image, settings.rotation_degrees, settings.keep_bounds);

        log::debug!(
            "Prepared stamp bitmap {}x{} (source width {})",
            image.width(),
            image.height(),
            original_width
        );

        Self {
            image,
            original_width,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width of the source image before rotation, used for scaling
    pub fn original_width(&self) -> u32 {
        self.original_width
    }

    /// Crop one seam slice, turning it a quarter for horizontal edges
    pub fn slice(&self, span: SliceSpan, quarter_turn: bool) -> RgbaImage {
        let strip = imageops::crop_imm(&self.image, span.start, 0, span.width, self.height()).to_image();
        if quarter_turn {
            imageops::rotate90(&strip)
        } else {
            strip
        }
    }
}

// =============================================================================
// Pixel Operations
// =============================================================================

/// Replace paper-white pixels with fully transparent ones of the same color
fn clear_white_background(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let Rgba([r, g, b, _]) = *pixel;
        if r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD {
            *pixel = Rgba([r, g, b, 0]);
        }
    }
}

/// Set a uniform alpha on every visible pixel
fn apply_opacity(image: &mut RgbaImage, opacity_percent: u8) {
    let alpha = (f32::from(opacity_percent.min(100)) / 100.0 * 255.0).round() as u8;
    for pixel in image.pixels_mut() {
        if pixel[3] != 0 {
            pixel[3] = alpha;
        }
    }
}

/// Bounding box of a `width` x `height` rectangle turned by `degrees`
pub fn rotated_bounds(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (width as f32, height as f32);
    let new_w = (w * cos - h * sin).abs().max((w * cos + h * sin).abs());
    let new_h = (w * sin - h * cos).abs().max((w * sin + h * cos).abs());
    (
        (new_w.round() as u32).max(1),
        (new_h.round() as u32).max(1),
    )
}

/// Rotate clockwise about the center into the rotated bounding box.
///
/// With `keep_bounds` the result is resized back to the source width, with
/// the height following the bounding box aspect ratio.
pub fn rotate_bitmap(image: &RgbaImage, degrees: f32, keep_bounds: bool) -> RgbaImage {
    let normalized = degrees.rem_euclid(360.0);
    if normalized.abs() < f32::EPSILON {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let (new_w, new_h) = rotated_bounds(width, height, normalized);

    let rotated = match normalized {
        d if (d - 90.0).abs() < f32::EPSILON => imageops::rotate90(image),
        d if (d - 180.0).abs() < f32::EPSILON => imageops::rotate180(image),
        d if (d - 270.0).abs() < f32::EPSILON => imageops::rotate270(image),
        _ => rotate_free(image, normalized, new_w, new_h),
    };

    if !keep_bounds {
        return rotated;
    }

    let kept_h = ((width as f32) * new_h as f32 / new_w as f32).round().max(1.0) as u32;
    imageops::resize(&rotated, width, kept_h, FilterType::Triangle)
}

/// Arbitrary angle rotation on a transparent canvas large enough for any turn
fn rotate_free(image: &RgbaImage, degrees: f32, new_w: u32, new_h: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let side = ((width as f32).hypot(height as f32).ceil() as u32).max(new_w).max(new_h);

    let mut canvas = RgbaImage::from_pixel(side, side, Rgba([0, 0, 0, 0]));
    imageops::overlay(
        &mut canvas,
        image,
        i64::from((side - width) / 2),
        i64::from((side - height) / 2),
    );

    let turned = rotate_about_center(
        &canvas,
        degrees.to_radians(),
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
    );

    imageops::crop_imm(&turned, (side - new_w) / 2, (side - new_h) / 2, new_w, new_h).to_image()
}
