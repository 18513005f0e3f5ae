//! Stamp geometry
//!
//! All placement is computed in rendered page space, the page as a reader
//! sees it after `/Rotate`. [`rendered_to_user`] maps that space back onto
//! the unrotated MediaBox so the stamp appears upright.

use crate::constants::MM_PER_INCH;
use crate::types::SeamSide;

use super::{PageBox, PageMetrics, Rect, StampPlacement, Transform};

// =============================================================================
// Scale
// =============================================================================

/// Scale, in percent, that renders a bitmap `original_pixel_width` wide at
/// `target_width_mm`.
///
/// One source pixel maps to one user space unit at `units_per_inch`. Pass the
/// pre-rotation width so the stamp size does not change with rotation.
pub fn scale_percent(target_width_mm: f32, original_pixel_width: u32, units_per_inch: f32) -> f32 {
    if original_pixel_width == 0 {
        return 0.0;
    }
    let target_units = target_width_mm * units_per_inch / MM_PER_INCH;
    target_units / original_pixel_width as f32 * 100.0
}

/// Drawn size of a bitmap in user space units
pub fn scaled_size(pixel_width: u32, pixel_height: u32, scale_percent: f32) -> (f32, f32) {
    let factor = scale_percent / 100.0;
    (pixel_width as f32 * factor, pixel_height as f32 * factor)
}

// =============================================================================
// Page Metrics
// =============================================================================

/// Normalize a `/Rotate` value to 0, 90, 180 or 270
pub fn normalize_rotation(degrees: i64) -> u16 {
    let quarter_turns = ((degrees as f64) / 90.0).round() as i64;
    (quarter_turns.rem_euclid(4) * 90) as u16
}

/// Rendered width and height, swapped for quarter-turned pages
pub fn page_metrics(page: &PageBox) -> PageMetrics {
    let (w, h) = (page.media_box.width, page.media_box.height);
    match page.rotation {
        90 | 270 => PageMetrics {
            width: h,
            height: w,
        },
        _ => PageMetrics {
            width: w,
            height: h,
        },
    }
}

/// Map rendered page coordinates onto unrotated user space.
///
/// `/Rotate` turns the page clockwise for display, so this is the inverse
/// turn plus the MediaBox origin.
pub fn rendered_to_user(page: &PageBox) -> Transform {
    let mb = &page.media_box;
    match page.rotation {
        90 => Transform::new(0.0, 1.0, -1.0, 0.0, mb.x + mb.width, mb.y),
        180 => Transform::new(-1.0, 0.0, 0.0, -1.0, mb.x + mb.width, mb.y + mb.height),
        270 => Transform::new(0.0, -1.0, 1.0, 0.0, mb.x, mb.y + mb.height),
        _ => Transform::translate(mb.x, mb.y),
    }
}

// =============================================================================
// Placement
// =============================================================================

/// Origin of a page stamp from position ratios.
///
/// Ratio 0 is flush with the left/bottom edge, 1 with the right/top edge.
pub fn page_stamp_origin(
    ratio_x: f32,
    ratio_y: f32,
    page_width: f32,
    page_height: f32,
    image_width: f32,
    image_height: f32,
) -> (f32, f32) {
    let rx = ratio_x.clamp(0.0, 1.0);
    let ry = ratio_y.clamp(0.0, 1.0);
    (
        (page_width - image_width) * rx,
        (page_height - image_height) * ry,
    )
}

/// Origin of a seam slice against one edge.
///
/// `offset_ratio` runs top to bottom on vertical edges and left to right on
/// horizontal ones.
pub fn seam_stamp_origin(
    side: SeamSide,
    offset_ratio: f32,
    page_width: f32,
    page_height: f32,
    image_width: f32,
    image_height: f32,
) -> (f32, f32) {
    let r = offset_ratio.clamp(0.0, 1.0);
    match side {
        SeamSide::Left => (0.0, (page_height - image_height) * (1.0 - r)),
        SeamSide::Right => (
            page_width - image_width,
            (page_height - image_height) * (1.0 - r),
        ),
        SeamSide::Top => ((page_width - image_width) * r, page_height - image_height),
        SeamSide::Bottom => ((page_width - image_width) * r, 0.0),
    }
}

/// Transform that maps the unit image square onto the placement, in user space.
pub fn placement_transform(placement: &StampPlacement, page: &PageBox) -> Transform {
    let rect: &Rect = &placement.rect;
    let centered = Transform::new(
        rect.width,
        0.0,
        0.0,
        rect.height,
        -rect.width / 2.0,
        -rect.height / 2.0,
    );
    let local = if placement.rotation_degrees.abs() > f32::EPSILON {
        centered.then(&Transform::rotate_degrees(placement.rotation_degrees))
    } else {
        centered
    };
    local
        .then(&Transform::translate(rect.center_x(), rect.center_y()))
        .then(&rendered_to_user(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    fn letter(rotation: u16) -> PageBox {
        PageBox {
            media_box: Rect::new(0.0, 0.0, 612.0, 792.0),
            rotation,
        }
    }

    #[test]
    fn test_scale_percent() {
        let scale = scale_percent(40.0, 200, 72.0);
        assert_close(scale, 56.69);
        assert_eq!(scale_percent(40.0, 0, 72.0), 0.0);

        // Backends with a finer grid scale proportionally
        assert_close(scale_percent(40.0, 200, 144.0), 2.0 * scale);
    }

    #[test]
    fn test_scaled_size() {
        let (w, h) = scaled_size(200, 100, 50.0);
        assert_close(w, 100.0);
        assert_close(h, 50.0);
    }

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(0), 0);
        assert_eq!(normalize_rotation(90), 90);
        assert_eq!(normalize_rotation(-90), 270);
        assert_eq!(normalize_rotation(450), 90);
        assert_eq!(normalize_rotation(-180), 180);
    }

    #[test]
    fn test_page_metrics_swap_for_quarter_turns() {
        assert_eq!(page_metrics(&letter(0)).width, 612.0);
        assert_eq!(page_metrics(&letter(180)).width, 612.0);
        assert_eq!(page_metrics(&letter(90)).width, 792.0);
        assert_eq!(page_metrics(&letter(270)).height, 612.0);
    }

    #[test]
    fn test_page_stamp_origin() {
        assert_eq!(page_stamp_origin(0.0, 0.0, 600.0, 800.0, 100.0, 50.0), (0.0, 0.0));
        assert_eq!(
            page_stamp_origin(1.0, 1.0, 600.0, 800.0, 100.0, 50.0),
            (500.0, 750.0)
        );
        assert_eq!(
            page_stamp_origin(0.5, 0.5, 600.0, 800.0, 100.0, 50.0),
            (250.0, 375.0)
        );
        // Out of range ratios clamp to the edges
        assert_eq!(
            page_stamp_origin(-1.0, 2.0, 600.0, 800.0, 100.0, 50.0),
            (0.0, 750.0)
        );
    }

    #[test]
    fn test_seam_origin_right_edge_ignores_offset() {
        for offset in [0.0, 0.25, 0.5, 1.0] {
            let (x, _) = seam_stamp_origin(SeamSide::Right, offset, 600.0, 800.0, 40.0, 120.0);
            assert_eq!(x, 560.0);
        }
        let (_, y) = seam_stamp_origin(SeamSide::Right, 0.5, 600.0, 800.0, 40.0, 120.0);
        assert_close(y, 340.0);
    }

    #[test]
    fn test_seam_origin_left_edge_offset_runs_downwards() {
        assert_eq!(
            seam_stamp_origin(SeamSide::Left, 0.0, 600.0, 800.0, 40.0, 120.0),
            (0.0, 680.0)
        );
        assert_eq!(
            seam_stamp_origin(SeamSide::Left, 1.0, 600.0, 800.0, 40.0, 120.0),
            (0.0, 0.0)
        );
    }

    #[test]
    fn test_seam_origin_horizontal_edges() {
        assert_eq!(
            seam_stamp_origin(SeamSide::Top, 0.0, 600.0, 800.0, 120.0, 40.0),
            (0.0, 760.0)
        );
        assert_eq!(
            seam_stamp_origin(SeamSide::Top, 1.0, 600.0, 800.0, 120.0, 40.0),
            (480.0, 760.0)
        );
        assert_eq!(
            seam_stamp_origin(SeamSide::Bottom, 0.5, 600.0, 800.0, 120.0, 40.0),
            (240.0, 0.0)
        );
    }

    #[test]
    fn test_rendered_to_user_corners() {
        // Rendered bottom-left of a 90° page is the user space bottom-right
        let t = rendered_to_user(&letter(90));
        let (x, y) = t.apply(0.0, 0.0);
        assert_close(x, 612.0);
        assert_close(y, 0.0);
        // Rendered top-right (792 wide, 612 tall) is the user space top-left
        let (x, y) = t.apply(792.0, 612.0);
        assert_close(x, 0.0);
        assert_close(y, 792.0);

        let t = rendered_to_user(&letter(270));
        let (x, y) = t.apply(0.0, 0.0);
        assert_close(x, 0.0);
        assert_close(y, 792.0);

        let t = rendered_to_user(&letter(180));
        let (x, y) = t.apply(0.0, 0.0);
        assert_close(x, 612.0);
        assert_close(y, 792.0);
    }

    #[test]
    fn test_rendered_to_user_honors_media_box_origin() {
        let page = PageBox {
            media_box: Rect::new(10.0, 20.0, 100.0, 200.0),
            rotation: 0,
        };
        assert_eq!(rendered_to_user(&page).apply(5.0, 5.0), (15.0, 25.0));
    }

    #[test]
    fn test_placement_transform_unrotated() {
        let placement = StampPlacement {
            page: 1,
            rect: Rect::new(100.0, 200.0, 50.0, 30.0),
            rotation_degrees: 0.0,
        };
        let t = placement_transform(&placement, &letter(0));
        let (x0, y0) = t.apply(0.0, 0.0);
        let (x1, y1) = t.apply(1.0, 1.0);
        assert_close(x0, 100.0);
        assert_close(y0, 200.0);
        assert_close(x1, 150.0);
        assert_close(y1, 230.0);
    }

    #[test]
    fn test_placement_transform_keeps_center_when_rotated() {
        let placement = StampPlacement {
            page: 1,
            rect: Rect::new(100.0, 200.0, 50.0, 30.0),
            rotation_degrees: 2.0,
        };
        let t = placement_transform(&placement, &letter(0));
        let (cx, cy) = t.apply(0.5, 0.5);
        assert_close(cx, 125.0);
        assert_close(cy, 215.0);
    }
}
