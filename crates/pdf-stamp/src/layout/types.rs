//! Layout data types for stamping
//!
//! These types represent the intermediate layout calculations between
//! option resolution and PDF rendering.

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center x coordinate
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Center y coordinate
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Geometry of a source page as read from the page tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// MediaBox in unrotated user space
    pub media_box: Rect,
    /// Intrinsic `/Rotate`, normalized to 0, 90, 180 or 270
    pub rotation: u16,
}

/// Page size as seen by a reader, after `/Rotate` is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub width: f32,
    pub height: f32,
}

/// A 2D affine transform in PDF `cm` operand order `[a b c d e f]`
///
/// Points are row vectors: `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translate(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Counter-clockwise rotation
    pub fn rotate_degrees(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Apply `self` first, then `next`
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            e: self.e * next.a + self.f * next.c + next.e,
            f: self.e * next.b + self.f * next.d + next.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Format as a content stream `cm` operator
    pub fn to_cm(&self) -> String {
        format!(
            "{:.4} {:.4} {:.4} {:.4} {:.4} {:.4} cm",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

/// One column range of the stamp bitmap assigned to a seam page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSpan {
    /// First pixel column
    pub start: u32,
    /// Width in pixels, never zero
    pub width: u32,
}

impl SliceSpan {
    pub fn new(start: u32, width: u32) -> Self {
        Self { start, width }
    }

    /// One past the last pixel column
    pub fn end(&self) -> u32 {
        self.start + self.width
    }
}

/// Final placement of one stamp on one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampPlacement {
    /// 1-based page number
    pub page: u32,
    /// Drawn area in rendered page space
    pub rect: Rect,
    /// Extra counter-clockwise rotation about the rect center
    pub rotation_degrees: f32,
}
