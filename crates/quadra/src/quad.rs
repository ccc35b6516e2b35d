//! Axis-aligned quads in screen pixel space and clipping against the active clip region.

use glam::Vec2;

/// Axis-aligned rectangle in screen pixels (top-left origin, y grows down).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Quad {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Quad {
    pub const fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn from_top_left_size(top_left: Vec2, size: Vec2) -> Self {
        Self::new(
            top_left.x,
            top_left.x + size.x,
            top_left.y,
            top_left.y + size.y,
        )
    }

    /// Quad covering a canvas of `width` x `height` pixels.
    ///
    /// The right and bottom edges sit on the last pixel row/column, matching
    /// the clip region installed at the start of each frame.
    pub fn full_canvas(width: u32, height: u32) -> Self {
        Self::new(0.0, width as f32 - 1.0, 0.0, height as f32 - 1.0)
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.right, self.bottom)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.right - self.left, self.bottom - self.top)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Inclusive point containment.
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= self.left && pos.x <= self.right && pos.y >= self.top && pos.y <= self.bottom
    }

    /// Returns false only when the quad lies entirely on one side of `clip`.
    ///
    /// Touching edges count as overlap.
    pub fn intersects(&self, clip: &Quad) -> bool {
        !(self.right < clip.left
            || self.bottom < clip.top
            || self.left > clip.right
            || self.top > clip.bottom)
    }

    /// Clamp every edge into `clip`.
    pub fn clamp_to(&self, clip: &Quad) -> Quad {
        Quad::new(
            self.left.max(clip.left),
            self.right.min(clip.right),
            self.top.max(clip.top),
            self.bottom.min(clip.bottom),
        )
    }

    /// Re-interpolate `uv` for the part of this quad that survives clamping to `clip`.
    ///
    /// Only edges that are actually cut move; the new coordinate is placed at the
    /// fractional position of the clip boundary within the original span so the
    /// visible texels are not stretched.
    pub fn clamp_uv(&self, clip: &Quad, uv: UvRect) -> UvRect {
        let span_u = uv.max.x - uv.min.x;
        let span_v = uv.max.y - uv.min.y;
        let w = self.width();
        let h = self.height();

        let mut out = uv;
        if w > 0.0 {
            if self.left < clip.left {
                out.min.x = uv.min.x + (clip.left - self.left) / w * span_u;
            }
            if self.right > clip.right {
                out.max.x = uv.min.x + (clip.right - self.left) / w * span_u;
            }
        }
        if h > 0.0 {
            if self.top < clip.top {
                out.min.y = uv.min.y + (clip.top - self.top) / h * span_v;
            }
            if self.bottom > clip.bottom {
                out.max.y = uv.min.y + (clip.bottom - self.top) / h * span_v;
            }
        }
        out
    }

    /// Largest quad with the given aspect ratio (width / height) centred inside `self`.
    ///
    /// Used for letterboxing composed content.
    pub fn shrink_and_center_inside(&self, aspect_ratio: f32) -> Quad {
        let qw = self.width();
        let qh = self.height();
        let (w, h) = if qw / qh < aspect_ratio {
            (qw, qw / aspect_ratio)
        } else {
            (aspect_ratio * qh, qh)
        };
        let x = self.left + (qw - w) / 2.0;
        let y = self.top + (qh - h) / 2.0;
        Quad::new(x, x + w, y, y + h)
    }

    /// Scale the quad while keeping its centre in place.
    pub fn scale_centered(&self, factor: f32) -> Quad {
        let dw = (self.width() * factor - self.width()) / 2.0;
        let dh = (self.height() * factor - self.height()) / 2.0;
        Quad::new(
            self.left - dw,
            self.right + dw,
            self.top - dh,
            self.bottom + dh,
        )
    }
}

/// UV rectangle (normalized texture coords).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: UvRect = UvRect::new(Vec2::ZERO, Vec2::ONE);

    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Interpret a quad given in normalized texture space as a UV rectangle.
    pub fn from_quad(q: &Quad) -> Self {
        Self::new(q.top_left(), q.bottom_right())
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}
