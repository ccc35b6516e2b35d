//! Analytic antialiasing model.
//!
//! Every primitive is rasterized as a single quad. The fragment stage evaluates a
//! signed distance `d` from the pixel centre to the shape boundary (negative inside)
//! and turns it into coverage with a linear ramp of half-width [`BLEND_RADIUS`]:
//!
//! - `d <= -blend`: fully covered
//! - `d >= blend`: discarded
//! - otherwise: `(blend - d) / (2 * blend)`
//!
//! The WGSL shaders in `quadra-wgpu` implement the same laws; [`Shape::coverage`]
//! is the CPU reference.

use glam::Vec2;

use crate::quad::{Quad, UvRect};

/// Half-width of the antialiasing band, shared by all shapes.
pub const BLEND_RADIUS: f32 = 0.5;

/// Offset that moves integer coordinates onto pixel centres.
pub const PIXEL_CENTER: Vec2 = Vec2::splat(0.5);

/// Rectangle edges used by the rectangle distance laws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edges {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Edges {
    fn from_top_left_size(top_left: Vec2, size: Vec2) -> Self {
        Self {
            left: top_left.x,
            right: top_left.x + size.x,
            top: top_left.y,
            bottom: top_left.y + size.y,
        }
    }

    /// Chebyshev-style outward distance to the four half-planes.
    fn outward_distance(&self, p: Vec2) -> f32 {
        (self.left - p.x)
            .max(p.x - self.right)
            .max((self.top - p.y).max(p.y - self.bottom))
    }
}

/// The shape kind plus every parameter its fragment law needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    FillCircle {
        center: Vec2,
        radius: f32,
    },
    /// Ring whose centre line runs at `radius`.
    StrokeCircle {
        center: Vec2,
        radius: f32,
        half_line_width: f32,
    },
    /// Segment from `origin` along the unit vector `dir`.
    Line {
        origin: Vec2,
        dir: Vec2,
        length: f32,
        half_line_width: f32,
    },
    FillRect {
        edges: Edges,
    },
    StrokeRect {
        edges: Edges,
        half_line_width: f32,
    },
    /// Texture sampled over `uv` (images and glyphs).
    Textured {
        uv: UvRect,
    },
}

/// Discriminant of [`Shape`], used to select a GPU pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    FillCircle,
    StrokeCircle,
    Line,
    FillRect,
    StrokeRect,
    Textured,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::FillCircle,
        ShapeKind::StrokeCircle,
        ShapeKind::Line,
        ShapeKind::FillRect,
        ShapeKind::StrokeRect,
        ShapeKind::Textured,
    ];
}

fn ceil_blend() -> f32 {
    BLEND_RADIUS.ceil()
}

/// Linear ramp across `[-blend, blend]`.
pub fn ramp(d: f32) -> f32 {
    if d <= -BLEND_RADIUS {
        1.0
    } else if d >= BLEND_RADIUS {
        0.0
    } else {
        (BLEND_RADIUS - d) / (2.0 * BLEND_RADIUS)
    }
}

impl Shape {
    /// Filled circle. Integer centres land on pixel centres.
    pub fn fill_circle(center: Vec2, radius: f32) -> (Shape, Quad) {
        let center = center + PIXEL_CENTER;
        let pad = radius.ceil() + ceil_blend();
        let bounds = Quad::new(
            center.x.floor() - pad,
            center.x.ceil() + pad,
            center.y.floor() - pad,
            center.y.ceil() + pad,
        );
        (Shape::FillCircle { center, radius }, bounds)
    }

    /// Outlined circle. The outermost visible radius is `radius + line_width / 2`.
    pub fn stroke_circle(center: Vec2, radius: f32, line_width: f32) -> (Shape, Quad) {
        let center = center + PIXEL_CENTER;
        let half_line_width = line_width / 2.0;
        let pad = half_line_width.ceil() + radius.ceil() + ceil_blend();
        let bounds = Quad::new(
            center.x.floor() - pad,
            center.x.ceil() + pad,
            center.y.floor() - pad,
            center.y.ceil() + pad,
        );
        (
            Shape::StrokeCircle {
                center,
                radius,
                half_line_width,
            },
            bounds,
        )
    }

    /// Line segment. Returns `None` for a zero-length segment, which draws nothing.
    pub fn line(from: Vec2, to: Vec2, line_width: f32) -> Option<(Shape, Quad)> {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }
        let dir = delta.normalize_or_zero();
        let origin = from + PIXEL_CENTER;
        let end = origin + delta;
        let half_line_width = line_width / 2.0;
        let pad = half_line_width.ceil() + ceil_blend();
        let bounds = Quad::new(
            origin.x.min(end.x).floor() - pad,
            origin.x.max(end.x).ceil() + pad,
            origin.y.min(end.y).floor() - pad,
            origin.y.max(end.y).ceil() + pad,
        );
        Some((
            Shape::Line {
                origin,
                dir,
                length,
                half_line_width,
            },
            bounds,
        ))
    }

    /// Filled rectangle. Edges are used as given so a rectangle at integer
    /// coordinates covers exactly `size` pixels.
    pub fn fill_rect(top_left: Vec2, size: Vec2) -> (Shape, Quad) {
        let edges = Edges::from_top_left_size(top_left, size);
        let pad = ceil_blend();
        let bounds = Quad::new(
            edges.left.floor() - pad,
            edges.right.ceil() + pad,
            edges.top.floor() - pad,
            edges.bottom.ceil() + pad,
        );
        (Shape::FillRect { edges }, bounds)
    }

    /// Outlined rectangle. The outline centre runs through the outermost pixel
    /// centres of `size`, so the visible size grows by `line_width - 1`.
    pub fn stroke_rect(top_left: Vec2, size: Vec2, line_width: f32) -> (Shape, Quad) {
        let edges = Edges::from_top_left_size(top_left + PIXEL_CENTER, size - Vec2::ONE);
        let half_line_width = line_width / 2.0;
        let pad = half_line_width.ceil() + ceil_blend();
        let bounds = Quad::new(
            edges.left.floor() - pad,
            edges.right.ceil() + pad,
            edges.top.floor() - pad,
            edges.bottom.ceil() + pad,
        );
        (
            Shape::StrokeRect {
                edges,
                half_line_width,
            },
            bounds,
        )
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::FillCircle { .. } => ShapeKind::FillCircle,
            Shape::StrokeCircle { .. } => ShapeKind::StrokeCircle,
            Shape::Line { .. } => ShapeKind::Line,
            Shape::FillRect { .. } => ShapeKind::FillRect,
            Shape::StrokeRect { .. } => ShapeKind::StrokeRect,
            Shape::Textured { .. } => ShapeKind::Textured,
        }
    }

    /// Signed distance from `p` to the boundary of the solid region.
    ///
    /// Stroked shapes measure the absolute deviation from their centre line minus
    /// the half line width. Textured quads have no boundary and report `-inf`.
    pub fn signed_distance(&self, p: Vec2) -> f32 {
        match *self {
            Shape::FillCircle { center, radius } => p.distance(center) - radius,
            Shape::StrokeCircle {
                center,
                radius,
                half_line_width,
            } => (radius - p.distance(center)).abs() - half_line_width,
            Shape::Line {
                origin,
                dir,
                length,
                half_line_width,
            } => {
                let t = dir.dot(p - origin);
                let dist = if t < 0.0 {
                    p.distance(origin)
                } else if t > length {
                    p.distance(origin + length * dir)
                } else {
                    p.distance(origin + t * dir)
                };
                dist - half_line_width
            }
            Shape::FillRect { edges } => edges.outward_distance(p),
            Shape::StrokeRect {
                edges,
                half_line_width,
            } => edges.outward_distance(p).abs() - half_line_width,
            Shape::Textured { .. } => f32::NEG_INFINITY,
        }
    }

    /// Coverage in `[0, 1]` of the sample at `p`.
    pub fn coverage(&self, p: Vec2) -> f32 {
        ramp(self.signed_distance(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(x: i32, y: i32) -> Vec2 {
        Vec2::new(x as f32, y as f32) + PIXEL_CENTER
    }

    #[test]
    fn test_ramp_clamps_and_is_monotonic() {
        assert_eq!(ramp(-0.5), 1.0);
        assert_eq!(ramp(-3.0), 1.0);
        assert_eq!(ramp(0.5), 0.0);
        assert_eq!(ramp(7.0), 0.0);
        assert_eq!(ramp(0.0), 0.5);

        let mut last = ramp(-BLEND_RADIUS);
        for i in 1..=100 {
            let d = -BLEND_RADIUS + i as f32 * (2.0 * BLEND_RADIUS / 100.0);
            let c = ramp(d);
            assert!(c <= last, "coverage rose at d = {d}");
            assert!((0.0..=1.0).contains(&c));
            last = c;
        }
    }

    #[test]
    fn test_fill_circle_bounds() {
        let (_, q) = Shape::fill_circle(Vec2::ZERO, 10.0);
        assert_eq!(q, Quad::new(-11.0, 12.0, -11.0, 12.0));
    }

    #[test]
    fn test_fill_circle_coverage() {
        let (shape, _) = Shape::fill_circle(Vec2::new(50.0, 50.0), 10.0);
        assert_eq!(shape.coverage(pixel(50, 50)), 1.0);
        assert_eq!(shape.coverage(pixel(50, 70)), 0.0);
        // exactly on the boundary
        assert_eq!(shape.coverage(pixel(60, 50)), 0.5);
    }

    #[test]
    fn test_zero_radius_circle_is_finite() {
        let (shape, q) = Shape::fill_circle(Vec2::new(5.0, 5.0), 0.0);
        assert_eq!(q, Quad::new(4.0, 7.0, 4.0, 7.0));
        let c = shape.coverage(pixel(5, 5));
        assert!(c.is_finite() && c <= 0.5);
        assert_eq!(shape.coverage(pixel(7, 5)), 0.0);
    }

    #[test]
    fn test_stroke_circle_ring() {
        let (shape, q) = Shape::stroke_circle(Vec2::new(100.0, 100.0), 20.0, 2.0);
        assert_eq!(q, Quad::new(78.0, 123.0, 78.0, 123.0));
        assert_eq!(shape.coverage(pixel(120, 100)), 1.0);
        assert_eq!(shape.coverage(pixel(100, 100)), 0.0);
        assert_eq!(shape.coverage(pixel(110, 100)), 0.0);
    }

    #[test]
    fn test_line_distance_segments() {
        let (shape, q) = Shape::line(Vec2::new(10.0, 10.0), Vec2::new(30.0, 10.0), 2.0).unwrap();
        assert_eq!(q, Quad::new(8.0, 33.0, 8.0, 13.0));
        // on the line
        assert_eq!(shape.coverage(pixel(20, 10)), 1.0);
        // perpendicular, far away
        assert_eq!(shape.coverage(pixel(20, 14)), 0.0);
        // beyond the end point: distance measured to the end point
        let beyond = pixel(33, 10);
        assert!((shape.signed_distance(beyond) - 2.0).abs() < 1e-5);
        // before the start point
        let before = pixel(7, 10);
        assert!((shape.signed_distance(before) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_length_line_is_dropped() {
        assert!(Shape::line(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0), 4.0).is_none());
    }

    #[test]
    fn test_fill_rect_bounds_and_coverage() {
        let (shape, q) = Shape::fill_rect(Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0));
        assert_eq!(q, Quad::new(9.0, 21.0, 9.0, 21.0));
        assert_eq!(shape.coverage(pixel(10, 10)), 1.0);
        assert_eq!(shape.coverage(pixel(19, 19)), 1.0);
        assert_eq!(shape.coverage(pixel(20, 15)), 0.0);
        assert_eq!(shape.coverage(pixel(9, 15)), 0.0);
    }

    #[test]
    fn test_stroke_rect_outline() {
        let (shape, q) = Shape::stroke_rect(Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0), 1.0);
        assert_eq!(q, Quad::new(8.0, 22.0, 8.0, 22.0));
        // outline pixels
        assert_eq!(shape.coverage(pixel(10, 15)), 1.0);
        assert_eq!(shape.coverage(pixel(19, 15)), 1.0);
        // interior and exterior
        assert_eq!(shape.coverage(pixel(15, 15)), 0.0);
        assert_eq!(shape.coverage(pixel(21, 15)), 0.0);
    }

    #[test]
    fn test_coverage_monotonic_along_ray() {
        let (shape, _) = Shape::fill_circle(Vec2::ZERO, 8.0);
        let center = PIXEL_CENTER;
        let mut last = 1.0;
        for i in 0..200 {
            let p = center + Vec2::new(7.0 + i as f32 * 0.01, 0.0);
            let c = shape.coverage(p);
            assert!(c <= last);
            last = c;
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_kind() {
        let (shape, _) = Shape::fill_rect(Vec2::ZERO, Vec2::ONE);
        assert_eq!(shape.kind(), ShapeKind::FillRect);
        let tex = Shape::Textured { uv: UvRect::FULL };
        assert_eq!(tex.kind(), ShapeKind::Textured);
    }
}
