//! # quadra
//!
//! Immediate-mode 2D drawing with analytic antialiasing.
//!
//! This crate holds the backend-agnostic part: geometry and clipping, the
//! per-shape coverage model, text layout and the per-frame [`Frame`] that records
//! [`DrawCommand`]s. Rasterization is handled by backend crates such as
//! `quadra-wgpu`.

mod color;
mod frame;
mod quad;
pub mod shape;
pub mod text;

pub use color::*;
pub use frame::*;
pub use quad::*;
pub use shape::{Shape, ShapeKind, BLEND_RADIUS};
pub use text::{
    layout_string, measure_string, DrawStringOptions, FontMetrics, GlyphMetrics, PlacedGlyph,
    TexturedFont,
};

pub use glam::Vec2;
