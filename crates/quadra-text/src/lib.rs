//! CPU-side bitmap fonts for `quadra`.
//!
//! A [`GlyphSource`] reports metrics and renders single glyphs. The atlas builder
//! packs an alphabet of those glyphs into one power-of-two RGBA image and records
//! every glyph's UV rect, advance and kerning in a [`GlyphTable`]. The result is a
//! [`BitmapFont`], which can be exported to and imported from a PNG + JSON pair.
//!
//! Sources:
//! - [`BuiltinFace`]: procedural face, no font file needed.
//! - [`cosmic::CosmicFace`] (feature `cosmic`): any font `cosmic-text` can load.
//!
//! GPU upload belongs to backend crates (e.g. `quadra-wgpu`).

use image::RgbaImage;

pub mod atlas;
mod builtin;
#[cfg(feature = "cosmic")]
pub mod cosmic;
mod error;
mod export;
mod font;
pub mod tables;

pub use atlas::{build_atlas, next_power_of_two, AtlasLayout, DEFAULT_ALPHABET, MAX_ATLAS_DIMENSION};
pub use builtin::BuiltinFace;
pub use error::{FontError, FontResult};
pub use export::FontMetadata;
pub use font::BitmapFont;
pub use tables::{CharIndex, GlyphEntry, GlyphTable};

/// Something that can measure and render individual glyphs.
pub trait GlyphSource {
    /// Vertical distance between two lines in pixels.
    fn line_height(&self) -> f32;

    /// Horizontal advance of `ch`, `None` if the source cannot render it.
    fn advance(&mut self, ch: char) -> Option<f32>;

    /// Offset to add between `left` and a directly following `right`.
    fn kerning(&mut self, _left: char, _right: char) -> f32 {
        0.0
    }

    /// Render `ch` into `cell` with its top-left corner at the cell origin.
    ///
    /// The cell is `ceil(advance)` x `ceil(line_height)` pixels and starts fully
    /// transparent. Only the alpha channel is kept.
    fn render(&mut self, ch: char, cell: &mut RgbaImage);
}
