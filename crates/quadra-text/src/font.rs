use image::RgbaImage;
use quadra::{FontMetrics, GlyphMetrics};

use crate::atlas::build_atlas;
use crate::tables::GlyphTable;
use crate::{FontResult, GlyphSource};

/// A font held in main memory: the RGBA atlas plus its glyph table.
///
/// The atlas only carries shape information in its alpha channel; every texel's
/// color is white so tinted text stays clean under linear filtering.
#[derive(Clone, Debug)]
pub struct BitmapFont {
    image: RgbaImage,
    table: GlyphTable,
}

impl BitmapFont {
    /// Render `alphabet` from `source` into a new atlas.
    pub fn from_source<S>(source: &mut S, alphabet: &str) -> FontResult<Self>
    where
        S: GlyphSource + ?Sized,
    {
        build_atlas(source, alphabet)
    }

    pub(crate) fn new(image: RgbaImage, table: GlyphTable) -> Self {
        Self { image, table }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn table(&self) -> &GlyphTable {
        &self.table
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_parts(self) -> (RgbaImage, GlyphTable) {
        (self.image, self.table)
    }
}

impl FontMetrics for BitmapFont {
    fn line_height(&self) -> f32 {
        self.table.line_height()
    }

    fn glyph(&self, ch: char) -> Option<GlyphMetrics> {
        self.table.glyph(ch)
    }

    fn kerning(&self, left: char, right: char) -> f32 {
        self.table.kerning(left, right)
    }
}
