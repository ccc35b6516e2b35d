//! `cosmic-text` glyph source.
//!
//! Advances come from shaping single chars, kerning from shaping pairs, and glyph
//! masks are rasterized by swash and blitted onto the baseline of the cell.

use std::collections::HashMap;
use std::sync::Arc;

use cosmic_text::{
    fontdb, Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent,
};
use image::RgbaImage;

use crate::GlyphSource;

/// Kerning below this magnitude is treated as shaping noise.
const KERNING_EPSILON: f32 = 1e-3;

/// Glyph source backed by a `cosmic-text` [`FontSystem`].
pub struct CosmicFace {
    font_system: FontSystem,
    swash_cache: SwashCache,
    metrics: Metrics,
    family: Option<String>,
    advances: HashMap<char, Option<f32>>,
}

impl CosmicFace {
    /// Use the system fonts, selecting `family` (or the default sans-serif family).
    pub fn new(font_system: FontSystem, font_px: f32, family: Option<String>) -> Self {
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            metrics: Metrics::new(font_px, (font_px * 1.2).ceil()),
            family,
            advances: HashMap::new(),
        }
    }

    /// Use the fonts installed on the system with the default sans-serif family.
    pub fn with_system_fonts(font_px: f32) -> Self {
        Self::new(FontSystem::new(), font_px, None)
    }

    /// Load a font file (TTF/OTF bytes) and render with its first face.
    pub fn from_font_data(data: Vec<u8>, font_px: f32) -> Self {
        let mut font_system = FontSystem::new();
        let ids = font_system
            .db_mut()
            .load_font_source(fontdb::Source::Binary(Arc::new(data)));
        let family = ids
            .first()
            .and_then(|id| font_system.db().face(*id))
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone());
        if family.is_none() {
            log::warn!("font data contained no usable face, falling back to system fonts");
        }
        Self::new(font_system, font_px, family)
    }

    fn shape(&mut self, text: &str) -> Buffer {
        let mut buffer = Buffer::new(&mut self.font_system, self.metrics);
        buffer.set_size(&mut self.font_system, None, None);
        let attrs = match &self.family {
            Some(name) => Attrs::new().family(Family::Name(name)),
            None => Attrs::new().family(Family::SansSerif),
        };
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    /// Total advance of `text`, `None` when any glyph is missing from the font.
    fn shaped_width(&mut self, text: &str) -> Option<f32> {
        let buffer = self.shape(text);
        let run = buffer.layout_runs().next()?;
        if run.glyphs.is_empty() || run.glyphs.iter().any(|g| g.glyph_id == 0) {
            return None;
        }
        Some(run.glyphs.iter().map(|g| g.w).sum())
    }
}

impl GlyphSource for CosmicFace {
    fn line_height(&self) -> f32 {
        self.metrics.line_height
    }

    fn advance(&mut self, ch: char) -> Option<f32> {
        if let Some(&cached) = self.advances.get(&ch) {
            return cached;
        }
        let advance = self.shaped_width(ch.encode_utf8(&mut [0; 4]));
        self.advances.insert(ch, advance);
        advance
    }

    fn kerning(&mut self, left: char, right: char) -> f32 {
        let (Some(l), Some(r)) = (self.advance(left), self.advance(right)) else {
            return 0.0;
        };
        let pair: String = [left, right].iter().collect();
        let Some(width) = self.shaped_width(&pair) else {
            return 0.0;
        };
        let offset = width - l - r;
        if offset.abs() < KERNING_EPSILON {
            0.0
        } else {
            offset
        }
    }

    fn render(&mut self, ch: char, cell: &mut RgbaImage) {
        let buffer = self.shape(ch.encode_utf8(&mut [0; 4]));
        let Some(run) = buffer.layout_runs().next() else {
            return;
        };
        let baseline = run.line_y;

        for glyph in run.glyphs.iter() {
            let physical = glyph.physical((0.0, baseline), 1.0);
            let Some(image) = self
                .swash_cache
                .get_image(&mut self.font_system, physical.cache_key)
                .as_ref()
            else {
                continue;
            };

            let placement = image.placement;
            let origin_x = physical.x + placement.left;
            let origin_y = physical.y - placement.top;

            for py in 0..placement.height {
                for px in 0..placement.width {
                    let x = origin_x + px as i32;
                    let y = origin_y + py as i32;
                    if x < 0 || y < 0 || x as u32 >= cell.width() || y as u32 >= cell.height() {
                        continue;
                    }
                    let i = (py * placement.width + px) as usize;
                    let alpha = match image.content {
                        SwashContent::Mask => image.data.get(i).copied(),
                        SwashContent::Color => image.data.get(i * 4 + 3).copied(),
                        SwashContent::SubpixelMask => image.data.get(i * 4).copied(),
                    };
                    let Some(alpha) = alpha else {
                        continue;
                    };
                    let pixel = cell.get_pixel_mut(x as u32, y as u32);
                    pixel.0 = [255, 255, 255, pixel.0[3].max(alpha)];
                }
            }
        }
    }
}
