use std::sync::Arc;

use quadra::{FontMetrics, GlyphMetrics, TextureId, TexturedFont};
use quadra_text::GlyphTable;

/// A font whose atlas lives on the GPU.
///
/// Cloning is cheap and shares the glyph table. The atlas texture stays alive
/// until the font is passed to [`Renderer::destroy_font`](crate::Renderer::destroy_font).
#[derive(Clone, Debug)]
pub struct Font {
    texture: TextureId,
    table: Arc<GlyphTable>,
}

impl Font {
    pub(crate) fn new(texture: TextureId, table: GlyphTable) -> Self {
        Self {
            texture,
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &GlyphTable {
        &self.table
    }

    /// Whether both fonts draw from the same atlas texture.
    pub fn shares_atlas(&self, other: &Font) -> bool {
        self.texture == other.texture
    }
}

impl FontMetrics for Font {
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

impl TexturedFont for Font {
    fn texture(&self) -> TextureId {
        self.texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadra::{measure_string, Color, DrawStringOptions, Frame, Vec2};
    use quadra_text::{BitmapFont, BuiltinFace};

    #[test]
    fn test_gpu_font_draws_with_its_texture() {
        let bitmap = BitmapFont::from_source(&mut BuiltinFace::new(), "ab").unwrap();
        let (_, table) = bitmap.into_parts();
        let font = Font::new(TextureId(4), table);

        let mut frame = Frame::begin(800, 600);
        let opts = DrawStringOptions::default();
        let size = frame.draw_string("ab a", Vec2::new(5.0, 5.0), &font, Color::WHITE, opts);
        // space is not in the alphabet and is skipped
        assert_eq!(frame.commands().len(), 3);
        assert!(frame
            .commands()
            .iter()
            .all(|c| c.texture == Some(TextureId(4))));
        assert_eq!(size, measure_string("ab a", &font, opts));
        assert_eq!(size.y, font.line_height());
    }

    #[test]
    fn test_clones_share_atlas() {
        let bitmap = BitmapFont::from_source(&mut BuiltinFace::new(), "ab").unwrap();
        let (_, table) = bitmap.into_parts();
        let font = Font::new(TextureId(1), table.clone());
        let other = Font::new(TextureId(2), table);
        assert!(font.shares_atlas(&font.clone()));
        assert!(!font.shares_atlas(&other));
    }
}
