//! Text layout shared by measuring and drawing.
//!
//! [`layout_string`] is the only place where glyph positions are computed.
//! [`measure_string`] runs it with an emitter that ignores glyphs and
//! [`Frame::draw_string`](crate::Frame::draw_string) runs it with an emitter that
//! records textured quads, so both always agree on advances, kerning and tab stops.

use glam::Vec2;

use crate::frame::TextureId;
use crate::quad::{Quad, UvRect};

pub const DEFAULT_TAB_SPACES: u32 = 8;

/// Per-call text options.
///
/// Zero values are treated as unset and replaced by the defaults
/// (`tab_spaces = 8`, `scale = 1`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawStringOptions {
    /// Width of a tab stop in (space advance + 1) units.
    pub tab_spaces: u32,
    pub scale: f32,
    /// Snap the draw position to whole pixels before layout.
    pub round_pos: bool,
}

impl Default for DrawStringOptions {
    fn default() -> Self {
        Self {
            tab_spaces: DEFAULT_TAB_SPACES,
            scale: 1.0,
            round_pos: false,
        }
    }
}

impl DrawStringOptions {
    pub fn with_tab_spaces(mut self, tab_spaces: u32) -> Self {
        self.tab_spaces = tab_spaces;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_round_pos(mut self, round_pos: bool) -> Self {
        self.round_pos = round_pos;
        self
    }

    /// Replace zero fields with their defaults.
    pub fn resolved(self) -> Self {
        let defaults = Self::default();
        Self {
            tab_spaces: if self.tab_spaces == 0 {
                defaults.tab_spaces
            } else {
                self.tab_spaces
            },
            scale: if self.scale == 0.0 {
                defaults.scale
            } else {
                self.scale
            },
            round_pos: self.round_pos,
        }
    }
}

/// Advance and atlas location of a single glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphMetrics {
    pub advance: f32,
    pub uv: UvRect,
}

/// Metrics a font must provide for layout.
pub trait FontMetrics {
    /// Vertical distance between two lines, unscaled.
    fn line_height(&self) -> f32;

    /// `None` for chars the font cannot render.
    fn glyph(&self, ch: char) -> Option<GlyphMetrics>;

    /// Offset added between `left` and a directly following `right`, unscaled.
    fn kerning(&self, left: char, right: char) -> f32;

    /// Advance of the space glyph, 0 when the font has none.
    fn space_advance(&self) -> f32 {
        self.glyph(' ').map_or(0.0, |g| g.advance)
    }
}

/// A font whose atlas lives in a texture the renderer knows about.
pub trait TexturedFont: FontMetrics {
    fn texture(&self) -> TextureId;
}

/// One glyph quad produced by layout, relative to the draw origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub ch: char,
    pub quad: Quad,
    pub uv: UvRect,
}

/// Split on `\n`, `\r\n` and lone `\r`.
///
/// An empty string (or a trailing line break) still yields an empty line,
/// which counts towards the measured height.
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::to_owned)
        .collect()
}

/// Lay out `text` and hand every visible glyph to `emit`. Returns the measured size.
pub fn layout_string<F, E>(text: &str, font: &F, opts: DrawStringOptions, mut emit: E) -> Vec2
where
    F: FontMetrics + ?Sized,
    E: FnMut(PlacedGlyph),
{
    let opts = opts.resolved();
    let scale = opts.scale;
    let line_height = font.line_height();
    let tab_width = (font.space_advance() + 1.0) * opts.tab_spaces as f32;

    let lines = split_lines(text);
    let mut max_width = 0.0f32;

    for (index, line) in lines.iter().enumerate() {
        let y = scale * index as f32 * line_height;
        let mut x = 0.0f32;
        let mut previous: Option<char> = None;

        for ch in line.chars() {
            if ch == '\t' {
                x = ((x / tab_width).floor() + 1.0) * tab_width;
                previous = None;
                continue;
            }

            let Some(glyph) = font.glyph(ch) else {
                continue;
            };

            if let Some(prev) = previous {
                x += scale * font.kerning(prev, ch);
            }

            emit(PlacedGlyph {
                ch,
                quad: Quad::new(x, x + scale * glyph.advance, y, y + scale * line_height),
                uv: glyph.uv,
            });

            x += scale * glyph.advance;
            previous = Some(ch);
        }

        max_width = max_width.max(x);
    }

    Vec2::new(max_width, scale * lines.len() as f32 * line_height)
}

/// Size of `text` as it would be drawn with `font` and `opts`.
pub fn measure_string<F>(text: &str, font: &F, opts: DrawStringOptions) -> Vec2
where
    F: FontMetrics + ?Sized,
{
    layout_string(text, font, opts, |_| {})
}

#[cfg(test)]
pub(crate) mod test_font {
    use std::collections::HashMap;

    use super::*;

    /// Font with hand-picked advances used across the crate's tests.
    pub struct TestFont {
        pub line_height: f32,
        pub advances: HashMap<char, f32>,
        pub kerning: HashMap<(char, char), f32>,
    }

    impl TestFont {
        pub fn new(line_height: f32, advances: &[(char, f32)]) -> Self {
            Self {
                line_height,
                advances: advances.iter().copied().collect(),
                kerning: HashMap::new(),
            }
        }

        pub fn with_kerning(mut self, left: char, right: char, offset: f32) -> Self {
            self.kerning.insert((left, right), offset);
            self
        }
    }

    impl FontMetrics for TestFont {
        fn line_height(&self) -> f32 {
            self.line_height
        }

        fn glyph(&self, ch: char) -> Option<GlyphMetrics> {
            self.advances.get(&ch).map(|&advance| GlyphMetrics {
                advance,
                uv: UvRect::FULL,
            })
        }

        fn kerning(&self, left: char, right: char) -> f32 {
            self.kerning.get(&(left, right)).copied().unwrap_or(0.0)
        }
    }

    impl TexturedFont for TestFont {
        fn texture(&self) -> TextureId {
            TextureId(7)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_font::TestFont;
    use super::*;

    fn ab_font() -> TestFont {
        TestFont::new(10.0, &[('A', 6.0), ('B', 7.0), (' ', 3.0)]).with_kerning('A', 'B', -1.0)
    }

    fn collect(text: &str, font: &TestFont, opts: DrawStringOptions) -> (Vec<PlacedGlyph>, Vec2) {
        let mut glyphs = Vec::new();
        let size = layout_string(text, font, opts, |g| glyphs.push(g));
        (glyphs, size)
    }

    #[test]
    fn test_options_resolve_zero_fields() {
        let opts = DrawStringOptions {
            tab_spaces: 0,
            scale: 0.0,
            round_pos: true,
        }
        .resolved();
        assert_eq!(opts.tab_spaces, 8);
        assert_eq!(opts.scale, 1.0);
        assert!(opts.round_pos);
    }

    #[test]
    fn test_kerned_pair() {
        let font = ab_font();
        let (glyphs, size) = collect("AB", &font, DrawStringOptions::default());
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[0].quad.left, 0.0);
        assert_eq!(glyphs[1].quad.left, 5.0);
        assert_eq!(size, Vec2::new(12.0, 10.0));
        assert_eq!(measure_string("AB", &font, DrawStringOptions::default()).x, 12.0);
    }

    #[test]
    fn test_kerning_is_scaled() {
        let font = ab_font();
        let opts = DrawStringOptions::default().with_scale(2.0);
        let (glyphs, size) = collect("AB", &font, opts);
        assert_eq!(glyphs[1].quad.left, 10.0);
        assert_eq!(glyphs[1].quad.width(), 14.0);
        assert_eq!(size, Vec2::new(24.0, 20.0));
    }

    #[test]
    fn test_kerning_chains_through_string() {
        let font = ab_font();
        // previous must advance, so both AB pairs kern
        let (glyphs, _) = collect("ABAB", &font, DrawStringOptions::default());
        let lefts: Vec<f32> = glyphs.iter().map(|g| g.quad.left).collect();
        assert_eq!(lefts, vec![0.0, 5.0, 12.0, 17.0]);
    }

    #[test]
    fn test_tab_stops_are_multiples() {
        let font = ab_font();
        let opts = DrawStringOptions::default().with_tab_spaces(4);
        let tab = 4.0 * (3.0 + 1.0);
        for text in ["\tA", "A\tB", "AAB\tA", "AAAAA\tB", "\t\tA"] {
            let (glyphs, _) = collect(text, &font, opts);
            let after_tab = glyphs.last().unwrap().quad.left;
            assert_eq!(after_tab % tab, 0.0, "{text:?}");
            assert!(after_tab > 0.0);
        }
    }

    #[test]
    fn test_tab_on_stop_moves_to_next() {
        let font = ab_font();
        let opts = DrawStringOptions::default().with_tab_spaces(1);
        // tab width 4; two tabs land at 4 then 8
        let (glyphs, size) = collect("\t\tA", &font, opts);
        assert_eq!(glyphs[0].quad.left, 8.0);
        assert_eq!(size.x, 14.0);
    }

    #[test]
    fn test_tab_resets_kerning() {
        let font = ab_font();
        let opts = DrawStringOptions::default().with_tab_spaces(1);
        let (glyphs, _) = collect("A\tB", &font, opts);
        assert_eq!(glyphs[1].quad.left, 8.0);
    }

    #[test]
    fn test_unsupported_chars_are_skipped() {
        let font = ab_font();
        let (glyphs, size) = collect("A?B", &font, DrawStringOptions::default());
        assert_eq!(glyphs.len(), 2);
        // previous stays 'A' across the skipped char
        assert_eq!(glyphs[1].quad.left, 5.0);
        assert_eq!(size.x, 12.0);
    }

    #[test]
    fn test_multiple_lines() {
        let font = ab_font();
        let (glyphs, size) = collect("A\r\nBB\rA\nAB", &font, DrawStringOptions::default());
        assert_eq!(size, Vec2::new(14.0, 40.0));
        assert_eq!(glyphs[1].quad.top, 10.0);
        assert_eq!(glyphs[3].quad.top, 20.0);
        assert_eq!(glyphs[4].quad.top, 30.0);
    }

    #[test]
    fn test_empty_string_has_one_line() {
        let font = ab_font();
        assert_eq!(
            measure_string("", &font, DrawStringOptions::default()),
            Vec2::new(0.0, 10.0)
        );
    }

    #[test]
    fn test_missing_space_glyph() {
        let font = TestFont::new(10.0, &[('A', 6.0)]);
        let opts = DrawStringOptions::default().with_tab_spaces(2);
        // space advance falls back to 0, so a stop every 2 px
        let (glyphs, _) = collect("A\tA", &font, opts);
        assert_eq!(glyphs[1].quad.left, 8.0);
    }
}
