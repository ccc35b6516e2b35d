//! Grid packing of pre-rendered glyphs into one power-of-two texture.
//!
//! Every glyph occupies a cell of `ceil(max_advance + 1)` x `ceil(line_height + 1)`
//! pixels, leaving at least one transparent pixel between neighbours so linear
//! filtering never bleeds. Cells are filled row by row in alphabet order.

use image::{imageops, RgbaImage};
use quadra::{UvRect, Vec2};

use crate::font::BitmapFont;
use crate::tables::{GlyphEntry, GlyphTable};
use crate::{FontError, FontResult, GlyphSource};

/// Chars rendered into the default font.
pub const DEFAULT_ALPHABET: &str = " abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZäöüÄÖÜ0123456789!\"§$%&/()=?,.-+#;:_*'<>|\\´`^°µ@€²³{}[]~";

/// Largest atlas edge length accepted by the builder.
pub const MAX_ATLAS_DIMENSION: u32 = 16384;

/// Smallest power of two that is `>= value`; 0 stays 0.
pub fn next_power_of_two(value: u64) -> u64 {
    if value == 0 {
        0
    } else {
        value.next_power_of_two()
    }
}

/// Grid geometry of an atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    pub glyphs_per_line: u32,
    pub line_count: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasLayout {
    /// Compute the grid for `glyph_count` glyphs.
    pub fn compute(glyph_count: usize, max_glyph_width: f32, line_height: f32) -> FontResult<Self> {
        if glyph_count == 0 {
            return Err(FontError::NoSupportedGlyphs);
        }
        let count = glyph_count as u64;
        let cell_width = ((max_glyph_width.max(0.0) + 1.0).ceil() as u64).max(1);
        let cell_height = ((line_height.max(0.0) + 1.0).ceil() as u64).max(1);

        // First guess: a square grid.
        let per_line = (count as f64).sqrt().ceil() as u64;
        let min_width = cell_width.saturating_mul(per_line).saturating_add(1);
        check_dimensions(min_width, 1)?;
        let width = next_power_of_two(min_width);

        // Power-of-two rounding leaves slack, so fit as many cells as possible per line.
        let per_line = ((width - 1) / cell_width).max(1);
        let line_count = count.div_ceil(per_line);
        let min_height = cell_height.saturating_mul(line_count).saturating_add(1);
        check_dimensions(width, min_height)?;
        let height = next_power_of_two(min_height);
        check_dimensions(width, height)?;

        Ok(Self {
            glyphs_per_line: per_line as u32,
            line_count: line_count as u32,
            cell_width: cell_width as u32,
            cell_height: cell_height as u32,
            width: width as u32,
            height: height as u32,
        })
    }

    /// Top-left texel of the glyph at `index`, one pixel inside its cell.
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        let col = index % self.glyphs_per_line;
        let row = index / self.glyphs_per_line;
        (1 + col * self.cell_width, 1 + row * self.cell_height)
    }
}

fn check_dimensions(width: u64, height: u64) -> FontResult<()> {
    let max = MAX_ATLAS_DIMENSION as u64;
    if width > max || height > max {
        return Err(FontError::AtlasTooLarge {
            width: width.min(u32::MAX as u64) as u32,
            height: height.min(u32::MAX as u64) as u32,
        });
    }
    Ok(())
}

/// Measure, pack and render `alphabet` from `source`.
///
/// Chars the source cannot render are logged and left out. Duplicate chars are
/// only packed once.
pub fn build_atlas<S>(source: &mut S, alphabet: &str) -> FontResult<BitmapFont>
where
    S: GlyphSource + ?Sized,
{
    let line_height = source.line_height();

    let mut supported: Vec<(char, f32)> = Vec::new();
    let mut max_glyph_width = 0.0f32;
    for ch in alphabet.chars() {
        if supported.iter().any(|&(c, _)| c == ch) {
            continue;
        }
        match source.advance(ch) {
            Some(advance) => {
                let advance = advance.max(0.0);
                max_glyph_width = max_glyph_width.max(advance);
                supported.push((ch, advance));
            }
            None => log::warn!(
                "char {:?} (U+{:04X}) not supported by glyph source",
                ch,
                ch as u32
            ),
        }
    }

    let layout = AtlasLayout::compute(supported.len(), max_glyph_width, line_height)?;
    log::debug!(
        "font atlas: {} glyphs (max glyph {}x{}) in {}x{} grid -> {}x{} texture",
        supported.len(),
        max_glyph_width,
        line_height,
        layout.glyphs_per_line,
        layout.line_count,
        layout.width,
        layout.height
    );

    let tex_size = Vec2::new(layout.width as f32, layout.height as f32);
    let glyph_height = line_height.max(0.0).ceil() as u32;
    let mut image = RgbaImage::new(layout.width, layout.height);
    let mut table = GlyphTable::new(line_height);

    for (index, &(ch, advance)) in supported.iter().enumerate() {
        let (left, top) = layout.cell_origin(index);
        let glyph_width = advance.ceil() as u32;

        let mut cell = RgbaImage::new(glyph_width, glyph_height);
        source.render(ch, &mut cell);
        imageops::replace(&mut image, &cell, left as i64, top as i64);

        let min = Vec2::new(left as f32, top as f32);
        let max = Vec2::new((left + glyph_width) as f32, (top + glyph_height) as f32);
        table.insert(GlyphEntry {
            ch,
            advance,
            uv: UvRect::new(min / tex_size, max / tex_size),
        });
    }

    for &(left, _) in &supported {
        for &(right, _) in &supported {
            let offset = source.kerning(left, right);
            if offset != 0.0 {
                table.set_kerning(left, right, offset);
            }
        }
    }

    // Only alpha carries the glyph shapes.
    for pixel in image.pixels_mut() {
        pixel.0[0] = 255;
        pixel.0[1] = 255;
        pixel.0[2] = 255;
    }

    Ok(BitmapFont::new(image, table))
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::BuiltinFace;

    /// Proportional test source: advance grows with the char's position in the
    /// alphabet, digits are unsupported and `A`/`V` kern.
    struct StepSource {
        line_height: f32,
    }

    impl GlyphSource for StepSource {
        fn line_height(&self) -> f32 {
            self.line_height
        }

        fn advance(&mut self, ch: char) -> Option<f32> {
            if ch.is_ascii_digit() {
                return None;
            }
            Some(2.0 + (ch as u32 % 7) as f32 + 0.5)
        }

        fn kerning(&mut self, left: char, right: char) -> f32 {
            if (left, right) == ('A', 'V') {
                -1.0
            } else {
                0.0
            }
        }

        fn render(&mut self, _ch: char, cell: &mut RgbaImage) {
            for pixel in cell.pixels_mut() {
                *pixel = Rgba([0, 0, 0, 200]);
            }
        }
    }

    fn pixel_rect(entry: &GlyphEntry, font: &BitmapFont) -> (f32, f32, f32, f32) {
        let w = font.width() as f32;
        let h = font.height() as f32;
        (
            entry.uv.min.x * w,
            entry.uv.max.x * w,
            entry.uv.min.y * h,
            entry.uv.max.y * h,
        )
    }

    fn assert_valid_packing(font: &BitmapFont) {
        assert!(font.width().is_power_of_two());
        assert!(font.height().is_power_of_two());
        let rects: Vec<_> = font
            .table()
            .glyphs()
            .iter()
            .map(|e| pixel_rect(e, font))
            .collect();
        for (i, a) in rects.iter().enumerate() {
            assert!(a.0 >= 0.0 && a.1 <= font.width() as f32);
            assert!(a.2 >= 0.0 && a.3 <= font.height() as f32);
            for b in &rects[i + 1..] {
                let overlap = a.0 < b.1 && b.0 < a.1 && a.2 < b.3 && b.2 < a.3;
                assert!(!overlap, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_next_power_of_two() {
        assert_eq!(next_power_of_two(0), 0);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(64), 64);
        assert_eq!(next_power_of_two(65), 128);
    }

    #[test]
    fn test_layout_refines_glyphs_per_line() {
        // 110 glyphs of width 7 in 12px lines:
        // sqrt -> 11 per line -> 1 + 8 * 11 = 89 -> 128 wide -> 15 per line
        let layout = AtlasLayout::compute(110, 7.0, 12.0).unwrap();
        assert_eq!(layout.width, 128);
        assert_eq!(layout.glyphs_per_line, 15);
        assert_eq!(layout.line_count, 8);
        assert_eq!(layout.height, 128);
        assert_eq!(layout.cell_origin(0), (1, 1));
        assert_eq!(layout.cell_origin(16), (9, 14));
    }

    #[test]
    fn test_layout_errors() {
        assert!(matches!(
            AtlasLayout::compute(0, 7.0, 12.0),
            Err(FontError::NoSupportedGlyphs)
        ));
        assert!(matches!(
            AtlasLayout::compute(100, 5000.0, 12.0),
            Err(FontError::AtlasTooLarge { .. })
        ));
    }

    #[test]
    fn test_builtin_default_alphabet_packs() {
        let font = build_atlas(&mut BuiltinFace::new(), DEFAULT_ALPHABET).unwrap();
        assert_valid_packing(&font);
        assert!(font.table().contains('a'));
        assert!(font.table().contains('Ü'));
        assert!(!font.table().contains('€'));
        assert_eq!(font.table().line_height(), 12.0);
    }

    #[test]
    fn test_fractional_widths_pack() {
        let mut source = StepSource { line_height: 9.5 };
        let font = build_atlas(&mut source, DEFAULT_ALPHABET).unwrap();
        assert_valid_packing(&font);
        assert!(!font.table().contains('7'));
        assert_eq!(font.table().kerning('A', 'V'), -1.0);
        assert_eq!(font.table().kerning('V', 'A'), 0.0);
        assert_eq!(font.table().kerning_pair_count(), 1);
    }

    #[test]
    fn test_atlas_is_white_with_alpha() {
        let mut source = StepSource { line_height: 8.0 };
        let font = build_atlas(&mut source, "ab").unwrap();
        let entry = *font.table().get('a').unwrap();
        let (left, _, top, _) = pixel_rect(&entry, &font);
        assert_eq!(
            *font.image().get_pixel(left as u32, top as u32),
            Rgba([255, 255, 255, 200])
        );
        // margin texel stays transparent
        assert_eq!(*font.image().get_pixel(0, 0), Rgba([255, 255, 255, 0]));
    }

    #[test]
    fn test_duplicates_and_unsupported() {
        let mut source = StepSource { line_height: 8.0 };
        let font = build_atlas(&mut source, "aa1b").unwrap();
        assert_eq!(font.table().len(), 2);
        assert!(matches!(
            build_atlas(&mut source, "123"),
            Err(FontError::NoSupportedGlyphs)
        ));
    }

    #[test]
    fn test_unsupported_chars_do_not_widen_atlas() {
        let mut source = StepSource { line_height: 8.0 };
        let plain = build_atlas(&mut source, "ab").unwrap();
        let alphabet = format!("ab{}", "0123456789".repeat(4));
        let padded = build_atlas(&mut source, &alphabet).unwrap();
        assert_eq!(padded.table().len(), 2);
        assert_eq!(padded.width(), plain.width());
        assert_eq!(padded.height(), plain.height());
    }
}
