//! Persisted form of a [`BitmapFont`]: the atlas as PNG plus a JSON metadata document.
//!
//! The metadata keeps the field names of the established format
//! (`RuneRects`, `LineHeight`, `RuneWidths`, `Kernings`). Maps are keyed by decimal
//! codepoints and empty fields are omitted.

use std::collections::BTreeMap;
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use quadra::{UvRect, Vec2};
use serde::{Deserialize, Serialize};

use crate::font::BitmapFont;
use crate::tables::{GlyphEntry, GlyphTable};
use crate::{FontError, FontResult};

/// JSON metadata of an exported font.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FontMetadata {
    /// Codepoint to `[u0, v0, u1, v1]`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rune_rects: BTreeMap<u32, [f32; 4]>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub line_height: f32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rune_widths: BTreeMap<u32, f32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kernings: BTreeMap<u32, BTreeMap<u32, f32>>,
}

fn is_zero(value: &f32) -> bool {
    *value == 0.0
}

impl FontMetadata {
    pub fn from_table(table: &GlyphTable) -> Self {
        let mut meta = FontMetadata {
            line_height: table.line_height(),
            ..Default::default()
        };
        for entry in table.glyphs() {
            let code = entry.ch as u32;
            meta.rune_rects.insert(code, entry.uv.to_array());
            meta.rune_widths.insert(code, entry.advance);
        }
        for (left, right, offset) in table.kerning_pairs() {
            meta.kernings
                .entry(left as u32)
                .or_default()
                .insert(right as u32, offset);
        }
        meta
    }

    /// Rebuild the glyph table. A glyph exists for every entry of `rune_rects`;
    /// missing widths default to 0.
    pub fn to_table(&self) -> FontResult<GlyphTable> {
        let mut table = GlyphTable::new(self.line_height);
        for (&code, rect) in &self.rune_rects {
            let ch = codepoint(code)?;
            let uv = UvRect::new(Vec2::new(rect[0], rect[1]), Vec2::new(rect[2], rect[3]));
            let inside = |v: f32| (0.0..=1.0).contains(&v);
            if !rect.iter().copied().all(inside) || uv.min.x > uv.max.x || uv.min.y > uv.max.y {
                return Err(FontError::MismatchedImage(format!(
                    "rect of {:?} is not a valid texture region: {:?}",
                    ch, rect
                )));
            }
            table.insert(GlyphEntry {
                ch,
                advance: self.rune_widths.get(&code).copied().unwrap_or(0.0),
                uv,
            });
        }
        for (&left, row) in &self.kernings {
            let left = codepoint(left)?;
            for (&right, &offset) in row {
                table.set_kerning(left, codepoint(right)?, offset);
            }
        }
        Ok(table)
    }
}

fn codepoint(code: u32) -> FontResult<char> {
    char::from_u32(code).ok_or_else(|| {
        FontError::Metadata(serde::de::Error::custom(format!(
            "invalid codepoint {}",
            code
        )))
    })
}

impl BitmapFont {
    /// Build a font from an atlas image and its metadata without rendering glyphs.
    pub fn from_parts(image: RgbaImage, metadata: &FontMetadata) -> FontResult<Self> {
        let table = metadata.to_table()?;
        if !table.is_empty() && (image.width() == 0 || image.height() == 0) {
            return Err(FontError::MismatchedImage(format!(
                "{} glyphs but an empty {}x{} atlas",
                table.len(),
                image.width(),
                image.height()
            )));
        }
        Ok(Self::new(image, table))
    }

    pub fn metadata(&self) -> FontMetadata {
        FontMetadata::from_table(self.table())
    }

    /// Write the atlas to `image_path` (PNG) and the metadata to `meta_path` (JSON).
    pub fn export(&self, image_path: impl AsRef<Path>, meta_path: impl AsRef<Path>) -> FontResult<()> {
        self.image()
            .save_with_format(image_path.as_ref(), ImageFormat::Png)?;
        let data = serde_json::to_vec(&self.metadata())?;
        std::fs::write(meta_path.as_ref(), data)?;
        log::debug!(
            "exported font atlas to {} and metadata to {}",
            image_path.as_ref().display(),
            meta_path.as_ref().display()
        );
        Ok(())
    }

    /// Read a font previously written by [`BitmapFont::export`].
    pub fn import(image_path: impl AsRef<Path>, meta_path: impl AsRef<Path>) -> FontResult<Self> {
        let image = image::open(image_path.as_ref())?.into_rgba8();
        let data = std::fs::read(meta_path.as_ref())?;
        let metadata: FontMetadata = serde_json::from_slice(&data)?;
        Self::from_parts(image, &metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuiltinFace, GlyphSource};

    struct KernedSource;

    impl GlyphSource for KernedSource {
        fn line_height(&self) -> f32 {
            10.0
        }

        fn advance(&mut self, ch: char) -> Option<f32> {
            match ch {
                'A' => Some(6.0),
                'B' => Some(7.0),
                'é' => Some(5.5),
                _ => None,
            }
        }

        fn kerning(&mut self, left: char, right: char) -> f32 {
            if (left, right) == ('A', 'B') {
                -1.0
            } else {
                0.0
            }
        }

        fn render(&mut self, _ch: char, cell: &mut RgbaImage) {
            for pixel in cell.pixels_mut() {
                pixel.0[3] = 128;
            }
        }
    }

    #[test]
    fn test_json_field_names() {
        let font = BitmapFont::from_source(&mut KernedSource, "AB").unwrap();
        let json = serde_json::to_string(&font.metadata()).unwrap();
        assert!(json.contains("\"RuneRects\":{\"65\":["));
        assert!(json.contains("\"LineHeight\":10.0"));
        assert!(json.contains("\"RuneWidths\":{\"65\":6.0,\"66\":7.0}"));
        assert!(json.contains("\"Kernings\":{\"65\":{\"66\":-1.0}}"));
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let font = BitmapFont::from_source(&mut BuiltinFace::new(), "ab").unwrap();
        let json = serde_json::to_string(&font.metadata()).unwrap();
        assert!(!json.contains("Kernings"));

        let meta: FontMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(meta, FontMetadata::default());
    }

    #[test]
    fn test_export_import() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("font.png");
        let meta_path = dir.path().join("font.json");

        let font = BitmapFont::from_source(&mut KernedSource, "ABé?").unwrap();
        font.export(&image_path, &meta_path).unwrap();
        let loaded = BitmapFont::import(&image_path, &meta_path).unwrap();

        assert_eq!(loaded.image(), font.image());
        assert_eq!(loaded.table().len(), 3);
        assert_eq!(loaded.table().get('é'), font.table().get('é'));
        assert_eq!(loaded.table().kerning('A', 'B'), -1.0);
        assert_eq!(loaded.table().line_height(), 10.0);
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = BitmapFont::import(dir.path().join("a.png"), dir.path().join("a.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_metadata() {
        let image = RgbaImage::new(16, 16);
        let mut meta = FontMetadata {
            line_height: 8.0,
            ..Default::default()
        };
        meta.rune_rects.insert(65, [0.5, 0.0, 1.5, 0.5]);
        assert!(matches!(
            BitmapFont::from_parts(image.clone(), &meta),
            Err(FontError::MismatchedImage(_))
        ));

        meta.rune_rects.clear();
        meta.rune_rects.insert(0xD800, [0.0, 0.0, 0.5, 0.5]);
        assert!(matches!(
            BitmapFont::from_parts(image, &meta),
            Err(FontError::Metadata(_))
        ));
    }

    #[test]
    fn test_missing_width_defaults_to_zero() {
        let mut meta = FontMetadata {
            line_height: 8.0,
            ..Default::default()
        };
        meta.rune_rects.insert('x' as u32, [0.0, 0.0, 0.5, 0.5]);
        let font = BitmapFont::from_parts(RgbaImage::new(16, 16), &meta).unwrap();
        assert_eq!(font.table().get('x').map(|e| e.advance), Some(0.0));
    }
}
