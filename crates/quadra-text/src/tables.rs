//! Glyph and kerning lookup tables.
//!
//! Glyphs are stored densely in insertion order. Chars map to their slot through a
//! [`CharIndex`]: Latin-1 goes through a fixed 256-entry table and everything else
//! through a sparse map. Kerning only stores non-zero pairs, keyed by slot indices.

use std::collections::HashMap;

use quadra::{FontMetrics, GlyphMetrics, UvRect};

const DIRECT_SLOTS: usize = 256;
const NO_SLOT: u32 = u32::MAX;

/// Char to dense slot index.
#[derive(Clone, Debug)]
pub struct CharIndex {
    direct: Box<[u32; DIRECT_SLOTS]>,
    sparse: HashMap<char, u32>,
}

impl Default for CharIndex {
    fn default() -> Self {
        Self {
            direct: Box::new([NO_SLOT; DIRECT_SLOTS]),
            sparse: HashMap::new(),
        }
    }
}

impl CharIndex {
    pub fn get(&self, ch: char) -> Option<u32> {
        let code = ch as u32 as usize;
        if code < DIRECT_SLOTS {
            let slot = self.direct[code];
            (slot != NO_SLOT).then_some(slot)
        } else {
            self.sparse.get(&ch).copied()
        }
    }

    pub fn insert(&mut self, ch: char, slot: u32) {
        let code = ch as u32 as usize;
        if code < DIRECT_SLOTS {
            self.direct[code] = slot;
        } else {
            self.sparse.insert(ch, slot);
        }
    }

    /// Number of chars stored outside the direct table.
    pub fn sparse_len(&self) -> usize {
        self.sparse.len()
    }
}

/// Metrics and atlas location of one glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphEntry {
    pub ch: char,
    pub advance: f32,
    pub uv: UvRect,
}

/// All layout data of a bitmap font.
#[derive(Clone, Debug, Default)]
pub struct GlyphTable {
    line_height: f32,
    index: CharIndex,
    glyphs: Vec<GlyphEntry>,
    kerning: HashMap<(u32, u32), f32>,
}

impl GlyphTable {
    pub fn new(line_height: f32) -> Self {
        Self {
            line_height,
            ..Default::default()
        }
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Insert a glyph, replacing any previous entry for the same char.
    pub fn insert(&mut self, entry: GlyphEntry) {
        match self.index.get(entry.ch) {
            Some(slot) => self.glyphs[slot as usize] = entry,
            None => {
                self.index.insert(entry.ch, self.glyphs.len() as u32);
                self.glyphs.push(entry);
            }
        }
    }

    pub fn get(&self, ch: char) -> Option<&GlyphEntry> {
        self.index.get(ch).map(|slot| &self.glyphs[slot as usize])
    }

    pub fn contains(&self, ch: char) -> bool {
        self.index.get(ch).is_some()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyphs in insertion order.
    pub fn glyphs(&self) -> &[GlyphEntry] {
        &self.glyphs
    }

    /// Store a kerning offset. Zero offsets and pairs with unknown chars are ignored.
    pub fn set_kerning(&mut self, left: char, right: char, offset: f32) {
        let (Some(l), Some(r)) = (self.index.get(left), self.index.get(right)) else {
            return;
        };
        if offset == 0.0 {
            self.kerning.remove(&(l, r));
        } else {
            self.kerning.insert((l, r), offset);
        }
    }

    pub fn kerning(&self, left: char, right: char) -> f32 {
        match (self.index.get(left), self.index.get(right)) {
            (Some(l), Some(r)) => self.kerning.get(&(l, r)).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn kerning_pair_count(&self) -> usize {
        self.kerning.len()
    }

    /// All stored `(left, right, offset)` triples, in no particular order.
    pub fn kerning_pairs(&self) -> impl Iterator<Item = (char, char, f32)> + '_ {
        self.kerning.iter().map(|(&(l, r), &offset)| {
            (
                self.glyphs[l as usize].ch,
                self.glyphs[r as usize].ch,
                offset,
            )
        })
    }
}

impl FontMetrics for GlyphTable {
    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn glyph(&self, ch: char) -> Option<GlyphMetrics> {
        self.get(ch).map(|entry| GlyphMetrics {
            advance: entry.advance,
            uv: entry.uv,
        })
    }

    fn kerning(&self, left: char, right: char) -> f32 {
        GlyphTable::kerning(self, left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ch: char, advance: f32) -> GlyphEntry {
        GlyphEntry {
            ch,
            advance,
            uv: UvRect::FULL,
        }
    }

    #[test]
    fn test_char_index_direct_and_sparse() {
        let mut index = CharIndex::default();
        index.insert('a', 0);
        index.insert('ü', 1);
        index.insert('€', 2);
        assert_eq!(index.get('a'), Some(0));
        assert_eq!(index.get('ü'), Some(1));
        assert_eq!(index.get('€'), Some(2));
        assert_eq!(index.get('b'), None);
        assert_eq!(index.get('✓'), None);
        // only the euro sign lives outside Latin-1
        assert_eq!(index.sparse_len(), 1);
    }

    #[test]
    fn test_insert_replaces() {
        let mut table = GlyphTable::new(12.0);
        table.insert(entry('x', 5.0));
        table.insert(entry('y', 6.0));
        table.insert(entry('x', 7.0));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get('x').map(|e| e.advance), Some(7.0));
        assert_eq!(table.glyphs()[0].ch, 'x');
    }

    #[test]
    fn test_kerning_is_sparse() {
        let mut table = GlyphTable::new(12.0);
        table.insert(entry('A', 6.0));
        table.insert(entry('V', 6.0));
        table.set_kerning('A', 'V', -1.5);
        table.set_kerning('V', 'A', 0.0);
        table.set_kerning('A', '?', 3.0);
        assert_eq!(table.kerning('A', 'V'), -1.5);
        assert_eq!(table.kerning('V', 'A'), 0.0);
        assert_eq!(table.kerning('A', '?'), 0.0);
        assert_eq!(table.kerning_pair_count(), 1);
        assert_eq!(table.kerning_pairs().collect::<Vec<_>>(), vec![('A', 'V', -1.5)]);
    }

    #[test]
    fn test_font_metrics() {
        let mut table = GlyphTable::new(10.0);
        table.insert(entry(' ', 3.0));
        assert_eq!(table.space_advance(), 3.0);
        assert_eq!(FontMetrics::line_height(&table), 10.0);
        assert!(table.glyph('q').is_none());
    }
}
