//! Procedural monospace face that needs no font file.
//!
//! Glyphs are assembled from a handful of straight strokes on an 8x12 cell
//! (scaled by an integer factor). Lowercase letters and umlauts use a shorter box
//! so the dots fit above them. It is crude but readable, and always available.

use image::{Rgba, RgbaImage};

use crate::GlyphSource;

const CELL_WIDTH: u32 = 8;
const CELL_HEIGHT: u32 = 12;
const PAD_X: u32 = 1;
const PAD_Y: u32 = 2;

/// One straight stroke inside the glyph box.
#[derive(Clone, Copy, Debug)]
enum Stroke {
    Top,
    /// Top bar without the corners.
    TopInner,
    Middle,
    Bottom,
    BottomInner,
    /// Bars at one and three quarters of the box height.
    BarUpper,
    BarLower,
    LeftUpper,
    LeftLower,
    RightUpper,
    RightLower,
    Center,
    CenterUpper,
    CenterLower,
    /// Right half of the middle bar.
    MiddleRight,
    Slash,
    Backslash,
    /// Square dot at grid column 0..=2 and row 0..=4.
    Dot(u8, u8),
}

use Stroke::*;

const LEFT: [Stroke; 2] = [LeftUpper, LeftLower];
const RIGHT: [Stroke; 2] = [RightUpper, RightLower];

fn strokes(base: char) -> Option<Vec<Stroke>> {
    let strokes: Vec<Stroke> = match base.to_ascii_uppercase() {
        'A' => [Top, Middle].into_iter().chain(LEFT).chain(RIGHT).collect(),
        'B' => [Top, Middle, Bottom, Dot(2, 2)].into_iter().chain(LEFT).chain(RIGHT).collect(),
        'C' => [Top, Bottom].into_iter().chain(LEFT).collect(),
        'D' => [TopInner, BottomInner, Dot(0, 0), Dot(0, 4)].into_iter().chain(LEFT).chain(RIGHT).collect(),
        'E' => [Top, Middle, Bottom].into_iter().chain(LEFT).collect(),
        'F' => [Top, Middle].into_iter().chain(LEFT).collect(),
        'G' => [Top, Bottom, MiddleRight, RightLower].into_iter().chain(LEFT).collect(),
        'H' => [Middle].into_iter().chain(LEFT).chain(RIGHT).collect(),
        'I' => vec![Top, Bottom, Center],
        'J' => vec![Top, RightUpper, RightLower, Bottom, Dot(0, 3)],
        'K' => [Middle, Dot(2, 0), Dot(1, 1), Dot(1, 3), Dot(2, 4)].into_iter().chain(LEFT).collect(),
        'L' => [Bottom].into_iter().chain(LEFT).collect(),
        'M' => [Top, CenterUpper].into_iter().chain(LEFT).chain(RIGHT).collect(),
        'N' => [Backslash].into_iter().chain(LEFT).chain(RIGHT).collect(),
        'O' => [TopInner, BottomInner].into_iter().chain(LEFT).chain(RIGHT).collect(),
        'P' => vec![Top, Middle, RightUpper, LeftUpper, LeftLower],
        'Q' => [TopInner, BottomInner, Dot(1, 3)].into_iter().chain(LEFT).chain(RIGHT).collect(),
        'R' => vec![Top, Middle, RightUpper, LeftUpper, LeftLower, Dot(1, 3), Dot(2, 4)],
        'S' => vec![Top, Middle, Bottom, LeftUpper, RightLower],
        'T' => vec![Top, Center],
        'U' => [Bottom].into_iter().chain(LEFT).chain(RIGHT).collect(),
        'V' => vec![LeftUpper, RightUpper, Dot(0, 3), Dot(2, 3), Dot(1, 4)],
        'W' => [Bottom, CenterLower].into_iter().chain(LEFT).chain(RIGHT).collect(),
        'X' => vec![Slash, Backslash],
        'Y' => vec![LeftUpper, RightUpper, Middle, CenterLower],
        'Z' => vec![Top, Bottom, Slash],
        '0' => [Top, Bottom, Slash].into_iter().chain(LEFT).chain(RIGHT).collect(),
        '1' => RIGHT.to_vec(),
        '2' => vec![Top, Middle, Bottom, RightUpper, LeftLower],
        '3' => [Top, Middle, Bottom].into_iter().chain(RIGHT).collect(),
        '4' => [Middle, LeftUpper].into_iter().chain(RIGHT).collect(),
        '5' => vec![Top, Middle, Bottom, LeftUpper, RightLower],
        '6' => [Top, Middle, Bottom, RightLower].into_iter().chain(LEFT).collect(),
        '7' => [Top].into_iter().chain(RIGHT).collect(),
        '8' => [Top, Middle, Bottom].into_iter().chain(LEFT).chain(RIGHT).collect(),
        '9' => [Top, Middle, Bottom, LeftUpper].into_iter().chain(RIGHT).collect(),
        ' ' => Vec::new(),
        '!' => vec![CenterUpper, Dot(1, 4)],
        '"' => vec![Dot(0, 0), Dot(2, 0)],
        '$' => vec![Top, Middle, Bottom, LeftUpper, RightLower, Center],
        '%' => vec![Slash, Dot(0, 0), Dot(2, 4)],
        '&' => [Middle, Bottom, Dot(1, 0), Dot(2, 3)].into_iter().chain(LEFT).collect(),
        '/' => vec![Slash],
        '\\' => vec![Backslash],
        '(' => vec![Dot(2, 0), Dot(1, 1), Dot(1, 2), Dot(1, 3), Dot(2, 4)],
        ')' => vec![Dot(0, 0), Dot(1, 1), Dot(1, 2), Dot(1, 3), Dot(0, 4)],
        '[' => [Dot(1, 0), Dot(1, 4)].into_iter().chain(LEFT).collect(),
        ']' => [Dot(1, 0), Dot(1, 4)].into_iter().chain(RIGHT).collect(),
        '{' => vec![Center, Dot(2, 0), Dot(0, 2), Dot(2, 4)],
        '}' => vec![Center, Dot(0, 0), Dot(2, 2), Dot(0, 4)],
        '<' => vec![Dot(2, 0), Dot(1, 1), Dot(0, 2), Dot(1, 3), Dot(2, 4)],
        '>' => vec![Dot(0, 0), Dot(1, 1), Dot(2, 2), Dot(1, 3), Dot(0, 4)],
        '=' => vec![BarUpper, BarLower],
        '?' => vec![Top, RightUpper, Middle, Dot(1, 4)],
        ',' => vec![Dot(1, 3), Dot(0, 4)],
        '.' => vec![Dot(1, 4)],
        '-' => vec![Middle],
        '+' => vec![Middle, Center],
        '#' => vec![BarUpper, BarLower, Center],
        ';' => vec![Dot(1, 1), Dot(1, 3), Dot(0, 4)],
        ':' => vec![Dot(1, 1), Dot(1, 3)],
        '_' => vec![Bottom],
        '*' => vec![Slash, Backslash, Middle],
        '\'' => vec![Dot(1, 0)],
        '|' => vec![Center],
        '`' => vec![Dot(0, 0)],
        '^' => vec![Dot(1, 0), Dot(0, 1), Dot(2, 1)],
        '@' => [TopInner, BottomInner, Dot(1, 2)].into_iter().chain(LEFT).chain(RIGHT).collect(),
        '~' => vec![Dot(0, 2), Dot(1, 1), Dot(2, 2)],
        _ => return None,
    };
    Some(strokes)
}

/// Split umlauts into their base vowel.
fn decompose(ch: char) -> (char, bool) {
    match ch {
        'ä' => ('a', true),
        'ö' => ('o', true),
        'ü' => ('u', true),
        'Ä' => ('A', true),
        'Ö' => ('O', true),
        'Ü' => ('U', true),
        c => (c, false),
    }
}

/// Built-in glyph source used for the default font.
#[derive(Clone, Copy, Debug)]
pub struct BuiltinFace {
    scale: u32,
}

impl Default for BuiltinFace {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinFace {
    pub fn new() -> Self {
        Self::with_scale(1)
    }

    /// Integer upscaling of the 8x12 cell. `0` is treated as `1`.
    pub fn with_scale(scale: u32) -> Self {
        Self {
            scale: scale.max(1),
        }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn supports(ch: char) -> bool {
        strokes(decompose(ch).0).is_some()
    }
}

impl GlyphSource for BuiltinFace {
    fn line_height(&self) -> f32 {
        (CELL_HEIGHT * self.scale) as f32
    }

    fn advance(&mut self, ch: char) -> Option<f32> {
        Self::supports(ch).then_some((CELL_WIDTH * self.scale) as f32)
    }

    fn render(&mut self, ch: char, cell: &mut RgbaImage) {
        let (base, umlaut) = decompose(ch);
        let Some(strokes) = strokes(base) else {
            return;
        };

        let s = self.scale;
        let x0 = PAD_X * s;
        let x1 = (CELL_WIDTH - PAD_X) * s;
        let mut y0 = PAD_Y * s;
        let y1 = (CELL_HEIGHT - PAD_Y) * s;
        if base.is_ascii_lowercase() || umlaut {
            y0 += (y1 - y0) / 4;
        }

        let mut pen = Pen {
            image: cell,
            t: s,
            x0,
            x1,
            y0,
            y1,
        };
        for stroke in strokes {
            pen.stroke(stroke);
        }
        if umlaut {
            let y = PAD_Y * s;
            pen.fill(x0 + s, y, x0 + 2 * s, y + s);
            pen.fill(x1 - 2 * s, y, x1 - s, y + s);
        }
    }
}

/// Draws strokes into a glyph box spanning `x0..x1` x `y0..y1`.
struct Pen<'a> {
    image: &'a mut RgbaImage,
    /// Stroke thickness.
    t: u32,
    x0: u32,
    x1: u32,
    y0: u32,
    y1: u32,
}

impl Pen<'_> {
    fn fill(&mut self, x0: u32, y0: u32, x1: u32, y1: u32) {
        let x1 = x1.min(self.image.width());
        let y1 = y1.min(self.image.height());
        for y in y0..y1 {
            for x in x0..x1 {
                self.image.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
    }

    fn mid_x(&self) -> u32 {
        self.x0 + (self.x1 - self.x0 - self.t) / 2
    }

    fn mid_y(&self) -> u32 {
        self.y0 + (self.y1 - self.y0 - self.t) / 2
    }

    fn row(&self, row: u8) -> u32 {
        self.y0 + (self.y1 - self.y0 - self.t) * row as u32 / 4
    }

    fn column(&self, col: u8) -> u32 {
        match col {
            0 => self.x0,
            1 => self.mid_x(),
            _ => self.x1 - self.t,
        }
    }

    fn diagonal(&mut self, rising: bool) {
        let (t, x0, y0) = (self.t, self.x0, self.y0);
        let span_x = self.x1 - self.x0 - t;
        let steps = (self.y1 - self.y0).max(1);
        for i in 0..steps {
            let along = if rising { steps - 1 - i } else { i };
            let x = x0 + span_x * along / (steps - 1).max(1);
            self.fill(x, y0 + i, x + t, y0 + i + 1);
        }
    }

    fn stroke(&mut self, stroke: Stroke) {
        let (t, x0, x1, y0, y1) = (self.t, self.x0, self.x1, self.y0, self.y1);
        let (mx, my) = (self.mid_x(), self.mid_y());
        match stroke {
            Top => self.fill(x0, y0, x1, y0 + t),
            TopInner => self.fill(x0 + t, y0, x1 - t, y0 + t),
            Middle => self.fill(x0, my, x1, my + t),
            Bottom => self.fill(x0, y1 - t, x1, y1),
            BottomInner => self.fill(x0 + t, y1 - t, x1 - t, y1),
            BarUpper => {
                let y = self.row(1);
                self.fill(x0, y, x1, y + t);
            }
            BarLower => {
                let y = self.row(3);
                self.fill(x0, y, x1, y + t);
            }
            LeftUpper => self.fill(x0, y0, x0 + t, my + t),
            LeftLower => self.fill(x0, my, x0 + t, y1),
            RightUpper => self.fill(x1 - t, y0, x1, my + t),
            RightLower => self.fill(x1 - t, my, x1, y1),
            Center => self.fill(mx, y0, mx + t, y1),
            CenterUpper => self.fill(mx, y0, mx + t, my + t),
            CenterLower => self.fill(mx, my, mx + t, y1),
            MiddleRight => self.fill(mx, my, x1, my + t),
            Slash => self.diagonal(true),
            Backslash => self.diagonal(false),
            Dot(col, row) => {
                let x = self.column(col);
                let y = self.row(row);
                self.fill(x, y, x + t, y + t);
            }
        }
    }
}
