use quadra_text::DEFAULT_ALPHABET;

use crate::texture::{FilterMode, WrapMode};

/// Instances the renderer reserves room for before the first frame.
pub const DEFAULT_INSTANCE_CAPACITY: usize = 256;

/// Instance buffer size needed to hold `needed` instances. Grows to twice the
/// demand, rounded to a power of two, and never shrinks.
pub fn grown_instance_capacity(current: usize, needed: usize) -> usize {
    if needed > current {
        (needed * 2).next_power_of_two()
    } else {
        current
    }
}

/// Construction-time settings of a [`Renderer`](crate::Renderer).
#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    /// Chars rendered into the default font atlas.
    pub font_alphabet: String,
    /// Wrap mode of font atlas textures.
    pub font_wrap: WrapMode,
    /// Filter mode of font atlas textures.
    pub font_filter: FilterMode,
    pub initial_instance_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            font_alphabet: DEFAULT_ALPHABET.to_string(),
            font_wrap: WrapMode::Repeat,
            font_filter: FilterMode::Linear,
            initial_instance_capacity: DEFAULT_INSTANCE_CAPACITY,
        }
    }
}

impl RendererConfig {
    pub fn with_font_alphabet(mut self, alphabet: impl Into<String>) -> Self {
        self.font_alphabet = alphabet.into();
        self
    }

    pub fn with_font_wrap(mut self, wrap: WrapMode) -> Self {
        self.font_wrap = wrap;
        self
    }

    pub fn with_font_filter(mut self, filter: FilterMode) -> Self {
        self.font_filter = filter;
        self
    }

    pub fn with_initial_instance_capacity(mut self, capacity: usize) -> Self {
        self.initial_instance_capacity = capacity.max(1);
        self
    }
}
