use quadra::TextureId;
use quadra_text::FontError;

/// Errors reported by the wgpu backend.
#[derive(Debug)]
pub enum RenderError {
    /// A WGSL module failed validation. `message` holds the full diagnostic.
    ShaderCompilation { label: String, message: String },

    /// The device refused to create or fill a texture.
    TextureAllocation(String),

    /// Zero-sized or over-limit texture dimensions.
    InvalidTextureSize { width: u32, height: u32 },

    /// The handle does not name a live texture of this renderer.
    UnknownTexture(TextureId),

    /// Building the font atlas failed.
    Font(FontError),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::ShaderCompilation { label, message } => {
                write!(f, "Failed to compile program {:?}: {}", label, message)
            }
            RenderError::TextureAllocation(msg) => write!(f, "Texture allocation failed: {}", msg),
            RenderError::InvalidTextureSize { width, height } => {
                write!(f, "Invalid texture size {}x{}", width, height)
            }
            RenderError::UnknownTexture(id) => write!(f, "Unknown texture {:?}", id),
            RenderError::Font(err) => write!(f, "Font error: {}", err),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Font(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FontError> for RenderError {
    fn from(err: FontError) -> Self {
        RenderError::Font(err)
    }
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;
