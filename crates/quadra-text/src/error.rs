/// Errors that can occur while building, exporting or importing a bitmap font.
#[derive(Debug)]
pub enum FontError {
    /// Reading or writing a font file failed.
    Io(std::io::Error),

    /// Encoding or decoding the atlas image failed.
    Image(image::ImageError),

    /// The metadata document could not be (de)serialized.
    Metadata(serde_json::Error),

    /// None of the requested chars can be rendered by the glyph source.
    NoSupportedGlyphs,

    /// The packed atlas would exceed [`MAX_ATLAS_DIMENSION`](crate::MAX_ATLAS_DIMENSION).
    AtlasTooLarge { width: u32, height: u32 },

    /// Metadata references texels outside the supplied atlas image.
    MismatchedImage(String),
}

impl std::fmt::Display for FontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontError::Io(err) => write!(f, "Font IO error: {}", err),
            FontError::Image(err) => write!(f, "Font atlas image error: {}", err),
            FontError::Metadata(err) => write!(f, "Invalid font metadata: {}", err),
            FontError::NoSupportedGlyphs => {
                write!(f, "Glyph source supports none of the requested chars")
            }
            FontError::AtlasTooLarge { width, height } => write!(
                f,
                "Font atlas of {}x{} exceeds the maximum of {}",
                width,
                height,
                crate::MAX_ATLAS_DIMENSION
            ),
            FontError::MismatchedImage(msg) => {
                write!(f, "Font atlas does not match its metadata: {}", msg)
            }
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FontError::Io(err) => Some(err),
            FontError::Image(err) => Some(err),
            FontError::Metadata(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FontError {
    fn from(err: std::io::Error) -> Self {
        FontError::Io(err)
    }
}

impl From<image::ImageError> for FontError {
    fn from(err: image::ImageError) -> Self {
        FontError::Image(err)
    }
}

impl From<serde_json::Error> for FontError {
    fn from(err: serde_json::Error) -> Self {
        FontError::Metadata(err)
    }
}

/// Result type for font operations.
pub type FontResult<T> = Result<T, FontError>;
