use std::fmt;

use jpgdec::FormatError;

/// Errors reported by the image, text and scene operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GfxError {
    /// Pixel access outside the image
    OutOfBounds { x: u16, y: u16, width: u16, height: u16 },
    /// Text needs more rows than the target image has
    TextOverflow { needed: u32, height: u16 },
    /// All scene slots are taken
    SceneFull,
    /// Pixel buffer length does not match width * height * bpp
    BufferSize { expected: usize, actual: usize },
    /// Raw image header names an unknown pixel format
    UnknownPixelFormat(u16),
    /// Raw image shorter than its header
    RawHeader,
    /// Dimensions do not fit the 16 bit image size
    TooLarge { width: u32, height: u32 },
    /// JPEG stream rejected by the decoder
    Jpeg(FormatError),
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfxError::OutOfBounds { x, y, width, height } => {
                write!(f, "pixel ({x}, {y}) outside {width}x{height} image")
            }
            GfxError::TextOverflow { needed, height } => {
                write!(f, "text too high: needs {needed} rows, image has {height}")
            }
            GfxError::SceneFull => write!(f, "scene list is full"),
            GfxError::BufferSize { expected, actual } => {
                write!(f, "pixel buffer is {actual} bytes, expected {expected}")
            }
            GfxError::UnknownPixelFormat(code) => write!(f, "unknown pixel format {code}"),
            GfxError::RawHeader => write!(f, "raw image header truncated"),
            GfxError::TooLarge { width, height } => write!(f, "{width}x{height} exceeds 65535x65535"),
            GfxError::Jpeg(err) => write!(f, "jpeg: {err}"),
        }
    }
}

impl std::error::Error for GfxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GfxError::Jpeg(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormatError> for GfxError {
    fn from(err: FormatError) -> Self {
        GfxError::Jpeg(err)
    }
}
