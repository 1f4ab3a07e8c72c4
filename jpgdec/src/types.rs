//! Common types for the decoder

use alloc::vec::Vec;
use core::fmt;

/// Result type for decoder operations
pub type Result<T> = core::result::Result<T, FormatError>;

/// Reasons a stream is rejected. Any of them aborts the whole decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// Stream does not start with SOI
    MissingSoi,
    /// Stream ends inside a segment or inside entropy-coded data
    Truncated,
    /// A marker was expected at this offset
    ExpectedMarker(usize),
    /// Segment length field below 2
    SegmentLength(u8),
    /// EOI reached before any scan
    EoiBeforeScan,
    /// Frame type other than baseline sequential (SOF0)
    UnsupportedFrame(u8),
    /// Sample or quantizer precision other than 8 bits
    Precision(u8),
    /// Component count other than 1 or 3
    ComponentCount(u8),
    /// Width or height is zero
    ZeroDimension,
    /// Sampling factor zero, above 2, or not an integer multiple of chroma
    Sampling,
    /// Table id outside the supported range
    TableId(u8),
    /// Scan references a table that was never defined
    MissingTable,
    /// Code counts describe more codes than fit their length
    HuffmanTable,
    /// No Huffman code matched within 16 bits
    HuffmanCode,
    /// Coefficient run past the end of a block, or size category too large
    Coefficient,
    /// Scan header does not match the frame header
    ScanHeader,
    /// Marker found inside entropy-coded data
    UnexpectedMarker(u8),
    /// Restart marker missing at an interval boundary
    MissingRestart,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::MissingSoi => write!(f, "missing SOI marker"),
            FormatError::Truncated => write!(f, "stream truncated"),
            FormatError::ExpectedMarker(pos) => write!(f, "expected marker at offset {pos}"),
            FormatError::SegmentLength(m) => write!(f, "invalid length in segment 0xFF{m:02X}"),
            FormatError::EoiBeforeScan => write!(f, "EOI before start of scan"),
            FormatError::UnsupportedFrame(m) => write!(f, "unsupported frame type 0xFF{m:02X}"),
            FormatError::Precision(p) => write!(f, "unsupported precision {p}"),
            FormatError::ComponentCount(n) => write!(f, "unsupported component count {n}"),
            FormatError::ZeroDimension => write!(f, "zero image dimension"),
            FormatError::Sampling => write!(f, "unsupported sampling factors"),
            FormatError::TableId(id) => write!(f, "table id 0x{id:02X} out of range"),
            FormatError::MissingTable => write!(f, "scan references an undefined table"),
            FormatError::HuffmanTable => write!(f, "over-subscribed Huffman table"),
            FormatError::HuffmanCode => write!(f, "invalid Huffman code"),
            FormatError::Coefficient => write!(f, "invalid coefficient data"),
            FormatError::ScanHeader => write!(f, "scan header does not match frame"),
            FormatError::UnexpectedMarker(m) => write!(f, "unexpected marker 0xFF{m:02X} in scan"),
            FormatError::MissingRestart => write!(f, "missing restart marker"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FormatError {}

/// Decoded frame: little-endian RGB565, row-major, no padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<u8>,
}

impl RawImage {
    /// Pixel at (x, y) as a native RGB565 value
    pub fn pixel(&self, x: u16, y: u16) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 2;
        Some(u16::from_le_bytes([self.pixels[offset], self.pixels[offset + 1]]))
    }
}

/// Frame component as declared by SOF0 and bound to tables by SOS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub id: u8,
    /// Horizontal sampling factor
    pub h: u8,
    /// Vertical sampling factor
    pub v: u8,
    pub qtable: u8,
    /// Slot in the 4-entry Huffman table array (class * 2 + id)
    pub dc_table: usize,
    pub ac_table: usize,
}

impl Component {
    pub fn blocks(&self) -> usize {
        self.h as usize * self.v as usize
    }
}
