//! jpgdec - baseline JPEG decoder
//!
//! Decodes baseline sequential, Huffman-coded JPEG streams (1 or 3
//! components, integer chroma subsampling, restart intervals) straight into
//! little-endian RGB565 pixels, the native format of the frame buffers this
//! crate feeds.
//!
//! ```ignore
//! let image = jpgdec::decode(&jpeg_bytes)?;
//! assert_eq!(image.pixels.len(), image.width as usize * image.height as usize * 2);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod types;
mod tables;
mod huffman;
mod idct;
mod decoder;

pub use types::{FormatError, RawImage, Result};
pub use decoder::JpegDecoder;

/// Bytes per decoded pixel (RGB565)
pub const BYTES_PER_PIXEL: usize = 2;

/// Decode a complete JPEG stream held in memory.
///
/// Every call works on a fresh decoder; nothing is shared between calls.
pub fn decode(data: &[u8]) -> Result<RawImage> {
    let mut decoder = JpegDecoder::new();
    decoder.prepare(data)?;
    let pixels = decoder.decompress(data)?;
    Ok(RawImage {
        width: decoder.width(),
        height: decoder.height(),
        pixels,
    })
}

/// Returns true when `data` starts with the SOI marker.
pub fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}
