//! Raw image files: an 8 byte little-endian header
//! (`width`, `height`, `pixel_format`, reserved) followed by the pixels.

use log::debug;

use crate::buffer::Image;
use crate::error::GfxError;
use crate::pixel::PixelFormat;

pub const RAW_HEADER_LEN: usize = 8;

/// Parse raw file contents. Bytes after the pixel data are ignored.
pub fn parse_raw(data: &[u8]) -> Result<Image, GfxError> {
    if data.len() < RAW_HEADER_LEN {
        return Err(GfxError::RawHeader);
    }

    let field = |i: usize| u16::from_le_bytes([data[i * 2], data[i * 2 + 1]]);
    let (width, height, code) = (field(0), field(1), field(2));
    let format = PixelFormat::from_code(code).ok_or(GfxError::UnknownPixelFormat(code))?;

    let expected = width as usize * height as usize * format.bytes_per_pixel();
    let payload = &data[RAW_HEADER_LEN..];
    if payload.len() < expected {
        return Err(GfxError::BufferSize {
            expected,
            actual: payload.len(),
        });
    }

    debug!("raw image {width}x{height} {format:?}");
    Image::from_pixels(width, height, format, payload[..expected].to_vec())
}

/// Serialize an image in the raw layout
pub fn encode_raw(img: &Image) -> Vec<u8> {
    let mut out = Vec::with_capacity(RAW_HEADER_LEN + img.byte_size());
    out.extend_from_slice(&img.width().to_le_bytes());
    out.extend_from_slice(&img.height().to_le_bytes());
    out.extend_from_slice(&img.format().code().to_le_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(img.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw() {
        let mut data = vec![2, 0, 1, 0, 0, 0, 0, 0];
        data.extend_from_slice(&[0x1F, 0x00, 0x00, 0xF8]);
        let img = parse_raw(&data).unwrap();
        assert_eq!((img.width(), img.height()), (2, 1));
        assert_eq!(img.format(), PixelFormat::Rgb565);
        assert_eq!(img.get_pixel(0, 0).unwrap(), 0x001F);
        assert_eq!(img.get_pixel(1, 0).unwrap(), 0xF800);
    }

    #[test]
    fn test_parse_raw_errors() {
        assert_eq!(parse_raw(&[1, 0, 1, 0]).err(), Some(GfxError::RawHeader));
        assert_eq!(
            parse_raw(&[1, 0, 1, 0, 9, 0, 0, 0]).err(),
            Some(GfxError::UnknownPixelFormat(9))
        );
        assert_eq!(
            parse_raw(&[1, 0, 1, 0, 1, 0, 0, 0, 0xFF]).err(),
            Some(GfxError::BufferSize { expected: 4, actual: 1 })
        );
    }

    #[test]
    fn test_encode_matches_parse() {
        let img = Image::new(3, 2, PixelFormat::Argb8888, 0x80402010);
        let data = encode_raw(&img);
        assert_eq!(&data[..8], &[3, 0, 2, 0, 1, 0, 0, 0]);
        assert_eq!(parse_raw(&data).unwrap(), img);
    }
}
