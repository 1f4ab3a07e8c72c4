//! Owned pixel buffers

use std::fmt;

use crate::error::GfxError;
use crate::pixel::{PixelFormat, Rgba};

/// Image with an owned, row-major, little-endian pixel buffer.
///
/// The buffer length is always `width * height * bytes_per_pixel`.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u16,
    height: u16,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Image {
    /// Allocate an image filled with `color`
    pub fn new(width: u16, height: u16, format: PixelFormat, color: u32) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        let mut img = Self {
            width,
            height,
            format,
            pixels: vec![0u8; len],
        };
        if color != 0 {
            img.fill(color);
        }
        img
    }

    /// Adopt an existing pixel buffer
    pub fn from_pixels(width: u16, height: u16, format: PixelFormat, pixels: Vec<u8>) -> Result<Self, GfxError> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(GfxError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// Decode a JPEG stream into an RGB565 image
    pub fn from_jpeg(data: &[u8]) -> Result<Self, GfxError> {
        let decoded = jpgdec::decode(data)?;
        Self::from_pixels(decoded.width, decoded.height, PixelFormat::Rgb565, decoded.pixels)
    }

    /// Load an image from file contents: JPEG when the data starts with
    /// the SOI marker, the raw pixel format otherwise.
    pub fn load(data: &[u8]) -> Result<Self, GfxError> {
        if jpgdec::is_jpeg(data) {
            Self::from_jpeg(data)
        } else {
            crate::raw::parse_raw(data)
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Buffer size in bytes
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    pub fn get_pixel(&self, x: u16, y: u16) -> Result<u32, GfxError> {
        self.check(x, y)?;
        Ok(self.pixel(x, y))
    }

    pub fn set_pixel(&mut self, x: u16, y: u16, color: u32) -> Result<(), GfxError> {
        self.check(x, y)?;
        self.put_pixel(x, y, color);
        Ok(())
    }

    /// Unpacked color at (x, y)
    pub fn get_rgba(&self, x: u16, y: u16) -> Result<Rgba, GfxError> {
        self.get_pixel(x, y).map(|c| self.format.unpack(c))
    }

    /// Set every pixel to `color`
    pub fn fill(&mut self, color: u32) {
        let bpp = self.bytes_per_pixel();
        let mut pattern = [0u8; 4];
        self.format.write(&mut pattern, color);
        for px in self.pixels.chunks_exact_mut(bpp) {
            px.copy_from_slice(&pattern[..bpp]);
        }
    }

    /// Replace this image with a copy of `src`, reallocating as needed
    pub fn copy_from(&mut self, src: &Image) {
        self.pixels = Vec::new();
        self.width = src.width;
        self.height = src.height;
        self.format = src.format;
        self.pixels = src.pixels.clone();
    }

    /// Expand into an `image::RgbaImage`
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = self.format.unpack(self.pixel(x as u16, y as u16));
            image::Rgba([c.r, c.g, c.b, c.a])
        })
    }

    /// Pack an `image::RgbaImage` into `format`. Larger images are rejected.
    pub fn from_rgba_image(src: &image::RgbaImage, format: PixelFormat) -> Result<Self, GfxError> {
        let (width, height) = src.dimensions();
        let (width, height) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => return Err(GfxError::TooLarge { width, height }),
        };
        let mut img = Self::new(width, height, format, 0);
        for (x, y, p) in src.enumerate_pixels() {
            let [r, g, b, a] = p.0;
            img.put_pixel(x as u16, y as u16, format.pack(Rgba::new(r, g, b, a)));
        }
        Ok(img)
    }

    fn check(&self, x: u16, y: u16) -> Result<(), GfxError> {
        if self.contains(x, y) {
            Ok(())
        } else {
            Err(GfxError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    #[inline]
    fn offset(&self, x: u16, y: u16) -> usize {
        (y as usize * self.width as usize + x as usize) * self.bytes_per_pixel()
    }

    /// Unchecked read; callers guarantee (x, y) is inside the image
    #[inline]
    pub(crate) fn pixel(&self, x: u16, y: u16) -> u32 {
        let offset = self.offset(x, y);
        self.format.read(&self.pixels[offset..])
    }

    /// Unchecked write; callers guarantee (x, y) is inside the image
    #[inline]
    pub(crate) fn put_pixel(&mut self, x: u16, y: u16, color: u32) {
        let offset = self.offset(x, y);
        let format = self.format;
        format.write(&mut self.pixels[offset..], color);
    }

    /// Bytes of `len` pixels starting at (x, y)
    pub(crate) fn row_bytes(&self, x: u16, y: u16, len: u16) -> &[u8] {
        let offset = self.offset(x, y);
        &self.pixels[offset..offset + len as usize * self.bytes_per_pixel()]
    }

    pub(crate) fn row_bytes_mut(&mut self, x: u16, y: u16, len: u16) -> &mut [u8] {
        let offset = self.offset(x, y);
        let end = offset + len as usize * self.bytes_per_pixel();
        &mut self.pixels[offset..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{ARGB8888_WHITE, RGB565_BLUE, RGB565_RED};

    #[test]
    fn test_new_fills() {
        let img = Image::new(3, 2, PixelFormat::Rgb565, RGB565_RED);
        assert_eq!(img.byte_size(), 12);
        assert_eq!(img.as_bytes()[..2], [0x00, 0xF8]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(img.get_pixel(x, y).unwrap(), RGB565_RED);
            }
        }

        let img = Image::new(2, 2, PixelFormat::Argb8888, ARGB8888_WHITE);
        assert_eq!(img.byte_size(), 16);
        assert!(img.as_bytes().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_pixel_bounds() {
        let mut img = Image::new(4, 4, PixelFormat::Rgb565, 0);
        assert!(img.set_pixel(3, 3, RGB565_BLUE).is_ok());
        assert_eq!(img.get_pixel(3, 3).unwrap(), RGB565_BLUE);
        assert_eq!(
            img.set_pixel(4, 0, RGB565_BLUE),
            Err(GfxError::OutOfBounds { x: 4, y: 0, width: 4, height: 4 })
        );
        assert!(img.get_pixel(0, 4).is_err());
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(Image::from_pixels(2, 2, PixelFormat::Rgb565, vec![0; 8]).is_ok());
        assert_eq!(
            Image::from_pixels(2, 2, PixelFormat::Argb8888, vec![0; 8]).err(),
            Some(GfxError::BufferSize { expected: 16, actual: 8 })
        );
    }

    #[test]
    fn test_copy_from_reallocates() {
        let src = Image::new(5, 3, PixelFormat::Argb8888, 0xFF123456);
        let mut dst = Image::new(1, 1, PixelFormat::Rgb565, 0);
        dst.copy_from(&src);
        assert_eq!(dst, src);
        assert_eq!(dst.byte_size(), 60);
        assert_ne!(dst.as_bytes().as_ptr(), src.as_bytes().as_ptr());
    }

    #[test]
    fn test_rgba_image_round_trip() {
        let mut img = Image::new(2, 1, PixelFormat::Argb8888, 0);
        img.set_pixel(0, 0, 0x80FF0000).unwrap();
        img.set_pixel(1, 0, 0xFF00FF00).unwrap();
        let rgba = img.to_rgba_image();
        assert_eq!(rgba.get_pixel(0, 0).0, [255, 0, 0, 128]);
        assert_eq!(rgba.get_pixel(1, 0).0, [0, 255, 0, 255]);
        let back = Image::from_rgba_image(&rgba, PixelFormat::Argb8888).unwrap();
        assert_eq!(back, img);
    }
}
