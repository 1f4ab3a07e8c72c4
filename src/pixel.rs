//! Pixel formats and color packing.
//!
//! Colors travel as `u32` values in the native encoding of the image they
//! are written to; [`Rgba`] is the unpacked 8-bit-per-channel form used for
//! blending and conversion.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
pub enum PixelFormat {
    /// 16 bit, `RRRRRGGG GGGBBBBB`, no alpha
    Rgb565,
    /// 32 bit, `AAAAAAAA RRRRRRRR GGGGGGGG BBBBBBBB`
    Argb8888,
}

/// Unpacked color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(c: [u8; 4]) -> Self {
        Rgba::new(c[0], c[1], c[2], c[3])
    }
}

/// Storage and packing of one pixel format
pub trait PixelCodec {
    const FORMAT: PixelFormat;
    const BYTES_PER_PIXEL: usize;
    const HAS_ALPHA: bool;

    /// Native color from little-endian pixel bytes
    fn read(bytes: &[u8]) -> u32;
    /// Store a native color as little-endian pixel bytes
    fn write(bytes: &mut [u8], color: u32);
    fn unpack(color: u32) -> Rgba;
    fn pack(color: Rgba) -> u32;
}

pub struct Rgb565;
pub struct Argb8888;

macro_rules! generate_expand_lut {
    ($name:ident, $bits:expr) => {
        const $name: [u8; 1 << $bits] = {
            let mut lut = [0u8; 1 << $bits];
            let mut i = 0;
            while i < (1 << $bits) {
                // replicate the top bits into the low bits so 0 -> 0 and max -> 255
                lut[i] = ((i << (8 - $bits)) | (i >> (2 * $bits - 8))) as u8;
                i += 1;
            }
            lut
        };
    };
}

generate_expand_lut!(EXPAND_5, 5);
generate_expand_lut!(EXPAND_6, 6);

impl PixelCodec for Rgb565 {
    const FORMAT: PixelFormat = PixelFormat::Rgb565;
    const BYTES_PER_PIXEL: usize = 2;
    const HAS_ALPHA: bool = false;

    #[inline(always)]
    fn read(bytes: &[u8]) -> u32 {
        u16::from_le_bytes([bytes[0], bytes[1]]) as u32
    }

    #[inline(always)]
    fn write(bytes: &mut [u8], color: u32) {
        bytes[..2].copy_from_slice(&(color as u16).to_le_bytes());
    }

    #[inline(always)]
    fn unpack(color: u32) -> Rgba {
        Rgba::opaque(
            EXPAND_5[((color >> 11) & 0x1F) as usize],
            EXPAND_6[((color >> 5) & 0x3F) as usize],
            EXPAND_5[(color & 0x1F) as usize],
        )
    }

    #[inline(always)]
    fn pack(color: Rgba) -> u32 {
        rgb565(color.r, color.g, color.b)
    }
}

impl PixelCodec for Argb8888 {
    const FORMAT: PixelFormat = PixelFormat::Argb8888;
    const BYTES_PER_PIXEL: usize = 4;
    const HAS_ALPHA: bool = true;

    #[inline(always)]
    fn read(bytes: &[u8]) -> u32 {
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[inline(always)]
    fn write(bytes: &mut [u8], color: u32) {
        bytes[..4].copy_from_slice(&color.to_le_bytes());
    }

    #[inline(always)]
    fn unpack(color: u32) -> Rgba {
        Rgba::new((color >> 16) as u8, (color >> 8) as u8, color as u8, (color >> 24) as u8)
    }

    #[inline(always)]
    fn pack(color: Rgba) -> u32 {
        argb8888(color.a, color.r, color.g, color.b)
    }
}

impl PixelFormat {
    /// Format from its raw file code
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(PixelFormat::Rgb565),
            1 => Some(PixelFormat::Argb8888),
            _ => None,
        }
    }

    /// Raw file code
    pub fn code(self) -> u16 {
        match self {
            PixelFormat::Rgb565 => 0,
            PixelFormat::Argb8888 => 1,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb565 => Rgb565::BYTES_PER_PIXEL,
            PixelFormat::Argb8888 => Argb8888::BYTES_PER_PIXEL,
        }
    }

    pub fn has_alpha(self) -> bool {
        match self {
            PixelFormat::Rgb565 => Rgb565::HAS_ALPHA,
            PixelFormat::Argb8888 => Argb8888::HAS_ALPHA,
        }
    }

    #[inline]
    pub fn read(self, bytes: &[u8]) -> u32 {
        match self {
            PixelFormat::Rgb565 => Rgb565::read(bytes),
            PixelFormat::Argb8888 => Argb8888::read(bytes),
        }
    }

    #[inline]
    pub fn write(self, bytes: &mut [u8], color: u32) {
        match self {
            PixelFormat::Rgb565 => Rgb565::write(bytes, color),
            PixelFormat::Argb8888 => Argb8888::write(bytes, color),
        }
    }

    #[inline]
    pub fn unpack(self, color: u32) -> Rgba {
        match self {
            PixelFormat::Rgb565 => Rgb565::unpack(color),
            PixelFormat::Argb8888 => Argb8888::unpack(color),
        }
    }

    #[inline]
    pub fn pack(self, color: Rgba) -> u32 {
        match self {
            PixelFormat::Rgb565 => Rgb565::pack(color),
            PixelFormat::Argb8888 => Argb8888::pack(color),
        }
    }

    /// Re-encode a native color of this format into `target`
    #[inline]
    pub fn convert(self, color: u32, target: PixelFormat) -> u32 {
        if self == target {
            color
        } else {
            target.pack(self.unpack(color))
        }
    }
}

/// Pack 8-bit channels into RGB565 (truncating)
pub const fn rgb565(r: u8, g: u8, b: u8) -> u32 {
    (((r as u32 & 0xF8) >> 3) << 11) | (((g as u32 & 0xFC) >> 2) << 5) | ((b as u32 & 0xF8) >> 3)
}

pub const fn argb8888(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

pub const RGB565_BLACK: u32 = 0x0000;
pub const RGB565_WHITE: u32 = 0xFFFF;
pub const RGB565_RED: u32 = 0xF800;
pub const RGB565_GREEN: u32 = 0x07E0;
pub const RGB565_BLUE: u32 = 0x001F;
pub const RGB565_CYAN: u32 = 0x07FF;
pub const RGB565_MAGENTA: u32 = 0xF81F;
pub const RGB565_YELLOW: u32 = 0xFFE0;
pub const RGB565_GRAY: u32 = 0xF7DE;

pub const ARGB8888_BLACK: u32 = 0xFF00_0000;
pub const ARGB8888_WHITE: u32 = 0xFFFF_FFFF;
pub const ARGB8888_TRANSPARENT: u32 = 0x0000_0000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_constants() {
        assert_eq!(rgb565(255, 0, 0), RGB565_RED);
        assert_eq!(rgb565(0, 255, 0), RGB565_GREEN);
        assert_eq!(rgb565(0, 0, 255), RGB565_BLUE);
        assert_eq!(rgb565(255, 255, 255), RGB565_WHITE);
        assert_eq!(argb8888(255, 0, 0, 0), ARGB8888_BLACK);
    }

    #[test]
    fn test_rgb565_unpack_pack_is_lossless() {
        for color in [0u32, 0x0001, 0x0821, 0x1234, 0x8410, 0xA514, 0xF7DE, 0xFFFF] {
            assert_eq!(Rgb565::pack(Rgb565::unpack(color)), color);
        }
        assert_eq!(Rgb565::unpack(RGB565_WHITE), Rgba::opaque(255, 255, 255));
        assert_eq!(Rgb565::unpack(RGB565_BLACK), Rgba::opaque(0, 0, 0));
    }

    #[test]
    fn test_argb_channels() {
        let c = Argb8888::unpack(0x80112233);
        assert_eq!(c, Rgba::new(0x11, 0x22, 0x33, 0x80));
        assert_eq!(Argb8888::pack(c), 0x80112233);
    }

    #[test]
    fn test_read_write_little_endian() {
        let mut buf = [0u8; 4];
        PixelFormat::Rgb565.write(&mut buf, 0xA514);
        assert_eq!(&buf[..2], &[0x14, 0xA5]);
        assert_eq!(PixelFormat::Rgb565.read(&buf), 0xA514);

        PixelFormat::Argb8888.write(&mut buf, 0xFF102030);
        assert_eq!(buf, [0x30, 0x20, 0x10, 0xFF]);
        assert_eq!(PixelFormat::Argb8888.read(&buf), 0xFF102030);
    }

    #[test]
    fn test_convert() {
        assert_eq!(PixelFormat::Rgb565.convert(RGB565_RED, PixelFormat::Argb8888), 0xFFFF0000);
        assert_eq!(PixelFormat::Argb8888.convert(0x80FF0000, PixelFormat::Rgb565), RGB565_RED);
        assert_eq!(PixelFormat::from_code(1), Some(PixelFormat::Argb8888));
        assert_eq!(PixelFormat::from_code(7), None);
        assert_eq!(PixelFormat::Argb8888.code(), 1);
    }
}
