//! Font encodings.
//!
//! Glyph tables start at the space character (0x20). German umlauts, sharp s
//! and the section sign are stored after the ASCII range, see [`map_char`].

use crate::buffer::Image;
use crate::canvas::blend_pixel;

/// First code point stored in a glyph table
pub const FIRST_CHAR: u32 = 0x20;

/// Fixed size, one bit per pixel.
///
/// Every glyph is `char_height` rows of `ceil(char_width / 8)` bytes,
/// most significant bit first.
#[derive(Debug, Clone, Copy)]
pub struct BitmapFont<'a> {
    pub char_width: u8,
    pub char_height: u8,
    pub char_space: u8,
    pub line_space: u8,
    pub chars: &'a [u8],
}

/// Variable width with 4 bit anti-aliasing.
///
/// `offsets[c - 0x20]` points at a record `[y_offset, width, height]` followed
/// by `width * height` nibbles, high nibble first, column by column.
/// A nibble of 0x0 is solid, 0xF transparent, anything else partial coverage.
#[derive(Debug, Clone, Copy)]
pub struct GlyphFont<'a> {
    pub char_height: u8,
    pub char_space: u8,
    pub line_space: u8,
    pub offsets: &'a [u32],
    pub chars: &'a [u8],
}

#[derive(Debug, Clone, Copy)]
pub enum Font<'a> {
    Bitmap(BitmapFont<'a>),
    Glyph(GlyphFont<'a>),
}

/// Table code for a character
pub fn map_char(c: char) -> u32 {
    match c {
        'ä' => 128,
        'ö' => 129,
        'ü' => 130,
        'Ä' => 131,
        'Ö' => 132,
        'Ü' => 133,
        'ß' => 134,
        '§' => 135,
        _ => c as u32,
    }
}

impl BitmapFont<'_> {
    fn stride(&self) -> usize {
        (self.char_width as usize).div_ceil(8)
    }

    fn glyph_size(&self) -> usize {
        self.char_height as usize * self.stride()
    }

    fn glyph(&self, code: u32) -> Option<&[u8]> {
        let size = self.glyph_size();
        let start = (code.checked_sub(FIRST_CHAR)? as usize).checked_mul(size)?;
        self.chars.get(start..start.checked_add(size)?)
    }
}

impl GlyphFont<'_> {
    /// `(y_offset, width, height)` and the nibble data
    fn glyph(&self, code: u32) -> Option<((u8, u8, u8), &[u8])> {
        let index = code.checked_sub(FIRST_CHAR)? as usize;
        let offset = *self.offsets.get(index)? as usize;
        let record = self.chars.get(offset..offset.checked_add(3)?)?;
        Some(((record[0], record[1], record[2]), &self.chars[offset + 3..]))
    }
}

impl Font<'_> {
    /// Nominal line height
    pub fn char_height(&self) -> u8 {
        match self {
            Font::Bitmap(f) => f.char_height,
            Font::Glyph(f) => f.char_height,
        }
    }

    pub fn char_space(&self) -> u8 {
        match self {
            Font::Bitmap(f) => f.char_space,
            Font::Glyph(f) => f.char_space,
        }
    }

    pub fn line_space(&self) -> u8 {
        match self {
            Font::Bitmap(f) => f.line_space,
            Font::Glyph(f) => f.line_space,
        }
    }

    /// Width and height of `c`; (0, 0) for characters the font cannot draw.
    /// Glyph font heights include the glyph's vertical offset.
    pub fn char_dimensions(&self, c: char) -> (u16, u16) {
        self.code_dimensions(map_char(c))
    }

    pub(crate) fn code_dimensions(&self, code: u32) -> (u16, u16) {
        match self {
            Font::Bitmap(f) => match f.glyph(code) {
                Some(_) => (f.char_width as u16, f.char_height as u16),
                None => (0, 0),
            },
            Font::Glyph(f) => match f.glyph(code) {
                Some(((y_offset, width, height), _)) => (width as u16, height as u16 + y_offset as u16),
                None => (0, 0),
            },
        }
    }

    /// Draw the glyph for table code `code` with its top-left corner at
    /// (x, y), clipping to the image. Returns the glyph width.
    pub fn draw_glyph(&self, img: &mut Image, code: u32, x: i32, y: i32, color: u32) -> u16 {
        match self {
            Font::Bitmap(f) => {
                let Some(glyph) = f.glyph(code) else {
                    return 0;
                };
                let stride = f.stride();
                for (row, bits) in glyph.chunks_exact(stride).enumerate() {
                    for col in 0..f.char_width as usize {
                        if bits[col / 8] & (0x80 >> (col % 8)) != 0 {
                            plot(img, x + col as i32, y + row as i32, color, 255);
                        }
                    }
                }
                f.char_width as u16
            }
            Font::Glyph(f) => {
                let Some(((y_offset, width, height), data)) = f.glyph(code) else {
                    return 0;
                };
                let y = y + y_offset as i32;
                let mut n = 0usize;
                for col in 0..width as i32 {
                    for row in 0..height as i32 {
                        let byte = data.get(n / 2).copied().unwrap_or(0xFF);
                        let nibble = if n % 2 == 0 { byte >> 4 } else { byte & 0x0F };
                        n += 1;
                        match nibble {
                            0xF => {}
                            0x0 => plot(img, x + col, y + row, color, 255),
                            _ => plot(img, x + col, y + row, color, 255 - (nibble << 4)),
                        }
                    }
                }
                width as u16
            }
        }
    }
}

fn plot(img: &mut Image, x: i32, y: i32, color: u32, alpha: u8) {
    let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
        return;
    };
    if !img.contains(x, y) {
        return;
    }
    if alpha == 255 {
        img.put_pixel(x, y, color);
    } else {
        blend_pixel(img, x, y, color, alpha);
    }
}
