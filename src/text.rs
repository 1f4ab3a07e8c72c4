//! Text layout on top of [`Font`].
//!
//! Strings end at the first NUL. Lines advance by `char_height + line_space`;
//! a line wraps when the next character (or word) would pass the image width
//! or `x + max_width` (`max_width == 0` disables that limit).

use log::warn;

use crate::buffer::Image;
use crate::canvas::Region;
use crate::error::GfxError;
use crate::font::{map_char, Font, FIRST_CHAR};

fn chars(s: &str) -> Vec<char> {
    s.chars().take_while(|&c| c != '\0').collect()
}

fn measure_chars(chars: &[char], font: &Font, word_only: bool) -> (u16, u16, usize) {
    let space = font.char_space() as u32;
    let (mut width, mut height) = (0u32, 0u16);
    let mut count = 0;
    for &c in chars {
        if c == '\n' || (word_only && c == ' ') {
            break;
        }
        let (w, h) = font.char_dimensions(c);
        width += w as u32 + space;
        height = height.max(h);
        count += 1;
    }
    let width = width.saturating_sub(space).min(u16::MAX as u32) as u16;
    (width, height, count)
}

/// Width, height and character count of `s` up to the end of the line, or
/// of its first word when `word_only` is set.
pub fn measure_string(s: &str, font: &Font, word_only: bool) -> (u16, u16, usize) {
    measure_chars(&chars(s), font, word_only)
}

/// Draw one character with its top-left corner at (x, y).
/// Returns the advance width, 0 for characters the font cannot draw.
pub fn draw_char(c: char, img: &mut Image, x: i32, y: i32, font: &Font, color: u32) -> u16 {
    let code = map_char(c);
    if code < FIRST_CHAR {
        return 0;
    }
    font.draw_glyph(img, code, x, y, color)
}

/// Draw `c` horizontally centered in the source width of `region`
pub fn draw_char_centered(c: char, img: &mut Image, font: &Font, region: &Region, color: u32) {
    let (width, _) = font.char_dimensions(c);
    let x = region.dest_x as i32 + (region.source_w as i32 - width as i32) / 2;
    draw_char(c, img, x, region.dest_y as i32, font, color);
}

struct Cursor {
    x: u32,
    y: u32,
    left: u32,
    limit: u32,
    advance: u32,
}

impl Cursor {
    fn new(x: u16, y: u16, max_width: u16, font: &Font, img: &Image) -> Self {
        let limit = match max_width {
            0 => img.width() as u32,
            w => (x as u32 + w as u32).min(img.width() as u32),
        };
        Self {
            x: x as u32,
            y: y as u32,
            left: x as u32,
            limit,
            advance: font.char_height() as u32 + font.line_space() as u32,
        }
    }

    fn fits(&self, width: u16) -> bool {
        self.x + width as u32 <= self.limit
    }

    fn new_line(&mut self) {
        self.x = self.left;
        self.y += self.advance;
    }

    fn check_height(&self, height: u16, img: &Image) -> Result<(), GfxError> {
        let needed = self.y + height as u32;
        if needed > img.height() as u32 {
            warn!("text too high: needs {needed} rows, image has {}", img.height());
            return Err(GfxError::TextOverflow {
                needed,
                height: img.height(),
            });
        }
        Ok(())
    }

    fn draw(&mut self, c: char, img: &mut Image, font: &Font, color: u32) {
        let width = draw_char(c, img, self.x as i32, self.y as i32, font, color);
        self.x += width as u32 + font.char_space() as u32;
    }
}

/// Draw `s` breaking lines between characters
pub fn draw_string(
    s: &str,
    font: &Font,
    img: &mut Image,
    x: u16,
    y: u16,
    max_width: u16,
    color: u32,
) -> Result<(), GfxError> {
    let mut cursor = Cursor::new(x, y, max_width, font, img);

    for c in chars(s) {
        match c {
            '\n' => cursor.new_line(),
            '\r' => {}
            _ => {
                let (width, height) = font.char_dimensions(c);
                if !cursor.fits(width) {
                    cursor.new_line();
                }
                cursor.check_height(height, img)?;
                cursor.draw(c, img, font, color);
            }
        }
    }
    Ok(())
}

/// Draw `s` breaking lines between words
pub fn draw_string_wrapped(
    s: &str,
    font: &Font,
    img: &mut Image,
    x: u16,
    y: u16,
    max_width: u16,
    color: u32,
) -> Result<(), GfxError> {
    let chars = chars(s);
    let mut cursor = Cursor::new(x, y, max_width, font, img);
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '\n' {
            cursor.new_line();
            i += 1;
            continue;
        }

        let (width, height, len) = measure_chars(&chars[i..], font, true);
        if !cursor.fits(width) {
            cursor.new_line();
        }
        cursor.check_height(height, img)?;

        for &c in &chars[i..i + len] {
            cursor.draw(c, img, font, color);
        }
        i += len;

        if chars.get(i) == Some(&' ') {
            cursor.draw(' ', img, font, color);
            i += 1;
        }
    }
    Ok(())
}

/// Draw `s` horizontally centered on the image, starting at row `y`
pub fn draw_string_centered(s: &str, font: &Font, img: &mut Image, y: u16, color: u32) -> Result<(), GfxError> {
    let (width, _, _) = measure_string(s, font, false);
    let x = img.width().saturating_sub(width) / 2;
    draw_string_wrapped(s, font, img, x, y, 0, color)
}
