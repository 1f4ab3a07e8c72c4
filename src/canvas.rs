use std::collections::HashMap;

use anyhow::{anyhow, Result};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{Point, Primitive};
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::buffer::Image;
use crate::config::{self, Element, TextLayout};
use crate::font::Font;
use crate::pixel::Rgba;
use crate::text;
use crate::utils::decode_base64;

/// Source rectangle of an image and the position it is drawn at
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub source_x: u16,
    pub source_y: u16,
    pub source_w: u16,
    pub source_h: u16,
    pub dest_x: u16,
    pub dest_y: u16,
}

impl Region {
    pub fn new(source_x: u16, source_y: u16, source_w: u16, source_h: u16, dest_x: u16, dest_y: u16) -> Self {
        Self {
            source_x,
            source_y,
            source_w,
            source_h,
            dest_x,
            dest_y,
        }
    }

    /// The whole image, drawn at (0, 0)
    pub fn of_image(img: &Image) -> Self {
        Self::new(0, 0, img.width(), img.height(), 0, 0)
    }

    pub fn at(mut self, dest_x: u16, dest_y: u16) -> Self {
        self.dest_x = dest_x;
        self.dest_y = dest_y;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.source_w == 0 || self.source_h == 0
    }

    /// Non-empty and inside both images
    pub fn fits(&self, src: &Image, dst: &Image) -> bool {
        let (w, h) = (self.source_w as u32, self.source_h as u32);
        !self.is_empty()
            && self.source_x as u32 + w <= src.width() as u32
            && self.source_y as u32 + h <= src.height() as u32
            && self.dest_x as u32 + w <= dst.width() as u32
            && self.dest_y as u32 + h <= dst.height() as u32
    }
}

/// Porter-Duff "over": `fg` composited onto `bg`.
///
/// When both alphas are zero the background is returned unchanged.
#[inline]
pub fn blend(fg: Rgba, bg: Rgba) -> Rgba {
    let (af, ab) = (fg.a as u32, bg.a as u32);
    let a_mult = af * ab / 255;
    let a_out = af + ab - a_mult;
    if a_out == 0 {
        return bg;
    }
    let mix = |cf: u8, cb: u8| ((cf as u32 * af + cb as u32 * (ab - a_mult)) / a_out) as u8;
    Rgba::new(mix(fg.r, bg.r), mix(fg.g, bg.g), mix(fg.b, bg.b), a_out as u8)
}

/// Blend `color` (native to `img`, its own alpha ignored) with coverage
/// `alpha` onto the pixel at (x, y). Outside the image nothing happens.
pub fn blend_pixel(img: &mut Image, x: u16, y: u16, color: u32, alpha: u8) {
    if !img.contains(x, y) {
        return;
    }
    let format = img.format();
    let mut fg = format.unpack(color);
    fg.a = alpha;
    let bg = format.unpack(img.pixel(x, y));
    img.put_pixel(x, y, format.pack(blend(fg, bg)));
}

/// Fill a rectangle. Rectangles reaching past the image are skipped.
pub fn fill_rect(img: &mut Image, x: u16, y: u16, w: u16, h: u16, color: u32) {
    if x as u32 + w as u32 > img.width() as u32 || y as u32 + h as u32 > img.height() as u32 {
        return;
    }
    let bpp = img.bytes_per_pixel();
    let mut pattern = [0u8; 4];
    img.format().write(&mut pattern, color);
    for row in y..y + h {
        for px in img.row_bytes_mut(x, row, w).chunks_exact_mut(bpp) {
            px.copy_from_slice(&pattern[..bpp]);
        }
    }
}

/// Draw `region` of `src` onto `dst`.
///
/// Sources without alpha are copied (converted to the destination format),
/// ARGB sources are alpha blended. Empty or out of range regions draw nothing.
pub fn blit(src: &Image, dst: &mut Image, region: &Region) {
    if !region.fits(src, dst) {
        if !region.is_empty() {
            warn!("blit skipped: {region:?} outside {}x{} -> {}x{}", src.width(), src.height(), dst.width(), dst.height());
        }
        return;
    }

    let (sf, df) = (src.format(), dst.format());
    let Region {
        source_x,
        source_y,
        source_w,
        source_h,
        dest_x,
        dest_y,
    } = *region;

    if !sf.has_alpha() && sf == df {
        for row in 0..source_h {
            let line = src.row_bytes(source_x, source_y + row, source_w);
            dst.row_bytes_mut(dest_x, dest_y + row, source_w).copy_from_slice(line);
        }
        return;
    }

    for row in 0..source_h {
        for col in 0..source_w {
            let c = src.pixel(source_x + col, source_y + row);
            let (x, y) = (dest_x + col, dest_y + row);
            let out = if sf.has_alpha() {
                df.pack(blend(sf.unpack(c), df.unpack(dst.pixel(x, y))))
            } else {
                sf.convert(c, df)
            };
            dst.put_pixel(x, y, out);
        }
    }
}

/// One pixel wide line between two points, clipped to the image
pub fn draw_line(img: &mut Image, x1: u16, y1: u16, x2: u16, y2: u16, color: u32) {
    draw_line_styled(
        img,
        Point::new(x1 as i32, y1 as i32),
        Point::new(x2 as i32, y2 as i32),
        1,
        color,
    );
}

pub fn draw_line_styled(img: &mut Image, start: Point, end: Point, stroke_width: u32, color: u32) {
    let pixels = Line::new(start, end)
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, stroke_width))
        .pixels();
    for p in pixels {
        let pt = p.0;
        if (0..img.width() as i32).contains(&pt.x) && (0..img.height() as i32).contains(&pt.y) {
            img.put_pixel(pt.x as u16, pt.y as u16, color);
        }
    }
}

const Q12: i32 = 4096;

/// Rotate `src` about its center into `dst`, clockwise for positive angles.
/// Destination pixels with no source pixel get `background` (native to `dst`).
pub fn rotate(src: &Image, dst: &mut Image, radians: f32, background: u32) {
    let cos = (radians.cos() * Q12 as f32) as i32;
    let sin = (radians.sin() * Q12 as f32) as i32;

    let (sw, sh) = (src.width() as i32, src.height() as i32);
    let (dw, dh) = (dst.width() as i32, dst.height() as i32);
    let (scx, scy) = (sw / 2, sh / 2);
    let (dcx, dcy) = (dw / 2, dh / 2);
    let (sf, df) = (src.format(), dst.format());

    for y in 0..dh {
        let dy = y - dcy;
        for x in 0..dw {
            let dx = x - dcx;
            let sx = (dx * cos + dy * sin) / Q12 + scx;
            let sy = (dy * cos - dx * sin) / Q12 + scy;

            let color = if (0..sw).contains(&sx) && (0..sh).contains(&sy) {
                sf.convert(src.pixel(sx as u16, sy as u16), df)
            } else {
                background
            };
            dst.put_pixel(x as u16, y as u16, color);
        }
    }
}

/// Mirror across the anti-diagonal: `(x, y)` moves to
/// `(height - 1 - y, width - 1 - x)` in a `height x width` image.
pub fn flip90(img: &Image) -> Image {
    let (w, h) = (img.width(), img.height());
    let mut out = Image::new(h, w, img.format(), 0);
    for y in 0..h {
        for x in 0..w {
            out.put_pixel(h - 1 - y, w - 1 - x, img.pixel(x, y));
        }
    }
    out
}

/// Quarter turn clockwise
pub fn rotate90(img: &Image) -> Image {
    let (w, h) = (img.width(), img.height());
    let mut out = Image::new(h, w, img.format(), 0);
    for y in 0..h {
        for x in 0..w {
            out.put_pixel(h - 1 - y, x, img.pixel(x, y));
        }
    }
    out
}

/// Render configured elements onto `surface` in order
pub fn draw_elements(
    surface: &mut Image,
    images: &HashMap<String, Image>,
    font: &Font,
    elements: &[Element],
) -> Result<()> {
    let format = surface.format();

    for element in elements {
        match element {
            Element::Rectangle(rect) => {
                let color = rect.color.pack(format);
                fill_rect(surface, rect.x, rect.y, rect.width, rect.height, color);
            }
            Element::Line(line) => {
                let color = line.color.pack(format);
                draw_line_styled(
                    surface,
                    Point::new(line.start.0, line.start.1),
                    Point::new(line.end.0, line.end.1),
                    line.stroke_width,
                    color,
                );
            }
            Element::Image(image) => {
                if let Some(key) = &image.key {
                    match images.get(key.as_str()) {
                        Some(img) => {
                            draw_image(surface, img, image);
                            continue;
                        }
                        None => {
                            return Err(anyhow!("image key not exist:{}", key.as_str()));
                        }
                    }
                }

                if let Some(b64) = &image.base64 {
                    let image_data = decode_base64(b64.as_str())?;
                    let img = Image::load(&image_data).map_err(|err| anyhow!("decode image:{err}"))?;
                    draw_image(surface, &img, image);
                    continue;
                }
                return Err(anyhow!("image element needs a \"key\" or a \"base64\" string"));
            }
            Element::Text(t) => {
                let color = t.color.pack(format);
                match t.layout {
                    TextLayout::Chars => text::draw_string(&t.text, font, surface, t.x, t.y, t.max_width, color)?,
                    TextLayout::Words => {
                        text::draw_string_wrapped(&t.text, font, surface, t.x, t.y, t.max_width, color)?
                    }
                    TextLayout::Centered => text::draw_string_centered(&t.text, font, surface, t.y, color)?,
                }
            }
        }
    }
    debug!("drew {} elements", elements.len());
    Ok(())
}

fn draw_image(surface: &mut Image, img: &Image, element: &config::Image) {
    let region = element.region.unwrap_or_else(|| Region::of_image(img).at(element.x, element.y));
    blit(img, surface, &region);
}
