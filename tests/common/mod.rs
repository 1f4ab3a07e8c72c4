#![allow(dead_code)]

use photoframe::font::{BitmapFont, Font};

pub const GRAY_160: u32 = 0xA514;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, marker];
    out.extend_from_slice(&(payload.len() as u16 + 2).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

fn huffman_payload(info: u8, counts: &[u8], values: &[u8]) -> Vec<u8> {
    let mut payload = vec![info];
    let mut all = [0u8; 16];
    all[..counts.len()].copy_from_slice(counts);
    payload.extend_from_slice(&all);
    payload.extend_from_slice(values);
    payload
}

fn unit_qtable(id: u8) -> Vec<u8> {
    let mut payload = vec![id];
    payload.extend_from_slice(&[1u8; 64]);
    segment(0xDB, &payload)
}

/// DC: "0" -> category 0, "10" -> category 9. AC: "0" -> EOB.
fn luma_tables() -> Vec<u8> {
    let mut payload = huffman_payload(0x00, &[1, 1], &[0, 9]);
    payload.extend(huffman_payload(0x10, &[1], &[0x00]));
    segment(0xC4, &payload)
}

/// 16x16 grayscale, every pixel Y = 160
pub fn gray_jpeg() -> Vec<u8> {
    gray_jpeg_with(None, &[0xA0, 0x00, 0x3F])
}

/// 16x8 grayscale with a restart marker between the two blocks
pub fn restart_jpeg() -> Vec<u8> {
    gray_jpeg_with(Some(1), &[0xA0, 0x0F, 0xFF, 0xD0, 0xA0, 0x0F])
}

fn gray_jpeg_with(restart: Option<u16>, scan: &[u8]) -> Vec<u8> {
    let (width, height): (u16, u16) = if restart.is_some() { (16, 8) } else { (16, 16) };
    let mut out = vec![0xFF, 0xD8];
    out.extend(segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0"));
    out.extend(unit_qtable(0));
    let [h0, h1] = height.to_be_bytes();
    let [w0, w1] = width.to_be_bytes();
    out.extend(segment(0xC0, &[8, h0, h1, w0, w1, 1, 1, 0x11, 0]));
    out.extend(luma_tables());
    if let Some(interval) = restart {
        out.extend(segment(0xDD, &interval.to_be_bytes()));
    }
    out.extend(segment(0xDA, &[1, 1, 0x00, 0, 63, 0]));
    out.extend_from_slice(scan);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// 16x16 4:2:0 color, Y = 160 and neutral chroma
pub fn color_jpeg() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(unit_qtable(0));
    data.extend(unit_qtable(1));
    data.extend(segment(0xC0, &[8, 0, 16, 0, 16, 3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]));
    data.extend(luma_tables());
    let mut chroma = huffman_payload(0x01, &[1], &[0]);
    chroma.extend(huffman_payload(0x11, &[1], &[0x00]));
    data.extend(segment(0xC4, &chroma));
    data.extend(segment(0xDA, &[3, 1, 0x00, 2, 0x11, 3, 0x11, 0, 63, 0]));
    data.extend_from_slice(&[0xA0, 0x00, 0x03, 0xFF, 0xD9]);
    data
}

/// Decoded colors of the two halves of [`two_tone_jpeg`]
pub const TEAL_BLUE: u32 = 0x755B;
pub const SAND: u32 = 0xCCAC;

/// 32x16 4:2:0 stream of two MCUs with luma 160. The left MCU has
/// Cb +32 and Cr -32, the right one the opposite.
pub fn two_tone_jpeg() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend(unit_qtable(0));
    data.extend(unit_qtable(1));
    data.extend(segment(0xC0, &[8, 0, 16, 0, 32, 3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]));
    data.extend(luma_tables());
    let mut chroma = huffman_payload(0x01, &[1, 2], &[0, 9, 10]);
    chroma.extend(huffman_payload(0x11, &[1], &[0x00]));
    data.extend(segment(0xC4, &chroma));
    data.extend(segment(0xDA, &[3, 1, 0x00, 2, 0x11, 3, 0x11, 0, 63, 0]));
    data.extend_from_slice(&[0xA0, 0x00, 0x28, 0x02, 0x7F, 0x80, 0x37, 0xFD, 0xC0, 0x0F, 0xFF, 0xD9]);
    data
}

/// Gray stream cut off in the middle of its DHT segment
pub fn truncated_dht_jpeg() -> Vec<u8> {
    let data = gray_jpeg();
    let dht = data
        .windows(2)
        .position(|w| w == [0xFF, 0xC4])
        .unwrap_or(data.len());
    data[..dht + 12].to_vec()
}

/// 3x4 bitmap font with glyphs for ' ' and '!'
pub const FONT_CHARS: [u8; 8] = [
    0x00, 0x00, 0x00, 0x00, // ' '
    0x40, 0x40, 0x00, 0x40, // '!'
];

pub fn font() -> Font<'static> {
    Font::Bitmap(BitmapFont {
        char_width: 3,
        char_height: 4,
        char_space: 1,
        line_space: 1,
        chars: &FONT_CHARS,
    })
}
