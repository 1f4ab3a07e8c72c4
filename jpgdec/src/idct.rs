//! Integer IDCT and color conversion
//!
//! Chen-Wang separable 8x8 IDCT: a row pass with 8 fractional bits of
//! headroom, then a column pass whose outputs go through the clip table.

use crate::tables::clip;

const W1: i64 = 2841; // 2048*sqrt(2)*cos(1*pi/16)
const W2: i64 = 2676; // 2048*sqrt(2)*cos(2*pi/16)
const W3: i64 = 2408; // 2048*sqrt(2)*cos(3*pi/16)
const W5: i64 = 1609; // 2048*sqrt(2)*cos(5*pi/16)
const W6: i64 = 1108; // 2048*sqrt(2)*cos(6*pi/16)
const W7: i64 = 565; // 2048*sqrt(2)*cos(7*pi/16)

/// In-place IDCT of a dequantized block in raster order.
/// Outputs are clipped to [-256, 255], level shift not applied.
pub fn block_idct(block: &mut [i32; 64]) {
    for row in block.chunks_exact_mut(8) {
        idct_row(row);
    }
    for col in 0..8 {
        idct_col(block, col);
    }
}

fn idct_row(blk: &mut [i32]) {
    let mut x1 = (blk[4] as i64) << 11;
    let mut x2 = blk[6] as i64;
    let mut x3 = blk[2] as i64;
    let mut x4 = blk[1] as i64;
    let mut x5 = blk[7] as i64;
    let mut x6 = blk[5] as i64;
    let mut x7 = blk[3] as i64;

    if x1 | x2 | x3 | x4 | x5 | x6 | x7 == 0 {
        let dc = blk[0] << 3;
        blk.fill(dc);
        return;
    }

    let mut x0 = ((blk[0] as i64) << 11) + 128;

    // first stage
    let mut x8 = W7 * (x4 + x5);
    x4 = x8 + (W1 - W7) * x4;
    x5 = x8 - (W1 + W7) * x5;
    x8 = W3 * (x6 + x7);
    x6 = x8 - (W3 - W5) * x6;
    x7 = x8 - (W3 + W5) * x7;

    // second stage
    x8 = x0 + x1;
    x0 -= x1;
    x1 = W6 * (x3 + x2);
    x2 = x1 - (W2 + W6) * x2;
    x3 = x1 + (W2 - W6) * x3;
    x1 = x4 + x6;
    x4 -= x6;
    x6 = x5 + x7;
    x5 -= x7;

    // third stage
    x7 = x8 + x3;
    x8 -= x3;
    x3 = x0 + x2;
    x0 -= x2;
    x2 = (181 * (x4 + x5) + 128) >> 8;
    x4 = (181 * (x4 - x5) + 128) >> 8;

    // fourth stage
    blk[0] = ((x7 + x1) >> 8) as i32;
    blk[1] = ((x3 + x2) >> 8) as i32;
    blk[2] = ((x0 + x4) >> 8) as i32;
    blk[3] = ((x8 + x6) >> 8) as i32;
    blk[4] = ((x8 - x6) >> 8) as i32;
    blk[5] = ((x0 - x4) >> 8) as i32;
    blk[6] = ((x3 - x2) >> 8) as i32;
    blk[7] = ((x7 - x1) >> 8) as i32;
}

fn idct_col(blk: &mut [i32; 64], col: usize) {
    let at = |row: usize| blk[row * 8 + col] as i64;

    let mut x1 = at(4) << 8;
    let mut x2 = at(6);
    let mut x3 = at(2);
    let mut x4 = at(1);
    let mut x5 = at(7);
    let mut x6 = at(5);
    let mut x7 = at(3);

    if x1 | x2 | x3 | x4 | x5 | x6 | x7 == 0 {
        let v = clip((at(0) + 32) >> 6);
        for row in 0..8 {
            blk[row * 8 + col] = v;
        }
        return;
    }

    let mut x0 = (at(0) << 8) + 8192;

    // first stage
    let mut x8 = W7 * (x4 + x5) + 4;
    x4 = (x8 + (W1 - W7) * x4) >> 3;
    x5 = (x8 - (W1 + W7) * x5) >> 3;
    x8 = W3 * (x6 + x7) + 4;
    x6 = (x8 - (W3 - W5) * x6) >> 3;
    x7 = (x8 - (W3 + W5) * x7) >> 3;

    // second stage
    x8 = x0 + x1;
    x0 -= x1;
    x1 = W6 * (x3 + x2) + 4;
    x2 = (x1 - (W2 + W6) * x2) >> 3;
    x3 = (x1 + (W2 - W6) * x3) >> 3;
    x1 = x4 + x6;
    x4 -= x6;
    x6 = x5 + x7;
    x5 -= x7;

    // third stage
    x7 = x8 + x3;
    x8 -= x3;
    x3 = x0 + x2;
    x0 -= x2;
    x2 = (181 * (x4 + x5) + 128) >> 8;
    x4 = (181 * (x4 - x5) + 128) >> 8;

    // fourth stage
    let out = [
        x7 + x1,
        x3 + x2,
        x0 + x4,
        x8 + x6,
        x8 - x6,
        x0 - x4,
        x3 - x2,
        x7 - x1,
    ];
    for (row, v) in out.into_iter().enumerate() {
        blk[row * 8 + col] = clip(v >> 14);
    }
}

/// YCbCr (luma level-shifted, chroma centered on zero) to RGB565.
/// Rec.601 full range in 8.8 fixed point.
#[inline(always)]
pub fn ycbcr_to_rgb565(y: i32, cb: i32, cr: i32) -> u16 {
    let y = y << 8;
    let r = ((y + 359 * cr) >> 8).clamp(0, 255) as u16;
    let g = ((y - 88 * cb - 183 * cr) >> 8).clamp(0, 255) as u16;
    let b = ((y + 454 * cb) >> 8).clamp(0, 255) as u16;
    ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_only_block_is_flat() {
        let mut block = [0i32; 64];
        block[0] = 256;
        block_idct(&mut block);
        assert!(block.iter().all(|&v| v == 32));
    }

    #[test]
    fn test_zero_block() {
        let mut block = [0i32; 64];
        block_idct(&mut block);
        assert!(block.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_horizontal_frequency() {
        let mut block = [0i32; 64];
        block[1] = 64;
        block_idct(&mut block);
        // every row identical, decreasing left to right
        for row in block.chunks_exact(8) {
            assert_eq!(row, &block[0..8]);
        }
        assert!(block[0] > 0 && block[7] < 0);
        assert!(block[0] >= block[3] && block[3] >= block[7]);
    }

    #[test]
    fn test_extreme_input_is_clipped() {
        let mut block = [i16::MAX as i32 * 255; 64];
        block_idct(&mut block);
        assert!(block.iter().all(|&v| (-256..=255).contains(&v)));
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(ycbcr_to_rgb565(160, 0, 0), 0xA514);
        assert_eq!(ycbcr_to_rgb565(255, 0, 0), 0xFFFF);
        assert_eq!(ycbcr_to_rgb565(0, 0, 0), 0x0000);
        // strong red: R saturates, B stays low
        let c = ycbcr_to_rgb565(76, -43, 127);
        assert_eq!(c >> 11, 0x1F);
        assert!(c & 0x1F < 4);
    }
}
