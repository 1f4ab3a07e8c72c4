//! Constant tables used during decoding

/// Zig-zag scan position to raster (row-major) position
pub const ZIGZAG: [u8; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10,
    17, 24, 32, 25, 18, 11, 4, 5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6, 7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

const CLIP_MIN: i32 = -512;
const CLIP_LEN: usize = 1024;

/// Saturating clip for IDCT output, pre-expanded over [-512, 511]
static CLIP: [i16; CLIP_LEN] = {
    let mut table = [0i16; CLIP_LEN];
    let mut i = 0;
    while i < CLIP_LEN {
        let v = i as i32 + CLIP_MIN;
        table[i] = if v < -256 {
            -256
        } else if v > 255 {
            255
        } else {
            v as i16
        };
        i += 1;
    }
    table
};

/// Clamp an IDCT output sample to [-256, 255]
#[inline(always)]
pub fn clip(v: i64) -> i32 {
    let index = v.clamp(CLIP_MIN as i64, CLIP_MIN as i64 + CLIP_LEN as i64 - 1) - CLIP_MIN as i64;
    CLIP[index as usize] as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag_is_permutation() {
        let mut seen = [false; 64];
        for &i in ZIGZAG.iter() {
            assert!(!seen[i as usize]);
            seen[i as usize] = true;
        }
        assert_eq!(ZIGZAG[2], 8);
        assert_eq!(ZIGZAG[63], 63);
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip(0), 0);
        assert_eq!(clip(-100), -100);
        assert_eq!(clip(255), 255);
        assert_eq!(clip(256), 255);
        assert_eq!(clip(-300), -256);
        assert_eq!(clip(100_000), 255);
        assert_eq!(clip(-100_000), -256);
    }
}
