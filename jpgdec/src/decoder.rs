//! Main JPEG decoder implementation

use alloc::vec;
use alloc::vec::Vec;
use log::{debug, warn};

use crate::huffman::{BitReader, HuffmanTable};
use crate::idct::{block_idct, ycbcr_to_rgb565};
use crate::tables::ZIGZAG;
use crate::types::{Component, FormatError, Result};

/// JPEG marker codes
mod markers {
    pub const SOI: u8 = 0xD8; // Start of Image
    pub const SOF0: u8 = 0xC0; // Start of Frame (Baseline)
    pub const DHT: u8 = 0xC4; // Define Huffman Table
    pub const DQT: u8 = 0xDB; // Define Quantization Table
    pub const DRI: u8 = 0xDD; // Define Restart Interval
    pub const SOS: u8 = 0xDA; // Start of Scan
    pub const EOI: u8 = 0xD9; // End of Image
    pub const TEM: u8 = 0x01; // Temporary use, no payload
    pub const RST0: u8 = 0xD0; // Restart markers
    pub const RST7: u8 = 0xD7;
}

/// Largest sampling factor accepted for any component
const MAX_SAMPLING: u8 = 2;

/// Baseline JPEG decoder.
///
/// `prepare` parses the headers up to the start of scan; `decompress` then
/// decodes the entropy-coded data of the same buffer.
pub struct JpegDecoder {
    width: u16,
    height: u16,
    components: heapless::Vec<Component, 3>,
    /// Y-DC, chroma-DC, Y-AC, chroma-AC (class * 2 + id)
    huffman: [Option<HuffmanTable>; 4],
    /// Quantization tables in zig-zag order, as stored in the stream
    qtables: [Option<[u8; 64]>; 4],
    restart_interval: u16,
    /// Offset of the first entropy-coded byte, 0 until SOS was parsed
    scan_start: usize,
}

impl JpegDecoder {
    /// Create a new JPEG decoder
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            components: heapless::Vec::new(),
            huffman: [None, None, None, None],
            qtables: [None; 4],
            restart_interval: 0,
            scan_start: 0,
        }
    }

    /// Parse all segments up to and including SOS
    pub fn prepare(&mut self, data: &[u8]) -> Result<()> {
        if data.len() < 2 || data[0] != 0xFF || data[1] != markers::SOI {
            return Err(FormatError::MissingSoi);
        }

        let mut pos = 2;
        loop {
            let marker = Self::next_marker(data, &mut pos)?;

            match marker {
                markers::RST0..=markers::RST7 | markers::SOI | markers::TEM => continue,
                markers::EOI => return Err(FormatError::EoiBeforeScan),
                _ => {}
            }

            if pos + 2 > data.len() {
                return Err(FormatError::Truncated);
            }
            let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
            if length < 2 {
                return Err(FormatError::SegmentLength(marker));
            }
            let end = pos + length;
            if end > data.len() {
                return Err(FormatError::Truncated);
            }
            let segment = &data[pos + 2..end];
            pos = end;

            match marker {
                markers::SOF0 => self.parse_sof(segment)?,
                markers::DHT => self.parse_dht(segment)?,
                markers::DQT => self.parse_dqt(segment)?,
                markers::DRI => self.parse_dri(segment)?,
                markers::SOS => {
                    self.parse_sos(segment)?;
                    self.scan_start = pos;
                    return Ok(());
                }
                0xC1..=0xCF => {
                    // progressive, lossless, arithmetic-coded...
                    warn!("unsupported jpeg frame type {marker:#04x}");
                    return Err(FormatError::UnsupportedFrame(marker));
                }
                _ => {
                    // APPn, COM and anything else carries nothing we need
                }
            }
        }
    }

    /// Read the marker at `pos`, skipping fill bytes
    fn next_marker(data: &[u8], pos: &mut usize) -> Result<u8> {
        match data.get(*pos) {
            Some(0xFF) => {}
            Some(_) => return Err(FormatError::ExpectedMarker(*pos)),
            None => return Err(FormatError::Truncated),
        }
        while data.get(*pos) == Some(&0xFF) {
            *pos += 1;
        }
        let marker = *data.get(*pos).ok_or(FormatError::Truncated)?;
        *pos += 1;
        Ok(marker)
    }

    /// Parse Start of Frame
    fn parse_sof(&mut self, data: &[u8]) -> Result<()> {
        if data.len() < 6 {
            return Err(FormatError::Truncated);
        }

        let precision = data[0];
        if precision != 8 {
            return Err(FormatError::Precision(precision));
        }

        self.height = u16::from_be_bytes([data[1], data[2]]);
        self.width = u16::from_be_bytes([data[3], data[4]]);
        let count = data[5];

        if count != 1 && count != 3 {
            return Err(FormatError::ComponentCount(count));
        }
        if self.width == 0 || self.height == 0 {
            return Err(FormatError::ZeroDimension);
        }
        if data.len() < 6 + count as usize * 3 {
            return Err(FormatError::Truncated);
        }

        self.components.clear();
        for spec in data[6..6 + count as usize * 3].chunks_exact(3) {
            let (mut h, mut v) = (spec[1] >> 4, spec[1] & 0x0F);
            let qtable = spec[2];

            if h == 0 || v == 0 || h > MAX_SAMPLING || v > MAX_SAMPLING {
                return Err(FormatError::Sampling);
            }
            if qtable > 3 {
                return Err(FormatError::TableId(qtable));
            }
            // a single-component scan is never interleaved
            if count == 1 {
                h = 1;
                v = 1;
            }

            let component = Component {
                id: spec[0],
                h,
                v,
                qtable,
                dc_table: 0,
                ac_table: 2,
            };
            self.components
                .push(component)
                .map_err(|_| FormatError::ComponentCount(count))?;
        }

        let luma = self.components[0];
        for chroma in self.components.iter().skip(1) {
            if luma.h % chroma.h != 0 || luma.v % chroma.v != 0 {
                return Err(FormatError::Sampling);
            }
        }

        debug!(
            "jpeg frame {}x{}, {} component(s), luma sampling {}x{}",
            self.width, self.height, count, luma.h, luma.v
        );
        Ok(())
    }

    /// Parse Define Huffman Table (one or more tables per segment)
    fn parse_dht(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            if data.len() < 17 {
                return Err(FormatError::Truncated);
            }

            let table_info = data[0];
            let class = table_info >> 4; // 0=DC, 1=AC
            let id = table_info & 0x0F;

            if class > 1 || id > 1 {
                return Err(FormatError::TableId(table_info));
            }

            let counts = &data[1..17];
            let num_codes: usize = counts.iter().map(|&b| b as usize).sum();

            if data.len() < 17 + num_codes {
                return Err(FormatError::Truncated);
            }

            let values = &data[17..17 + num_codes];
            self.huffman[(class * 2 + id) as usize] = Some(HuffmanTable::new(counts, values)?);

            data = &data[17 + num_codes..];
        }

        Ok(())
    }

    /// Parse Define Quantization Table (one or more tables per segment)
    fn parse_dqt(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let table_info = data[0];
            let precision = table_info >> 4;
            let id = table_info & 0x0F;

            if precision != 0 {
                return Err(FormatError::Precision(precision));
            }
            if id > 3 {
                return Err(FormatError::TableId(id));
            }
            if data.len() < 65 {
                return Err(FormatError::Truncated);
            }

            let mut table = [0u8; 64];
            table.copy_from_slice(&data[1..65]);
            self.qtables[id as usize] = Some(table);

            data = &data[65..];
        }

        Ok(())
    }

    /// Parse Define Restart Interval
    fn parse_dri(&mut self, data: &[u8]) -> Result<()> {
        if data.len() < 2 {
            return Err(FormatError::Truncated);
        }

        self.restart_interval = u16::from_be_bytes([data[0], data[1]]);
        debug!("jpeg restart interval {}", self.restart_interval);
        Ok(())
    }

    /// Parse Start of Scan
    fn parse_sos(&mut self, data: &[u8]) -> Result<()> {
        if self.components.is_empty() {
            return Err(FormatError::ScanHeader);
        }
        let count = *data.first().ok_or(FormatError::Truncated)?;
        if count as usize != self.components.len() {
            return Err(FormatError::ScanHeader);
        }
        if data.len() < 1 + count as usize * 2 + 3 {
            return Err(FormatError::Truncated);
        }

        for selector in data[1..1 + count as usize * 2].chunks_exact(2) {
            let tables = selector[1];
            let (dc, ac) = (tables >> 4, tables & 0x0F);
            if dc > 1 || ac > 1 {
                return Err(FormatError::TableId(tables));
            }

            let component = self
                .components
                .iter_mut()
                .find(|c| c.id == selector[0])
                .ok_or(FormatError::ScanHeader)?;
            component.dc_table = dc as usize;
            component.ac_table = ac as usize + 2;
        }

        for component in self.components.iter() {
            if self.huffman[component.dc_table].is_none()
                || self.huffman[component.ac_table].is_none()
                || self.qtables[component.qtable as usize].is_none()
            {
                return Err(FormatError::MissingTable);
            }
        }

        Ok(())
    }

    /// Decode the scan into little-endian RGB565 pixels
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if self.scan_start == 0 || self.components.is_empty() {
            return Err(FormatError::ScanHeader);
        }

        let luma = self.components[0];
        let mcu_w = luma.h as usize * 8;
        let mcu_h = luma.v as usize * 8;
        let (width, height) = (self.width as usize, self.height as usize);
        let mcus_x = width.div_ceil(mcu_w);
        let mcus_y = height.div_ceil(mcu_h);

        // each block needs at least a DC code and an AC code
        let blocks_per_mcu: usize = self.components.iter().map(|c| c.blocks()).sum();
        let min_bits = mcus_x * mcus_y * blocks_per_mcu * 2;
        if data.len().saturating_sub(self.scan_start) * 8 < min_bits {
            return Err(FormatError::Truncated);
        }

        let mut planes: heapless::Vec<Vec<i32>, 3> = heapless::Vec::new();
        for component in self.components.iter() {
            planes
                .push(vec![0i32; component.blocks() * 64])
                .map_err(|_| FormatError::ComponentCount(self.components.len() as u8))?;
        }

        let mut pixels = vec![0u8; width * height * crate::BYTES_PER_PIXEL];
        let mut reader = BitReader::new(data, self.scan_start);
        let mut predictors = [0i16; 3];
        let mut coefficients = [0i32; 64];
        let mut mcu_index = 0u32;

        for mcu_y in 0..mcus_y {
            for mcu_x in 0..mcus_x {
                if self.restart_interval > 0
                    && mcu_index > 0
                    && mcu_index % self.restart_interval as u32 == 0
                {
                    reader.restart()?;
                    predictors = [0; 3];
                }
                mcu_index += 1;

                for (index, component) in self.components.iter().enumerate() {
                    let plane = &mut planes[index];
                    let stride = component.h as usize * 8;
                    let level_shift = if index == 0 { 128 } else { 0 };

                    for block in 0..component.blocks() {
                        self.decode_block(
                            &mut reader,
                            component,
                            &mut predictors[index],
                            &mut coefficients,
                        )?;
                        block_idct(&mut coefficients);

                        let bx = (block % component.h as usize) * 8;
                        let by = (block / component.h as usize) * 8;
                        for (y, row) in coefficients.chunks_exact(8).enumerate() {
                            let start = (by + y) * stride + bx;
                            for (dst, &src) in plane[start..start + 8].iter_mut().zip(row) {
                                *dst = src + level_shift;
                            }
                        }
                    }
                }

                self.output_mcu(&planes, &mut pixels, mcu_x * mcu_w, mcu_y * mcu_h);
            }
        }

        Ok(pixels)
    }

    /// Huffman-decode and dequantize one 8x8 block into raster order
    fn decode_block(
        &self,
        reader: &mut BitReader,
        component: &Component,
        predictor: &mut i16,
        coefficients: &mut [i32; 64],
    ) -> Result<()> {
        let qtable = self.qtables[component.qtable as usize]
            .as_ref()
            .ok_or(FormatError::MissingTable)?;
        let dc_table = self.huffman[component.dc_table]
            .as_ref()
            .ok_or(FormatError::MissingTable)?;
        let ac_table = self.huffman[component.ac_table]
            .as_ref()
            .ok_or(FormatError::MissingTable)?;

        coefficients.fill(0);

        let dc_len = dc_table.decode(reader)?;
        if dc_len > 11 {
            return Err(FormatError::Coefficient);
        }
        let dc_diff = if dc_len > 0 {
            Self::extend(reader.read_bits(dc_len)?, dc_len)
        } else {
            0
        };
        *predictor = predictor.wrapping_add(dc_diff as i16);
        coefficients[0] = *predictor as i32 * qtable[0] as i32;

        let mut z = 1;
        while z < 64 {
            let symbol = ac_table.decode(reader)?;
            let zero_run = (symbol >> 4) as usize;
            let ac_len = symbol & 0x0F;

            if ac_len == 0 {
                if zero_run == 15 {
                    // ZRL: sixteen zeros, may end exactly at the last coefficient
                    z += 16;
                    if z > 64 {
                        return Err(FormatError::Coefficient);
                    }
                    continue;
                }
                // EOB - remaining coefficients are zero
                break;
            }

            z += zero_run;
            if z > 63 {
                return Err(FormatError::Coefficient);
            }

            let value = Self::extend(reader.read_bits(ac_len)?, ac_len);
            coefficients[ZIGZAG[z] as usize] = value * qtable[z] as i32;
            z += 1;
        }

        Ok(())
    }

    /// Sign-extend a `len`-bit magnitude category value
    fn extend(v: u16, len: u8) -> i32 {
        let v = v as i32;
        if v < 1 << (len - 1) {
            v - (1 << len) + 1
        } else {
            v
        }
    }

    /// Upsample chroma, convert and store one MCU, clipped to the frame
    fn output_mcu(&self, planes: &[Vec<i32>], pixels: &mut [u8], x0: usize, y0: usize) {
        let luma = self.components[0];
        let mcu_w = luma.h as usize * 8;
        let mcu_h = luma.v as usize * 8;
        let (width, height) = (self.width as usize, self.height as usize);

        let chroma_at = |index: usize, x: usize, y: usize| -> i32 {
            match self.components.get(index) {
                Some(c) => {
                    let sx = x / (luma.h / c.h) as usize;
                    let sy = y / (luma.v / c.v) as usize;
                    planes[index][sy * c.h as usize * 8 + sx]
                }
                None => 0,
            }
        };

        for y in 0..mcu_h.min(height - y0) {
            for x in 0..mcu_w.min(width - x0) {
                let luma_sample = planes[0][y * mcu_w + x];
                let color = ycbcr_to_rgb565(luma_sample, chroma_at(1, x, y), chroma_at(2, x, y));
                let offset = ((y0 + y) * width + x0 + x) * crate::BYTES_PER_PIXEL;
                pixels[offset..offset + 2].copy_from_slice(&color.to_le_bytes());
            }
        }
    }

    /// Get image width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get image height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Get number of components
    pub fn components(&self) -> u8 {
        self.components.len() as u8
    }

    /// Restart interval in MCUs, 0 when disabled
    pub fn restart_interval(&self) -> u16 {
        self.restart_interval
    }
}

impl Default for JpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}
