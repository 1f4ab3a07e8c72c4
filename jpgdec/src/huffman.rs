//! Huffman decoding and the entropy-coded bit reader

use crate::types::{FormatError, Result};

/// Canonical Huffman table for DC or AC coefficients
#[derive(Debug)]
pub struct HuffmanTable {
    /// Number of codes for each bit length (1-16 bits)
    counts: [u8; 16],
    /// First code of each length
    min_code: [i32; 16],
    /// Last code of each length (min_code - 1 when the length is unused)
    max_code: [i32; 16],
    /// Index in `values` of the first symbol of each length
    value_pos: [u16; 16],
    /// Symbols in order of increasing code length
    values: heapless::Vec<u8, 256>,
}

impl HuffmanTable {
    /// Build a table from the 16 per-length counts and the symbol list of a
    /// DHT segment
    pub fn new(counts: &[u8], values: &[u8]) -> Result<Self> {
        if counts.len() != 16 {
            return Err(FormatError::HuffmanTable);
        }

        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total != values.len() {
            return Err(FormatError::Truncated);
        }

        let mut table = Self {
            counts: [0; 16],
            min_code: [0; 16],
            max_code: [0; 16],
            value_pos: [0; 16],
            values: heapless::Vec::new(),
        };
        table.counts.copy_from_slice(counts);
        table
            .values
            .extend_from_slice(values)
            .map_err(|_| FormatError::HuffmanTable)?;

        let mut code = 0i32;
        let mut pos = 0u16;
        for len in 0..16 {
            let count = counts[len] as i32;
            table.min_code[len] = code;
            table.max_code[len] = code + count - 1;
            table.value_pos[len] = pos;
            code += count;
            if code > 1 << (len + 1) {
                return Err(FormatError::HuffmanTable);
            }
            pos += count as u16;
            code <<= 1;
        }

        Ok(table)
    }

    /// Decode one symbol, growing the code one bit at a time
    pub fn decode(&self, bits: &mut BitReader) -> Result<u8> {
        let mut code = 0i32;

        for len in 0..16 {
            code = (code << 1) | bits.read_bit()? as i32;
            if self.counts[len] != 0 && code >= self.min_code[len] && code <= self.max_code[len] {
                let index = self.value_pos[len] as usize + (code - self.min_code[len]) as usize;
                return self.values.get(index).copied().ok_or(FormatError::HuffmanCode);
            }
        }

        Err(FormatError::HuffmanCode)
    }
}

/// Bit reader over entropy-coded data with byte-stuffing removal
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    current: u8,
    bits_left: u8,
}

impl<'a> BitReader<'a> {
    /// `pos` is the offset of the first entropy-coded byte in `data`
    pub fn new(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos,
            current: 0,
            bits_left: 0,
        }
    }

    /// Read a single bit
    pub fn read_bit(&mut self) -> Result<u8> {
        if self.bits_left == 0 {
            self.next_byte()?;
        }
        self.bits_left -= 1;
        Ok((self.current >> self.bits_left) & 1)
    }

    /// Read multiple bits (up to 16), most significant first
    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        if count > 16 {
            return Err(FormatError::Coefficient);
        }

        let mut result = 0u16;
        for _ in 0..count {
            result = (result << 1) | self.read_bit()? as u16;
        }
        Ok(result)
    }

    /// Drop buffered bits and step over the RSTn marker that must follow.
    /// Returns the marker's sequence number.
    pub fn restart(&mut self) -> Result<u8> {
        self.bits_left = 0;

        // fill bytes may precede a marker
        while self.data.get(self.pos) == Some(&0xFF) && self.data.get(self.pos + 1) == Some(&0xFF) {
            self.pos += 1;
        }

        match (self.data.get(self.pos), self.data.get(self.pos + 1)) {
            (Some(0xFF), Some(&m)) if (0xD0..=0xD7).contains(&m) => {
                self.pos += 2;
                Ok(m - 0xD0)
            }
            _ => Err(FormatError::MissingRestart),
        }
    }

    /// Offset of the next unread byte
    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn next_byte(&mut self) -> Result<()> {
        let byte = *self.data.get(self.pos).ok_or(FormatError::Truncated)?;
        self.pos += 1;

        if byte == 0xFF {
            match self.data.get(self.pos) {
                Some(0x00) => self.pos += 1,
                Some(&marker) => return Err(FormatError::UnexpectedMarker(marker)),
                None => return Err(FormatError::Truncated),
            }
        }

        self.current = byte;
        self.bits_left = 8;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitreader() {
        let data = [0b10110010, 0b01101100];
        let mut bs = BitReader::new(&data, 0);

        assert_eq!(bs.read_bit().unwrap(), 1);
        assert_eq!(bs.read_bit().unwrap(), 0);
        assert_eq!(bs.read_bits(3).unwrap(), 0b110);
        assert_eq!(bs.read_bits(5).unwrap(), 0b01001);
        assert_eq!(bs.position(), 2);
        assert_eq!(bs.read_bits(6).unwrap(), 0b101100);
        assert_eq!(bs.read_bit(), Err(FormatError::Truncated));
    }

    #[test]
    fn test_bitreader_byte_stuffing() {
        let data = [0xFF, 0x00, 0x80];
        let mut bs = BitReader::new(&data, 0);
        assert_eq!(bs.read_bits(8).unwrap(), 0xFF);
        assert_eq!(bs.read_bit().unwrap(), 1);
        assert_eq!(bs.position(), 3);
    }

    #[test]
    fn test_bitreader_stops_at_marker() {
        let data = [0xFF, 0xD9];
        let mut bs = BitReader::new(&data, 0);
        assert_eq!(bs.read_bit(), Err(FormatError::UnexpectedMarker(0xD9)));
    }

    #[test]
    fn test_bitreader_restart() {
        let data = [0xAB, 0xFF, 0xFF, 0xD3, 0x80];
        let mut bs = BitReader::new(&data, 0);
        assert_eq!(bs.read_bits(4).unwrap(), 0xA);
        assert_eq!(bs.restart().unwrap(), 3);
        assert_eq!(bs.read_bit().unwrap(), 1);

        let mut bs = BitReader::new(&[0x00, 0x00], 1);
        assert_eq!(bs.restart(), Err(FormatError::MissingRestart));
    }

    #[test]
    fn test_canonical_table() {
        // lengths: one code of 1 bit, two codes of 3 bits -> 0, 100, 101
        let mut counts = [0u8; 16];
        counts[0] = 1;
        counts[2] = 2;
        let table = HuffmanTable::new(&counts, &[0x00, 0x07, 0x12]).unwrap();

        let data = [0b0100_1010, 0b1111_1111];
        let mut bs = BitReader::new(&data, 0);
        assert_eq!(table.decode(&mut bs).unwrap(), 0x00);
        assert_eq!(table.decode(&mut bs).unwrap(), 0x07);
        assert_eq!(table.decode(&mut bs).unwrap(), 0x12);
        assert_eq!(table.decode(&mut bs).unwrap(), 0x00);
    }

    #[test]
    fn test_invalid_code() {
        let mut counts = [0u8; 16];
        counts[0] = 1;
        let table = HuffmanTable::new(&counts, &[0x05]).unwrap();
        let data = [0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00];
        let mut bs = BitReader::new(&data, 0);
        assert_eq!(table.decode(&mut bs), Err(FormatError::HuffmanCode));
    }

    #[test]
    fn test_oversubscribed_table() {
        let mut counts = [0u8; 16];
        counts[0] = 3;
        assert_eq!(
            HuffmanTable::new(&counts, &[1, 2, 3]).err(),
            Some(FormatError::HuffmanTable)
        );
    }

    #[test]
    fn test_count_mismatch() {
        let mut counts = [0u8; 16];
        counts[1] = 2;
        assert_eq!(HuffmanTable::new(&counts, &[1]).err(), Some(FormatError::Truncated));
    }
}
