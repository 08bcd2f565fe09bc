//! Bit-level reader for Vorbis data.
//!
//! Reads individual bits LSB-first from a byte slice. Reading past the end of
//! the slice is an error, never zero-filled.

use crate::error::{WemError, WemResult};

/// Reads bits (LSB first) from a borrowed byte slice.
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// Create a new BitReader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Total number of bits read since creation.
    pub fn bits_consumed(&self) -> u64 {
        self.byte_pos as u64 * 8 + self.bit_pos as u64
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> WemResult<bool> {
        let Some(&byte) = self.data.get(self.byte_pos) else {
            return Err(WemError::end_of_stream("out of bits"));
        };

        let bit = (byte & (1 << self.bit_pos)) != 0;
        self.bit_pos += 1;

        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }

        Ok(bit)
    }

    /// Read up to 32 bits. A zero-width read returns 0 and consumes nothing.
    pub fn read_bits(&mut self, count: u8) -> WemResult<u32> {
        if count > 32 {
            return Err(WemError::parse("Cannot read more than 32 bits at once"));
        }

        let mut result = 0u32;
        for i in 0..count {
            if self.read_bit()? {
                result |= 1u32 << i;
            }
        }

        Ok(result)
    }

    /// Skip the unread remainder of the current byte.
    pub fn skip_to_byte_boundary(&mut self) {
        if self.bit_pos != 0 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bits_lsb_first() {
        let data = [0b10110100u8, 0b11001010u8];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(4).unwrap(), 0b0100);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1011);
        assert_eq!(reader.read_bits(8).unwrap(), 0b11001010);
    }

    #[test]
    fn test_single_bits() {
        let data = [0b10110100u8];
        let mut reader = BitReader::new(&data);

        let bits: Vec<bool> = (0..8).map(|_| reader.read_bit().unwrap()).collect();
        assert_eq!(
            bits,
            vec![false, false, true, false, true, true, false, true]
        );
    }

    #[test]
    fn test_read_zero_bits() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(0).unwrap(), 0);
        assert_eq!(reader.bits_consumed(), 0);
    }

    #[test]
    fn test_bits_consumed() {
        let data = [0xFF, 0xFF, 0xFF];
        let mut reader = BitReader::new(&data);

        reader.read_bits(5).unwrap();
        assert_eq!(reader.bits_consumed(), 5);

        reader.read_bits(7).unwrap();
        assert_eq!(reader.bits_consumed(), 12);

        reader.read_bit().unwrap();
        assert_eq!(reader.bits_consumed(), 13);
    }

    #[test]
    fn test_read_across_byte_boundary() {
        let data = [0xAB, 0xCD];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(12).unwrap(), 0xDAB);
    }

    #[test]
    fn test_read_full_32_bits() {
        let data = [0x78, 0x56, 0x34, 0x12];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(32).unwrap(), 0x12345678);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);

        reader.read_bits(6).unwrap();
        assert!(matches!(
            reader.read_bits(4),
            Err(WemError::EndOfStream { .. })
        ));
    }

    #[test]
    fn test_too_many_bits() {
        let data = [0u8; 8];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_bits(33).is_err());
    }

    #[test]
    fn test_skip_to_byte_boundary() {
        let data = [0xFF, 0x5A];
        let mut reader = BitReader::new(&data);

        reader.skip_to_byte_boundary();
        assert_eq!(reader.bits_consumed(), 0);

        reader.read_bits(3).unwrap();
        reader.skip_to_byte_boundary();
        assert_eq!(reader.bits_consumed(), 8);
        assert_eq!(reader.read_bits(8).unwrap(), 0x5A);
    }
}
