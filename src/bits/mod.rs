//! Bit-level reader over in-memory file data
//!
//! The MovieObject container mixes byte-aligned fields with sub-byte flag
//! runs, so all parsing goes through one cursor that counts in bits.
//! Bit order is big-endian: the first bit read from a byte is its MSB.

use crate::{BdNavError, Result};

/// Bit cursor over a byte slice.
///
/// Reads never wrap or saturate: any access past the end of the data fails
/// with [`BdNavError::Format`], which is what turns a truncated file into a
/// parse error at the exact field that ran short.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Cursor position in bits from the start of `data`
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `data`
    pub fn new(data: &'a [u8]) -> Self {
        BitReader { data, pos: 0 }
    }

    /// Move the cursor to an absolute byte offset
    pub fn seek_byte(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(BdNavError::Format(format!(
                "seek to byte {} beyond end of data ({} bytes)",
                offset,
                self.data.len()
            )));
        }
        self.pos = offset * 8;
        Ok(())
    }

    /// Read `n` bits (`n` <= 32), MSB first, and return them right-aligned
    pub fn read(&mut self, n: u32) -> Result<u32> {
        debug_assert!(n <= 32);
        self.require(n)?;

        let mut value: u32 = 0;
        for _ in 0..n {
            let byte = self.data[self.pos >> 3];
            let bit = (byte >> (7 - (self.pos & 7))) & 1;
            value = (value << 1) | u32::from(bit);
            self.pos += 1;
        }
        Ok(value)
    }

    /// Read one bit as a boolean
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read(1)? != 0)
    }

    /// Advance the cursor by `n` bits without decoding them
    pub fn skip(&mut self, n: u32) -> Result<()> {
        self.require(n)?;
        self.pos += n as usize;
        Ok(())
    }

    /// Current cursor position in bits from the start of the data
    pub fn position_bits(&self) -> usize {
        self.pos
    }

    fn require(&self, n: u32) -> Result<()> {
        if self.pos + n as usize > self.data.len() * 8 {
            return Err(BdNavError::Format(format!(
                "unexpected end of data at bit {} (need {} more bits, have {})",
                self.pos,
                n,
                self.data.len() * 8 - self.pos
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_msb_first() {
        let data = [0b1010_0000];
        let mut r = BitReader::new(&data);
        assert!(r.read_bit().unwrap());
        assert!(!r.read_bit().unwrap());
        assert!(r.read_bit().unwrap());
        assert!(!r.read_bit().unwrap());
    }

    #[test]
    fn test_read_spans_byte_boundary() {
        let data = [0x12, 0x34, 0x56];
        let mut r = BitReader::new(&data);
        r.skip(4).unwrap();
        // Bits 4..16: 0x234
        assert_eq!(r.read(12).unwrap(), 0x234);
        assert_eq!(r.read(8).unwrap(), 0x56);
    }

    #[test]
    fn test_read_u32_big_endian() {
        let data = 0xDEAD_BEEFu32.to_be_bytes();
        let mut r = BitReader::new(&data);
        assert_eq!(r.read(32).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_seek_and_position() {
        let data = [0u8; 64];
        let mut r = BitReader::new(&data);
        r.seek_byte(40).unwrap();
        assert_eq!(r.position_bits(), 320);
        r.skip(13).unwrap();
        assert_eq!(r.position_bits(), 333);
    }

    #[test]
    fn test_seek_past_end() {
        let data = [0u8; 8];
        let mut r = BitReader::new(&data);
        assert!(matches!(r.seek_byte(9), Err(BdNavError::Format(_))));
        // Seeking exactly to the end is legal; reading from there is not.
        r.seek_byte(8).unwrap();
        assert!(r.read(1).is_err());
    }

    #[test]
    fn test_short_read_fails() {
        let data = [0xFF, 0xFF];
        let mut r = BitReader::new(&data);
        r.read(10).unwrap();
        assert!(matches!(r.read(7), Err(BdNavError::Format(_))));
        // A failed read leaves the cursor where it was.
        assert_eq!(r.position_bits(), 10);
        assert_eq!(r.read(6).unwrap(), 0x3F);
    }

    #[test]
    fn test_skip_past_end_fails() {
        let data = [0u8; 2];
        let mut r = BitReader::new(&data);
        assert!(r.skip(17).is_err());
        assert!(r.skip(16).is_ok());
    }
}
