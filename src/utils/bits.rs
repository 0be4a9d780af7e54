use crate::error::{RemuxError, Result};

/// MSB-first bit reader over a byte slice.
///
/// Covers what codec configuration parsing needs: fixed-width fields and
/// the unsigned/signed exp-Golomb codes (ue(v), se(v)) of H.264.
///
/// ```
/// use tsremux::utils::BitReader;
///
/// let data = [0b1011_0011];
/// let mut reader = BitReader::new(&data);
///
/// assert_eq!(reader.read_bit().unwrap(), true);
/// assert_eq!(reader.read_bits(3).unwrap(), 0b011);
/// ```
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_offset: usize,
    bit_offset: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            byte_offset: 0,
            bit_offset: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = *self
            .data
            .get(self.byte_offset)
            .ok_or_else(|| RemuxError::Parser("bitstream exhausted".into()))?;

        let bit = (byte >> (7 - self.bit_offset)) & 1;
        self.bit_offset += 1;
        if self.bit_offset == 8 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }

        Ok(bit == 1)
    }

    /// Reads `n` bits (at most 32) as a big-endian number.
    pub fn read_bits(&mut self, n: u32) -> Result<u32> {
        if n > 32 {
            return Err(RemuxError::Parser(format!("cannot read {} bits at once", n)));
        }
        if n as usize > self.available_bits() {
            return Err(RemuxError::Parser("bitstream exhausted".into()));
        }

        let mut value = 0u64;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Ok(value as u32)
    }

    /// ue(v)
    pub fn read_golomb(&mut self) -> Result<u32> {
        let mut leading_zeros = 0u32;
        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros > 31 {
                return Err(RemuxError::Parser("invalid exp-golomb code".into()));
            }
        }

        if leading_zeros == 0 {
            return Ok(0);
        }

        let info = self.read_bits(leading_zeros)?;
        Ok(((1u64 << leading_zeros) + info as u64 - 1) as u32)
    }

    /// se(v)
    pub fn read_signed_golomb(&mut self) -> Result<i32> {
        let k = self.read_golomb()?;
        let magnitude = ((k as i64 + 1) >> 1) as i32;
        Ok(if k & 1 == 1 { magnitude } else { -magnitude })
    }

    pub fn skip_bits(&mut self, n: u32) -> Result<()> {
        if n as usize > self.available_bits() {
            return Err(RemuxError::Parser("bitstream exhausted".into()));
        }
        let bits = self.bit_offset as usize + n as usize;
        self.byte_offset += bits / 8;
        self.bit_offset = (bits % 8) as u8;
        Ok(())
    }

    pub fn available_bits(&self) -> usize {
        (self.data.len().saturating_sub(self.byte_offset)) * 8 - self.bit_offset as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_read_bits_across_bytes() {
        let data = [0b1011_0011, 0b0101_1010];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(8).unwrap(), 0b1001_1010);
        assert_eq!(reader.read_bits(5).unwrap(), 0b11010);
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_read_bits_limits() {
        let data = [0xFF; 8];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
        assert!(reader.read_bits(33).is_err());
        assert_eq!(reader.read_bits(32).unwrap(), 0xFFFF_FFFF);

        let mut short = BitReader::new(&data[..1]);
        assert!(short.read_bits(9).is_err());
    }

    #[test]
    fn test_read_golomb() {
        // (bits, value)
        let cases: [(u8, u32); 6] = [
            (0b1000_0000, 0),
            (0b0100_0000, 1),
            (0b0110_0000, 2),
            (0b0010_0000, 3),
            (0b0011_0000, 5),
            (0b0001_0010, 8),
        ];
        for (byte, expected) in cases {
            let data = [byte];
            let mut reader = BitReader::new(&data);
            assert_eq!(reader.read_golomb().unwrap(), expected, "pattern {:08b}", byte);
        }

        let zeros = [0u8; 5];
        assert!(BitReader::new(&zeros).read_golomb().is_err());
    }

    #[test]
    fn test_read_signed_golomb() {
        // '1' -> 0, '010' -> +1, '011' -> -1, '00100' -> +2
        let data = [0b1010_0110, 0b0100_0000];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_signed_golomb().unwrap(), 0);
        assert_eq!(reader.read_signed_golomb().unwrap(), 1);
        assert_eq!(reader.read_signed_golomb().unwrap(), -1);
        assert_eq!(reader.read_signed_golomb().unwrap(), 2);
    }

    #[test]
    fn test_skip_bits() {
        let data = [0xF0, 0x0F];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(4).unwrap();
        assert_eq!(reader.read_bits(8).unwrap(), 0x00);
        assert_eq!(reader.available_bits(), 4);
        assert!(reader.skip_bits(5).is_err());
    }

    #[quickcheck]
    fn prop_read_bits_matches_manual(data: Vec<u8>, n: u8) -> bool {
        let n = (n % 33) as usize;
        let mut reader = BitReader::new(&data);
        match reader.read_bits(n as u32) {
            Ok(value) => {
                let mut expected = 0u64;
                for i in 0..n {
                    let bit = (data[i / 8] >> (7 - i % 8)) & 1;
                    expected = (expected << 1) | bit as u64;
                }
                value as u64 == expected
            }
            Err(_) => n > data.len() * 8,
        }
    }
}
