//! # Bitstream Utilities
//!
//! Small helpers shared by the codec and container modules:
//!
//! - [`BitReader`]: MSB-first bit reader with exp-Golomb support, used to
//!   decode AudioSpecificConfig and H.264 SPS fields
//! - [`Crc32Mpeg2`]: the CRC32 variant that terminates every PSI section
//!
//! ```rust
//! use tsremux::utils::BitReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let asc = [0x12, 0x10];
//! let mut reader = BitReader::new(&asc);
//! assert_eq!(reader.read_bits(5)?, 2); // AAC-LC object type
//! assert_eq!(reader.read_bits(4)?, 4); // 44.1 kHz
//! # Ok(())
//! # }
//! ```

/// Bit-level reading of codec configuration records
pub mod bits;

/// MPEG-2 CRC32 for PSI tables
pub mod crc;

pub use bits::BitReader;
pub use crc::Crc32Mpeg2;
