//! # AAC
//!
//! AudioSpecificConfig parsing and ADTS header synthesis. RTMP carries raw
//! AAC access units; MPEG-TS wants each one behind a 7-byte ADTS header.
//!
//! ```rust
//! use tsremux::codec::aac::AscContext;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // AAC-LC, 44.1 kHz, stereo
//! let asc = AscContext::parse(&[0x12, 0x10])?;
//! let header = asc.pack_adts_header(200)?;
//! assert_eq!(header.len(), 7);
//! assert_eq!(&header[..2], &[0xFF, 0xF1]);
//! # Ok(())
//! # }
//! ```

/// AudioSpecificConfig context
pub mod parser;
/// Profile, configuration and ADTS header types
pub mod types;

pub use parser::AscContext;
pub use types::{AACConfig, ADTSHeader, ProfileType, ADTS_HEADER_SIZE};
