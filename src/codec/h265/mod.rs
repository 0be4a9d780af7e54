//! # H.265/HEVC
//!
//! NAL unit classification and `HEVCDecoderConfigurationRecord` handling.
//! HEVC NAL headers are two bytes; only the first carries the type.

/// Decoder configuration record parsing
pub mod parser;

/// NAL unit types and fixed units
pub mod types;


pub use parser::{seq_header_to_annexb, HEVCDecoderConfig};
pub use types::{NALUnitType, AUD_NALU};
