//! # H.264/AVC
//!
//! NAL unit classification and `AVCDecoderConfigurationRecord` handling.
//!
//! ```rust
//! use tsremux::codec::h264::NALUnitType;
//!
//! assert_eq!(NALUnitType::from_header(0x65), NALUnitType::CodedSliceIDR);
//! assert!(NALUnitType::from_header(0x67).is_param_set_or_aud());
//! ```

/// Decoder configuration record and SPS parsing
pub mod parser;
/// NAL unit types and fixed units
pub mod types;

#[doc(inline)]
pub use parser::*;
#[doc(inline)]
pub use types::*;
