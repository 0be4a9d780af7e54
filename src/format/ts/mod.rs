//! # MPEG Transport Stream Output
//!
//! The write side of MPEG-TS as an HLS remuxer needs it:
//!
//! - [`Frame`]: one PES worth of elementary stream data with its timing
//! - [`pack_frame`]: frame to 188-byte transport packets, continuity
//!   counters included
//! - [`ProgramLayout`]: PAT/PMT generation for H.264/H.265 video and AAC
//!   audio
//!
//! ## Example
//!
//! ```rust
//! use tsremux::format::ts::{pack_frame, Frame, ProgramLayout, StreamKind, TS_PACKET_SIZE};
//!
//! let layout = ProgramLayout::default();
//! let mut segment = layout.fragment_header().to_vec();
//!
//! let mut frame = Frame {
//!     pts: 90_000,
//!     dts: 90_000,
//!     cc: 0,
//!     key: false,
//!     stream: StreamKind::Audio,
//!     raw: vec![0xff, 0xf1, 0x50, 0x80, 0x01, 0x1f, 0xfc, 0x21],
//! };
//! pack_frame(&mut frame, layout.pcr_pid(), |packet| segment.extend_from_slice(packet));
//!
//! assert_eq!(segment.len(), 3 * TS_PACKET_SIZE);
//! assert_eq!(frame.cc, 1);
//! ```

/// Frame and stream identity
pub mod frame;

/// Frame packetizer
pub mod packer;

/// PES header writer
pub mod pes;

/// PAT/PMT generation
pub mod psi;

/// Core TS types and constants
pub mod types;

pub use frame::{Frame, StreamKind};
pub use packer::pack_frame;
pub use pes::PESHeader;
pub use psi::ProgramLayout;
pub use types::{
    TSHeader, PID_AUDIO, PID_PAT, PID_PMT, PID_VIDEO, STREAM_TYPE_AAC, STREAM_TYPE_H264,
    STREAM_TYPE_H265, TS_PACKET_SIZE,
};
