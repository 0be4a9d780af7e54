#![doc(html_root_url = "https://docs.rs/tsremux/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::missing_crate_level_docs)]

//! # tsremux - RTMP to MPEG-TS remuxing
//!
//! `tsremux` converts the audio/video messages of an RTMP stream into
//! MPEG-TS packets ready to be cut into HLS segments. Nothing is decoded or
//! transcoded: H.264/H.265 access units are reframed from AVCC to Annex-B
//! and AAC frames are wrapped in ADTS.
//!
//! ## Features
//!
//! - H.264/AVC and H.265/HEVC video, AAC audio
//! - Parameter sets and access unit delimiters regenerated per access unit
//! - Audio batched into multi-frame PES packets with bounded latency
//! - Segment boundary hints on every emitted frame
//! - PAT/PMT built from the codec layout detected at stream start
//!
//! ## Quick Start
//!
//! ```rust
//! use tsremux::format::ts::{Frame, TS_PACKET_SIZE};
//! use tsremux::{RemuxObserver, RtmpMsg, TsRemuxer};
//!
//! #[derive(Default)]
//! struct Segment {
//!     bytes: Vec<u8>,
//!     cuts: usize,
//! }
//!
//! impl RemuxObserver for Segment {
//!     fn on_pat_pmt(&mut self, pat_pmt: &[u8]) {
//!         self.bytes.extend_from_slice(pat_pmt);
//!     }
//!
//!     fn on_ts_packets(&mut self, _: &mut TsRemuxer, packets: &[u8], _: &Frame, boundary: bool) {
//!         if boundary {
//!             self.cuts += 1;
//!         }
//!         self.bytes.extend_from_slice(packets);
//!     }
//! }
//!
//! let mut remuxer = TsRemuxer::default();
//! let mut segment = Segment::default();
//!
//! // AVC sequence header carrying one SPS and one PPS
//! let seq_header = vec![
//!     0x17, 0x00, 0x00, 0x00, 0x00, 0x01, 0x42, 0x00, 0x28, 0xff, 0xe1, 0x00, 0x04, 0x67, 0x42,
//!     0x00, 0x28, 0x01, 0x00, 0x02, 0x68, 0xce,
//! ];
//! // key frame with a single IDR slice
//! let idr = vec![0x17, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x65, 0x88];
//!
//! remuxer.on_ordered_message(&RtmpMsg::video(0, seq_header), &mut segment);
//! remuxer.on_ordered_message(&RtmpMsg::video(40, idr), &mut segment);
//!
//! assert_eq!(segment.cuts, 1);
//! assert_eq!(segment.bytes.len(), TS_PACKET_SIZE);
//! ```
//!
//! ## Module Overview
//!
//! - `remux`: the [`TsRemuxer`] session and its [`RemuxObserver`]
//! - `codec`: H.264, H.265 and AAC bitstream helpers
//! - `format`: RTMP message model and MPEG-TS writers
//! - `pipeline`: async drivers over streams and tokio channels
//! - `config`: tunables, environment and file overrides
//! - `error`: [`RemuxError`] and the crate [`Result`] alias
//! - `utils`: bit reader and MPEG-2 CRC32

/// Codec helpers for video and audio bitstreams
pub mod codec;

/// Configuration module
pub mod config;

/// Error types and utilities
pub mod error;

/// RTMP input and MPEG-TS output formats
pub mod format;

/// Async drivers
pub mod pipeline;

/// The remuxer
pub mod remux;

/// Common utilities and helper functions
pub mod utils;

pub use config::RemuxConfig;
pub use error::{RemuxError, Result};
pub use format::rtmp::{RtmpHeader, RtmpMsg};
pub use remux::{RemuxObserver, TsRemuxer};
