//! Container formats on both sides of the remuxer: RTMP/FLV tag bodies in,
//! MPEG-TS out.

pub mod rtmp;
pub mod ts;

pub use self::rtmp::{RtmpHeader, RtmpMsg};
pub use self::ts::{Frame, ProgramLayout, StreamKind};
