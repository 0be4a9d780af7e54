//! # RTMP to MPEG-TS Remuxing
//!
//! [`TsRemuxer`] turns an ordered sequence of RTMP audio/video messages
//! into MPEG-TS packets. Each emitted frame is reported to a
//! [`RemuxObserver`] together with a `boundary` flag that tells the
//! downstream segment writer where a new segment may start.
//!
//! The observer is not owned by the remuxer; it is lent to every call. That
//! lets an observer call back into the remuxer from inside
//! [`RemuxObserver::on_ts_packets`], typically to flush buffered audio
//! before it closes a segment.

mod audio;
mod cache;
mod filter;
mod remuxer;
mod video;

pub use cache::{AudioCache, SequenceHeaderCache};
pub use filter::{Admission, Drained, MessageFilter};
pub use remuxer::TsRemuxer;

use crate::format::ts::Frame;

/// Receiver of remuxer output.
pub trait RemuxObserver {
    /// PAT and PMT packets (2 * 188 bytes), delivered once before the first
    /// frame. The downstream writer should repeat them at the start of every
    /// segment.
    fn on_pat_pmt(&mut self, pat_pmt: &[u8]);

    /// One frame worth of transport packets.
    ///
    /// `ts_packets` is only valid for the duration of the call. `boundary`
    /// marks a frame that may open a new segment. The remuxer is handed back
    /// mutably so the observer may call [`TsRemuxer::flush_audio`] before
    /// cutting.
    fn on_ts_packets(
        &mut self,
        remuxer: &mut TsRemuxer,
        ts_packets: &[u8],
        frame: &Frame,
        boundary: bool,
    );
}

impl<T: RemuxObserver + ?Sized> RemuxObserver for Box<T> {
    fn on_pat_pmt(&mut self, pat_pmt: &[u8]) {
        (**self).on_pat_pmt(pat_pmt)
    }

    fn on_ts_packets(
        &mut self,
        remuxer: &mut TsRemuxer,
        ts_packets: &[u8],
        frame: &Frame,
        boundary: bool,
    ) {
        (**self).on_ts_packets(remuxer, ts_packets, frame, boundary)
    }
}
