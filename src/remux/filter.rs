use crate::format::rtmp::{RtmpMsg, RTMP_CODEC_ID_AVC, RTMP_CODEC_ID_HEVC, RTMP_SOUND_FORMAT_AAC};
use crate::format::ts::{ProgramLayout, STREAM_TYPE_AAC, STREAM_TYPE_H264, STREAM_TYPE_H265};

/// Holds back the first messages of a stream until its codec layout is
/// known, so that the PAT/PMT written ahead of them announces the right
/// elementary streams.
///
/// Draining happens once: when both an audio and a video message have been
/// seen, or when the queue reaches its capacity. After that every message is
/// forwarded untouched.
#[derive(Debug)]
pub struct MessageFilter {
    capacity: usize,
    queue: Vec<RtmpMsg>,
    audio_format: Option<u8>,
    video_codec: Option<u8>,
    done: bool,
}

/// What the filter did with a pushed message.
#[derive(Debug)]
pub enum Admission {
    /// Held in the queue.
    Queued,
    /// Filter already drained; process the message directly.
    Forward,
    /// This message completed detection; the queue, ending with it, is
    /// handed back in arrival order.
    Drained(Drained),
}

#[derive(Debug)]
pub struct Drained {
    pub layout: ProgramLayout,
    pub messages: Vec<RtmpMsg>,
}

impl MessageFilter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            queue: Vec::with_capacity(capacity),
            audio_format: None,
            video_codec: None,
            done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn push(&mut self, msg: &RtmpMsg) -> Admission {
        if self.done {
            return Admission::Forward;
        }

        if msg.is_audio() {
            if self.audio_format.is_none() {
                self.audio_format = msg.audio_sound_format();
            }
        } else if msg.is_video() && self.video_codec.is_none() {
            self.video_codec = msg.video_codec_id();
        }
        self.queue.push(msg.clone());

        let detected = self.audio_format.is_some() && self.video_codec.is_some();
        if detected || self.queue.len() >= self.capacity {
            Admission::Drained(self.drain())
        } else {
            Admission::Queued
        }
    }

    /// Ends detection early, e.g. at end of stream. `None` once drained or
    /// when nothing was ever queued.
    pub fn finish(&mut self) -> Option<Drained> {
        if self.done {
            return None;
        }
        self.done = true;
        if self.queue.is_empty() {
            return None;
        }
        Some(self.drain())
    }

    /// Layout implied by what has been seen so far. Unrecognised codecs are
    /// left out of the PMT; if neither stream is recognised the H.264 + AAC
    /// default is used.
    pub fn layout(&self) -> ProgramLayout {
        let video_stream_type = match self.video_codec {
            Some(RTMP_CODEC_ID_AVC) => Some(STREAM_TYPE_H264),
            Some(RTMP_CODEC_ID_HEVC) => Some(STREAM_TYPE_H265),
            _ => None,
        };
        let audio_stream_type = match self.audio_format {
            Some(RTMP_SOUND_FORMAT_AAC) => Some(STREAM_TYPE_AAC),
            _ => None,
        };

        if video_stream_type.is_none() && audio_stream_type.is_none() {
            return ProgramLayout::default();
        }
        ProgramLayout {
            video_stream_type,
            audio_stream_type,
        }
    }

    fn drain(&mut self) -> Drained {
        self.done = true;
        Drained {
            layout: self.layout(),
            messages: std::mem::take(&mut self.queue),
        }
    }
}
