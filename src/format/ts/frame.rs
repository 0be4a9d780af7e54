use super::types::{PID_AUDIO, PID_VIDEO, STREAM_ID_AUDIO, STREAM_ID_VIDEO};

/// Which elementary stream a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Audio,
    Video,
}

impl StreamKind {
    pub fn pid(self) -> u16 {
        match self {
            StreamKind::Audio => PID_AUDIO,
            StreamKind::Video => PID_VIDEO,
        }
    }

    pub fn stream_id(self) -> u8 {
        match self {
            StreamKind::Audio => STREAM_ID_AUDIO,
            StreamKind::Video => STREAM_ID_VIDEO,
        }
    }
}

/// One emission unit handed to the packetizer.
///
/// `cc` is the continuity counter for the first transport packet; packing
/// the frame leaves it at the value the next frame of the stream must use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Presentation timestamp, 90 kHz
    pub pts: u64,
    /// Decode timestamp, 90 kHz
    pub dts: u64,
    pub cc: u8,
    /// Random access point (video key frame)
    pub key: bool,
    pub stream: StreamKind,
    /// Elementary stream bytes: Annex-B video or concatenated ADTS frames
    pub raw: Vec<u8>,
}

impl Frame {
    pub fn pid(&self) -> u16 {
        self.stream.pid()
    }

    pub fn stream_id(&self) -> u8 {
        self.stream.stream_id()
    }
}
