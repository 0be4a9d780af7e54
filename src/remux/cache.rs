use bytes::Bytes;

use crate::codec::aac::{AscContext, ADTS_HEADER_SIZE};
use crate::codec::{h264, h265};
use crate::error::{RemuxError, Result};
use crate::format::rtmp::{AUDIO_TAG_HEADER_SIZE, RTMP_CODEC_ID_AVC, RTMP_CODEC_ID_HEVC};

/// Latest codec initialization data of a stream.
///
/// Setters replace the cached value only when the new sequence header
/// parses; a failed update leaves the previous value in place.
#[derive(Debug, Default)]
pub struct SequenceHeaderCache {
    /// Annex-B SPS/PPS (or VPS/SPS/PPS), 4-byte start codes
    param_sets: Option<Bytes>,
    asc: Option<AscContext>,
}

impl SequenceHeaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a complete video sequence-header tag body.
    pub fn set_video_param_set(&mut self, seq_header: &[u8]) -> Result<()> {
        let annexb = match seq_header.first().map(|b| b & 0x0f) {
            Some(RTMP_CODEC_ID_AVC) => h264::seq_header_to_annexb(seq_header)?,
            Some(RTMP_CODEC_ID_HEVC) => h265::seq_header_to_annexb(seq_header)?,
            other => {
                return Err(RemuxError::InvalidData(format!(
                    "unsupported video codec id {:?} in sequence header",
                    other
                )))
            }
        };
        self.param_sets = Some(Bytes::from(annexb));
        Ok(())
    }

    /// Takes a complete AAC sequence-header tag body.
    pub fn set_audio_config(&mut self, seq_header: &[u8]) -> Result<()> {
        let asc = seq_header.get(AUDIO_TAG_HEADER_SIZE..).ok_or_else(|| {
            RemuxError::InvalidData(format!("aac seq header too short: {} bytes", seq_header.len()))
        })?;
        self.asc = Some(AscContext::parse(asc)?);
        Ok(())
    }

    pub fn has_video_param_set(&self) -> bool {
        self.param_sets.is_some()
    }

    pub fn has_audio_config(&self) -> bool {
        self.asc.is_some()
    }

    pub fn video_param_set(&self) -> Option<&[u8]> {
        self.param_sets.as_deref()
    }

    pub fn audio_config(&self) -> Option<&AscContext> {
        self.asc.as_ref()
    }
}

/// ADTS frames waiting to be emitted together as one audio PES.
#[derive(Debug, Default)]
pub struct AudioCache {
    frames: Vec<u8>,
    first_frame_dts: u64,
}

impl AudioCache {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Timestamp of the oldest buffered frame; meaningless when empty.
    pub fn first_frame_dts(&self) -> u64 {
        self.first_frame_dts
    }

    /// Whether the oldest buffered frame lags `now` by more than `max_delay`.
    pub fn is_due(&self, now: u64, max_delay: u64) -> bool {
        !self.is_empty() && self.first_frame_dts + max_delay < now
    }

    pub fn append(&mut self, dts: u64, adts_header: &[u8; ADTS_HEADER_SIZE], raw: &[u8]) {
        if self.frames.is_empty() {
            self.first_frame_dts = dts;
        }
        self.frames.extend_from_slice(adts_header);
        self.frames.extend_from_slice(raw);
    }

    /// Moves the buffered bytes out, leaving the cache empty.
    pub fn take(&mut self) -> Option<(Vec<u8>, u64)> {
        if self.frames.is_empty() {
            return None;
        }
        Some((std::mem::take(&mut self.frames), self.first_frame_dts))
    }

    /// Hands an emitted buffer back so its allocation can be reused.
    pub fn recycle(&mut self, mut buf: Vec<u8>) {
        if self.frames.is_empty() && buf.capacity() > self.frames.capacity() {
            buf.clear();
            self.frames = buf;
        }
    }
}
