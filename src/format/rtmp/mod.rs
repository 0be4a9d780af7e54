//! # RTMP Message Model
//!
//! The remuxer consumes RTMP audio/video messages whose payloads are FLV
//! tag bodies. This module holds the message type and the predicates that
//! read the FLV tag header bytes.

use bytes::Bytes;

pub const RTMP_TYPE_ID_AUDIO: u8 = 8;
pub const RTMP_TYPE_ID_VIDEO: u8 = 9;
pub const RTMP_TYPE_ID_METADATA: u8 = 18;

pub const RTMP_CODEC_ID_AVC: u8 = 7;
pub const RTMP_CODEC_ID_HEVC: u8 = 12;

pub const RTMP_FRAME_TYPE_KEY: u8 = 1;
pub const RTMP_AVC_PACKET_TYPE_SEQ_HEADER: u8 = 0;
pub const RTMP_AVC_PACKET_TYPE_NALU: u8 = 1;

pub const RTMP_SOUND_FORMAT_AAC: u8 = 10;
pub const RTMP_AAC_PACKET_TYPE_SEQ_HEADER: u8 = 0;

/// Byte 0 of an AVC key-frame tag.
pub const RTMP_AVC_KEY_FRAME: u8 = RTMP_FRAME_TYPE_KEY << 4 | RTMP_CODEC_ID_AVC;
/// Byte 0 of an HEVC key-frame tag.
pub const RTMP_HEVC_KEY_FRAME: u8 = RTMP_FRAME_TYPE_KEY << 4 | RTMP_CODEC_ID_HEVC;

/// Size of the FLV video tag header: frame type/codec id, packet type and
/// the 24-bit composition time offset.
pub const VIDEO_TAG_HEADER_SIZE: usize = 5;
/// Size of the FLV AAC audio tag header: sound format byte and packet type.
pub const AUDIO_TAG_HEADER_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtmpHeader {
    pub csid: u32,
    /// Declared message length; informational, the payload length is what
    /// the remuxer trusts.
    pub msg_len: u32,
    pub msg_type_id: u8,
    pub msg_stream_id: u32,
    /// Absolute timestamp in milliseconds.
    pub timestamp_abs: u32,
}

/// One ordered RTMP message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtmpMsg {
    pub header: RtmpHeader,
    pub payload: Bytes,
}

impl RtmpMsg {
    pub fn new(msg_type_id: u8, timestamp_abs: u32, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self {
            header: RtmpHeader {
                msg_len: payload.len() as u32,
                msg_type_id,
                timestamp_abs,
                ..Default::default()
            },
            payload,
        }
    }

    pub fn audio(timestamp_abs: u32, payload: impl Into<Bytes>) -> Self {
        Self::new(RTMP_TYPE_ID_AUDIO, timestamp_abs, payload)
    }

    pub fn video(timestamp_abs: u32, payload: impl Into<Bytes>) -> Self {
        Self::new(RTMP_TYPE_ID_VIDEO, timestamp_abs, payload)
    }

    pub fn is_audio(&self) -> bool {
        self.header.msg_type_id == RTMP_TYPE_ID_AUDIO
    }

    pub fn is_video(&self) -> bool {
        self.header.msg_type_id == RTMP_TYPE_ID_VIDEO
    }

    /// Low nibble of byte 0 for video messages.
    pub fn video_codec_id(&self) -> Option<u8> {
        self.payload.first().map(|b| b & 0x0F)
    }

    /// High nibble of byte 0 for audio messages.
    pub fn audio_sound_format(&self) -> Option<u8> {
        self.payload.first().map(|b| b >> 4)
    }

    pub fn is_avc_key_seq_header(&self) -> bool {
        self.is_video() && self.packet_type_is(RTMP_AVC_KEY_FRAME, RTMP_AVC_PACKET_TYPE_SEQ_HEADER)
    }

    pub fn is_hevc_key_seq_header(&self) -> bool {
        self.is_video() && self.packet_type_is(RTMP_HEVC_KEY_FRAME, RTMP_AVC_PACKET_TYPE_SEQ_HEADER)
    }

    pub fn is_video_key_seq_header(&self) -> bool {
        self.is_avc_key_seq_header() || self.is_hevc_key_seq_header()
    }

    /// Key frame carrying coded NAL units (not a sequence header).
    pub fn is_video_key_nalu(&self) -> bool {
        self.is_video()
            && matches!(self.payload.first(), Some(b) if b >> 4 == RTMP_FRAME_TYPE_KEY)
            && self.payload.get(1) == Some(&RTMP_AVC_PACKET_TYPE_NALU)
    }

    pub fn is_aac_seq_header(&self) -> bool {
        self.is_audio()
            && self.audio_sound_format() == Some(RTMP_SOUND_FORMAT_AAC)
            && self.payload.get(1) == Some(&RTMP_AAC_PACKET_TYPE_SEQ_HEADER)
    }

    /// 24-bit composition time offset of a video tag, sign-extended.
    pub fn composition_time(&self) -> Option<i32> {
        let b = self.payload.get(2..VIDEO_TAG_HEADER_SIZE)?;
        let raw = (b[0] as i32) << 16 | (b[1] as i32) << 8 | b[2] as i32;
        Some((raw << 8) >> 8)
    }

    fn packet_type_is(&self, first: u8, packet_type: u8) -> bool {
        self.payload.first() == Some(&first) && self.payload.get(1) == Some(&packet_type)
    }
}
