use std::mem;

use log::{debug, error, info, warn};

use super::remuxer::dump_head;
use super::{RemuxObserver, TsRemuxer};
use crate::codec::{h264, h265, split_avcc, NALU_START_CODE3, NALU_START_CODE4};
use crate::error::{RemuxError, Result};
use crate::format::rtmp::{RtmpMsg, RTMP_CODEC_ID_AVC, RTMP_CODEC_ID_HEVC, VIDEO_TAG_HEADER_SIZE};
use crate::format::ts::{Frame, StreamKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VideoCodec {
    Avc,
    Hevc,
}

/// How a source NAL unit is treated while reframing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NalRole {
    /// Regenerated by the remuxer, dropped from the input
    Dropped,
    /// Needs the parameter sets in front
    Key,
    /// Re-arms parameter set injection for the next key unit
    NonKey,
    Passthrough,
}

impl VideoCodec {
    fn from_codec_id(codec_id: u8) -> Option<Self> {
        match codec_id {
            RTMP_CODEC_ID_AVC => Some(VideoCodec::Avc),
            RTMP_CODEC_ID_HEVC => Some(VideoCodec::Hevc),
            _ => None,
        }
    }

    fn aud(self) -> &'static [u8] {
        match self {
            VideoCodec::Avc => &h264::AUD_NALU,
            VideoCodec::Hevc => &h265::AUD_NALU,
        }
    }

    fn role(self, header: u8) -> NalRole {
        match self {
            VideoCodec::Avc => {
                let nal_type = h264::NALUnitType::from_header(header);
                if nal_type.is_param_set_or_aud() {
                    NalRole::Dropped
                } else if nal_type.is_keyframe() {
                    NalRole::Key
                } else if nal_type == h264::NALUnitType::CodedSliceNonIDR {
                    NalRole::NonKey
                } else {
                    NalRole::Passthrough
                }
            }
            VideoCodec::Hevc => {
                let nal_type = h265::NALUnitType::from_header(header);
                if nal_type.is_param_set_or_aud() {
                    NalRole::Dropped
                } else if nal_type.is_keyframe() {
                    NalRole::Key
                } else {
                    NalRole::NonKey
                }
            }
        }
    }
}

/// Rewrites the AVCC body of one video message as an Annex-B access unit
/// into `out`.
///
/// Source parameter sets and delimiters are dropped. One AUD goes in front
/// of the first kept unit, and `param_sets` in front of a key unit unless
/// they were already written with no non-key slice in between. The first
/// unit written uses a 4-byte start code and the rest 3 bytes. Nothing is
/// written when every unit was dropped.
pub(crate) fn reframe_avcc(
    codec: VideoCodec,
    avcc: &[u8],
    param_sets: Option<&[u8]>,
    out: &mut Vec<u8>,
) -> Result<()> {
    let mut aud_sent = false;
    let mut param_sets_sent = false;

    for nal in split_avcc(avcc)? {
        let role = codec.role(nal[0]);
        if role == NalRole::Dropped {
            continue;
        }

        if !aud_sent {
            out.extend_from_slice(codec.aud());
            aud_sent = true;
        }

        match role {
            NalRole::Key => {
                if !param_sets_sent {
                    let param_sets = param_sets
                        .ok_or(RemuxError::MissingSequenceHeader("video parameter sets"))?;
                    out.extend_from_slice(param_sets);
                }
                param_sets_sent = true;
            }
            NalRole::NonKey => param_sets_sent = false,
            _ => {}
        }

        if out.is_empty() {
            out.extend_from_slice(&NALU_START_CODE4);
        } else {
            out.extend_from_slice(&NALU_START_CODE3);
        }
        out.extend_from_slice(nal);
    }

    Ok(())
}

impl TsRemuxer {
    pub(super) fn feed_video<O>(&mut self, msg: &RtmpMsg, observer: &mut O)
    where
        O: RemuxObserver + ?Sized,
    {
        let payload = &msg.payload[..];
        if payload.len() <= VIDEO_TAG_HEADER_SIZE {
            error!(
                "[{}] invalid video message length. header={:?}, payload={:02x?}",
                self.unique_key, msg.header, payload
            );
            return;
        }

        let Some(codec) = VideoCodec::from_codec_id(payload[0] & 0x0f) else {
            debug!(
                "[{}] unsupported video codec id {}, dropped",
                self.unique_key,
                payload[0] & 0x0f
            );
            return;
        };

        if msg.is_video_key_seq_header() {
            match self.seq_headers.set_video_param_set(payload) {
                Ok(()) => {
                    info!("[{}] cache video seq header. codec={:?}", self.unique_key, codec);
                    if codec == VideoCodec::Avc {
                        self.log_sps_info(payload);
                    }
                }
                Err(err) => error!("[{}] cache video seq header failed. err={}", self.unique_key, err),
            }
            return;
        }

        let cts = msg.composition_time().unwrap_or(0);

        let mut out = mem::take(&mut self.video_out);
        out.clear();
        let reframed = reframe_avcc(
            codec,
            &payload[VIDEO_TAG_HEADER_SIZE..],
            self.seq_headers.video_param_set(),
            &mut out,
        );
        match reframed {
            Err(RemuxError::MissingSequenceHeader(what)) => {
                warn!("[{}] append {} but not cached, frame dropped", self.unique_key, what);
                self.video_out = out;
                return;
            }
            Err(err) => {
                error!(
                    "[{}] iterate nalu failed. err={}, header={:?}, payload={:02x?}",
                    self.unique_key,
                    err,
                    msg.header,
                    dump_head(payload)
                );
                self.video_out = out;
                return;
            }
            Ok(()) if out.is_empty() => {
                debug!(
                    "[{}] video message without coded units. ts={}",
                    self.unique_key, msg.header.timestamp_abs
                );
                self.video_out = out;
                return;
            }
            Ok(()) => {}
        }

        let dts = u64::from(msg.header.timestamp_abs) * 90;
        let pts = (dts as i64 + i64::from(cts) * 90).max(0) as u64;

        if self
            .audio_cache
            .is_due(dts, self.config.max_audio_cache_delay_by_video)
        {
            self.flush_audio(observer);
        }

        let frame = Frame {
            pts,
            dts,
            cc: self.video_cc,
            key: msg.is_video_key_nalu(),
            stream: StreamKind::Video,
            raw: out,
        };
        let frame = self.emit(frame, observer);
        self.video_out = frame.raw;
    }

    fn log_sps_info(&self, seq_header: &[u8]) {
        let info = seq_header
            .get(VIDEO_TAG_HEADER_SIZE..)
            .and_then(|record| h264::AVCDecoderConfig::parse(record).ok())
            .and_then(|config| config.sps.first().and_then(|sps| h264::parse_sps(sps).ok()));
        if let Some(info) = info {
            info!(
                "[{}] sps. profile={}, level={}, size={}x{}",
                self.unique_key, info.profile_idc, info.level_idc, info.width, info.height
            );
        }
    }
}
