use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info};

use super::cache::{AudioCache, SequenceHeaderCache};
use super::filter::{Admission, MessageFilter};
use super::RemuxObserver;
use crate::config::RemuxConfig;
use crate::format::rtmp::{RtmpMsg, RTMP_TYPE_ID_AUDIO, RTMP_TYPE_ID_VIDEO};
use crate::format::ts::{pack_frame, Frame, ProgramLayout, StreamKind, PID_AUDIO, PID_VIDEO};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Bytes of a payload shown in log lines.
pub(super) const LOG_DUMP_LEN: usize = 32;

pub(super) fn dump_head(payload: &[u8]) -> &[u8] {
    &payload[..payload.len().min(LOG_DUMP_LEN)]
}

/// Converts RTMP audio/video messages into MPEG-TS packets for one stream.
///
/// Video messages are reframed to Annex-B access units and emitted one PES
/// per message. AAC frames are wrapped in ADTS and batched: the batch is
/// emitted when it spans more than the configured audio delay, when a video
/// frame overtakes it, or on [`TsRemuxer::flush_audio`].
///
/// All methods are synchronous; one remuxer must not be driven from two
/// threads at once.
#[derive(Debug)]
pub struct TsRemuxer {
    pub(super) unique_key: String,
    pub(super) config: RemuxConfig,
    filter: MessageFilter,
    layout: Option<ProgramLayout>,
    pub(super) seq_headers: SequenceHeaderCache,
    pub(super) audio_cache: AudioCache,
    /// Scratch for the Annex-B output of one video message
    pub(super) video_out: Vec<u8>,
    /// Scratch for the transport packets of one frame
    packets: Vec<u8>,
    pub(super) audio_cc: u8,
    pub(super) video_cc: u8,
    opened: bool,
}

impl Default for TsRemuxer {
    fn default() -> Self {
        Self::new(RemuxConfig::default())
    }
}

impl TsRemuxer {
    pub fn new(config: RemuxConfig) -> Self {
        let unique_key = format!(
            "TSREMUX{}",
            NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed)
        );
        debug!("[{}] lifecycle new ts remuxer. config={:?}", unique_key, config);

        Self {
            unique_key,
            filter: MessageFilter::new(config.filter_queue_size),
            config,
            layout: None,
            seq_headers: SequenceHeaderCache::new(),
            audio_cache: AudioCache::default(),
            video_out: Vec::new(),
            packets: Vec::new(),
            audio_cc: 0,
            video_cc: 0,
            opened: false,
        }
    }

    /// Log identifier of this instance, `TSREMUX<n>`.
    pub fn unique_key(&self) -> &str {
        &self.unique_key
    }

    pub fn config(&self) -> &RemuxConfig {
        &self.config
    }

    /// Entry point for raw stream input. Messages pass the startup filter
    /// first; the PAT/PMT is emitted once the layout is known.
    pub fn feed_rtmp_message<O>(&mut self, msg: &RtmpMsg, observer: &mut O)
    where
        O: RemuxObserver + ?Sized,
    {
        match self.filter.push(msg) {
            Admission::Queued => {}
            Admission::Forward => self.on_ordered_message(msg, observer),
            Admission::Drained(drained) => {
                info!(
                    "[{}] layout detected. layout={:?}, queued={}",
                    self.unique_key,
                    drained.layout,
                    drained.messages.len()
                );
                self.layout = Some(drained.layout);
                let pat_pmt = drained.layout.fragment_header();
                self.on_pat_pmt(&pat_pmt, observer);
                for queued in &drained.messages {
                    self.on_ordered_message(queued, observer);
                }
            }
        }
    }

    /// Forwards PAT/PMT bytes to the observer unchanged.
    pub fn on_pat_pmt<O>(&mut self, pat_pmt: &[u8], observer: &mut O)
    where
        O: RemuxObserver + ?Sized,
    {
        observer.on_pat_pmt(pat_pmt);
    }

    /// Processes one message, bypassing the startup filter. Anything other
    /// than audio or video is ignored.
    pub fn on_ordered_message<O>(&mut self, msg: &RtmpMsg, observer: &mut O)
    where
        O: RemuxObserver + ?Sized,
    {
        match msg.header.msg_type_id {
            RTMP_TYPE_ID_AUDIO => self.feed_audio(msg, observer),
            RTMP_TYPE_ID_VIDEO => self.feed_video(msg, observer),
            _ => {}
        }
    }

    /// Emits buffered audio as one frame. Does nothing when the buffer is
    /// empty.
    ///
    /// Safe to call from inside [`RemuxObserver::on_ts_packets`]: the buffer
    /// is cleared before the audio frame is reported.
    pub fn flush_audio<O>(&mut self, observer: &mut O)
    where
        O: RemuxObserver + ?Sized,
    {
        let Some((raw, dts)) = self.audio_cache.take() else {
            return;
        };

        let frame = Frame {
            pts: dts,
            dts,
            cc: self.audio_cc,
            key: false,
            stream: StreamKind::Audio,
            raw,
        };
        let frame = self.emit(frame, observer);
        self.audio_cache.recycle(frame.raw);
    }

    /// End of stream: drains a startup filter that never completed, then
    /// flushes buffered audio.
    pub fn finish<O>(&mut self, observer: &mut O)
    where
        O: RemuxObserver + ?Sized,
    {
        if let Some(drained) = self.filter.finish() {
            self.layout = Some(drained.layout);
            let pat_pmt = drained.layout.fragment_header();
            self.on_pat_pmt(&pat_pmt, observer);
            for queued in &drained.messages {
                self.on_ordered_message(queued, observer);
            }
        }
        self.flush_audio(observer);
        info!("[{}] lifecycle finish ts remuxer", self.unique_key);
    }

    pub fn audio_seq_header_cached(&self) -> bool {
        self.seq_headers.has_audio_config()
    }

    pub fn video_seq_header_cached(&self) -> bool {
        self.seq_headers.has_video_param_set()
    }

    pub fn audio_cache_empty(&self) -> bool {
        self.audio_cache.is_empty()
    }

    /// Whether a segment has been opened, i.e. any boundary was reported.
    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn audio_cc(&self) -> u8 {
        self.audio_cc
    }

    pub fn video_cc(&self) -> u8 {
        self.video_cc
    }

    /// Layout announced in the PAT/PMT, once the startup filter drained.
    pub fn layout(&self) -> Option<ProgramLayout> {
        self.layout
    }

    /// Whether `frame` may start a new segment.
    ///
    /// Audio frames only matter for audio-only streams. A video key frame
    /// is held back as a cut point only while an audio stream is known, a
    /// segment is already open and no audio is pending.
    fn is_boundary(&self, frame: &Frame) -> bool {
        match frame.stream {
            StreamKind::Audio => !self.video_seq_header_cached(),
            StreamKind::Video => {
                frame.key
                    && (!self.audio_seq_header_cached()
                        || !self.opened
                        || !self.audio_cache_empty())
            }
        }
    }

    fn pcr_pid(&self) -> u16 {
        match self.layout {
            Some(layout) => layout.pcr_pid(),
            None if self.video_seq_header_cached() || !self.audio_seq_header_cached() => PID_VIDEO,
            None => PID_AUDIO,
        }
    }

    /// Decides the boundary, packetizes and reports `frame`. The frame is
    /// handed back so its buffer can be reused.
    pub(super) fn emit<O>(&mut self, mut frame: Frame, observer: &mut O) -> Frame
    where
        O: RemuxObserver + ?Sized,
    {
        let boundary = self.is_boundary(&frame);
        if boundary {
            self.opened = true;
        }

        let pcr_pid = self.pcr_pid();
        let mut packets = mem::take(&mut self.packets);
        packets.clear();
        pack_frame(&mut frame, pcr_pid, |packet| packets.extend_from_slice(packet));

        // stored before the callback so a nested flush continues the sequence
        match frame.stream {
            StreamKind::Audio => self.audio_cc = frame.cc,
            StreamKind::Video => self.video_cc = frame.cc,
        }

        observer.on_ts_packets(self, &packets, &frame, boundary);

        self.packets = packets;
        frame
    }
}
