use log::{error, info, trace, warn};

use super::remuxer::dump_head;
use super::{RemuxObserver, TsRemuxer};
use crate::format::rtmp::{RtmpMsg, AUDIO_TAG_HEADER_SIZE, RTMP_SOUND_FORMAT_AAC};

impl TsRemuxer {
    pub(super) fn feed_audio<O>(&mut self, msg: &RtmpMsg, observer: &mut O)
    where
        O: RemuxObserver + ?Sized,
    {
        let payload = &msg.payload[..];
        if payload.len() <= AUDIO_TAG_HEADER_SIZE {
            error!(
                "[{}] invalid audio message length. len={}",
                self.unique_key,
                payload.len()
            );
            return;
        }
        if payload[0] >> 4 != RTMP_SOUND_FORMAT_AAC {
            trace!("[{}] non-aac audio dropped. format={}", self.unique_key, payload[0] >> 4);
            return;
        }

        if msg.is_aac_seq_header() {
            match self.seq_headers.set_audio_config(payload) {
                Ok(()) => info!(
                    "[{}] cache aac seq header. config={:?}",
                    self.unique_key,
                    self.seq_headers.audio_config().map(|asc| asc.config())
                ),
                Err(err) => error!(
                    "[{}] cache aac seq header failed. err={}, payload={:02x?}",
                    self.unique_key,
                    err,
                    dump_head(payload)
                ),
            }
            return;
        }

        let Some(asc) = self.seq_headers.audio_config() else {
            warn!(
                "[{}] feed audio message but aac seq header not exist.",
                self.unique_key
            );
            return;
        };

        let raw = &payload[AUDIO_TAG_HEADER_SIZE..];
        let adts_header = match asc.pack_adts_header(raw.len()) {
            Ok(header) => header,
            Err(err) => {
                error!("[{}] pack adts header failed. err={}", self.unique_key, err);
                return;
            }
        };

        let dts = u64::from(msg.header.timestamp_abs) * 90;
        if self
            .audio_cache
            .is_due(dts, self.config.max_audio_cache_delay_by_audio)
        {
            self.flush_audio(observer);
        }

        self.audio_cache.append(dts, &adts_header, raw);
    }
}
