use super::types::{AACConfig, ADTSHeader, ADTS_HEADER_SIZE};
use crate::error::{RemuxError, Result};
use crate::utils::BitReader;

/// Parsed AudioSpecificConfig (ISO/IEC 14496-3 1.6.2.1), kept to stamp an
/// ADTS header on every raw frame of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AscContext {
    config: AACConfig,
}

impl AscContext {
    /// Parses the config carried by an AAC sequence-header audio tag
    /// (the bytes after the two-byte FLV audio tag header).
    pub fn parse(asc: &[u8]) -> Result<Self> {
        if asc.len() < 2 {
            return Err(RemuxError::Parser(format!(
                "audio specific config too short: {} bytes",
                asc.len()
            )));
        }

        let mut reader = BitReader::new(asc);
        let mut audio_object_type = reader.read_bits(5)? as u8;
        if audio_object_type == 31 {
            audio_object_type = 32 + reader.read_bits(6)? as u8;
        }

        let sample_rate_index = reader.read_bits(4)? as u8;
        if sample_rate_index > 12 {
            return Err(RemuxError::Codec(format!(
                "sampling frequency index {} cannot be signalled in adts",
                sample_rate_index
            )));
        }

        let channel_configuration = reader.read_bits(4)? as u8;
        if channel_configuration > 7 {
            return Err(RemuxError::Codec(format!(
                "invalid channel configuration {}",
                channel_configuration
            )));
        }

        Ok(Self {
            config: AACConfig {
                audio_object_type,
                sample_rate_index,
                channel_configuration,
            },
        })
    }

    pub fn config(&self) -> &AACConfig {
        &self.config
    }

    /// ADTS header for a raw frame of `payload_len` bytes.
    pub fn pack_adts_header(&self, payload_len: usize) -> Result<[u8; ADTS_HEADER_SIZE]> {
        Ok(ADTSHeader::for_payload(&self.config, payload_len)?.to_bytes())
    }
}
