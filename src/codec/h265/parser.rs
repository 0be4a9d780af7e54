use bytes::Buf;
use log::trace;

use super::types::NALUnitType;
use crate::codec::append_annexb;
use crate::error::{RemuxError, Result};

/// Fixed part of the record before `numOfArrays`.
const HVCC_FIXED_LEN: usize = 22;

/// Parameter sets carried by an `HEVCDecoderConfigurationRecord`
/// (ISO/IEC 14496-15 8.3.3.1).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HEVCDecoderConfig {
    pub nalu_length_size: u8,
    pub vps: Vec<Vec<u8>>,
    pub sps: Vec<Vec<u8>>,
    pub pps: Vec<Vec<u8>>,
}

impl HEVCDecoderConfig {
    pub fn parse(record: &[u8]) -> Result<Self> {
        if record.len() < HVCC_FIXED_LEN + 1 {
            return Err(RemuxError::Parser(format!(
                "hevc decoder config too short: {} bytes",
                record.len()
            )));
        }

        let mut config = HEVCDecoderConfig {
            nalu_length_size: (record[HVCC_FIXED_LEN - 1] & 0x03) + 1,
            ..Default::default()
        };

        let mut buf = &record[HVCC_FIXED_LEN..];
        let num_arrays = buf.get_u8();
        for _ in 0..num_arrays {
            if buf.remaining() < 3 {
                return Err(RemuxError::Parser("truncated hevc nalu array".into()));
            }
            let nal_type = NALUnitType::from_u8(buf.get_u8() & 0x3F);
            let num_nalus = buf.get_u16();

            for _ in 0..num_nalus {
                if buf.remaining() < 2 {
                    return Err(RemuxError::Parser("truncated hevc nalu length".into()));
                }
                let len = buf.get_u16() as usize;
                if len == 0 || buf.remaining() < len {
                    return Err(RemuxError::Parser(format!(
                        "invalid hevc nalu length {} ({} bytes left)",
                        len,
                        buf.remaining()
                    )));
                }
                let unit = buf[..len].to_vec();
                buf.advance(len);

                match nal_type {
                    NALUnitType::Vps => config.vps.push(unit),
                    NALUnitType::Sps => config.sps.push(unit),
                    NALUnitType::Pps => config.pps.push(unit),
                    other => trace!("skipping {:?} in hevc decoder config", other),
                }
            }
        }

        if config.vps.is_empty() || config.sps.is_empty() || config.pps.is_empty() {
            return Err(RemuxError::Parser(format!(
                "hevc decoder config incomplete (vps={}, sps={}, pps={})",
                config.vps.len(),
                config.sps.len(),
                config.pps.len()
            )));
        }

        Ok(config)
    }

    /// VPS, SPS then PPS, each behind a 4-byte start code.
    pub fn to_annexb(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let units: Vec<&[u8]> = self
            .vps
            .iter()
            .chain(self.sps.iter())
            .chain(self.pps.iter())
            .map(|u| u.as_slice())
            .collect();
        append_annexb(&mut out, &units);
        out
    }
}

/// Converts an HEVC sequence-header video tag body (5-byte FLV header plus
/// decoder configuration record) into Annex-B VPS/SPS/PPS bytes.
pub fn seq_header_to_annexb(payload: &[u8]) -> Result<Vec<u8>> {
    let record = payload.get(5..).ok_or_else(|| {
        RemuxError::InvalidData(format!("hevc seq header too short: {} bytes", payload.len()))
    })?;
    Ok(HEVCDecoderConfig::parse(record)?.to_annexb())
}
