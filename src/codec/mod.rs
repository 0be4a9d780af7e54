//! # Codec Bitstream Helpers
//!
//! Only the pieces of H.264, H.265 and AAC that a remuxer needs: NAL unit
//! type spaces, access-unit delimiters, sequence-header conversion to
//! Annex-B, and ADTS header synthesis. No payload is ever decoded.

/// AAC AudioSpecificConfig and ADTS framing
pub mod aac;
/// H.264/AVC NAL types and decoder configuration record handling
pub mod h264;
/// H.265/HEVC NAL types and decoder configuration record handling
pub mod h265;

use crate::error::{RemuxError, Result};

/// Annex-B start code used for the first unit of an access unit.
pub const NALU_START_CODE4: [u8; 4] = [0x00, 0x00, 0x00, 0x01];
/// Annex-B start code used for every following unit.
pub const NALU_START_CODE3: [u8; 3] = [0x00, 0x00, 0x01];

/// Splits an AVCC payload (4-byte big-endian length prefixes) into NAL units.
///
/// The whole payload is validated before anything is returned: a truncated
/// prefix, a length that runs past the end, or a zero-length unit fails the
/// entire payload.
pub fn split_avcc(data: &[u8]) -> Result<Vec<&[u8]>> {
    let mut nals = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let prefix = data.get(pos..pos + 4).ok_or_else(|| {
            RemuxError::InvalidData(format!(
                "truncated nalu length prefix at {} of {}",
                pos,
                data.len()
            ))
        })?;
        let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        pos += 4;

        if len == 0 {
            return Err(RemuxError::InvalidData(format!("zero length nalu at {}", pos - 4)));
        }
        let nal = data.get(pos..pos + len).ok_or_else(|| {
            RemuxError::InvalidData(format!(
                "nalu length {} exceeds remaining {} bytes",
                len,
                data.len() - pos
            ))
        })?;
        nals.push(nal);
        pos += len;
    }

    Ok(nals)
}

/// Appends `nals` to `out` as Annex-B with 4-byte start codes.
pub(crate) fn append_annexb(out: &mut Vec<u8>, nals: &[&[u8]]) {
    for nal in nals {
        out.extend_from_slice(&NALU_START_CODE4);
        out.extend_from_slice(nal);
    }
}
