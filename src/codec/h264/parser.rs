use bytes::Buf;

use super::types::{NALUnitType, SPSInfo};
use crate::codec::append_annexb;
use crate::error::{RemuxError, Result};
use crate::utils::BitReader;

/// Parameter sets carried by an `AVCDecoderConfigurationRecord`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AVCDecoderConfig {
    pub profile_idc: u8,
    pub level_idc: u8,
    pub nalu_length_size: u8,
    pub sps: Vec<Vec<u8>>,
    pub pps: Vec<Vec<u8>>,
}

impl AVCDecoderConfig {
    /// Parses the record (ISO/IEC 14496-15 5.3.3.1).
    pub fn parse(record: &[u8]) -> Result<Self> {
        let mut buf = record;
        if buf.remaining() < 6 {
            return Err(RemuxError::Parser(format!(
                "avc decoder config too short: {} bytes",
                record.len()
            )));
        }

        let _version = buf.get_u8();
        let profile_idc = buf.get_u8();
        let _compatibility = buf.get_u8();
        let level_idc = buf.get_u8();
        let nalu_length_size = (buf.get_u8() & 0x03) + 1;

        let num_sps = buf.get_u8() & 0x1F;
        let sps = read_units(&mut buf, num_sps as usize, "sps")?;

        if buf.remaining() < 1 {
            return Err(RemuxError::Parser("avc decoder config missing pps count".into()));
        }
        let num_pps = buf.get_u8();
        let pps = read_units(&mut buf, num_pps as usize, "pps")?;

        if sps.is_empty() || pps.is_empty() {
            return Err(RemuxError::Parser(format!(
                "avc decoder config without parameter sets (sps={}, pps={})",
                sps.len(),
                pps.len()
            )));
        }

        Ok(Self {
            profile_idc,
            level_idc,
            nalu_length_size,
            sps,
            pps,
        })
    }

    /// Every SPS then every PPS, each behind a 4-byte start code.
    pub fn to_annexb(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let units: Vec<&[u8]> = self
            .sps
            .iter()
            .chain(self.pps.iter())
            .map(|u| u.as_slice())
            .collect();
        append_annexb(&mut out, &units);
        out
    }
}

fn read_units(buf: &mut &[u8], count: usize, what: &str) -> Result<Vec<Vec<u8>>> {
    let mut units = Vec::with_capacity(count);
    for _ in 0..count {
        if buf.remaining() < 2 {
            return Err(RemuxError::Parser(format!("truncated {} length", what)));
        }
        let len = buf.get_u16() as usize;
        if len == 0 || buf.remaining() < len {
            return Err(RemuxError::Parser(format!(
                "invalid {} length {} ({} bytes left)",
                what,
                len,
                buf.remaining()
            )));
        }
        units.push(buf[..len].to_vec());
        buf.advance(len);
    }
    Ok(units)
}

/// Converts an AVC sequence-header video tag body (5-byte FLV video tag
/// header followed by the decoder configuration record) into Annex-B
/// SPS/PPS bytes.
pub fn seq_header_to_annexb(payload: &[u8]) -> Result<Vec<u8>> {
    let record = payload.get(5..).ok_or_else(|| {
        RemuxError::InvalidData(format!("avc seq header too short: {} bytes", payload.len()))
    })?;
    Ok(AVCDecoderConfig::parse(record)?.to_annexb())
}

/// Removes emulation prevention bytes (`00 00 03` -> `00 00`).
pub fn remove_emulation_prevention(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut zeros = 0;

    for &byte in data {
        if zeros >= 2 && byte == 0x03 {
            zeros = 0;
            continue;
        }
        zeros = if byte == 0x00 { zeros + 1 } else { 0 };
        out.push(byte);
    }

    out
}

/// Decodes profile, level and cropped picture size from an SPS NAL unit
/// (header byte included).
pub fn parse_sps(nal: &[u8]) -> Result<SPSInfo> {
    match nal.first() {
        Some(&header) if NALUnitType::from_header(header) == NALUnitType::SPS => {}
        _ => return Err(RemuxError::Codec("not an sps nal unit".into())),
    }

    let rbsp = remove_emulation_prevention(&nal[1..]);
    let mut reader = BitReader::new(&rbsp);

    let profile_idc = reader.read_bits(8)? as u8;
    reader.skip_bits(8)?; // constraint flags
    let level_idc = reader.read_bits(8)? as u8;
    reader.read_golomb()?; // seq_parameter_set_id

    let mut chroma_format_idc = 1;
    if matches!(
        profile_idc,
        100 | 110 | 122 | 244 | 44 | 83 | 86 | 118 | 128 | 138 | 139 | 134 | 135
    ) {
        chroma_format_idc = reader.read_golomb()?;
        if chroma_format_idc == 3 {
            reader.skip_bits(1)?; // separate_colour_plane_flag
        }
        reader.read_golomb()?; // bit_depth_luma_minus8
        reader.read_golomb()?; // bit_depth_chroma_minus8
        reader.skip_bits(1)?; // qpprime_y_zero_transform_bypass_flag

        if reader.read_bit()? {
            let lists = if chroma_format_idc != 3 { 8 } else { 12 };
            for i in 0..lists {
                if reader.read_bit()? {
                    skip_scaling_list(&mut reader, if i < 6 { 16 } else { 64 })?;
                }
            }
        }
    }

    reader.read_golomb()?; // log2_max_frame_num_minus4
    match reader.read_golomb()? {
        0 => {
            reader.read_golomb()?; // log2_max_pic_order_cnt_lsb_minus4
        }
        1 => {
            reader.skip_bits(1)?; // delta_pic_order_always_zero_flag
            reader.read_signed_golomb()?; // offset_for_non_ref_pic
            reader.read_signed_golomb()?; // offset_for_top_to_bottom_field
            let cycle = reader.read_golomb()?;
            for _ in 0..cycle {
                reader.read_signed_golomb()?;
            }
        }
        _ => {}
    }

    reader.read_golomb()?; // max_num_ref_frames
    reader.skip_bits(1)?; // gaps_in_frame_num_value_allowed_flag

    let width_mbs = u64::from(reader.read_golomb()?) + 1;
    let height_map_units = u64::from(reader.read_golomb()?) + 1;
    let frame_mbs_only = u64::from(reader.read_bits(1)?);
    if frame_mbs_only == 0 {
        reader.skip_bits(1)?; // mb_adaptive_frame_field_flag
    }
    reader.skip_bits(1)?; // direct_8x8_inference_flag

    // golomb values stay below 2^32, so none of this overflows u64
    let mut width = width_mbs * 16;
    let mut height = (2 - frame_mbs_only) * height_map_units * 16;

    if reader.read_bit()? {
        let left = u64::from(reader.read_golomb()?);
        let right = u64::from(reader.read_golomb()?);
        let top = u64::from(reader.read_golomb()?);
        let bottom = u64::from(reader.read_golomb()?);

        let (crop_x, crop_y) = match chroma_format_idc {
            1 => (2, 2 * (2 - frame_mbs_only)),
            2 => (2, 2 - frame_mbs_only),
            _ => (1, 2 - frame_mbs_only),
        };
        width = width.saturating_sub((left + right) * crop_x);
        height = height.saturating_sub((top + bottom) * crop_y);
    }

    let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(width), Ok(height)) => (width, height),
        _ => {
            return Err(RemuxError::Parser(format!(
                "sps picture size out of range: {}x{}",
                width, height
            )))
        }
    };

    Ok(SPSInfo {
        profile_idc,
        level_idc,
        width,
        height,
    })
}

fn skip_scaling_list(reader: &mut BitReader, size: usize) -> Result<()> {
    let mut last_scale = 8i32;
    let mut next_scale = 8i32;

    for _ in 0..size {
        if next_scale != 0 {
            let delta_scale = reader.read_signed_golomb()?;
            next_scale = (last_scale + delta_scale + 256) % 256;
        }
        if next_scale != 0 {
            last_scale = next_scale;
        }
    }

    Ok(())
}
