use bytes::{BufMut, Bytes, BytesMut};

use super::types::*;
use crate::utils::Crc32Mpeg2;

/// Elementary streams announced in the PMT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramLayout {
    /// `STREAM_TYPE_H264` or `STREAM_TYPE_H265`
    pub video_stream_type: Option<u8>,
    /// `STREAM_TYPE_AAC`
    pub audio_stream_type: Option<u8>,
}

impl Default for ProgramLayout {
    /// H.264 + AAC, the layout assumed when nothing better is known.
    fn default() -> Self {
        Self {
            video_stream_type: Some(STREAM_TYPE_H264),
            audio_stream_type: Some(STREAM_TYPE_AAC),
        }
    }
}

impl ProgramLayout {
    /// PCR rides on the video PID when there is video.
    pub fn pcr_pid(&self) -> u16 {
        if self.video_stream_type.is_some() || self.audio_stream_type.is_none() {
            PID_VIDEO
        } else {
            PID_AUDIO
        }
    }

    pub fn pat(&self) -> PAT {
        PAT {
            entries: vec![PATEntry {
                program_number: PROGRAM_NUMBER,
                program_map_pid: PID_PMT,
            }],
        }
    }

    pub fn pmt(&self) -> PMT {
        let mut elementary_stream_infos = Vec::with_capacity(2);
        if let Some(stream_type) = self.video_stream_type {
            elementary_stream_infos.push(ElementaryStreamInfo {
                stream_type,
                elementary_pid: PID_VIDEO,
            });
        }
        if let Some(stream_type) = self.audio_stream_type {
            elementary_stream_infos.push(ElementaryStreamInfo {
                stream_type,
                elementary_pid: PID_AUDIO,
            });
        }

        PMT {
            pcr_pid: self.pcr_pid(),
            elementary_stream_infos,
        }
    }

    /// PAT packet followed by PMT packet, 2 * 188 bytes. Every segment the
    /// downstream writer opens starts with these.
    pub fn fragment_header(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(TS_PACKET_SIZE * 2);

        let mut body = BytesMut::new();
        self.pat().write_to(&mut body);
        write_psi_packet(&mut out, PID_PAT, TABLE_ID_PAT, TRANSPORT_STREAM_ID, &body);

        body.clear();
        self.pmt().write_to(&mut body);
        write_psi_packet(&mut out, PID_PMT, TABLE_ID_PMT, PROGRAM_NUMBER, &body);

        out.freeze()
    }
}

/// One PSI section in a single transport packet (pointer field 0,
/// version 0, current, section 0 of 0).
fn write_psi_packet(out: &mut BytesMut, pid: u16, table_id: u8, table_id_ext: u16, body: &[u8]) {
    let start = out.len();

    TSHeader {
        payload_unit_start: true,
        pid,
        ..Default::default()
    }
    .write_to(out);
    out.put_u8(0); // pointer field

    let section_start = out.len();
    let section_length = 5 + body.len() + 4;
    out.put_u8(table_id);
    out.put_u16(0xb000 | (section_length as u16 & 0x3ff));
    out.put_u16(table_id_ext);
    out.put_u8(0xc1);
    out.put_u8(0);
    out.put_u8(0);
    out.put_slice(body);

    let crc = Crc32Mpeg2::calculate(&out[section_start..]);
    out.put_u32(crc);

    out.put_bytes(0xff, TS_PACKET_SIZE - (out.len() - start));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fragment_header_h264_aac() {
        let header = ProgramLayout::default().fragment_header();
        assert_eq!(header.len(), 2 * TS_PACKET_SIZE);

        let pat = &header[..TS_PACKET_SIZE];
        assert_eq!(
            &pat[..21],
            &[
                0x47, 0x40, 0x00, 0x10, 0x00, 0x00, 0xb0, 0x0d, 0x00, 0x01, 0xc1, 0x00, 0x00,
                0x00, 0x01, 0xf0, 0x01, 0x2e, 0x70, 0x19, 0x05
            ]
        );
        assert!(pat[21..].iter().all(|&b| b == 0xff));

        let pmt = &header[TS_PACKET_SIZE..];
        assert_eq!(
            &pmt[..31],
            &[
                0x47, 0x50, 0x01, 0x10, 0x00, 0x02, 0xb0, 0x17, 0x00, 0x01, 0xc1, 0x00, 0x00,
                0xe1, 0x00, 0xf0, 0x00, 0x1b, 0xe1, 0x00, 0xf0, 0x00, 0x0f, 0xe1, 0x01, 0xf0,
                0x00, 0x2f, 0x44, 0xb9, 0x9b
            ]
        );
        assert!(pmt[31..].iter().all(|&b| b == 0xff));
    }

    #[test]
    fn test_audio_only_layout_moves_pcr() {
        let layout = ProgramLayout {
            video_stream_type: None,
            audio_stream_type: Some(STREAM_TYPE_AAC),
        };
        assert_eq!(layout.pcr_pid(), PID_AUDIO);

        let header = layout.fragment_header();
        let pmt = &header[TS_PACKET_SIZE..];
        assert_eq!(
            &pmt[5..26],
            &[
                0x02, 0xb0, 0x12, 0x00, 0x01, 0xc1, 0x00, 0x00, 0xe1, 0x01, 0xf0, 0x00, 0x0f,
                0xe1, 0x01, 0xf0, 0x00, 0xec, 0xe2, 0xb0, 0x94
            ]
        );
    }

    #[test]
    fn test_hevc_video_only_layout() {
        let layout = ProgramLayout {
            video_stream_type: Some(STREAM_TYPE_H265),
            audio_stream_type: None,
        };
        assert_eq!(layout.pcr_pid(), PID_VIDEO);
        let pmt = layout.pmt();
        assert_eq!(pmt.elementary_stream_infos.len(), 1);
        assert_eq!(pmt.elementary_stream_infos[0].stream_type, STREAM_TYPE_H265);

        let header = layout.fragment_header();
        let section = &header[TS_PACKET_SIZE + 5..TS_PACKET_SIZE + 5 + 3 + 0x12];
        assert_eq!(Crc32Mpeg2::calculate(section), 0);
        assert_eq!(&section[section.len() - 4..], &[0x2f, 0x00, 0x6e, 0xe7]);
    }
}
