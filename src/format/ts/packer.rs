use bytes::{BufMut, BytesMut};

use super::frame::{Frame, StreamKind};
use super::pes::PESHeader;
use super::types::*;

/// Serializes one frame into 188-byte transport packets.
///
/// The first packet carries the PES header and, when needed, an adaptation
/// field with the random access indicator (key frames) and a PCR equal to
/// the DTS (frames on `pcr_pid`). The last packet is padded with
/// adaptation-field stuffing. `on_packet` is called once per packet, in
/// order; the slice is only valid for the duration of the call.
///
/// Each packet consumes one continuity counter value starting at
/// `frame.cc`; on return `frame.cc` holds the next value to use.
pub fn pack_frame<F>(frame: &mut Frame, pcr_pid: u16, mut on_packet: F)
where
    F: FnMut(&[u8]),
{
    let pes = PESHeader::new(frame.stream_id(), frame.pts, frame.dts);
    let packet_length = pes.packet_length(frame.raw.len(), frame.stream == StreamKind::Audio);

    let mut packet = BytesMut::with_capacity(TS_PACKET_SIZE);
    let mut pos = 0;
    let mut first = true;

    loop {
        packet.clear();

        let with_pcr = first && frame.pid() == pcr_pid;
        let random_access = first && frame.key;

        // adaptation field bytes after its length byte
        let af_body = if with_pcr || random_access {
            1 + if with_pcr { 6 } else { 0 }
        } else {
            0
        };
        let af_total = if af_body > 0 { 1 + af_body } else { 0 };
        let pes_len = if first { pes.encoded_len() } else { 0 };

        let space = TS_PAYLOAD_SIZE - af_total - pes_len;
        let remaining = frame.raw.len() - pos;
        let (chunk, stuffing) = if remaining >= space {
            (space, 0)
        } else {
            (remaining, space - remaining)
        };

        TSHeader {
            payload_unit_start: first,
            pid: frame.pid(),
            adaptation_field_exists: af_total > 0 || stuffing > 0,
            contains_payload: true,
            continuity_counter: frame.cc,
        }
        .write_to(&mut packet);

        if af_total > 0 {
            packet.put_u8((af_body + stuffing) as u8);

            let mut flags = 0u8;
            if random_access {
                flags |= 0x40;
            }
            if with_pcr {
                flags |= 0x10;
            }
            packet.put_u8(flags);

            if with_pcr {
                let pcr = pts_to_pcr_field(frame.dts);
                packet.put_u32((pcr >> 16) as u32);
                packet.put_u16(pcr as u16);
            }
            packet.put_bytes(0xff, stuffing);
        } else if stuffing > 0 {
            // stuffing-only adaptation field; a single byte is just the length
            packet.put_u8((stuffing - 1) as u8);
            if stuffing > 1 {
                packet.put_u8(0x00);
                packet.put_bytes(0xff, stuffing - 2);
            }
        }

        if first {
            pes.write_to(&mut packet, packet_length);
        }

        packet.put_slice(&frame.raw[pos..pos + chunk]);
        pos += chunk;

        debug_assert_eq!(packet.len(), TS_PACKET_SIZE);
        on_packet(&packet);

        frame.cc = frame.cc.wrapping_add(1) & 0x0f;
        first = false;

        if pos >= frame.raw.len() {
            break;
        }
    }
}
