use bytes::{BufMut, BytesMut};

/// Packetized Elementary Stream header as written at the start of every
/// frame.
///
/// Only the fields the remuxer varies are modelled; the rest of the
/// optional header is fixed (`'10'` marker, no scrambling, no ESCR, ES rate,
/// trick mode, CRC or extension).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PESHeader {
    /// Stream identifier (0xe0 video, 0xc0 audio)
    pub stream_id: u8,
    /// Presentation Time Stamp in 90 kHz ticks (33 bits used)
    pub pts: u64,
    /// Decoding Time Stamp, written only when it differs from the PTS
    pub dts: Option<u64>,
}

impl PESHeader {
    pub fn new(stream_id: u8, pts: u64, dts: u64) -> Self {
        Self {
            stream_id,
            pts,
            dts: (dts != pts).then_some(dts),
        }
    }

    /// Bytes following the `PES_header_data_length` field.
    pub fn header_data_length(&self) -> usize {
        if self.dts.is_some() {
            10
        } else {
            5
        }
    }

    /// Total header size including the 6-byte packet start and 3 bytes of
    /// flags.
    pub fn encoded_len(&self) -> usize {
        9 + self.header_data_length()
    }

    /// Value of `PES_packet_length` for a payload of `payload_len` bytes,
    /// or 0 (unbounded) when it does not fit 16 bits.
    pub fn packet_length(&self, payload_len: usize, bounded: bool) -> u16 {
        let len = 3 + self.header_data_length() + payload_len;
        if bounded && len <= u16::MAX as usize {
            len as u16
        } else {
            0
        }
    }

    /// Writes the header; `packet_length` comes from [`PESHeader::packet_length`].
    pub fn write_to(&self, buf: &mut BytesMut, packet_length: u16) {
        buf.put_slice(&[0x00, 0x00, 0x01]);
        buf.put_u8(self.stream_id);
        buf.put_u16(packet_length);

        // '10' marker, no scrambling, priority or alignment
        buf.put_u8(0x80);

        let pts_dts_flags = if self.dts.is_some() { 0xc0 } else { 0x80 };
        buf.put_u8(pts_dts_flags);
        buf.put_u8(self.header_data_length() as u8);

        match self.dts {
            Some(dts) => {
                write_timestamp(buf, 0x30, self.pts);
                write_timestamp(buf, 0x10, dts);
            }
            None => write_timestamp(buf, 0x20, self.pts),
        }
    }
}

/// Writes a 33-bit timestamp as the 5-byte PTS/DTS field with marker bits.
fn write_timestamp(buf: &mut BytesMut, marker: u8, ts: u64) {
    let ts = ts & 0x1_ffff_ffff;

    buf.put_u8(marker | ((ts >> 29) & 0x0e) as u8 | 0x01);
    buf.put_u16((((ts >> 14) & 0xfffe) | 0x01) as u16);
    buf.put_u16((((ts << 1) & 0xfffe) | 0x01) as u16);
}
