use crate::error::{RemuxError, Result};

/// Size of an ADTS header without CRC.
pub const ADTS_HEADER_SIZE: usize = 7;

/// Largest value the 13-bit ADTS frame length can hold.
const ADTS_MAX_FRAME_LENGTH: usize = 0x1FFF;

/// Sampling frequencies indexed by `samplingFrequencyIndex`.
const SAMPLE_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// ADTS profile field: MPEG-4 audio object type minus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileType {
    Main = 0,
    LC = 1,
    SSR = 2,
    LTP = 3,
}

impl From<u8> for ProfileType {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => ProfileType::Main,
            1 => ProfileType::LC,
            2 => ProfileType::SSR,
            _ => ProfileType::LTP,
        }
    }
}

/// The fields of an AudioSpecificConfig that ADTS repeats in every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AACConfig {
    pub audio_object_type: u8,
    pub sample_rate_index: u8,
    pub channel_configuration: u8,
}

impl AACConfig {
    /// ADTS can only signal object types 1..=4; anything else (HE-AAC
    /// signalled explicitly, for instance) is carried as its LC core.
    pub fn profile(&self) -> ProfileType {
        match self.audio_object_type {
            1..=4 => ProfileType::from(self.audio_object_type - 1),
            _ => ProfileType::LC,
        }
    }

    pub fn sample_rate(&self) -> Option<u32> {
        SAMPLE_RATES.get(self.sample_rate_index as usize).copied()
    }
}

impl Default for AACConfig {
    fn default() -> Self {
        Self {
            audio_object_type: 2,
            sample_rate_index: 4,
            channel_configuration: 2,
        }
    }
}

/// ADTS fixed + variable header (ISO/IEC 13818-7 6.2), without CRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ADTSHeader {
    pub id: u8,
    pub protection_absent: bool,
    pub profile: ProfileType,
    pub sample_rate_index: u8,
    pub channel_configuration: u8,
    /// Header plus raw payload, in bytes.
    pub frame_length: u16,
    pub buffer_fullness: u16,
    pub number_of_raw_blocks: u8,
}

impl ADTSHeader {
    /// Header for one raw AAC frame of `payload_len` bytes.
    pub fn for_payload(config: &AACConfig, payload_len: usize) -> Result<Self> {
        let frame_length = payload_len + ADTS_HEADER_SIZE;
        if frame_length > ADTS_MAX_FRAME_LENGTH {
            return Err(RemuxError::Codec(format!(
                "aac frame of {} bytes does not fit an adts header",
                payload_len
            )));
        }

        Ok(Self {
            id: 0,
            protection_absent: true,
            profile: config.profile(),
            sample_rate_index: config.sample_rate_index,
            channel_configuration: config.channel_configuration,
            frame_length: frame_length as u16,
            buffer_fullness: 0x7FF,
            number_of_raw_blocks: 0,
        })
    }

    pub fn to_bytes(&self) -> [u8; ADTS_HEADER_SIZE] {
        let len = self.frame_length & 0x1FFF;
        let channels = self.channel_configuration & 0x07;

        [
            0xFF,
            0xF0 | (self.id & 0x01) << 3 | self.protection_absent as u8,
            (self.profile as u8) << 6 | (self.sample_rate_index & 0x0F) << 2 | channels >> 2,
            (channels & 0x03) << 6 | (len >> 11) as u8,
            (len >> 3) as u8,
            ((len & 0x07) as u8) << 5 | (self.buffer_fullness >> 6) as u8 & 0x1F,
            ((self.buffer_fullness & 0x3F) as u8) << 2 | (self.number_of_raw_blocks & 0x03),
        ]
    }
}
