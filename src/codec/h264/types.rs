/// H.264 NAL unit types relevant to remuxing (ITU-T H.264 table 7-1).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NALUnitType {
    Unspecified = 0,
    CodedSliceNonIDR = 1,
    CodedSliceDataPartitionA = 2,
    CodedSliceDataPartitionB = 3,
    CodedSliceDataPartitionC = 4,
    CodedSliceIDR = 5,
    SEI = 6,
    SPS = 7,
    PPS = 8,
    AccessUnitDelimiter = 9,
    EndOfSequence = 10,
    EndOfStream = 11,
    FillerData = 12,
    Other = 0xFF,
}

impl NALUnitType {
    /// Decodes the type from the first byte of a NAL unit.
    pub fn from_header(header: u8) -> Self {
        NALUnitType::from(header & 0x1F)
    }

    /// Parameter sets and delimiters are regenerated by the remuxer and
    /// never copied from the source payload.
    pub fn is_param_set_or_aud(self) -> bool {
        matches!(
            self,
            NALUnitType::SPS | NALUnitType::PPS | NALUnitType::AccessUnitDelimiter
        )
    }

    pub fn is_keyframe(self) -> bool {
        self == NALUnitType::CodedSliceIDR
    }
}

impl From<u8> for NALUnitType {
    fn from(value: u8) -> Self {
        match value {
            0 => NALUnitType::Unspecified,
            1 => NALUnitType::CodedSliceNonIDR,
            2 => NALUnitType::CodedSliceDataPartitionA,
            3 => NALUnitType::CodedSliceDataPartitionB,
            4 => NALUnitType::CodedSliceDataPartitionC,
            5 => NALUnitType::CodedSliceIDR,
            6 => NALUnitType::SEI,
            7 => NALUnitType::SPS,
            8 => NALUnitType::PPS,
            9 => NALUnitType::AccessUnitDelimiter,
            10 => NALUnitType::EndOfSequence,
            11 => NALUnitType::EndOfStream,
            12 => NALUnitType::FillerData,
            _ => NALUnitType::Other,
        }
    }
}

/// Access unit delimiter with its own 4-byte start code
/// (primary_pic_type = 7, any slice type).
pub const AUD_NALU: [u8; 6] = [0x00, 0x00, 0x00, 0x01, 0x09, 0xF0];

/// Fields of an SPS that are worth logging when a stream starts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SPSInfo {
    pub profile_idc: u8,
    pub level_idc: u8,
    pub width: u32,
    pub height: u32,
}
