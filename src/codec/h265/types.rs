/// H.265 NAL unit types (ITU-T H.265 table 7-1). Reserved ranges collapse
/// into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NALUnitType {
    TrailN,
    TrailR,
    TsaN,
    TsaR,
    StsaN,
    StsaR,
    RadlN,
    RadlR,
    RaslN,
    RaslR,
    BlaWLp,
    BlaWRadl,
    BlaNLp,
    IdrWRadl,
    IdrNLp,
    CraNut,
    Vps,
    Sps,
    Pps,
    Aud,
    Eos,
    Eob,
    Fd,
    PrefixSei,
    SuffixSei,
    Other(u8),
}

impl NALUnitType {
    /// Decodes the 6-bit type from the first byte of a NAL unit header.
    pub fn from_header(header: u8) -> Self {
        Self::from_u8((header >> 1) & 0x3F)
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => NALUnitType::TrailN,
            1 => NALUnitType::TrailR,
            2 => NALUnitType::TsaN,
            3 => NALUnitType::TsaR,
            4 => NALUnitType::StsaN,
            5 => NALUnitType::StsaR,
            6 => NALUnitType::RadlN,
            7 => NALUnitType::RadlR,
            8 => NALUnitType::RaslN,
            9 => NALUnitType::RaslR,
            16 => NALUnitType::BlaWLp,
            17 => NALUnitType::BlaWRadl,
            18 => NALUnitType::BlaNLp,
            19 => NALUnitType::IdrWRadl,
            20 => NALUnitType::IdrNLp,
            21 => NALUnitType::CraNut,
            32 => NALUnitType::Vps,
            33 => NALUnitType::Sps,
            34 => NALUnitType::Pps,
            35 => NALUnitType::Aud,
            36 => NALUnitType::Eos,
            37 => NALUnitType::Eob,
            38 => NALUnitType::Fd,
            39 => NALUnitType::PrefixSei,
            40 => NALUnitType::SuffixSei,
            other => NALUnitType::Other(other),
        }
    }

    pub fn is_param_set_or_aud(self) -> bool {
        matches!(
            self,
            NALUnitType::Vps | NALUnitType::Sps | NALUnitType::Pps | NALUnitType::Aud
        )
    }

    /// IDR and CRA pictures; these get the cached parameter sets in front.
    pub fn is_keyframe(self) -> bool {
        matches!(
            self,
            NALUnitType::IdrWRadl | NALUnitType::IdrNLp | NALUnitType::CraNut
        )
    }
}

/// Access unit delimiter with its own 4-byte start code (pic_type = 0).
pub const AUD_NALU: [u8; 7] = [0x00, 0x00, 0x00, 0x01, 0x46, 0x01, 0x10];
