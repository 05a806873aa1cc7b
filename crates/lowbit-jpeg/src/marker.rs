//! JPEG marker codes (ITU T.81 Table B.1).

/// The second byte of a `0xFF xx` marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Marker {
    /// Start of frame, carrying the process number (0 = baseline, 2 = progressive, ...).
    SOF(u8),
    /// Define Huffman table(s).
    DHT,
    /// Define arithmetic coding conditioning.
    DAC,
    /// Restart marker 0-7.
    RST(u8),
    SOI,
    EOI,
    SOS,
    /// Define quantization table(s).
    DQT,
    DNL,
    /// Define restart interval.
    DRI,
    DHP,
    EXP,
    /// Application segment 0-15.
    APP(u8),
    /// Reserved JPEG extension 0-13, `JPG` itself included as `JPGn(0xFF)`.
    JPGn(u8),
    COM,
    TEM,
    /// Reserved code in 0x02..=0xBF, kept verbatim.
    RES(u8),
}

impl Marker {
    /// Markers that stand alone without a length field.
    pub fn has_length(self) -> bool {
        !matches!(
            self,
            Marker::RST(..) | Marker::SOI | Marker::EOI | Marker::TEM
        )
    }

    /// Returns `None` for `0x00` (stuffing) and `0xFF` (fill byte).
    pub fn from_u8(n: u8) -> Option<Marker> {
        use Marker::*;
        match n {
            0x00 | 0xFF => None,
            0x01 => Some(TEM),
            0x02..=0xBF => Some(RES(n)),
            0xC4 => Some(DHT),
            0xC8 => Some(JPGn(0xFF)),
            0xCC => Some(DAC),
            0xC0..=0xCF => Some(SOF(n - 0xC0)),
            0xD0..=0xD7 => Some(RST(n - 0xD0)),
            0xD8 => Some(SOI),
            0xD9 => Some(EOI),
            0xDA => Some(SOS),
            0xDB => Some(DQT),
            0xDC => Some(DNL),
            0xDD => Some(DRI),
            0xDE => Some(DHP),
            0xDF => Some(EXP),
            0xE0..=0xEF => Some(APP(n - 0xE0)),
            0xF0..=0xFD => Some(JPGn(n - 0xF0)),
            0xFE => Some(COM),
        }
    }

    pub fn to_u8(self) -> u8 {
        use Marker::*;
        match self {
            TEM => 0x01,
            RES(n) => n,
            SOF(n) => 0xC0 + n,
            DHT => 0xC4,
            JPGn(0xFF) => 0xC8,
            DAC => 0xCC,
            RST(n) => 0xD0 + n,
            SOI => 0xD8,
            EOI => 0xD9,
            SOS => 0xDA,
            DQT => 0xDB,
            DNL => 0xDC,
            DRI => 0xDD,
            DHP => 0xDE,
            EXP => 0xDF,
            APP(n) => 0xE0 + n,
            JPGn(n) => 0xF0 + n,
            COM => 0xFE,
        }
    }
}
