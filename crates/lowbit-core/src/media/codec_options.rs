use crate::carrier::{BitsPerChannel, CarrierKind, Perceptibility, Selection};
use crate::result::Result;

/// Codec configuration for embedding
///
/// The variant has to match the media it is used with:
/// - `Coefficient` → JPEG, bits in quantized DCT coefficients, JPEG output
/// - `Pixel` → PNG and other bitmaps, bits in channel values, PNG output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOptions {
    /// `perceptibility` in 1..=8, higher reaches further into low frequencies
    Coefficient { perceptibility: u8 },
    /// `bits_per_channel` in 1..=4
    Pixel { bits_per_channel: u8 },
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self::for_kind(CarrierKind::Pixel)
    }
}

impl CodecOptions {
    /// Default options for a carrier kind.
    pub fn for_kind(kind: CarrierKind) -> Self {
        Self::with_parameter(kind, kind.default_parameter())
    }

    pub fn with_parameter(kind: CarrierKind, parameter: u8) -> Self {
        match kind {
            CarrierKind::Coefficient => Self::Coefficient {
                perceptibility: parameter,
            },
            CarrierKind::Pixel => Self::Pixel {
                bits_per_channel: parameter,
            },
        }
    }

    pub fn kind(&self) -> CarrierKind {
        match self {
            Self::Coefficient { .. } => CarrierKind::Coefficient,
            Self::Pixel { .. } => CarrierKind::Pixel,
        }
    }

    pub fn parameter(&self) -> u8 {
        match *self {
            Self::Coefficient { perceptibility } => perceptibility,
            Self::Pixel { bits_per_channel } => bits_per_channel,
        }
    }

    /// Checks the parameter against its domain.
    pub fn validate(&self) -> Result<()> {
        match self.kind() {
            CarrierKind::Coefficient => Perceptibility::from_parameter(self.parameter()).map(drop),
            CarrierKind::Pixel => BitsPerChannel::from_parameter(self.parameter()).map(drop),
        }
    }
}
