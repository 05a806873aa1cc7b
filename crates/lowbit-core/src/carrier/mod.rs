//! Carriers and their selection predicates.
//!
//! A carrier is a set of planes that can be walked position by position.
//! The selection decides which positions are eligible and how many payload
//! bits each of them holds. Capacity, embedding and extraction all walk the
//! same [`Carrier::positions`] iterator, so they can never disagree.

mod coefficient;
mod pixel;

use std::fmt::Debug;
use std::ops::RangeInclusive;

pub use coefficient::{
    BlockPosition, CoefficientPlane, CoefficientPositions, DctCarrier, Perceptibility,
    BLOCK_SIDE,
};
pub use pixel::{BitsPerChannel, PixelCarrier, SamplePosition, SamplePositions};

use crate::result::Result;

/// The two carrier domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarrierKind {
    /// Quantized DCT coefficients, parameterized by perceptibility.
    Coefficient,
    /// Raw pixel samples, parameterized by bits per channel.
    Pixel,
}

impl CarrierKind {
    /// Valid values of the embedding parameter.
    pub fn parameter_range(self) -> RangeInclusive<u8> {
        match self {
            CarrierKind::Coefficient => Perceptibility::RANGE,
            CarrierKind::Pixel => BitsPerChannel::RANGE,
        }
    }

    pub fn default_parameter(self) -> u8 {
        match self {
            CarrierKind::Coefficient => Perceptibility::default().get(),
            CarrierKind::Pixel => BitsPerChannel::default().get(),
        }
    }
}

/// A validated embedding parameter.
pub trait Selection: Copy + Debug + Eq {
    /// Checks the parameter against its domain.
    fn from_parameter(parameter: u8) -> Result<Self>;

    /// The raw parameter as stored in metadata.
    fn parameter(self) -> u8;

    /// Payload bits carried by one eligible position.
    fn bits_per_position(self) -> u8;
}

/// Low-bit frequencies of one group of samples, as tested by the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowBitGroup {
    pub label: String,
    /// Count of samples whose low bit is 0 and 1.
    pub frequencies: [u64; 2],
}

impl LowBitGroup {
    pub fn total(&self) -> u64 {
        self.frequencies[0] + self.frequencies[1]
    }
}

/// An image in one of the two carrier domains.
pub trait Carrier: Clone {
    type Position: Copy + Debug;
    type Selection: Selection;
    type Positions<'a>: Iterator<Item = Self::Position> + Clone
    where
        Self: 'a;

    const KIND: CarrierKind;

    fn plane_count(&self) -> usize;

    /// Eligible positions of one plane in canonical scan order.
    fn positions(&self, plane: usize, selection: Self::Selection) -> Self::Positions<'_>;

    /// The low `selection.bits_per_position()` bits stored at `position`.
    fn read_bits(&self, plane: usize, position: Self::Position, selection: Self::Selection) -> u8;

    /// Replaces the low `selection.bits_per_position()` bits at `position`.
    fn write_bits(
        &mut self,
        plane: usize,
        position: Self::Position,
        selection: Self::Selection,
        bits: u8,
    );

    /// Groups of samples the detector tests independently.
    fn low_bit_groups(&self) -> Vec<LowBitGroup>;
}
