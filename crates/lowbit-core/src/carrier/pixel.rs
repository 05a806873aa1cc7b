use std::ops::{Range, RangeInclusive};

use super::{Carrier, CarrierKind, LowBitGroup, Selection};
use crate::error::LowbitError;
use crate::result::Result;

/// How many trailing bits of each channel sample are overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitsPerChannel(u8);

impl BitsPerChannel {
    pub const RANGE: RangeInclusive<u8> = 1..=4;

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn mask(self) -> u8 {
        (1 << self.0) - 1
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::RANGE.map(BitsPerChannel)
    }
}

impl Default for BitsPerChannel {
    fn default() -> Self {
        BitsPerChannel(1)
    }
}

impl Selection for BitsPerChannel {
    fn from_parameter(parameter: u8) -> Result<Self> {
        if Self::RANGE.contains(&parameter) {
            Ok(BitsPerChannel(parameter))
        } else {
            Err(LowbitError::InvalidParameter {
                kind: CarrierKind::Pixel,
                parameter,
                min: *Self::RANGE.start(),
                max: *Self::RANGE.end(),
            })
        }
    }

    fn parameter(self) -> u8 {
        self.0
    }

    fn bits_per_position(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplePosition {
    pub row: usize,
    pub col: usize,
    pub channel: usize,
}

/// An 8-bit image with interleaved channels, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelCarrier {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub samples: Vec<u8>,
}

impl PixelCarrier {
    pub fn new(width: usize, height: usize, channels: usize, samples: Vec<u8>) -> Result<Self> {
        if !(1..=4).contains(&channels) || samples.len() != width * height * channels {
            return Err(LowbitError::InvalidImageMedia);
        }
        Ok(PixelCarrier {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Names of the channels, `L`, `L A`, `R G B` or `R G B A`.
    pub fn channel_labels(&self) -> &'static [&'static str] {
        match self.channels {
            1 => &["L"],
            2 => &["L", "A"],
            3 => &["R", "G", "B"],
            _ => &["R", "G", "B", "A"],
        }
    }

    fn index(&self, position: SamplePosition) -> usize {
        (position.row * self.width + position.col) * self.channels + position.channel
    }

    /// Keeps the pixels inside the rectangle.
    pub fn crop(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Self> {
        if rows.start > rows.end
            || cols.start > cols.end
            || rows.end > self.height
            || cols.end > self.width
        {
            return Err(LowbitError::InvalidCrop);
        }
        let stride = self.width * self.channels;
        let mut samples = Vec::with_capacity(rows.len() * cols.len() * self.channels);
        for row in rows.clone() {
            let start = row * stride + cols.start * self.channels;
            samples.extend_from_slice(&self.samples[start..start + cols.len() * self.channels]);
        }
        Ok(PixelCarrier {
            width: cols.len(),
            height: rows.len(),
            channels: self.channels,
            samples,
        })
    }

    pub fn crop_middle_third(&self) -> Self {
        let rows = self.height / 3..2 * self.height / 3;
        let cols = self.width / 3..2 * self.width / 3;
        let stride = self.width * self.channels;
        let samples = rows
            .clone()
            .flat_map(|row| {
                let start = row * stride + cols.start * self.channels;
                self.samples[start..start + cols.len() * self.channels].iter().copied()
            })
            .collect();
        PixelCarrier {
            width: cols.len(),
            height: rows.len(),
            channels: self.channels,
            samples,
        }
    }
}

/// Every sample of a pixel carrier in row, column, channel order.
#[derive(Debug, Clone)]
pub struct SamplePositions {
    width: usize,
    channels: usize,
    next: usize,
    end: usize,
}

impl Iterator for SamplePositions {
    type Item = SamplePosition;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        let pixel = index / self.channels;
        Some(SamplePosition {
            row: pixel / self.width,
            col: pixel % self.width,
            channel: index % self.channels,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SamplePositions {}

impl Carrier for PixelCarrier {
    type Position = SamplePosition;
    type Selection = BitsPerChannel;
    type Positions<'a> = SamplePositions;

    const KIND: CarrierKind = CarrierKind::Pixel;

    fn plane_count(&self) -> usize {
        1
    }

    fn positions(&self, _plane: usize, _: BitsPerChannel) -> SamplePositions {
        SamplePositions {
            width: self.width,
            channels: self.channels,
            next: 0,
            end: self.samples.len(),
        }
    }

    fn read_bits(&self, _plane: usize, position: SamplePosition, selection: BitsPerChannel) -> u8 {
        self.samples[self.index(position)] & selection.mask()
    }

    fn write_bits(
        &mut self,
        _plane: usize,
        position: SamplePosition,
        selection: BitsPerChannel,
        bits: u8,
    ) {
        let mask = selection.mask();
        let index = self.index(position);
        let sample = &mut self.samples[index];
        *sample = (*sample & !mask) | (bits & mask);
    }

    /// One group per color channel. Alpha is left out, an opaque image has
    /// nothing but ones in its low bits there.
    fn low_bit_groups(&self) -> Vec<LowBitGroup> {
        let colors = match self.channels {
            2 | 4 => self.channels - 1,
            n => n,
        };
        let mut groups: Vec<LowBitGroup> = self.channel_labels()[..colors]
            .iter()
            .map(|label| LowBitGroup {
                label: label.to_string(),
                frequencies: [0; 2],
            })
            .collect();
        for (index, sample) in self.samples.iter().enumerate() {
            if let Some(group) = groups.get_mut(index % self.channels) {
                group.frequencies[(sample & 1) as usize] += 1;
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(width: usize, height: usize) -> PixelCarrier {
        let samples = (0..width * height * 3).map(|i| i as u8).collect();
        PixelCarrier::new(width, height, 3, samples).unwrap()
    }

    #[test]
    fn masks_match_the_bit_count() {
        let masks: Vec<u8> = BitsPerChannel::all().map(BitsPerChannel::mask).collect();
        assert_eq!(masks, vec![0b1, 0b11, 0b111, 0b1111]);
        assert!(BitsPerChannel::from_parameter(0).is_err());
        assert!(BitsPerChannel::from_parameter(5).is_err());
    }

    #[test]
    fn rejects_mismatched_sample_counts() {
        assert!(PixelCarrier::new(2, 2, 3, vec![0; 11]).is_err());
        assert!(PixelCarrier::new(1, 1, 5, vec![0; 5]).is_err());
    }

    #[test]
    fn positions_are_raster_major_then_channel() {
        let carrier = rgb(2, 2);
        let selection = BitsPerChannel::default();
        let positions: Vec<_> = carrier.positions(0, selection).take(4).collect();
        assert_eq!(positions[0], SamplePosition { row: 0, col: 0, channel: 0 });
        assert_eq!(positions[2], SamplePosition { row: 0, col: 0, channel: 2 });
        assert_eq!(positions[3], SamplePosition { row: 0, col: 1, channel: 0 });
        assert_eq!(carrier.positions(0, selection).len(), 12);
    }

    #[test]
    fn writes_replace_only_the_masked_bits() {
        let mut carrier = PixelCarrier::new(1, 1, 1, vec![0b1010_1010]).unwrap();
        let position = SamplePosition { row: 0, col: 0, channel: 0 };
        let selection = BitsPerChannel::from_parameter(3).unwrap();

        carrier.write_bits(0, position, selection, 0b101);
        assert_eq!(carrier.samples[0], 0b1010_1101);
        assert_eq!(carrier.read_bits(0, position, selection), 0b101);
    }

    #[test]
    fn crop_keeps_the_rectangle() {
        let carrier = rgb(4, 3);
        let cropped = carrier.crop(1..3, 2..4).unwrap();
        assert_eq!((cropped.width, cropped.height), (2, 2));
        // pixel (1, 2) starts at sample (1 * 4 + 2) * 3
        assert_eq!(cropped.samples[0], 18);
        assert!(carrier.crop(0..4, 0..1).is_err());
    }

    #[test]
    fn crop_middle_third_matches_crop() {
        let carrier = rgb(9, 6);
        assert_eq!(
            carrier.crop_middle_third(),
            carrier.crop(2..4, 3..6).unwrap()
        );
    }

    #[test]
    fn low_bit_groups_are_per_color_channel() {
        let carrier = PixelCarrier::new(2, 1, 2, vec![1, 2, 3, 5]).unwrap();
        let groups = carrier.low_bit_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "L");
        assert_eq!(groups[0].frequencies, [0, 2]);

        let carrier = PixelCarrier::new(1, 1, 4, vec![0, 1, 2, 255]).unwrap();
        let labels: Vec<String> = carrier.low_bit_groups().into_iter().map(|g| g.label).collect();
        assert_eq!(labels, vec!["R", "G", "B"]);
    }
}
