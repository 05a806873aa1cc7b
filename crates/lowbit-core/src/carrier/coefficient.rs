use std::ops::{Range, RangeInclusive};

use super::{Carrier, CarrierKind, LowBitGroup, Selection};
use crate::error::LowbitError;
use crate::result::Result;

/// Width and height of a coefficient block.
pub const BLOCK_SIDE: usize = 8;
const BLOCK_LEN: usize = BLOCK_SIDE * BLOCK_SIDE;

/// How far the eligible region of each block reaches toward low frequencies.
///
/// At perceptibility `p` the coefficient in row `k` is eligible from column
/// `max(0, 8 - k - p)` on. `1` keeps to the high frequency corner, `8`
/// admits the whole block including DC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Perceptibility(u8);

impl Perceptibility {
    pub const RANGE: RangeInclusive<u8> = 1..=8;

    pub fn get(self) -> u8 {
        self.0
    }

    /// First eligible column in intra-block row `row`.
    pub fn first_column(self, row: usize) -> usize {
        BLOCK_SIDE.saturating_sub(row + self.0 as usize)
    }

    pub fn is_eligible(self, row: usize, col: usize, value: i16) -> bool {
        col >= self.first_column(row) && !matches!(value, 0 | 1)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::RANGE.map(Perceptibility)
    }
}

impl Default for Perceptibility {
    fn default() -> Self {
        Perceptibility(3)
    }
}

impl Selection for Perceptibility {
    fn from_parameter(parameter: u8) -> Result<Self> {
        if Self::RANGE.contains(&parameter) {
            Ok(Perceptibility(parameter))
        } else {
            Err(LowbitError::InvalidParameter {
                kind: CarrierKind::Coefficient,
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
        1
    }
}

/// Address of one coefficient inside a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPosition {
    pub block_row: usize,
    pub block_col: usize,
    pub row: usize,
    pub col: usize,
}

/// The quantized coefficients of one color component.
///
/// Blocks are stored row-major, each block's 64 values in natural order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoefficientPlane {
    pub label: String,
    pub block_rows: usize,
    pub block_cols: usize,
    pub coefficients: Vec<i16>,
}

impl CoefficientPlane {
    /// A plane of all-zero blocks.
    pub fn new(label: impl Into<String>, block_rows: usize, block_cols: usize) -> Self {
        CoefficientPlane {
            label: label.into(),
            block_rows,
            block_cols,
            coefficients: vec![0; block_rows * block_cols * BLOCK_LEN],
        }
    }

    pub fn block_count(&self) -> usize {
        self.block_rows * self.block_cols
    }

    pub fn block(&self, row: usize, col: usize) -> &[i16] {
        let start = (row * self.block_cols + col) * BLOCK_LEN;
        &self.coefficients[start..start + BLOCK_LEN]
    }

    pub fn block_mut(&mut self, row: usize, col: usize) -> &mut [i16] {
        let start = (row * self.block_cols + col) * BLOCK_LEN;
        &mut self.coefficients[start..start + BLOCK_LEN]
    }

    fn index(&self, position: BlockPosition) -> usize {
        (position.block_row * self.block_cols + position.block_col) * BLOCK_LEN
            + position.row * BLOCK_SIDE
            + position.col
    }

    pub fn get(&self, position: BlockPosition) -> i16 {
        self.coefficients[self.index(position)]
    }

    pub fn positions(&self, perceptibility: Perceptibility) -> CoefficientPositions<'_> {
        CoefficientPositions {
            plane: self,
            perceptibility,
            next: 0,
        }
    }

    /// Keeps the blocks inside the window.
    pub fn crop(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Self> {
        if rows.start > rows.end
            || cols.start > cols.end
            || rows.end > self.block_rows
            || cols.end > self.block_cols
        {
            return Err(LowbitError::InvalidCrop);
        }
        let mut coefficients = Vec::with_capacity(rows.len() * cols.len() * BLOCK_LEN);
        for row in rows.clone() {
            for col in cols.clone() {
                coefficients.extend_from_slice(self.block(row, col));
            }
        }
        Ok(CoefficientPlane {
            label: self.label.clone(),
            block_rows: rows.len(),
            block_cols: cols.len(),
            coefficients,
        })
    }

    pub fn crop_middle_third(&self) -> Self {
        let rows = self.block_rows / 3..2 * self.block_rows / 3;
        let cols = self.block_cols / 3..2 * self.block_cols / 3;
        CoefficientPlane {
            label: self.label.clone(),
            block_rows: rows.len(),
            block_cols: cols.len(),
            coefficients: rows
                .flat_map(|row| cols.clone().map(move |col| (row, col)))
                .flat_map(|(row, col)| self.block(row, col).iter().copied())
                .collect(),
        }
    }

    /// Low-bit histogram over every coefficient except 0 and 1.
    pub fn low_bit_group(&self) -> LowBitGroup {
        let mut frequencies = [0u64; 2];
        for &value in &self.coefficients {
            if !matches!(value, 0 | 1) {
                frequencies[(value & 1) as usize] += 1;
            }
        }
        LowBitGroup {
            label: self.label.clone(),
            frequencies,
        }
    }
}

/// Eligible coefficients of a plane in block-row, block-col, row, col order.
#[derive(Debug, Clone)]
pub struct CoefficientPositions<'a> {
    plane: &'a CoefficientPlane,
    perceptibility: Perceptibility,
    next: usize,
}

impl Iterator for CoefficientPositions<'_> {
    type Item = BlockPosition;

    fn next(&mut self) -> Option<Self::Item> {
        let coefficients = &self.plane.coefficients;
        while self.next < coefficients.len() {
            let index = self.next;
            self.next += 1;

            let intra = index % BLOCK_LEN;
            let (row, col) = (intra / BLOCK_SIDE, intra % BLOCK_SIDE);
            let first = self.perceptibility.first_column(row);
            if col < first {
                // jump to the first candidate column of this row
                self.next += first - col - 1;
                continue;
            }
            if matches!(coefficients[index], 0 | 1) {
                continue;
            }

            let block = index / BLOCK_LEN;
            return Some(BlockPosition {
                block_row: block / self.plane.block_cols,
                block_col: block % self.plane.block_cols,
                row,
                col,
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.plane.coefficients.len() - self.next))
    }
}

/// The coefficient planes of a JPEG in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DctCarrier {
    pub planes: Vec<CoefficientPlane>,
}

impl DctCarrier {
    pub fn new(planes: Vec<CoefficientPlane>) -> Self {
        DctCarrier { planes }
    }

    /// Crops every plane to the same fraction of its block grid as `rows`
    /// and `cols` cover of the first plane.
    pub fn crop(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Self> {
        let Some(first) = self.planes.first() else {
            return Err(LowbitError::InvalidCrop);
        };
        let (base_rows, base_cols) = (first.block_rows.max(1), first.block_cols.max(1));
        let scale = |range: &Range<usize>, size: usize, base: usize| {
            range.start * size / base..range.end * size / base
        };
        let planes = self
            .planes
            .iter()
            .map(|plane| {
                plane.crop(
                    scale(&rows, plane.block_rows, base_rows),
                    scale(&cols, plane.block_cols, base_cols),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        if planes[0].block_rows != rows.len() || planes[0].block_cols != cols.len() {
            return Err(LowbitError::InvalidCrop);
        }
        Ok(DctCarrier { planes })
    }

    /// Keeps the middle third of every plane in both dimensions.
    pub fn crop_middle_third(&self) -> Self {
        DctCarrier {
            planes: self
                .planes
                .iter()
                .map(CoefficientPlane::crop_middle_third)
                .collect(),
        }
    }
}

impl Carrier for DctCarrier {
    type Position = BlockPosition;
    type Selection = Perceptibility;
    type Positions<'a> = CoefficientPositions<'a>;

    const KIND: CarrierKind = CarrierKind::Coefficient;

    fn plane_count(&self) -> usize {
        self.planes.len()
    }

    fn positions(&self, plane: usize, selection: Perceptibility) -> CoefficientPositions<'_> {
        self.planes[plane].positions(selection)
    }

    fn read_bits(&self, plane: usize, position: BlockPosition, _: Perceptibility) -> u8 {
        (self.planes[plane].get(position) & 1) as u8
    }

    fn write_bits(&mut self, plane: usize, position: BlockPosition, _: Perceptibility, bits: u8) {
        let plane = &mut self.planes[plane];
        let index = plane.index(position);
        let value = &mut plane.coefficients[index];
        *value = (*value & !1) | i16::from(bits & 1);
    }

    fn low_bit_groups(&self) -> Vec<LowBitGroup> {
        self.planes
            .iter()
            .map(CoefficientPlane::low_bit_group)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(value: u8) -> Perceptibility {
        Perceptibility::from_parameter(value).unwrap()
    }

    #[test]
    fn first_column_follows_the_anti_diagonal() {
        assert_eq!(p(1).first_column(0), 7);
        assert_eq!(p(1).first_column(7), 0);
        assert_eq!(p(3).first_column(2), 3);
        assert_eq!(p(8).first_column(0), 0);
    }

    #[test]
    fn dc_is_only_eligible_at_perceptibility_eight() {
        for value in Perceptibility::RANGE {
            assert_eq!(p(value).is_eligible(0, 0, 42), value == 8);
        }
    }

    #[test]
    fn zero_and_one_are_never_eligible() {
        for perceptibility in Perceptibility::all() {
            assert!(!perceptibility.is_eligible(7, 7, 0));
            assert!(!perceptibility.is_eligible(7, 7, 1));
            assert!(perceptibility.is_eligible(7, 7, -1));
            assert!(perceptibility.is_eligible(7, 7, 2));
        }
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        assert!(matches!(
            Perceptibility::from_parameter(0),
            Err(LowbitError::InvalidParameter { parameter: 0, .. })
        ));
        assert!(Perceptibility::from_parameter(9).is_err());
    }

    #[test]
    fn all_zero_block_has_no_positions() {
        let plane = CoefficientPlane::new("Y", 1, 1);
        for perceptibility in Perceptibility::all() {
            assert_eq!(plane.positions(perceptibility).count(), 0);
        }
    }

    #[test]
    fn positions_cover_the_eligible_triangle() {
        let mut plane = CoefficientPlane::new("Y", 1, 1);
        plane.coefficients.fill(5);
        // p=1: one column per row from (0,7) down to (7,0), p=8 everything
        assert_eq!(plane.positions(p(1)).count(), 1 + 2 + 3 + 4 + 5 + 6 + 7 + 8);
        assert_eq!(plane.positions(p(8)).count(), 64);

        let first: Vec<_> = plane.positions(p(2)).take(3).collect();
        assert_eq!(
            first,
            vec![
                BlockPosition { block_row: 0, block_col: 0, row: 0, col: 6 },
                BlockPosition { block_row: 0, block_col: 0, row: 0, col: 7 },
                BlockPosition { block_row: 0, block_col: 0, row: 1, col: 5 },
            ]
        );
    }

    #[test]
    fn positions_walk_blocks_row_major() {
        let mut plane = CoefficientPlane::new("Y", 2, 2);
        for row in 0..2 {
            for col in 0..2 {
                plane.block_mut(row, col)[63] = -7;
            }
        }
        let blocks: Vec<_> = plane
            .positions(p(1))
            .map(|position| (position.block_row, position.block_col))
            .collect();
        assert_eq!(blocks, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn positions_are_restartable() {
        let mut plane = CoefficientPlane::new("Y", 1, 2);
        plane.coefficients.fill(3);
        let positions = plane.positions(p(3));
        let first: Vec<_> = positions.clone().collect();
        let second: Vec<_> = positions.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn writing_a_low_bit_preserves_eligibility() {
        let mut carrier = DctCarrier::new(vec![CoefficientPlane::new("Y", 1, 1)]);
        let samples = [2i16, 3, -1, -2, 127, -128];
        carrier.planes[0].coefficients[56..62].copy_from_slice(&samples);

        let selection = p(8);
        let positions: Vec<_> = carrier.positions(0, selection).collect();
        assert_eq!(positions.len(), samples.len());
        for bit in [0, 1] {
            for &position in &positions {
                carrier.write_bits(0, position, selection, bit);
                assert_eq!(carrier.read_bits(0, position, selection), bit);
            }
            assert_eq!(carrier.positions(0, selection).count(), samples.len());
        }
    }

    #[test]
    fn low_bit_group_skips_zero_and_one() {
        let mut plane = CoefficientPlane::new("Cb", 1, 1);
        plane.coefficients[..6].copy_from_slice(&[0, 1, 2, 3, -3, -4]);
        let group = plane.low_bit_group();
        assert_eq!(group.label, "Cb");
        assert_eq!(group.frequencies, [2, 2]);
    }

    #[test]
    fn crop_middle_third_keeps_the_centre_blocks() {
        let mut plane = CoefficientPlane::new("Y", 6, 3);
        for row in 0..6 {
            for col in 0..3 {
                plane.block_mut(row, col)[0] = (row * 10 + col) as i16;
            }
        }
        let cropped = plane.crop_middle_third();
        assert_eq!((cropped.block_rows, cropped.block_cols), (2, 1));
        assert_eq!(cropped.block(0, 0)[0], 21);
        assert_eq!(cropped.block(1, 0)[0], 31);
    }

    #[test]
    fn carrier_crop_scales_subsampled_planes() {
        let carrier = DctCarrier::new(vec![
            CoefficientPlane::new("Y", 4, 4),
            CoefficientPlane::new("Cr", 2, 2),
        ]);
        let cropped = carrier.crop(2..4, 0..2).unwrap();
        assert_eq!(
            (cropped.planes[1].block_rows, cropped.planes[1].block_cols),
            (1, 1)
        );
        assert!(matches!(
            carrier.crop(0..5, 0..1),
            Err(LowbitError::InvalidCrop)
        ));
    }
}
