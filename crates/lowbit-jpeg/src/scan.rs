//! Baseline scan decoding and encoding.
//!
//! Coefficients are kept quantized, in natural order, on one block grid per
//! component. MCU interleaving is resolved here so that callers can address
//! a block by its position in the component plane.

use crate::error::{JpegError, Result};
use crate::huffman::{magnitude_category, BitReader, BitWriter, HuffmanDecoder, HuffmanEncoder};
use crate::parser::{FrameInfo, HuffmanTable, JpegSegments, ZIGZAG_TO_NATURAL};

/// Coefficients per 8x8 block.
pub const BLOCK_LEN: usize = 64;

/// Quantized coefficients of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentBlocks {
    pub id: u8,
    pub block_rows: usize,
    pub block_cols: usize,
    /// `BLOCK_LEN` values per block in natural order, blocks row-major.
    pub coefficients: Vec<i16>,
}

impl ComponentBlocks {
    fn zeroed(id: u8, block_rows: usize, block_cols: usize) -> Self {
        ComponentBlocks {
            id,
            block_rows,
            block_cols,
            coefficients: vec![0; block_rows * block_cols * BLOCK_LEN],
        }
    }

    pub fn block(&self, row: usize, col: usize) -> &[i16] {
        let start = (row * self.block_cols + col) * BLOCK_LEN;
        &self.coefficients[start..start + BLOCK_LEN]
    }

    pub fn block_mut(&mut self, row: usize, col: usize) -> &mut [i16] {
        let start = (row * self.block_cols + col) * BLOCK_LEN;
        &mut self.coefficients[start..start + BLOCK_LEN]
    }
}

/// MCU geometry of a single interleaved scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLayout {
    pub mcu_rows: usize,
    pub mcu_cols: usize,
    /// Pixel size of one MCU.
    pub mcu_width: usize,
    pub mcu_height: usize,
    /// Blocks per MCU of each component as `(horizontal, vertical)`.
    pub sampling: Vec<(usize, usize)>,
}

impl ScanLayout {
    pub fn new(frame: &FrameInfo) -> Result<Self> {
        if frame.components.is_empty() || frame.width == 0 || frame.height == 0 {
            return Err(JpegError::malformed("frame without components or pixels"));
        }
        if frame
            .components
            .iter()
            .any(|c| !(1..=4).contains(&c.h_sampling) || !(1..=4).contains(&c.v_sampling))
        {
            return Err(JpegError::malformed("sampling factor outside 1..=4"));
        }

        // a non-interleaved scan codes one block per MCU whatever the factors say
        let sampling: Vec<(usize, usize)> = if frame.components.len() == 1 {
            vec![(1, 1)]
        } else {
            frame
                .components
                .iter()
                .map(|c| (c.h_sampling as usize, c.v_sampling as usize))
                .collect()
        };
        let h_max = sampling.iter().map(|s| s.0).max().unwrap_or(1);
        let v_max = sampling.iter().map(|s| s.1).max().unwrap_or(1);
        let mcu_width = 8 * h_max;
        let mcu_height = 8 * v_max;

        Ok(ScanLayout {
            mcu_rows: (frame.height as usize).div_ceil(mcu_height),
            mcu_cols: (frame.width as usize).div_ceil(mcu_width),
            mcu_width,
            mcu_height,
            sampling,
        })
    }

    pub fn mcu_count(&self) -> usize {
        self.mcu_rows * self.mcu_cols
    }

    /// Block grid `(rows, cols)` of a component, MCU padding included.
    pub fn block_grid(&self, component: usize) -> (usize, usize) {
        let (h, v) = self.sampling[component];
        (self.mcu_rows * v, self.mcu_cols * h)
    }

    /// Visits the blocks of one MCU in coding order as `(component, row, col)`.
    fn for_each_block<F>(&self, mcu: usize, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, usize, usize) -> Result<()>,
    {
        let mcu_row = mcu / self.mcu_cols;
        let mcu_col = mcu % self.mcu_cols;
        for (component, &(h, v)) in self.sampling.iter().enumerate() {
            for y in 0..v {
                for x in 0..h {
                    visit(component, mcu_row * v + y, mcu_col * h + x)?;
                }
            }
        }
        Ok(())
    }
}

fn build_tables<T>(
    frame: &FrameInfo,
    tables: &[Option<HuffmanTable>; 4],
    select: impl Fn(&crate::parser::Component) -> u8,
    build: impl Fn(&HuffmanTable) -> Result<T>,
    class: &str,
) -> Result<Vec<T>> {
    frame
        .components
        .iter()
        .map(|component| {
            let id = select(component);
            let table = tables[id as usize].as_ref().ok_or_else(|| {
                JpegError::malformed(format!("missing {class} Huffman table {id}"))
            })?;
            build(table)
        })
        .collect()
}

/// Splits scan data at RST markers.
fn restart_intervals(scan: &[u8]) -> Vec<&[u8]> {
    let mut intervals = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos + 1 < scan.len() {
        if scan[pos] == 0xFF && (0xD0..=0xD7).contains(&scan[pos + 1]) {
            intervals.push(&scan[start..pos]);
            pos += 2;
            start = pos;
        } else if scan[pos] == 0xFF {
            pos += 2;
        } else {
            pos += 1;
        }
    }
    intervals.push(&scan[start.min(scan.len())..]);
    intervals
}

/// Decodes the scan into per-component block grids.
pub fn decode_scan(segments: &JpegSegments) -> Result<Vec<ComponentBlocks>> {
    let frame = segments.frame()?;
    if frame.is_progressive() {
        return Err(JpegError::unsupported("progressive JPEG"));
    }
    if !frame.is_sequential_huffman() {
        return Err(JpegError::unsupported(format!(
            "coding process SOF{}",
            frame.sof_type
        )));
    }
    if frame.precision != 8 {
        return Err(JpegError::unsupported(format!(
            "{}-bit sample precision",
            frame.precision
        )));
    }

    let layout = ScanLayout::new(frame)?;
    let dc = build_tables(frame, &segments.dc_tables, |c| c.dc_table_id, HuffmanDecoder::new, "DC")?;
    let ac = build_tables(frame, &segments.ac_tables, |c| c.ac_table_id, HuffmanDecoder::new, "AC")?;

    let mut components: Vec<ComponentBlocks> = frame
        .components
        .iter()
        .enumerate()
        .map(|(index, c)| {
            let (rows, cols) = layout.block_grid(index);
            ComponentBlocks::zeroed(c.id, rows, cols)
        })
        .collect();

    let total = layout.mcu_count();
    let interval = match segments.restart_interval {
        0 => total,
        n => n as usize,
    };
    let chunks = if segments.restart_interval > 0 {
        restart_intervals(&segments.scan_data)
    } else {
        vec![segments.scan_data.as_slice()]
    };

    let mut mcu = 0;
    for chunk in chunks {
        if mcu >= total {
            break;
        }
        let mut reader = BitReader::new(chunk);
        let mut predictors = vec![0i16; components.len()];
        let end = (mcu + interval).min(total);
        while mcu < end {
            layout.for_each_block(mcu, |component, row, col| {
                decode_block(
                    &mut reader,
                    components[component].block_mut(row, col),
                    &dc[component],
                    &ac[component],
                    &mut predictors[component],
                )
            })?;
            mcu += 1;
        }
    }

    if mcu < total {
        return Err(JpegError::malformed(format!(
            "scan holds {mcu} of {total} MCUs"
        )));
    }
    log::debug!(
        "decoded {total} MCUs over {} components ({}x{})",
        components.len(),
        frame.width,
        frame.height
    );
    Ok(components)
}

/// Encodes per-component block grids into a scan, emitting RST markers.
pub fn encode_scan(
    components: &[ComponentBlocks],
    frame: &FrameInfo,
    dc_tables: &[Option<HuffmanTable>; 4],
    ac_tables: &[Option<HuffmanTable>; 4],
    restart_interval: u16,
) -> Result<Vec<u8>> {
    let layout = ScanLayout::new(frame)?;
    if components.len() != layout.sampling.len() {
        return Err(JpegError::malformed("component count differs from frame"));
    }
    for (index, component) in components.iter().enumerate() {
        let (rows, cols) = layout.block_grid(index);
        if (component.block_rows, component.block_cols) != (rows, cols)
            || component.coefficients.len() != rows * cols * BLOCK_LEN
        {
            return Err(JpegError::malformed(format!(
                "component {} does not match the {rows}x{cols} block grid",
                component.id
            )));
        }
    }

    let dc = build_tables(frame, dc_tables, |c| c.dc_table_id, HuffmanEncoder::new, "DC")?;
    let ac = build_tables(frame, ac_tables, |c| c.ac_table_id, HuffmanEncoder::new, "AC")?;

    let interval = restart_interval as usize;
    let mut output = Vec::new();
    let mut writer = BitWriter::new();
    let mut predictors = vec![0i16; components.len()];

    for mcu in 0..layout.mcu_count() {
        if interval > 0 && mcu > 0 && mcu % interval == 0 {
            output.extend(std::mem::take(&mut writer).finish());
            let index = ((mcu / interval - 1) % 8) as u8;
            output.extend_from_slice(&[0xFF, 0xD0 + index]);
            predictors.fill(0);
        }
        layout.for_each_block(mcu, |component, row, col| {
            encode_block(
                &mut writer,
                components[component].block(row, col),
                &dc[component],
                &ac[component],
                &mut predictors[component],
            )
        })?;
    }
    output.extend(writer.finish());
    Ok(output)
}

fn decode_block(
    reader: &mut BitReader,
    block: &mut [i16],
    dc: &HuffmanDecoder,
    ac: &HuffmanDecoder,
    predictor: &mut i16,
) -> Result<()> {
    block.fill(0);

    let size = reader.decode(dc)?;
    if size > 11 {
        return Err(JpegError::malformed(format!("DC category {size}")));
    }
    *predictor = predictor.wrapping_add(reader.receive_extend(size)?);
    block[0] = *predictor;

    let mut k = 1;
    while k < BLOCK_LEN {
        let symbol = reader.decode(ac)?;
        let run = (symbol >> 4) as usize;
        let size = symbol & 0x0F;
        match (run, size) {
            (0, 0) => break,
            (15, 0) => k += 16,
            (_, 0) => {
                return Err(JpegError::malformed(format!("AC symbol 0x{symbol:02X}")));
            }
            _ => {
                k += run;
                if k >= BLOCK_LEN || size > 10 {
                    return Err(JpegError::malformed("AC coefficient out of range"));
                }
                block[ZIGZAG_TO_NATURAL[k]] = reader.receive_extend(size)?;
                k += 1;
            }
        }
    }
    Ok(())
}

fn encode_block(
    writer: &mut BitWriter,
    block: &[i16],
    dc: &HuffmanEncoder,
    ac: &HuffmanEncoder,
    predictor: &mut i16,
) -> Result<()> {
    let diff = block[0].wrapping_sub(*predictor);
    *predictor = block[0];
    let (size, bits) = magnitude_category(diff);
    writer.write_symbol(size, dc)?;
    writer.write_bits(bits, size);

    let mut run = 0u8;
    for &natural in &ZIGZAG_TO_NATURAL[1..] {
        let value = block[natural];
        if value == 0 {
            run += 1;
            continue;
        }
        while run >= 16 {
            writer.write_symbol(0xF0, ac)?;
            run -= 16;
        }
        let (size, bits) = magnitude_category(value);
        writer.write_symbol((run << 4) | size, ac)?;
        writer.write_bits(bits, size);
        run = 0;
    }
    if run > 0 {
        writer.write_symbol(0x00, ac)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Component;
    use crate::tables;

    fn frame(width: u16, height: u16, sampling: &[(u8, u8)]) -> FrameInfo {
        FrameInfo {
            sof_type: 0,
            precision: 8,
            height,
            width,
            components: sampling
                .iter()
                .enumerate()
                .map(|(i, &(h, v))| Component {
                    id: i as u8 + 1,
                    h_sampling: h,
                    v_sampling: v,
                    quant_table_id: 0,
                    dc_table_id: (i > 0) as u8,
                    ac_table_id: (i > 0) as u8,
                })
                .collect(),
        }
    }

    fn standard_segments(frame: FrameInfo, restart_interval: u16) -> JpegSegments {
        JpegSegments {
            dc_tables: [Some(tables::dc_luminance()), Some(tables::dc_chrominance()), None, None],
            ac_tables: [Some(tables::ac_luminance()), Some(tables::ac_chrominance()), None, None],
            frame: Some(frame),
            restart_interval,
            ..JpegSegments::default()
        }
    }

    fn random_components(layout: &ScanLayout, seed: u64) -> Vec<ComponentBlocks> {
        let mut rng = fastrand::Rng::with_seed(seed);
        (0..layout.sampling.len())
            .map(|index| {
                let (rows, cols) = layout.block_grid(index);
                let mut blocks = ComponentBlocks::zeroed(index as u8 + 1, rows, cols);
                for (i, value) in blocks.coefficients.iter_mut().enumerate() {
                    *value = match i % BLOCK_LEN {
                        0 => rng.i16(-600..600),
                        k if k < 20 => rng.i16(-30..30),
                        _ if rng.u8(..) < 20 => rng.i16(-3..=3),
                        _ => 0,
                    };
                }
                blocks
            })
            .collect()
    }

    fn roundtrip(frame: FrameInfo, restart_interval: u16) {
        let layout = ScanLayout::new(&frame).expect("layout");
        let mut segments = standard_segments(frame, restart_interval);
        let components = random_components(&layout, 7);

        segments.scan_data = encode_scan(
            &components,
            segments.frame().expect("frame"),
            &segments.dc_tables,
            &segments.ac_tables,
            restart_interval,
        )
        .expect("encode");

        let decoded = decode_scan(&segments).expect("decode");
        assert_eq!(decoded, components);
    }

    #[test]
    fn layout_pads_partial_mcus() {
        let layout = ScanLayout::new(&frame(33, 17, &[(2, 2), (1, 1), (1, 1)])).expect("layout");
        assert_eq!((layout.mcu_rows, layout.mcu_cols), (2, 3));
        assert_eq!(layout.block_grid(0), (4, 6));
        assert_eq!(layout.block_grid(2), (2, 3));
    }

    #[test]
    fn single_component_scans_ignore_sampling_factors() {
        let layout = ScanLayout::new(&frame(20, 9, &[(2, 2)])).expect("layout");
        assert_eq!(layout.block_grid(0), (2, 3));
        assert_eq!(layout.mcu_count(), 6);
    }

    #[test]
    fn interleaved_blocks_land_on_their_grid_positions() {
        let layout = ScanLayout::new(&frame(32, 16, &[(2, 2), (1, 1), (1, 1)])).expect("layout");
        let mut visited = Vec::new();
        layout
            .for_each_block(1, |component, row, col| {
                visited.push((component, row, col));
                Ok(())
            })
            .expect("visit");
        assert_eq!(
            visited,
            vec![(0, 0, 2), (0, 0, 3), (0, 1, 2), (0, 1, 3), (1, 0, 1), (2, 0, 1)]
        );
    }

    #[test]
    fn grayscale_roundtrip() {
        roundtrip(frame(24, 16, &[(1, 1)]), 0);
    }

    #[test]
    fn subsampled_color_roundtrip() {
        roundtrip(frame(40, 24, &[(2, 2), (1, 1), (1, 1)]), 0);
    }

    #[test]
    fn restart_intervals_roundtrip() {
        roundtrip(frame(64, 24, &[(2, 1), (1, 1), (1, 1)]), 3);
    }

    #[test]
    fn restart_markers_cycle_through_all_eight_codes() {
        let frame = frame(8 * 20, 8, &[(1, 1)]);
        let layout = ScanLayout::new(&frame).expect("layout");
        let segments = standard_segments(frame, 1);
        let scan = encode_scan(
            &random_components(&layout, 3),
            segments.frame().expect("frame"),
            &segments.dc_tables,
            &segments.ac_tables,
            1,
        )
        .expect("encode");

        let markers: Vec<u8> = scan
            .windows(2)
            .filter(|w| w[0] == 0xFF && (0xD0..=0xD7).contains(&w[1]))
            .map(|w| w[1])
            .collect();
        assert_eq!(markers.len(), 19);
        assert_eq!(&markers[..9], &[0xD0, 0xD1, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD0]);
        assert_eq!(restart_intervals(&scan).len(), 20);
    }

    #[test]
    fn truncated_scans_are_rejected() {
        let frame = frame(64, 64, &[(1, 1)]);
        let layout = ScanLayout::new(&frame).expect("layout");
        let mut segments = standard_segments(frame, 0);
        let scan = encode_scan(
            &random_components(&layout, 11),
            segments.frame().expect("frame"),
            &segments.dc_tables,
            &segments.ac_tables,
            0,
        )
        .expect("encode");
        segments.scan_data = scan[..scan.len() / 4].to_vec();

        assert!(decode_scan(&segments).is_err());
    }

    #[test]
    fn progressive_frames_are_rejected() {
        let mut frame = frame(8, 8, &[(1, 1)]);
        frame.sof_type = 2;
        let error = decode_scan(&standard_segments(frame, 0)).expect_err("progressive");
        assert!(error.to_string().contains("progressive"));
    }
}
