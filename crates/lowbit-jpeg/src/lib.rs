//! Lossless access to the quantized DCT coefficients of baseline JPEG images.
//!
//! The stream is never decoded to pixels. Coefficients are Huffman decoded
//! into one block grid per component, can be modified, and are Huffman
//! encoded again together with the untouched header segments:
//!
//! ```text
//! JPEG → parse → huffman decode → block grids → (modify) → huffman encode → JPEG
//! ```
//!
//! Small key/value tags can be stored next to the coefficients in COM
//! segments. The EXIF `UserComment` tag can be read but is never written.
//!
//! # Example
//!
//! ```ignore
//! use lowbit_jpeg::JpegCoefficients;
//!
//! let mut jpeg = JpegCoefficients::decode(&std::fs::read("cover.jpg")?)?;
//! jpeg.components_mut()[0].block_mut(0, 0)[63] |= 1;
//! jpeg.set_tag("UserComment", "8-3")?;
//! std::fs::write("out.jpg", jpeg.encode()?)?;
//! ```

mod comment;
mod error;
mod exif;
pub mod huffman;
pub mod marker;
pub mod parser;
pub mod scan;
pub mod tables;
pub mod writer;

use std::ops::Range;

pub use error::{JpegError, Result};
pub use marker::Marker;
pub use parser::{
    parse_jpeg, Component, FrameInfo, HuffmanTable, JpegSegments, Segment, TableClass,
    ZIGZAG_TO_NATURAL,
};
pub use scan::{decode_scan, encode_scan, ComponentBlocks, ScanLayout, BLOCK_LEN};
pub use writer::write_jpeg;

/// A baseline JPEG opened at coefficient level.
#[derive(Debug, Clone)]
pub struct JpegCoefficients {
    segments: JpegSegments,
    components: Vec<ComponentBlocks>,
}

impl JpegCoefficients {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let segments = parse_jpeg(data)?;
        let components = decode_scan(&segments)?;
        Ok(JpegCoefficients {
            segments,
            components,
        })
    }

    /// Re-encodes the coefficients into a complete JPEG file.
    ///
    /// Falls back to the Annex K tables when the image's own Huffman tables
    /// cannot represent the current coefficients.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let segments = &self.segments;
        let frame = segments.frame()?;
        let scan = encode_scan(
            &self.components,
            frame,
            &segments.dc_tables,
            &segments.ac_tables,
            segments.restart_interval,
        );

        match scan {
            Ok(scan) => Ok(write_jpeg(&segments.segments, frame, &scan)),
            Err(JpegError::MissingHuffmanSymbol { class, id, symbol }) => {
                log::info!(
                    "{class} table {id} lacks symbol 0x{symbol:02X}, re-encoding with standard tables"
                );
                let standard = self.with_standard_tables()?;
                let frame = standard.frame()?;
                let scan = encode_scan(
                    &self.components,
                    frame,
                    &standard.dc_tables,
                    &standard.ac_tables,
                    standard.restart_interval,
                )?;
                Ok(write_jpeg(&standard.segments, frame, &scan))
            }
            Err(e) => Err(e),
        }
    }

    fn with_standard_tables(&self) -> Result<JpegSegments> {
        let mut segments = self.segments.clone();
        let dc = [tables::dc_luminance(), tables::dc_chrominance()];
        let ac = [tables::ac_luminance(), tables::ac_chrominance()];

        let mut dht = Vec::new();
        for table in dc.iter().chain(ac.iter()) {
            dht.extend(table.to_dht_bytes());
        }
        segments.segments.retain(|s| s.marker != Marker::DHT);
        segments.segments.push(Segment {
            marker: Marker::DHT,
            data: dht,
        });

        segments.dc_tables = [Some(dc[0].clone()), Some(dc[1].clone()), None, None];
        segments.ac_tables = [Some(ac[0].clone()), Some(ac[1].clone()), None, None];
        let frame = segments
            .frame
            .as_mut()
            .ok_or_else(|| JpegError::malformed("missing frame header (SOF)"))?;
        for (index, component) in frame.components.iter_mut().enumerate() {
            let id = u8::from(index > 0);
            component.dc_table_id = id;
            component.ac_table_id = id;
        }
        Ok(segments)
    }

    pub fn frame(&self) -> Result<&FrameInfo> {
        self.segments.frame()
    }

    pub fn width(&self) -> u16 {
        self.segments.frame.as_ref().map_or(0, |f| f.width)
    }

    pub fn height(&self) -> u16 {
        self.segments.frame.as_ref().map_or(0, |f| f.height)
    }

    pub fn layout(&self) -> Result<ScanLayout> {
        ScanLayout::new(self.frame()?)
    }

    /// Components in frame order (Y, Cb, Cr for YCbCr images).
    pub fn components(&self) -> &[ComponentBlocks] {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut [ComponentBlocks] {
        &mut self.components
    }

    pub fn tags(&self) -> Vec<(String, String)> {
        comment::read_tags(&self.segments.segments)
    }

    pub fn tag(&self, key: &str) -> Option<String> {
        self.tags().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The EXIF `UserComment` text, if the image carries one.
    pub fn exif_user_comment(&self) -> Option<String> {
        exif::read_user_comment(&self.segments.segments)
    }

    pub fn set_tag(&mut self, key: &str, value: &str) -> Result<()> {
        comment::write_tag(&mut self.segments.segments, key, value)
    }

    pub fn remove_tag(&mut self, key: &str) -> bool {
        comment::remove_tag(&mut self.segments.segments, key)
    }

    /// Keeps only the MCUs inside the given window and shrinks the frame to match.
    pub fn crop_mcus(&mut self, rows: Range<usize>, cols: Range<usize>) -> Result<()> {
        let layout = self.layout()?;
        if rows.is_empty()
            || cols.is_empty()
            || rows.end > layout.mcu_rows
            || cols.end > layout.mcu_cols
        {
            return Err(JpegError::CropOutOfBounds {
                rows,
                cols,
                mcu_rows: layout.mcu_rows,
                mcu_cols: layout.mcu_cols,
            });
        }

        for (component, &(h, v)) in self.components.iter_mut().zip(&layout.sampling) {
            let block_rows = rows.len() * v;
            let block_cols = cols.len() * h;
            let mut coefficients = Vec::with_capacity(block_rows * block_cols * BLOCK_LEN);
            for row in rows.start * v..rows.end * v {
                for col in cols.start * h..cols.end * h {
                    coefficients.extend_from_slice(component.block(row, col));
                }
            }
            component.block_rows = block_rows;
            component.block_cols = block_cols;
            component.coefficients = coefficients;
        }

        // a window that reaches the last MCU keeps the original partial edge
        let (full_width, full_height) = (self.width() as usize, self.height() as usize);
        let height = (rows.len() * layout.mcu_height)
            .min(full_height - rows.start * layout.mcu_height) as u16;
        let width =
            (cols.len() * layout.mcu_width).min(full_width - cols.start * layout.mcu_width) as u16;
        if let Some(frame) = self.segments.frame.as_mut() {
            frame.height = height;
            frame.width = width;
        }
        for segment in &mut self.segments.segments {
            if matches!(segment.marker, Marker::SOF(_)) && segment.data.len() >= 5 {
                segment.data[1..3].copy_from_slice(&height.to_be_bytes());
                segment.data[3..5].copy_from_slice(&width.to_be_bytes());
            }
        }
        Ok(())
    }
}
