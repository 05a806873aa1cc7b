use std::path::Path;

use log::{debug, error};
use lowbit_jpeg::{ComponentBlocks, JpegCoefficients};

use super::Persist;
use crate::capacity::Cover;
use crate::carrier::{CoefficientPlane, DctCarrier};
use crate::embed::StegoCarrier;
use crate::error::LowbitError;
use crate::metadata::METADATA_KEY;
use crate::result::Result;
use crate::tags::{TagStore, Tags};

/// A baseline JPEG opened at coefficient level.
#[derive(Debug, Clone)]
pub struct JpegMedia {
    coefficients: JpegCoefficients,
}

/// Frame component indices in scan order with their labels.
fn scan_order(components: usize) -> Vec<(usize, String)> {
    match components {
        1 => vec![(0, "Y".to_string())],
        3 => vec![
            (0, "Y".to_string()),
            (2, "Cr".to_string()),
            (1, "Cb".to_string()),
        ],
        n => (0..n).map(|i| (i, format!("C{}", i + 1))).collect(),
    }
}

impl JpegMedia {
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| {
            error!("Error reading file {path:?}: {source}");
            LowbitError::ReadError { source }
        })?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let coefficients = JpegCoefficients::decode(data)?;
        debug!(
            "Decoded {}x{} JPEG with {} components",
            coefficients.width(),
            coefficients.height(),
            coefficients.components().len()
        );
        Ok(JpegMedia { coefficients })
    }

    pub fn coefficients(&self) -> &JpegCoefficients {
        &self.coefficients
    }

    /// The coefficient planes in scan order, Y Cr Cb for color images.
    pub fn carrier(&self) -> DctCarrier {
        let components = self.coefficients.components();
        DctCarrier::new(
            scan_order(components.len())
                .into_iter()
                .map(|(index, label)| plane(label, &components[index]))
                .collect(),
        )
    }

    /// COM tags, with the EXIF `UserComment` standing in for a missing
    /// metadata record.
    pub fn tags(&self) -> Tags {
        let mut tags: Tags = self.coefficients.tags().into_iter().collect();
        if tags.tag(METADATA_KEY).is_none() {
            if let Some(comment) = self.coefficients.exif_user_comment() {
                debug!("Using the EXIF UserComment as metadata record");
                tags.set_tag(METADATA_KEY, comment);
            }
        }
        tags
    }

    pub fn cover(&self) -> Cover<DctCarrier> {
        Cover::with_tags(self.carrier(), self.tags())
    }

    pub fn stego(&self) -> StegoCarrier<DctCarrier> {
        StegoCarrier::new(self.carrier(), self.tags())
    }

    /// Writes planes and tags back into the JPEG.
    pub fn apply(&mut self, carrier: &DctCarrier, tags: &Tags) -> Result<()> {
        let order = scan_order(self.coefficients.components().len());
        if order.len() != carrier.planes.len() {
            return Err(LowbitError::InvalidImageMedia);
        }
        let components = self.coefficients.components_mut();
        for ((index, _), plane) in order.into_iter().zip(&carrier.planes) {
            let component = &mut components[index];
            if component.coefficients.len() != plane.coefficients.len() {
                return Err(LowbitError::InvalidImageMedia);
            }
            component.coefficients.copy_from_slice(&plane.coefficients);
        }

        for (key, _) in self.coefficients.tags() {
            if tags.tag(&key).is_none() {
                self.coefficients.remove_tag(&key);
            }
        }
        for (key, value) in tags.iter() {
            self.coefficients.set_tag(key, value)?;
        }
        Ok(())
    }

    /// Keeps the middle third of the MCU grid in both dimensions.
    pub fn crop_middle_third(&mut self) -> Result<()> {
        let layout = self.coefficients.layout()?;
        let rows = layout.mcu_rows / 3..2 * layout.mcu_rows / 3;
        let cols = layout.mcu_cols / 3..2 * layout.mcu_cols / 3;
        self.crop_mcus(rows.start, cols.start, rows.len(), cols.len())
    }

    pub fn crop_mcus(&mut self, top: usize, left: usize, rows: usize, cols: usize) -> Result<()> {
        self.coefficients
            .crop_mcus(top..top + rows, left..left + cols)
            .map_err(|e| {
                error!("Error cropping JPEG: {e}");
                LowbitError::InvalidCrop
            })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.coefficients.encode()?)
    }
}

fn plane(label: String, component: &ComponentBlocks) -> CoefficientPlane {
    CoefficientPlane {
        label,
        block_rows: component.block_rows,
        block_cols: component.block_cols,
        coefficients: component.coefficients.clone(),
    }
}

impl Persist for JpegMedia {
    fn save_as(&self, file: &Path) -> Result<()> {
        let data = self.encode()?;
        std::fs::write(file, data).map_err(|source| {
            error!("Error writing file {file:?}: {source}");
            LowbitError::WriteError { source }
        })
    }
}
