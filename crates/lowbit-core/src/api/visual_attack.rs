use std::path::{Path, PathBuf};

use image::ImageFormat;
use log::error;

use crate::attack::visual_attack;
use crate::{LowbitError, Result};

pub fn prepare() -> VisualAttackApi {
    VisualAttackApi::default()
}

/// Writes the amplified low bit planes of an image's luminance as a PNG.
#[derive(Debug)]
pub struct VisualAttackApi {
    image: Option<PathBuf>,
    output: Option<PathBuf>,
    bits: u8,
    boost: u8,
}

impl Default for VisualAttackApi {
    fn default() -> Self {
        Self {
            image: None,
            output: None,
            bits: 1,
            boost: 7,
        }
    }
}

impl VisualAttackApi {
    pub fn with_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(image.as_ref().to_path_buf());
        self
    }

    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    /// Number of least significant bits to keep, 1 by default
    pub fn with_bits(mut self, bits: u8) -> Self {
        self.bits = bits;
        self
    }

    /// Left shift applied to the kept bits, 7 by default
    pub fn with_boost(mut self, boost: u8) -> Self {
        self.boost = boost;
        self
    }

    pub fn execute(self) -> Result<()> {
        let Some(image) = self.image else {
            return Err(LowbitError::CarrierNotSet);
        };
        let Some(output) = self.output else {
            return Err(LowbitError::TargetNotSet);
        };

        let luma = image::open(&image)
            .map_err(|e| {
                error!("Error opening image {image:?}: {e}");
                LowbitError::InvalidImageMedia
            })?
            .to_luma8();
        visual_attack(&luma, self.bits, self.boost)?
            .save_with_format(&output, ImageFormat::Png)
            .map_err(|e| {
                error!("Error saving image: {e}");
                LowbitError::ImageEncodingError
            })
    }
}
