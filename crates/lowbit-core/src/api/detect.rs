use std::path::{Path, PathBuf};

use crate::detect::{Detection, Detector};
use crate::media::{Media, MediaKind};
use crate::{LowbitError, Result};

pub fn prepare() -> DetectApi {
    DetectApi::default()
}

#[derive(Default, Debug)]
pub struct DetectApi {
    image: Option<PathBuf>,
    kind: Option<MediaKind>,
    significance: Option<f64>,
}

impl DetectApi {
    pub fn with_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(image.as_ref().to_path_buf());
        self
    }

    pub fn use_kind(mut self, kind: Option<MediaKind>) -> Self {
        self.kind = kind;
        self
    }

    /// Set the significance level alpha, 0.05 by default
    pub fn use_significance(mut self, significance: Option<f64>) -> Self {
        self.significance = significance;
        self
    }

    pub fn execute(self) -> Result<Detection> {
        let Some(image) = self.image else {
            return Err(LowbitError::CarrierNotSet);
        };
        let kind = MediaKind::resolve(self.kind, &image)?;

        let mut detector = Detector::default();
        if let Some(significance) = self.significance {
            detector = detector.with_significance(significance);
        }
        Ok(match Media::from_file(&image, kind)? {
            Media::Jpeg(jpeg) => detector.detect(&jpeg.carrier()),
            Media::Png(png) => detector.detect(&png.carrier),
        })
    }
}
