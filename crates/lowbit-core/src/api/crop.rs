use std::path::{Path, PathBuf};

use log::info;

use crate::media::{Media, MediaKind, PngMedia, Persist};
use crate::{LowbitError, Result};

pub fn prepare() -> CropApi {
    CropApi::default()
}

/// Keeps the middle third of an image in both dimensions, tags included.
///
/// JPEGs are cropped on whole MCUs without re-quantization, which is how a
/// stego image loses part of its capacity.
#[derive(Default, Debug)]
pub struct CropApi {
    image: Option<PathBuf>,
    output: Option<PathBuf>,
    kind: Option<MediaKind>,
}

impl CropApi {
    pub fn with_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(image.as_ref().to_path_buf());
        self
    }

    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    pub fn use_kind(mut self, kind: Option<MediaKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn execute(self) -> Result<()> {
        let Some(image) = self.image else {
            return Err(LowbitError::CarrierNotSet);
        };
        let Some(output) = self.output else {
            return Err(LowbitError::TargetNotSet);
        };
        let kind = MediaKind::resolve(self.kind, &image)?;

        match Media::from_file(&image, kind)? {
            Media::Jpeg(mut jpeg) => {
                jpeg.crop_middle_third()?;
                jpeg.save_as(&output)?;
            }
            Media::Png(png) => {
                PngMedia::new(png.carrier.crop_middle_third(), png.tags).save_as(&output)?;
            }
        }
        info!("Cropped {image:?} to its middle third in {output:?}");
        Ok(())
    }
}
