use std::path::{Path, PathBuf};

use log::{error, info};

use crate::extract::{Extraction, Extractor};
use crate::media::{Media, MediaKind};
use crate::{LowbitError, Result};

pub fn prepare() -> ExtractApi {
    ExtractApi::default()
}

#[derive(Default, Debug)]
pub struct ExtractApi {
    image: Option<PathBuf>,
    output: Option<PathBuf>,
    kind: Option<MediaKind>,
}

impl ExtractApi {
    pub fn with_secret_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(image.as_ref().to_path_buf());
        self
    }

    /// Write the payload to this file, otherwise it is only returned
    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    pub fn use_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn use_kind(mut self, kind: Option<MediaKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn execute(self) -> Result<Extraction> {
        let Some(image) = self.image else {
            return Err(LowbitError::CarrierNotSet);
        };
        let kind = MediaKind::resolve(self.kind, &image)?;

        let extractor = Extractor::default();
        let extraction = match Media::from_file(&image, kind)? {
            Media::Jpeg(jpeg) => extractor.extract(&jpeg.stego())?,
            Media::Png(png) => extractor.extract(&png.stego())?,
        };

        if let Some(output) = self.output {
            std::fs::write(&output, &extraction.payload).map_err(|source| {
                error!("Error writing payload to {output:?}: {source}");
                LowbitError::WriteError { source }
            })?;
            info!("Wrote {} bytes to {output:?}", extraction.payload.len());
        }
        Ok(extraction)
    }
}
