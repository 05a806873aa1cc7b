use std::path::{Path, PathBuf};

use crate::capacity::{Capacity, Cover};
use crate::carrier::{Carrier, Selection};
use crate::media::{Media, MediaKind};
use crate::{LowbitError, Result};

pub fn prepare() -> StorageApi {
    StorageApi::default()
}

/// Reports how many bytes an image can hide.
#[derive(Default, Debug)]
pub struct StorageApi {
    image: Option<PathBuf>,
    kind: Option<MediaKind>,
    parameter: Option<u8>,
}

impl StorageApi {
    pub fn with_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(image.as_ref().to_path_buf());
        self
    }

    pub fn use_kind(mut self, kind: Option<MediaKind>) -> Self {
        self.kind = kind;
        self
    }

    /// Only report this parameter instead of all of them
    pub fn use_parameter(mut self, parameter: Option<u8>) -> Self {
        self.parameter = parameter;
        self
    }

    pub fn execute(self) -> Result<Vec<Capacity>> {
        let Some(image) = self.image else {
            return Err(LowbitError::CarrierNotSet);
        };
        let kind = MediaKind::resolve(self.kind, &image)?;
        match Media::from_file(&image, kind)? {
            Media::Jpeg(jpeg) => table(&jpeg.cover(), self.parameter),
            Media::Png(png) => table(&png.cover(), self.parameter),
        }
    }
}

fn table<C: Carrier>(cover: &Cover<C>, parameter: Option<u8>) -> Result<Vec<Capacity>> {
    match parameter {
        Some(parameter) => {
            let selection = C::Selection::from_parameter(parameter)?;
            Ok(vec![cover.capacity(selection).clone()])
        }
        None => Ok(cover.storage_table()),
    }
}
