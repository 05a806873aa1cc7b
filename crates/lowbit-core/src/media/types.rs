use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use log::error;

use super::{JpegMedia, PngMedia, Persist};
use crate::carrier::CarrierKind;
use crate::error::LowbitError;
use crate::result::Result;

/// Container formats, each tied to one carrier kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Baseline JPEG, carrying data in DCT coefficients.
    Jpeg,
    /// PNG and other bitmaps, carrying data in pixel values. Always saved as PNG.
    Png,
}

impl MediaKind {
    /// Infers the kind from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Err(LowbitError::UnsupportedMedia);
        };
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" | "bmp" => Ok(Self::Png),
            _ => Err(LowbitError::UnsupportedMedia),
        }
    }

    /// The given kind, or the one inferred from `path`.
    pub fn resolve(kind: Option<Self>, path: &Path) -> Result<Self> {
        kind.map_or_else(|| Self::from_path(path), Ok)
    }

    pub fn carrier_kind(self) -> CarrierKind {
        match self {
            Self::Jpeg => CarrierKind::Coefficient,
            Self::Png => CarrierKind::Pixel,
        }
    }
}

impl FromStr for MediaKind {
    type Err = LowbitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            _ => Err(LowbitError::UnsupportedMedia),
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        })
    }
}

/// a media container for steganography
#[derive(Debug, Clone)]
pub enum Media {
    Jpeg(JpegMedia),
    Png(PngMedia),
}

impl Media {
    pub fn from_file(path: &Path, kind: MediaKind) -> Result<Self> {
        if !path.is_file() {
            error!("Carrier media {path:?} does not exist");
            return Err(LowbitError::ReadError {
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        match kind {
            MediaKind::Jpeg => Ok(Self::Jpeg(JpegMedia::open(path)?)),
            MediaKind::Png => Ok(Self::Png(PngMedia::open(path)?)),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Jpeg(_) => MediaKind::Jpeg,
            Self::Png(_) => MediaKind::Png,
        }
    }
}

impl Persist for Media {
    fn save_as(&self, file: &Path) -> Result<()> {
        match self {
            Self::Jpeg(jpeg) => jpeg.save_as(file),
            Self::Png(png) => png.save_as(file),
        }
    }
}
