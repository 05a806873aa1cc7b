use std::path::{Path, PathBuf};

use log::{error, info};

use crate::capacity::Cover;
use crate::carrier::{Carrier, Selection};
use crate::embed::{Embedder, StegoCarrier};
use crate::media::{CodecOptions, Media, MediaKind, PngMedia, Persist};
use crate::metadata::Metadata;
use crate::{LowbitError, Result};

pub fn prepare() -> EmbedApi {
    EmbedApi::default()
}

#[derive(Default, Debug)]
pub struct EmbedApi {
    payload: Option<Vec<u8>>,
    data_file: Option<PathBuf>,
    image: Option<PathBuf>,
    output: Option<PathBuf>,
    kind: Option<MediaKind>,
    parameter: Option<u8>,
    watermark: bool,
}

impl EmbedApi {
    pub fn with_payload(mut self, payload: &[u8]) -> Self {
        self.payload = Some(payload.to_vec());
        self
    }

    pub fn with_data_file<A: AsRef<Path>>(mut self, data_file: A) -> Self {
        self.data_file = Some(data_file.as_ref().to_path_buf());
        self
    }

    pub fn use_data_file(mut self, data_file: Option<PathBuf>) -> Self {
        self.data_file = data_file;
        self
    }

    pub fn with_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(image.as_ref().to_path_buf());
        self
    }

    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    /// Set the media kind, by default it is inferred from the image extension
    pub fn use_kind(mut self, kind: Option<MediaKind>) -> Self {
        self.kind = kind;
        self
    }

    /// Perceptibility for JPEG, bits per channel for PNG
    pub fn with_parameter(mut self, parameter: u8) -> Self {
        self.parameter = Some(parameter);
        self
    }

    pub fn use_parameter(mut self, parameter: Option<u8>) -> Self {
        self.parameter = parameter;
        self
    }

    /// Repeat the payload as often as it fits
    pub fn with_watermark(mut self, watermark: bool) -> Self {
        self.watermark = watermark;
        self
    }

    /// Embeds and saves, returning the metadata record that was written.
    pub fn execute(self) -> Result<Metadata> {
        let Some(image) = self.image else {
            return Err(LowbitError::CarrierNotSet);
        };
        let Some(output) = self.output else {
            return Err(LowbitError::TargetNotSet);
        };
        let payload = match (self.payload, self.data_file) {
            (Some(payload), _) => payload,
            (None, Some(file)) => std::fs::read(&file).map_err(|source| {
                error!("Error reading payload {file:?}: {source}");
                LowbitError::ReadError { source }
            })?,
            (None, None) => return Err(LowbitError::MissingPayload),
        };

        let kind = MediaKind::resolve(self.kind, &image)?;
        let carrier_kind = kind.carrier_kind();
        let options = CodecOptions::with_parameter(
            carrier_kind,
            self.parameter
                .unwrap_or_else(|| carrier_kind.default_parameter()),
        );
        options.validate()?;

        let metadata = match Media::from_file(&image, kind)? {
            Media::Jpeg(mut jpeg) => {
                let stego = hide(&jpeg.cover(), &payload, options, self.watermark)?;
                let metadata = stego.metadata()?;
                let (carrier, tags) = stego.into_parts();
                jpeg.apply(&carrier, &tags)?;
                jpeg.save_as(&output)?;
                metadata
            }
            Media::Png(png) => {
                let stego = hide(&png.cover(), &payload, options, self.watermark)?;
                let metadata = stego.metadata()?;
                let (carrier, tags) = stego.into_parts();
                PngMedia::new(carrier, tags).save_as(&output)?;
                metadata
            }
        };
        info!(
            "Embedded {} bytes into {output:?} with parameter {}",
            metadata.payload_bits / 8,
            metadata.parameter
        );
        Ok(metadata)
    }
}

fn hide<C: Carrier>(
    cover: &Cover<C>,
    payload: &[u8],
    options: CodecOptions,
    watermark: bool,
) -> Result<StegoCarrier<C>> {
    let selection = C::Selection::from_parameter(options.parameter())?;
    let embedder = Embedder::default();
    if watermark {
        embedder.watermark(cover, payload, selection)
    } else {
        embedder.embed(cover, payload, selection)
    }
}
