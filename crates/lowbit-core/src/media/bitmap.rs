use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use image::DynamicImage;
use log::{debug, error};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};

use super::Persist;
use crate::capacity::Cover;
use crate::carrier::PixelCarrier;
use crate::embed::StegoCarrier;
use crate::error::LowbitError;
use crate::result::Result;
use crate::tags::Tags;

/// An 8-bit bitmap with its text chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngMedia {
    pub carrier: PixelCarrier,
    pub tags: Tags,
}

impl PngMedia {
    pub fn new(carrier: PixelCarrier, tags: Tags) -> Self {
        PngMedia { carrier, tags }
    }

    /// Opens a PNG with its `tEXt` chunks, or any other bitmap the `image`
    /// crate understands without tags.
    pub fn open(path: &Path) -> Result<Self> {
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("png"));
        if is_png {
            let file = File::open(path).map_err(|source| {
                error!("Error opening file {path:?}: {source}");
                LowbitError::ReadError { source }
            })?;
            Self::read_png(BufReader::new(file))
        } else {
            let image = image::open(path).map_err(|e| {
                error!("Error opening image {path:?}: {e}");
                LowbitError::InvalidImageMedia
            })?;
            Self::from_image(image)
        }
    }

    pub fn read_png<R: Read>(reader: R) -> Result<Self> {
        let mut decoder = Decoder::new(reader);
        decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
        let mut reader = decoder.read_info().map_err(|e| {
            error!("Error decoding PNG header: {e}");
            LowbitError::InvalidImageMedia
        })?;

        let mut samples = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut samples).map_err(|e| {
            error!("Error decoding PNG image data: {e}");
            LowbitError::InvalidImageMedia
        })?;
        samples.truncate(frame.buffer_size());
        // text chunks after the image data are only known once the stream is done
        reader.finish().map_err(|e| {
            error!("Error reading trailing PNG chunks: {e}");
            LowbitError::InvalidImageMedia
        })?;

        let channels = match (frame.color_type, frame.bit_depth) {
            (ColorType::Grayscale, BitDepth::Eight) => 1,
            (ColorType::GrayscaleAlpha, BitDepth::Eight) => 2,
            (ColorType::Rgb, BitDepth::Eight) => 3,
            (ColorType::Rgba, BitDepth::Eight) => 4,
            (color, depth) => {
                error!("Unsupported PNG layout after expansion: {color:?} {depth:?}");
                return Err(LowbitError::UnsupportedMedia);
            }
        };
        let (width, height) = (frame.width as usize, frame.height as usize);
        let row = width * channels;
        if frame.line_size != row {
            samples = samples
                .chunks(frame.line_size)
                .flat_map(|line| line[..row].iter().copied())
                .collect();
        }

        let tags = reader
            .info()
            .uncompressed_latin1_text
            .iter()
            .map(|chunk| (chunk.keyword.clone(), chunk.text.clone()))
            .collect();
        debug!("Decoded {width}x{height} PNG with {channels} channels");
        Ok(PngMedia {
            carrier: PixelCarrier::new(width, height, channels, samples)?,
            tags,
        })
    }

    /// Any decoded image, reduced to 8 bits per channel.
    pub fn from_image(image: DynamicImage) -> Result<Self> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let (channels, samples) = match image {
            DynamicImage::ImageLuma8(i) => (1, i.into_raw()),
            DynamicImage::ImageLumaA8(i) => (2, i.into_raw()),
            DynamicImage::ImageRgb8(i) => (3, i.into_raw()),
            DynamicImage::ImageRgba8(i) => (4, i.into_raw()),
            other if other.color().has_alpha() => (4, other.to_rgba8().into_raw()),
            other => (3, other.to_rgb8().into_raw()),
        };
        Ok(PngMedia {
            carrier: PixelCarrier::new(width, height, channels, samples)?,
            tags: Tags::new(),
        })
    }

    pub fn cover(&self) -> Cover<PixelCarrier> {
        Cover::with_tags(self.carrier.clone(), self.tags.clone())
    }

    pub fn stego(&self) -> StegoCarrier<PixelCarrier> {
        StegoCarrier::new(self.carrier.clone(), self.tags.clone())
    }

    pub fn write_png<W: Write>(&self, writer: W) -> Result<()> {
        let carrier = &self.carrier;
        let mut encoder = Encoder::new(writer, carrier.width as u32, carrier.height as u32);
        encoder.set_color(match carrier.channels {
            1 => ColorType::Grayscale,
            2 => ColorType::GrayscaleAlpha,
            3 => ColorType::Rgb,
            _ => ColorType::Rgba,
        });
        encoder.set_depth(BitDepth::Eight);
        for (key, value) in self.tags.iter() {
            encoder
                .add_text_chunk(key.to_string(), value.to_string())
                .map_err(|e| {
                    error!("Error adding text chunk {key}: {e}");
                    LowbitError::ImageEncodingError
                })?;
        }

        let mut writer = encoder.write_header().map_err(|e| {
            error!("Error writing PNG header: {e}");
            LowbitError::ImageEncodingError
        })?;
        writer.write_image_data(&carrier.samples).map_err(|e| {
            error!("Error saving image: {e}");
            LowbitError::ImageEncodingError
        })?;
        writer.finish().map_err(|e| {
            error!("Error finishing PNG: {e}");
            LowbitError::ImageEncodingError
        })
    }
}

impl Persist for PngMedia {
    fn save_as(&self, file: &Path) -> Result<()> {
        let f = File::create(file).map_err(|e| {
            error!("Error creating file {file:?}: {e}");
            LowbitError::WriteError { source: e }
        })?;
        self.write_png(BufWriter::new(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagStore;

    #[test]
    fn round_trips_samples_and_text_chunks() {
        let carrier = PixelCarrier::new(3, 2, 4, (0..24).collect()).unwrap();
        let tags: Tags = [("UserComment", "16-2"), ("Software", "lowbit")]
            .into_iter()
            .collect();
        let media = PngMedia::new(carrier, tags);

        let mut encoded = Vec::new();
        media.write_png(&mut encoded).unwrap();
        let decoded = PngMedia::read_png(encoded.as_slice()).unwrap();

        assert_eq!(decoded, media);
        assert_eq!(decoded.tags.tag("UserComment"), Some("16-2"));
    }

    #[test]
    fn converts_sixteen_bit_images_to_eight() {
        let image =
            image::ImageBuffer::<image::Rgb<u16>, _>::from_pixel(2, 2, image::Rgb([0xABCD; 3]));
        let media = PngMedia::from_image(DynamicImage::ImageRgb16(image)).unwrap();
        assert_eq!(media.carrier.channels, 3);
        assert_eq!(media.carrier.samples, vec![0xAB; 12]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            PngMedia::read_png(&b"not a png"[..]),
            Err(LowbitError::InvalidImageMedia)
        ));
    }
}
