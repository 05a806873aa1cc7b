use std::path::PathBuf;

use clap::Args;
use lowbit_core::MediaKind;

use crate::cli::parse_kind;
use crate::CliResult;

/// Hides a file in the low bits of a JPEG or PNG image
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Media type, inferred from the input file extension when omitted
    #[arg(short = 't', long = "type", value_name = "jpeg|png", value_parser = parse_kind)]
    pub kind: Option<MediaKind>,

    /// Cover image, used readonly
    #[arg(short = 'i', long = "in", value_name = "cover image")]
    pub cover: PathBuf,

    /// Final image will be stored as file, bitmaps are always written as PNG
    #[arg(short = 'o', long = "out", value_name = "output image file")]
    pub output: PathBuf,

    /// File to hide in the image
    #[arg(short = 'd', long = "data", value_name = "data file")]
    pub data_file: PathBuf,

    /// Perceptibility 1..=8 for JPEG, bits per channel 1..=4 for PNG
    #[arg(short = 'p', long = "parameter", value_name = "parameter")]
    pub parameter: Option<u8>,

    /// Repeat the data until the image is full
    #[arg(short = 'w', long = "watermark")]
    pub watermark: bool,
}

impl EmbedArgs {
    pub fn run(self) -> CliResult<()> {
        let metadata = lowbit_core::api::embed::prepare()
            .use_kind(self.kind)
            .with_image(&self.cover)
            .with_data_file(&self.data_file)
            .use_parameter(self.parameter)
            .with_watermark(self.watermark)
            .with_output(&self.output)
            .execute()?;
        println!(
            "Embedded {} bits with parameter {} into {}",
            metadata.payload_bits,
            metadata.parameter,
            self.output.display()
        );
        Ok(())
    }
}
