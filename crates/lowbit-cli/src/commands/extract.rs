use std::path::PathBuf;

use clap::Args;
use log::warn;
use lowbit_core::MediaKind;

use crate::cli::parse_kind;
use crate::CliResult;

/// Extracts hidden data from a JPEG or PNG image
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Media type, inferred from the input file extension when omitted
    #[arg(short = 't', long = "type", value_name = "jpeg|png", value_parser = parse_kind)]
    pub kind: Option<MediaKind>,

    /// Source image that contains secret data
    #[arg(short = 'i', long = "in", value_name = "stego image")]
    pub media: PathBuf,

    /// Extracted data will be stored as file, printed when omitted
    #[arg(short = 'o', long = "out", value_name = "output file")]
    pub output: Option<PathBuf>,
}

impl ExtractArgs {
    pub fn run(self) -> CliResult<()> {
        let print = self.output.is_none();
        let extraction = lowbit_core::api::extract::prepare()
            .use_kind(self.kind)
            .with_secret_image(&self.media)
            .use_output(self.output)
            .execute()?;

        if !extraction.is_complete() {
            warn!(
                "{} of {} bits could not be read, the image was probably cropped",
                extraction.missing_bits, extraction.expected_bits
            );
        }
        if print {
            println!("{}", String::from_utf8_lossy(&extraction.payload));
        }
        Ok(())
    }
}
