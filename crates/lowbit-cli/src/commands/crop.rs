use std::path::PathBuf;

use clap::Args;
use lowbit_core::MediaKind;

use crate::cli::parse_kind;
use crate::CliResult;

/// Keeps the middle third of an image, hidden data and tags included
#[derive(Args, Debug)]
pub struct CropArgs {
    /// Media type, inferred from the input file extension when omitted
    #[arg(short = 't', long = "type", value_name = "jpeg|png", value_parser = parse_kind)]
    pub kind: Option<MediaKind>,

    #[arg(short = 'i', long = "in", value_name = "image")]
    pub media: PathBuf,

    #[arg(short = 'o', long = "out", value_name = "output image file")]
    pub output: PathBuf,
}

impl CropArgs {
    pub fn run(self) -> CliResult<()> {
        lowbit_core::api::crop::prepare()
            .use_kind(self.kind)
            .with_image(self.media)
            .with_output(self.output)
            .execute()
    }
}
