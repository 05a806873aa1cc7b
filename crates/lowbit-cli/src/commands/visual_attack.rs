use std::path::PathBuf;

use clap::Args;

use crate::CliResult;

/// Renders the amplified low bits of an image as a grayscale PNG
#[derive(Args, Debug)]
pub struct VisualAttackArgs {
    #[arg(short = 'i', long = "in", value_name = "image")]
    pub media: PathBuf,

    #[arg(short = 'o', long = "out", value_name = "output png")]
    pub output: PathBuf,

    /// Number of least significant bits to keep
    #[arg(short = 'b', long = "bits", default_value = "1")]
    pub bits: u8,

    /// Left shift applied to the kept bits
    #[arg(long = "boost", default_value = "7")]
    pub boost: u8,
}

impl VisualAttackArgs {
    pub fn run(self) -> CliResult<()> {
        lowbit_core::api::visual_attack::prepare()
            .with_image(self.media)
            .with_output(self.output)
            .with_bits(self.bits)
            .with_boost(self.boost)
            .execute()
    }
}
