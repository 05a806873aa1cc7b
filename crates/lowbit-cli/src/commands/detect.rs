use std::path::PathBuf;

use clap::Args;
use lowbit_core::MediaKind;

use crate::cli::parse_kind;
use crate::CliResult;

/// Runs a chi-square test on the low bits of an image
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Media type, inferred from the input file extension when omitted
    #[arg(short = 't', long = "type", value_name = "jpeg|png", value_parser = parse_kind)]
    pub kind: Option<MediaKind>,

    /// Image to analyse
    #[arg(short = 'i', long = "in", value_name = "image")]
    pub media: PathBuf,

    /// Significance level, 0.05 when omitted
    #[arg(long = "alpha", value_name = "alpha")]
    pub alpha: Option<f64>,
}

impl DetectArgs {
    pub fn run(self) -> CliResult<()> {
        let detection = lowbit_core::api::detect::prepare()
            .use_kind(self.kind)
            .with_image(&self.media)
            .use_significance(self.alpha)
            .execute()?;

        for group in &detection.groups {
            match group.p_value() {
                Some(p) => println!(
                    "{}: {} zeros, {} ones, p = {p:.6}",
                    group.label, group.observed[0], group.observed[1]
                ),
                None => println!("{}: no eligible values", group.label),
            }
        }
        println!("{} (alpha = {})", detection.verdict, detection.significance);
        Ok(())
    }
}
