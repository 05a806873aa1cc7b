use std::path::PathBuf;

use clap::Args;
use lowbit_core::{Capacity, MediaKind};

use crate::cli::parse_kind;
use crate::CliResult;

/// Shows how many bytes an image can hide
#[derive(Args, Debug)]
pub struct StorageArgs {
    /// Media type, inferred from the input file extension when omitted
    #[arg(short = 't', long = "type", value_name = "jpeg|png", value_parser = parse_kind)]
    pub kind: Option<MediaKind>,

    /// Cover image
    #[arg(short = 'i', long = "in", value_name = "cover image")]
    pub media: PathBuf,

    /// Only show this parameter instead of every one
    #[arg(short = 'p', long = "parameter", value_name = "parameter")]
    pub parameter: Option<u8>,
}

impl StorageArgs {
    pub fn run(self) -> CliResult<()> {
        let table = lowbit_core::api::storage::prepare()
            .use_kind(self.kind)
            .with_image(&self.media)
            .use_parameter(self.parameter)
            .execute()?;

        for capacity in &table {
            println!("{}", describe(capacity));
        }
        Ok(())
    }
}

/// Total bytes, then the exact bits of every plane in scan order.
fn describe(capacity: &Capacity) -> String {
    let planes: Vec<String> = capacity
        .plane_bits
        .iter()
        .map(|bits| bits.to_string())
        .collect();
    format!(
        "parameter {}: {} bytes ({} bits)",
        capacity.parameter,
        capacity.bytes(),
        planes.join(" + ")
    )
}
