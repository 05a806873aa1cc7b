use clap::Parser;

mod cli;
mod commands;

use cli::{CliArgs, Commands};

pub type CliResult<T> = lowbit_core::Result<T>;

fn main() -> CliResult<()> {
    let args = CliArgs::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    match args.command {
        Commands::Embed(args) => args.run(),
        Commands::Extract(args) => args.run(),
        Commands::Storage(args) => args.run(),
        Commands::Detect(args) => args.run(),
        Commands::Crop(args) => args.run(),
        Commands::VisualAttack(args) => args.run(),
    }
}
