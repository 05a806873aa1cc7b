use clap::{Parser, Subcommand};
use log::LevelFilter;
use lowbit_core::MediaKind;

use crate::commands::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Verbosity of the log output, `RUST_LOG` takes precedence
    #[arg(
        short,
        long,
        value_name = "level",
        default_value = "info",
        value_parser = parse_level,
        global = true
    )]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(visible_aliases = ["em", "m"])]
    Embed(embed::EmbedArgs),
    #[command(visible_aliases = ["ex", "x"])]
    Extract(extract::ExtractArgs),
    #[command(visible_alias = "s")]
    Storage(storage::StorageArgs),
    #[command(visible_alias = "d")]
    Detect(detect::DetectArgs),
    Crop(crop::CropArgs),
    VisualAttack(visual_attack::VisualAttackArgs),
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .parse()
        .map_err(|_| format!("unknown log level `{level}`"))
}

pub fn parse_kind(kind: &str) -> Result<MediaKind, String> {
    kind.parse()
        .map_err(|_| format!("unsupported media type `{kind}`, use jpeg or png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn aliases_reach_the_same_command() {
        let args = CliArgs::parse_from(["lowbit", "em", "-i", "a.png", "-o", "b.png", "-d", "c"]);
        assert!(matches!(args.command, Commands::Embed(_)));
        let args = CliArgs::parse_from(["lowbit", "x", "-i", "b.png"]);
        assert!(matches!(args.command, Commands::Extract(_)));
        let args = CliArgs::parse_from(["lowbit", "s", "-i", "b.jpg", "-p", "5"]);
        let Commands::Storage(storage) = args.command else {
            panic!("storage expected");
        };
        assert_eq!(storage.parameter, Some(5));
    }

    #[test]
    fn media_type_is_parsed() {
        let args = CliArgs::parse_from(["lowbit", "d", "-t", "jpeg", "-i", "cover.bin"]);
        let Commands::Detect(detect) = args.command else {
            panic!("detect expected");
        };
        assert_eq!(detect.kind, Some(lowbit_core::MediaKind::Jpeg));
        assert_eq!(args.log_level, LevelFilter::Info);
    }
}
