//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Rig generator: turns annotated metarigs into control/deform rigs
#[derive(Parser, Debug)]
#[command(name = "rigsmith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d -d -d)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a rig from a metarig document
    Generate {
        /// Metarig JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        metarig: PathBuf,
        /// Write the generated armature as JSON to this file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Output format on stdout (default from config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Create a sample metarig
    Sample {
        /// Write to this file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show the parameter panel of a super copy rig
    Params {
        /// Metarig JSON file to read parameters from
        #[arg(long, value_hint = ValueHint::FilePath, requires = "bone")]
        metarig: Option<PathBuf>,
        /// Bone carrying the rig assignment
        #[arg(long, requires = "metarig")]
        bone: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show {
        /// Directory holding a local .rigsmith.toml
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_repeated_debug_flag_when_parsing_then_counts() {
        let cli = Cli::parse_from(["rigsmith", "-dd", "sample"]);
        assert_eq!(cli.debug, 2);
        assert!(matches!(cli.command, Some(Commands::Sample { output: None })));
    }

    #[test]
    fn given_bone_without_metarig_when_parsing_then_fails() {
        let result = Cli::try_parse_from(["rigsmith", "params", "--bone", "a"]);
        assert!(result.is_err());
    }

    #[test]
    fn given_format_when_parsing_generate_then_value_enum_is_used() {
        let cli = Cli::parse_from(["rigsmith", "generate", "rig.json", "--format", "json"]);
        match cli.command {
            Some(Commands::Generate { format, .. }) => assert_eq!(format, Some(OutputFormat::Json)),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
