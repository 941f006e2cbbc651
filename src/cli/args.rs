//! CLI argument structures
//!
//! This module defines the command-line interface of catcorr: the main
//! CLI structure and every subcommand definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Compute Cramer's V between categorical attributes
#[derive(Parser)]
#[command(name = "catcorr")]
#[command(about = "catcorr - Correlation between categorical attributes of delimited records", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a correlation job over input files
    #[command(name = "run")]
    Run {
        /// Job configuration file (.yml, .yaml, .toml or .json)
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Feature schema, overriding `schema_path` from the configuration
        #[arg(short = 's', long)]
        schema: Option<PathBuf>,

        /// Input files or directories
        #[arg(short = 'i', long = "input", value_name = "PATH", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output directory for part files (prints to stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Number of reducers, overriding `num_reducers`
        #[arg(short = 'r', long)]
        reducers: Option<usize>,

        /// Score scale, overriding `correlation_scale`
        #[arg(long)]
        scale: Option<u32>,

        /// Write `_SUCCESS.json` with job counters into the output directory
        #[arg(long)]
        summary: bool,
    },

    /// List the declared attribute pairs of a job
    #[command(name = "pairs")]
    Pairs {
        /// Job configuration file
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Feature schema, overriding `schema_path` from the configuration
        #[arg(short = 's', long)]
        schema: Option<PathBuf>,
    },

    /// Merge serialized matrices for one pair and print its score
    #[command(name = "score")]
    Score {
        /// Feature schema
        #[arg(short = 's', long)]
        schema: PathBuf,

        /// Source attribute ordinal
        #[arg(long)]
        source: usize,

        /// Destination attribute ordinal
        #[arg(long)]
        dest: usize,

        /// Score scale (1 prints the raw value)
        #[arg(long, default_value = "1000")]
        scale: u32,

        /// Output delimiter
        #[arg(short = 'd', long, default_value = ",")]
        delimiter: String,

        /// Files holding serialized matrices, one per line
        #[arg(required = true)]
        matrices: Vec<PathBuf>,
    },
}

impl Commands {
    /// Job configuration file named by the command, if any
    pub fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Commands::Run { config, .. } | Commands::Pairs { config, .. } => Some(config),
            Commands::Score { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "catcorr", "-vv", "run", "-c", "job.yml", "-i", "a.csv", "b.csv", "-o", "out",
            "--reducers", "3",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run {
                inputs,
                output,
                reducers,
                summary,
                ..
            } => {
                assert_eq!(inputs, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(reducers, Some(3));
                assert!(!summary);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_requires_input() {
        assert!(Cli::try_parse_from(["catcorr", "run", "-c", "job.yml"]).is_err());
    }

    #[test]
    fn test_parse_score_defaults() {
        let cli = Cli::try_parse_from([
            "catcorr", "score", "-s", "schema.json", "--source", "1", "--dest", "2", "m.txt",
        ])
        .unwrap();
        assert!(cli.command.config_path().is_none());
        match cli.command {
            Commands::Score {
                scale, delimiter, ..
            } => {
                assert_eq!(scale, 1000);
                assert_eq!(delimiter, ",");
            }
            _ => panic!("expected score"),
        }
    }
}
