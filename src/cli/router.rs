//! Command routing and execution
//!
//! This module handles routing CLI commands to their respective implementations.

use crate::cli::args::Commands;
use crate::cli::commands::*;
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            config,
            schema,
            inputs,
            output,
            reducers,
            scale,
            summary,
        } => {
            run_correlation_job(RunParams {
                config,
                schema,
                inputs,
                output,
                reducers,
                scale,
                summary,
            })
            .await
        }
        Commands::Pairs { config, schema } => run_pairs_command(config, schema).await,
        Commands::Score {
            schema,
            source,
            dest,
            scale,
            delimiter,
            matrices,
        } => {
            run_score_command(ScoreParams {
                schema,
                source,
                dest,
                scale,
                delimiter,
                matrices,
            })
            .await
        }
    }
}
