//! Command implementation modules
//!
//! This module contains the implementation of each CLI command.
//! Each command is implemented as a separate module for better organization.

pub mod pairs;
pub mod run;
pub mod score;

// Re-export command execution functions
pub use pairs::run_pairs_command;
pub use run::{run_correlation_job, RunParams};
pub use score::{run_score_command, ScoreParams};

use crate::config::{apply_env_overrides, load_job_config, JobConfig};
use crate::schema::FeatureSchema;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load a job file, apply environment overrides and the schema override,
/// then load the schema it names
pub(crate) async fn load_job(
    config_path: &Path,
    schema_override: Option<PathBuf>,
) -> Result<(JobConfig, FeatureSchema)> {
    let mut config = load_job_config(config_path)
        .await
        .with_context(|| format!("Failed to load job configuration {}", config_path.display()))?;
    apply_env_overrides(&mut config)?;
    if let Some(schema) = schema_override {
        config.schema_path = Some(schema);
    }
    let schema = load_schema(&config)?;
    Ok((config, schema))
}

pub(crate) fn load_schema(config: &JobConfig) -> Result<FeatureSchema> {
    let path = config
        .schema_path
        .as_deref()
        .context("No feature schema given (set schema_path or pass --schema)")?;
    FeatureSchema::load(path)
        .with_context(|| format!("Failed to load feature schema {}", path.display()))
}
