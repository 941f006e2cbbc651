use super::{parse_ordinal_list, JobConfig};
use crate::error::{CatcorrError, ErrorCode};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "CATCORR_";

/// Supported job file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => Some(Self::Yaml),
            Some("toml") => Some(Self::Toml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse job configuration text in the given format
pub fn parse_job_config(content: &str, format: ConfigFormat) -> Result<JobConfig, CatcorrError> {
    let config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };
    Ok(config)
}

/// Load a job configuration file
///
/// A relative `schema_path` inside the file is resolved against the
/// directory containing the file.
pub async fn load_job_config(path: &Path) -> Result<JobConfig, CatcorrError> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        CatcorrError::config_with_code(
            ErrorCode::CONFIG_UNSUPPORTED_FORMAT,
            format!(
                "Unsupported configuration format for {} (expected .yml, .yaml, .toml or .json)",
                path.display()
            ),
        )
    })?;

    if !path.exists() {
        return Err(CatcorrError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("Configuration file not found: {}", path.display()),
        ));
    }

    let content = fs::read_to_string(path).await?;
    let mut config =
        parse_job_config(&content, format).map_err(|e| e.with_context(path.display()))?;

    if let Some(schema) = config.schema_path.as_ref().filter(|p| p.is_relative()) {
        if let Some(parent) = path.parent() {
            config.schema_path = Some(parent.join(schema));
        }
    }

    debug!("Loaded job configuration from {}", path.display());
    Ok(config)
}

/// Apply `CATCORR_*` overrides from the process environment
pub fn apply_env_overrides(config: &mut JobConfig) -> Result<(), CatcorrError> {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

/// Apply `CATCORR_*` overrides using `lookup` to read variables
pub fn apply_env_overrides_with<F>(config: &mut JobConfig, lookup: F) -> Result<(), CatcorrError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(&format!("{ENV_PREFIX}{key}"));

    if let Some(value) = var("SCHEMA_PATH") {
        config.schema_path = Some(PathBuf::from(value));
    }
    if let Some(value) = var("FIELD_DELIM_REGEX") {
        config.field_delim_regex = value;
    }
    if let Some(value) = var("FIELD_DELIM_OUT") {
        config.field_delim_out = value;
    }
    if let Some(value) = var("SOURCE_ATTRIBUTES") {
        config.source_attributes =
            parse_ordinal_list(&value).map_err(|e| invalid_env("SOURCE_ATTRIBUTES", e))?;
    }
    if let Some(value) = var("DEST_ATTRIBUTES") {
        config.dest_attributes =
            parse_ordinal_list(&value).map_err(|e| invalid_env("DEST_ATTRIBUTES", e))?;
    }
    if let Some(value) = var("NUM_REDUCERS") {
        config.num_reducers = parse_env("NUM_REDUCERS", &value)?;
    }
    if let Some(value) = var("CORRELATION_SCALE") {
        config.correlation_scale = parse_env("CORRELATION_SCALE", &value)?;
    }
    if let Some(value) = var("DEBUG") {
        config.debug = parse_env("DEBUG", &value)?;
    }
    if let Some(value) = var("SPLIT_SIZE") {
        config.split_size = parse_env("SPLIT_SIZE", &value)?;
    }
    if let Some(value) = var("MAX_PARALLEL_MAPPERS") {
        config.max_parallel_mappers = Some(parse_env("MAX_PARALLEL_MAPPERS", &value)?);
    }
    Ok(())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, CatcorrError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| invalid_env(key, format!("'{}': {}", value, e)))
}

fn invalid_env(key: &str, detail: impl std::fmt::Display) -> CatcorrError {
    CatcorrError::config_with_code(
        ErrorCode::CONFIG_INVALID_VALUE,
        format!("Invalid value for {ENV_PREFIX}{key}: {detail}"),
    )
}
