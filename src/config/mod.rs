//! Job configuration
//!
//! A correlation job is described by a `JobConfig` loaded from a YAML or
//! TOML file, then overridden from `CATCORR_*` environment variables and
//! finally from command-line flags. Every key mirrors one setting of the
//! batch job this tool reproduces:
//!
//! | key                    | meaning                                         | default |
//! |------------------------|-------------------------------------------------|---------|
//! | `schema_path`          | JSON feature schema                             | none    |
//! | `field_delim_regex`    | regex splitting input records into fields       | `,`     |
//! | `field_delim_out`      | delimiter between output columns                | `,`     |
//! | `source_attributes`    | source ordinals (list or `"1,2"`)               | none    |
//! | `dest_attributes`      | destination ordinals (list or `"3,4"`)          | none    |
//! | `num_reducers`         | concurrent aggregators / output part files      | `1`     |
//! | `correlation_scale`    | fixed-point scale applied to the score          | `1000`  |
//! | `debug`                | raise default log level to debug                | `false` |
//! | `split_size`           | records per input partition                     | `10000` |
//! | `max_parallel_mappers` | concurrent partitions                           | cores   |

pub mod loader;

pub use loader::{apply_env_overrides, apply_env_overrides_with, load_job_config, parse_job_config};

use crate::error::{CatcorrError, ErrorCode};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Configuration of one correlation job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Path to the JSON feature schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,

    /// Regular expression separating the fields of an input record
    #[serde(default = "default_delimiter")]
    pub field_delim_regex: String,

    /// Delimiter placed between output columns
    #[serde(default = "default_delimiter")]
    pub field_delim_out: String,

    /// Source attribute ordinals
    #[serde(default, deserialize_with = "deserialize_ordinals")]
    pub source_attributes: Vec<usize>,

    /// Destination attribute ordinals
    #[serde(default, deserialize_with = "deserialize_ordinals")]
    pub dest_attributes: Vec<usize>,

    /// Number of aggregator tasks, and of output part files
    #[serde(default = "default_num_reducers")]
    pub num_reducers: usize,

    /// Fixed-point scale for the printed score (1 prints the raw value)
    #[serde(default = "default_correlation_scale")]
    pub correlation_scale: u32,

    /// Raise the default log level to debug
    #[serde(default)]
    pub debug: bool,

    /// Maximum number of records per input partition
    #[serde(default = "default_split_size")]
    pub split_size: usize,

    /// Maximum number of partitions processed at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel_mappers: Option<usize>,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_num_reducers() -> usize {
    1
}

fn default_correlation_scale() -> u32 {
    1000
}

fn default_split_size() -> usize {
    10_000
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            schema_path: None,
            field_delim_regex: default_delimiter(),
            field_delim_out: default_delimiter(),
            source_attributes: Vec::new(),
            dest_attributes: Vec::new(),
            num_reducers: default_num_reducers(),
            correlation_scale: default_correlation_scale(),
            debug: false,
            split_size: default_split_size(),
            max_parallel_mappers: None,
        }
    }
}

/// Ordinal lists may be written as a sequence or as a comma separated string
fn deserialize_ordinals<'de, D>(deserializer: D) -> Result<Vec<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OrdinalsValue {
        List(Vec<usize>),
        Text(String),
    }

    match OrdinalsValue::deserialize(deserializer)? {
        OrdinalsValue::List(list) => Ok(list),
        OrdinalsValue::Text(text) => parse_ordinal_list(&text).map_err(serde::de::Error::custom),
    }
}

/// Parse `"1, 2,3"` into ordinals
pub fn parse_ordinal_list(text: &str) -> Result<Vec<usize>, String> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<usize>()
                .map_err(|e| format!("invalid attribute ordinal '{}': {}", token, e))
        })
        .collect()
}

impl JobConfig {
    /// Number of partitions processed at once, falling back to the number
    /// of available cores
    pub fn effective_max_parallel_mappers(&self) -> usize {
        self.max_parallel_mappers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check every setting, reporting all problems at once
    pub fn validate(&self) -> Result<(), CatcorrError> {
        let mut problems = Vec::new();

        if self.schema_path.is_none() {
            problems.push("schema_path is required".to_string());
        }
        if self.source_attributes.is_empty() {
            problems.push("source_attributes must name at least one ordinal".to_string());
        }
        if self.dest_attributes.is_empty() {
            problems.push("dest_attributes must name at least one ordinal".to_string());
        }
        if !self.source_attributes.is_empty()
            && !self.dest_attributes.is_empty()
            && self
                .source_attributes
                .iter()
                .all(|src| self.dest_attributes.iter().all(|dst| src == dst))
        {
            problems.push(
                "source_attributes and dest_attributes only form self-pairs".to_string(),
            );
        }
        if self.num_reducers == 0 {
            problems.push("num_reducers must be greater than 0".to_string());
        }
        if self.correlation_scale == 0 {
            problems.push("correlation_scale must be greater than 0".to_string());
        }
        if self.split_size == 0 {
            problems.push("split_size must be greater than 0".to_string());
        }
        if self.max_parallel_mappers == Some(0) {
            problems.push("max_parallel_mappers must be greater than 0".to_string());
        }
        if self.field_delim_regex.is_empty() {
            problems.push("field_delim_regex must not be empty".to_string());
        } else if let Err(e) = Regex::new(&self.field_delim_regex) {
            problems.push(format!("field_delim_regex is not a valid regex: {}", e));
        }
        if self.field_delim_out.is_empty() {
            problems.push("field_delim_out must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CatcorrError::config_with_code(
                ErrorCode::CONFIG_VALIDATION_FAILED,
                problems.join("; "),
            ))
        }
    }
}
