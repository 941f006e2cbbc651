//! Structured error types for the correlation job

use super::phases::PhaseType;
use super::types::AttributePair;
use crate::matrix::MatrixError;
use crate::schema::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for map/reduce operations
#[derive(Debug, Error)]
pub enum MapReduceError {
    #[error("Invalid job configuration for '{field}' ({value}): {reason}")]
    InvalidConfiguration {
        reason: String,
        field: String,
        value: String,
    },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Schema mismatch while merging pair {pair}")]
    SchemaMismatch {
        pair: AttributePair,
        #[source]
        source: MatrixError,
    },

    #[error("Malformed partial matrix #{index} for pair {pair}")]
    MalformedPartial {
        pair: AttributePair,
        index: usize,
        #[source]
        source: MatrixError,
    },

    #[error("Partial matrix received for undeclared pair {pair}")]
    UnknownPair { pair: AttributePair },

    #[error("Failed to read input {path}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output {path}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output directory {path} already contains files")]
    OutputDirectoryNotEmpty { path: PathBuf },

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    #[error("{phase} task failed: {message}")]
    TaskFailed { phase: PhaseType, message: String },
}

impl MapReduceError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }
}

pub type MapReduceResult<T> = Result<T, MapReduceError>;
