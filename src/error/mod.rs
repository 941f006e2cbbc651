use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;

pub use codes::ErrorCode;

use crate::mapreduce::MapReduceError;
use crate::matrix::MatrixError;
use crate::schema::SchemaError;

/// The unified error type for catcorr
#[derive(Error, Debug)]
pub enum CatcorrError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Execution error: {message}")]
    Execution {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Validation error: {message}")]
    Validation {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CatcorrError {
    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error with specific code and path
    pub fn storage_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn execution_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Execution {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a validation error for a specific field
    pub fn validation_with_code(
        code: u16,
        message: impl Into<String>,
        field: Option<String>,
    ) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            field,
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Storage { source: src, .. }
            | Self::Execution { source: src, .. }
            | Self::Validation { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Storage { message, .. }
            | Self::Execution { message, .. }
            | Self::Validation { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Storage { .. } => 4,
            Self::Execution { .. } => 5,
            Self::Validation { .. } => 8,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Storage { code, .. }
            | Self::Execution { code, .. }
            | Self::Validation { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Storage { message, path, .. } => match path {
                Some(p) => format!("Storage problem at {}: {}", p.display(), message),
                None => format!("Storage problem: {}", message),
            },
            Self::Execution { message, .. } => format!("Job failed: {}", message),
            Self::Validation { message, field, .. } => match field {
                Some(f) => format!("Invalid value for '{}': {}", f, message),
                None => format!("Invalid input: {}", message),
            },
        }
    }
}

/// Type alias for Results using CatcorrError
pub type Result<T> = std::result::Result<T, CatcorrError>;

impl From<std::io::Error> for CatcorrError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let (code, message) = match err.kind() {
            ErrorKind::NotFound => (ErrorCode::STORAGE_NOT_FOUND, "File or directory not found"),
            ErrorKind::PermissionDenied => {
                (ErrorCode::STORAGE_PERMISSION_DENIED, "Permission denied")
            }
            ErrorKind::AlreadyExists => (ErrorCode::STORAGE_ALREADY_EXISTS, "Already exists"),
            ErrorKind::InvalidInput => (ErrorCode::VALIDATION_INVALID_INPUT, "Invalid input"),
            ErrorKind::InvalidData => (ErrorCode::VALIDATION_INVALID_DATA, "Invalid data"),
            _ => (ErrorCode::STORAGE_IO_ERROR, "IO operation failed"),
        };

        CatcorrError::storage_with_code(code, message, None).with_source(err)
    }
}

impl From<serde_yaml::Error> for CatcorrError {
    fn from(err: serde_yaml::Error) -> Self {
        CatcorrError::config_with_code(ErrorCode::CONFIG_INVALID_YAML, "Invalid YAML syntax")
            .with_source(err)
    }
}

impl From<toml::de::Error> for CatcorrError {
    fn from(err: toml::de::Error) -> Self {
        CatcorrError::config_with_code(ErrorCode::CONFIG_INVALID_TOML, "Invalid TOML syntax")
            .with_source(err)
    }
}

impl From<serde_json::Error> for CatcorrError {
    fn from(err: serde_json::Error) -> Self {
        CatcorrError::config_with_code(ErrorCode::CONFIG_INVALID_JSON, "Invalid JSON syntax")
            .with_source(err)
    }
}

impl From<SchemaError> for CatcorrError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Io { path, source } => CatcorrError::storage_with_code(
                ErrorCode::STORAGE_IO_ERROR,
                "Failed to read feature schema",
                Some(path),
            )
            .with_source(source),
            SchemaError::UnrecognizedCategory { .. } => {
                CatcorrError::validation_with_code(
                    ErrorCode::VALIDATION_INVALID_DATA,
                    err.to_string(),
                    None,
                )
            }
            other => CatcorrError::config_with_code(ErrorCode::CONFIG_SCHEMA_ERROR, other.to_string())
                .with_source(other),
        }
    }
}

impl From<MatrixError> for CatcorrError {
    fn from(err: MatrixError) -> Self {
        let code = match &err {
            MatrixError::SchemaMismatch { .. } => ErrorCode::EXEC_SCHEMA_MISMATCH,
            MatrixError::Malformed { .. } => ErrorCode::EXEC_MALFORMED_PARTIAL,
            MatrixError::CountOverflow { .. } => ErrorCode::EXEC_COUNT_OVERFLOW,
            MatrixError::CellOutOfBounds { .. } => ErrorCode::EXEC_GENERIC,
        };
        CatcorrError::execution_with_code(code, err.to_string()).with_source(err)
    }
}

impl From<MapReduceError> for CatcorrError {
    fn from(err: MapReduceError) -> Self {
        match err {
            MapReduceError::InvalidConfiguration { ref field, .. } => {
                let field = field.clone();
                CatcorrError::validation_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    err.to_string(),
                    Some(field),
                )
            }
            MapReduceError::Schema(schema) => schema.into(),
            MapReduceError::InputReadFailed { ref path, .. }
            | MapReduceError::OutputWriteFailed { ref path, .. } => {
                let path = path.clone();
                CatcorrError::storage_with_code(ErrorCode::STORAGE_IO_ERROR, err.to_string(), Some(path))
                    .with_source(err)
            }
            MapReduceError::OutputDirectoryNotEmpty { ref path } => {
                let path = path.clone();
                CatcorrError::storage_with_code(
                    ErrorCode::STORAGE_ALREADY_EXISTS,
                    err.to_string(),
                    Some(path),
                )
            }
            MapReduceError::SchemaMismatch { .. } => {
                CatcorrError::execution_with_code(ErrorCode::EXEC_SCHEMA_MISMATCH, err.to_string())
                    .with_source(err)
            }
            MapReduceError::MalformedPartial { .. } => {
                CatcorrError::execution_with_code(ErrorCode::EXEC_MALFORMED_PARTIAL, err.to_string())
                    .with_source(err)
            }
            MapReduceError::UnknownPair { .. } => {
                CatcorrError::execution_with_code(ErrorCode::EXEC_UNKNOWN_PAIR, err.to_string())
                    .with_source(err)
            }
            MapReduceError::Matrix(matrix) => matrix.into(),
            MapReduceError::TaskFailed { .. } => {
                CatcorrError::execution_with_code(ErrorCode::EXEC_TASK_FAILED, err.to_string())
                    .with_source(err)
            }
        }
    }
}
