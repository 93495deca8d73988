//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required keys were absent or empty in a document offered for import.
    #[error("configuration is missing required keys: {}", .missing.join(", "))]
    Validation {
        /// Every required key that failed the check, in declaration order.
        missing: Vec<&'static str>,
    },
    /// Document was not valid JSON or did not match the configuration schema.
    #[error("failed to parse configuration document {}", .path.display())]
    Parse {
        /// Document location.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// Partial update produced a document that no longer matches the schema.
    #[error("configuration update does not match the schema")]
    InvalidUpdate {
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// Document could not be rendered as JSON.
    #[error("failed to serialize configuration document")]
    Serialize {
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// File system operation failed.
    #[error("configuration {operation} failed for {}", .path.display())]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
