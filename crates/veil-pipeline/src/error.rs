//! # Design
//!
//! - Provide structured errors for the build pipeline.
//! - Capture operation context (paths, roles, stages) to make failures reproducible in tests.
//! - Preserve transform errors untouched as the source of [`PipelineError::Transform`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed error reported by an external capability such as the protection transform.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors produced by the build pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required source file was absent.
    #[error("{role} not found at {}", .path.display())]
    MissingInput {
        /// Which input was missing (`main module` or `fragment`).
        role: &'static str,
        /// Location that was checked.
        path: PathBuf,
    },
    /// The protection transform failed; a half-transformed artifact is never written.
    #[error("protection transform '{transform}' failed")]
    Transform {
        /// Name of the transform implementation.
        transform: String,
        /// Error reported by the transform.
        source: BoxError,
    },
    /// IO failures while interacting with the filesystem.
    #[error("pipeline {operation} failed for {}", .path.display())]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// JSON serialization failures for the build report.
    #[error("pipeline {operation} failed for {}", .path.display())]
    Json {
        /// Operation that triggered the JSON failure.
        operation: &'static str,
        /// Path involved in the JSON failure.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The orchestrator was asked to move between states out of order.
    #[error("pipeline cannot move from {from} to {to}")]
    InvalidTransition {
        /// State the pipeline was in.
        from: &'static str,
        /// State that was requested.
        to: &'static str,
    },
}

impl PipelineError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn transform(transform: impl Into<String>, source: BoxError) -> Self {
        Self::Transform {
            transform: transform.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::Error as _;
    use std::error::Error;

    fn json_error() -> serde_json::Error {
        match serde_json::from_str::<serde_json::Value>("invalid") {
            Ok(_) => serde_json::Error::custom("expected invalid json"),
            Err(err) => err,
        }
    }

    #[test]
    fn pipeline_error_helpers_build_variants() {
        let io_err = PipelineError::io("read", "src/main.js", io::Error::other("io"));
        assert!(matches!(io_err, PipelineError::Io { .. }));
        assert!(io_err.source().is_some());
        assert_eq!(io_err.to_string(), "pipeline read failed for src/main.js");

        let json_err = PipelineError::json("render_report", "build-info.json", json_error());
        assert!(matches!(json_err, PipelineError::Json { .. }));
        assert!(json_err.source().is_some());

        let transform_err = PipelineError::transform("external", "boom".into());
        assert_eq!(
            transform_err.source().map(ToString::to_string),
            Some("boom".to_string())
        );
    }

    #[test]
    fn missing_input_names_role_and_path() {
        let err = PipelineError::MissingInput {
            role: "fragment",
            path: PathBuf::from("src/snippets"),
        };
        assert_eq!(err.to_string(), "fragment not found at src/snippets");
    }
}
