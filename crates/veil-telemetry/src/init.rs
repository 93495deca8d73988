//! Logging initialisation.
//!
//! # Design
//! - Logs go to stderr; stdout carries build summaries and JSON output.
//! - `RUST_LOG` wins over the configured level when present.
//! - Without an explicit format, interactive terminals get readable lines and
//!   pipes or CI runners get JSON.

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed (for example,
/// because another subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init(),
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { source })
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable log lines.
    Pretty,
}

impl LogFormat {
    /// Pretty when stderr is a terminal, JSON otherwise.
    #[must_use]
    pub fn infer() -> Self {
        if std::io::stderr().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Map a textual format name to a [`LogFormat`], inferring for unknown names.
#[must_use]
pub fn log_format_from_str(value: Option<&str>) -> LogFormat {
    match value {
        Some(name) if name.eq_ignore_ascii_case("json") => LogFormat::Json,
        Some(name) if name.eq_ignore_ascii_case("pretty") || name.eq_ignore_ascii_case("text") => {
            LogFormat::Pretty
        }
        _ => LogFormat::infer(),
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_from_str_parses_variants() {
        assert_eq!(log_format_from_str(Some("json")), LogFormat::Json);
        assert_eq!(log_format_from_str(Some("pretty")), LogFormat::Pretty);
        assert_eq!(log_format_from_str(Some("JSON")), LogFormat::Json);
        assert_eq!(log_format_from_str(Some("text")), LogFormat::Pretty);
        assert_eq!(log_format_from_str(Some("unknown")), LogFormat::infer());
        assert_eq!(log_format_from_str(None), LogFormat::infer());
    }

    #[test]
    fn init_logging_installs_subscriber_once() {
        let config = LoggingConfig {
            level: "info",
            format: LogFormat::Pretty,
        };
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
