//! Shared context and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use veil_config::{ConfigError, ConfigStore};
use veil_pipeline::{CommandTransform, PipelineError, ProjectLayout, Transform};

use crate::cli::{Cli, LayoutArgs, OutputFormat};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 1,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<PipelineError> for CliError {
    fn from(error: PipelineError) -> Self {
        Self::failure(error)
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        if matches!(error, ConfigError::Validation { .. }) {
            Self::validation(error.to_string())
        } else {
            Self::failure(error)
        }
    }
}

/// Settings shared by every command handler.
#[derive(Debug, Clone)]
pub(crate) struct AppContext {
    pub(crate) root: PathBuf,
    pub(crate) store: ConfigStore,
    pub(crate) transform_bin: String,
    pub(crate) transform_args: Vec<String>,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    pub(crate) fn from_cli(cli: &Cli) -> Self {
        let root = cli.project_root.clone();
        let store = cli.config.as_deref().map_or_else(
            || ConfigStore::in_project(&root),
            |path| ConfigStore::new(resolve(&root, path)),
        );
        Self {
            store,
            transform_bin: cli.transform_bin.clone(),
            transform_args: cli.transform_args.clone(),
            output: cli.output,
            root,
        }
    }

    /// Conventional layout with any per-command overrides applied.
    pub(crate) fn layout(&self, overrides: &LayoutArgs) -> ProjectLayout {
        let conventional = ProjectLayout::conventional(&self.root);
        let main_module = overrides
            .main
            .as_deref()
            .map_or(conventional.main_module, |path| resolve(&self.root, path));
        let fragment = overrides
            .fragment
            .as_deref()
            .map_or(conventional.fragment, |path| resolve(&self.root, path));
        let build_dir = overrides
            .build_dir
            .as_deref()
            .map_or(conventional.build_dir, |path| resolve(&self.root, path));
        ProjectLayout::with_build_dir(main_module, fragment, build_dir)
    }

    pub(crate) fn transform(&self) -> Box<dyn Transform> {
        Box::new(
            CommandTransform::new(&self.transform_bin).with_args(self.transform_args.iter()),
        )
    }

    pub(crate) fn resolve(&self, path: &Path) -> PathBuf {
        resolve(&self.root, path)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn context(root: &Path) -> AppContext {
        AppContext {
            root: root.to_path_buf(),
            store: ConfigStore::in_project(root),
            transform_bin: "veil-missing-transform".to_string(),
            transform_args: Vec::new(),
            output: OutputFormat::Text,
        }
    }

    /// Context whose transform copies its input through `sh`.
    #[cfg(unix)]
    pub(crate) fn copying_context(root: &Path) -> AppContext {
        AppContext {
            transform_bin: "sh".to_string(),
            transform_args: vec![
                "-c".to_string(),
                r#"if [ "$1" = "--version" ]; then echo fake; else cp "$1" "$3"; fi"#.to_string(),
                "transform".to_string(),
            ],
            ..context(root)
        }
    }
}
