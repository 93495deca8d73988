//! Protection transform capability.
//!
//! # Design
//! - The transform is opaque: text plus an options map in, protected text out.
//! - Implementations are swappable behind [`Transform`]; the pipeline never
//!   inspects how the text was rewritten.
//! - [`CommandTransform`] drives an external obfuscator program through a scratch
//!   directory; the call blocks until the program exits.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::error::BoxError;

/// Opaque source-to-source protection capability.
pub trait Transform {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Check that the transform is usable before any output is written.
    ///
    /// # Errors
    ///
    /// Returns the transform's own error when it cannot run.
    fn preflight(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Rewrite `source` according to `options`.
    ///
    /// # Errors
    ///
    /// Returns the transform's own error; callers must not retry or keep partial output.
    fn transform(&self, source: &str, options: &Map<String, Value>) -> Result<String, BoxError>;
}

/// Transform that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTransform;

impl Transform for PassthroughTransform {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn transform(&self, source: &str, _options: &Map<String, Value>) -> Result<String, BoxError> {
        Ok(source.to_string())
    }
}

/// Failures reported by [`CommandTransform`].
#[derive(Debug, Error)]
pub enum CommandTransformError {
    /// The program could not be started.
    #[error("failed to run '{program}'")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The program exited unsuccessfully.
    #[error("'{program}' exited with {status}: {stderr}")]
    Exit {
        /// Program that was invoked.
        program: String,
        /// Rendered exit status.
        status: String,
        /// Trimmed standard error output.
        stderr: String,
    },
    /// Scratch files could not be prepared or read back.
    #[error("transform scratch {operation} failed for {}", .path.display())]
    Io {
        /// Operation that failed.
        operation: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The options map could not be rendered.
    #[error("failed to render transform options")]
    Options {
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

const INPUT_NAME: &str = "input.js";
const OUTPUT_NAME: &str = "output.js";
const OPTIONS_NAME: &str = "options.json";

/// Transform backed by an external obfuscator program.
///
/// Invoked as `<program> [args..] <input> --output <out> --config <options.json>`.
#[derive(Debug, Clone)]
pub struct CommandTransform {
    program: OsString,
    args: Vec<OsString>,
    name: String,
}

impl CommandTransform {
    /// Transform running `program` with no leading arguments.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        let program = program.into();
        let name = Path::new(&program)
            .file_name()
            .map_or_else(|| program.to_string_lossy(), |name| name.to_string_lossy())
            .into_owned();
        Self {
            program,
            args: Vec::new(),
            name,
        }
    }

    /// Append leading arguments placed before the input path.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    fn run(&self, mut command: Command) -> Result<Output, CommandTransformError> {
        let output = command
            .output()
            .map_err(|source| CommandTransformError::Spawn {
                program: self.name.clone(),
                source,
            })?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(CommandTransformError::Exit {
                program: self.name.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn run_in_scratch(
        &self,
        source: &str,
        options: &Map<String, Value>,
    ) -> Result<String, CommandTransformError> {
        let scratch = tempfile::Builder::new()
            .prefix("veil-transform-")
            .tempdir()
            .map_err(|source| CommandTransformError::Io {
                operation: "create_dir",
                path: std::env::temp_dir(),
                source,
            })?;
        let input = scratch.path().join(INPUT_NAME);
        let output = scratch.path().join(OUTPUT_NAME);
        let options_path = scratch.path().join(OPTIONS_NAME);

        write_scratch(&input, source.as_bytes())?;
        let rendered = serde_json::to_vec_pretty(options)
            .map_err(|source| CommandTransformError::Options { source })?;
        write_scratch(&options_path, &rendered)?;

        let mut command = self.command();
        command
            .arg(&input)
            .arg("--output")
            .arg(&output)
            .arg("--config")
            .arg(&options_path);
        debug!(program = %self.name, "running external transform");
        self.run(command)?;

        fs::read_to_string(&output).map_err(|source| CommandTransformError::Io {
            operation: "read_output",
            path: output,
            source,
        })
    }
}

fn write_scratch(path: &Path, contents: &[u8]) -> Result<(), CommandTransformError> {
    fs::write(path, contents).map_err(|source| CommandTransformError::Io {
        operation: "write",
        path: path.to_path_buf(),
        source,
    })
}

impl Transform for CommandTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn preflight(&self) -> Result<(), BoxError> {
        let mut command = self.command();
        command.arg("--version");
        let output = self.run(command)?;
        debug!(
            program = %self.name,
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "external transform available"
        );
        Ok(())
    }

    fn transform(&self, source: &str, options: &Map<String, Value>) -> Result<String, BoxError> {
        Ok(self.run_in_scratch(source, options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_returns_input() -> Result<(), BoxError> {
        let out = PassthroughTransform.transform("let a = 1;", &Map::new())?;
        assert_eq!(out, "let a = 1;");
        assert!(PassthroughTransform.preflight().is_ok());
        Ok(())
    }

    #[test]
    fn command_transform_names_itself_after_program_file() {
        let transform = CommandTransform::new("/usr/local/bin/javascript-obfuscator");
        assert_eq!(transform.name(), "javascript-obfuscator");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let transform = CommandTransform::new("veil-definitely-missing-transform");
        let err = transform.preflight().err();
        let spawn = err
            .as_deref()
            .and_then(|err| err.downcast_ref::<CommandTransformError>());
        assert!(matches!(spawn, Some(CommandTransformError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn command_transform_reads_program_output() -> Result<(), BoxError> {
        // $1 is the input path, $3 the output path.
        let transform = CommandTransform::new("sh").with_args([
            "-c",
            r#"cp "$1" "$3" && printf '//x' >> "$3""#,
            "transform",
        ]);
        let out = transform.transform("a();", &Map::new())?;
        assert_eq!(out, "a();//x");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_carries_stderr() {
        let transform =
            CommandTransform::new("sh").with_args(["-c", "echo bad options >&2; exit 3", "t"]);
        let err = transform.transform("a();", &Map::new()).err();
        let message = err.map(|err| err.to_string()).unwrap_or_default();
        assert!(message.contains("bad options"), "{message}");
    }
}
