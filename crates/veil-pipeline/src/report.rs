//! Build reporter: size deltas and provenance record.
//!
//! # Design
//! - Sizes and modification times come from the filesystem, never from in-memory text.
//! - A shrinking artifact is not assumed; negative savings are reported as-is.
//! - The report location is overwritten on every run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SubsecRound, Utc};
use tracing::info;
use veil_config::BuildMode;

use crate::error::{PipelineError, PipelineResult};
use crate::model::{BuildReport, Compression, Environment, FileStats};

impl FileStats {
    /// Stat `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] when the file cannot be inspected.
    pub fn of(path: &Path) -> PipelineResult<Self> {
        let metadata = fs::metadata(path).map_err(|err| PipelineError::io("stat", path, err))?;
        let modified = metadata
            .modified()
            .map_err(|err| PipelineError::io("stat_modified", path, err))?;
        Ok(Self {
            file: path.to_path_buf(),
            size: metadata.len(),
            last_modified: DateTime::<Utc>::from(modified).trunc_subsecs(3),
        })
    }
}

impl Compression {
    /// Ratio and savings going from `input` bytes to `output` bytes.
    ///
    /// An empty input reports `0.00%` rather than dividing by zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    pub fn between(input: u64, output: u64) -> Self {
        let percent = if input == 0 {
            0.0
        } else {
            (1.0 - output as f64 / input as f64) * 100.0
        };
        Self {
            ratio: format!("{percent:.2}%"),
            saved_bytes: input as i64 - output as i64,
        }
    }
}

impl Environment {
    /// Descriptors of the running process.
    #[must_use]
    pub fn current() -> Self {
        Self {
            runtime_version: format!("veil {}", env!("CARGO_PKG_VERSION")),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Writes [`BuildReport`] documents to a fixed location.
#[derive(Debug, Clone)]
pub struct BuildReporter {
    path: PathBuf,
}

impl BuildReporter {
    /// Reporter writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Report location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Measure both files, build the report and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error when either file cannot be inspected or the report
    /// cannot be rendered or written.
    pub fn report(
        &self,
        input: &Path,
        output: &Path,
        mode: BuildMode,
    ) -> PipelineResult<BuildReport> {
        let input = FileStats::of(input)?;
        let output = FileStats::of(output)?;
        let report = BuildReport {
            timestamp: Utc::now().trunc_subsecs(3),
            mode,
            compression: Compression::between(input.size, output.size),
            input,
            output,
            environment: Environment::current(),
        };
        self.write(&report)?;
        info!(
            path = %self.path.display(),
            input_bytes = report.input.size,
            output_bytes = report.output.size,
            ratio = %report.compression.ratio,
            "build report written"
        );
        Ok(report)
    }

    /// Persist an already built report.
    ///
    /// # Errors
    ///
    /// Returns an error when the report cannot be rendered or written.
    pub fn write(&self, report: &BuildReport) -> PipelineResult<()> {
        let rendered = serde_json::to_string_pretty(report)
            .map_err(|err| PipelineError::json("render_report", &self.path, err))?;
        fs::write(&self.path, rendered)
            .map_err(|err| PipelineError::io("write_report", &self.path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::error::Error;
    use tempfile::TempDir;

    type TestResult<T> = Result<T, Box<dyn Error>>;

    #[test]
    fn growth_reports_negative_savings() {
        let compression = Compression::between(1000, 1200);
        assert_eq!(compression.ratio, "-20.00%");
        assert_eq!(compression.saved_bytes, -200);
    }

    #[test]
    fn shrink_reports_positive_ratio() {
        let compression = Compression::between(1000, 250);
        assert_eq!(compression.ratio, "75.00%");
        assert_eq!(compression.saved_bytes, 750);
    }

    #[test]
    fn empty_input_avoids_division_by_zero() {
        let compression = Compression::between(0, 120);
        assert_eq!(compression.ratio, "0.00%");
        assert_eq!(compression.saved_bytes, -120);
    }

    #[test]
    fn report_is_written_with_camel_case_schema() -> TestResult<()> {
        let temp = TempDir::new()?;
        let input = temp.path().join("merged.js");
        let output = temp.path().join("worker.js");
        fs::write(&input, vec![b'a'; 1000])?;
        fs::write(&output, vec![b'b'; 1200])?;

        let reporter = BuildReporter::new(temp.path().join("build-info.json"));
        let report = reporter.report(&input, &output, BuildMode::Production)?;
        assert_eq!(report.input.size, 1000);
        assert_eq!(report.output.size, 1200);

        let raw: Value = serde_json::from_str(&fs::read_to_string(reporter.path())?)?;
        assert_eq!(raw["compression"]["ratio"], "-20.00%");
        assert_eq!(raw["compression"]["savedBytes"], -200);
        assert_eq!(raw["mode"], "production");
        assert!(raw["input"]["lastModified"].as_str().is_some_and(|ts| ts.ends_with('Z')));
        assert!(raw["environment"]["runtimeVersion"].is_string());
        assert_eq!(serde_json::from_value::<BuildReport>(raw)?, report);
        Ok(())
    }

    #[test]
    fn missing_output_fails_to_report() -> TestResult<()> {
        let temp = TempDir::new()?;
        let input = temp.path().join("merged.js");
        fs::write(&input, "x")?;
        let reporter = BuildReporter::new(temp.path().join("build-info.json"));
        let err = reporter
            .report(&input, &temp.path().join("worker.js"), BuildMode::Production)
            .err();
        assert!(matches!(err, Some(PipelineError::Io { operation: "stat", .. })));
        Ok(())
    }
}
