//! Pipeline orchestrator.
//!
//! # Design
//! - Strictly linear: clean, validate, assemble, protect, finish, report.
//! - Every stage runs through `execute_step`, which logs the transition and
//!   moves the pipeline into `Failed` on the first error.
//! - The caller owns the single `error!` line for a failed run; stages log at `warn`.
//! - A pipeline runs once; `Done` and `Failed` are terminal.

use std::fs;
use std::path::Path;

use tracing::{info, warn};
use veil_config::{BuildMode, ProtectionOptions};

use crate::assemble::{assemble, ensure_inputs};
use crate::clean::reset_output_dir;
use crate::error::{PipelineError, PipelineResult};
use crate::finish::finish;
use crate::model::{Artifact, BuildReport, ProjectLayout, SourceDocument};
use crate::protect::{Protector, TokenSource};
use crate::report::BuildReporter;
use crate::transform::Transform;

/// Pipeline stages in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// Delete and recreate the output directory.
    Cleaning,
    /// Check inputs exist and the transform is usable.
    Validating,
    /// Merge the fragment into the main module.
    Assembling,
    /// Probe injection and transform.
    Protecting,
    /// Header stamping and artifact write.
    Finishing,
    /// Provenance report.
    Reporting,
}

impl StepKind {
    /// Every stage, in order.
    pub const ALL: [Self; 6] = [
        Self::Cleaning,
        Self::Validating,
        Self::Assembling,
        Self::Protecting,
        Self::Finishing,
        Self::Reporting,
    ];

    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cleaning => "cleaning",
            Self::Validating => "validating",
            Self::Assembling => "assembling",
            Self::Protecting => "protecting",
            Self::Finishing => "finishing",
            Self::Reporting => "reporting",
        }
    }
}

/// Lifecycle of a single pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// Not started.
    Idle,
    /// Inside the given stage.
    Running(StepKind),
    /// Every stage completed.
    Done,
    /// The given stage failed; absorbing.
    Failed(StepKind),
}

impl PipelineState {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running(step) => step.as_str(),
            Self::Done => "done",
            Self::Failed(_) => "failed",
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Written artifact.
    pub artifact: Artifact,
    /// Persisted report.
    pub report: BuildReport,
}

/// Single-pass build pipeline.
#[derive(Debug)]
pub struct BuildPipeline {
    layout: ProjectLayout,
    options: ProtectionOptions,
    mode: BuildMode,
    protector: Protector,
    state: PipelineState,
}

impl BuildPipeline {
    /// Pipeline using random probe tokens.
    #[must_use]
    pub fn new(
        layout: ProjectLayout,
        options: ProtectionOptions,
        mode: BuildMode,
        transform: Box<dyn Transform>,
    ) -> Self {
        Self::with_protector(layout, options, mode, Protector::new(transform))
    }

    /// Pipeline with an explicit probe token generator.
    #[must_use]
    pub fn with_token_source(
        layout: ProjectLayout,
        options: ProtectionOptions,
        mode: BuildMode,
        transform: Box<dyn Transform>,
        tokens: Box<dyn TokenSource>,
    ) -> Self {
        Self::with_protector(
            layout,
            options,
            mode,
            Protector::with_token_source(transform, tokens),
        )
    }

    fn with_protector(
        layout: ProjectLayout,
        options: ProtectionOptions,
        mode: BuildMode,
        protector: Protector,
    ) -> Self {
        Self {
            layout,
            options,
            mode,
            protector,
            state: PipelineState::Idle,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Paths this pipeline reads and writes.
    #[must_use]
    pub const fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Mode the pipeline runs in.
    #[must_use]
    pub const fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Run every stage once.
    ///
    /// # Errors
    ///
    /// Returns the first stage error; the pipeline is left in
    /// [`PipelineState::Failed`]. Calling `execute` on a pipeline that already
    /// ran returns [`PipelineError::InvalidTransition`].
    pub fn execute(&mut self) -> PipelineResult<BuildOutcome> {
        if self.state != PipelineState::Idle {
            return Err(PipelineError::InvalidTransition {
                from: self.state.as_str(),
                to: StepKind::Cleaning.as_str(),
            });
        }
        info!(
            mode = self.mode.as_str(),
            transform = self.protector.transform_name(),
            "build started"
        );

        self.execute_step(StepKind::Cleaning, |pipeline| {
            reset_output_dir(&pipeline.layout.build_dir)
        })?;
        self.execute_step(StepKind::Validating, Self::validate)?;
        let source = self.execute_step(StepKind::Assembling, Self::assemble)?;
        let protected = self.execute_step(StepKind::Protecting, |pipeline| {
            pipeline
                .protector
                .protect(&source, &pipeline.options, pipeline.mode)
        })?;
        let artifact = self.execute_step(StepKind::Finishing, |pipeline| {
            finish(&protected, &pipeline.layout.artifact)
        })?;
        let report = self.execute_step(StepKind::Reporting, |pipeline| {
            BuildReporter::new(&pipeline.layout.report).report(
                &pipeline.layout.merged,
                &artifact.path,
                pipeline.mode,
            )
        })?;

        self.state = PipelineState::Done;
        info!(
            artifact = %artifact.path.display(),
            ratio = %report.compression.ratio,
            "build completed"
        );
        Ok(BuildOutcome { artifact, report })
    }

    fn validate(&mut self) -> PipelineResult<()> {
        ensure_inputs(&self.layout.main_module, &self.layout.fragment)?;
        if !self.mode.is_development() {
            self.protector.preflight()?;
        }
        Ok(())
    }

    fn assemble(&mut self) -> PipelineResult<SourceDocument> {
        let source = assemble(&self.layout.main_module, &self.layout.fragment)?;
        fs::write(&self.layout.merged, source.as_str())
            .map_err(|err| PipelineError::io("write_merged", &self.layout.merged, err))?;
        Ok(source)
    }

    fn execute_step<T, F>(&mut self, step: StepKind, op: F) -> PipelineResult<T>
    where
        F: FnOnce(&mut Self) -> PipelineResult<T>,
    {
        self.state = PipelineState::Running(step);
        info!(step = step.as_str(), "step started");
        match op(self) {
            Ok(value) => {
                info!(step = step.as_str(), "step completed");
                Ok(value)
            }
            Err(err) => {
                self.state = PipelineState::Failed(step);
                warn!(step = step.as_str(), error = %err, "step failed");
                Err(err)
            }
        }
    }
}

/// Standalone transform path: protect and finish one already merged file,
/// then record the size delta at `report`.
///
/// # Errors
///
/// Returns [`PipelineError::MissingInput`] when `input` is absent, and any
/// transform, write or report failure.
pub fn obfuscate_file(
    input: &Path,
    output: &Path,
    report: &Path,
    options: &ProtectionOptions,
    mode: BuildMode,
    protector: &Protector,
) -> PipelineResult<BuildOutcome> {
    if !input.is_file() {
        return Err(PipelineError::MissingInput {
            role: "input file",
            path: input.to_path_buf(),
        });
    }
    let text =
        fs::read_to_string(input).map_err(|err| PipelineError::io("read_input", input, err))?;
    let source = SourceDocument::new(text, false);
    if !mode.is_development() {
        protector.preflight()?;
    }
    let protected = protector.protect(&source, options, mode)?;
    let artifact = finish(&protected, output)?;
    let report = BuildReporter::new(report).report(input, &artifact.path, mode)?;
    info!(
        artifact = %artifact.path.display(),
        transformed = protected.transformed,
        ratio = %report.compression.ratio,
        "standalone obfuscation completed"
    );
    Ok(BuildOutcome { artifact, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::transform::PassthroughTransform;
    use serde_json::{Map, Value};
    use std::error::Error;
    use tempfile::TempDir;

    type TestResult<T> = Result<T, Box<dyn Error>>;

    struct Unavailable;

    impl Transform for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        fn preflight(&self) -> Result<(), BoxError> {
            Err("not installed".into())
        }

        fn transform(
            &self,
            source: &str,
            _options: &Map<String, Value>,
        ) -> Result<String, BoxError> {
            Ok(source.to_string())
        }
    }

    fn project() -> TestResult<(TempDir, ProjectLayout)> {
        let temp = TempDir::new()?;
        let layout = ProjectLayout::conventional(temp.path());
        fs::create_dir_all(temp.path().join("src"))?;
        fs::write(&layout.main_module, "a();\n// SNIPPETS_PLACEHOLDER\n")?;
        fs::write(&layout.fragment, "b();")?;
        Ok((temp, layout))
    }

    #[test]
    fn step_labels_are_stable() {
        let labels: Vec<_> = StepKind::ALL.iter().map(|step| step.as_str()).collect();
        assert_eq!(
            labels,
            ["cleaning", "validating", "assembling", "protecting", "finishing", "reporting"]
        );
        assert_eq!(PipelineState::Failed(StepKind::Cleaning).as_str(), "failed");
        assert!(PipelineState::Done.is_terminal());
        assert!(!PipelineState::Running(StepKind::Reporting).is_terminal());
    }

    #[test]
    fn completed_pipeline_refuses_second_run() -> TestResult<()> {
        let (_temp, layout) = project()?;
        let mut pipeline = BuildPipeline::new(
            layout,
            ProtectionOptions::default(),
            BuildMode::Development,
            Box::new(PassthroughTransform),
        );
        pipeline.execute()?;
        assert_eq!(pipeline.state(), PipelineState::Done);

        let err = pipeline.execute().err();
        assert!(matches!(
            err,
            Some(PipelineError::InvalidTransition { from: "done", to: "cleaning" })
        ));
        Ok(())
    }

    #[test]
    fn preflight_failure_stops_in_validating() -> TestResult<()> {
        let (_temp, layout) = project()?;
        let merged = layout.merged.clone();
        let mut pipeline = BuildPipeline::new(
            layout,
            ProtectionOptions::default(),
            BuildMode::Production,
            Box::new(Unavailable),
        );
        let err = pipeline.execute().err();
        assert!(matches!(err, Some(PipelineError::Transform { .. })));
        assert_eq!(pipeline.state(), PipelineState::Failed(StepKind::Validating));
        assert!(!merged.exists());
        Ok(())
    }

    #[test]
    fn development_skips_preflight() -> TestResult<()> {
        let (_temp, layout) = project()?;
        let mut pipeline = BuildPipeline::new(
            layout,
            ProtectionOptions::default(),
            BuildMode::Development,
            Box::new(Unavailable),
        );
        let outcome = pipeline.execute()?;
        assert_eq!(outcome.report.mode, BuildMode::Development);
        Ok(())
    }

    #[test]
    fn obfuscate_file_requires_input() -> TestResult<()> {
        let temp = TempDir::new()?;
        let protector = Protector::new(Box::new(PassthroughTransform));
        let err = obfuscate_file(
            &temp.path().join("merged.js"),
            &temp.path().join("worker.js"),
            &temp.path().join("build-info.json"),
            &ProtectionOptions::default(),
            BuildMode::Production,
            &protector,
        )
        .err();
        assert!(matches!(
            err,
            Some(PipelineError::MissingInput { role: "input file", .. })
        ));
        Ok(())
    }

    #[test]
    fn obfuscate_file_reports_sizes_of_input_and_artifact() -> TestResult<()> {
        let temp = TempDir::new()?;
        let input = temp.path().join("merged.js");
        let report_path = temp.path().join("out").join("build-info.json");
        fs::write(&input, "merged();")?;
        let protector = Protector::new(Box::new(PassthroughTransform));

        let outcome = obfuscate_file(
            &input,
            &temp.path().join("out").join("worker.js"),
            &report_path,
            &ProtectionOptions::default(),
            BuildMode::Development,
            &protector,
        )?;

        assert_eq!(outcome.report.input.size, 9);
        assert_eq!(outcome.report.output.size, outcome.artifact.bytes);
        assert_eq!(outcome.report.mode, BuildMode::Development);
        let persisted: BuildReport = serde_json::from_str(&fs::read_to_string(&report_path)?)?;
        assert_eq!(persisted, outcome.report);
        Ok(())
    }
}
