use tracing::info;
use veil_config::BuildMode;
use veil_pipeline::{BuildOutcome, BuildPipeline};

use crate::cli::LayoutArgs;
use crate::context::{AppContext, CliResult};
use crate::output::render_build_summary;

pub(crate) fn handle_build(
    ctx: &AppContext,
    args: &LayoutArgs,
    mode: BuildMode,
) -> CliResult<BuildOutcome> {
    let outcome = run_pipeline(ctx, args, mode)?;
    render_build_summary(&outcome, ctx.output)?;
    Ok(outcome)
}

pub(crate) fn run_pipeline(
    ctx: &AppContext,
    args: &LayoutArgs,
    mode: BuildMode,
) -> CliResult<BuildOutcome> {
    let config = ctx.store.load();
    info!(config = %ctx.store.path().display(), "loaded configuration");

    let mut pipeline = BuildPipeline::new(
        ctx.layout(args),
        config.obfuscation,
        mode,
        ctx.transform(),
    );
    Ok(pipeline.execute()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CliError, test_support};
    use veil_pipeline::LICENSE_HEADER;
    use veil_test_support::fixtures::{MARKER_LINE, TempProject};

    type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

    fn project() -> TestResult<TempProject> {
        Ok(TempProject::with_sources(
            &format!("start();\n{MARKER_LINE}\n"),
            "helper();",
        )?)
    }

    #[test]
    fn dev_build_seeds_config_and_writes_outputs() -> TestResult<()> {
        let project = project()?;
        let ctx = test_support::context(project.root());

        let outcome = handle_build(&ctx, &LayoutArgs::default(), BuildMode::Development)
            .map_err(|err| err.display_message())?;

        assert!(project.path("config/default.json").is_file());
        assert_eq!(
            project.read("build/worker.js")?,
            format!("{LICENSE_HEADER}start();\nhelper();\n")
        );
        assert_eq!(outcome.report.mode, BuildMode::Development);
        Ok(())
    }

    #[test]
    fn production_build_fails_without_transform() -> TestResult<()> {
        let project = project()?;
        let ctx = test_support::context(project.root());

        let err = handle_build(&ctx, &LayoutArgs::default(), BuildMode::Production).err();

        let Some(CliError::Failure(error)) = err else {
            return Err("expected operational failure".into());
        };
        assert!(format!("{error:#}").contains("veil-missing-transform"));
        assert!(!project.path("build/worker.js").exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn production_build_runs_external_transform() -> TestResult<()> {
        let project = project()?;
        let ctx = test_support::copying_context(project.root());

        handle_build(&ctx, &LayoutArgs::default(), BuildMode::Production)
            .map_err(|err| err.display_message())?;

        let artifact = project.read("build/worker.js")?;
        assert!(artifact.starts_with(LICENSE_HEADER));
        assert!(artifact.contains("_0x"));
        assert!(artifact.ends_with("start();\nhelper();\n"));
        Ok(())
    }
}
