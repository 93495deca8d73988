use std::path::Path;

use veil_config::BuildMode;
use veil_pipeline::model::REPORT;
use veil_pipeline::{BuildOutcome, Protector, obfuscate_file};

use crate::cli::ObfuscateArgs;
use crate::context::{AppContext, CliResult};
use crate::output::render_build_summary;

const DEFAULT_INPUT: &str = "build/merged.js";
const DEFAULT_OUTPUT: &str = "build/worker.js";

pub(crate) fn handle_obfuscate(
    ctx: &AppContext,
    args: &ObfuscateArgs,
    mode: BuildMode,
) -> CliResult<BuildOutcome> {
    let input = ctx.resolve(args.input.as_deref().unwrap_or(Path::new(DEFAULT_INPUT)));
    let output = ctx.resolve(args.out.as_deref().unwrap_or(Path::new(DEFAULT_OUTPUT)));
    let report = output.with_file_name(REPORT);
    let config = ctx.store.load();
    let protector = Protector::new(ctx.transform());

    let outcome = obfuscate_file(
        &input,
        &output,
        &report,
        &config.obfuscation,
        mode,
        &protector,
    )?;
    render_build_summary(&outcome, ctx.output)?;
    Ok(outcome)
}
