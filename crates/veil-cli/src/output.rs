//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use serde::Serialize;
use veil_pipeline::BuildOutcome;

use crate::cli::OutputFormat;
use crate::context::{CliError, CliResult};

pub(crate) fn render_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_build_summary(outcome: &BuildOutcome, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(&outcome.report)?,
        OutputFormat::Text => {
            for line in summary_lines(outcome) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

pub(crate) fn summary_lines(outcome: &BuildOutcome) -> Vec<String> {
    let report = &outcome.report;
    vec![
        format!("artifact: {}", outcome.artifact.path.display()),
        format!("mode: {}", report.mode),
        format!("original size: {}", format_bytes(report.input.size)),
        format!("output size: {}", format_bytes(report.output.size)),
        format!(
            "compression: {} ({} bytes saved)",
            report.compression.ratio, report.compression.saved_bytes
        ),
    ]
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
