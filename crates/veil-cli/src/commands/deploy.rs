use std::process::Command;

use anyhow::{Context, anyhow};
use tracing::info;
use veil_config::BuildMode;

use crate::cli::DeployArgs;
use crate::commands::build::handle_build;
use crate::context::{AppContext, CliError, CliResult};

pub(crate) fn handle_deploy(ctx: &AppContext, args: &DeployArgs) -> CliResult<()> {
    let outcome = handle_build(ctx, &args.layout, BuildMode::Production)?;

    probe_deployer(&args.deployer)?;
    info!(
        deployer = %args.deployer,
        artifact = %outcome.artifact.path.display(),
        "handing artifact to deployment tool"
    );
    let status = Command::new(&args.deployer)
        .arg("deploy")
        .current_dir(&ctx.root)
        .status()
        .with_context(|| format!("failed to run {} deploy", args.deployer))
        .map_err(CliError::failure)?;

    if status.success() {
        println!("Deployment finished.");
        Ok(())
    } else {
        Err(CliError::failure(anyhow!(
            "{} deploy exited with {status}",
            args.deployer
        )))
    }
}

fn probe_deployer(deployer: &str) -> CliResult<()> {
    let output = Command::new(deployer)
        .arg("--version")
        .output()
        .with_context(|| format!("deployment tool '{deployer}' is not available"))
        .map_err(CliError::failure)?;
    if output.status.success() {
        info!(
            deployer,
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "deployment tool available"
        );
        Ok(())
    } else {
        Err(CliError::failure(anyhow!(
            "deployment tool '{deployer}' failed its version check ({})",
            output.status
        )))
    }
}
