//! Argument parsing, dispatch, and the top-level failure boundary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::error;
use veil_config::BuildMode;
use veil_telemetry::{DEFAULT_LOG_LEVEL, LoggingConfig, init_logging, log_format_from_str};

use crate::commands::build::handle_build;
use crate::commands::clean::handle_clean;
use crate::commands::config::{
    handle_config_create, handle_config_export, handle_config_import, handle_config_load,
    handle_config_reset,
};
use crate::commands::deploy::handle_deploy;
use crate::commands::obfuscate::handle_obfuscate;
use crate::context::{AppContext, CliResult};

pub(crate) const DEFAULT_TRANSFORM_BIN: &str = "javascript-obfuscator";
pub(crate) const DEFAULT_DEPLOYER: &str = "wrangler";

/// Parses CLI arguments, executes the requested command, and logs any failure
/// once. Returns the process exit code.
#[must_use]
pub fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: log_format_from_str(cli.log_format.as_deref()),
    };
    let logging_ready = match init_logging(&logging) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("warning: {err}");
            false
        }
    };
    let command = command_label(&cli.command);

    match dispatch(cli) {
        Ok(()) => 0,
        Err(err) => {
            let message = err.display_message();
            if logging_ready {
                error!(command, error = %message, "command failed");
            } else {
                eprintln!("error: {message}");
            }
            err.exit_code()
        }
    }
}

fn dispatch(cli: Cli) -> CliResult<()> {
    let ctx = AppContext::from_cli(&cli);
    let mode = cli.mode.unwrap_or_default();

    match cli.command {
        Command::Build(args) => handle_build(&ctx, &args, mode).map(drop),
        Command::Dev(args) => handle_build(&ctx, &args, BuildMode::Development).map(drop),
        Command::Clean(args) => handle_clean(&ctx, &args),
        Command::Deploy(args) => handle_deploy(&ctx, &args),
        Command::Config(config) => match config {
            ConfigCommand::Create => handle_config_create(&ctx),
            ConfigCommand::Load => handle_config_load(&ctx),
            ConfigCommand::Reset => handle_config_reset(&ctx),
            ConfigCommand::Export(args) => handle_config_export(&ctx, &args.path),
            ConfigCommand::Import(args) => handle_config_import(&ctx, &args.path),
        },
        Command::Obfuscate(args) => handle_obfuscate(&ctx, &args, mode).map(drop),
    }
}

#[derive(Parser)]
#[command(
    name = "veil",
    version,
    about = "Assemble, protect, and stamp a worker script"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "VEIL_PROJECT_ROOT",
        default_value = ".",
        help = "Project root containing src/, build/ and config/"
    )]
    pub(crate) project_root: PathBuf,
    #[arg(
        long,
        global = true,
        env = "VEIL_CONFIG",
        help = "Configuration document (defaults to config/default.json under the root)"
    )]
    pub(crate) config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "VEIL_BUILD_MODE",
        help = "Build mode for build and obfuscate: production or development"
    )]
    pub(crate) mode: Option<BuildMode>,
    #[arg(
        long,
        global = true,
        env = "VEIL_TRANSFORM_BIN",
        default_value = DEFAULT_TRANSFORM_BIN,
        help = "External obfuscator program"
    )]
    pub(crate) transform_bin: String,
    #[arg(
        long = "transform-arg",
        global = true,
        allow_hyphen_values = true,
        help = "Argument placed before the input path when invoking the obfuscator"
    )]
    pub(crate) transform_args: Vec<String>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "VEIL_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(long, global = true, env = "VEIL_LOG_FORMAT")]
    pub(crate) log_format: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the pipeline in the selected mode (production unless overridden).
    Build(LayoutArgs),
    /// Run the pipeline with protection disabled.
    Dev(LayoutArgs),
    /// Delete the build directory.
    Clean(LayoutArgs),
    /// Build for production and hand the artifact to the deployment tool.
    Deploy(DeployArgs),
    /// Manage the configuration document.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Protect and stamp a single already merged file.
    Obfuscate(ObfuscateArgs),
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommand {
    /// Write the default document if none exists.
    Create,
    /// Print the current document.
    Load,
    /// Overwrite the document with the defaults.
    Reset,
    /// Copy the current document to a path.
    Export(ConfigPathArgs),
    /// Validate a document and make it current.
    Import(ConfigPathArgs),
}

#[derive(Args)]
pub(crate) struct ConfigPathArgs {
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct LayoutArgs {
    #[arg(long, help = "Main module (default src/main.js)")]
    pub(crate) main: Option<PathBuf>,
    #[arg(long, help = "Fragment spliced into the main module (default src/snippets)")]
    pub(crate) fragment: Option<PathBuf>,
    #[arg(long, help = "Output directory (default build)")]
    pub(crate) build_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct DeployArgs {
    #[command(flatten)]
    pub(crate) layout: LayoutArgs,
    #[arg(long, env = "VEIL_DEPLOYER", default_value = DEFAULT_DEPLOYER)]
    pub(crate) deployer: String,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ObfuscateArgs {
    #[arg(long, env = "VEIL_INPUT_FILE", help = "Input file (default build/merged.js)")]
    pub(crate) input: Option<PathBuf>,
    #[arg(long, help = "Artifact path (default build/worker.js)")]
    pub(crate) out: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Build(_) => "build",
        Command::Dev(_) => "dev",
        Command::Clean(_) => "clean",
        Command::Deploy(_) => "deploy",
        Command::Config(ConfigCommand::Create) => "config_create",
        Command::Config(ConfigCommand::Load) => "config_load",
        Command::Config(ConfigCommand::Reset) => "config_reset",
        Command::Config(ConfigCommand::Export(_)) => "config_export",
        Command::Config(ConfigCommand::Import(_)) => "config_import",
        Command::Obfuscate(_) => "obfuscate",
    }
}
