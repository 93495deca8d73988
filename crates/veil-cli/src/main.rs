#![forbid(unsafe_code)]

//! Binary entrypoint for the veil build CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    let code = veil_cli::run();
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
