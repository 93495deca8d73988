use veil_pipeline::remove_output_dir;

use crate::cli::LayoutArgs;
use crate::context::{AppContext, CliResult};

pub(crate) fn handle_clean(ctx: &AppContext, args: &LayoutArgs) -> CliResult<()> {
    let build_dir = ctx.layout(args).build_dir;
    if remove_output_dir(&build_dir)? {
        println!("Removed {}.", build_dir.display());
    } else {
        println!("Nothing to clean at {}.", build_dir.display());
    }
    Ok(())
}
