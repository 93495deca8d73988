//! Output directory housekeeping.

use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::error::{PipelineError, PipelineResult};

/// Delete `dir` and everything below it.
///
/// Returns whether the directory existed.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] when removal fails for any reason other than absence.
pub fn remove_output_dir(dir: &Path) -> PipelineResult<bool> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            info!(path = %dir.display(), "removed output directory");
            Ok(true)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(PipelineError::io("remove_output_dir", dir, err)),
    }
}

/// Delete and recreate `dir`, leaving it empty.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] when removal or creation fails.
pub fn reset_output_dir(dir: &Path) -> PipelineResult<()> {
    remove_output_dir(dir)?;
    fs::create_dir_all(dir).map_err(|err| PipelineError::io("create_output_dir", dir, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tempfile::TempDir;

    #[test]
    fn reset_empties_existing_directory() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let build = temp.path().join("build");
        fs::create_dir_all(build.join("stale"))?;
        fs::write(build.join("worker.js"), "old")?;

        reset_output_dir(&build)?;
        assert!(build.is_dir());
        assert_eq!(fs::read_dir(&build)?.count(), 0);
        Ok(())
    }

    #[test]
    fn remove_reports_absence() -> Result<(), Box<dyn Error>> {
        let temp = TempDir::new()?;
        let build = temp.path().join("build");
        assert!(!remove_output_dir(&build)?);
        fs::create_dir_all(&build)?;
        assert!(remove_output_dir(&build)?);
        assert!(!build.exists());
        Ok(())
    }
}
