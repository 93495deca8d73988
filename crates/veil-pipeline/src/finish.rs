//! Artifact finishing: stamp the license header and write the artifact.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::model::{Artifact, ProtectedText};

/// Fixed header stamped at the top of every artifact.
pub const LICENSE_HEADER: &str = "/*
 * Cloudflare Workers Proxy Service
 * Version: 1.0.0
 * License: MIT
 * Author: Joey
 * Repository: https://github.com/byJoey/cfnew
 */
";

/// Prepend [`LICENSE_HEADER`] to `text`.
#[must_use]
pub fn stamp(text: &str) -> String {
    let mut out = String::with_capacity(LICENSE_HEADER.len() + text.len());
    out.push_str(LICENSE_HEADER);
    out.push_str(text);
    out
}

/// Write the stamped artifact to `destination`, replacing any previous one.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] when the parent directory cannot be created
/// or the artifact cannot be written.
pub fn finish(protected: &ProtectedText, destination: &Path) -> PipelineResult<Artifact> {
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|err| PipelineError::io("create_artifact_dir", parent, err))?;
    }

    let contents = stamp(&protected.text);
    fs::write(destination, &contents)
        .map_err(|err| PipelineError::io("write_artifact", destination, err))?;

    let artifact = Artifact {
        path: destination.to_path_buf(),
        bytes: contents.len() as u64,
    };
    info!(
        path = %artifact.path.display(),
        bytes = artifact.bytes,
        transformed = protected.transformed,
        "artifact written"
    );
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tempfile::TempDir;

    type TestResult<T> = Result<T, Box<dyn Error>>;

    #[test]
    fn stamp_starts_with_header_even_for_empty_text() {
        assert_eq!(stamp(""), LICENSE_HEADER);
        assert!(stamp("x();").starts_with(LICENSE_HEADER));
    }

    #[test]
    fn finish_creates_parent_and_overwrites() -> TestResult<()> {
        let temp = TempDir::new()?;
        let destination = temp.path().join("nested/out/worker.js");

        finish(&ProtectedText::passthrough("first();".into()), &destination)?;
        let artifact = finish(&ProtectedText::passthrough("second();".into()), &destination)?;

        let written = fs::read_to_string(&destination)?;
        assert_eq!(written, format!("{LICENSE_HEADER}second();"));
        assert_eq!(artifact.bytes, written.len() as u64);
        Ok(())
    }
}
