//! Source assembly: splice the fragment into the main module.
//!
//! # Design
//! - Both inputs are checked for existence before either is read.
//! - Exactly one substitution of [`SNIPPETS_MARKER`], first occurrence only.
//! - A missing marker leaves the main module unchanged and is logged, not failed.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::model::SourceDocument;

/// Literal placeholder replaced by the fragment's full text.
pub const SNIPPETS_MARKER: &str = "// SNIPPETS_PLACEHOLDER";

/// Fail with [`PipelineError::MissingInput`] unless both inputs exist.
///
/// # Errors
///
/// Returns an error naming the first absent input.
pub fn ensure_inputs(main_module: &Path, fragment: &Path) -> PipelineResult<()> {
    for (role, path) in [("main module", main_module), ("fragment", fragment)] {
        if !path.is_file() {
            return Err(PipelineError::MissingInput {
                role,
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Read both inputs and merge them into one source document.
///
/// # Errors
///
/// Returns [`PipelineError::MissingInput`] when either file is absent and
/// [`PipelineError::Io`] when a read fails.
pub fn assemble(main_module: &Path, fragment: &Path) -> PipelineResult<SourceDocument> {
    ensure_inputs(main_module, fragment)?;

    let main_text = fs::read_to_string(main_module)
        .map_err(|err| PipelineError::io("read_main_module", main_module, err))?;
    let fragment_text = fs::read_to_string(fragment)
        .map_err(|err| PipelineError::io("read_fragment", fragment, err))?;

    let document = merge_sources(&main_text, &fragment_text);
    if !document.marker_replaced() {
        warn!(
            marker = SNIPPETS_MARKER,
            path = %main_module.display(),
            "marker not found in main module; fragment was not merged"
        );
    }
    debug!(bytes = document.len(), "assembled source");
    Ok(document)
}

/// Replace the first marker occurrence in `main_text` with `fragment_text`.
///
/// Markers inside the fragment are left unexpanded.
#[must_use]
pub fn merge_sources(main_text: &str, fragment_text: &str) -> SourceDocument {
    if main_text.contains(SNIPPETS_MARKER) {
        SourceDocument::new(main_text.replacen(SNIPPETS_MARKER, fragment_text, 1), true)
    } else {
        SourceDocument::new(main_text.to_string(), false)
    }
}
