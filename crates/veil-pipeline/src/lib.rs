#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Build pipeline turning a main module and a fragment into a protected artifact.
//!
//! Layout: `assemble.rs` (marker substitution), `transform.rs` (opaque transform
//! capability), `protect.rs` (probe injection and mode handling), `finish.rs`
//! (header stamping), `report.rs` (provenance), `clean.rs` (output directory),
//! `service.rs` (`BuildPipeline` orchestrator).

pub mod assemble;
pub mod clean;
pub mod error;
pub mod finish;
pub mod model;
pub mod protect;
pub mod report;
pub mod service;
pub mod transform;

pub use assemble::{SNIPPETS_MARKER, assemble, ensure_inputs, merge_sources};
pub use clean::{remove_output_dir, reset_output_dir};
pub use error::{BoxError, PipelineError, PipelineResult};
pub use finish::{LICENSE_HEADER, finish, stamp};
pub use model::{
    Artifact, BuildReport, Compression, Environment, FileStats, ProjectLayout, ProtectedText,
    SourceDocument,
};
pub use protect::{Protector, RandomTokens, TokenSource, probe_block};
pub use report::BuildReporter;
pub use service::{BuildOutcome, BuildPipeline, PipelineState, StepKind, obfuscate_file};
pub use transform::{CommandTransform, CommandTransformError, PassthroughTransform, Transform};
