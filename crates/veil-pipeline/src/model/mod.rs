//! Domain models for the build pipeline.
//!
//! # Design
//! - Keep stage inputs and outputs as plain owned values passed stage to stage.
//! - Report types serialize to the `build-info.json` schema.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use veil_config::BuildMode;

/// Conventional source directory under the project root.
pub const SRC_DIR: &str = "src";
/// Conventional main module file name.
pub const MAIN_MODULE: &str = "main.js";
/// Conventional fragment file name.
pub const FRAGMENT: &str = "snippets";
/// Conventional build output directory under the project root.
pub const BUILD_DIR: &str = "build";
/// Final artifact file name inside the build directory.
pub const ARTIFACT: &str = "worker.js";
/// Merged intermediate source file name inside the build directory.
pub const MERGED: &str = "merged.js";
/// Build report file name inside the build directory.
pub const REPORT: &str = "build-info.json";

/// Locations of every pipeline input and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Main module containing the marker.
    pub main_module: PathBuf,
    /// Fragment spliced in place of the marker.
    pub fragment: PathBuf,
    /// Output directory wiped at the start of every run.
    pub build_dir: PathBuf,
    /// Merged intermediate source.
    pub merged: PathBuf,
    /// Final artifact.
    pub artifact: PathBuf,
    /// Build report.
    pub report: PathBuf,
}

impl ProjectLayout {
    /// Conventional layout rooted at `root`.
    #[must_use]
    pub fn conventional(root: &Path) -> Self {
        let src = root.join(SRC_DIR);
        Self::with_build_dir(src.join(MAIN_MODULE), src.join(FRAGMENT), root.join(BUILD_DIR))
    }

    /// Layout with explicit inputs; outputs use conventional names inside `build_dir`.
    #[must_use]
    pub fn with_build_dir(main_module: PathBuf, fragment: PathBuf, build_dir: PathBuf) -> Self {
        Self {
            main_module,
            fragment,
            merged: build_dir.join(MERGED),
            artifact: build_dir.join(ARTIFACT),
            report: build_dir.join(REPORT),
            build_dir,
        }
    }
}

/// Merged plaintext produced by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    text: String,
    marker_replaced: bool,
}

impl SourceDocument {
    /// Wrap already merged text.
    #[must_use]
    pub const fn new(text: String, marker_replaced: bool) -> Self {
        Self {
            text,
            marker_replaced,
        }
    }

    /// Merged text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the marker was found and substituted.
    #[must_use]
    pub const fn marker_replaced(&self) -> bool {
        self.marker_replaced
    }

    /// Length of the merged text in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the merged text is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Output of the protector: transformed text or the untouched source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedText {
    /// Text handed to the finisher.
    pub text: String,
    /// Whether the transform ran.
    pub transformed: bool,
    /// Whether the anti-debug probe was prepended before transforming.
    pub probe_injected: bool,
}

impl ProtectedText {
    /// Source passed through without transformation.
    #[must_use]
    pub const fn passthrough(text: String) -> Self {
        Self {
            text,
            transformed: false,
            probe_injected: false,
        }
    }
}

/// Final on-disk artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Artifact location.
    pub path: PathBuf,
    /// Bytes written, header included.
    pub bytes: u64,
}

/// Size and modification time of a file the reporter measured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    /// File location.
    pub file: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    #[serde(with = "rfc3339_millis")]
    pub last_modified: DateTime<Utc>,
}

/// Size delta between the merged input and the final artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compression {
    /// `(1 - output/input) * 100` with two decimals and a trailing `%`.
    pub ratio: String,
    /// `input - output`; negative when the artifact grew.
    pub saved_bytes: i64,
}

/// Descriptors of the environment that produced the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Version of the tool that ran the build.
    pub runtime_version: String,
    /// Operating system name.
    pub platform: String,
    /// CPU architecture.
    pub arch: String,
}

/// Provenance record written once per pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    /// When the report was produced.
    #[serde(with = "rfc3339_millis")]
    pub timestamp: DateTime<Utc>,
    /// Mode the build ran in.
    pub mode: BuildMode,
    /// Merged input statistics.
    pub input: FileStats,
    /// Artifact statistics.
    pub output: FileStats,
    /// Size delta.
    pub compression: Compression,
    /// Build environment.
    pub environment: Environment,
}

mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub(super) fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}
