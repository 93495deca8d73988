//! Temporary project fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Marker line the assembler replaces with the fragment text.
pub const MARKER_LINE: &str = "// SNIPPETS_PLACEHOLDER";

/// Throwaway project root laid out like a real veil project.
///
/// The directory is removed when the fixture is dropped.
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    /// Create an empty project root.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("veil-project-")
            .tempdir()
            .context("failed to create temporary project root")?;
        Ok(Self { dir })
    }

    /// Create a project whose `src/` holds the given main module and fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn with_sources(main: &str, fragment: &str) -> Result<Self> {
        let project = Self::new()?;
        project.write("src/main.js", main)?;
        project.write("src/snippets", fragment)?;
        Ok(project)
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path for a project-relative location.
    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a project-relative file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or the file cannot be written.
    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Read a project-relative file as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not valid UTF-8.
    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.path(relative);
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}
