//! File-backed configuration store.
//!
//! # Design
//! - One JSON document at a fixed location; every mutation is written back immediately.
//! - `load` degrades to the compiled-in default instead of failing.
//! - `save` and `export_to` are best-effort: failures are logged and reported as `false`.
//! - Writes go through a sibling temp file and a rename so a failed write never
//!   clobbers the current document.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::defaults::{DEFAULT_CONFIG_RELATIVE_PATH, default_config};
use crate::error::{ConfigError, ConfigResult};
use crate::model::BuildConfig;
use crate::validate::validate;

/// Persisted configuration document at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by an explicit document path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the conventional location inside a project root.
    #[must_use]
    pub fn in_project(root: &Path) -> Self {
        Self::new(root.join(DEFAULT_CONFIG_RELATIVE_PATH))
    }

    /// Location of the persisted document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the default document if none exists yet.
    ///
    /// Returns `true` when a new document was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the default document cannot be written.
    pub fn create(&self) -> ConfigResult<bool> {
        if self.path.exists() {
            info!(path = %self.path.display(), "configuration document already exists");
            return Ok(false);
        }
        write_document(&self.path, &default_config())?;
        info!(path = %self.path.display(), "created default configuration document");
        Ok(true)
    }

    /// Load the current document, seeding storage with the default when absent.
    ///
    /// An unreadable or malformed document yields the default in memory; the
    /// stored file is left as it is.
    #[must_use]
    pub fn load(&self) -> BuildConfig {
        if !self.path.exists() {
            let _ = self.save(&default_config());
        }

        match read_document(&self.path) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(
                    error = %err,
                    path = %self.path.display(),
                    "configuration unreadable; using compiled-in defaults"
                );
                default_config()
            }
        }
    }

    /// Persist a document, logging instead of failing.
    pub fn save(&self, doc: &BuildConfig) -> bool {
        match write_document(&self.path, doc) {
            Ok(()) => {
                info!(path = %self.path.display(), "configuration saved");
                true
            }
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "failed to save configuration");
                false
            }
        }
    }

    /// Shallow-merge `partial` over the current document and persist the result.
    ///
    /// Only top-level keys are merged; a nested map in `partial` replaces the
    /// stored one wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged document no longer matches the schema.
    pub fn update(&self, partial: Map<String, Value>) -> ConfigResult<BuildConfig> {
        let current = self.load();
        let mut merged = match serde_json::to_value(&current)
            .map_err(|source| ConfigError::Serialize { source })?
        {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        merged.extend(partial);

        let doc: BuildConfig = serde_json::from_value(Value::Object(merged))
            .map_err(|source| ConfigError::InvalidUpdate { source })?;
        let _ = self.save(&doc);
        Ok(doc)
    }

    /// Persist the compiled-in default document verbatim.
    pub fn reset(&self) -> bool {
        let saved = self.save(&default_config());
        if saved {
            info!(path = %self.path.display(), "configuration reset to defaults");
        }
        saved
    }

    /// Write the current document to an arbitrary location, logging instead of failing.
    pub fn export_to(&self, destination: &Path) -> bool {
        let doc = self.load();
        match write_document(destination, &doc) {
            Ok(()) => {
                info!(path = %destination.display(), "configuration exported");
                true
            }
            Err(err) => {
                warn!(
                    error = %err,
                    path = %destination.display(),
                    "failed to export configuration"
                );
                false
            }
        }
    }

    /// Replace the current document with a validated external one.
    ///
    /// On any failure the persisted document is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed, if required
    /// keys are missing, or if the new document cannot be persisted.
    pub fn import_from(&self, source_path: &Path) -> ConfigResult<BuildConfig> {
        let raw = fs::read_to_string(source_path)
            .map_err(|err| ConfigError::io("read", source_path, err))?;
        let value: Value =
            serde_json::from_str(&raw).map_err(|err| ConfigError::parse(source_path, err))?;
        validate(&value)?;
        let doc: BuildConfig =
            serde_json::from_value(value).map_err(|err| ConfigError::parse(source_path, err))?;

        write_document(&self.path, &doc)?;
        info!(
            source = %source_path.display(),
            path = %self.path.display(),
            "configuration imported"
        );
        Ok(doc)
    }
}

fn read_document(path: &Path) -> ConfigResult<BuildConfig> {
    let raw = fs::read_to_string(path).map_err(|err| ConfigError::io("read", path, err))?;
    serde_json::from_str(&raw).map_err(|err| ConfigError::parse(path, err))
}

fn write_document(path: &Path, doc: &BuildConfig) -> ConfigResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|err| ConfigError::io("create_dir", parent, err))?;
    }

    let rendered =
        serde_json::to_string_pretty(doc).map_err(|source| ConfigError::Serialize { source })?;

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    fs::write(&staging, rendered).map_err(|err| ConfigError::io("write", &staging, err))?;
    fs::rename(&staging, path).map_err(|err| {
        let _ = fs::remove_file(&staging);
        ConfigError::io("rename", path, err)
    })
}
