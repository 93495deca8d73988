//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers persisted by the config store and consumed by the pipeline.
//! - Keys the models do not name are kept in ordered `extra` maps so a document
//!   survives a load/save cycle without losing fields.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::{default_config, default_protection_options};

/// Build mode selecting whether the protection transform runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Protected build: probe injection and the transform are applied.
    #[default]
    Production,
    /// Readable build: the source passes through untouched.
    Development,
}

impl BuildMode {
    #[must_use]
    /// Render the mode as its lowercase string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }

    /// Whether the readable escape hatch is engaged.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a build mode string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid build mode '{0}' (expected 'production' or 'development')")]
pub struct ParseBuildModeError(pub String);

impl FromStr for BuildMode {
    type Err = ParseBuildModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(ParseBuildModeError(other.to_string())),
        }
    }
}

/// Naming scheme the transform uses for renamed identifiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierNamesGenerator {
    /// `_0xabc123` style names.
    Hexadecimal,
    /// Short mangled names (`a`, `b`, ...).
    Mangled,
    /// Mangled names in shuffled order.
    MangledShuffled,
    /// Names drawn from a caller supplied dictionary.
    Dictionary,
}

/// Toggles and thresholds forwarded to the protection transform.
///
/// Every switch is optional: a key absent from the stored map stays absent
/// and is left to the transform's own default. Thresholds are conventionally
/// within `[0, 1]`; they are passed through as stored and never clamped here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionOptions {
    /// Emit output on a single line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compact: Option<bool>,
    /// Flatten control flow into dispatcher loops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_flow_flattening: Option<bool>,
    /// Share of nodes affected by control-flow flattening.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_flow_flattening_threshold: Option<f64>,
    /// Inject unreachable code blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_code_injection: Option<bool>,
    /// Share of nodes affected by dead-code injection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_code_injection_threshold: Option<f64>,
    /// Insert the transform's own debugger traps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_protection: Option<bool>,
    /// Interval in milliseconds between debugger traps; `0` disables the timer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_protection_interval: Option<u64>,
    /// Move string literals into an encoded array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_array: Option<bool>,
    /// Share of string literals moved into the array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_array_threshold: Option<f64>,
    /// Encodings applied to the string array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_array_encoding: Option<Vec<String>>,
    /// Rotate the string array by a random offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_string_array: Option<bool>,
    /// Split string literals into chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_strings: Option<bool>,
    /// Chunk length used when splitting strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_strings_chunk_length: Option<u32>,
    /// Escape every string character as a unicode sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unicode_escape_sequence: Option<bool>,
    /// Rename global identifiers as well as locals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_globals: Option<bool>,
    /// Identifier naming scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_names_generator: Option<IdentifierNamesGenerator>,
    /// Prefix prepended to every generated identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifiers_prefix: Option<String>,
    /// Simplify the emitted code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplify: Option<bool>,
    /// Shuffle the string array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_string_array: Option<bool>,
    /// Make the output resist reformatting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_defending: Option<bool>,
    /// Rewrite object literal keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_object_keys: Option<bool>,
    /// Replace numeric literals with expressions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbers_to_expressions: Option<bool>,
    /// Transform options this model does not name, forwarded untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The compiled-in switches seeded into a fresh configuration document.
impl Default for ProtectionOptions {
    fn default() -> Self {
        default_protection_options()
    }
}

impl ProtectionOptions {
    /// Options with the development-mode overrides applied.
    ///
    /// Development builds never carry debugger traps or self-defending code,
    /// whatever the stored document says.
    #[must_use]
    pub fn resolve(&self, mode: BuildMode) -> Self {
        let mut resolved = self.clone();
        if mode.is_development() {
            resolved.debug_protection = Some(false);
            resolved.debug_protection_interval = Some(0);
            resolved.self_defending = Some(false);
        }
        resolved
    }

    /// Whether the anti-debug probe should be prepended before transforming.
    ///
    /// An absent toggle counts as off.
    #[must_use]
    pub const fn wants_probe(&self) -> bool {
        matches!(self.debug_protection, Some(true)) || matches!(self.self_defending, Some(true))
    }

    /// Flatten the options into the JSON object handed to the transform.
    #[must_use]
    pub fn to_options_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Persisted build configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfig {
    /// Token the deployed service authenticates with.
    pub auth_token: String,
    /// Fallback upstream addresses.
    pub fallback_address: Vec<String>,
    /// Port used with the fallback addresses.
    pub fallback_port: u16,
    /// Region code to display name.
    pub region_mapping: BTreeMap<String, String>,
    /// Backup IP addresses.
    #[serde(rename = "backupIPs")]
    pub backup_ips: Vec<String>,
    /// Domains that bypass the proxy.
    pub direct_domains: Vec<String>,
    /// Error code to user facing message.
    pub errors: BTreeMap<String, String>,
    /// Options forwarded to the protection transform.
    pub obfuscation: ProtectionOptions,
    /// Top-level keys this model does not name.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        default_config()
    }
}
