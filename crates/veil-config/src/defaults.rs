//! Compiled-in default configuration document.
//!
//! # Design
//! - The default is built once and never mutated; callers always receive a clone.
//! - Keep the required key list next to the defaults so validation and seeding agree.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::model::{BuildConfig, IdentifierNamesGenerator, ProtectionOptions};

/// Location of the persisted document relative to the project root.
pub const DEFAULT_CONFIG_RELATIVE_PATH: &str = "config/default.json";

/// Top-level keys an imported document must carry with a non-empty value.
pub const REQUIRED_KEYS: [&str; 3] = ["authToken", "fallbackAddress", "regionMapping"];

static DEFAULT_CONFIG: Lazy<BuildConfig> = Lazy::new(build_default_config);

/// Clone of the compiled-in default document.
#[must_use]
pub fn default_config() -> BuildConfig {
    DEFAULT_CONFIG.clone()
}

pub(crate) fn default_protection_options() -> ProtectionOptions {
    ProtectionOptions {
        compact: Some(true),
        control_flow_flattening: Some(true),
        control_flow_flattening_threshold: Some(0.1),
        dead_code_injection: Some(true),
        dead_code_injection_threshold: Some(0.4),
        debug_protection: Some(true),
        debug_protection_interval: Some(4000),
        string_array: Some(true),
        string_array_threshold: Some(0.75),
        string_array_encoding: Some(vec!["base64".to_string()]),
        rotate_string_array: Some(true),
        split_strings: Some(true),
        split_strings_chunk_length: Some(10),
        unicode_escape_sequence: Some(false),
        rename_globals: Some(false),
        identifier_names_generator: Some(IdentifierNamesGenerator::Hexadecimal),
        identifiers_prefix: Some(String::new()),
        simplify: Some(true),
        shuffle_string_array: Some(true),
        self_defending: Some(true),
        transform_object_keys: Some(true),
        numbers_to_expressions: Some(true),
        extra: BTreeMap::new(),
    }
}

fn build_default_config() -> BuildConfig {
    BuildConfig {
        auth_token: String::new(),
        fallback_address: strings(&["proxyip1.com", "proxyip2.com"]),
        fallback_port: 80,
        region_mapping: pairs(&[
            ("HK", "Hong Kong"),
            ("SG", "Singapore"),
            ("JP", "Japan"),
            ("US", "United States"),
            ("KR", "South Korea"),
            ("DE", "Germany"),
            ("UK", "United Kingdom"),
            ("FR", "France"),
            ("CA", "Canada"),
            ("AU", "Australia"),
            ("IN", "India"),
            ("BR", "Brazil"),
            ("NL", "Netherlands"),
            ("RU", "Russia"),
        ]),
        backup_ips: strings(&["1.1.1.1", "8.8.8.8", "9.9.9.9"]),
        direct_domains: strings(&["cloudflare.com", "workers.dev"]),
        errors: pairs(&[
            ("E_INVALID_DATA", "Invalid data"),
            ("E_AUTH_FAILED", "Authentication failed"),
            ("E_CONNECTION_FAILED", "Connection failed"),
            ("E_TIMEOUT", "Request timed out"),
            ("E_RATE_LIMIT", "Rate limit exceeded"),
        ]),
        obfuscation: default_protection_options(),
        extra: BTreeMap::new(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn pairs(values: &[(&str, &str)]) -> BTreeMap<String, String> {
    values
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}
