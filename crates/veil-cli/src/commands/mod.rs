//! Command handlers grouped by concern.

pub(crate) mod build;
pub(crate) mod clean;
pub(crate) mod config;
pub(crate) mod deploy;
pub(crate) mod obfuscate;
