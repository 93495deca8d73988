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

//! File-backed build configuration for veil.
//!
//! Layout: `model.rs` (typed documents), `defaults.rs` (compiled-in default and
//! required keys), `validate.rs` (import validation), `store.rs` (`ConfigStore`).

pub mod defaults;
pub mod error;
pub mod model;
pub mod store;
pub mod validate;

pub use defaults::{DEFAULT_CONFIG_RELATIVE_PATH, REQUIRED_KEYS, default_config};
pub use error::{ConfigError, ConfigResult};
pub use model::{
    BuildConfig, BuildMode, IdentifierNamesGenerator, ParseBuildModeError, ProtectionOptions,
};
pub use store::ConfigStore;
pub use validate::validate;
