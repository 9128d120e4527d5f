//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading [`crate::config::SynapseConfig`].
///
/// All of these are startup-time failures: configuration problems abort
/// initialization rather than being silently ignored.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`crate::config::SynapseConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    /// A `SYNAPSE_*` environment override has an unusable value.
    #[error("invalid value for {var}: {value}")]
    InvalidEnv {
        /// Environment variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },
}
