//! Configuration with layered sources.
//!
//! Settings are resolved from three layers (in priority order):
//! 1. **Compiled defaults** — [`SynapseConfig::default()`]
//! 2. **JSON file** — optional, deserialised over the defaults
//!    (`#[serde(default)]` fills anything the file omits)
//! 3. **Environment variables** — `SYNAPSE_*` overrides (highest priority)
//!
//! Configuration problems are startup-fatal ([`ConfigError`]); a running
//! system never observes a half-applied config.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, Result};

/// Env var overriding [`SessionConfig::inactivity_timeout_secs`].
pub const ENV_SESSION_TIMEOUT: &str = "SYNAPSE_SESSION_TIMEOUT_SECS";
/// Env var overriding [`SupervisorConfig::panic_policy`].
pub const ENV_PANIC_POLICY: &str = "SYNAPSE_PANIC_POLICY";

/// Top-level configuration for the bus and router.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynapseConfig {
    /// Session state machine settings.
    pub session: SessionConfig,
    /// Dispatch engine settings.
    pub dispatch: DispatchConfig,
    /// Request supervisor settings.
    pub supervisor: SupervisorConfig,
}

/// Session state machine settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Inactivity window after which an Authenticated session expires.
    pub inactivity_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_secs: 30 * 60,
        }
    }
}

impl SessionConfig {
    /// Timeout as a [`Duration`].
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }
}

/// Dispatch engine settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DispatchConfig {
    /// When `true`, a receptor failure halts the remaining receptors for
    /// the same message. Default is fan-out with failure isolation.
    pub halt_on_failure: bool,
}

/// Request supervisor settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupervisorConfig {
    /// What the supervisor does after capturing a request panic.
    pub panic_policy: PanicPolicy,
}

/// Per-deployment policy for a panic captured by the supervisor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanicPolicy {
    /// Log the panic and keep serving other requests.
    #[default]
    Degrade,
    /// Log the panic and terminate the process.
    Abort,
}

/// Load configuration: defaults, then `path` (if given), then env.
pub fn load_config(path: Option<&Path>) -> Result<SynapseConfig> {
    let mut config = match path {
        Some(p) => read_config_file(p)?,
        None => SynapseConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<SynapseConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(config: &mut SynapseConfig) -> Result<()> {
    if let Ok(value) = env::var(ENV_SESSION_TIMEOUT) {
        config.session.inactivity_timeout_secs =
            value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_SESSION_TIMEOUT,
                value: value.clone(),
            })?;
        tracing::debug!(
            timeout_secs = config.session.inactivity_timeout_secs,
            "session timeout overridden from env"
        );
    }
    if let Ok(value) = env::var(ENV_PANIC_POLICY) {
        config.supervisor.panic_policy = match value.to_ascii_lowercase().as_str() {
            "degrade" => PanicPolicy::Degrade,
            "abort" => PanicPolicy::Abort,
            _ => {
                return Err(ConfigError::InvalidEnv {
                    var: ENV_PANIC_POLICY,
                    value,
                });
            }
        };
    }
    Ok(())
}
