//! Tracing bootstrap.
//!
//! Log filtering is controlled by the `SYNAPSE_LOG` env var using the
//! standard `tracing-subscriber` directive syntax, e.g.
//! `SYNAPSE_LOG=synapse_bus=debug,info`.

use tracing_subscriber::EnvFilter;

/// Env var holding the tracing filter directives.
pub const ENV_LOG_FILTER: &str = "SYNAPSE_LOG";

/// Install the global tracing subscriber.
///
/// Defaults to `info` when `SYNAPSE_LOG` is unset. Safe to call more than
/// once; subsequent calls are no-ops (useful in tests).
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(ENV_LOG_FILTER)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
