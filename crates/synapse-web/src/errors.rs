//! Router error types.

use thiserror::Error;

/// Startup-time route configuration errors.
///
/// These abort initialization; a running route table is never observed
/// with a duplicate key or a malformed mask.
#[derive(Debug, Error)]
pub enum RouteConfigError {
    /// A `(verb, path)` key was registered twice.
    #[error("duplicate route {verb}:{path}")]
    DuplicateRoute {
        /// Normalised verb.
        verb: String,
        /// Route path.
        path: String,
    },

    /// A role-gated route was registered with a zero role mask, which
    /// could never authorize anyone.
    #[error("role-gated route {verb}:{path} has an empty role mask")]
    EmptyRoleMask {
        /// Normalised verb.
        verb: String,
        /// Route path.
        path: String,
    },
}

/// Per-request binding failure.
///
/// Binding is tolerant: missing or unknown fields never fail. The only
/// failing path is a structured payload that does not parse, which the
/// router converts into a `MalformedRequest` response message (distinct
/// from the access-denial signals).
#[derive(Debug, Error)]
pub enum BindError {
    /// The body looked like JSON but did not parse into the target type.
    #[error("malformed structured payload: {error}")]
    MalformedJson {
        /// Parser diagnostic.
        error: String,
    },
}
