//! Bus error types.

use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, BusError>;

/// Errors raised by registration and publish.
///
/// Note the asymmetry required by the dispatch contract: a message type
/// with **zero receptors** is a silent no-op, but a membrane that was
/// never created is a wiring bug and surfaces as
/// [`BusError::UnknownMembrane`].
#[derive(Debug, Error)]
pub enum BusError {
    /// Publish targeted a membrane that was never registered.
    #[error("unknown membrane '{membrane}'")]
    UnknownMembrane {
        /// The membrane name that missed.
        membrane: String,
    },

    /// The same receptor instance was registered twice for one
    /// `(membrane, message type)` pair. Duplicate registration is
    /// rejected (deterministically) rather than double-delivering.
    #[error("receptor '{receptor}' already registered for {message_type} in membrane '{membrane}'")]
    DuplicateReceptor {
        /// Membrane the registration targeted.
        membrane: String,
        /// Message type name.
        message_type: &'static str,
        /// Receptor name.
        receptor: &'static str,
    },
}
