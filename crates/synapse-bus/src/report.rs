//! Per-publish delivery report.

use crate::membrane::MembraneId;
use crate::receptor::ReceptorError;

/// One receptor's captured failure during a publish.
#[derive(Debug)]
pub struct ReceptorFailure {
    /// Name of the failing receptor.
    pub receptor: &'static str,
    /// The error it raised.
    pub error: ReceptorError,
}

/// Outcome of a single `publish` call.
///
/// `publish` never fails on behalf of a receptor: every receptor failure
/// is captured here instead. Zero receptors for the message type is a
/// valid outcome (`delivered == 0`, no failures).
#[derive(Debug)]
pub struct DispatchReport {
    /// Membrane the message was published into.
    pub membrane: MembraneId,
    /// Message type name.
    pub message_type: &'static str,
    /// Receptors that completed successfully.
    pub delivered: usize,
    /// Receptors that failed, in invocation order.
    pub failures: Vec<ReceptorFailure>,
}

impl DispatchReport {
    /// `true` when every resolved receptor completed without error.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total receptors invoked (delivered + failed).
    pub fn invoked(&self) -> usize {
        self.delivered + self.failures.len()
    }
}
