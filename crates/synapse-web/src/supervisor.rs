//! Per-request panic supervision.
//!
//! Each request runs on its own task; the supervisor wraps that task,
//! captures any panic, logs it, and applies the configured
//! [`PanicPolicy`]. The supervisor is constructed at startup and passed
//! to the boundary — there is no ambient process-wide hook.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use metrics::counter;
use synapse_core::PanicPolicy;
use tokio::task::JoinHandle;
use tracing::error;

/// Owns the panic policy for request execution units.
#[derive(Clone, Copy, Debug)]
pub struct Supervisor {
    policy: PanicPolicy,
}

impl Supervisor {
    /// Supervisor with the given policy.
    pub fn new(policy: PanicPolicy) -> Self {
        Self { policy }
    }

    /// Run one request's work on its own task, capturing panics.
    ///
    /// The returned handle completes normally even when the work panicked
    /// (under [`PanicPolicy::Degrade`]); [`PanicPolicy::Abort`] terminates
    /// the process after logging.
    pub fn spawn_request<F>(&self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let policy = self.policy;
        tokio::spawn(async move {
            if let Err(payload) = AssertUnwindSafe(fut).catch_unwind().await {
                counter!("supervisor_request_panics_total").increment(1);
                error!(reason = panic_reason(payload.as_ref()), "request task panicked");
                if policy == PanicPolicy::Abort {
                    error!("panic policy is abort; terminating process");
                    std::process::abort();
                }
            }
        })
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[tokio::test]
    async fn completed_work_runs_to_the_end() {
        let supervisor = Supervisor::new(PanicPolicy::Degrade);
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        supervisor
            .spawn_request(async move {
                flag.store(true, Ordering::SeqCst);
            })
            .await
            .unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn a_panic_under_degrade_does_not_poison_the_runtime() {
        let supervisor = Supervisor::new(PanicPolicy::Degrade);
        supervisor
            .spawn_request(async {
                panic!("receptor bug");
            })
            .await
            .unwrap();

        // The runtime keeps serving subsequent requests.
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        supervisor
            .spawn_request(async move {
                flag.store(true, Ordering::SeqCst);
            })
            .await
            .unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }
}
