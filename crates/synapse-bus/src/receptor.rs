//! The [`Receptor`] trait and its type-erased adapter.
//!
//! Receptors are registered generically (`register::<M>(...)`), which
//! monomorphises a downcasting adapter at registration time. Dispatch
//! itself only ever sees [`ErasedReceptor`] values keyed by `TypeId` —
//! there is no runtime type introspection on the hot path.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use synapse_core::SemanticMessage;
use thiserror::Error;

use crate::bus::SemanticBus;
use crate::membrane::MembraneId;

/// A failure raised by one receptor while processing a message.
///
/// Captured into the publish's [`crate::DispatchReport`]; never propagated
/// as a publish error and never allowed to halt sibling receptors unless
/// the bus was built with `halt_on_failure`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ReceptorError {
    message: String,
}

impl ReceptorError {
    /// Build a failure with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for ReceptorError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ReceptorError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A processing capability for messages of type `M` within a membrane.
///
/// Receptors for one message are invoked sequentially in registration
/// order; a receptor may rely on earlier receptors having already run.
/// The bus reference allows a receptor to publish follow-up messages.
#[async_trait]
pub trait Receptor<M: SemanticMessage>: Send + Sync {
    /// Process one message.
    async fn process(
        &self,
        bus: &SemanticBus,
        membrane: &MembraneId,
        message: &M,
    ) -> std::result::Result<(), ReceptorError>;

    /// Name used in reports and logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

type ErasedCall = Box<
    dyn for<'a> Fn(
            &'a SemanticBus,
            &'a MembraneId,
            &'a dyn SemanticMessage,
        ) -> BoxFuture<'a, std::result::Result<(), ReceptorError>>
        + Send
        + Sync,
>;

/// A registered receptor with its type parameter erased.
pub(crate) struct ErasedReceptor {
    /// Receptor name for reports.
    pub(crate) name: &'static str,
    /// Arc pointer identity of the registered instance, used to reject
    /// duplicate registration deterministically.
    pub(crate) identity: usize,
    call: ErasedCall,
}

impl ErasedReceptor {
    /// Wrap a typed receptor in a downcasting adapter.
    pub(crate) fn new<M: SemanticMessage>(receptor: Arc<dyn Receptor<M>>) -> Self {
        let name = receptor.name();
        let identity = Arc::as_ptr(&receptor).cast::<()>() as usize;
        let call: ErasedCall = Box::new(move |bus, membrane, message| {
            let receptor = Arc::clone(&receptor);
            Box::pin(async move {
                // The registry keys on TypeId, so the downcast cannot miss.
                match message.as_any().downcast_ref::<M>() {
                    Some(typed) => receptor.process(bus, membrane, typed).await,
                    None => Err(ReceptorError::new("dispatched message type mismatch")),
                }
            })
        });
        Self {
            name,
            identity,
            call,
        }
    }

    /// Invoke the receptor.
    pub(crate) async fn invoke(
        &self,
        bus: &SemanticBus,
        membrane: &MembraneId,
        message: &dyn SemanticMessage,
    ) -> std::result::Result<(), ReceptorError> {
        (self.call)(bus, membrane, message).await
    }
}
