//! # synapse-bus
//!
//! Membrane-partitioned typed pub/sub bus.
//!
//! A **membrane** is a named logical partition of the bus; within a
//! membrane, **receptors** are registered against concrete message types.
//! Publishing a message resolves the receptors registered for its exact
//! runtime type and invokes them in registration order, isolating
//! per-receptor failures into a [`DispatchReport`].
//!
//! - [`bus::BusBuilder`] — startup-only registration, frozen by `build()`.
//! - [`bus::SemanticBus`] — immutable after build; `publish` is a
//!   lock-free read-only lookup, safe under concurrent publishes.
//! - [`receptor::Receptor`] — async processing capability for one
//!   message type.
//! - [`report::DispatchReport`] — per-publish delivery/failure summary.

#![deny(unsafe_code)]

pub mod bus;
pub mod errors;
pub mod membrane;
pub mod receptor;
pub mod report;

pub use bus::{BusBuilder, SemanticBus};
pub use errors::{BusError, Result};
pub use membrane::MembraneId;
pub use receptor::{Receptor, ReceptorError};
pub use report::{DispatchReport, ReceptorFailure};
