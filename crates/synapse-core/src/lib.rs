//! # synapse-core
//!
//! Foundation types for the synapse membrane bus.
//!
//! This crate provides the shared vocabulary that the bus and web crates
//! depend on:
//!
//! - **Messages**: the [`message::SemanticMessage`] trait, the
//!   [`message::Bindable`] contract for router-populated messages, and the
//!   [`routed_message!`] macro that generates both.
//! - **Requests**: [`request::RequestContext`] — the opaque per-request
//!   view (verb, path, body, query, session token) the router consumes.
//! - **Configuration**: [`config::SynapseConfig`] with layered loading
//!   (compiled defaults, JSON file, `SYNAPSE_*` env overrides).
//! - **Errors**: [`errors::ConfigError`] hierarchy via `thiserror`.
//! - **Logging**: [`logging::init_logging`] tracing bootstrap.
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `synapse-bus` and `synapse-web`.

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod logging;
pub mod message;
pub mod request;

pub use config::{PanicPolicy, SynapseConfig};
pub use errors::{ConfigError, Result};
pub use message::{Bindable, SemanticMessage};
pub use request::{RequestContext, Verb};
