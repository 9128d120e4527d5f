//! # synapse-web
//!
//! The authenticating request router layered over the synapse bus.
//!
//! An inbound request flows through:
//!
//! 1. **[`routes::RouteTable`]** — exact-match `(verb, path)` lookup to a
//!    route definition (target message type, classification, role mask).
//! 2. **[`session::SessionStore`]** — the New / Authenticated / Expired
//!    state machine, keyed by session token.
//! 3. **[`binder`]** — populates the route's target message from the JSON
//!    body, form-encoded body, or query string.
//! 4. **[`router::AuthenticatingRouter`]** — orchestrates the above and
//!    publishes either the bound message or an [`messages::AccessDenied`]
//!    failure signal into the outbound membrane.
//!
//! [`supervisor::Supervisor`] wraps each request's execution unit and
//! captures panics so no fault reaches the transport layer.

#![deny(unsafe_code)]

pub mod binder;
pub mod errors;
pub mod messages;
pub mod router;
pub mod routes;
pub mod session;
pub mod supervisor;

pub use errors::{BindError, RouteConfigError};
pub use messages::{AccessDenied, DenialReason, LogEntry, MalformedRequest};
pub use router::{AuthenticatingRouter, UnroutedHandler};
pub use routes::{RouteClass, RouteDefinition, RouteTable, RouteTableBuilder};
pub use session::{SessionState, SessionStore};
pub use supervisor::Supervisor;
