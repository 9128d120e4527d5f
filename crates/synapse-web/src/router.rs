//! The authenticating router: resolve, authorize, bind, publish.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use synapse_bus::SemanticBus;
use synapse_core::RequestContext;
use tracing::{debug, error, instrument, warn};

use crate::messages::{AccessDenied, MalformedRequest};
use crate::routes::{RouteClass, RouteTable};
use crate::session::{SessionState, SessionStore};

/// Collaborator for requests with no route definition.
///
/// The router's only contract is "not found in the table"; the handler
/// decides the fallback (static files, 404, public router, ...).
#[async_trait]
pub trait UnroutedHandler: Send + Sync {
    /// Take over a request the table could not resolve.
    async fn handle(&self, ctx: RequestContext);
}

/// Orchestrates one request through the route table, the session state
/// machine, the payload binder, and the bus.
///
/// Every per-request outcome is a published message or a delegated
/// request — no error path escapes to the transport layer.
pub struct AuthenticatingRouter {
    table: RouteTable,
    sessions: Arc<SessionStore>,
    bus: Arc<SemanticBus>,
    membrane: String,
    unrouted: Arc<dyn UnroutedHandler>,
}

impl AuthenticatingRouter {
    /// Assemble a router publishing into `membrane`.
    pub fn new(
        table: RouteTable,
        sessions: Arc<SessionStore>,
        bus: Arc<SemanticBus>,
        membrane: impl Into<String>,
        unrouted: Arc<dyn UnroutedHandler>,
    ) -> Self {
        Self {
            table,
            sessions,
            bus,
            membrane: membrane.into(),
            unrouted,
        }
    }

    /// Route one request.
    ///
    /// Order matters and is deliberate: the authentication check and the
    /// role-mask check are *sequential* — an authenticated session that
    /// fails the mask test is reported as `notAuthorized`, never as
    /// `authenticationRequired`.
    #[instrument(skip_all, fields(verb = %ctx.verb, path = %ctx.path))]
    pub async fn route(&self, ctx: RequestContext) {
        let Some(route) = self.table.resolve(&ctx.verb, &ctx.path) else {
            counter!("router_unrouted_total").increment(1);
            debug!("no route definition; delegating to unrouted handler");
            self.unrouted.handle(ctx).await;
            return;
        };

        if route.class != RouteClass::Public {
            self.sessions.update_state(&ctx);
            if !self.sessions.is_authenticated(&ctx) {
                // New and Expired are both unauthenticated but map to
                // different responses.
                let denied = match self.sessions.state(&ctx) {
                    SessionState::Expired => AccessDenied::session_expired(ctx),
                    _ => AccessDenied::authentication_required(ctx),
                };
                self.deny(denied).await;
                return;
            }
            if route.class == RouteClass::RoleGated {
                let mask = self.sessions.role_mask(&ctx);
                if mask & route.role_mask == 0 {
                    self.deny(AccessDenied::not_authorized(ctx)).await;
                    return;
                }
            }
        }

        match route.bind(&ctx) {
            Ok(message) => {
                debug!(message_type = message.type_name(), "publishing bound message");
                match self.bus.publish_arc(&self.membrane, message).await {
                    Ok(report) if !report.is_clean() => {
                        warn!(
                            message_type = report.message_type,
                            failed = report.failures.len(),
                            "receptor failures during dispatch"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "publish failed"),
                }
            }
            Err(e) => {
                counter!("router_malformed_total").increment(1);
                warn!(error = %e, "payload bind failed");
                let failure = MalformedRequest::new(e.to_string(), ctx);
                if let Err(e) = self.bus.publish(&self.membrane, failure).await {
                    error!(error = %e, "publish of malformed-request signal failed");
                }
            }
        }
    }

    async fn deny(&self, denied: AccessDenied) {
        counter!("router_denied_total", "reason" => denied.reason_code.as_str()).increment(1);
        warn!(
            status = denied.status_code,
            reason = denied.reason_code.as_str(),
            "request denied"
        );
        if let Err(e) = self.bus.publish(&self.membrane, denied).await {
            error!(error = %e, "publish of denial signal failed");
        }
    }
}
