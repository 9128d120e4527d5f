//! Standard messages the router publishes alongside route targets.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use synapse_core::{RequestContext, SemanticMessage};

/// Machine-readable denial reason.
///
/// The wire strings (`"authenticationRequired"`, `"notAuthorized"`,
/// `"sessionExpired"`) are part of the external contract — SPA clients
/// key their error handling on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DenialReason {
    /// No authenticated session; the client must log in first.
    AuthenticationRequired,
    /// Authenticated, but the session's role mask does not overlap the
    /// route's required mask.
    NotAuthorized,
    /// The session existed but timed out or was logged out.
    SessionExpired,
}

impl DenialReason {
    /// Wire string for the reason code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "authenticationRequired",
            Self::NotAuthorized => "notAuthorized",
            Self::SessionExpired => "sessionExpired",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The dispatch failure signal: published instead of the route's target
/// message when authorization fails. A downstream response-writing
/// receptor translates it into the actual wire response.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDenied {
    /// HTTP status for the response (401 or 403).
    pub status_code: u16,
    /// Machine-readable reason.
    pub reason_code: DenialReason,
    /// The denied request.
    #[serde(skip)]
    pub context: Option<RequestContext>,
}

impl AccessDenied {
    /// 403 — a session in state New hit a protected route.
    pub fn authentication_required(context: RequestContext) -> Self {
        Self {
            status_code: 403,
            reason_code: DenialReason::AuthenticationRequired,
            context: Some(context),
        }
    }

    /// 401 — the session expired.
    pub fn session_expired(context: RequestContext) -> Self {
        Self {
            status_code: 401,
            reason_code: DenialReason::SessionExpired,
            context: Some(context),
        }
    }

    /// 401 — authenticated but the role mask test failed.
    pub fn not_authorized(context: RequestContext) -> Self {
        Self {
            status_code: 401,
            reason_code: DenialReason::NotAuthorized,
            context: Some(context),
        }
    }
}

impl SemanticMessage for AccessDenied {
    fn type_name(&self) -> &'static str {
        "AccessDenied"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Published when an authorized request's structured payload failed to
/// parse. Distinct from [`AccessDenied`] so response writers and clients
/// can tell a client bug from an authorization failure.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedRequest {
    /// HTTP status for the response (400).
    pub status_code: u16,
    /// Parser diagnostic.
    pub error: String,
    /// The offending request.
    #[serde(skip)]
    pub context: Option<RequestContext>,
}

impl MalformedRequest {
    /// 400 — unparseable payload.
    pub fn new(error: impl Into<String>, context: RequestContext) -> Self {
        Self {
            status_code: 400,
            error: error.into(),
            context: Some(context),
        }
    }
}

impl SemanticMessage for MalformedRequest {
    fn type_name(&self) -> &'static str {
        "MalformedRequest"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A diagnostic line carried through the membrane like any other message,
/// so modules can publish log output without depending on a logger.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log text.
    pub message: String,
}

impl LogEntry {
    /// Build a log entry.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl SemanticMessage for LogEntry {
    fn type_name(&self) -> &'static str {
        "LogEntry"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
