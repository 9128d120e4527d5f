//! The per-client session state machine.
//!
//! States: **New** (no valid token presented, or a token we have never
//! authenticated), **Authenticated**, **Expired**. Transitions:
//!
//! - `login` installs a brand-new Authenticated session for a token
//!   (credential verification itself is the collaborator's job, outside
//!   this crate).
//! - [`SessionStore::update_state`] demotes Authenticated → Expired once
//!   the inactivity window elapses, and refreshes `last_seen`.
//! - `logout` forces Expired.
//!
//! Expired is sticky: the only way back to Authenticated is a fresh
//! `login`, which replaces the session record wholesale — the same
//! session never transitions Expired → Authenticated.
//!
//! The store is a concurrent map keyed by session token: operations on
//! one session are atomic per key and distinct sessions never contend.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use synapse_core::RequestContext;
use synapse_core::config::SessionConfig;

/// Authentication state of one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// First contact, or never authenticated.
    New,
    /// Logged in and inside the inactivity window.
    Authenticated,
    /// Timed out or logged out; sticky until a fresh login.
    Expired,
}

#[derive(Clone, Debug)]
struct Session {
    state: SessionState,
    role_mask: u32,
    last_seen: DateTime<Utc>,
}

/// Concurrent session store with an inactivity timeout.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    inactivity_timeout: Duration,
}

impl SessionStore {
    /// Store with the configured inactivity timeout.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            inactivity_timeout: Duration::seconds(config.inactivity_timeout_secs as i64),
        }
    }

    /// Refresh the session for this request's token.
    ///
    /// Creates a New session when the token is unknown; demotes an
    /// Authenticated session whose idle time exceeded the timeout; always
    /// refreshes `last_seen`. Requests without a token are untracked
    /// (their state reads as New). Idempotent with respect to
    /// classification: two rapid calls leave the state unchanged.
    pub fn update_state(&self, ctx: &RequestContext) {
        let Some(token) = ctx.session_token.as_deref() else {
            return;
        };
        let now = Utc::now();
        let timeout = self.inactivity_timeout;
        let _ = self
            .sessions
            .entry(token.to_owned())
            .and_modify(|session| {
                if session.state == SessionState::Authenticated
                    && now - session.last_seen > timeout
                {
                    session.state = SessionState::Expired;
                }
                session.last_seen = now;
            })
            .or_insert_with(|| Session {
                state: SessionState::New,
                role_mask: 0,
                last_seen: now,
            });
    }

    /// Whether this request's session is currently Authenticated.
    pub fn is_authenticated(&self, ctx: &RequestContext) -> bool {
        self.state(ctx) == SessionState::Authenticated
    }

    /// State of this request's session. No token, or an unknown token,
    /// reads as New.
    pub fn state(&self, ctx: &RequestContext) -> SessionState {
        ctx.session_token
            .as_deref()
            .and_then(|token| self.sessions.get(token).map(|s| s.state))
            .unwrap_or(SessionState::New)
    }

    /// Role mask of this request's session; zero when there is none.
    pub fn role_mask(&self, ctx: &RequestContext) -> u32 {
        ctx.session_token
            .as_deref()
            .and_then(|token| self.sessions.get(token).map(|s| s.role_mask))
            .unwrap_or(0)
    }

    /// Install a brand-new Authenticated session for `token`.
    ///
    /// Called by the login receptor after the credential collaborator
    /// accepts; replaces any prior session under the same token.
    pub fn login(&self, token: &str, role_mask: u32) {
        let _ = self.sessions.insert(
            token.to_owned(),
            Session {
                state: SessionState::Authenticated,
                role_mask,
                last_seen: Utc::now(),
            },
        );
    }

    /// Explicitly invalidate a session. Unknown tokens are a no-op.
    pub fn logout(&self, token: &str) {
        if let Some(mut session) = self.sessions.get_mut(token) {
            session.state = SessionState::Expired;
        }
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether any sessions are tracked.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Last-seen timestamp for a token, if tracked.
    pub fn last_seen(&self, token: &str) -> Option<DateTime<Utc>> {
        self.sessions.get(token).map(|s| s.last_seen)
    }
}
