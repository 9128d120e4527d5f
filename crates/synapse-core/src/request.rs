//! The opaque per-request view consumed by the router.
//!
//! The HTTP listener itself is outside this system; whatever accepts the
//! connection constructs a [`RequestContext`] and hands it to the router.
//! The context carries everything the core needs: verb, path, decoded body
//! text, query parameters (ordered multi-map), and the session token
//! extracted from the cookie or header the deployment uses.

use std::fmt;

/// HTTP verb, normalised to uppercase ASCII at construction.
///
/// Route matching is verb case-insensitive and path case-sensitive;
/// normalising here keeps the route table a plain exact-match lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Verb(String);

impl Verb {
    /// Build a verb from any casing (`"get"`, `"Get"`, `"GET"` are equal).
    pub fn new(verb: impl AsRef<str>) -> Self {
        Self(verb.as_ref().to_ascii_uppercase())
    }

    /// Normalised verb string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this verb carries its parameters in the query string.
    pub fn is_read(&self) -> bool {
        matches!(self.0.as_str(), "GET" | "HEAD")
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the core sees of one inbound request.
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// Request verb.
    pub verb: Verb,
    /// Request path, matched case-sensitively against the route table.
    pub path: String,
    /// Decoded body text; empty when the request had no body.
    pub body: String,
    /// Query parameters in wire order. Duplicate keys are preserved;
    /// the binder applies them in order so the last occurrence wins.
    pub query: Vec<(String, String)>,
    /// Session-identifying token (cookie value), if one was presented.
    pub session_token: Option<String>,
}

impl RequestContext {
    /// Context with no body, query, or session token.
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            body: String::new(),
            query: Vec::new(),
            session_token: None,
        }
    }

    /// Attach a body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Attach a session token.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_normalises_case() {
        assert_eq!(Verb::new("get"), Verb::new("GET"));
        assert_eq!(Verb::new("Post").as_str(), "POST");
    }

    #[test]
    fn read_verbs() {
        assert!(Verb::new("get").is_read());
        assert!(Verb::new("HEAD").is_read());
        assert!(!Verb::new("POST").is_read());
        assert!(!Verb::new("DELETE").is_read());
    }

    #[test]
    fn builder_chain() {
        let ctx = RequestContext::new(Verb::new("GET"), "/api/items")
            .with_query(vec![("id".into(), "7".into())])
            .with_session_token("tok-1");
        assert_eq!(ctx.path, "/api/items");
        assert_eq!(ctx.query.len(), 1);
        assert_eq!(ctx.session_token.as_deref(), Some("tok-1"));
        assert!(ctx.body.is_empty());
    }
}
