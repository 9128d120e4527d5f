//! Payload binding: raw request data → populated message instance.
//!
//! Source selection rules:
//!
//! 1. Non-empty body whose first non-whitespace character is `{` →
//!    structured (JSON) binding, overlaid onto the type's defaults.
//! 2. Any other non-empty body → `&`-delimited `key=value` form pairs.
//! 3. Empty body on a read verb (GET/HEAD) → query parameters.
//! 4. Otherwise → a default instance.
//!
//! Binding is tolerant in every mode: unknown source fields are ignored
//! and absent target fields keep their defaults. The only failure is an
//! unparseable JSON body ([`BindError::MalformedJson`]).
//!
//! Form and query values are assigned as raw strings — no percent
//! decoding and no numeric coercion in the core contract (see
//! [`Bindable`]). Duplicate keys are applied in order, so the last
//! occurrence wins.

use synapse_core::{Bindable, RequestContext};

use crate::errors::BindError;

/// Bind a request into a fresh instance of `M`.
pub fn bind<M: Bindable>(ctx: &RequestContext) -> Result<M, BindError> {
    let body = ctx.body.trim_start();
    if !body.is_empty() {
        if body.starts_with('{') {
            bind_json(body)
        } else {
            Ok(bind_form(body))
        }
    } else if ctx.verb.is_read() {
        Ok(bind_query(ctx))
    } else {
        Ok(M::default())
    }
}

fn bind_json<M: Bindable>(body: &str) -> Result<M, BindError> {
    serde_json::from_str(body).map_err(|e| BindError::MalformedJson {
        error: e.to_string(),
    })
}

fn bind_form<M: Bindable>(body: &str) -> M {
    let mut message = M::default();
    for pair in body.split('&') {
        if pair.is_empty() {
            continue;
        }
        // Split on the first '=' only; a bare key binds the empty string.
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let _ = message.set_field(key, value);
    }
    message
}

fn bind_query<M: Bindable>(ctx: &RequestContext) -> M {
    let mut message = M::default();
    for (key, value) in &ctx.query {
        let _ = message.set_field(key, value);
    }
    message
}
