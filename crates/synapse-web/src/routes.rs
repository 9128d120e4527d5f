//! The route table: exact-match `(verb, path)` → route definition.
//!
//! The lookup key is the normalised verb joined to the path with `:`.
//! Verb matching is therefore
//! case-insensitive (verbs normalise to uppercase) and path matching is
//! case-sensitive. No wildcard or pattern matching happens here; pattern
//! routing is a higher-level concern layered on top.
//!
//! Registration happens once at startup through [`RouteTableBuilder`] and
//! the built [`RouteTable`] is immutable, so steady-state lookups take no
//! locks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use synapse_core::message::MessageType;
use synapse_core::{Bindable, RequestContext, SemanticMessage, Verb};

use crate::binder;
use crate::errors::{BindError, RouteConfigError};

/// Access classification of a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteClass {
    /// No session required.
    Public,
    /// Requires an authenticated session.
    Authenticated,
    /// Requires an authenticated session whose role mask overlaps the
    /// route's mask (`session & route != 0`).
    RoleGated,
}

type RouteBinder =
    Box<dyn Fn(&RequestContext) -> Result<Arc<dyn SemanticMessage>, BindError> + Send + Sync>;

/// A registered route: classification, role mask, and the erased binder
/// that produces the target message type.
pub struct RouteDefinition {
    /// Access classification.
    pub class: RouteClass,
    /// Required role mask; meaningful only for [`RouteClass::RoleGated`].
    pub role_mask: u32,
    /// Target message type name, for logs and reports.
    pub message_type: &'static str,
    bind: RouteBinder,
}

impl RouteDefinition {
    /// Bind the request into the route's target message, with the request
    /// context attached.
    pub fn bind(&self, ctx: &RequestContext) -> Result<Arc<dyn SemanticMessage>, BindError> {
        (self.bind)(ctx)
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("class", &self.class)
            .field("role_mask", &self.role_mask)
            .field("message_type", &self.message_type)
            .finish_non_exhaustive()
    }
}

/// Startup-only route registration.
#[derive(Default)]
pub struct RouteTableBuilder {
    routes: HashMap<String, RouteDefinition>,
}

impl RouteTableBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route whose target message type is `M`.
    ///
    /// Duplicate `(verb, path)` keys and role-gated routes with an empty
    /// mask are startup-fatal configuration errors.
    pub fn route<M: Bindable>(
        &mut self,
        verb: &str,
        path: &str,
        class: RouteClass,
        role_mask: u32,
    ) -> Result<(), RouteConfigError> {
        let verb = Verb::new(verb);
        if class == RouteClass::RoleGated && role_mask == 0 {
            return Err(RouteConfigError::EmptyRoleMask {
                verb: verb.as_str().to_owned(),
                path: path.to_owned(),
            });
        }
        let key = search_key(&verb, path);
        if self.routes.contains_key(&key) {
            return Err(RouteConfigError::DuplicateRoute {
                verb: verb.as_str().to_owned(),
                path: path.to_owned(),
            });
        }
        let bind: RouteBinder = Box::new(|ctx| {
            let mut message = binder::bind::<M>(ctx)?;
            // Attached after binding: a JSON overlay must never clobber it.
            message.attach_context(ctx.clone());
            Ok(Arc::new(message) as Arc<dyn SemanticMessage>)
        });
        let _ = self.routes.insert(
            key,
            RouteDefinition {
                class,
                role_mask,
                message_type: MessageType::of::<M>().name,
                bind,
            },
        );
        Ok(())
    }

    /// Freeze into an immutable table.
    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes,
        }
    }
}

/// The immutable, read-heavy route table.
pub struct RouteTable {
    routes: HashMap<String, RouteDefinition>,
}

impl RouteTable {
    /// Exact-match resolution. `None` means the request is unroutable and
    /// belongs to the unhandled-route collaborator.
    pub fn resolve(&self, verb: &Verb, path: &str) -> Option<&RouteDefinition> {
        self.routes.get(&search_key(verb, path))
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn search_key(verb: &Verb, path: &str) -> String {
    format!("{verb}:{path}")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use synapse_core::routed_message;

    use super::*;

    routed_message! {
        /// Placeholder route target.
        pub struct ItemQuery {
            pub id: String => "Id",
        }
    }

    fn table_with(entries: &[(&str, &str, RouteClass, u32)]) -> RouteTable {
        let mut builder = RouteTableBuilder::new();
        for (verb, path, class, mask) in entries {
            builder
                .route::<ItemQuery>(verb, path, *class, *mask)
                .unwrap();
        }
        builder.build()
    }

    #[test]
    fn resolve_returns_the_registered_definition() {
        let table = table_with(&[
            ("GET", "/api/items", RouteClass::Public, 0),
            ("POST", "/api/items", RouteClass::Authenticated, 0),
        ]);
        let def = table.resolve(&Verb::new("GET"), "/api/items").unwrap();
        assert_eq!(def.class, RouteClass::Public);
        let def = table.resolve(&Verb::new("POST"), "/api/items").unwrap();
        assert_eq!(def.class, RouteClass::Authenticated);
    }

    #[test]
    fn resolve_misses_unregistered_pairs() {
        let table = table_with(&[("GET", "/api/items", RouteClass::Public, 0)]);
        assert!(table.resolve(&Verb::new("PUT"), "/api/items").is_none());
        assert!(table.resolve(&Verb::new("GET"), "/api/other").is_none());
    }

    #[test]
    fn verb_matching_is_case_insensitive_path_is_not() {
        let table = table_with(&[("get", "/api/Items", RouteClass::Public, 0)]);
        assert!(table.resolve(&Verb::new("GET"), "/api/Items").is_some());
        assert!(table.resolve(&Verb::new("GET"), "/api/items").is_none());
    }

    #[test]
    fn duplicate_key_is_a_config_error() {
        let mut builder = RouteTableBuilder::new();
        builder
            .route::<ItemQuery>("GET", "/x", RouteClass::Public, 0)
            .unwrap();
        // Same key in a different verb casing still collides.
        let err = builder
            .route::<ItemQuery>("get", "/x", RouteClass::Public, 0)
            .unwrap_err();
        assert_matches!(err, RouteConfigError::DuplicateRoute { .. });
    }

    #[test]
    fn role_gated_route_requires_a_nonzero_mask() {
        let mut builder = RouteTableBuilder::new();
        let err = builder
            .route::<ItemQuery>("GET", "/x", RouteClass::RoleGated, 0)
            .unwrap_err();
        assert_matches!(err, RouteConfigError::EmptyRoleMask { .. });
    }

    #[test]
    fn bound_message_carries_the_request_context() {
        let table = table_with(&[("GET", "/api/items", RouteClass::Public, 0)]);
        let ctx = RequestContext::new(Verb::new("GET"), "/api/items")
            .with_query(vec![("id".into(), "42".into())]);
        let def = table.resolve(&ctx.verb, &ctx.path).unwrap();
        let message = def.bind(&ctx).unwrap();
        let query = message.as_any().downcast_ref::<ItemQuery>().unwrap();
        assert_eq!(query.id, "42");
        assert_eq!(query.context.as_ref().unwrap().path, "/api/items");
    }
}
