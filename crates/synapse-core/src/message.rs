//! The [`SemanticMessage`] trait and the [`routed_message!`] macro.
//!
//! A semantic message is a typed value representing one semantic event.
//! Dispatch resolves receptors by the message's concrete [`TypeId`] — an
//! explicit type token obtained at registration time from a monomorphised
//! generic call, never from runtime introspection of field names.
//!
//! Messages the router populates from request payloads additionally
//! implement [`Bindable`]: a `Default` + `Deserialize` struct with a
//! generated field-setter table keyed by wire name. The [`routed_message!`]
//! macro generates the struct, the serde attributes for JSON overlay
//! binding, the setter table for form/query binding, and both trait impls.

use std::any::{Any, TypeId};

use serde::de::DeserializeOwned;

use crate::request::RequestContext;

/// A typed message carried on the bus.
///
/// A message's type never changes after construction; its runtime identity
/// for dispatch purposes is `self.as_any().type_id()`.
pub trait SemanticMessage: Any + Send + Sync {
    /// Stable human-readable type name, used in reports and logs.
    fn type_name(&self) -> &'static str;

    /// Upcast for receptor-side downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Type token for a message type.
///
/// Wraps the concrete [`TypeId`] plus the display name so registries can
/// key on the id and still log something readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageType {
    /// Concrete type id used as the dispatch key.
    pub id: TypeId,
    /// Display name.
    pub name: &'static str,
}

impl MessageType {
    /// Token for a concrete message type.
    pub fn of<M: SemanticMessage>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: short_type_name::<M>(),
        }
    }
}

/// Last path segment of a type name (`a::b::Ping` → `Ping`), matching what
/// [`SemanticMessage::type_name`] implementations return.
fn short_type_name<M>() -> &'static str {
    let full = std::any::type_name::<M>();
    full.rsplit("::").next().unwrap_or(full)
}

/// A message type the payload binder can populate from a request.
///
/// JSON bodies are overlaid onto [`Default::default()`] via serde (absent
/// fields keep their defaults, unknown fields are ignored). Form and query
/// sources go through [`set_field`](Self::set_field), a generated
/// name-to-setter dispatch built once per type at compile time.
///
/// Values are assigned as raw strings: the core contract does no
/// percent-decoding and no numeric/boolean coercion. Typed coercion is an
/// extension point for message types that need it — implementors may
/// override `set_field` to parse, but must then document their
/// parse-failure behavior.
pub trait Bindable: SemanticMessage + Default + DeserializeOwned + Sized {
    /// Wire names of the bindable fields, in declaration order.
    const FIELDS: &'static [&'static str];

    /// Assign `value` to the field whose wire name matches `name`
    /// (ASCII case-insensitive). Returns `false` when no field matches;
    /// unknown fields never fail the bind.
    fn set_field(&mut self, name: &str, value: &str) -> bool;

    /// Attach the originating request context after binding completes.
    fn attach_context(&mut self, ctx: RequestContext);
}

/// Generate a router-bindable message type.
///
/// Each field is a `String` with an explicit wire name used for both the
/// serde rename and the form/query setter table. The macro adds a hidden
/// `context` field (skipped by serde) that the router fills in after
/// binding.
///
/// ```ignore
/// routed_message! {
///     /// Login form submitted by the SPA.
///     pub struct LoginRequest {
///         /// Submitted account name.
///         pub user_name: String => "UserName",
///         /// Plaintext password, verified by the session collaborator.
///         pub password: String => "Password",
///     }
/// }
/// ```
#[macro_export]
macro_rules! routed_message {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident : String => $wire:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, serde::Deserialize)]
        #[serde(default)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(rename = $wire)]
                pub $field: String,
            )*
            /// Originating request, attached by the router after binding.
            #[serde(skip)]
            pub context: Option<$crate::request::RequestContext>,
        }

        impl $crate::message::SemanticMessage for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        impl $crate::message::Bindable for $name {
            const FIELDS: &'static [&'static str] = &[$($wire),*];

            fn set_field(&mut self, name: &str, value: &str) -> bool {
                $(
                    if name.eq_ignore_ascii_case($wire) {
                        self.$field = value.to_owned();
                        return true;
                    }
                )*
                let _ = (name, value);
                false
            }

            fn attach_context(&mut self, ctx: $crate::request::RequestContext) {
                self.context = Some(ctx);
            }
        }
    };
}
