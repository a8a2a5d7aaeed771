//! The event capability interface.
//!
//! Guards refer to accessors by name. Rather than reflecting on arbitrary
//! objects, an event exposes those accessors through [`Event::field`], and
//! declares the capabilities it has through [`Event::kinds`].
//!
//! # Example
//!
//! ```rust
//! use warden_core::{AccessorError, Event, Value};
//!
//! struct Message {
//!     body: String,
//!     chat: bool,
//! }
//!
//! impl Event for Message {
//!     fn field(&self, name: &str, _args: &[Value]) -> Result<Value, AccessorError> {
//!         match name {
//!             "body" => Ok(Value::from(&self.body)),
//!             "chat?" => Ok(Value::from(self.chat)),
//!             _ => Err(AccessorError::missing(name)),
//!         }
//!     }
//!
//!     fn kinds(&self) -> &[&'static str] {
//!         &["message"]
//!     }
//! }
//! ```

use crate::{error::AccessorError, value::Value};
use std::{
    any::{Any, TypeId},
    borrow::Cow,
    fmt,
};

/// Upcast to [`Any`], implemented for every `'static` type.
///
/// This is what lets [`Kind::of`] guards work through `dyn Event`.
pub trait AsAny: Any {
    /// View `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A runtime type or capability tag, tested by kind guards.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// The event's concrete Rust type.
    Type {
        /// Identity of the type.
        id: TypeId,
        /// Human-readable type name, for diagnostics only.
        name: &'static str,
    },
    /// A capability the event declares through [`Event::kinds`].
    Named(Cow<'static, str>),
}

impl Kind {
    /// Matches events whose concrete type is `T`.
    pub fn of<T: Any>() -> Self {
        Kind::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Matches events that declare the capability `name`.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Kind::Named(name.into())
    }

    pub(crate) fn name(&self) -> &str {
        match self {
            Kind::Type { name, .. } => name,
            Kind::Named(name) => &**name,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Type { name, .. } => write!(f, "Kind::of::<{name}>"),
            Kind::Named(name) => write!(f, "Kind::named({name:?})"),
        }
    }
}

/// An event that guards can inspect.
///
/// Only [`field`](Event::field) is required. The trait is object safe, so a
/// registry can be built over `dyn Event` to mix event types on one channel.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Warden `Event`",
    label = "missing `Event` implementation",
    note = "Implement `Event::field` or use `#[derive(warden::Event)]`."
)]
pub trait Event: AsAny + Send + Sync {
    /// Invoke the accessor `name` with fixed `args`.
    ///
    /// Unknown accessors must return [`AccessorError::Missing`].
    fn field(&self, name: &str, args: &[Value]) -> Result<Value, AccessorError>;

    /// Evaluate a zero-argument boolean accessor.
    fn predicate(&self, name: &str) -> Result<bool, AccessorError> {
        Ok(self.field(name, &[])?.is_truthy())
    }

    /// Capabilities this event declares, tested by [`Kind::Named`].
    fn kinds(&self) -> &[&'static str] {
        &[]
    }

    /// Whether this event is an instance of `kind`.
    fn is_kind(&self, kind: &Kind) -> bool {
        match kind {
            Kind::Type { id, .. } => Any::type_id(self.as_any()) == *id,
            Kind::Named(name) => self.kinds().iter().any(|k| *k == &**name),
        }
    }
}

impl<T: Event + ?Sized> Event for Box<T> {
    fn field(&self, name: &str, args: &[Value]) -> Result<Value, AccessorError> {
        (**self).field(name, args)
    }

    fn predicate(&self, name: &str) -> Result<bool, AccessorError> {
        (**self).predicate(name)
    }

    fn kinds(&self) -> &[&'static str] {
        (**self).kinds()
    }

    fn is_kind(&self, kind: &Kind) -> bool {
        (**self).is_kind(kind)
    }
}

impl<T: Event + ?Sized> Event for std::sync::Arc<T> {
    fn field(&self, name: &str, args: &[Value]) -> Result<Value, AccessorError> {
        (**self).field(name, args)
    }

    fn predicate(&self, name: &str) -> Result<bool, AccessorError> {
        (**self).predicate(name)
    }

    fn kinds(&self) -> &[&'static str] {
        (**self).kinds()
    }

    fn is_kind(&self, kind: &Kind) -> bool {
        (**self).is_kind(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;

    impl Event for Ping {
        fn field(&self, name: &str, _args: &[Value]) -> Result<Value, AccessorError> {
            match name {
                "seq" => Ok(Value::from(7)),
                "urgent?" => Ok(Value::Null),
                _ => Err(AccessorError::missing(name)),
            }
        }

        fn kinds(&self) -> &[&'static str] {
            &["heartbeat"]
        }
    }

    struct Pong;

    impl Event for Pong {
        fn field(&self, name: &str, _args: &[Value]) -> Result<Value, AccessorError> {
            Err(AccessorError::missing(name))
        }
    }

    #[test]
    fn test_type_kind() {
        assert!(Ping.is_kind(&Kind::of::<Ping>()));
        assert!(!Ping.is_kind(&Kind::of::<Pong>()));
    }

    #[test]
    fn test_type_kind_through_trait_object() {
        let boxed: Box<dyn Event> = Box::new(Ping);
        assert!(boxed.is_kind(&Kind::of::<Ping>()));
        let event: &dyn Event = &Pong;
        assert!(event.is_kind(&Kind::of::<Pong>()));
        assert!(!event.is_kind(&Kind::of::<Ping>()));
    }

    #[test]
    fn test_named_kind() {
        assert!(Ping.is_kind(&Kind::named("heartbeat")));
        assert!(!Pong.is_kind(&Kind::named("heartbeat")));
    }

    #[test]
    fn test_default_predicate_uses_truthiness() {
        assert!(Ping.predicate("seq").unwrap());
        assert!(!Ping.predicate("urgent?").unwrap());
        assert!(matches!(
            Ping.predicate("nope"),
            Err(AccessorError::Missing { .. })
        ));
    }
}
