//! Embedding a registry in an owning object.
//!
//! Implement [`HasGuardedHandlers`] by pointing it at a [`Registry`] field,
//! and the owner gains the full registration and trigger surface.
//!
//! ```rust
//! use warden_std::{HasGuardedHandlers, Registry};
//! use warden_std::testing::MockEvent;
//! use warden_core::Flow;
//!
//! #[derive(Default)]
//! struct Connection {
//!     handlers: Registry<&'static str, MockEvent>,
//! }
//!
//! impl HasGuardedHandlers<&'static str, MockEvent> for Connection {
//!     fn guarded_handlers(&self) -> &Registry<&'static str, MockEvent> {
//!         &self.handlers
//!     }
//! }
//!
//! let conn = Connection::default();
//! conn.register_handler("stanza", [], |_: &MockEvent| Flow::Handled).unwrap();
//! assert!(conn.trigger_handler(&"stanza", &MockEvent::new()).unwrap());
//! ```

use crate::{
    registry::{Classification, HandlerOptions, Registry},
    trigger::TriggerOptions,
};
use std::{fmt::Debug, hash::Hash};
use warden_core::{Event, Guard, Handler, HandlerId, WardenError};

/// An object that owns a guarded handler registry.
pub trait HasGuardedHandlers<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Event + ?Sized,
{
    /// The registry backing this object.
    fn guarded_handlers(&self) -> &Registry<K, E>;

    /// Register a handler at priority 0.
    fn register_handler<G, H>(
        &self,
        classification: impl Into<Classification<K>>,
        guards: G,
        handler: H,
    ) -> Result<HandlerId, WardenError>
    where
        G: IntoIterator<Item = Guard<E>>,
        H: Handler<E>,
    {
        self.guarded_handlers()
            .register(classification, guards, handler)
    }

    /// Register a handler at `priority`.
    fn register_handler_with_priority<G, H>(
        &self,
        classification: impl Into<Classification<K>>,
        priority: i32,
        guards: G,
        handler: H,
    ) -> Result<HandlerId, WardenError>
    where
        G: IntoIterator<Item = Guard<E>>,
        H: Handler<E>,
    {
        self.guarded_handlers()
            .register_with_priority(classification, priority, guards, handler)
    }

    /// Register a one-shot handler.
    fn register_tmp_handler<G, H>(
        &self,
        classification: impl Into<Classification<K>>,
        guards: G,
        handler: H,
    ) -> Result<HandlerId, WardenError>
    where
        G: IntoIterator<Item = Guard<E>>,
        H: Handler<E>,
    {
        self.guarded_handlers()
            .register_one_shot(classification, guards, handler)
    }

    /// Register a handler with explicit options.
    fn register_handler_with_options<G, H>(
        &self,
        classification: impl Into<Classification<K>>,
        options: HandlerOptions,
        guards: G,
        handler: H,
    ) -> Result<HandlerId, WardenError>
    where
        G: IntoIterator<Item = Guard<E>>,
        H: Handler<E>,
    {
        self.guarded_handlers()
            .register_with_options(classification, options, guards, handler)
    }

    /// Remove a handler by id.
    fn unregister_handler(
        &self,
        classification: impl Into<Classification<K>>,
        id: HandlerId,
    ) -> bool {
        self.guarded_handlers().unregister(classification, id)
    }

    /// Remove handlers registered with exactly `guards`.
    fn clear_handlers(&self, classification: impl Into<Classification<K>>, guards: &[Guard<E>]) -> usize {
        self.guarded_handlers().clear(classification, guards)
    }

    /// Remove every handler.
    fn clear_all_handlers(&self) {
        self.guarded_handlers().clear_all();
    }

    /// Trigger the first matching handler.
    fn trigger_handler(&self, key: &K, event: &E) -> Result<bool, WardenError> {
        self.guarded_handlers().trigger(key, event)
    }

    /// Trigger with explicit options.
    fn trigger_handler_with(
        &self,
        key: &K,
        event: &E,
        options: &TriggerOptions<'_>,
    ) -> Result<bool, WardenError> {
        self.guarded_handlers().trigger_with(key, event, options)
    }
}
