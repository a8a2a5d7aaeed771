//! # warden - Guard-Filtered Event Handler Registry
//!
//! `warden` lets an owning object register callbacks against event
//! classifications, filter them with composable guards, order them by
//! priority, and trigger the best match (or every match) for an incoming
//! event.
//!
//! ## Quick Start
//!
//! ```rust
//! use warden::{Flow, Guard, Match, Registry};
//! use warden::testing::MockEvent;
//!
//! let registry: Registry<&str, MockEvent> = Registry::new();
//!
//! // Higher priority runs first; `Pass` hands the event on.
//! registry
//!     .register_with_priority("message", 10, [], |_: &MockEvent| Flow::Pass)
//!     .unwrap();
//! registry
//!     .register(
//!         "message",
//!         [Guard::field("body", Match::pattern("^exit"))],
//!         |_: &MockEvent| println!("bye"),
//!     )
//!     .unwrap();
//!
//! let event = MockEvent::new().with_field("body", "exit now");
//! assert!(registry.trigger(&"message", &event).unwrap());
//! ```
//!
//! ## Guards
//!
//! A handler's guards are a conjunction. Each guard is one of:
//!
//! - [`Guard::Kind`]: the event's type or a declared capability
//! - [`Guard::Predicate`]: a boolean accessor
//! - [`Guard::Fields`]: accessor/expectation pairs (exact, membership or pattern)
//! - [`Guard::Func`]: a closure
//! - [`Guard::AnyOf`]: a disjunction of nested guards

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use warden_core::{
    // Guards
    Accessor,
    // Errors
    AccessorError,
    AsAny,
    BoxError,
    ConfigurationError,
    // Events
    Event,
    // Handlers
    Flow,
    Guard,
    GuardFn,
    Handler,
    // Ids
    HandlerId,
    IdGenerator,
    IntoFlow,
    Kind,
    Match,
    Pattern,
    RandomIds,
    SequentialIds,
    Value,
    WardenError,
    // Evaluation
    check_guards,
    should_fire,
};

// Registry
pub use warden_std::{
    Classification, HandlerOptions, HasGuardedHandlers, Registry, RegistryBuilder,
    TriggerOptions,
};

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use warden_std::testing::*;
}

/// Prelude module - common imports for Warden.
///
/// # Usage
///
/// ```rust,ignore
/// use warden::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Accessor, Classification, Event, Flow, Guard, Handler, HandlerId, HandlerOptions,
        HasGuardedHandlers, Kind, Match, Registry, TriggerOptions, Value, WardenError,
    };
}

#[cfg(feature = "macros")]
pub use warden_macros::Event;
