//! # warden-core
//!
//! Core vocabulary for the Warden guarded handler registry.
//!
//! This crate has minimal dependencies and holds everything that does not
//! need registry state: the event capability interface, the guard DSL and
//! its evaluator, the handler contract and the error hierarchy.
//!
//! # Pieces
//!
//! ## Events ([`Event`])
//!
//! Guards name accessors; events answer them through [`Event::field`] with a
//! dynamic [`Value`]. Type guards use [`Kind`], either a concrete Rust type
//! or a declared capability.
//!
//! ## Guards ([`Guard`])
//!
//! Five shapes: kind, predicate, field match group, closure and `AnyOf`.
//! A guard list is a conjunction; [`should_fire`] evaluates it and
//! [`check_guards`] validates it before registration.
//!
//! ## Handlers ([`Handler`])
//!
//! Callbacks return a [`Flow`]: `Handled`, `Pass` or `Halt`. Anything that
//! implements [`IntoFlow`] can be returned from a closure handler.
//!
//! # Error Types
//!
//! - [`WardenError`] - Top-level error type
//! - [`ConfigurationError`] - Rejected guard lists
//! - [`AccessorError`] - Accessor lookups that failed during evaluation

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod evaluate;
mod event;
mod flow;
mod guard;
mod handler;
mod id;
mod value;

// Re-exports
pub use error::{AccessorError, BoxError, ConfigurationError, WardenError};
pub use evaluate::{check_guards, should_fire};
pub use event::{AsAny, Event, Kind};
pub use flow::{Flow, IntoFlow};
pub use guard::{Accessor, Guard, GuardFn, Match, Pattern};
pub use handler::Handler;
pub use id::{HandlerId, IdGenerator, RandomIds, SequentialIds};
pub use value::Value;
