//! # warden-std
//!
//! The concurrent handler registry for Warden.
//!
//! This crate provides:
//! - **Registry**: [`Registry`] keyed by [`Classification`] and priority
//! - **Trigger protocol**: first-match and broadcast dispatch with [`TriggerOptions`]
//! - **Host trait**: [`HasGuardedHandlers`] for objects that own a registry
//! - **Testing utilities**: [`testing`]
//!
//! Registration, removal and triggering may run concurrently from any number
//! of threads. Buckets are updated optimistically, and no lock is held while a
//! handler runs, so handlers may re-enter the registry freely.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core
pub use warden_core;

pub mod host;
pub mod registry;
pub mod testing;
pub mod trigger;

pub use host::HasGuardedHandlers;
pub use registry::{Classification, HandlerOptions, Registry, RegistryBuilder};
pub use trigger::TriggerOptions;
