//! Error types for Warden.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`WardenError`] - Top-level error type for registration and triggering
//! - [`ConfigurationError`] - A guard list was rejected at registration time
//! - [`AccessorError`] - A guard referenced an accessor the event cannot answer

use crate::id::HandlerId;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Warden operations.
#[derive(Error, Debug)]
pub enum WardenError {
    /// A guard list failed validation; nothing was registered.
    #[error("invalid guard configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A guard could not be evaluated against the event.
    #[error("accessor error: {0}")]
    Accessor(#[from] AccessorError),

    /// A handler callback returned an error.
    #[error("handler {id} failed: {source}")]
    Handler {
        /// The failing handler.
        id: HandlerId,
        /// The error raised by the callback.
        #[source]
        source: BoxError,
    },

    /// A handler callback panicked.
    #[error("handler {id} panicked: {message}")]
    Panicked {
        /// The failing handler.
        id: HandlerId,
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl WardenError {
    /// The id of the handler that raised this error, if any.
    pub fn handler_id(&self) -> Option<HandlerId> {
        match self {
            WardenError::Handler { id, .. } | WardenError::Panicked { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Errors raised while validating guards at registration time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A predicate, accessor or kind guard was given an empty name.
    #[error("{what} name must not be empty")]
    EmptyName {
        /// Which guard shape carried the empty name.
        what: &'static str,
    },

    /// A pattern match failed to compile.
    #[error("bad pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// The compiler's diagnostic.
        reason: String,
    },

    /// An `AnyOf` guard with no children can never be satisfied.
    #[error("`AnyOf` guard has no alternatives")]
    EmptyAnyOf,
}

/// Errors raised by [`Event`](crate::Event) accessors during guard evaluation.
#[derive(Error, Debug)]
pub enum AccessorError {
    /// The event does not support the named accessor.
    #[error("event has no accessor `{name}`")]
    Missing {
        /// The accessor name.
        name: String,
    },

    /// The accessor exists but rejected the supplied arguments.
    #[error("accessor `{name}` rejected its arguments: {reason}")]
    Arguments {
        /// The accessor name.
        name: String,
        /// Why the arguments were rejected.
        reason: String,
    },

    /// A custom accessor error.
    #[error(transparent)]
    Custom(BoxError),
}

impl AccessorError {
    /// Shorthand for [`AccessorError::Missing`].
    pub fn missing(name: impl Into<String>) -> Self {
        AccessorError::Missing { name: name.into() }
    }

    /// Shorthand for [`AccessorError::Arguments`].
    pub fn arguments(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AccessorError::Arguments {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

// Convenience conversions
impl From<BoxError> for AccessorError {
    fn from(err: BoxError) -> Self {
        AccessorError::Custom(err)
    }
}
