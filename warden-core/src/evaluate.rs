//! Guard evaluation and validation.
//!
//! Evaluation is pure: it reads the event through [`Event`] accessors and
//! never touches registry state.

use crate::{
    error::{AccessorError, ConfigurationError},
    event::Event,
    guard::Guard,
};

/// Whether a handler guarded by `guards` should fire for `event`.
///
/// The list is a conjunction and short-circuits on the first unsatisfied
/// guard. An empty list always fires. Accessor errors propagate.
pub fn should_fire<E>(guards: &[Guard<E>], event: &E) -> Result<bool, AccessorError>
where
    E: Event + ?Sized,
{
    for guard in guards {
        if !guard.is_satisfied(event)? {
            return Ok(false);
        }
    }
    Ok(true)
}

impl<E: Event + ?Sized> Guard<E> {
    /// Evaluate this single guard against `event`.
    pub fn is_satisfied(&self, event: &E) -> Result<bool, AccessorError> {
        match self {
            Guard::Kind(kind) => Ok(event.is_kind(kind)),
            Guard::Predicate(name) => event.predicate(name),
            Guard::Fields(pairs) => {
                for (accessor, expected) in pairs {
                    let value = event.field(&accessor.name, &accessor.args)?;
                    if !expected.test(&value) {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Guard::Func(f) => Ok(f.call(event)),
            Guard::AnyOf(children) => {
                for child in children {
                    if child.is_satisfied(event)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

/// Validate a guard list before it is stored.
///
/// Walks nested `AnyOf` groups and rejects shapes that could only fail at
/// trigger time.
pub fn check_guards<E: ?Sized>(guards: &[Guard<E>]) -> Result<(), ConfigurationError> {
    guards.iter().try_for_each(check_guard)
}

fn check_guard<E: ?Sized>(guard: &Guard<E>) -> Result<(), ConfigurationError> {
    match guard {
        Guard::Kind(kind) if kind.name().is_empty() => {
            Err(ConfigurationError::EmptyName { what: "kind" })
        }
        Guard::Predicate(name) if name.is_empty() => {
            Err(ConfigurationError::EmptyName { what: "predicate" })
        }
        Guard::Fields(pairs) => {
            for (accessor, expected) in pairs {
                if accessor.name.is_empty() {
                    return Err(ConfigurationError::EmptyName { what: "accessor" });
                }
                if let crate::guard::Match::Pattern(pattern) = expected {
                    if let Some(err) = pattern.error() {
                        return Err(ConfigurationError::InvalidPattern {
                            pattern: pattern.as_str().to_owned(),
                            reason: err.to_string(),
                        });
                    }
                }
            }
            Ok(())
        }
        Guard::AnyOf(children) if children.is_empty() => Err(ConfigurationError::EmptyAnyOf),
        Guard::AnyOf(children) => check_guards(children),
        _ => Ok(()),
    }
}
