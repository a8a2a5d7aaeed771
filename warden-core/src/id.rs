//! Handler identifiers.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};
use uuid::Uuid;

/// The handle returned by registration, used to unregister a handler later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(Uuid);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Source of fresh handler ids.
///
/// Any generator works as long as it never hands out the same id twice to
/// one registry.
pub trait IdGenerator: Send + Sync + 'static {
    /// Produce a new, unique id.
    fn next_id(&self) -> HandlerId;
}

/// Random v4 UUIDs. The default generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> HandlerId {
        HandlerId(Uuid::new_v4())
    }
}

/// Monotonically increasing ids, useful when ids should be reproducible.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Start counting at zero.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> HandlerId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        HandlerId(Uuid::from_u64_pair(0, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids_are_distinct() {
        let ids = SequentialIds::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn test_random_ids_are_distinct() {
        let ids = RandomIds;
        let seen: HashSet<_> = (0..64).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 64);
    }
}
