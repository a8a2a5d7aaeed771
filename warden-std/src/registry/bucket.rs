//! Priority buckets with optimistic, copy-on-write updates.
//!
//! A bucket publishes an immutable snapshot of its entries. Readers clone the
//! snapshot pointer and iterate it without holding anything. Writers build a
//! new sequence from the snapshot they read and publish it only if the bucket
//! still points at that same snapshot; otherwise they re-read and retry.

use super::entry::HandlerEntry;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;
use warden_core::HandlerId;

/// An immutable sequence of entries in registration order.
pub(crate) type Entries<E> = Arc<[Arc<HandlerEntry<E>>]>;

pub(crate) struct Bucket<E: ?Sized> {
    // Held only for the pointer compare-and-store, never while building a
    // new sequence or running a handler.
    current: Mutex<Entries<E>>,
}

impl<E: ?Sized + 'static> Bucket<E> {
    pub(crate) fn new() -> Self {
        Self {
            current: Mutex::new(Arc::from(Vec::new())),
        }
    }

    /// The current snapshot.
    pub(crate) fn load(&self) -> Entries<E> {
        Arc::clone(&*self.current.lock())
    }

    /// Publish `next` iff the bucket still holds `expected`.
    fn compare_and_swap(&self, expected: &Entries<E>, next: Entries<E>) -> bool {
        let mut current = self.current.lock();
        if Arc::ptr_eq(&*current, expected) {
            *current = next;
            true
        } else {
            false
        }
    }

    /// Apply `f` to the latest snapshot until the result is published.
    ///
    /// `f` returns `None` when the snapshot needs no change. Returns whether
    /// a new sequence was published.
    pub(crate) fn update<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&[Arc<HandlerEntry<E>>]) -> Option<Vec<Arc<HandlerEntry<E>>>>,
    {
        let mut attempt = 0usize;
        loop {
            let snapshot = self.load();
            let Some(next) = f(&snapshot) else {
                return false;
            };
            if self.compare_and_swap(&snapshot, Arc::from(next)) {
                return true;
            }
            attempt += 1;
            trace!(attempt, "bucket changed underneath update, retrying");
        }
    }

    pub(crate) fn push(&self, entry: Arc<HandlerEntry<E>>) {
        self.update(|entries| {
            let mut next = Vec::with_capacity(entries.len() + 1);
            next.extend_from_slice(entries);
            next.push(Arc::clone(&entry));
            Some(next)
        });
    }

    /// Remove the entry with `id`. Absent ids are a no-op.
    pub(crate) fn remove(&self, id: HandlerId) -> bool {
        self.retain_unless(|entry| entry.id() == id) > 0
    }

    /// Remove every entry matching `pred`, returning how many went.
    pub(crate) fn retain_unless<P>(&self, pred: P) -> usize
    where
        P: Fn(&HandlerEntry<E>) -> bool,
    {
        let mut removed = 0;
        self.update(|entries| {
            let next: Vec<_> = entries.iter().filter(|e| !pred(e)).cloned().collect();
            removed = entries.len() - next.len();
            (removed > 0).then_some(next)
        });
        removed
    }

    pub(crate) fn contains(&self, id: HandlerId) -> bool {
        self.load().iter().any(|entry| entry.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use warden_core::{Flow, IdGenerator, SequentialIds};

    struct Nothing;

    fn entry(ids: &SequentialIds) -> Arc<HandlerEntry<Nothing>> {
        Arc::new(HandlerEntry::new(
            ids.next_id(),
            Vec::new(),
            |_: &Nothing| Flow::Handled,
            false,
        ))
    }

    #[test]
    fn test_push_preserves_order() {
        let ids = SequentialIds::new();
        let bucket = Bucket::new();
        let a = entry(&ids);
        let b = entry(&ids);
        bucket.push(Arc::clone(&a));
        bucket.push(Arc::clone(&b));
        let order: Vec<_> = bucket.load().iter().map(|e| e.id()).collect();
        assert_eq!(order, vec![a.id(), b.id()]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let ids = SequentialIds::new();
        let bucket = Bucket::new();
        let a = entry(&ids);
        bucket.push(Arc::clone(&a));
        assert!(bucket.remove(a.id()));
        assert!(!bucket.remove(a.id()));
        assert!(bucket.load().is_empty());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_writes() {
        let ids = SequentialIds::new();
        let bucket = Bucket::new();
        bucket.push(entry(&ids));
        let before = bucket.load();
        bucket.push(entry(&ids));
        assert_eq!(before.len(), 1);
        assert_eq!(bucket.load().len(), 2);
    }

    #[test]
    fn test_conflicting_update_retries() {
        let ids = SequentialIds::new();
        let bucket = Bucket::new();
        let intruder = entry(&ids);
        let mine = entry(&ids);
        let mut first = true;
        let published = bucket.update(|entries| {
            if first {
                // A concurrent writer lands between our read and our swap.
                first = false;
                bucket.push(Arc::clone(&intruder));
            }
            let mut next = entries.to_vec();
            next.push(Arc::clone(&mine));
            Some(next)
        });
        assert!(published);
        let order: Vec<_> = bucket.load().iter().map(|e| e.id()).collect();
        assert_eq!(order, vec![intruder.id(), mine.id()]);
    }

    #[test]
    fn test_concurrent_pushes_are_not_lost() {
        let ids = SequentialIds::new();
        let bucket = Bucket::new();
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..200 {
                        bucket.push(entry(&ids));
                    }
                });
            }
        });
        assert_eq!(bucket.load().len(), 1600);
    }
}
