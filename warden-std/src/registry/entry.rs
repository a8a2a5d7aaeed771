//! Registered handler entries.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};
use warden_core::{Guard, Handler, HandlerId};

/// A handler together with the guards that gate it.
///
/// Entries are never edited once stored; a bucket changes by swapping in a
/// new sequence. The only interior state is the one-shot claim flag.
pub(crate) struct HandlerEntry<E: ?Sized> {
    id: HandlerId,
    guards: Vec<Guard<E>>,
    handler: Box<dyn Handler<E>>,
    one_shot: bool,
    claimed: AtomicBool,
}

impl<E: ?Sized + 'static> HandlerEntry<E> {
    pub(crate) fn new<H: Handler<E>>(
        id: HandlerId,
        guards: Vec<Guard<E>>,
        handler: H,
        one_shot: bool,
    ) -> Self {
        Self {
            id,
            guards,
            handler: Box::new(handler),
            one_shot,
            claimed: AtomicBool::new(false),
        }
    }

    /// The id returned when this entry was registered.
    pub(crate) fn id(&self) -> HandlerId {
        self.id
    }

    /// The guard list, evaluated as a conjunction.
    pub(crate) fn guards(&self) -> &[Guard<E>] {
        &self.guards
    }

    /// Whether the entry is removed after its first successful invocation.
    pub(crate) fn is_one_shot(&self) -> bool {
        self.one_shot
    }

    pub(crate) fn handler(&self) -> &dyn Handler<E> {
        &*self.handler
    }

    /// Take the exclusive right to invoke a one-shot entry.
    ///
    /// Returns `None` if another trigger already holds or consumed it.
    pub(crate) fn try_claim(&self) -> Option<Claim<'_>> {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Claim {
                flag: &self.claimed,
                consumed: false,
            })
    }
}

impl<E: ?Sized> fmt::Debug for HandlerEntry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("id", &self.id)
            .field("guards", &self.guards)
            .field("one_shot", &self.one_shot)
            .finish_non_exhaustive()
    }
}

/// Exclusive invocation right on a one-shot entry.
///
/// Dropping an unconsumed claim releases it, so a handler that failed can be
/// selected again by a later trigger.
pub(crate) struct Claim<'a> {
    flag: &'a AtomicBool,
    consumed: bool,
}

impl Claim<'_> {
    /// Keep the flag set for good; the entry is about to be removed.
    pub(crate) fn consume(mut self) {
        self.consumed = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.consumed {
            self.flag.store(false, Ordering::Release);
        }
    }
}
