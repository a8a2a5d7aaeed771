//! The trigger protocol.
//!
//! A trigger snapshots the candidates for a classification (named channel
//! first, then the wildcard channel, each from highest to lowest priority)
//! and walks them in order:
//!
//! - a candidate whose guards reject the event is skipped;
//! - `Flow::Halt` ends the walk, reporting a call;
//! - `Flow::Pass` moves on as if the candidate had not matched;
//! - `Flow::Handled` ends a normal trigger and continues a broadcast one.
//!
//! A handler error aborts a normal trigger. In broadcast mode it goes to the
//! `on_error` callback instead and the walk continues. Guard evaluation is
//! held to the same rule: an accessor error or a panic inside a guard is
//! reported like a handler failure.

use crate::registry::{Bucket, Classification, HandlerEntry, Registry};
use std::{
    any::Any,
    fmt::{self, Debug},
    hash::Hash,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{debug, trace};
use warden_core::{should_fire, Event, Flow, WardenError};

/// Options for a single trigger call.
#[derive(Default)]
pub struct TriggerOptions<'a> {
    broadcast: bool,
    on_error: Option<Box<dyn Fn(&WardenError) + 'a>>,
}

impl<'a> TriggerOptions<'a> {
    /// Stop at the first handler that fires (the default).
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every matching handler, isolating their failures.
    pub fn broadcast() -> Self {
        Self {
            broadcast: true,
            on_error: None,
        }
    }

    /// Receive each handler error raised during a broadcast trigger.
    ///
    /// Without a callback, broadcast errors are dropped.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&WardenError) + 'a,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Route an error according to the mode: hand it back in normal mode,
    /// report it and carry on in broadcast mode.
    fn absorb(&self, err: WardenError) -> Result<(), WardenError> {
        if !self.broadcast {
            return Err(err);
        }
        match &self.on_error {
            Some(report) => report(&err),
            None => debug!(error = %err, "dropping handler error in broadcast trigger"),
        }
        Ok(())
    }
}

impl Debug for TriggerOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerOptions")
            .field("broadcast", &self.broadcast)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

struct Candidate<E: ?Sized> {
    bucket: Arc<Bucket<E>>,
    entry: Arc<HandlerEntry<E>>,
    wildcard: bool,
}

impl<K, E> Registry<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: Event + ?Sized,
{
    /// Trigger the first matching handler for `key`.
    ///
    /// Returns whether any handler was invoked. No handlers at all is not an
    /// error.
    pub fn trigger(&self, key: &K, event: &E) -> Result<bool, WardenError> {
        self.trigger_with(key, event, &TriggerOptions::new())
    }

    /// Trigger with explicit options.
    pub fn trigger_with(
        &self,
        key: &K,
        event: &E,
        options: &TriggerOptions<'_>,
    ) -> Result<bool, WardenError> {
        let candidates = self.candidates(key);
        if candidates.is_empty() {
            trace!(classification = ?key, "no handlers to trigger");
            return Ok(false);
        }

        let mut called = false;
        for Candidate {
            bucket,
            entry,
            wildcard,
        } in &candidates
        {
            let fires = match evaluate(entry, event) {
                Ok(fires) => fires,
                Err(err) => {
                    options.absorb(err)?;
                    continue;
                }
            };
            if !fires {
                continue;
            }

            // Losing the claim means a concurrent trigger is already running
            // this one-shot entry.
            let claim = if entry.is_one_shot() {
                match entry.try_claim() {
                    Some(claim) => Some(claim),
                    None => continue,
                }
            } else {
                None
            };

            called = true;
            let flow = match invoke(entry, event) {
                Ok(flow) => flow,
                Err(err) => {
                    drop(claim);
                    options.absorb(err)?;
                    continue;
                }
            };

            if let Some(claim) = claim {
                claim.consume();
                if bucket.remove(entry.id()) {
                    let classification = if *wildcard {
                        Classification::All
                    } else {
                        Classification::Only(key.clone())
                    };
                    self.prune(&classification);
                }
                debug!(handler_id = %entry.id(), classification = ?key, "one-shot handler fired");
            }

            trace!(handler_id = %entry.id(), ?flow, "handler invoked");
            match flow {
                Flow::Halt => return Ok(true),
                Flow::Pass => continue,
                Flow::Handled if !options.broadcast => return Ok(true),
                Flow::Handled => continue,
            }
        }
        Ok(called)
    }

    /// Snapshot the candidate list for `key`.
    ///
    /// Every bucket is read as one immutable sequence, so writers racing with
    /// this copy can only make it miss or include whole registrations.
    fn candidates(&self, key: &K) -> Vec<Candidate<E>> {
        let mut candidates = Vec::new();
        let [named, all] = self.channels_for(key);
        for (channel, wildcard) in [(named, false), (all, true)] {
            let Some(channel) = channel else { continue };
            for bucket in channel.buckets() {
                let entries = bucket.load();
                candidates.extend(entries.iter().map(|entry| Candidate {
                    bucket: Arc::clone(&bucket),
                    entry: Arc::clone(entry),
                    wildcard,
                }));
            }
        }
        candidates
    }
}

/// Evaluate the entry's guards, turning a panic into an error.
fn evaluate<E: Event + ?Sized>(entry: &HandlerEntry<E>, event: &E) -> Result<bool, WardenError> {
    match panic::catch_unwind(AssertUnwindSafe(|| should_fire(entry.guards(), event))) {
        Ok(result) => result.map_err(WardenError::from),
        Err(payload) => Err(WardenError::Panicked {
            id: entry.id(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

/// Call the handler, turning a panic into an error.
fn invoke<E: ?Sized + 'static>(entry: &HandlerEntry<E>, event: &E) -> Result<Flow, WardenError> {
    match panic::catch_unwind(AssertUnwindSafe(|| entry.handler().call(event))) {
        Ok(Ok(flow)) => Ok(flow),
        Ok(Err(source)) => Err(WardenError::Handler {
            id: entry.id(),
            source,
        }),
        Err(payload) => Err(WardenError::Panicked {
            id: entry.id(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
