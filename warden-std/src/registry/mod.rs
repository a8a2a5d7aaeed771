//! The handler registry.
//!
//! Handlers are grouped by [`Classification`], then by priority (higher runs
//! first), then kept in registration order. Every mutation goes through the
//! optimistic bucket update in [`bucket`]; locks on the outer maps are held
//! only for lookups, insertions and pruning, never across a handler call.
//!
//! Buckets and channels left empty by a removal are dropped from their maps.
//! A push holds the enclosing map's read lock, so it can never land in a
//! bucket that pruning has just detached.

mod bucket;
mod entry;

pub(crate) use bucket::Bucket;
pub(crate) use entry::HandlerEntry;

use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    hash::Hash,
    marker::PhantomData,
    sync::Arc,
};
use tracing::{debug, trace};
use warden_core::{
    check_guards, Guard, Handler, HandlerId, IdGenerator, RandomIds, WardenError,
};

/// The channel a handler is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification<K> {
    /// The wildcard: considered for every trigger, after the named channel.
    All,
    /// A named channel.
    Only(K),
}

impl<K> From<K> for Classification<K> {
    fn from(key: K) -> Self {
        Classification::Only(key)
    }
}

/// Per-handler registration options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Higher priorities are tried first. Default is 0.
    pub priority: i32,
    /// Remove the handler after it fires successfully once.
    pub one_shot: bool,
}

impl HandlerOptions {
    /// Default options: priority 0, persistent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set whether the handler is one-shot.
    pub fn with_one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
    }
}

/// All priority buckets of one classification.
pub(crate) struct Channel<E: ?Sized> {
    buckets: RwLock<BTreeMap<i32, Arc<Bucket<E>>>>,
}

impl<E: ?Sized + 'static> Channel<E> {
    fn new() -> Self {
        Self {
            buckets: RwLock::new(BTreeMap::new()),
        }
    }

    /// Append `entry` to the bucket for `priority`, creating it if needed.
    fn push(&self, priority: i32, entry: Arc<HandlerEntry<E>>) {
        {
            let buckets = self.buckets.read();
            if let Some(bucket) = buckets.get(&priority) {
                bucket.push(entry);
                return;
            }
        }
        self.buckets
            .write()
            .entry(priority)
            .or_insert_with(|| Arc::new(Bucket::new()))
            .push(entry);
    }

    /// Buckets from highest to lowest priority.
    pub(crate) fn buckets(&self) -> Vec<Arc<Bucket<E>>> {
        self.buckets.read().values().rev().cloned().collect()
    }

    /// Drop empty buckets. Returns whether the channel is now empty.
    fn prune(&self) -> bool {
        let mut buckets = self.buckets.write();
        buckets.retain(|_, bucket| !bucket.load().is_empty());
        buckets.is_empty()
    }
}

struct Channels<K, E: ?Sized> {
    named: HashMap<K, Arc<Channel<E>>>,
    wildcard: Option<Arc<Channel<E>>>,
}

impl<K: Eq + Hash, E: ?Sized> Channels<K, E> {
    fn get(&self, classification: &Classification<K>) -> Option<&Arc<Channel<E>>> {
        match classification {
            Classification::All => self.wildcard.as_ref(),
            Classification::Only(key) => self.named.get(key),
        }
    }

    fn remove(&mut self, classification: &Classification<K>) {
        match classification {
            Classification::All => self.wildcard = None,
            Classification::Only(key) => {
                self.named.remove(key);
            }
        }
    }
}

impl<K, E: ?Sized> Default for Channels<K, E> {
    fn default() -> Self {
        Self {
            named: HashMap::new(),
            wildcard: None,
        }
    }
}

/// A concurrent, guard-filtered handler registry.
///
/// `K` is the classification key, `E` the event type (which may be
/// `dyn Event`). All methods take `&self`; share the registry through an
/// `Arc` or embed it in the owning object.
///
/// # Example
///
/// ```rust
/// use warden_std::Registry;
/// use warden_std::testing::MockEvent;
/// use warden_core::{Flow, Guard};
///
/// let registry: Registry<&str, MockEvent> = Registry::new();
/// registry
///     .register("message", [Guard::field("body", "exit")], |_: &MockEvent| Flow::Handled)
///     .unwrap();
///
/// let event = MockEvent::new().with_field("body", "exit");
/// assert!(registry.trigger(&"message", &event).unwrap());
/// ```
pub struct Registry<K, E: ?Sized> {
    channels: RwLock<Channels<K, E>>,
    ids: Box<dyn IdGenerator>,
}

impl<K, E> Registry<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: ?Sized + 'static,
{
    /// Create an empty registry with random handler ids.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a registry.
    pub fn builder() -> RegistryBuilder<K, E> {
        RegistryBuilder::new()
    }

    /// Register a persistent handler at priority 0.
    pub fn register<G, H>(
        &self,
        classification: impl Into<Classification<K>>,
        guards: G,
        handler: H,
    ) -> Result<HandlerId, WardenError>
    where
        G: IntoIterator<Item = Guard<E>>,
        H: Handler<E>,
    {
        self.register_with_options(classification, HandlerOptions::new(), guards, handler)
    }

    /// Register a persistent handler at `priority`.
    pub fn register_with_priority<G, H>(
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
        let options = HandlerOptions::new().with_priority(priority);
        self.register_with_options(classification, options, guards, handler)
    }

    /// Register a handler that is removed after it fires successfully once.
    pub fn register_one_shot<G, H>(
        &self,
        classification: impl Into<Classification<K>>,
        guards: G,
        handler: H,
    ) -> Result<HandlerId, WardenError>
    where
        G: IntoIterator<Item = Guard<E>>,
        H: Handler<E>,
    {
        let options = HandlerOptions::new().with_one_shot(true);
        self.register_with_options(classification, options, guards, handler)
    }

    /// Register a handler with explicit options.
    ///
    /// Guards are validated first; on a [`WardenError::Configuration`] nothing
    /// is stored.
    pub fn register_with_options<G, H>(
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
        let guards: Vec<Guard<E>> = guards.into_iter().collect();
        check_guards(&guards)?;

        let classification = classification.into();
        let id = self.ids.next_id();
        let entry = Arc::new(HandlerEntry::new(id, guards, handler, options.one_shot));

        self.insert(&classification, options.priority, entry);

        debug!(
            handler_id = %id,
            ?classification,
            priority = options.priority,
            one_shot = options.one_shot,
            "registered handler"
        );
        Ok(id)
    }

    /// Remove the handler `id` from `classification`.
    ///
    /// Returns whether anything was removed; an unknown id is not an error.
    pub fn unregister(&self, classification: impl Into<Classification<K>>, id: HandlerId) -> bool {
        let classification = classification.into();
        let Some(channel) = self.channel(&classification) else {
            return false;
        };
        let removed = channel.buckets().iter().any(|bucket| bucket.remove(id));
        if removed {
            self.prune(&classification);
            debug!(handler_id = %id, ?classification, "unregistered handler");
        }
        removed
    }

    /// Remove every handler in `classification` whose guard list equals `guards`.
    ///
    /// Returns how many handlers were removed.
    pub fn clear(&self, classification: impl Into<Classification<K>>, guards: &[Guard<E>]) -> usize {
        let classification = classification.into();
        let Some(channel) = self.channel(&classification) else {
            return 0;
        };
        let removed = channel
            .buckets()
            .iter()
            .map(|bucket| bucket.retain_unless(|entry| entry.guards() == guards))
            .sum();
        if removed > 0 {
            self.prune(&classification);
        }
        debug!(?classification, removed, "cleared handlers by guard signature");
        removed
    }

    /// Drop every classification at once.
    pub fn clear_all(&self) {
        *self.channels.write() = Channels::default();
        debug!("cleared all handlers");
    }

    /// Whether `id` is currently registered under `classification`.
    pub fn is_registered(&self, classification: impl Into<Classification<K>>, id: HandlerId) -> bool {
        self.channel(&classification.into())
            .is_some_and(|channel| channel.buckets().iter().any(|b| b.contains(id)))
    }

    fn channel(&self, classification: &Classification<K>) -> Option<Arc<Channel<E>>> {
        self.channels.read().get(classification).cloned()
    }

    fn insert(&self, classification: &Classification<K>, priority: i32, entry: Arc<HandlerEntry<E>>) {
        {
            let channels = self.channels.read();
            if let Some(channel) = channels.get(classification) {
                channel.push(priority, entry);
                return;
            }
        }
        let mut channels = self.channels.write();
        let channel = match classification {
            Classification::All => channels
                .wildcard
                .get_or_insert_with(|| Arc::new(Channel::new())),
            Classification::Only(key) => channels
                .named
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Channel::new())),
        };
        channel.push(priority, entry);
    }

    /// Drop the empty buckets of `classification`, and the channel itself
    /// once nothing is left in it.
    pub(crate) fn prune(&self, classification: &Classification<K>) {
        let mut channels = self.channels.write();
        let emptied = channels
            .get(classification)
            .is_some_and(|channel| channel.prune());
        if emptied {
            channels.remove(classification);
            trace!(?classification, "dropped empty channel");
        }
    }

    /// The named channel for `key` followed by the wildcard channel.
    pub(crate) fn channels_for(&self, key: &K) -> [Option<Arc<Channel<E>>>; 2] {
        let channels = self.channels.read();
        [channels.named.get(key).cloned(), channels.wildcard.clone()]
    }
}

impl<K, E> Default for Registry<K, E>
where
    K: Eq + Hash + Clone + Debug,
    E: ?Sized + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a [`Registry`].
///
/// # Example
/// ```rust
/// use warden_std::Registry;
/// use warden_std::testing::MockEvent;
/// use warden_core::SequentialIds;
///
/// let registry: Registry<&str, MockEvent> = Registry::builder()
///     .id_generator(SequentialIds::new())
///     .build();
/// # let _ = registry;
/// ```
pub struct RegistryBuilder<K, E: ?Sized> {
    ids: Box<dyn IdGenerator>,
    _registry: PhantomData<fn() -> Registry<K, E>>,
}

impl<K, E: ?Sized> RegistryBuilder<K, E> {
    /// Create a builder using random UUIDs for handler ids.
    pub fn new() -> Self {
        Self {
            ids: Box::new(RandomIds),
            _registry: PhantomData,
        }
    }

    /// Use `ids` to mint handler ids.
    pub fn id_generator(mut self, ids: impl IdGenerator) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Build the empty registry.
    pub fn build(self) -> Registry<K, E> {
        Registry {
            channels: RwLock::new(Channels::default()),
            ids: self.ids,
        }
    }
}

impl<K, E: ?Sized> Default for RegistryBuilder<K, E> {
    fn default() -> Self {
        Self::new()
    }
}
