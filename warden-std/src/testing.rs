//! Testing utilities for Warden.
//!
//! This module provides utilities to make testing guards and handlers easier.
//!
//! # Features
//!
//! - [`MockEvent`]: A map-backed event that counts accessor reads
//! - [`CallLog`]: A shared, ordered record of handler invocations
//! - [`RecordingHandler`]: A handler that logs its label and returns a scripted outcome

use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use warden_core::{AccessorError, BoxError, Event, Flow, Handler, Value};

// ============================================================================
// Mock Event
// ============================================================================

/// A map-backed event for exercising guards.
///
/// Fields are answered by name. The accessor `[]` takes one argument and
/// looks it up as a key, which is handy for accessor-with-arguments guards.
/// Every read is counted, so tests can assert short-circuiting.
///
/// # Example
///
/// ```rust
/// use warden_std::testing::MockEvent;
/// use warden_core::{Event, Value};
///
/// let event = MockEvent::new().with_field("body", "exit").with_kind("message");
/// assert_eq!(event.field("body", &[]).unwrap(), Value::from("exit"));
/// assert_eq!(event.reads("body"), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockEvent {
    fields: HashMap<String, Value>,
    kinds: Vec<&'static str>,
    reads: Mutex<HashMap<String, usize>>,
}

impl MockEvent {
    /// An event with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Declare a named capability.
    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kinds.push(kind);
        self
    }

    /// How many times the accessor `name` has been read.
    pub fn reads(&self, name: &str) -> usize {
        self.reads.lock().get(name).copied().unwrap_or(0)
    }
}

impl Event for MockEvent {
    fn field(&self, name: &str, args: &[Value]) -> Result<Value, AccessorError> {
        *self.reads.lock().entry(name.to_owned()).or_default() += 1;

        if name == "[]" {
            let [Value::Str(key)] = args else {
                return Err(AccessorError::arguments(name, "expected one string key"));
            };
            return Ok(self.fields.get(key).cloned().unwrap_or_default());
        }
        if !args.is_empty() {
            return Err(AccessorError::arguments(name, "field takes no arguments"));
        }
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| AccessorError::missing(name))
    }

    fn kinds(&self) -> &[&'static str] {
        &self.kinds
    }
}

// ============================================================================
// Call Log
// ============================================================================

/// An ordered record of labels, shared between handlers and the test.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label.
    pub fn record(&self, label: impl Into<String>) {
        self.calls.lock().push(label.into());
    }

    /// All labels in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// How many times `label` was recorded.
    pub fn count(&self, label: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == label).count()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

// ============================================================================
// Recording Handler
// ============================================================================

#[derive(Debug, Clone)]
enum Outcome {
    Flow(Flow),
    Fail(String),
    Panic(String),
}

/// A handler that records its label in a [`CallLog`] and then returns a
/// scripted outcome.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// registry.register(Topic::Chat, [], RecordingHandler::new("first", &log).returning(Flow::Pass))?;
/// registry.register(Topic::Chat, [], RecordingHandler::new("second", &log))?;
/// registry.trigger(&Topic::Chat, &event)?;
/// assert_eq!(log.calls(), ["first", "second"]);
/// ```
#[derive(Debug, Clone)]
pub struct RecordingHandler {
    label: String,
    log: CallLog,
    outcome: Outcome,
}

impl RecordingHandler {
    /// A handler that records `label` and returns `Flow::Handled`.
    pub fn new(label: impl Into<String>, log: &CallLog) -> Self {
        Self {
            label: label.into(),
            log: log.clone(),
            outcome: Outcome::Flow(Flow::Handled),
        }
    }

    /// Return `flow` after recording.
    pub fn returning(mut self, flow: Flow) -> Self {
        self.outcome = Outcome::Flow(flow);
        self
    }

    /// Fail with `message` after recording.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.outcome = Outcome::Fail(message.into());
        self
    }

    /// Panic with `message` after recording.
    pub fn panicking(mut self, message: impl Into<String>) -> Self {
        self.outcome = Outcome::Panic(message.into());
        self
    }
}

impl<E: ?Sized> Handler<E> for RecordingHandler {
    fn call(&self, _event: &E) -> Result<Flow, BoxError> {
        self.log.record(self.label.clone());
        match &self.outcome {
            Outcome::Flow(flow) => Ok(*flow),
            Outcome::Fail(message) => Err(message.clone().into()),
            Outcome::Panic(message) => panic!("{message}"),
        }
    }
}
