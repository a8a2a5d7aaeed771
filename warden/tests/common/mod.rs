#![allow(dead_code)]

use std::collections::HashMap;
use tracing_subscriber::EnvFilter;
use warden::{AccessorError, Event, Value};

// ============================================================================
// Tracing
// ============================================================================

/// Route registry logs to the test harness. Set `RUST_LOG=warden_std=trace`
/// to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Test Event Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Message,
    Presence,
    Iq,
}

/// Mixed-type events, for type guards.
pub type AnyEvent = Box<dyn Event>;

#[derive(Debug, Clone, Default)]
pub struct Message {
    pub body: String,
    pub from: String,
    pub kind: String,
    pub attributes: HashMap<String, String>,
}

impl Message {
    pub fn chat(body: &str) -> Self {
        Self {
            body: body.to_owned(),
            kind: "chat".to_owned(),
            ..Self::default()
        }
    }

    pub fn normal(body: &str) -> Self {
        Self {
            body: body.to_owned(),
            kind: "normal".to_owned(),
            ..Self::default()
        }
    }

    pub fn sent_by(mut self, jid: &str) -> Self {
        self.from = jid.to_owned();
        self
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Event for Message {
    fn field(&self, name: &str, args: &[Value]) -> Result<Value, AccessorError> {
        match (name, args) {
            ("body", []) => Ok(Value::from(&self.body)),
            ("from", []) => Ok(Value::from(&self.from)),
            ("type", []) => Ok(Value::from(&self.kind)),
            ("chat?", []) => Ok(Value::from(self.kind == "chat")),
            ("attribute", [Value::Str(key)]) => {
                Ok(Value::from(self.attributes.get(key).map(String::as_str)))
            }
            ("attribute", _) => Err(AccessorError::arguments(name, "expected an attribute name")),
            ("body" | "from" | "type" | "chat?", _) => {
                Err(AccessorError::arguments(name, "takes no arguments"))
            }
            _ => Err(AccessorError::missing(name)),
        }
    }

    fn kinds(&self) -> &[&'static str] {
        &["stanza"]
    }
}

#[derive(Debug, Clone, Default)]
pub struct Presence {
    pub from: String,
    pub show: Option<String>,
}

impl Event for Presence {
    fn field(&self, name: &str, _args: &[Value]) -> Result<Value, AccessorError> {
        match name {
            "from" => Ok(Value::from(&self.from)),
            "show" => Ok(Value::from(self.show.clone())),
            "available?" => Ok(Value::from(self.show.is_none())),
            _ => Err(AccessorError::missing(name)),
        }
    }

    fn kinds(&self) -> &[&'static str] {
        &["stanza"]
    }
}

/// A type that declares no capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tick;

impl Event for Tick {
    fn field(&self, name: &str, _args: &[Value]) -> Result<Value, AccessorError> {
        Err(AccessorError::missing(name))
    }
}
