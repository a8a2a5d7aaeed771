//! The guard DSL.
//!
//! A handler's guard list is an implicit conjunction: the handler fires only
//! if every guard is satisfied. Disjunction is spelled with [`Guard::AnyOf`].
//!
//! ```rust
//! use warden_core::{Guard, Kind, Match};
//! # use warden_core::{AccessorError, Event, Value};
//! # struct Stanza;
//! # impl Event for Stanza {
//! #     fn field(&self, name: &str, _: &[Value]) -> Result<Value, AccessorError> {
//! #         Err(AccessorError::missing(name))
//! #     }
//! # }
//!
//! let guards: Vec<Guard<Stanza>> = vec![
//!     Guard::kind(Kind::of::<Stanza>()),
//!     Guard::fields([("type", Match::one_of(["result", "error"]))]),
//!     Guard::any_of([
//!         Guard::field("body", Match::pattern("^exit")),
//!         Guard::predicate("chat?"),
//!     ]),
//! ];
//! # let _ = guards;
//! ```

use crate::{event::Kind, value::Value};
use regex::Regex;
use std::{borrow::Cow, fmt, sync::Arc};

/// One element of a handler's guard list.
pub enum Guard<E: ?Sized> {
    /// Satisfied iff the event is of the given type or declares the capability.
    Kind(Kind),
    /// Satisfied iff the named zero-argument accessor returns a truthy value.
    Predicate(Cow<'static, str>),
    /// Satisfied iff every `(accessor, expected)` pair matches, checked in order.
    Fields(Vec<(Accessor, Match)>),
    /// Satisfied iff the closure returns true.
    Func(GuardFn<E>),
    /// Satisfied iff at least one child guard is satisfied.
    AnyOf(Vec<Guard<E>>),
}

impl<E: ?Sized> Guard<E> {
    /// A type or capability guard.
    pub fn kind(kind: Kind) -> Self {
        Guard::Kind(kind)
    }

    /// A boolean accessor guard.
    pub fn predicate(name: impl Into<Cow<'static, str>>) -> Self {
        Guard::Predicate(name.into())
    }

    /// A field match group with a single pair.
    pub fn field(accessor: impl Into<Accessor>, expected: impl Into<Match>) -> Self {
        Guard::Fields(vec![(accessor.into(), expected.into())])
    }

    /// A field match group; all pairs must match.
    pub fn fields<I, A, M>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, M)>,
        A: Into<Accessor>,
        M: Into<Match>,
    {
        Guard::Fields(
            pairs
                .into_iter()
                .map(|(a, m)| (a.into(), m.into()))
                .collect(),
        )
    }

    /// A closure guard.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Guard::Func(GuardFn(Arc::new(f)))
    }

    /// A disjunction over `children`.
    pub fn any_of(children: impl IntoIterator<Item = Guard<E>>) -> Self {
        Guard::AnyOf(children.into_iter().collect())
    }
}

impl<E: ?Sized> Clone for Guard<E> {
    fn clone(&self) -> Self {
        match self {
            Guard::Kind(k) => Guard::Kind(k.clone()),
            Guard::Predicate(n) => Guard::Predicate(n.clone()),
            Guard::Fields(pairs) => Guard::Fields(pairs.clone()),
            Guard::Func(f) => Guard::Func(f.clone()),
            Guard::AnyOf(children) => Guard::AnyOf(children.clone()),
        }
    }
}

/// Structural equality. Closures are equal only when they are the same `Arc`.
impl<E: ?Sized> PartialEq for Guard<E> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Guard::Kind(a), Guard::Kind(b)) => a == b,
            (Guard::Predicate(a), Guard::Predicate(b)) => a == b,
            (Guard::Fields(a), Guard::Fields(b)) => a == b,
            (Guard::Func(a), Guard::Func(b)) => a == b,
            (Guard::AnyOf(a), Guard::AnyOf(b)) => a == b,
            _ => false,
        }
    }
}

impl<E: ?Sized> fmt::Debug for Guard<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Kind(k) => f.debug_tuple("Kind").field(k).finish(),
            Guard::Predicate(n) => f.debug_tuple("Predicate").field(n).finish(),
            Guard::Fields(pairs) => f.debug_tuple("Fields").field(pairs).finish(),
            Guard::Func(_) => f.write_str("Func(..)"),
            Guard::AnyOf(children) => f.debug_tuple("AnyOf").field(children).finish(),
        }
    }
}

/// A shared guard closure.
pub struct GuardFn<E: ?Sized>(pub(crate) Arc<dyn Fn(&E) -> bool + Send + Sync>);

impl<E: ?Sized> GuardFn<E> {
    pub(crate) fn call(&self, event: &E) -> bool {
        (self.0)(event)
    }
}

impl<E: ?Sized> Clone for GuardFn<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E: ?Sized> PartialEq for GuardFn<E> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// An accessor name plus the fixed arguments it is invoked with.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    /// The accessor name passed to [`Event::field`](crate::Event::field).
    pub name: Cow<'static, str>,
    /// Fixed arguments, usually empty.
    pub args: Vec<Value>,
}

impl Accessor {
    /// A zero-argument accessor.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a fixed argument.
    pub fn arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl From<&'static str> for Accessor {
    fn from(name: &'static str) -> Self {
        Accessor::new(name)
    }
}

impl From<String> for Accessor {
    fn from(name: String) -> Self {
        Accessor::new(name)
    }
}

/// The expected side of a field match.
///
/// Numbers compare by value across `Int` and `Float`, so `Match::exact(1)`
/// accepts an accessor result of `1.0`. A list given where a [`Match`] is
/// expected becomes a membership test, not a comparison against the list.
#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    /// The stringified accessor result must match the pattern.
    Pattern(Pattern),
    /// The accessor result must be one of these values.
    OneOf(Vec<Value>),
    /// The accessor result must equal this value.
    Exact(Value),
}

impl Match {
    /// A regular expression match. An invalid pattern is reported when the
    /// guard is registered.
    pub fn pattern(source: impl Into<String>) -> Self {
        Match::Pattern(Pattern::new(source))
    }

    /// A membership match.
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Match::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// An equality match. A `Value::List` becomes a membership match.
    pub fn exact(value: impl Into<Value>) -> Self {
        Match::from(value.into())
    }

    /// Test an accessor result against this expectation.
    pub fn test(&self, value: &Value) -> bool {
        match self {
            Match::Pattern(p) => p.is_match(&value.to_string()),
            Match::OneOf(values) => values.iter().any(|v| same_value(v, value)),
            Match::Exact(expected) => same_value(expected, value),
        }
    }
}

/// Equality with `Int` and `Float` compared numerically.
fn same_value(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => *i as f64 == *f,
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_value(x, y))
        }
        _ => expected == actual,
    }
}

impl From<Value> for Match {
    fn from(v: Value) -> Self {
        match v {
            Value::List(items) => Match::OneOf(items),
            other => Match::Exact(other),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Match {
    fn from(items: Vec<T>) -> Self {
        Match::one_of(items)
    }
}

impl From<&str> for Match {
    fn from(v: &str) -> Self {
        Match::Exact(v.into())
    }
}

impl From<String> for Match {
    fn from(v: String) -> Self {
        Match::Exact(v.into())
    }
}

impl From<bool> for Match {
    fn from(v: bool) -> Self {
        Match::Exact(v.into())
    }
}

impl From<i32> for Match {
    fn from(v: i32) -> Self {
        Match::Exact(v.into())
    }
}

impl From<i64> for Match {
    fn from(v: i64) -> Self {
        Match::Exact(v.into())
    }
}

impl From<Regex> for Match {
    fn from(re: Regex) -> Self {
        Match::Pattern(Pattern {
            source: re.as_str().to_owned(),
            compiled: Ok(re),
        })
    }
}

/// A lazily validated regular expression.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    compiled: Result<Regex, regex::Error>,
}

impl Pattern {
    /// Compile `source`. Compilation errors are kept until validation.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source);
        Self { source, compiled }
    }

    /// The pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compile error, if the pattern is invalid.
    pub fn error(&self) -> Option<&regex::Error> {
        self.compiled.as_ref().err()
    }

    /// Whether `haystack` matches. An invalid pattern matches nothing.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.compiled
            .as_ref()
            .is_ok_and(|re| re.is_match(haystack))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}
