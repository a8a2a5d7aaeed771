//! Handler callbacks.
//!
//! A handler receives the triggering event by reference and answers with a
//! [`Flow`]. Plain closures returning anything [`IntoFlow`] are handlers.
//!
//! # Usage Patterns
//!
//! 1. **Closure**: `|event: &MyEvent| println!("{}", event.id)`
//! 2. **Signals**: `|_: &MyEvent| Flow::Pass`
//! 3. **Fallible**: `|e: &MyEvent| -> Result<(), MyError> { ... }`
//! 4. **Struct implementation**: `impl Handler<MyEvent> for MyHandler`

use crate::{
    error::BoxError,
    flow::{Flow, IntoFlow},
};

/// A callback registered against a classification.
///
/// Handlers run synchronously on the triggering thread and may themselves
/// register, unregister or trigger on the same registry.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle events of type `{E}`",
    label = "missing `Handler<{E}>` implementation",
    note = "Handlers are `Fn(&{E}) -> R` closures where `R: IntoFlow`, or implement `call` directly."
)]
pub trait Handler<E: ?Sized>: Send + Sync + 'static {
    /// Handle the event.
    fn call(&self, event: &E) -> Result<Flow, BoxError>;
}

// Blanket impl for closures
impl<F, E, R> Handler<E> for F
where
    E: ?Sized,
    R: IntoFlow,
    F: Fn(&E) -> R + Send + Sync + 'static,
{
    fn call(&self, event: &E) -> Result<Flow, BoxError> {
        (self)(event).into_flow()
    }
}
