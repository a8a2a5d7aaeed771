//! Dispatch control signals and return-value conversion.

use crate::error::BoxError;

/// What a handler asks the trigger walk to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// The handler ran normally. A non-broadcast trigger stops here.
    #[default]
    Handled,
    /// Treat this handler as not having matched; try the next candidate.
    Pass,
    /// Stop the whole walk now, reporting that a handler was called.
    Halt,
}

/// Trait for converting a handler's return value into a [`Flow`].
///
/// # Default Implementations
///
/// - `()` → `Handled`
/// - `bool` → `Handled` (the value itself is ignored)
/// - `Flow` → As is
/// - `Option<T>` → inner conversion, `None` → `Handled`
/// - `Result<T, E>` → Delegates to inner `T` or propagates the error
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a Warden handler",
    label = "missing `IntoFlow` implementation",
    note = "Return `()`, `bool`, `Flow`, or a `Result` of one of these."
)]
pub trait IntoFlow {
    /// Convert the output into a control signal or a handler error.
    fn into_flow(self) -> Result<Flow, BoxError>;
}

impl IntoFlow for () {
    fn into_flow(self) -> Result<Flow, BoxError> {
        Ok(Flow::Handled)
    }
}

// First match wins regardless of what the handler returned.
impl IntoFlow for bool {
    fn into_flow(self) -> Result<Flow, BoxError> {
        Ok(Flow::Handled)
    }
}

impl IntoFlow for Flow {
    fn into_flow(self) -> Result<Flow, BoxError> {
        Ok(self)
    }
}

impl<T: IntoFlow> IntoFlow for Option<T> {
    fn into_flow(self) -> Result<Flow, BoxError> {
        match self {
            Some(t) => t.into_flow(),
            None => Ok(Flow::Handled),
        }
    }
}

impl<T, E> IntoFlow for Result<T, E>
where
    T: IntoFlow,
    E: Into<BoxError>,
{
    fn into_flow(self) -> Result<Flow, BoxError> {
        match self {
            Ok(t) => t.into_flow(),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_value_is_ignored() {
        assert_eq!(().into_flow().unwrap(), Flow::Handled);
        assert_eq!(false.into_flow().unwrap(), Flow::Handled);
        assert_eq!(true.into_flow().unwrap(), Flow::Handled);
        assert_eq!(None::<Flow>.into_flow().unwrap(), Flow::Handled);
    }

    #[test]
    fn test_signals_pass_through() {
        assert_eq!(Flow::Pass.into_flow().unwrap(), Flow::Pass);
        assert_eq!(Ok::<_, BoxError>(Flow::Halt).into_flow().unwrap(), Flow::Halt);
    }

    #[test]
    fn test_result_error_becomes_handler_error() {
        let out: Result<(), String> = Err("Oops".into());
        let err = out.into_flow().unwrap_err();
        assert_eq!(err.to_string(), "Oops");
    }
}
