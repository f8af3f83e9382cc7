//! The step invoker
//!
//! Every combinator funnels through [invoke]: check the arguments,
//! run the step, classify what came back.
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::{Callable, ChainError, IntoCallable, Outcome, Promise, Values};

/// Runs a step against a set of values, producing a settled promise
///
/// Each parameter must accept the value in the same position.
/// A step that does not line up with its values is rejected without running.
/// ```
/// use pledge::*;
/// let values: Values = vec![2i64.into_value(), 5i64.into_value()].into();
///
/// let sum = invoke(|a: i64, b: i64| a + b, values.clone());
/// assert_eq!(sum.value::<i64>(0), Some(7));
///
/// let wrong = invoke(|a: i64, b: f64| b, values);
/// assert_eq!(wrong.error().map(|e| e.to_string()), Some("Args should be f64 but got i64".into()));
/// ```
pub fn invoke<M>(step: impl IntoCallable<M>, values: Values) -> Promise {
    invoke_tagged(&step.into_callable(), values, 0)
}

/// [invoke], keeping the order tag of the branch it runs on
pub(crate) fn invoke_tagged(step: &Callable, values: Values, order: usize) -> Promise {
    if let Err(error) = check_arguments(step, &values) {
        tracing::debug!(step = step.name(), %error, "step arguments rejected");
        return Promise::rejected(error, order);
    }

    tracing::trace!(step = step.name(), args = values.len(), "invoking step");
    match catch_unwind(AssertUnwindSafe(|| step.call(values))) {
        Ok(Outcome::Fulfilled(values)) => Promise::fulfilled(values, order),
        Ok(Outcome::Rejected(error)) => {
            tracing::debug!(step = step.name(), %error, "step rejected");
            Promise::rejected(error, order)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(step = step.name(), %message, "step panicked");
            Promise::rejected(ChainError::Panicked(message), order)
        }
    }
}

fn check_arguments(step: &Callable, values: &Values) -> Result<(), ChainError> {
    for (expected, value) in step.params().iter().zip(values.iter()) {
        let actual = value.type_desc();
        if !expected.accepts(&actual) {
            return Err(ChainError::TypeMismatch {
                expected: *expected,
                actual,
            });
        }
    }
    if step.arity() != values.len() {
        return Err(ChainError::ArgumentCount {
            expected: step.arity(),
            actual: values.len(),
        });
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
