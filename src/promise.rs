use crate::invoke::invoke_tagged;
use crate::{Callable, ChainError, Data, IntoCallable, IntoOutcome, Outcome, Value, Values};

/// How the last step of a chain settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Nothing has run yet
    Pending,
    Fulfilled,
    Rejected,
}

/// A snapshot of a chain after its latest step
///
/// A promise is never changed in place. Every step consumes the previous
/// snapshot and returns a new one, so a chain is just a sequence of values.
///
/// A rejected promise holds the error as its only value, and a chain that is
/// never inspected carries that error silently to its end. Check
/// [status](Promise::status) or use [into_result](Promise::into_result)
/// once the chain is built.
#[derive(Debug, Clone)]
#[must_use]
pub struct Promise {
    status: Status,
    values: Values,
    order: usize,
}

impl Promise {
    /// A fresh, empty chain that has not run anything
    pub fn pending() -> Self {
        Promise {
            status: Status::Pending,
            values: Values::new(),
            order: 0,
        }
    }

    /// A settled promise holding the classified outputs
    /// ```
    /// use pledge::*;
    /// let p = Promise::resolve((1u8, 2u8));
    /// assert_eq!(p.values().extract::<u8>(), Some(vec![1, 2]));
    /// assert!(Promise::resolve(ChainError::msg("no")).is_rejected());
    /// ```
    pub fn resolve(outputs: impl IntoOutcome) -> Self {
        Promise::settle(outputs.into_outcome(), 0)
    }

    pub fn reject(error: impl Into<ChainError>) -> Self {
        Promise::rejected(error.into(), 0)
    }

    pub(crate) fn settle(outcome: Outcome, order: usize) -> Self {
        match outcome {
            Outcome::Fulfilled(values) => Promise::fulfilled(values, order),
            Outcome::Rejected(error) => Promise::rejected(error, order),
        }
    }

    pub(crate) fn fulfilled(values: Values, order: usize) -> Self {
        Promise {
            status: Status::Fulfilled,
            values,
            order,
        }
    }

    pub(crate) fn rejected(error: ChainError, order: usize) -> Self {
        Promise {
            status: Status::Rejected,
            values: vec![error.into_value()].into(),
            order,
        }
    }

    /// A promise built from a fan-out join, whatever the mix of branches
    pub(crate) fn joined(status: Status, values: Values) -> Self {
        Promise {
            status,
            values,
            order: 0,
        }
    }

    pub(crate) fn order(&self) -> usize {
        self.order
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status == Status::Fulfilled
    }

    pub fn is_rejected(&self) -> bool {
        self.status == Status::Rejected
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn into_values(self) -> Values {
        self.values
    }

    /// Shorthand for `values().value::<T>(index)`
    pub fn value<T: Data>(&self, index: usize) -> Option<T> {
        self.values.value(index)
    }

    /// The error of a rejected promise
    ///
    /// After a partly failed fan-out this is the first rejected branch.
    pub fn error(&self) -> Option<&ChainError> {
        match self.status {
            Status::Rejected => self.values.iter().find_map(Value::as_error),
            _ => None,
        }
    }

    /// The values of a fulfilled promise, or its error
    /// ```
    /// use pledge::*;
    /// let squared = promise(|| 3i64).then(|x: i64| x * x).into_result();
    /// assert_eq!(squared.ok().and_then(|v| v.value::<i64>(0)), Some(9));
    /// ```
    pub fn into_result(self) -> Result<Values, ChainError> {
        match self.status {
            Status::Rejected => Err(self
                .values
                .iter()
                .find_map(Value::as_error)
                .cloned()
                .unwrap_or_else(|| ChainError::msg("rejected without an error"))),
            _ => Ok(self.values),
        }
    }
}

/// Starts a chain from a step that takes no arguments
///
/// A producer that declares parameters is rejected, nothing runs.
/// ```
/// use pledge::*;
/// let three = promise(|| 3i64);
/// assert_eq!(three.value::<i64>(0), Some(3));
///
/// let needs_input = promise(|x: i64| x);
/// assert!(matches!(needs_input.error(), Some(ChainError::Arity(1))));
/// ```
pub fn promise<M>(producer: impl IntoCallable<M>) -> Promise {
    let producer = producer.into_callable();
    if producer.arity() > 0 {
        return Promise::rejected(ChainError::Arity(producer.arity()), 0);
    }
    then(Promise::pending(), producer)
}

/// Runs `step` with the values of the chain, unless it was rejected
///
/// A rejected promise is returned untouched and `step` is never called.
pub fn then<M>(promise: Promise, step: impl IntoCallable<M>) -> Promise {
    if promise.is_rejected() {
        tracing::trace!("rejected chain skips then");
        return promise;
    }
    invoke_tagged(&step.into_callable(), promise.values, promise.order)
}

/// Runs `step` with the error of the chain, unless it was fulfilled
///
/// Returning the error again keeps the chain rejected, returning data
/// recovers it.
/// ```
/// use pledge::*;
/// let recovered = promise(|| Err::<i64, _>(ChainError::msg("no data")))
///     .then(|x: i64| x + 1)
///     .catch(|_: ChainError| 0i64);
/// assert!(recovered.is_fulfilled());
/// assert_eq!(recovered.value::<i64>(0), Some(0));
/// ```
pub fn catch<M>(promise: Promise, step: impl IntoCallable<M>) -> Promise {
    if promise.is_fulfilled() {
        tracing::trace!("fulfilled chain skips catch");
        return promise;
    }
    invoke_tagged(&step.into_callable(), promise.values, promise.order)
}

/// Runs a step that was carried through the chain as a value
///
/// The value must hold a [Callable], anything else rejects.
pub fn then_value(promise: Promise, step: Value) -> Promise {
    if promise.is_rejected() {
        return promise;
    }
    match Callable::try_from(step) {
        Ok(step) => then(promise, step),
        Err(error) => Promise::rejected(error, promise.order),
    }
}

/// Chains a function that builds the next promise from the current values
///
/// This is monadic bind, and is what do-notation desugars into.
pub fn and_then<F>(promise: Promise, f: F) -> Promise
where
    F: FnOnce(Values) -> Promise,
{
    if promise.is_rejected() {
        return promise;
    }
    f(promise.values)
}
