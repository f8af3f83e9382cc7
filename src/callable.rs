//! Steps, and how their outputs are classified
//!
//! Any closure whose parameters are [Data] and whose return type implements
//! [IntoOutcome] can be turned into a [Callable]. The callable remembers the
//! declared parameter types so the invoker can check them before running it.
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::{ChainError, Data, TypeDesc, Value, Values};

/// What running a step produced
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The data outputs, in declaration order
    Fulfilled(Values),
    /// The error that stopped the step
    Rejected(ChainError),
}

impl Outcome {
    /// One output, rejecting if that output is an error
    pub fn single(value: Value) -> Self {
        let error = value.as_error().cloned();
        match error {
            Some(error) => Outcome::Rejected(error),
            None => Outcome::Fulfilled(vec![value].into()),
        }
    }
}

/// Classifies a step's return value into data or an error
///
/// The rules are:
/// - `()` has no outputs
/// - tuples have one output per element, the first element that holds an error
///   rejects the step and the rest are dropped
/// - `Result::Ok` is unwrapped, an `Ok` never reaches the next step as an error
/// - `Result::Err`, a `ChainError` or a `Some(ChainError)` rejects
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome {
        self
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Outcome::Fulfilled(Values::new())
    }
}

impl IntoOutcome for Value {
    fn into_outcome(self) -> Outcome {
        Outcome::single(self)
    }
}

impl IntoOutcome for Values {
    fn into_outcome(self) -> Outcome {
        let error = self.iter().find_map(Value::as_error).cloned();
        match error {
            Some(error) => Outcome::Rejected(error),
            None => Outcome::Fulfilled(self),
        }
    }
}

impl IntoOutcome for ChainError {
    fn into_outcome(self) -> Outcome {
        Outcome::Rejected(self)
    }
}

impl IntoOutcome for Option<ChainError> {
    fn into_outcome(self) -> Outcome {
        match self {
            Some(error) => Outcome::Rejected(error),
            None => Outcome::Fulfilled(Values::new()),
        }
    }
}

impl<T: Data> IntoOutcome for Vec<T> {
    fn into_outcome(self) -> Outcome {
        Outcome::single(Value::sequence(self))
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Error + Send + Sync + 'static,
{
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(outputs) => outputs.into_outcome(),
            Err(error) => Outcome::Rejected(ChainError::user(error)),
        }
    }
}

macro_rules! impl_tuple_outcome {
    ($($out:ident),+) => {
        impl<$($out: Data),+> IntoOutcome for ($($out,)+) {
            #[allow(non_snake_case)]
            fn into_outcome(self) -> Outcome {
                let ($($out,)+) = self;
                let values: Values = vec![$($out.into_value()),+].into();
                values.into_outcome()
            }
        }
    };
}

impl_tuple_outcome!(A);
impl_tuple_outcome!(A, B);
impl_tuple_outcome!(A, B, C);
impl_tuple_outcome!(A, B, C, D);
impl_tuple_outcome!(A, B, C, D, E);
impl_tuple_outcome!(A, B, C, D, E, F);

type Invoke = dyn Fn(Values) -> Outcome + Send + Sync;

/// A type-erased step
///
/// Cheap to clone, every clone shares the same function.
#[derive(Clone)]
pub struct Callable {
    name: &'static str,
    params: Arc<[TypeDesc]>,
    func: Arc<Invoke>,
}

impl Callable {
    /// Builds a step that works on the raw values
    ///
    /// `params` is checked against the incoming values before `func` runs.
    /// A parameter of type [Value] accepts anything.
    /// ```
    /// use pledge::*;
    /// let count = Callable::new(vec![TypeDesc::of::<Value>()], |values: Values| {
    ///     Outcome::single(values.len().into_value())
    /// });
    /// let counted = promise(|| 'x').then(count);
    /// assert_eq!(counted.value::<usize>(0), Some(1));
    /// ```
    pub fn new<F>(params: Vec<TypeDesc>, func: F) -> Self
    where
        F: Fn(Values) -> Outcome + Send + Sync + 'static,
    {
        Callable::named(std::any::type_name::<F>(), params, func)
    }

    fn named<F>(name: &'static str, params: Vec<TypeDesc>, func: F) -> Self
    where
        F: Fn(Values) -> Outcome + Send + Sync + 'static,
    {
        Callable {
            name,
            params: params.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &[TypeDesc] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Runs the step without checking its arguments
    pub(crate) fn call(&self, args: Values) -> Outcome {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

impl TryFrom<Value> for Callable {
    type Error = ChainError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value
            .get::<Callable>()
            .ok_or_else(|| ChainError::NotCallable(value.type_desc()))
    }
}

/// Conversion of closures and functions into a [Callable]
///
/// `Marker` only exists to tell the implementations apart, it is inferred
/// from the closure's signature. Closure parameters need type annotations.
pub trait IntoCallable<Marker> {
    fn into_callable(self) -> Callable;
}

impl IntoCallable<Callable> for Callable {
    fn into_callable(self) -> Callable {
        self
    }
}

/// Turns a closure into a [Callable]
///
/// Needed where several steps of different types share one list
/// ```
/// use pledge::*;
/// let steps = vec![callable(|x: i32| x + 1), callable(|x: i32| x.to_string())];
/// assert_eq!(steps[1].params(), &[TypeDesc::of::<i32>()]);
/// ```
pub fn callable<M>(step: impl IntoCallable<M>) -> Callable {
    step.into_callable()
}

fn argument<T: Data>(
    args: &mut std::vec::IntoIter<Value>,
    expected: usize,
    actual: usize,
) -> Result<T, ChainError> {
    let value = args
        .next()
        .ok_or(ChainError::ArgumentCount { expected, actual })?;
    value.get::<T>().ok_or_else(|| ChainError::TypeMismatch {
        expected: TypeDesc::of::<T>(),
        actual: value.type_desc(),
    })
}

macro_rules! impl_into_callable {
    ($($arg:ident),*) => {
        impl<Func, Out, $($arg,)*> IntoCallable<fn($($arg,)*) -> Out> for Func
        where
            Func: Fn($($arg),*) -> Out + Send + Sync + 'static,
            Out: IntoOutcome,
            $($arg: Data,)*
        {
            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn into_callable(self) -> Callable {
                let params = vec![$(TypeDesc::of::<$arg>()),*];
                let expected = params.len();
                Callable::named(std::any::type_name::<Func>(), params, move |args: Values| {
                    let actual = args.len();
                    let mut args = args.into_iter();
                    $(
                        let $arg = match argument::<$arg>(&mut args, expected, actual) {
                            Ok(value) => value,
                            Err(error) => return Outcome::Rejected(error),
                        };
                    )*
                    (self)($($arg),*).into_outcome()
                })
            }
        }
    };
}

impl_into_callable!();
impl_into_callable!(A);
impl_into_callable!(A, B);
impl_into_callable!(A, B, C);
impl_into_callable!(A, B, C, D);
impl_into_callable!(A, B, C, D, E);
impl_into_callable!(A, B, C, D, E, F);
