//! The one error type a chain carries
//!
//! Engine failures and user failures share this type, so a single
//! `catch` can recover from either.
use std::error::Error;
use std::sync::Arc;

use crate::TypeDesc;

/// Why a promise was rejected
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    /// A producer declared parameters
    #[error("function argument should have no arguments but declares {0}")]
    Arity(usize),
    #[error("step expects {expected} arguments but got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("Args should be {expected} but got {actual}")]
    TypeMismatch {
        expected: TypeDesc,
        actual: TypeDesc,
    },
    #[error("expected function but got {0}")]
    NotCallable(TypeDesc),
    #[error("first argument should be slice but got {0}")]
    NotSequence(String),
    #[error("Initializing argument should be {expected} but got {actual}")]
    InitType {
        expected: TypeDesc,
        actual: TypeDesc,
    },
    #[error("cannot reduce an empty slice without an initializing argument")]
    EmptyReduce,
    #[error("reducer returned no accumulator")]
    MissingAccumulator,
    #[error("step panicked: {0}")]
    Panicked(String),
    #[error("failed to spawn fan-out worker: {0}")]
    Spawn(Arc<std::io::Error>),
    #[error(transparent)]
    User(Arc<dyn Error + Send + Sync>),
    #[error("{0}")]
    Message(String),
}

impl ChainError {
    /// Wraps an error produced by user code
    ///
    /// A `ChainError` is passed through rather than nested
    /// ```
    /// use pledge::*;
    /// let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
    /// assert_eq!(ChainError::user(io).to_string(), "disk on fire");
    ///
    /// let inner = ChainError::msg("already wrapped");
    /// assert!(matches!(ChainError::user(inner), ChainError::Message(_)));
    /// ```
    pub fn user<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let source: Arc<dyn Error + Send + Sync> = Arc::new(error);
        match source.downcast_ref::<ChainError>() {
            Some(chained) => chained.clone(),
            None => ChainError::User(source),
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        ChainError::Message(message.into())
    }
}

impl From<String> for ChainError {
    fn from(message: String) -> Self {
        ChainError::Message(message)
    }
}

impl From<&str> for ChainError {
    fn from(message: &str) -> Self {
        ChainError::Message(message.to_owned())
    }
}
