//! Error types for the effect system.
//!
//! [`IoError`] is the value carried by the monadic error channel of `IO`:
//! everything a computation raises, every panic the run loop captures, and
//! the cancellation signal of a cancellable comprehension.

use std::any::Any;
use std::error::Error as StdError;
use std::sync::Arc;

/// A failure carried through the `IO` error channel.
///
/// Cloning is cheap: domain errors are shared behind an `Arc`.
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::IoError;
///
/// #[derive(Debug)]
/// struct NotFound;
///
/// impl std::fmt::Display for NotFound {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "not found")
///     }
/// }
///
/// impl std::error::Error for NotFound {}
///
/// let error = IoError::new(NotFound);
/// assert!(error.downcast_ref::<NotFound>().is_some());
/// assert_eq!(error.to_string(), "not found");
/// assert!(!error.is_cancelled());
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum IoError {
    /// A domain failure raised by user code.
    #[error("{0}")]
    Failure(Arc<dyn StdError + Send + Sync>),
    /// A panic captured while running a thunk or continuation.
    #[error("panicked: {message}")]
    Panic {
        /// The panic payload rendered as text.
        message: String,
    },
    /// The comprehension was disposed before this resumption point.
    #[error("binding cancelled")]
    Cancelled,
    /// A comprehension body awaited something other than a binder
    /// suspension point.
    #[error("binding suspended outside of a bind point")]
    InvalidSuspension,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

impl IoError {
    /// Wraps a domain error.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Failure(Arc::new(error))
    }

    /// Creates a domain failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failure(Arc::new(Message(message.into())))
    }

    /// Builds a `Panic` from a payload returned by `catch_unwind`.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self::Panic { message }
    }

    /// Returns `true` for the cancellation signal.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` for a captured panic.
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panic { .. })
    }

    /// Returns the wrapped domain error if it has type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            Self::Failure(error) => error.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(error: std::io::Error) -> Self {
        Self::new(error)
    }
}

impl From<String> for IoError {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}

impl From<&str> for IoError {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}
