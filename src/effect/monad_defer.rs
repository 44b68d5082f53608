//! `MonadDefer` and `Async` type classes - deferred and callback-based effects.
//!
//! `MonadDefer` adds the ability to wrap a side effect so that it runs when
//! the computation is evaluated, with failures (including panics) landing in
//! the [`IoError`] channel. `Async` adds computations completed by a
//! callback, possibly from another thread.
//!
//! # Laws
//!
//! ## Delay Consistency Law
//!
//! ```text
//! delay(|| a) == pure(a)          (for a side-effect free thunk)
//! suspend(|| fa) == fa
//! ```
//!
//! ## Async Consistency Law
//!
//! ```text
//! async_io(|cb| cb.succeed(a)) == pure(a)
//! ```

use std::panic::{self, AssertUnwindSafe};

use super::error::IoError;
use super::io::AsyncCallback;
use super::monad_error::MonadError;
use crate::typeclass::ResultKind;

/// A monad whose effects can be deferred until evaluation.
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::{IO, IoKind, MonadDefer};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
/// let io: IO<usize> = IoKind::delay(move || counter.fetch_add(1, Ordering::SeqCst) + 1);
///
/// assert_eq!(calls.load(Ordering::SeqCst), 0);
/// assert_eq!(io.run_unsafe().unwrap(), 1);
/// ```
pub trait MonadDefer: MonadError<IoError> {
    /// Wraps a side effect.
    fn delay<A, F>(thunk: F) -> Self::Of<A>
    where
        A: Send + 'static,
        F: FnOnce() -> A + Send + 'static;

    /// Defers the construction of a computation.
    fn suspend<A, F>(thunk: F) -> Self::Of<A>
    where
        A: Send + 'static,
        F: FnOnce() -> Self::Of<A> + Send + 'static;

    /// Wraps a fallible side effect. An `Err` becomes a raised error.
    #[inline]
    fn delay_result<A, F>(thunk: F) -> Self::Of<A>
    where
        A: Send + 'static,
        F: FnOnce() -> Result<A, IoError> + Send + 'static,
    {
        Self::suspend(move || Self::from_result(thunk()))
    }
}

/// A deferring monad that can also wait on a callback.
pub trait Async: MonadDefer {
    /// A computation completed through `registration`'s callback.
    ///
    /// The registration must complete the callback exactly once. Extra
    /// completions are ignored.
    fn async_io<A, F>(registration: F) -> Self::Of<A>
    where
        A: Send + 'static,
        F: FnOnce(AsyncCallback<A>) + Send + 'static;

    /// A computation that never completes.
    #[inline]
    fn never<A>() -> Self::Of<A>
    where
        A: Send + 'static,
    {
        Self::async_io(|_| {})
    }
}

/// `Result` is strict: deferral degenerates to running the thunk at once,
/// with panics captured as [`IoError::Panic`].
impl MonadDefer for ResultKind<IoError> {
    fn delay<A, F>(thunk: F) -> Result<A, IoError>
    where
        A: Send + 'static,
        F: FnOnce() -> A + Send + 'static,
    {
        panic::catch_unwind(AssertUnwindSafe(thunk))
            .map_err(|payload| IoError::from_panic(payload.as_ref()))
    }

    fn suspend<A, F>(thunk: F) -> Result<A, IoError>
    where
        A: Send + 'static,
        F: FnOnce() -> Result<A, IoError> + Send + 'static,
    {
        Self::delay(thunk).and_then(|result| result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Strict = ResultKind<IoError>;

    #[test]
    fn strict_delay_captures_panics() {
        let result: Result<i32, IoError> = Strict::delay(|| panic!("strict"));
        assert!(matches!(result, Err(IoError::Panic { ref message }) if message == "strict"));
    }

    #[test]
    fn strict_delay_result_raises_err() {
        let result = Strict::delay_result(|| Err::<i32, _>(IoError::msg("nope")));
        assert_eq!(result.map_err(|error| error.to_string()), Err("nope".to_string()));
    }

    #[test]
    fn strict_suspend_flattens() {
        assert_eq!(Strict::suspend(|| Ok(9)).ok(), Some(9));
    }
}
