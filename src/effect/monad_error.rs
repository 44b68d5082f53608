//! `MonadError` type class - raising and recovering from failures.
//!
//! # Laws
//!
//! ## Raise Recover Law
//!
//! Recovering from a raised error applies the handler:
//!
//! ```text
//! handle_error_with(raise_error(e), handler) == handler(e)
//! ```
//!
//! ## Recover Pure Law
//!
//! Recovering when there is no error returns the original:
//!
//! ```text
//! handle_error_with(pure(a), handler) == pure(a)
//! ```
//!
//! ## Raise Short-Circuit Law
//!
//! Raising short-circuits every later continuation:
//!
//! ```text
//! flat_map(raise_error(e), f) == raise_error(e)
//! ```
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::effect::MonadError;
//! use lambars_io::typeclass::ResultKind;
//!
//! let failed: Result<i32, String> = ResultKind::<String>::raise_error("error".to_string());
//! let recovered = ResultKind::<String>::handle_error_with(failed, |e| Ok(e.len() as i32));
//! assert_eq!(recovered, Ok(5));
//! ```

use crate::typeclass::{Monad, ResultKind};

/// A monad with an error channel carrying `E`.
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::MonadError;
/// use lambars_io::typeclass::ResultKind;
///
/// fn safe_divide<M: MonadError<String>>(a: i32, b: i32) -> M::Of<i32> {
///     if b == 0 {
///         M::raise_error("division by zero".to_string())
///     } else {
///         M::from_result(Ok(a / b))
///     }
/// }
///
/// assert_eq!(safe_divide::<ResultKind<String>>(10, 2), Ok(5));
/// assert_eq!(
///     safe_divide::<ResultKind<String>>(1, 0),
///     Err("division by zero".to_string())
/// );
/// ```
pub trait MonadError<E: Send + 'static>: Monad {
    /// A computation that fails with `error`.
    fn raise_error<A>(error: E) -> Self::Of<A>
    where
        A: Send + 'static;

    /// Recovers from a failure of `fa` with the computation `handler` returns.
    ///
    /// The handler is not called when `fa` succeeds.
    fn handle_error_with<A, F>(fa: Self::Of<A>, handler: F) -> Self::Of<A>
    where
        A: Send + 'static,
        F: FnOnce(E) -> Self::Of<A> + Send + 'static;

    /// Recovers from a failure with a plain value.
    #[inline]
    fn handle_error<A, F>(fa: Self::Of<A>, handler: F) -> Self::Of<A>
    where
        A: Send + 'static,
        F: FnOnce(E) -> A + Send + 'static,
    {
        Self::handle_error_with(fa, move |error| Self::pure(handler(error)))
    }

    /// Exposes the outcome of `fa` as a value.
    #[inline]
    fn attempt<A>(fa: Self::Of<A>) -> Self::Of<Result<A, E>>
    where
        A: Send + 'static,
    {
        Self::handle_error_with(Self::map(fa, Ok), |error| Self::pure(Err(error)))
    }

    /// Lifts a `Result` into the error channel.
    #[inline]
    fn from_result<A>(result: Result<A, E>) -> Self::Of<A>
    where
        A: Send + 'static,
    {
        match result {
            Ok(value) => Self::pure(value),
            Err(error) => Self::raise_error(error),
        }
    }
}

impl<E: Send + 'static> MonadError<E> for ResultKind<E> {
    #[inline]
    fn raise_error<A>(error: E) -> Result<A, E>
    where
        A: Send + 'static,
    {
        Err(error)
    }

    #[inline]
    fn handle_error_with<A, F>(fa: Result<A, E>, handler: F) -> Result<A, E>
    where
        A: Send + 'static,
        F: FnOnce(E) -> Result<A, E> + Send + 'static,
    {
        fa.or_else(handler)
    }

    #[inline]
    fn attempt<A>(fa: Result<A, E>) -> Result<Result<A, E>, E>
    where
        A: Send + 'static,
    {
        Ok(fa)
    }

    #[inline]
    fn from_result<A>(result: Result<A, E>) -> Result<A, E>
    where
        A: Send + 'static,
    {
        result
    }
}
