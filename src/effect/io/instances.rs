//! Type class instances for [`IO`].

use super::{AsyncCallback, IO};
use crate::effect::{Async, IoError, MonadDefer, MonadError};
use crate::typeclass::{Applicative, Functor, Kind, Monad};

/// Kind marker for [`IO`].
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::{IO, IoKind};
/// use lambars_io::typeclass::Monad;
///
/// fn twice<K: Monad>(fa: K::Of<i32>) -> K::Of<i32> {
///     K::flat_map(fa, |x| K::pure(x * 2))
/// }
///
/// let io: IO<i32> = twice::<IoKind>(IO::pure(21));
/// assert_eq!(io.run_unsafe().unwrap(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IoKind;

impl Kind for IoKind {
    type Of<A: Send + 'static> = IO<A>;
}

impl Functor for IoKind {
    #[inline]
    fn map<A, B, F>(fa: IO<A>, function: F) -> IO<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        fa.map(function)
    }
}

impl Applicative for IoKind {
    #[inline]
    fn pure<A>(value: A) -> IO<A>
    where
        A: Send + 'static,
    {
        IO::pure(value)
    }

    #[inline]
    fn map2<A, B, C, F>(fa: IO<A>, fb: IO<B>, function: F) -> IO<C>
    where
        A: Send + 'static,
        B: Send + 'static,
        C: Send + 'static,
        F: FnOnce(A, B) -> C + Send + 'static,
    {
        fa.map2(fb, function)
    }
}

impl Monad for IoKind {
    #[inline]
    fn flat_map<A, B, F>(fa: IO<A>, function: F) -> IO<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> IO<B> + Send + 'static,
    {
        fa.flat_map(function)
    }
}

impl MonadError<IoError> for IoKind {
    #[inline]
    fn raise_error<A>(error: IoError) -> IO<A>
    where
        A: Send + 'static,
    {
        IO::raise_error(error)
    }

    #[inline]
    fn handle_error_with<A, F>(fa: IO<A>, handler: F) -> IO<A>
    where
        A: Send + 'static,
        F: FnOnce(IoError) -> IO<A> + Send + 'static,
    {
        fa.handle_error_with(handler)
    }

    #[inline]
    fn attempt<A>(fa: IO<A>) -> IO<Result<A, IoError>>
    where
        A: Send + 'static,
    {
        fa.attempt()
    }
}

impl MonadDefer for IoKind {
    #[inline]
    fn delay<A, F>(thunk: F) -> IO<A>
    where
        A: Send + 'static,
        F: FnOnce() -> A + Send + 'static,
    {
        IO::delay(thunk)
    }

    #[inline]
    fn suspend<A, F>(thunk: F) -> IO<A>
    where
        A: Send + 'static,
        F: FnOnce() -> IO<A> + Send + 'static,
    {
        IO::suspend(thunk)
    }

    #[inline]
    fn delay_result<A, F>(thunk: F) -> IO<A>
    where
        A: Send + 'static,
        F: FnOnce() -> Result<A, IoError> + Send + 'static,
    {
        IO::delay_result(thunk)
    }
}

impl Async for IoKind {
    #[inline]
    fn async_io<A, F>(registration: F) -> IO<A>
    where
        A: Send + 'static,
        F: FnOnce(AsyncCallback<A>) + Send + 'static,
    {
        IO::async_io(registration)
    }
}
