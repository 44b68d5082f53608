//! Either type - a value that can be one of two types.
//!
//! Within this crate `Either` is the loop state of stack-safe recursion:
//! `IO::tail_rec_m` keeps stepping while its function returns `Left(next)`
//! and stops with `Right(done)`.
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::control::Either;
//!
//! fn count_down(n: u32) -> Either<u32, &'static str> {
//!     if n == 0 { Either::Right("done") } else { Either::Left(n - 1) }
//! }
//!
//! let mut state = count_down(3);
//! while let Either::Left(n) = state {
//!     state = count_down(n);
//! }
//! assert_eq!(state, Either::Right("done"));
//! ```

use std::fmt;

/// A value that can be one of two types.
///
/// By convention `Left` means "keep going" (or failure) and `Right` means
/// "finished" (or success).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Either<L, R> {
    /// The left variant.
    Left(L),
    /// The right variant.
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Returns `true` if this is a `Left` value.
    #[inline]
    pub const fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    /// Returns `true` if this is a `Right` value.
    #[inline]
    pub const fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    /// Transforms the finished value, leaving a pending state untouched.
    #[inline]
    pub fn map_right<T, F>(self, function: F) -> Either<L, T>
    where
        F: FnOnce(R) -> T,
    {
        match self {
            Self::Left(state) => Either::Left(state),
            Self::Right(done) => Either::Right(function(done)),
        }
    }
}

impl<L: fmt::Debug, R: fmt::Debug> fmt::Debug for Either<L, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left(value) => formatter.debug_tuple("Left").field(value).finish(),
            Self::Right(value) => formatter.debug_tuple("Right").field(value).finish(),
        }
    }
}

/// `Err` becomes `Left`, `Ok` becomes `Right`.
impl<L, R> From<Result<R, L>> for Either<L, R> {
    fn from(result: Result<R, L>) -> Self {
        match result {
            Ok(value) => Self::Right(value),
            Err(error) => Self::Left(error),
        }
    }
}

impl<L, R> From<Either<L, R>> for Result<R, L> {
    fn from(either: Either<L, R>) -> Self {
        match either {
            Either::Left(error) => Err(error),
            Either::Right(value) => Ok(value),
        }
    }
}
