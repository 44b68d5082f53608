//! Monad type class - sequencing computations within a context.
//!
//! # Laws
//!
//! ## Left Identity Law
//!
//! ```text
//! flat_map(pure(a), f) == f(a)
//! ```
//!
//! ## Right Identity Law
//!
//! ```text
//! flat_map(m, pure) == m
//! ```
//!
//! ## Associativity Law
//!
//! ```text
//! flat_map(flat_map(m, f), g) == flat_map(m, |x| flat_map(f(x), g))
//! ```
//!
//! For deferred kinds such as `IO`, "==" means "produces the same result
//! when executed", not structural equality of the computation graphs.

use super::applicative::Applicative;
use super::higher::{OptionKind, ResultKind};

/// An applicative whose next step may depend on the previous result.
///
/// # Examples
///
/// ```rust
/// use lambars_io::typeclass::{Monad, OptionKind};
///
/// let result = OptionKind::flat_map(Some(5), |n| if n > 0 { Some(n * 2) } else { None });
/// assert_eq!(result, Some(10));
/// ```
pub trait Monad: Applicative {
    /// Feeds the value of `fa` to `function` and continues with its result.
    fn flat_map<A, B, F>(fa: Self::Of<A>, function: F) -> Self::Of<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> Self::Of<B> + Send + 'static;

    /// Sequences `fa` then `next`, discarding the first value.
    #[inline]
    fn then<A, B>(fa: Self::Of<A>, next: Self::Of<B>) -> Self::Of<B>
    where
        A: Send + 'static,
        B: Send + 'static,
    {
        Self::flat_map(fa, move |_| next)
    }

    /// Removes one layer of nesting.
    #[inline]
    fn flatten<A>(ffa: Self::Of<Self::Of<A>>) -> Self::Of<A>
    where
        A: Send + 'static,
    {
        Self::flat_map(ffa, |inner| inner)
    }
}

impl Monad for OptionKind {
    #[inline]
    fn flat_map<A, B, F>(fa: Option<A>, function: F) -> Option<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> Option<B> + Send + 'static,
    {
        fa.and_then(function)
    }
}

impl<E: Send + 'static> Monad for ResultKind<E> {
    #[inline]
    fn flat_map<A, B, F>(fa: Result<A, E>, function: F) -> Result<B, E>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> Result<B, E> + Send + 'static,
    {
        fa.and_then(function)
    }
}
