//! Applicative type class - lifting values and combining independent contexts.
//!
//! # Laws
//!
//! ## Identity Law
//!
//! ```text
//! map2(pure(|x| x), v, |f, x| f(x)) == v
//! ```
//!
//! ## Homomorphism Law
//!
//! ```text
//! map2(pure(f), pure(x), |f, x| f(x)) == pure(f(x))
//! ```

use super::functor::Functor;
use super::higher::{OptionKind, ResultKind};

/// A functor that can lift plain values and combine two contexts.
///
/// # Examples
///
/// ```rust
/// use lambars_io::typeclass::{Applicative, OptionKind};
///
/// let sum = OptionKind::map2(Some(1), OptionKind::pure(2), |a, b| a + b);
/// assert_eq!(sum, Some(3));
/// ```
pub trait Applicative: Functor {
    /// Lifts a value into the context.
    fn pure<A>(value: A) -> Self::Of<A>
    where
        A: Send + 'static;

    /// Combines two contexts, left before right, with `function`.
    fn map2<A, B, C, F>(fa: Self::Of<A>, fb: Self::Of<B>, function: F) -> Self::Of<C>
    where
        A: Send + 'static,
        B: Send + 'static,
        C: Send + 'static,
        F: FnOnce(A, B) -> C + Send + 'static;

    /// Pairs the values of two contexts.
    #[inline]
    fn product<A, B>(fa: Self::Of<A>, fb: Self::Of<B>) -> Self::Of<(A, B)>
    where
        A: Send + 'static,
        B: Send + 'static,
    {
        Self::map2(fa, fb, |a, b| (a, b))
    }

    /// Applies a function held in a context to a value held in a context.
    #[inline]
    fn apply<A, B, F>(ff: Self::Of<F>, fa: Self::Of<A>) -> Self::Of<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Self::map2(ff, fa, |function, a| function(a))
    }
}

impl Applicative for OptionKind {
    #[inline]
    fn pure<A>(value: A) -> Option<A>
    where
        A: Send + 'static,
    {
        Some(value)
    }

    #[inline]
    fn map2<A, B, C, F>(fa: Option<A>, fb: Option<B>, function: F) -> Option<C>
    where
        A: Send + 'static,
        B: Send + 'static,
        C: Send + 'static,
        F: FnOnce(A, B) -> C + Send + 'static,
    {
        match (fa, fb) {
            (Some(a), Some(b)) => Some(function(a, b)),
            _ => None,
        }
    }
}

impl<E: Send + 'static> Applicative for ResultKind<E> {
    #[inline]
    fn pure<A>(value: A) -> Result<A, E>
    where
        A: Send + 'static,
    {
        Ok(value)
    }

    #[inline]
    fn map2<A, B, C, F>(fa: Result<A, E>, fb: Result<B, E>, function: F) -> Result<C, E>
    where
        A: Send + 'static,
        B: Send + 'static,
        C: Send + 'static,
        F: FnOnce(A, B) -> C + Send + 'static,
    {
        Ok(function(fa?, fb?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_product_requires_both() {
        assert_eq!(OptionKind::product(Some(1), Some("a")), Some((1, "a")));
        assert_eq!(OptionKind::product(Some(1), None::<&str>), None);
    }

    #[test]
    fn result_map2_reports_first_error() {
        let left: Result<i32, &str> = Err("left");
        let right: Result<i32, &str> = Err("right");
        assert_eq!(ResultKind::<&str>::map2(left, right, |a, b| a + b), Err("left"));
    }

    #[test]
    fn apply_runs_lifted_function() {
        let function = OptionKind::pure(|x: i32| x * 3);
        assert_eq!(OptionKind::apply(function, Some(4)), Some(12));
    }
}
