//! Functor type class - mapping over a value inside a context.
//!
//! # Laws
//!
//! ## Identity Law
//!
//! ```text
//! map(fa, |x| x) == fa
//! ```
//!
//! ## Composition Law
//!
//! ```text
//! map(fa, |x| g(f(x))) == map(map(fa, f), g)
//! ```

use super::higher::{Kind, OptionKind, ResultKind};

/// A kind whose values can be transformed with a pure function.
///
/// Unlike a `self`-based functor, the transformation is a static function of
/// the kind marker, so the same trait can describe eager containers such as
/// `Option` and deferred computations such as `IO`.
///
/// # Examples
///
/// ```rust
/// use lambars_io::typeclass::{Functor, OptionKind};
///
/// let doubled = OptionKind::map(Some(21), |x| x * 2);
/// assert_eq!(doubled, Some(42));
/// ```
pub trait Functor: Kind {
    /// Applies `function` to the value inside `fa`.
    fn map<A, B, F>(fa: Self::Of<A>, function: F) -> Self::Of<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static;

    /// Replaces the value inside `fa` with `value`.
    #[inline]
    fn replace<A, B>(fa: Self::Of<A>, value: B) -> Self::Of<B>
    where
        A: Send + 'static,
        B: Send + 'static,
    {
        Self::map(fa, move |_| value)
    }

    /// Discards the value inside `fa`.
    #[inline]
    fn void<A>(fa: Self::Of<A>) -> Self::Of<()>
    where
        A: Send + 'static,
    {
        Self::replace(fa, ())
    }
}

impl Functor for OptionKind {
    #[inline]
    fn map<A, B, F>(fa: Option<A>, function: F) -> Option<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        fa.map(function)
    }
}

impl<E: Send + 'static> Functor for ResultKind<E> {
    #[inline]
    fn map<A, B, F>(fa: Result<A, E>, function: F) -> Result<B, E>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        fa.map(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(1), Some(2))]
    #[case(None, None)]
    fn option_map_increments(#[case] input: Option<i32>, #[case] expected: Option<i32>) {
        assert_eq!(OptionKind::map(input, |x| x + 1), expected);
    }

    #[test]
    fn result_map_skips_errors() {
        let failed: Result<i32, String> = Err("failed".to_string());
        assert_eq!(
            ResultKind::<String>::map(failed, |x| x + 1),
            Err("failed".to_string())
        );
    }

    #[test]
    fn void_discards_value() {
        assert_eq!(OptionKind::void(Some("value")), Some(()));
    }
}
