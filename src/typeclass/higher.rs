//! Higher-Kinded Type emulation through Generic Associated Types.
//!
//! Rust cannot abstract over a type constructor such as `Option<_>` directly.
//! This module emulates it with a *kind marker*: a zero-sized type that names
//! the constructor, plus a Generic Associated Type that applies it to an
//! argument.
//!
//! ```text
//! OptionKind::Of<i32>  ==  Option<i32>
//! IoKind::Of<String>   ==  IO<String>
//! ```
//!
//! Every applied type is required to be `Send + 'static`. Computations built
//! from these kinds may be resumed on a thread other than the one that built
//! them, so every value and continuation that flows through a kind must be
//! transferable.
//!
//! # Example
//!
//! ```rust
//! use lambars_io::typeclass::{Kind, OptionKind};
//!
//! fn lift<K: Kind>(value: K::Of<i32>) -> K::Of<i32> {
//!     value
//! }
//!
//! let value: Option<i32> = lift::<OptionKind>(Some(42));
//! assert_eq!(value, Some(42));
//! ```

use std::marker::PhantomData;

/// A marker naming a type constructor.
///
/// # Laws
///
/// For any `K: Kind`, `K::Of<A>` must be the same constructor for every `A`;
/// implementations must not special-case particular argument types.
pub trait Kind {
    /// The constructor applied to `A`.
    type Of<A: Send + 'static>: Send + 'static;
}

/// Kind marker for [`Option`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptionKind;

impl Kind for OptionKind {
    type Of<A: Send + 'static> = Option<A>;
}

/// Kind marker for [`Result`] with a fixed error type `E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultKind<E>(PhantomData<fn() -> E>);

impl<E: Send + 'static> Kind for ResultKind<E> {
    type Of<A: Send + 'static> = Result<A, E>;
}
