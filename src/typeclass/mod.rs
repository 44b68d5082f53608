//! Type class traits for functional programming abstractions.
//!
//! These are the capability seams the effect system is written against:
//!
//! - [`Kind`]: Marker-based emulation of higher-kinded types
//! - [`Functor`]: Mapping over a value inside a context
//! - [`Applicative`]: Lifting values and combining independent contexts
//! - [`Monad`]: Sequencing dependent computations
//!
//! Error handling, deferral and asynchrony build on top of these in
//! `effect` (`MonadError`, `MonadDefer`, `Async`).
//!
//! ## Higher-Kinded Types Emulation
//!
//! Rust does not have native support for higher-kinded types (HKT).
//! This library uses Generic Associated Types (GAT) on zero-sized kind
//! markers, so a trait method can say "the same constructor applied to `B`"
//! without knowing the constructor.
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::typeclass::{Applicative, Monad, OptionKind};
//!
//! fn add_both<K: Monad>(a: K::Of<i32>, b: K::Of<i32>) -> K::Of<i32> {
//!     K::flat_map(a, move |x| K::map(b, move |y| x + y))
//! }
//!
//! assert_eq!(add_both::<OptionKind>(Some(1), OptionKind::pure(2)), Some(3));
//! ```

mod applicative;
mod functor;
mod higher;
mod monad;

pub use applicative::Applicative;
pub use functor::Functor;
pub use higher::{Kind, OptionKind, ResultKind};
pub use monad::Monad;
