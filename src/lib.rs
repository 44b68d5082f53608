//! # lambars-io
//!
//! A stack-safe IO effect for Rust.
//!
//! ## Overview
//!
//! - **Type Classes**: Functor, Applicative, Monad over kind markers
//! - **Control Structures**: `Either` loop state and a one-shot latch
//! - **Effect System**: The `IO` monad, its error/defer/async capabilities,
//!   and `async`-block comprehensions over any monad
//!
//! `IO` values are descriptions. A trampolined run loop interprets them with
//! an explicit continuation stack, suspends at asynchronous boundaries, and
//! resumes on whichever thread the callback fires.
//!
//! ## Feature Flags
//!
//! - `typeclass`: Type class traits (Functor, Monad, etc.)
//! - `control`: Control structures (Either, `OneShotLatch`)
//! - `effect`: The IO monad and comprehensions
//! - `async`: Tokio interop (`IO::from_future`, awaiting an `IO`)
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use lambars_io::prelude::*;
//!
//! let io = IO::binding(|binder| async move {
//!     let a = binder.bind(IO::delay(|| 20)).await;
//!     let b = binder.bind(IO::pure(22)).await;
//!     a + b
//! });
//! assert_eq!(io.run_unsafe().unwrap(), 42);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use lambars_io::prelude::*;
/// ```
pub mod prelude {

    #[cfg(feature = "typeclass")]
    pub use crate::typeclass::*;

    #[cfg(feature = "control")]
    pub use crate::control::*;

    #[cfg(feature = "effect")]
    pub use crate::effect::*;
}

#[cfg(feature = "typeclass")]
pub mod typeclass;

#[cfg(feature = "control")]
pub mod control;

#[cfg(feature = "effect")]
pub mod effect;
