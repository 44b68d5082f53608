//! Control structures used by the effect system.
//!
//! - [`Either`]: A value that can be one of two types (loop state for `tail_rec_m`)
//! - [`OneShotLatch`]: Hands one value from a producer thread to one waiter
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::control::{Either, OneShotLatch};
//!
//! let latch = OneShotLatch::new();
//! latch.complete(Either::<String, i32>::Right(1));
//! assert_eq!(latch.wait(), Either::Right(1));
//! ```

mod either;
mod latch;

pub use either::Either;
pub use latch::OneShotLatch;
