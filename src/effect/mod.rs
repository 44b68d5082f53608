//! Effect system built around a stack-safe [`IO`] monad.
//!
//! # Capabilities
//!
//! The effect type classes refine [`Monad`](crate::typeclass::Monad):
//!
//! - [`MonadError`]: Raising and recovering from errors
//! - [`MonadDefer`]: Deferring side effects until evaluation
//! - [`Async`]: Computations completed by a callback
//!
//! [`IoKind`] implements all of them; `ResultKind<E>` implements
//! [`MonadError`] for any `E` and [`MonadDefer`] for [`IoError`].
//!
//! # IO Monad
//!
//! ```rust
//! use lambars_io::effect::IO;
//!
//! let io = IO::pure(10)
//!     .map(|x| x * 2)
//!     .flat_map(|x| IO::pure(x + 1));
//!
//! // Side effects don't occur until the IO is run
//! assert_eq!(io.run_unsafe().unwrap(), 21);
//! ```
//!
//! # Comprehensions
//!
//! [`binding`] turns an `async` block into a sequence of `flat_map`s:
//!
//! ```rust
//! use lambars_io::effect::IO;
//!
//! let io = IO::binding(|binder| async move {
//!     let x = binder.bind(IO::pure(5)).await;
//!     let y = binder.bind(IO::pure(10)).await;
//!     (x + y) * 2
//! });
//! assert_eq!(io.run_unsafe().unwrap(), 30);
//! ```
//!
//! # Error Handling
//!
//! ```rust
//! use lambars_io::effect::{IoError, MonadError};
//! use lambars_io::typeclass::ResultKind;
//!
//! let failing: Result<i32, String> = Err("error".to_string());
//! let recovered = ResultKind::<String>::handle_error(failing, |e| e.len() as i32);
//! assert_eq!(recovered, Ok(5));
//!
//! let error = IoError::msg("disk full");
//! assert_eq!(error.to_string(), "disk full");
//! ```

mod error;
mod io;
mod monad_defer;
mod monad_error;

pub mod binding;

pub use error::IoError;
pub use io::{AsyncCallback, IO, IoKind, Stepped};
pub use monad_defer::{Async, MonadDefer};
pub use monad_error::MonadError;

#[cfg(feature = "async")]
pub use io::IoFuture;
