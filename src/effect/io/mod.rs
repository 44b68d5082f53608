//! IO Monad - deferred, stack-safe side effects.
//!
//! The `IO` type describes a computation that may perform side effects,
//! fail, or wait for an asynchronous callback. Nothing happens until one of
//! the runners (`run_unsafe`, `run_unsafe_async`, ...) is called.
//!
//! # Design
//!
//! An `IO<A>` is a typed view of a type-erased computation node. Composition
//! (`map`, `flat_map`, `handle_error_with`, ...) only builds nodes; a
//! trampolined run loop interprets them with an explicit continuation stack,
//! so arbitrarily long chains and deep recursion run in constant native
//! stack space.
//!
//! Failures travel in a monadic error channel carrying [`IoError`]. Panics
//! raised by thunks and continuations are captured into that channel as
//! [`IoError::Panic`].
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::effect::IO;
//!
//! let io = IO::pure(10)
//!     .map(|x| x * 2)
//!     .flat_map(|x| IO::pure(x + 1));
//! assert_eq!(io.run_unsafe().unwrap(), 21);
//! ```
//!
//! # Side Effect Deferral
//!
//! ```rust
//! use lambars_io::effect::IO;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! let executed = Arc::new(AtomicBool::new(false));
//! let executed_clone = executed.clone();
//!
//! let io = IO::new(move || {
//!     executed_clone.store(true, Ordering::SeqCst);
//!     42
//! });
//!
//! assert!(!executed.load(Ordering::SeqCst));
//! assert_eq!(io.run_unsafe().unwrap(), 42);
//! assert!(executed.load(Ordering::SeqCst));
//! ```

mod frame;
mod instances;
pub(crate) mod node;
mod restart;
mod run_loop;

#[cfg(feature = "async")]
mod future;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use self::frame::Frame;
use self::node::{Node, Outcome, Resume, Value, unbox};
use crate::control::{Either, OneShotLatch};
use crate::effect::IoError;

pub use self::instances::IoKind;
pub use self::restart::AsyncCallback;

#[cfg(feature = "async")]
pub use self::future::IoFuture;

/// A monad representing deferred side effects.
///
/// `IO<A>` describes a computation producing a value of type `A` or an
/// [`IoError`]. It is `Send`, so it can be built on one thread and run on
/// another; values and closures captured by it must be `Send + 'static`.
///
/// # Monad Laws
///
/// `IO` satisfies the monad laws, where equality means "runs to the same
/// result":
///
/// 1. **Left Identity**: `IO::pure(a).flat_map(f) == f(a)`
/// 2. **Right Identity**: `m.flat_map(IO::pure) == m`
/// 3. **Associativity**: `m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))`
#[must_use = "IO does nothing until it is run"]
pub struct IO<A> {
    node: Node,
    _marker: PhantomData<fn() -> A>,
}

/// The result of stepping an [`IO`] synchronously.
pub enum Stepped<A> {
    /// The computation produced a value.
    Done(A),
    /// The computation failed and nothing recovered it.
    Failed(IoError),
    /// The computation is waiting on an asynchronous callback. The returned
    /// `IO` continues from that point.
    Suspended(IO<A>),
}

impl<A: fmt::Debug> fmt::Debug for Stepped<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done(value) => formatter.debug_tuple("Done").field(value).finish(),
            Self::Failed(error) => formatter.debug_tuple("Failed").field(error).finish(),
            Self::Suspended(io) => formatter.debug_tuple("Suspended").field(io).finish(),
        }
    }
}

impl<A> fmt::Debug for IO<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("IO").field(&self.node).finish()
    }
}

impl<A> IO<A> {
    pub(crate) const fn from_node(node: Node) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    pub(crate) fn into_node(self) -> Node {
        self.node
    }
}

// =============================================================================
// Constructors
// =============================================================================

impl<A: Send + 'static> IO<A> {
    /// Wraps a pure value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// assert_eq!(IO::pure(42).run_unsafe().unwrap(), 42);
    /// ```
    pub fn pure(value: A) -> Self {
        Self::from_node(Node::pure(value))
    }

    /// A computation that fails with `error`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::{IO, IoError};
    ///
    /// let io: IO<i32> = IO::raise_error(IoError::msg("boom"));
    /// assert_eq!(io.run_unsafe().unwrap_err().to_string(), "boom");
    /// ```
    pub fn raise_error(error: IoError) -> Self {
        Self::from_node(Node::RaiseError(error))
    }

    /// Creates an IO action from a closure.
    ///
    /// The closure runs each time the action is evaluated, never before. A
    /// panic inside it becomes [`IoError::Panic`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::new(|| 10 + 20);
    /// assert_eq!(io.run_unsafe().unwrap(), 30);
    /// ```
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() -> A + Send + 'static,
    {
        Self::from_node(Node::Delay(Box::new(move || Ok(Box::new(action()) as Value))))
    }

    /// Alias for [`IO::new`].
    pub fn delay<F>(action: F) -> Self
    where
        F: FnOnce() -> A + Send + 'static,
    {
        Self::new(action)
    }

    /// Creates an IO action from a fallible closure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::delay_result(|| "42".parse::<i32>().map_err(|e| e.to_string()));
    /// assert_eq!(io.run_unsafe().unwrap(), 42);
    ///
    /// let io = IO::delay_result(|| "x".parse::<i32>().map_err(|e| e.to_string()));
    /// assert!(io.run_unsafe().is_err());
    /// ```
    pub fn delay_result<E, F>(action: F) -> Self
    where
        E: Into<IoError>,
        F: FnOnce() -> Result<A, E> + Send + 'static,
    {
        Self::from_node(Node::Delay(Box::new(move || {
            action()
                .map(|value| Box::new(value) as Value)
                .map_err(Into::into)
        })))
    }

    /// Defers building an IO until evaluation.
    ///
    /// Recursive definitions should go through `suspend` so that each level
    /// is built only when the previous one has run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// fn sum_to(n: u64, acc: u64) -> IO<u64> {
    ///     if n == 0 {
    ///         IO::pure(acc)
    ///     } else {
    ///         IO::suspend(move || sum_to(n - 1, acc + n))
    ///     }
    /// }
    ///
    /// assert_eq!(sum_to(100_000, 0).run_unsafe().unwrap(), 5_000_050_000);
    /// ```
    pub fn suspend<F>(thunk: F) -> Self
    where
        F: FnOnce() -> Self + Send + 'static,
    {
        Self::from_node(Node::Suspend(Box::new(move || thunk().node)))
    }

    /// A computation completed through a callback.
    ///
    /// `registration` runs when the computation is evaluated and must arrange
    /// for the callback to be completed exactly once, now or later, from any
    /// thread. Completions after the first are ignored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    /// use std::thread;
    ///
    /// let io = IO::async_io(|callback| {
    ///     thread::spawn(move || callback.succeed("from another thread"));
    /// });
    /// assert_eq!(io.run_unsafe().unwrap(), "from another thread");
    /// ```
    pub fn async_io<F>(registration: F) -> Self
    where
        F: FnOnce(AsyncCallback<A>) + Send + 'static,
    {
        Self::from_node(Node::Async(Box::new(move |resume: Resume| {
            registration(AsyncCallback::new(resume));
        })))
    }

    /// A computation that never completes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    /// use std::time::Duration;
    ///
    /// let io: IO<i32> = IO::never();
    /// assert_eq!(io.run_unsafe_timed(Duration::from_millis(10)).unwrap(), None);
    /// ```
    pub fn never() -> Self {
        Self::async_io(|_| {})
    }
}

impl IO<()> {
    /// An action that does nothing.
    pub fn unit() -> Self {
        Self::pure(())
    }

    /// Completes after `duration`, timed on a dedicated thread.
    ///
    /// The calling thread is not blocked; the rest of the computation
    /// resumes on the timer thread.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    /// use std::time::{Duration, Instant};
    ///
    /// let started = Instant::now();
    /// IO::sleep(Duration::from_millis(20)).run_unsafe().unwrap();
    /// assert!(started.elapsed() >= Duration::from_millis(20));
    /// ```
    pub fn sleep(duration: Duration) -> Self {
        Self::async_io(move |callback| {
            let timer = callback.clone();
            let spawned = thread::Builder::new()
                .name("lambars-io-sleep".to_string())
                .spawn(move || {
                    thread::sleep(duration);
                    timer.succeed(());
                });
            if let Err(error) = spawned {
                callback.fail(IoError::from(error));
            }
        })
    }
}

// =============================================================================
// Combinators
// =============================================================================

impl<A: Send + 'static> IO<A> {
    /// Transforms the result with a pure function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// assert_eq!(IO::pure(21).map(|x| x * 2).run_unsafe().unwrap(), 42);
    /// ```
    pub fn map<B, F>(self, function: F) -> IO<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        IO::from_node(Node::Map(
            Box::new(self.node),
            Box::new(move |value| Box::new(function(unbox::<A>(value))) as Value),
        ))
    }

    /// Chains a computation that depends on the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::pure(10).flat_map(|x| IO::pure(x * 2));
    /// assert_eq!(io.run_unsafe().unwrap(), 20);
    /// ```
    pub fn flat_map<B, F>(self, function: F) -> IO<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> IO<B> + Send + 'static,
    {
        IO::from_node(Node::Bind(
            Box::new(self.node),
            Frame::Bind(Box::new(move |value| function(unbox::<A>(value)).node)),
        ))
    }

    /// Alias for [`IO::flat_map`].
    pub fn and_then<B, F>(self, function: F) -> IO<B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> IO<B> + Send + 'static,
    {
        self.flat_map(function)
    }

    /// Runs `next` after this action, discarding this action's result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// assert_eq!(IO::pure(10).then(IO::pure(20)).run_unsafe().unwrap(), 20);
    /// ```
    pub fn then<B>(self, next: IO<B>) -> IO<B>
    where
        B: Send + 'static,
    {
        self.flat_map(move |_| next)
    }

    /// Combines two actions, running this one first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::pure(10).map2(IO::pure(20), |a, b| a + b);
    /// assert_eq!(io.run_unsafe().unwrap(), 30);
    /// ```
    pub fn map2<B, C, F>(self, other: IO<B>, function: F) -> IO<C>
    where
        B: Send + 'static,
        C: Send + 'static,
        F: FnOnce(A, B) -> C + Send + 'static,
    {
        self.flat_map(move |a| other.map(move |b| function(a, b)))
    }

    /// Pairs the results of two actions.
    pub fn product<B>(self, other: IO<B>) -> IO<(A, B)>
    where
        B: Send + 'static,
    {
        self.map2(other, |a, b| (a, b))
    }

    /// Applies the function this action produces to the value `value`
    /// produces. The function is evaluated first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::pure(|x: i32| x + 1).apply(IO::pure(41));
    /// assert_eq!(io.run_unsafe().unwrap(), 42);
    /// ```
    pub fn apply<B, C>(self, value: IO<B>) -> IO<C>
    where
        A: FnOnce(B) -> C,
        B: Send + 'static,
        C: Send + 'static,
    {
        self.map2(value, |function, argument| function(argument))
    }

    /// Recovers from a failure with another computation.
    ///
    /// Success values pass through without calling `handler`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::{IO, IoError};
    ///
    /// let io = IO::<i32>::raise_error(IoError::msg("boom"))
    ///     .map(|x| x + 1)
    ///     .handle_error_with(|error| IO::pure(error.to_string().len() as i32));
    /// assert_eq!(io.run_unsafe().unwrap(), 4);
    /// ```
    pub fn handle_error_with<F>(self, handler: F) -> Self
    where
        F: FnOnce(IoError) -> Self + Send + 'static,
    {
        Self::from_node(Node::Bind(
            Box::new(self.node),
            Frame::Handler(Box::new(move |error| handler(error).node)),
        ))
    }

    /// Recovers from a failure with a plain value.
    pub fn handle_error<F>(self, handler: F) -> Self
    where
        F: FnOnce(IoError) -> A + Send + 'static,
    {
        self.handle_error_with(move |error| Self::pure(handler(error)))
    }

    /// Exposes the outcome as a `Result`. The returned action never fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// let io: IO<i32> = IO::new(|| panic!("oops"));
    /// let outcome = io.attempt().run_unsafe().unwrap();
    /// assert!(outcome.unwrap_err().is_panic());
    /// ```
    pub fn attempt(self) -> IO<Result<A, IoError>> {
        IO::from_node(Node::Bind(
            Box::new(self.node),
            Frame::Fold {
                succeed: Box::new(|value| Node::pure(Ok::<A, IoError>(unbox::<A>(value)))),
                recover: Box::new(|error| Node::pure(Err::<A, IoError>(error))),
            },
        ))
    }

    /// Continues with `recover` on failure or with `bind` on success.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::{IO, IoError};
    ///
    /// let describe = |io: IO<i32>| {
    ///     io.redeem_with(
    ///         |error| IO::pure(format!("failed: {error}")),
    ///         |value| IO::pure(format!("got {value}")),
    ///     )
    /// };
    /// assert_eq!(describe(IO::pure(1)).run_unsafe().unwrap(), "got 1");
    /// assert_eq!(
    ///     describe(IO::raise_error(IoError::msg("x"))).run_unsafe().unwrap(),
    ///     "failed: x"
    /// );
    /// ```
    pub fn redeem_with<B, R, F>(self, recover: R, bind: F) -> IO<B>
    where
        B: Send + 'static,
        R: FnOnce(IoError) -> IO<B> + Send + 'static,
        F: FnOnce(A) -> IO<B> + Send + 'static,
    {
        IO::from_node(Node::Bind(
            Box::new(self.node),
            Frame::Fold {
                succeed: Box::new(move |value| bind(unbox::<A>(value)).node),
                recover: Box::new(move |error| recover(error).node),
            },
        ))
    }

    /// Stack-safe monadic loop.
    ///
    /// `function` is applied to the state until it produces `Right(done)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::control::Either;
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::tail_rec_m((0_u64, 0_u64), |(n, acc)| {
    ///     IO::pure(if n > 100_000 { Either::Right(acc) } else { Either::Left((n + 1, acc + n)) })
    /// });
    /// assert_eq!(io.run_unsafe().unwrap(), 5_000_050_000);
    /// ```
    pub fn tail_rec_m<S, F>(initial: S, function: F) -> Self
    where
        S: Send + 'static,
        F: Fn(S) -> IO<Either<S, A>> + Send + Sync + 'static,
    {
        fn step<S, A, F>(state: S, function: Arc<F>) -> IO<A>
        where
            S: Send + 'static,
            A: Send + 'static,
            F: Fn(S) -> IO<Either<S, A>> + Send + Sync + 'static,
        {
            let next = Arc::clone(&function);
            function(state).flat_map(move |outcome| match outcome {
                Either::Left(state) => step(state, next),
                Either::Right(done) => IO::pure(done),
            })
        }

        let function = Arc::new(function);
        Self::suspend(move || step(initial, function))
    }
}

// =============================================================================
// Runners
// =============================================================================

impl<A: Send + 'static> IO<A> {
    /// Evaluates synchronously up to the first asynchronous boundary.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::{IO, Stepped};
    ///
    /// assert!(matches!(IO::pure(1).map(|x| x + 1).step(), Stepped::Done(2)));
    ///
    /// let waiting: IO<i32> = IO::never().map(|x: i32| x + 1);
    /// assert!(matches!(waiting.step(), Stepped::Suspended(_)));
    /// ```
    pub fn step(self) -> Stepped<A> {
        match run_loop::step(self.node) {
            Node::Pure(value) => Stepped::Done(unbox(value)),
            Node::RaiseError(error) => Stepped::Failed(error),
            suspended => Stepped::Suspended(Self::from_node(suspended)),
        }
    }

    /// Runs the computation, blocking until it completes.
    ///
    /// Blocks forever if an asynchronous step never completes its callback.
    ///
    /// # Errors
    ///
    /// Returns the unhandled [`IoError`] the computation failed with.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// let io = IO::pure(1).flat_map(|x| IO::pure(x + 1)).flat_map(|x| IO::pure(x + 1));
    /// assert_eq!(io.run_unsafe().unwrap(), 3);
    /// ```
    pub fn run_unsafe(self) -> Result<A, IoError> {
        self.run_blocking().wait()
    }

    /// Runs the computation, blocking for at most `timeout`.
    ///
    /// Returns `Ok(None)` if the computation has not completed when the
    /// timeout expires. The computation keeps running in that case.
    ///
    /// # Errors
    ///
    /// Returns the unhandled [`IoError`] if the computation failed in time.
    pub fn run_unsafe_timed(self, timeout: Duration) -> Result<Option<A>, IoError> {
        self.run_blocking().wait_for(timeout).transpose()
    }

    fn run_blocking(self) -> Arc<OneShotLatch<Result<A, IoError>>> {
        let latch = Arc::new(OneShotLatch::new());
        let sink = Arc::clone(&latch);
        self.run_unsafe_async(move |result| {
            sink.complete(result);
        });
        latch
    }

    /// Starts the computation and delivers its result to `callback`.
    ///
    /// The calling thread runs the computation up to the first asynchronous
    /// boundary that does not complete immediately. `callback` runs on the
    /// thread that finishes the computation. A panic inside `callback` is
    /// not caught.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    /// use std::sync::mpsc;
    ///
    /// let (sender, receiver) = mpsc::channel();
    /// IO::pure(5).run_unsafe_async(move |result| sender.send(result).unwrap());
    /// assert_eq!(receiver.recv().unwrap().unwrap(), 5);
    /// ```
    pub fn run_unsafe_async<F>(self, callback: F)
    where
        F: FnOnce(Result<A, IoError>) + Send + 'static,
    {
        run_loop::start(
            self.node,
            Box::new(move |outcome: Outcome| callback(outcome.map(unbox::<A>))),
        );
    }

    /// Describes running this computation and then the action `callback`
    /// builds from its result.
    ///
    /// The returned `IO` fails only if the callback's action fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::{IO, IoError};
    /// use std::sync::{Arc, Mutex};
    ///
    /// let seen = Arc::new(Mutex::new(None));
    /// let sink = Arc::clone(&seen);
    /// let io = IO::<i32>::raise_error(IoError::msg("bad")).run_async(move |result| {
    ///     IO::new(move || *sink.lock().unwrap() = Some(result.is_err()))
    /// });
    /// io.run_unsafe().unwrap();
    /// assert_eq!(*seen.lock().unwrap(), Some(true));
    /// ```
    pub fn run_async<F>(self, callback: F) -> IO<()>
    where
        F: FnOnce(Result<A, IoError>) -> IO<()> + Send + 'static,
    {
        IO::async_io(move |done: AsyncCallback<()>| {
            self.run_unsafe_async(move |result| {
                IO::suspend(move || callback(result))
                    .run_unsafe_async(move |finished| done.complete(finished));
            });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static_assertions::assert_impl_all!(IO<i32>: Send);
    static_assertions::assert_impl_all!(AsyncCallback<String>: Send, Sync, Clone);

    #[rstest]
    #[case(IO::pure(1), 1)]
    #[case(IO::new(|| 2), 2)]
    #[case(IO::suspend(|| IO::pure(3)), 3)]
    #[case(IO::async_io(|callback| callback.succeed(4)), 4)]
    fn constructors_produce_values(#[case] io: IO<i32>, #[case] expected: i32) {
        assert_eq!(io.run_unsafe().unwrap(), expected);
    }

    #[test]
    fn raise_error_skips_map() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let io = IO::<i32>::raise_error(IoError::msg("E")).map(move |x| {
            counter.fetch_add(1, Ordering::SeqCst);
            x + 1
        });

        match io.step() {
            Stepped::Failed(error) => assert_eq!(error.to_string(), "E"),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn delay_panic_is_attempted() {
        let io: IO<i32> = IO::delay(|| panic!("E"));
        let outcome = io.attempt().run_unsafe().unwrap();
        assert!(matches!(outcome, Err(IoError::Panic { ref message }) if message == "E"));
    }

    #[test]
    fn delay_result_converts_error() {
        let io: IO<i32> = IO::delay_result(|| Err("parse failed"));
        assert_eq!(io.run_unsafe().unwrap_err().to_string(), "parse failed");
    }

    #[test]
    fn handler_is_skipped_on_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let io = IO::pure(5)
            .handle_error_with(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                IO::pure(0)
            })
            .map(|x| x * 2);
        assert_eq!(io.run_unsafe().unwrap(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_runs_once_and_skips_queued_success_frames() {
        let handled = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));
        let handled_counter = Arc::clone(&handled);
        let skipped_counter = Arc::clone(&skipped);

        let io = IO::<i32>::raise_error(IoError::msg("E"))
            .flat_map(move |x| {
                skipped_counter.fetch_add(1, Ordering::SeqCst);
                IO::pure(x)
            })
            .handle_error_with(move |error| {
                handled_counter.fetch_add(1, Ordering::SeqCst);
                IO::pure(error.to_string().len() as i32)
            });

        assert_eq!(io.run_unsafe().unwrap(), 1);
        assert_eq!(handled.load(Ordering::SeqCst), 1);
        assert_eq!(skipped.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn attempt_wraps_success() {
        assert_eq!(IO::pure(3).attempt().run_unsafe().unwrap().ok(), Some(3));
    }

    #[test]
    fn map2_runs_left_first() {
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let left_log = Arc::clone(&order);
        let right_log = Arc::clone(&order);
        let io = IO::new(move || left_log.lock().push("left"))
            .map2(IO::new(move || right_log.lock().push("right")), |(), ()| ());
        io.run_unsafe().unwrap();
        assert_eq!(*order.lock(), vec!["left", "right"]);
    }

    #[test]
    fn product_and_apply() {
        assert_eq!(IO::pure(1).product(IO::pure("a")).run_unsafe().unwrap(), (1, "a"));
        let io = IO::pure(|x: i32| x * 3).apply(IO::pure(5));
        assert_eq!(io.run_unsafe().unwrap(), 15);
    }

    #[test]
    fn tail_rec_m_is_stack_safe() {
        let io = IO::tail_rec_m(0_u32, |n| {
            IO::pure(if n == 100_000 { Either::Right(n) } else { Either::Left(n + 1) })
        });
        assert_eq!(io.run_unsafe().unwrap(), 100_000);
    }

    #[test]
    fn step_suspends_on_pending_async() {
        let io = IO::<i32>::never().map(|x| x + 1);
        let Stepped::Suspended(rest) = io.step() else {
            panic!("expected suspension");
        };
        assert_eq!(rest.run_unsafe_timed(Duration::from_millis(10)).unwrap(), None);
    }

    #[test]
    fn step_then_run_completes_async() {
        let io = IO::async_io(|callback| {
            thread::spawn(move || callback.succeed(20));
        })
        .map(|x: i32| x + 1);

        match io.step() {
            Stepped::Suspended(rest) => assert_eq!(rest.run_unsafe().unwrap(), 21),
            other => panic!("expected suspension, got {other:?}"),
        }
    }

    #[test]
    fn debug_shows_node_tag() {
        assert_eq!(format!("{:?}", IO::pure(1)), "IO(Pure)");
        assert_eq!(format!("{:?}", IO::pure(1).map(|x| x)), "IO(Map)");
    }
}
