//! Monadic comprehensions written as `async` blocks.
//!
//! A comprehension body is an `async` block that receives a [`Binder`]. Each
//! `binder.bind(fa).await` is a suspension point: the body stops, the driver
//! builds exactly one `flat_map` of `fa` whose continuation feeds the value
//! back and polls the body again. The body is polled with a no-op waker and
//! never by an executor, so it must not await anything but bind points; doing
//! so fails the comprehension with [`IoError::InvalidSuspension`].
//!
//! Each binder only answers to the comprehension that created it, so nested
//! comprehensions stay independent even though they share the same driving
//! mechanism.
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::effect::IO;
//!
//! let io = IO::binding(|binder| async move {
//!     let a = binder.bind(IO::pure(1)).await;
//!     let b = binder.bind_defer(move || a + 1).await;
//!     a + b
//! });
//! assert_eq!(io.run_unsafe().unwrap(), 3);
//! ```
//!
//! # Cancellation
//!
//! [`IO::binding_cancellable`] also returns a [`Disposable`]. Once disposed,
//! the next resumption raises [`IoError::Cancelled`] through the error
//! channel instead of resuming the body. A synchronous segment that is
//! already running is never interrupted.
//!
//! ```rust
//! use lambars_io::effect::{IO, IoError};
//! use std::time::Duration;
//!
//! let (io, disposable) = IO::binding_cancellable(|binder| async move {
//!     binder.bind(IO::sleep(Duration::from_millis(50))).await;
//!     "finished"
//! });
//! disposable.dispose();
//! assert!(io.run_unsafe().unwrap_err().is_cancelled());
//! ```

mod context;

pub use context::{ExecutionContext, Immediate, NewThread, Task};

use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use tracing::debug;

use crate::effect::io::node::{Value, unbox};
use crate::effect::{IO, IoError, IoKind, MonadDefer, MonadError};
use crate::typeclass::{Kind, Monad};

type Erased<K> = <K as Kind>::Of<Value>;
type ResumeFn<K> = Box<dyn FnOnce(Value) -> Erased<K> + Send>;
type Suspension<K> = Box<dyn FnOnce(ResumeFn<K>) -> Erased<K> + Send>;

/// Hand-off between a comprehension body and its driver.
struct Exchange<K: Kind> {
    slot: Mutex<Option<Suspension<K>>>,
    inbox: Mutex<Option<Value>>,
}

impl<K: Kind> Exchange<K> {
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            inbox: Mutex::new(None),
        }
    }
}

// =============================================================================
// Binder
// =============================================================================

/// The suspension-point factory handed to a comprehension body.
pub struct Binder<K: Kind> {
    exchange: Arc<Exchange<K>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<K: Monad + 'static> Binder<K> {
    /// Waits for `fa` and yields its value.
    ///
    /// If `fa` fails, the rest of the body is skipped and the comprehension
    /// fails with the same error.
    pub fn bind<T>(&self, fa: K::Of<T>) -> BindPoint<K, T>
    where
        T: Send + 'static,
    {
        let suspension: Suspension<K> = Box::new(move |resume: ResumeFn<K>| {
            K::flat_map(fa, move |value: T| resume(Box::new(value)))
        });
        BindPoint {
            suspension: Some(suspension),
            exchange: Arc::clone(&self.exchange),
            _marker: PhantomData,
        }
    }

    /// Returns `true` once the comprehension has been disposed.
    ///
    /// Always `false` for comprehensions that cannot be cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }
}

impl<K: MonadDefer + 'static> Binder<K> {
    /// Runs `thunk` as a deferred effect and yields its value.
    pub fn bind_defer<T, F>(&self, thunk: F) -> BindPoint<K, T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.bind(K::delay(thunk))
    }

    /// Runs a fallible `thunk` as a deferred effect. An `Err` fails the
    /// comprehension.
    pub fn bind_defer_result<T, F>(&self, thunk: F) -> BindPoint<K, T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, IoError> + Send + 'static,
    {
        self.bind(K::delay_result(thunk))
    }

    /// Runs `thunk` on `context` now and waits for it.
    ///
    /// The current resumption blocks until the task finishes. A panic or a
    /// dropped task fails the comprehension.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    /// use lambars_io::effect::binding::NewThread;
    /// use std::thread;
    ///
    /// let io = IO::binding(|binder| async move {
    ///     let caller = thread::current().id();
    ///     let worker = binder.bind_in(&NewThread, || thread::current().id()).await;
    ///     caller != worker
    /// });
    /// assert!(io.run_unsafe().unwrap());
    /// ```
    pub fn bind_in<C, T, F>(&self, context: &C, thunk: F) -> BindPoint<K, T>
    where
        C: ExecutionContext + ?Sized,
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.bind(K::from_result(context::run_in(context, thunk)))
    }

    /// Like [`Binder::bind_in`], but the task is only handed to `context`
    /// when the returned bind point is resumed by the driver.
    pub fn bind_defer_in<C, T, F>(&self, context: C, thunk: F) -> BindPoint<K, T>
    where
        C: ExecutionContext + Send + 'static,
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.bind(K::suspend(move || {
            K::from_result(context::run_in(&context, thunk))
        }))
    }
}

impl<K: Kind> fmt::Debug for Binder<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Binder")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

/// A suspension point created by [`Binder::bind`]. Await it inside the body.
#[must_use = "bind points do nothing unless awaited"]
pub struct BindPoint<K: Kind, T> {
    suspension: Option<Suspension<K>>,
    exchange: Arc<Exchange<K>>,
    _marker: PhantomData<fn() -> T>,
}

impl<K: Kind, T: 'static> Future for BindPoint<K, T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, _context: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();
        if let Some(suspension) = this.suspension.take() {
            *this.exchange.slot.lock() = Some(suspension);
            return Poll::Pending;
        }
        match this.exchange.inbox.lock().take() {
            Some(value) => Poll::Ready(unbox(value)),
            None => Poll::Pending,
        }
    }
}

// =============================================================================
// Disposable
// =============================================================================

/// Cancels a comprehension at its next resumption point.
#[derive(Debug, Clone)]
pub struct Disposable {
    flag: Arc<AtomicBool>,
}

impl Disposable {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests cancellation. Idempotent; a no-op after completion.
    pub fn dispose(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns `true` once [`Disposable::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

// =============================================================================
// Driver
// =============================================================================

struct Driver<K: Kind> {
    body: Pin<Box<dyn Future<Output = Value> + Send>>,
    exchange: Arc<Exchange<K>>,
    cancel: Option<Arc<AtomicBool>>,
    raise: fn(IoError) -> Erased<K>,
}

impl<K: Monad + 'static> Driver<K> {
    fn poll_body(mut self) -> Erased<K> {
        let mut context = Context::from_waker(futures::task::noop_waker_ref());
        match self.body.as_mut().poll(&mut context) {
            Poll::Ready(value) => K::pure(value),
            Poll::Pending => {
                let suspension = self.exchange.slot.lock().take();
                match suspension {
                    Some(suspension) => suspension(Box::new(move |value: Value| self.resume(value))),
                    None => (self.raise)(IoError::InvalidSuspension),
                }
            }
        }
    }

    fn resume(self, value: Value) -> Erased<K> {
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
        {
            debug!("binding cancelled at resumption point");
            return (self.raise)(IoError::Cancelled);
        }
        *self.exchange.inbox.lock() = Some(value);
        self.poll_body()
    }
}

/// Marks a comprehension that a plain monad could not fail through its own
/// channel.
struct Aborted(IoError);

fn abort<K: Monad>(error: IoError) -> Erased<K> {
    K::pure(Box::new(Aborted(error)) as Value)
}

fn settle<R: 'static>(value: Value) -> Result<R, IoError> {
    match value.downcast::<Aborted>() {
        Ok(aborted) => Err(aborted.0),
        Err(value) => Ok(unbox(value)),
    }
}

fn launch<K, R, F, Fut>(
    body: F,
    cancel: Option<Arc<AtomicBool>>,
    raise: fn(IoError) -> Erased<K>,
) -> Erased<K>
where
    K: Monad + 'static,
    R: Send + 'static,
    F: FnOnce(Binder<K>) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let exchange = Arc::new(Exchange::new());
    let binder = Binder {
        exchange: Arc::clone(&exchange),
        cancel: cancel.clone(),
    };
    let future = body(binder);
    let driver = Driver {
        body: Box::pin(async move { Box::new(future.await) as Value }),
        exchange,
        cancel,
        raise,
    };
    driver.poll_body()
}

/// Runs a comprehension over a monad with an [`IoError`] channel.
///
/// Awaiting anything other than a bind point fails with
/// [`IoError::InvalidSuspension`].
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::IoError;
/// use lambars_io::effect::binding::binding;
/// use lambars_io::typeclass::ResultKind;
///
/// let sum = binding::<ResultKind<IoError>, _, _, _>(|binder| async move {
///     let a = binder.bind(Ok(1)).await;
///     let b = binder.bind(Ok(2)).await;
///     a + b
/// });
/// assert_eq!(sum.unwrap(), 3);
/// ```
pub fn binding<K, R, F, Fut>(body: F) -> K::Of<R>
where
    K: MonadError<IoError> + 'static,
    R: Send + 'static,
    F: FnOnce(Binder<K>) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    K::map(launch(body, None, K::raise_error::<Value>), unbox::<R>)
}

/// Runs a comprehension over any monad.
///
/// Strict monads such as `Option` run the body before returning. A monad
/// without an [`IoError`] channel cannot fail on a foreign await, so the
/// result of the body is wrapped: `Err(IoError::InvalidSuspension)` reports
/// a body that awaited something other than a bind point.
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::binding::try_binding;
/// use lambars_io::typeclass::OptionKind;
///
/// let sum = try_binding::<OptionKind, _, _, _>(|binder| async move {
///     let a = binder.bind(Some(1)).await;
///     let b = binder.bind(Some(2)).await;
///     a + b
/// });
/// assert_eq!(sum.and_then(Result::ok), Some(3));
///
/// let missing = try_binding::<OptionKind, _, _, _>(|binder| async move {
///     let a = binder.bind(Some(1)).await;
///     let b = binder.bind(None::<i32>).await;
///     a + b
/// });
/// assert!(missing.is_none());
/// ```
pub fn try_binding<K, R, F, Fut>(body: F) -> K::Of<Result<R, IoError>>
where
    K: Monad + 'static,
    R: Send + 'static,
    F: FnOnce(Binder<K>) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    K::map(launch(body, None, abort::<K>), settle::<R>)
}

/// Runs a cancellable comprehension over a monad with an [`IoError`]
/// channel.
pub fn binding_cancellable<K, R, F, Fut>(body: F) -> (K::Of<R>, Disposable)
where
    K: MonadError<IoError> + 'static,
    R: Send + 'static,
    F: FnOnce(Binder<K>) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
{
    let disposable = Disposable::new();
    let fa = launch(
        body,
        Some(Arc::clone(&disposable.flag)),
        K::raise_error::<Value>,
    );
    (K::map(fa, unbox::<R>), disposable)
}

// =============================================================================
// IO entry points
// =============================================================================

impl<A: Send + 'static> IO<A> {
    /// A comprehension over `IO`. The body starts when the IO is run.
    ///
    /// Awaiting anything other than a bind point fails with
    /// [`IoError::InvalidSuspension`].
    pub fn binding<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Binder<IoKind>) -> Fut + Send + 'static,
        Fut: Future<Output = A> + Send + 'static,
    {
        Self::suspend(move || binding::<IoKind, _, _, _>(body))
    }

    /// A comprehension over `IO` that can be cancelled through the returned
    /// [`Disposable`].
    pub fn binding_cancellable<F, Fut>(body: F) -> (Self, Disposable)
    where
        F: FnOnce(Binder<IoKind>) -> Fut + Send + 'static,
        Fut: Future<Output = A> + Send + 'static,
    {
        let disposable = Disposable::new();
        let cancel = Arc::clone(&disposable.flag);
        let io = Self::suspend(move || {
            launch(body, Some(cancel), IoKind::raise_error::<Value>).map(unbox::<A>)
        });
        (io, disposable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeclass::{OptionKind, ResultKind};
    use rstest::rstest;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    static_assertions::assert_impl_all!(Disposable: Send, Sync, Clone);
    static_assertions::assert_impl_all!(Binder<IoKind>: Send, Sync);
    static_assertions::assert_impl_all!(BindPoint<IoKind, String>: Send);

    #[test]
    fn io_binding_runs_sequentially() {
        let io = IO::binding(|binder| async move {
            let a = binder.bind(IO::pure(1)).await;
            let b = binder.bind(IO::pure(a + 1)).await;
            let c = binder.bind(IO::pure(b + 1)).await;
            vec![a, b, c]
        });
        assert_eq!(io.run_unsafe().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn io_binding_is_lazy() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let io = IO::binding(move |binder| async move {
            binder
                .bind_defer(move || counter.fetch_add(1, Ordering::SeqCst))
                .await
        });
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        io.run_unsafe().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_skips_rest_of_body() {
        let reached = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reached);
        let io = IO::binding(move |binder| async move {
            binder.bind(IO::<()>::raise_error(IoError::msg("E"))).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(io.run_unsafe().unwrap_err().to_string(), "E");
        assert_eq!(reached.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failure_is_recoverable_outside() {
        let io = IO::binding(|binder| async move {
            binder
                .bind_defer_result(|| Err::<i32, _>(IoError::msg("nope")))
                .await
        })
        .handle_error(|_| -1);
        assert_eq!(io.run_unsafe().unwrap(), -1);
    }

    #[test]
    fn foreign_await_is_invalid_suspension() {
        let io = IO::binding(|_binder| async move {
            futures::future::pending::<()>().await;
            1
        });
        assert!(matches!(
            io.run_unsafe(),
            Err(IoError::InvalidSuspension)
        ));
    }

    #[test]
    fn binder_of_other_comprehension_is_rejected() {
        let io = IO::binding(|outer| async move {
            let inner = IO::binding(move |_inner| async move { outer.bind(IO::pure(1)).await });
            inner.attempt().run_unsafe().unwrap()
        });
        let result = io.run_unsafe().unwrap();
        assert!(matches!(result, Err(IoError::InvalidSuspension)));
    }

    #[test]
    fn async_steps_resume_on_other_threads() {
        let io = IO::binding(|binder| async move {
            let first = binder
                .bind(IO::async_io(|callback| {
                    thread::spawn(move || callback.succeed(2));
                }))
                .await;
            let second = binder.bind(IO::sleep(Duration::from_millis(5)).map(move |()| first * 10)).await;
            first + second
        });
        assert_eq!(io.run_unsafe().unwrap(), 22);
    }

    #[test]
    fn deep_binding_is_stack_safe() {
        let io = IO::binding(|binder| async move {
            let mut total = 0_u64;
            for n in 0..10_000_u64 {
                total += binder.bind(IO::pure(n)).await;
            }
            total
        });
        assert_eq!(io.run_unsafe().unwrap(), 49_995_000);
    }

    #[test]
    fn dispose_before_async_step_cancels() {
        let downstream = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&downstream);
        let (io, disposable) = IO::binding_cancellable(move |binder| async move {
            binder.bind(IO::sleep(Duration::from_millis(50))).await;
            counter.fetch_add(1, Ordering::SeqCst);
            binder.bind(IO::pure(1)).await
        });

        let pending = io.run_unsafe_timed(Duration::from_millis(0));
        assert!(matches!(pending, Ok(None)));
        disposable.dispose();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(downstream.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancellation_is_an_ordinary_error() {
        let (io, disposable) = IO::binding_cancellable(|binder| async move {
            binder.bind(IO::pure(1)).await
        });
        disposable.dispose();
        let recovered = io.handle_error_with(|error| IO::pure(i32::from(error.is_cancelled())));
        assert_eq!(recovered.run_unsafe().unwrap(), 1);
    }

    #[test]
    fn dispose_after_completion_is_noop() {
        let (io, disposable) = IO::binding_cancellable(|binder| async move {
            binder.bind(IO::pure("done")).await
        });
        assert_eq!(io.run_unsafe().unwrap(), "done");
        disposable.dispose();
        disposable.dispose();
        assert!(disposable.is_disposed());
    }

    #[test]
    fn binder_observes_cancellation() {
        let (io, disposable) = IO::binding_cancellable(|binder| async move {
            let before = binder.is_cancelled();
            (before, binder)
        });
        let (before, binder) = io.run_unsafe().unwrap();
        assert!(!before);
        disposable.dispose();
        assert!(binder.is_cancelled());
    }

    #[rstest]
    #[case(Some(2), Some(5))]
    #[case(None, None)]
    fn option_comprehension(#[case] second: Option<i32>, #[case] expected: Option<i32>) {
        let result = try_binding::<OptionKind, _, _, _>(move |binder| async move {
            let a = binder.bind(Some(3)).await;
            let b = binder.bind(second).await;
            a + b
        });
        assert_eq!(result.map(|settled| settled.ok()), expected.map(Some));
    }

    #[test]
    fn foreign_await_in_plain_monad_is_reported() {
        let result = try_binding::<OptionKind, _, _, _>(|binder| async move {
            let a = binder.bind(Some(1)).await;
            futures::future::pending::<()>().await;
            a
        });
        assert!(matches!(result, Some(Err(IoError::InvalidSuspension))));
    }

    #[test]
    fn foreign_await_in_result_comprehension_raises() {
        let result = binding::<ResultKind<IoError>, _, _, _>(|_binder| async move {
            futures::future::pending::<i32>().await
        });
        assert!(matches!(result, Err(IoError::InvalidSuspension)));
    }

    #[test]
    fn result_comprehension_with_context() {
        let (result, _disposable) =
            binding_cancellable::<ResultKind<IoError>, _, _, _>(|binder| async move {
                let a = binder.bind(Ok(20)).await;
                let b = binder.bind_in(&NewThread, move || a + 1).await;
                binder.bind_defer(move || b * 2).await
            });
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn bind_in_panic_fails_comprehension() {
        let io = IO::binding(|binder| async move {
            binder
                .bind_in(&NewThread, || -> i32 { panic!("worker exploded") })
                .await
        });
        assert!(io.run_unsafe().unwrap_err().is_panic());
    }

    #[test]
    fn bind_defer_in_waits_for_context() {
        let io = IO::binding(|binder| async move {
            let a = binder.bind_defer_in(NewThread, || 4).await;
            binder.bind_defer_in(Immediate, move || a * 4).await
        });
        assert_eq!(io.run_unsafe().unwrap(), 16);
    }
}
