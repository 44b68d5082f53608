//! Exactly-once resumption across asynchronous boundaries.
//!
//! A [`RestartCallback`] is created the first time an execution reaches an
//! `Async` node and is reused for every later hop of the same execution.
//! Each hop arms a fresh generation; the [`Resume`] handle given to the
//! registration carries that generation and only resumes the run loop if it
//! is still the armed one. Late or duplicate invocations, including those of
//! a handle from an earlier hop, are ignored.
//!
//! When a registration completes its callback before returning, the outcome
//! is parked and picked up by the thread that called the registration. The
//! run loop then continues in its own loop instead of nesting a new one, so
//! chains of synchronously completing `Async` nodes stay stack-safe.

use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

use super::frame::CallStack;
use super::node::{Node, Outcome, Registration, Resume, Value};
use super::run_loop;
use crate::effect::IoError;

/// Receives the final outcome of an execution.
pub(crate) type Completion = Box<dyn FnOnce(Outcome) + Send>;

/// A panic payload as returned by `catch_unwind`.
pub(crate) type PanicPayload = Box<dyn Any + Send>;

/// What a registration left behind when it returned.
pub(crate) struct Registered {
    /// The delivered outcome, if the callback fired before the registration
    /// returned.
    pub(crate) resumed: Option<(Node, CallStack)>,
    /// A panic that escaped the registration after the callback had already
    /// fired. The caller keeps driving `resumed` and re-throws it afterwards.
    pub(crate) panic: Option<PanicPayload>,
}

const DISARMED: u64 = 0;

enum Phase {
    Idle,
    Registering,
    Delivered(Node, CallStack),
}

struct RestartState {
    armed: AtomicU64,
    generations: AtomicU64,
    stack: Mutex<Option<CallStack>>,
    phase: Mutex<Phase>,
    completion: Mutex<Option<Completion>>,
}

/// The resumption handle of one logical execution.
#[derive(Clone)]
pub(crate) struct RestartCallback {
    state: Arc<RestartState>,
}

impl RestartCallback {
    pub(crate) fn new(completion: Completion) -> Self {
        Self {
            state: Arc::new(RestartState {
                armed: AtomicU64::new(DISARMED),
                generations: AtomicU64::new(DISARMED),
                stack: Mutex::new(None),
                phase: Mutex::new(Phase::Idle),
                completion: Mutex::new(Some(completion)),
            }),
        }
    }

    /// Saves `stack` and arms a new generation.
    fn prepare(&self, stack: CallStack) -> u64 {
        let generation = self.state.generations.fetch_add(1, Ordering::Relaxed) + 1;
        *self.state.stack.lock() = Some(stack);
        self.state.armed.store(generation, Ordering::Release);
        generation
    }

    /// Hands a fresh resume handle to `registration`.
    ///
    /// The returned [`Registered::resumed`] holds the node and stack to
    /// continue with when the callback fired before the registration
    /// returned. It is `None` when resumption is left to whichever thread
    /// completes the callback later.
    ///
    /// A panic escaping the registration is delivered as
    /// [`IoError::Panic`] if the callback had not fired yet. Otherwise the
    /// delivered outcome is kept and the payload is handed back for the
    /// caller to re-throw once it has driven that outcome.
    pub(crate) fn register(&self, registration: Registration, stack: CallStack) -> Registered {
        trace!(depth = stack.len(), "async boundary reached");
        *self.state.phase.lock() = Phase::Registering;
        let generation = self.prepare(stack);

        let callback = self.clone();
        let resume: Resume = Arc::new(move |outcome: Outcome| {
            callback.invoke(generation, outcome);
        });

        let mut escaped = None;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| registration(resume))) {
            if !self.invoke(generation, Err(IoError::from_panic(payload.as_ref()))) {
                debug!(generation, "registration panicked after delivering its outcome");
                escaped = Some(payload);
            }
        }

        let resumed = match std::mem::replace(&mut *self.state.phase.lock(), Phase::Idle) {
            Phase::Delivered(node, stack) => Some((node, stack)),
            Phase::Idle | Phase::Registering => None,
        };
        Registered {
            resumed,
            panic: escaped,
        }
    }

    /// Resumes the execution if `generation` is still armed.
    fn invoke(&self, generation: u64, outcome: Outcome) -> bool {
        if self
            .state
            .armed
            .compare_exchange(generation, DISARMED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(generation, "duplicate or stale async callback ignored");
            return false;
        }

        let Some(stack) = self.state.stack.lock().take() else {
            warn!(generation, "armed restart callback had no saved frames");
            return false;
        };
        let node = match outcome {
            Ok(value) => Node::Pure(value),
            Err(error) => Node::RaiseError(error),
        };

        let mut phase = self.state.phase.lock();
        if matches!(*phase, Phase::Registering) {
            *phase = Phase::Delivered(node, stack);
            return true;
        }
        drop(phase);

        trace!(generation, depth = stack.len(), "resuming after async boundary");
        run_loop::resume(node, stack, self.clone());
        true
    }

    /// Delivers the final outcome of the execution.
    pub(crate) fn complete(&self, outcome: Outcome) {
        let completion = self.state.completion.lock().take();
        match completion {
            Some(completion) => completion(outcome),
            None => warn!("execution already completed; dropping outcome"),
        }
    }

    #[cfg(test)]
    fn is_armed(&self) -> bool {
        self.state.armed.load(Ordering::Acquire) != DISARMED
    }
}

// =============================================================================
// AsyncCallback
// =============================================================================

/// The callback handed to an asynchronous registration.
///
/// It can be cloned and sent to other threads. The first completion wins;
/// every later call is ignored.
///
/// # Examples
///
/// ```rust
/// use lambars_io::effect::IO;
/// use std::thread;
///
/// let io = IO::async_io(|callback| {
///     thread::spawn(move || callback.succeed(5));
/// });
/// assert_eq!(io.run_unsafe().unwrap(), 5);
/// ```
pub struct AsyncCallback<A> {
    resume: Resume,
    _marker: PhantomData<fn(A)>,
}

impl<A: Send + 'static> AsyncCallback<A> {
    pub(crate) fn new(resume: Resume) -> Self {
        Self {
            resume,
            _marker: PhantomData,
        }
    }

    /// Completes the computation with `result`.
    pub fn complete(&self, result: Result<A, IoError>) {
        (self.resume)(result.map(|value| Box::new(value) as Value));
    }

    /// Completes the computation with a success value.
    pub fn succeed(&self, value: A) {
        self.complete(Ok(value));
    }

    /// Completes the computation with a failure.
    pub fn fail(&self, error: IoError) {
        self.complete(Err(error));
    }
}

impl<A> Clone for AsyncCallback<A> {
    fn clone(&self) -> Self {
        Self {
            resume: Arc::clone(&self.resume),
            _marker: PhantomData,
        }
    }
}

impl<A> fmt::Debug for AsyncCallback<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("AsyncCallback")
    }
}
