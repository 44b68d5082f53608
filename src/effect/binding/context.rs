//! Execution contexts for `bind_in`.
//!
//! An [`ExecutionContext`] decides where a task runs. The comprehension that
//! hands a task over blocks on a [`OneShotLatch`] until the task reports
//! back, so failures on the other side come back as ordinary [`IoError`]s.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::warn;

use crate::control::OneShotLatch;
use crate::effect::IoError;

/// A unit of work handed to an [`ExecutionContext`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere a task can run.
///
/// Implementations may run the task inline, on another thread or on a pool.
/// Dropping a task without running it is allowed: the waiting side then
/// observes an error instead of blocking forever.
pub trait ExecutionContext {
    /// Schedules `task`.
    fn execute(&self, task: Task);
}

/// Runs every task on a freshly spawned OS thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewThread;

impl ExecutionContext for NewThread {
    fn execute(&self, task: Task) {
        let spawned = thread::Builder::new()
            .name("lambars-io-worker".to_string())
            .spawn(task);
        if let Err(error) = spawned {
            warn!(%error, "failed to spawn worker thread");
        }
    }
}

/// Runs every task on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl ExecutionContext for Immediate {
    fn execute(&self, task: Task) {
        task();
    }
}

impl<C: ExecutionContext + ?Sized> ExecutionContext for Arc<C> {
    fn execute(&self, task: Task) {
        (**self).execute(task);
    }
}

/// Runs tasks on the runtime's blocking pool.
#[cfg(feature = "async")]
impl ExecutionContext for tokio::runtime::Handle {
    fn execute(&self, task: Task) {
        drop(self.spawn_blocking(task));
    }
}

/// Completes the latch with an error if the task is dropped unrun.
struct LatchGuard<T> {
    latch: Arc<OneShotLatch<Result<T, IoError>>>,
}

impl<T> LatchGuard<T> {
    fn complete(self, outcome: Result<T, IoError>) {
        self.latch.complete(outcome);
    }
}

impl<T> Drop for LatchGuard<T> {
    fn drop(&mut self) {
        self.latch
            .complete(Err(IoError::msg("execution context dropped the task")));
    }
}

/// Runs `thunk` on `context` and blocks until it finishes.
///
/// A panic in `thunk` comes back as [`IoError::Panic`].
pub(crate) fn run_in<C, T, F>(context: &C, thunk: F) -> Result<T, IoError>
where
    C: ExecutionContext + ?Sized,
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let latch = Arc::new(OneShotLatch::new());
    let guard = LatchGuard {
        latch: Arc::clone(&latch),
    };
    context.execute(Box::new(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(thunk))
            .map_err(|payload| IoError::from_panic(payload.as_ref()));
        guard.complete(outcome);
    }));
    latch.wait()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Discard;

    impl ExecutionContext for Discard {
        fn execute(&self, task: Task) {
            drop(task);
        }
    }

    #[test]
    fn immediate_runs_on_caller_thread() {
        let caller = thread::current().id();
        let ran_on = run_in(&Immediate, || thread::current().id()).unwrap();
        assert_eq!(ran_on, caller);
    }

    #[test]
    fn new_thread_runs_elsewhere() {
        let caller = thread::current().id();
        let ran_on = run_in(&NewThread, || thread::current().id()).unwrap();
        assert_ne!(ran_on, caller);
    }

    #[test]
    fn panic_is_reported_to_waiter() {
        let result: Result<i32, IoError> = run_in(&NewThread, || panic!("worker failed"));
        assert!(matches!(result, Err(IoError::Panic { ref message }) if message == "worker failed"));
    }

    #[test]
    fn dropped_task_does_not_block() {
        let result = run_in(&Discard, || 1);
        assert_eq!(
            result.unwrap_err().to_string(),
            "execution context dropped the task"
        );
    }

    #[test]
    fn shared_context_delegates() {
        let context: Arc<dyn ExecutionContext + Send + Sync> = Arc::new(Immediate);
        assert_eq!(run_in(&context, || 7).unwrap(), 7);
    }
}
