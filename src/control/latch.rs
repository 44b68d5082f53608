//! One-shot synchronization latch.
//!
//! A `OneShotLatch<T>` is completed at most once, from any thread, and
//! handed to exactly one waiter. It is how blocking entry points wait for a
//! computation that finishes on another thread.
//!
//! # Examples
//!
//! ```rust
//! use lambars_io::control::OneShotLatch;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let latch = Arc::new(OneShotLatch::new());
//! let producer = Arc::clone(&latch);
//! thread::spawn(move || {
//!     producer.complete(42);
//! });
//! assert_eq!(latch.wait(), 42);
//! ```

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::time::{Duration, Instant};

enum LatchState<T> {
    Empty,
    Ready(T),
    Taken,
}

/// A latch that carries a single value from one producer to one waiter.
pub struct OneShotLatch<T> {
    state: Mutex<LatchState<T>>,
    ready: Condvar,
}

impl<T> OneShotLatch<T> {
    /// Creates an empty latch.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(LatchState::Empty),
            ready: Condvar::new(),
        }
    }

    /// Stores `value` and wakes the waiter.
    ///
    /// Returns `false` (dropping `value`) if the latch was already completed.
    pub fn complete(&self, value: T) -> bool {
        let mut state = self.state.lock();
        if !matches!(*state, LatchState::Empty) {
            return false;
        }
        *state = LatchState::Ready(value);
        drop(state);
        self.ready.notify_all();
        true
    }

    /// Returns `true` once a value has been stored, even if already taken.
    pub fn is_completed(&self) -> bool {
        !matches!(*self.state.lock(), LatchState::Empty)
    }

    /// Blocks until the latch is completed and takes the value.
    ///
    /// # Panics
    ///
    /// Panics if the value was already taken by a previous wait.
    pub fn wait(&self) -> T {
        let mut state = self.state.lock();
        loop {
            match std::mem::replace(&mut *state, LatchState::Taken) {
                LatchState::Ready(value) => return value,
                LatchState::Taken => panic!("OneShotLatch: value already taken"),
                LatchState::Empty => {
                    *state = LatchState::Empty;
                    self.ready.wait(&mut state);
                }
            }
        }
    }

    /// Blocks for at most `timeout`, taking the value if it arrived.
    ///
    /// Returns `None` when the deadline passed first. At least `timeout` has
    /// elapsed when `None` is returned.
    pub fn wait_for(&self, timeout: Duration) -> Option<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.wait());
        };
        let mut state = self.state.lock();
        loop {
            match std::mem::replace(&mut *state, LatchState::Taken) {
                LatchState::Ready(value) => return Some(value),
                LatchState::Taken => return None,
                LatchState::Empty => {
                    *state = LatchState::Empty;
                    if Instant::now() >= deadline {
                        return None;
                    }
                    self.ready.wait_until(&mut state, deadline);
                }
            }
        }
    }
}

impl<T> Default for OneShotLatch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for OneShotLatch<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("OneShotLatch")
            .field("completed", &self.is_completed())
            .finish()
    }
}
