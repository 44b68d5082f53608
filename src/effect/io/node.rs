//! Type-erased computation nodes.
//!
//! Every `IO<A>` is a thin typed wrapper around a [`Node`]. Values travel
//! through the run loop as `Box<dyn Any + Send>` and are downcast back to
//! their static type only at the typed boundary (continuations created by
//! `IO` combinators and the runners).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::frame::{Frame, MapFn};
use crate::effect::IoError;

// =============================================================================
// Erased Value Types
// =============================================================================

/// A success value with its static type erased.
pub(crate) type Value = Box<dyn Any + Send>;

/// The result of an erased computation.
pub(crate) type Outcome = Result<Value, IoError>;

/// A synchronous side effect producing a value or a failure.
pub(crate) type Thunk = Box<dyn FnOnce() -> Outcome + Send>;

/// Deferred construction of another node.
pub(crate) type SuspendThunk = Box<dyn FnOnce() -> Node + Send>;

/// The handle an asynchronous registration completes.
///
/// It may be cloned, moved to another thread and invoked more than once;
/// only the first invocation for a given registration has any effect.
pub(crate) type Resume = Arc<dyn Fn(Outcome) + Send + Sync>;

/// A callback-based asynchronous operation.
pub(crate) type Registration = Box<dyn FnOnce(Resume) + Send>;

// =============================================================================
// Node
// =============================================================================

/// A suspended computation.
pub(crate) enum Node {
    Pure(Value),
    RaiseError(IoError),
    Delay(Thunk),
    Suspend(SuspendThunk),
    Async(Registration),
    /// Runs the source, then hands its outcome to the frame.
    Bind(Box<Node>, Frame),
    Map(Box<Node>, MapFn),
}

impl Node {
    pub(crate) fn pure<A: Send + 'static>(value: A) -> Self {
        Self::Pure(Box::new(value))
    }

    pub(crate) const fn tag(&self) -> &'static str {
        match self {
            Self::Pure(_) => "Pure",
            Self::RaiseError(_) => "RaiseError",
            Self::Delay(_) => "Delay",
            Self::Suspend(_) => "Suspend",
            Self::Async(_) => "Async",
            Self::Bind(..) => "Bind",
            Self::Map(..) => "Map",
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RaiseError(error) => formatter.debug_tuple("RaiseError").field(error).finish(),
            other => formatter.write_str(other.tag()),
        }
    }
}

/// Recovers the static type of a value produced by a typed combinator.
///
/// # Panics
///
/// Panics if the value does not have type `A`. Typed `IO` construction
/// guarantees it does.
pub(crate) fn unbox<A: 'static>(value: Value) -> A {
    *value
        .downcast::<A>()
        .expect("Type mismatch between IO node and continuation")
}
