//! Continuation frames and the explicit call stack of the run loop.
//!
//! The stack keeps its top frame in a dedicated slot. The common case of a
//! single pending continuation never touches the `SmallVec`, and up to
//! [`INLINE_FRAMES`] further frames live inline before the stack spills to
//! the heap.

use smallvec::SmallVec;

use super::node::{Node, Value};
use crate::effect::IoError;

const INLINE_FRAMES: usize = 8;

pub(crate) type BindFn = Box<dyn FnOnce(Value) -> Node + Send>;
pub(crate) type MapFn = Box<dyn FnOnce(Value) -> Value + Send>;
pub(crate) type RecoverFn = Box<dyn FnOnce(IoError) -> Node + Send>;

// =============================================================================
// Frame
// =============================================================================

/// A pending continuation.
pub(crate) enum Frame {
    /// Continues with the success value.
    Bind(BindFn),
    /// Transforms the success value without producing a new node.
    Map(MapFn),
    /// Recovers from a failure. Success values pass through untouched.
    Handler(RecoverFn),
    /// Handles both outcomes, as `attempt` and `redeem_with` do.
    Fold { succeed: BindFn, recover: RecoverFn },
}

/// The success side of a frame popped by [`CallStack::pop_success`].
pub(crate) enum Continuation {
    Bind(BindFn),
    Map(MapFn),
}

// =============================================================================
// CallStack
// =============================================================================

/// LIFO stack of pending frames owned by one in-flight execution.
#[derive(Default)]
pub(crate) struct CallStack {
    top: Option<Frame>,
    rest: SmallVec<[Frame; INLINE_FRAMES]>,
}

impl CallStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, frame: Frame) {
        if let Some(previous) = self.top.replace(frame) {
            self.rest.push(previous);
        }
    }

    fn pop(&mut self) -> Option<Frame> {
        self.top.take().or_else(|| self.rest.pop())
    }

    /// Pops the next frame that acts on success values.
    ///
    /// Pure recovery frames are discarded on the way: they never transform
    /// a success value.
    pub(crate) fn pop_success(&mut self) -> Option<Continuation> {
        loop {
            match self.pop()? {
                Frame::Bind(function) | Frame::Fold { succeed: function, .. } => {
                    return Some(Continuation::Bind(function));
                }
                Frame::Map(function) => return Some(Continuation::Map(function)),
                Frame::Handler(_) => {}
            }
        }
    }

    /// Unwinds to the nearest frame able to recover from a failure.
    ///
    /// Every success-only frame above it is dropped without being invoked.
    pub(crate) fn pop_recovery(&mut self) -> Option<RecoverFn> {
        loop {
            match self.pop()? {
                Frame::Handler(recover) | Frame::Fold { recover, .. } => return Some(recover),
                Frame::Bind(_) | Frame::Map(_) => {}
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        usize::from(self.top.is_some()) + self.rest.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.top.is_none()
    }
}
