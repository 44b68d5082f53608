//! The trampolined interpreter for [`Node`] trees.
//!
//! [`drive`] is a single loop over a mutable cursor. Nested `Bind` and `Map`
//! nodes push their continuations onto an explicit [`CallStack`] instead of
//! recursing, so the native stack depth stays constant however long the
//! chain is. Every thunk and continuation runs under `catch_unwind`; a panic
//! becomes a `RaiseError` node and flows through the error channel.
//!
//! There are two entry points:
//!
//! - [`step`] runs synchronously and returns a simpler node (`Pure`,
//!   `RaiseError` or `Async`).
//! - [`start`] runs to completion, crossing asynchronous boundaries through a
//!   [`RestartCallback`], and delivers the outcome to a callback.

use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};

use super::frame::{CallStack, Continuation, Frame};
use super::node::{Node, Outcome, Registration, Resume, Value};
use super::restart::{Completion, PanicPayload, RestartCallback};
use crate::effect::IoError;

/// Where [`drive`] stopped.
pub(crate) enum Exit {
    Done(Value),
    Failed(IoError),
    /// Reached an `Async` node. The frames still pending are handed back.
    Suspended(Registration, CallStack),
}

fn execute_safe<T>(function: impl FnOnce() -> T) -> Result<T, IoError> {
    panic::catch_unwind(AssertUnwindSafe(function))
        .map_err(|payload| IoError::from_panic(payload.as_ref()))
}

fn guarded(function: impl FnOnce() -> Node) -> Node {
    execute_safe(function).unwrap_or_else(Node::RaiseError)
}

/// Runs `current` against `stack` until a result, an unhandled failure or
/// an asynchronous boundary.
pub(crate) fn drive(mut current: Node, mut stack: CallStack) -> Exit {
    loop {
        let value = match current {
            Node::Pure(value) => value,
            Node::RaiseError(error) => match stack.pop_recovery() {
                Some(recover) => {
                    current = guarded(move || recover(error));
                    continue;
                }
                None => return Exit::Failed(error),
            },
            Node::Delay(thunk) => match execute_safe(thunk).and_then(|outcome| outcome) {
                Ok(value) => value,
                Err(error) => {
                    current = Node::RaiseError(error);
                    continue;
                }
            },
            Node::Suspend(thunk) => {
                current = guarded(thunk);
                continue;
            }
            Node::Async(registration) => return Exit::Suspended(registration, stack),
            Node::Bind(source, frame) => {
                stack.push(frame);
                current = *source;
                continue;
            }
            Node::Map(source, function) => {
                stack.push(Frame::Map(function));
                current = *source;
                continue;
            }
        };

        match apply_success(value, &mut stack) {
            ControlFlow::Continue(next) => current = next,
            ControlFlow::Break(value) => return Exit::Done(value),
        }
    }
}

/// Feeds a success value to the pending frames.
///
/// `Map` frames are applied in place. Breaks with the final value once the
/// stack holds no success continuation.
fn apply_success(mut value: Value, stack: &mut CallStack) -> ControlFlow<Value, Node> {
    loop {
        match stack.pop_success() {
            None => return ControlFlow::Break(value),
            Some(Continuation::Map(function)) => match execute_safe(move || function(value)) {
                Ok(mapped) => value = mapped,
                Err(error) => return ControlFlow::Continue(Node::RaiseError(error)),
            },
            Some(Continuation::Bind(function)) => {
                return ControlFlow::Continue(guarded(move || function(value)));
            }
        }
    }
}

/// Evaluates `node` synchronously.
///
/// An `Async` node with pending frames is returned as a new `Async` node
/// that resumes those frames once registered. An `Async` node reached with
/// nothing left to run is returned unchanged.
pub(crate) fn step(node: Node) -> Node {
    match drive(node, CallStack::new()) {
        Exit::Done(value) => Node::Pure(value),
        Exit::Failed(error) => Node::RaiseError(error),
        Exit::Suspended(registration, stack) if stack.is_empty() => Node::Async(registration),
        Exit::Suspended(registration, stack) => {
            Node::Async(Box::new(move |resume: Resume| {
                let restart = RestartCallback::new(Box::new(move |outcome: Outcome| resume(outcome)));
                suspend(registration, stack, &restart);
            }))
        }
    }
}

/// Evaluates `node` to completion and hands the outcome to `completion`.
///
/// Runs on the calling thread up to the first asynchronous boundary that
/// does not complete inline; the rest runs on whichever thread completes it.
pub(crate) fn start(node: Node, completion: Completion) {
    match drive(node, CallStack::new()) {
        Exit::Done(value) => completion(Ok(value)),
        Exit::Failed(error) => completion(Err(error)),
        Exit::Suspended(registration, stack) => {
            suspend(registration, stack, &RestartCallback::new(completion));
        }
    }
}

/// Continues an execution from a delivered outcome.
pub(crate) fn resume(node: Node, stack: CallStack, restart: RestartCallback) {
    match drive(node, stack) {
        Exit::Done(value) => restart.complete(Ok(value)),
        Exit::Failed(error) => restart.complete(Err(error)),
        Exit::Suspended(registration, stack) => suspend(registration, stack, &restart),
    }
}

/// Registers `registration` and keeps driving while callbacks fire inline.
///
/// A registration that panics after delivering its outcome does not lose
/// that outcome: the execution is driven to completion (or to its next
/// pending boundary) first, and the panic is re-thrown afterwards.
fn suspend(mut registration: Registration, mut stack: CallStack, restart: &RestartCallback) {
    let mut escaped: Option<PanicPayload> = None;
    loop {
        let registered = restart.register(registration, stack);
        if let Some(payload) = registered.panic {
            escaped.get_or_insert(payload);
        }
        let Some((node, resumed)) = registered.resumed else {
            break;
        };
        match drive(node, resumed) {
            Exit::Done(value) => {
                restart.complete(Ok(value));
                break;
            }
            Exit::Failed(error) => {
                restart.complete(Err(error));
                break;
            }
            Exit::Suspended(next, pending) => {
                registration = next;
                stack = pending;
            }
        }
    }
    if let Some(payload) = escaped {
        panic::resume_unwind(payload);
    }
}
