//! Interop between [`IO`] and `std::future::Future` on a tokio runtime.
//!
//! - [`IO::from_future`] spawns a future on a runtime handle and completes an
//!   `Async` node with its output.
//! - `IO` implements [`IntoFuture`], so it can be `.await`ed directly. The
//!   run loop starts on the first poll and reports back through a `futures`
//!   oneshot channel.

use futures::FutureExt;
use futures::channel::oneshot;
use pin_project_lite::pin_project;
use std::future::{Future, IntoFuture};
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use tokio::runtime::Handle;

use super::IO;
use crate::effect::IoError;

impl<A: Send + 'static> IO<A> {
    /// Wraps a future spawned on `handle` when the IO is evaluated.
    ///
    /// A panic inside the future is reported as [`IoError::Panic`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_io::effect::IO;
    ///
    /// let runtime = tokio::runtime::Runtime::new().unwrap();
    /// let io = IO::from_future(runtime.handle(), async { 40 + 2 });
    /// assert_eq!(io.run_unsafe().unwrap(), 42);
    /// ```
    pub fn from_future<F>(handle: &Handle, future: F) -> Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let handle = handle.clone();
        Self::async_io(move |callback| {
            handle.spawn(async move {
                let outcome = AssertUnwindSafe(future).catch_unwind().await;
                callback.complete(outcome.map_err(|payload| IoError::from_panic(payload.as_ref())));
            });
        })
    }
}

pin_project! {
    /// Future returned by awaiting an [`IO`].
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct IoFuture<A> {
        #[pin]
        state: IoFutureState<A>,
    }
}

pin_project! {
    #[project = IoFutureStateProj]
    enum IoFutureState<A> {
        Idle {
            io: Option<IO<A>>,
        },
        Running {
            #[pin]
            receiver: oneshot::Receiver<Result<A, IoError>>,
        },
        Completed,
    }
}

impl<A: Send + 'static> IntoFuture for IO<A> {
    type Output = Result<A, IoError>;
    type IntoFuture = IoFuture<A>;

    fn into_future(self) -> IoFuture<A> {
        IoFuture {
            state: IoFutureState::Idle { io: Some(self) },
        }
    }
}

impl<A: Send + 'static> Future for IoFuture<A> {
    type Output = Result<A, IoError>;

    fn poll(mut self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let mut this = self.as_mut().project();
            match this.state.as_mut().project() {
                IoFutureStateProj::Idle { io } => {
                    let (sender, receiver) = oneshot::channel();
                    if let Some(io) = io.take() {
                        io.run_unsafe_async(move |result| {
                            let _ = sender.send(result);
                        });
                    }
                    this.state.set(IoFutureState::Running { receiver });
                }
                IoFutureStateProj::Running { receiver } => {
                    let received = ready!(receiver.poll(context));
                    this.state.set(IoFutureState::Completed);
                    return Poll::Ready(received.unwrap_or_else(|_| {
                        Err(IoError::msg("IO completion callback was dropped"))
                    }));
                }
                IoFutureStateProj::Completed => panic!("IoFuture polled after completion"),
            }
        }
    }
}
