use crate::ready_poll::{ReadyPoll, local_ready_poll};
use futures::FutureExt;
use futures::future::{AbortHandle, Abortable, Aborted, RemoteHandle};
use std::cell::Cell;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;

/// The task was cancelled before it completed.
///
/// This is what awaiting a [`Task`] yields after
/// [`Handle::cancel`] was called on it. Chains are
/// expected to absorb it at their own boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("task cancelled")]
pub struct Cancelled;

/// Task handle trait.
///
/// This handle is used to receive result from the
/// task, as well as controlling the task like
/// cancelling and detaching it:
///
/// - Awaiting this handle receives the result.
/// - Dropping this handle cancels the task.
/// - Calling `cancel` stops the task at its next
///   suspension point, awaiting yields `Cancelled`.
/// - Calling `detach` consumes and detaches the task.
pub trait Handle<T>: Future<Output = Result<T, Cancelled>>
where
    T: 'static,
{
    fn detach(self);

    fn cancel(&self);

    fn is_finished(&self) -> bool;
}

/// Owned handle of a spawned task.
///
/// Unlike the opaque handles of general purpose
/// runtimes, this one is meant to be stored on the
/// entity that spawned the task, so that replacing
/// or dropping the entity deterministically ends it.
pub struct Task<T>
where
    T: 'static,
{
    handle: RemoteHandle<Result<T, Aborted>>,
    abort: AbortHandle,
    ready: ReadyPoll,
}

impl<T> Future for Task<T>
where
    T: 'static,
{
    type Output = Result<T, Cancelled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.handle
            .poll_unpin(cx)
            .map(|result| result.map_err(|Aborted| Cancelled))
    }
}

impl<T> Handle<T> for Task<T>
where
    T: 'static,
{
    fn detach(self) {
        self.handle.forget();
    }

    fn cancel(&self) {
        self.abort.abort();
    }

    fn is_finished(&self) -> bool {
        self.ready.ready()
    }
}

thread_local! {
    pub(crate) static INITIALIZED: Cell<bool> = const { Cell::new(false) };
}

/// Spawn a task onto the cooperative scheduler.
///
/// This function can only be called from inside a
/// future run by [`crate::framework::Framework::run`],
/// the spawned future runs interleaved with every
/// other task of the scheduler and may be `!Send`.
#[must_use = "Dropping the Task is equivalent to canceling the future."]
pub fn spawn<F, T>(future: F) -> Task<T>
where
    F: Future<Output = T> + 'static,
    T: 'static,
{
    assert!(is_initialized(), "Task framework not initialized");
    let (abort, registration) = AbortHandle::new_pair();
    let (future, ready) = local_ready_poll(Abortable::new(future, registration));
    // XXX: the remote end catches a panic of the task
    // and resumes it when the handle is awaited, so
    // failures propagate to whoever drives the task.
    let (remote, handle) = future.remote_handle();
    drop(tokio::task::spawn_local(remote));
    Task {
        handle,
        abort,
        ready,
    }
}

/// Returns whether the framework runs on this thread.
pub fn is_initialized() -> bool {
    INITIALIZED.get()
}
