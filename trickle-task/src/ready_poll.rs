//! Observing whether a spawned future is over.
//!
//! The owner of a background task sometimes needs
//! to know whether the task has ended without
//! awaiting it, e.g. before replacing it with a
//! new one. Chain writers should rather rely on
//! awaiting, so this stays out of the crate root.

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::cell::Cell;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Observer side of a tracked future.
#[derive(Clone, Default)]
pub struct ReadyPoll {
    flag: Rc<Cell<bool>>,
}

impl ReadyPoll {
    /// Whether the tracked future completed or was
    /// destroyed.
    pub fn ready(&self) -> bool {
        self.flag.get()
    }
}

/// Future reporting to a [`ReadyPoll`] once it is over.
///
/// Being dropped counts as being over, as that is
/// how a cancelled task ends.
pub struct Tracked<'a, T> {
    inner: LocalBoxFuture<'a, T>,
    observer: ReadyPoll,
}

impl<T> Drop for Tracked<'_, T> {
    fn drop(&mut self) {
        self.observer.flag.set(true);
    }
}

impl<T> Future for Tracked<'_, T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let poll = self.inner.poll_unpin(cx);
        if poll.is_ready() {
            self.observer.flag.set(true);
        }
        poll
    }
}

/// Track a future running on this thread.
pub fn local_ready_poll<'a, T, F>(future: F) -> (Tracked<'a, T>, ReadyPoll)
where
    F: Future<Output = T> + 'a,
{
    let observer = ReadyPoll::default();
    let tracked = Tracked {
        inner: future.boxed_local(),
        observer: observer.clone(),
    };
    (tracked, observer)
}
