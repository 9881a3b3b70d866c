//! Single-slot wake primitives of push sources.
//!
//! An [`Event`] is a binary flag with waiters, it
//! never queues: setting it several times before a
//! waiter gets to run releases the waiter once. A
//! source built on it only remembers its latest
//! value, consumers re-pull it when they wake.
//!
//! The [`IrqEvent`] offers the same contract to
//! the scheduler, while its [`IrqTrigger`] may be
//! set from outside the scheduler, for example
//! from an interrupt handler or another thread.

use crate::callback::Callback;
use crate::contract::{Flow, Outcome, Source};
use futures::task::AtomicWaker;
use std::cell::RefCell;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, Waker};

struct EventState {
    set: bool,
    generation: u64,
    waiters: Vec<Waker>,
}

/// Conflating wake flag of the scheduler side.
#[derive(Clone)]
pub struct Event {
    state: Rc<RefCell<EventState>>,
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl Event {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(EventState {
                set: false,
                generation: 0,
                waiters: Vec::new(),
            })),
        }
    }

    pub fn is_set(&self) -> bool {
        self.state.borrow().set
    }

    /// Set the flag and release every waiter.
    pub fn set(&self) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            state.set = true;
            state.generation = state.generation.wrapping_add(1);
            std::mem::take(&mut state.waiters)
        };
        waiters.into_iter().for_each(Waker::wake);
    }

    pub fn clear(&self) {
        self.state.borrow_mut().set = false;
    }

    /// Wait for the next set of the flag.
    ///
    /// The future is released by any set happening
    /// after it was created, including sets which
    /// happen before it is first polled.
    pub fn wait(&self) -> WaitFuture {
        WaitFuture {
            event: self.clone(),
            generation: self.state.borrow().generation,
        }
    }

    /// Set the flag, let the waiters run, clear it.
    ///
    /// Fires within the same scheduling quantum
    /// coalesce into a single wakeup of each waiter.
    pub async fn fire(&self) {
        self.set();
        tokio::task::yield_now().await;
        self.clear();
    }

    /// Wake the waiters without releasing them.
    pub(crate) fn nudge(&self) {
        let waiters = std::mem::take(&mut self.state.borrow_mut().waiters);
        waiters.into_iter().for_each(Waker::wake);
    }
}

/// Future returned by [`Event::wait`].
pub struct WaitFuture {
    event: Event,
    generation: u64,
}

impl Future for WaitFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.event.state.borrow_mut();
        if state.generation != self.generation {
            return Poll::Ready(());
        }
        if !state.waiters.iter().any(|w| w.will_wake(cx.waker())) {
            state.waiters.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

/// Flag whose waiters may be released.
pub trait Signal: Clone + 'static {
    type Wait: Future<Output = ()> + 'static;

    /// Arm a future released by the next set.
    fn wait(&self) -> Self::Wait;

    fn clear(&self);
}

impl Signal for Event {
    type Wait = WaitFuture;

    fn wait(&self) -> WaitFuture {
        Event::wait(self)
    }

    fn clear(&self) {
        Event::clear(self)
    }
}

/// Source which announces its new values.
///
/// Flows over such a source suspend on its signal
/// rather than pulling it in a loop.
pub trait EventSource: Source {
    type Signal: Signal;

    fn signal(&self) -> Self::Signal;
}

/// Flow which pulls its source whenever signalled.
///
/// The next wait is armed before pulling, so a set
/// happening while the consumer is busy with the
/// previous value is not missed.
pub struct EventFlow<S>
where
    S: EventSource,
{
    source: S,
    signal: S::Signal,
    armed: Option<<S::Signal as Signal>::Wait>,
}

impl<S> EventFlow<S>
where
    S: EventSource,
{
    pub fn new(source: S) -> Self {
        let signal = source.signal();
        let armed = Some(signal.wait());
        Self {
            source,
            signal,
            armed,
        }
    }
}

impl<S> Flow for EventFlow<S>
where
    S: EventSource,
{
    type Item = S::Output;

    async fn advance(&mut self) -> Option<S::Output> {
        loop {
            let wait = match self.armed.take() {
                Some(wait) => wait,
                None => self.signal.wait(),
            };
            wait.await;
            self.signal.clear();
            self.armed = Some(self.signal.wait());
            match self.source.pull().await {
                Outcome::Emit(value) => return Some(value),
                Outcome::Suppress => continue,
                Outcome::End => return None,
            }
        }
    }
}

struct IrqShared {
    flag: AtomicBool,
    waker: AtomicWaker,
}

/// Event which may be set from outside the scheduler.
///
/// Only the [`IrqTrigger`] crosses the context
/// boundary, waiting and clearing stay on the
/// scheduler, where the flag is forwarded into an
/// ordinary [`Event`] for every local waiter.
#[derive(Clone)]
pub struct IrqEvent {
    shared: Arc<IrqShared>,
    local: Event,
}

/// Setter half of an [`IrqEvent`].
///
/// Setting never blocks nor allocates, and setting
/// an already set flag changes nothing.
#[derive(Clone)]
pub struct IrqTrigger {
    shared: Arc<IrqShared>,
}

impl IrqTrigger {
    pub fn set(&self) {
        self.shared.flag.store(true, Ordering::Release);
        self.shared.waker.wake();
    }
}

impl Default for IrqEvent {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqEvent {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(IrqShared {
                flag: AtomicBool::new(false),
                waker: AtomicWaker::new(),
            }),
            local: Event::new(),
        }
    }

    pub fn trigger(&self) -> IrqTrigger {
        IrqTrigger {
            shared: self.shared.clone(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.shared.flag.load(Ordering::Acquire) || self.local.is_set()
    }

    pub fn clear(&self) {
        self.shared.flag.store(false, Ordering::Release);
        self.local.clear();
    }

    pub fn wait(&self) -> IrqWaitFuture {
        IrqWaitFuture {
            shared: self.shared.clone(),
            local: self.local.clone(),
            wait: self.local.wait(),
            done: false,
        }
    }
}

/// Future returned by [`IrqEvent::wait`].
pub struct IrqWaitFuture {
    shared: Arc<IrqShared>,
    local: Event,
    wait: WaitFuture,
    done: bool,
}

impl Future for IrqWaitFuture {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.shared.waker.register(cx.waker());
        if self.shared.flag.swap(false, Ordering::AcqRel) {
            self.local.set();
        }
        let result = Pin::new(&mut self.wait).poll(cx);
        if result.is_ready() {
            self.done = true;
        }
        result
    }
}

impl Drop for IrqWaitFuture {
    fn drop(&mut self) {
        // The trigger only wakes the last registered
        // waiter, which might be this one.
        if !self.done {
            self.local.nudge();
        }
    }
}

impl Signal for IrqEvent {
    type Wait = IrqWaitFuture;

    fn wait(&self) -> IrqWaitFuture {
        IrqEvent::wait(self)
    }

    fn clear(&self) {
        IrqEvent::clear(self)
    }
}

struct InterruptInner<T> {
    read: Callback<(), T>,
    event: IrqEvent,
}

/// Source whose reads are announced by an interrupt.
///
/// The handler only sets the trigger, the read
/// itself happens later on the scheduler.
pub struct Interrupt<T> {
    inner: Rc<InterruptInner<T>>,
}

impl<T> Clone for Interrupt<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Interrupt<T>
where
    T: Clone + 'static,
{
    pub fn new<F>(read: F) -> Self
    where
        F: FnMut() -> T + 'static,
    {
        let mut read = read;
        Self::with_callback(Callback::new_sync(move |()| read()))
    }

    pub fn new_async<F>(read: F) -> Self
    where
        F: AsyncFn() -> T + 'static,
    {
        Self::with_callback(Callback::new_async(async move |()| read().await))
    }

    fn with_callback(read: Callback<(), T>) -> Self {
        Self {
            inner: Rc::new(InterruptInner {
                read,
                event: IrqEvent::new(),
            }),
        }
    }

    /// Handle to pass to the interrupt handler.
    pub fn trigger(&self) -> IrqTrigger {
        self.inner.event.trigger()
    }
}

impl<T> Source for Interrupt<T>
where
    T: Clone + 'static,
{
    type Output = T;
    type Flow = EventFlow<Self>;

    async fn pull(&self) -> Outcome<T> {
        Outcome::Emit(self.inner.read.call(()).await)
    }

    fn iterate(&self) -> EventFlow<Self> {
        EventFlow::new(self.clone())
    }
}

impl<T> EventSource for Interrupt<T>
where
    T: Clone + 'static,
{
    type Signal = IrqEvent;

    fn signal(&self) -> IrqEvent {
        self.inner.event.clone()
    }
}
