//! Stateful sources built on an event.
//!
//! Each of them stores one current value, which
//! pulling returns, and fires its event whenever
//! the value changes. They are also sinks, so a
//! producer chain may feed one while any number of
//! consumer chains iterate it.

use crate::contract::{Outcome, Sink, Source};
use crate::dedup::DedupFlow;
use crate::easing::{Interpolate, linear};
use crate::error::Result;
use crate::event::{Event, EventFlow, EventSource};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use trickle_task::{Handle, Task, spawn};

pub const DEFAULT_EASING_DURATION: Duration = Duration::from_secs(1);

pub const DEFAULT_EASING_STEP: Duration = Duration::from_millis(50);

struct ValueInner<T> {
    current: RefCell<T>,
    event: Event,
}

/// Source holding a single current value.
///
/// Flows over it wait for the value to change, and
/// never emit the same value twice in a row, even
/// when changes back and forth coalesce.
pub struct Value<T> {
    inner: Rc<ValueInner<T>>,
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Value<T>
where
    T: Clone + PartialEq + Default + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Value<T>
where
    T: Clone + PartialEq + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(ValueInner {
                current: RefCell::new(initial),
                event: Event::new(),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.current.borrow().clone()
    }

    /// Store the value, firing if it changed.
    pub async fn update(&self, value: T) {
        if self.replace(value) {
            self.fire().await;
        }
    }

    /// Store the value without firing, returns
    /// whether it changed.
    pub(crate) fn replace(&self, value: T) -> bool {
        let mut current = self.inner.current.borrow_mut();
        if *current == value {
            return false;
        }
        *current = value;
        true
    }

    pub async fn fire(&self) {
        self.inner.event.fire().await;
    }
}

impl<T> Source for Value<T>
where
    T: Clone + PartialEq + 'static,
{
    type Output = T;
    type Flow = DedupFlow<EventFlow<Self>, T>;

    async fn pull(&self) -> Outcome<T> {
        Outcome::Emit(self.get())
    }

    fn iterate(&self) -> Self::Flow {
        DedupFlow::new(EventFlow::new(self.clone()))
    }
}

impl<T> EventSource for Value<T>
where
    T: Clone + PartialEq + 'static,
{
    type Signal = Event;

    fn signal(&self) -> Event {
        self.inner.event.clone()
    }
}

impl<T> Sink<T> for Value<T>
where
    T: Clone + PartialEq + 'static,
{
    async fn accept(&mut self, value: T) -> Result<()> {
        self.update(value).await;
        Ok(())
    }
}

struct HoldInner<T> {
    value: Value<T>,
    default: T,
    duration: Duration,
    latched: Cell<bool>,
    last_update: Cell<Instant>,
    revert: RefCell<Option<Task<()>>>,
}

/// Value latching anything but its default for a while.
///
/// Updating it to a non-default value latches that
/// value, later updates are ignored but keep it
/// latched, until no update came for the duration.
/// Then it reverts to the default. Dropping the
/// last handle cancels a pending revert.
pub struct Hold<T> {
    inner: Rc<HoldInner<T>>,
}

impl<T> Clone for Hold<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Hold<T>
where
    T: Clone + PartialEq + 'static,
{
    pub fn new(default: T, duration: Duration) -> Self {
        Self {
            inner: Rc::new(HoldInner {
                value: Value::new(default.clone()),
                default,
                duration,
                latched: Cell::new(false),
                last_update: Cell::new(Instant::now()),
                revert: RefCell::new(None),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.get()
    }

    pub fn is_latched(&self) -> bool {
        self.inner.latched.get()
    }

    pub async fn update(&self, value: T) {
        let inner = &self.inner;
        inner.last_update.set(Instant::now());
        if inner.latched.get() || value == inner.default {
            return;
        }
        inner.latched.set(true);
        inner.value.replace(value);
        let task = spawn(revert(Rc::downgrade(inner)));
        // The replaced task can only be finishing its
        // final fire, let it clear the event.
        if let Some(previous) = inner.revert.replace(Some(task)) {
            previous.detach();
        }
        tracing::trace!("hold latched");
        inner.value.fire().await;
    }
}

async fn revert<T>(hold: Weak<HoldInner<T>>)
where
    T: Clone + PartialEq + 'static,
{
    loop {
        let remaining = match hold.upgrade() {
            Some(inner) => inner
                .duration
                .saturating_sub(inner.last_update.get().elapsed()),
            None => return,
        };
        if remaining.is_zero() {
            break;
        }
        sleep(remaining).await;
    }
    let Some(inner) = hold.upgrade() else {
        return;
    };
    inner.latched.set(false);
    inner.value.replace(inner.default.clone());
    tracing::trace!("hold reverted");
    inner.value.fire().await;
}

impl<T> Source for Hold<T>
where
    T: Clone + PartialEq + 'static,
{
    type Output = T;
    type Flow = DedupFlow<EventFlow<Value<T>>, T>;

    async fn pull(&self) -> Outcome<T> {
        self.inner.value.pull().await
    }

    fn iterate(&self) -> Self::Flow {
        self.inner.value.iterate()
    }
}

impl<T> EventSource for Hold<T>
where
    T: Clone + PartialEq + 'static,
{
    type Signal = Event;

    fn signal(&self) -> Event {
        self.inner.value.signal()
    }
}

impl<T> Sink<T> for Hold<T>
where
    T: Clone + PartialEq + 'static,
{
    async fn accept(&mut self, value: T) -> Result<()> {
        self.update(value).await;
        Ok(())
    }
}

type Easing<T> = Box<dyn Fn(&T, &T, f64) -> T>;

struct Animation<T> {
    from: T,
    to: T,
    started: Instant,
}

struct EasedInner<T> {
    value: Value<T>,
    easing: Easing<T>,
    duration: Duration,
    step: Duration,
    animation: RefCell<Animation<T>>,
    animating: Cell<bool>,
    task: RefCell<Option<Task<()>>>,
}

/// Value animating towards its targets.
///
/// Every update starts moving the value from where
/// it currently is towards the new target, firing
/// at every step which changed it and ending
/// exactly on the target.
pub struct EasedValue<T> {
    inner: Rc<EasedInner<T>>,
}

impl<T> Clone for EasedValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> EasedValue<T>
where
    T: Interpolate + PartialEq,
{
    /// Linear easing over the default duration.
    pub fn new(initial: T) -> Self {
        Self::with_easing(
            initial,
            linear,
            DEFAULT_EASING_DURATION,
            DEFAULT_EASING_STEP,
        )
    }
}

impl<T> EasedValue<T>
where
    T: Clone + PartialEq + 'static,
{
    pub fn with_easing<F>(initial: T, easing: F, duration: Duration, step: Duration) -> Self
    where
        F: Fn(&T, &T, f64) -> T + 'static,
    {
        Self {
            inner: Rc::new(EasedInner {
                value: Value::new(initial.clone()),
                easing: Box::new(easing),
                duration,
                step,
                animation: RefCell::new(Animation {
                    from: initial.clone(),
                    to: initial,
                    started: Instant::now(),
                }),
                animating: Cell::new(false),
                task: RefCell::new(None),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.get()
    }

    pub fn target(&self) -> T {
        self.inner.animation.borrow().to.clone()
    }

    pub fn is_animating(&self) -> bool {
        self.inner.animating.get()
    }

    /// Start moving towards the target.
    ///
    /// A running animation is redirected, starting
    /// over from the current value. Updating to the
    /// target already pursued changes nothing.
    pub fn update(&self, target: T) {
        let inner = &self.inner;
        let unchanged = if inner.animating.get() {
            inner.animation.borrow().to == target
        } else {
            inner.value.get() == target
        };
        if unchanged {
            return;
        }
        *inner.animation.borrow_mut() = Animation {
            from: inner.value.get(),
            to: target,
            started: Instant::now(),
        };
        if inner.animating.replace(true) {
            return;
        }
        tracing::trace!("animation started");
        let task = spawn(animate(Rc::downgrade(inner)));
        // The replaced task can only be finishing its
        // final fire, let it clear the event.
        if let Some(previous) = inner.task.replace(Some(task)) {
            previous.detach();
        }
    }
}

async fn animate<T>(eased: Weak<EasedInner<T>>)
where
    T: Clone + PartialEq + 'static,
{
    loop {
        let Some(inner) = eased.upgrade() else {
            return;
        };
        let (next, done) = {
            let animation = inner.animation.borrow();
            let elapsed = animation.started.elapsed();
            if elapsed >= inner.duration {
                (animation.to.clone(), true)
            } else {
                let t = elapsed.as_nanos() as f64 / inner.duration.as_nanos() as f64;
                ((inner.easing)(&animation.from, &animation.to, t), false)
            }
        };
        let changed = inner.value.replace(next);
        if done {
            inner.animating.set(false);
            tracing::trace!("animation finished");
        }
        if changed {
            inner.value.fire().await;
        }
        if done {
            return;
        }
        let step = inner.step;
        drop(inner);
        sleep(step).await;
    }
}

impl<T> Source for EasedValue<T>
where
    T: Clone + PartialEq + 'static,
{
    type Output = T;
    type Flow = DedupFlow<EventFlow<Value<T>>, T>;

    async fn pull(&self) -> Outcome<T> {
        self.inner.value.pull().await
    }

    fn iterate(&self) -> Self::Flow {
        self.inner.value.iterate()
    }
}

impl<T> EventSource for EasedValue<T>
where
    T: Clone + PartialEq + 'static,
{
    type Signal = Event;

    fn signal(&self) -> Event {
        self.inner.value.signal()
    }
}

impl<T> Sink<T> for EasedValue<T>
where
    T: Clone + PartialEq + 'static,
{
    async fn accept(&mut self, value: T) -> Result<()> {
        self.update(value);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::contract::Flow;
    use crate::easing::ease_in;
    use crate::testutil::{Collect, TestFixture};
    use crate::{SourceExt, compose};

    #[test]
    fn test_value_update() {
        let fx = TestFixture::new();
        let value = Value::new(0);
        let values = fx.run(async move {
            let mut flow = value.iterate();
            let writer = value.clone();
            let feeding = spawn(async move {
                for v in [1, 1, 2, 2, 3] {
                    sleep(Duration::from_millis(1)).await;
                    writer.update(v).await;
                }
            });
            let mut values = Vec::new();
            for _ in 0..3 {
                values.push(flow.advance().await.unwrap());
            }
            feeding.await.unwrap();
            values
        });
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_value_no_repeat() {
        let fx = TestFixture::new();
        let value = Value::new(0);
        let sink = Collect::default();
        fx.run(async {
            let running = value.clone().into_sink(sink.clone()).spawn();
            sleep(Duration::from_millis(1)).await;
            // Flip back and forth within one quantum,
            // the consumer only sees the latest value.
            for v in [1, 2, 1, 2, 2, 3, 0, 1] {
                value.replace(v);
                value.fire().await;
            }
            value.replace(2);
            value.replace(1);
            value.fire().await;
            sleep(Duration::from_millis(1)).await;
            running.cancel();
            running.await.unwrap();
        });
        let seen = sink.take();
        assert_eq!(seen.first(), Some(&0));
        assert!(seen.windows(2).all(|w| w[0] != w[1]));
        assert_eq!(seen.last(), Some(&1));
    }

    #[test]
    fn test_value_fan_out() {
        let fx = TestFixture::new();
        let value = Value::new('a');
        let first = Collect::default();
        let second = Collect::default();
        fx.run(async {
            let a = compose(value.clone(), first.clone()).spawn();
            let b = compose(value.clone(), second.clone()).spawn();
            sleep(Duration::from_millis(1)).await;
            value.update('b').await;
            sleep(Duration::from_millis(1)).await;
            value.update('c').await;
            sleep(Duration::from_millis(1)).await;
            a.cancel();
            b.cancel();
        });
        assert_eq!(first.take(), vec!['a', 'b', 'c']);
        assert_eq!(second.take(), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_hold_latch() {
        let fx = TestFixture::new();
        let sink = Collect::default();
        let (observed, latched) = fx.run(async {
            let hold = Hold::new(0, Duration::from_millis(100));
            let running = hold.clone().into_sink(sink.clone()).spawn();
            sleep(Duration::from_millis(1)).await;
            hold.update(1).await;
            sleep(Duration::from_millis(50)).await;
            hold.update(2).await;
            let latched = hold.get();
            sleep(Duration::from_millis(200)).await;
            running.cancel();
            (hold.get(), latched)
        });
        assert_eq!(latched, 1);
        assert_eq!(observed, 0);
        assert_eq!(sink.take(), vec![0, 1, 0]);
    }

    #[test]
    fn test_hold_extends() {
        let fx = TestFixture::new();
        fx.run(async {
            let start = Instant::now();
            let hold = Hold::new(false, Duration::from_millis(100));
            hold.update(true).await;
            let mut flow = hold.iterate();
            for _ in 0..3 {
                sleep(Duration::from_millis(60)).await;
                hold.update(true).await;
            }
            assert!(hold.is_latched());
            assert_eq!(flow.advance().await, Some(false));
            // Reverted a whole duration after the last update.
            let elapsed = start.elapsed();
            assert!(elapsed >= Duration::from_millis(280));
            assert!(elapsed < Duration::from_millis(290));
            assert!(!hold.is_latched());
        });
    }

    #[test]
    fn test_hold_relatch() {
        let fx = TestFixture::new();
        fx.run(async {
            let hold = Hold::new(0, Duration::from_millis(10));
            hold.update(0).await;
            assert!(!hold.is_latched());
            hold.update(3).await;
            sleep(Duration::from_millis(20)).await;
            assert_eq!(hold.get(), 0);
            hold.update(4).await;
            assert_eq!(hold.get(), 4);
            sleep(Duration::from_millis(20)).await;
            assert_eq!(hold.get(), 0);
        });
    }

    #[test]
    fn test_hold_dropped() {
        let fx = TestFixture::new();
        fx.run(async {
            let hold = Hold::new(0, Duration::from_millis(10));
            hold.update(1).await;
            let event = hold.signal();
            let wait = event.wait();
            drop(hold);
            let timeout = tokio::time::timeout(Duration::from_millis(50), wait).await;
            assert!(timeout.is_err());
        });
    }

    #[test]
    fn test_eased() {
        let fx = TestFixture::new();
        let sink = Collect::default();
        fx.run(async {
            let eased = EasedValue::with_easing(
                0.0,
                linear,
                Duration::from_millis(100),
                Duration::from_millis(25),
            );
            let running = eased.clone().into_sink(sink.clone()).spawn();
            sleep(Duration::from_millis(1)).await;
            eased.update(8.0);
            assert!(eased.is_animating());
            sleep(Duration::from_millis(150)).await;
            assert!(!eased.is_animating());
            assert_eq!(eased.get(), 8.0);
            running.cancel();
        });
        assert_eq!(sink.take(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_eased_same_target() {
        let fx = TestFixture::new();
        fx.run(async {
            let eased = EasedValue::with_easing(
                0.0,
                linear,
                Duration::from_millis(100),
                Duration::from_millis(10),
            );
            // A producer re-sending its target faster
            // than the animation steps.
            for _ in 0..100 {
                eased.update(1.0);
                sleep(Duration::from_millis(10)).await;
            }
            assert!(!eased.is_animating());
            assert_eq!(eased.get(), 1.0);
        });
    }

    #[test]
    fn test_eased_restart() {
        let fx = TestFixture::new();
        fx.run(async {
            let eased = EasedValue::with_easing(
                0.0,
                ease_in,
                Duration::from_millis(100),
                Duration::from_millis(10),
            );
            eased.update(100.0);
            sleep(Duration::from_millis(55)).await;
            let midway = eased.get();
            assert_eq!(midway, 25.0);
            eased.update(-100.0);
            sleep(Duration::from_millis(1)).await;
            // Starts over from where it was, not from zero.
            assert!(eased.get() <= midway);
            assert!(eased.get() > 0.0);
            sleep(Duration::from_millis(200)).await;
            assert_eq!(eased.get(), -100.0);
            assert_eq!(eased.target(), -100.0);
        });
    }
}
