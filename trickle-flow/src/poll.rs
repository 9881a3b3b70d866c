use crate::callback::Callback;
use crate::contract::{Flow, Outcome, Source};
use std::rc::Rc;
use std::time::Duration;
use tokio::time::sleep;

struct PollInner<T> {
    probe: Callback<(), Outcome<T>>,
    interval: Duration,
}

/// Source which samples a probe periodically.
///
/// Pulling invokes the probe immediately, while the
/// flows sleep for the interval before every pull,
/// the very first one included.
pub struct Poll<T> {
    inner: Rc<PollInner<T>>,
}

impl<T> Clone for Poll<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Poll<T>
where
    T: Clone + 'static,
{
    pub fn new<F>(probe: F, interval: Duration) -> Self
    where
        F: FnMut() -> Outcome<T> + 'static,
    {
        let mut probe = probe;
        Self::with_callback(Callback::new_sync(move |()| probe()), interval)
    }

    pub fn new_async<F>(probe: F, interval: Duration) -> Self
    where
        F: AsyncFn() -> Outcome<T> + 'static,
    {
        Self::with_callback(
            Callback::new_async(async move |()| probe().await),
            interval,
        )
    }

    /// Poll a probe which returns `None` once exhausted.
    pub fn until<F>(probe: F, interval: Duration) -> Self
    where
        F: FnMut() -> Option<T> + 'static,
    {
        let mut probe = probe;
        Self::new(move || Outcome::from(probe()), interval)
    }

    pub fn until_async<F>(probe: F, interval: Duration) -> Self
    where
        F: AsyncFn() -> Option<T> + 'static,
    {
        Self::new_async(async move || Outcome::from(probe().await), interval)
    }

    pub fn with_callback(probe: Callback<(), Outcome<T>>, interval: Duration) -> Self {
        Self {
            inner: Rc::new(PollInner { probe, interval }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }
}

impl<T> Source for Poll<T>
where
    T: Clone + 'static,
{
    type Output = T;
    type Flow = PollFlow<T>;

    async fn pull(&self) -> Outcome<T> {
        self.inner.probe.call(()).await
    }

    fn iterate(&self) -> PollFlow<T> {
        PollFlow {
            source: self.clone(),
        }
    }
}

pub struct PollFlow<T> {
    source: Poll<T>,
}

impl<T> Flow for PollFlow<T>
where
    T: Clone + 'static,
{
    type Item = T;

    async fn advance(&mut self) -> Option<T> {
        loop {
            sleep(self.source.interval()).await;
            match self.source.pull().await {
                Outcome::Emit(value) => return Some(value),
                Outcome::Suppress => continue,
                Outcome::End => return None,
            }
        }
    }
}

/// Curry a probe into a [`Poll`] factory.
///
/// ```ignore
/// let seconds = poll(move || Some(rtc.seconds()))(Duration::from_secs(1));
/// ```
pub fn poll<T, F>(probe: F) -> impl FnOnce(Duration) -> Poll<T>
where
    T: Clone + 'static,
    F: FnMut() -> Option<T> + 'static,
{
    move |interval| Poll::until(probe, interval)
}

/// Curry an async probe into a [`Poll`] factory.
pub fn apoll<T, F>(probe: F) -> impl FnOnce(Duration) -> Poll<T>
where
    T: Clone + 'static,
    F: AsyncFn() -> Option<T> + 'static,
{
    move |interval| Poll::until_async(probe, interval)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::TestFixture;
    use tokio::time::Instant;

    fn countdown(from: u32) -> impl FnMut() -> Option<u32> {
        let mut next = Some(from);
        move || {
            let current = next;
            next = next.and_then(|v| v.checked_sub(1));
            current
        }
    }

    #[test]
    fn test_pull_immediate() {
        let fx = TestFixture::new();
        let source = Poll::until(countdown(3), Duration::from_secs(1));
        fx.run(async move {
            let start = Instant::now();
            assert_eq!(source.pull().await, Outcome::Emit(3));
            assert_eq!(source.pull().await, Outcome::Emit(2));
            assert_eq!(start.elapsed(), Duration::ZERO);
        });
    }

    #[test]
    fn test_flow_sleeps_first() {
        let fx = TestFixture::new();
        let source = poll(countdown(2))(Duration::from_millis(10));
        let (values, elapsed) = fx.run(async move {
            let start = Instant::now();
            let mut flow = source.iterate();
            let mut values = Vec::new();
            while let Some(value) = flow.advance().await {
                values.push(value);
            }
            (values, start.elapsed())
        });
        assert_eq!(values, vec![2, 1, 0]);
        // One sleep before each pull, the exhausting one included.
        assert!(elapsed >= Duration::from_millis(40));
        assert!(elapsed < Duration::from_millis(50));
    }

    #[test]
    fn test_suppress_skipped() {
        let fx = TestFixture::new();
        let mut n = 0;
        let source = Poll::new(
            move || {
                n += 1;
                match n {
                    1 | 3 => Outcome::Suppress,
                    2 | 4 => Outcome::Emit(n),
                    _ => Outcome::End,
                }
            },
            Duration::from_millis(1),
        );
        let values = fx.run(async move {
            let mut flow = source.iterate();
            let mut values = Vec::new();
            while let Some(value) = flow.advance().await {
                values.push(value);
            }
            values
        });
        assert_eq!(values, vec![2, 4]);
    }

    #[test]
    fn test_async_probe() {
        let fx = TestFixture::new();
        let source = apoll(async || {
            sleep(Duration::from_millis(5)).await;
            Some('x')
        })(Duration::from_millis(5));
        let elapsed = fx.run(async move {
            let start = Instant::now();
            let mut flow = source.iterate();
            assert_eq!(flow.advance().await, Some('x'));
            start.elapsed()
        });
        assert!(elapsed >= Duration::from_millis(10));
    }
}
