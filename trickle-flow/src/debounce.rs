use crate::contract::{Flow, Outcome, Pipeline, Source, TransformFlow};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10);

/// Stage accepting at most one sample per window.
///
/// Within the window since the last accepted sample,
/// that sample is repeated. Pulling does not even
/// consult the upstream then, while a flow discards
/// the upstream values it is fed meanwhile.
pub struct Debounce<T> {
    window: Duration,
    sample: RefCell<Option<(Instant, T)>>,
}

impl<T> Default for Debounce<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl<T> Debounce<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            sample: RefCell::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<T> Debounce<T>
where
    T: Clone,
{
    fn cached(&self) -> Option<T> {
        let sample = self.sample.borrow();
        let (accepted, value) = sample.as_ref()?;
        (accepted.elapsed() < self.window).then(|| value.clone())
    }

    fn accept(&self, value: T) -> T {
        *self.sample.borrow_mut() = Some((Instant::now(), value.clone()));
        value
    }
}

impl<T> Pipeline<T> for Debounce<T>
where
    T: Clone + 'static,
{
    type Output = T;
    type Flow<U>
        = TransformFlow<Self, U>
    where
        U: Flow<Item = T>;

    async fn transform(&self, value: T) -> Outcome<T> {
        Outcome::Emit(self.cached().unwrap_or_else(|| self.accept(value)))
    }

    async fn pull_from<S>(&self, upstream: &S) -> Outcome<T>
    where
        S: Source<Output = T>,
    {
        if let Some(value) = self.cached() {
            return Outcome::Emit(value);
        }
        upstream.pull().await.map(|value| self.accept(value))
    }

    fn flow<U>(stage: Rc<Self>, upstream: U) -> Self::Flow<U>
    where
        U: Flow<Item = T>,
    {
        TransformFlow::new(stage, upstream)
    }
}
