//! Composition of sources, stages and sinks.
//!
//! Chains read from left to right: a source is
//! bound to a stage with [`SourceExt::then`], which
//! yields another source, and finally to a sink
//! with [`SourceExt::into_sink`], which yields a
//! [`Bound`] chain ready to be driven or spawned.
//! Only sources may be bound, anything else is
//! rejected by the compiler.

use crate::consumer::Consumer;
use crate::contract::{Flow, Outcome, Pipeline, Sink, Source};
use crate::error::Result;
use futures::FutureExt;
use futures::future::try_join_all;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use trickle_task::{Cancelled, Handle, Task, spawn};

/// Source republishing an upstream through a stage.
pub struct Piped<S, P> {
    upstream: S,
    stage: Rc<P>,
}

impl<S, P> Clone for Piped<S, P>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            stage: self.stage.clone(),
        }
    }
}

impl<S, P> Piped<S, P> {
    pub fn stage(&self) -> &P {
        &self.stage
    }

    pub fn upstream(&self) -> &S {
        &self.upstream
    }
}

impl<S, P> Source for Piped<S, P>
where
    S: Source,
    P: Pipeline<S::Output>,
{
    type Output = P::Output;
    type Flow = P::Flow<S::Flow>;

    async fn pull(&self) -> Outcome<P::Output> {
        self.stage.pull_from(&self.upstream).await
    }

    fn iterate(&self) -> Self::Flow {
        P::flow(self.stage.clone(), self.upstream.iterate())
    }
}

/// Extension of sources for building chains.
pub trait SourceExt: Source {
    /// Bind a stage after this source.
    fn then<P>(self, stage: P) -> Piped<Self, P>
    where
        P: Pipeline<Self::Output>,
    {
        Piped {
            upstream: self,
            stage: Rc::new(stage),
        }
    }

    /// Bind this source into a sink.
    fn into_sink<K>(self, sink: K) -> Bound<Self, K>
    where
        K: Sink<Self::Output>,
    {
        compose(self, sink)
    }
}

impl<S> SourceExt for S where S: Source {}

/// Bind a source into a sink.
pub fn compose<S, K>(source: S, sink: K) -> Bound<S, K>
where
    S: Source,
    K: Sink<S::Output>,
{
    Bound { source, sink }
}

/// Terminal chain, a sink bound to its upstream.
pub struct Bound<S, K> {
    source: S,
    sink: K,
}

impl<S, K> Bound<S, K>
where
    S: Source,
    K: Sink<S::Output>,
{
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }

    /// Feed the sink until the source is exhausted.
    ///
    /// The source is pulled once immediately, then
    /// iterated, without repeating the pulled value
    /// where the flow can tell. A failing sink ends
    /// the chain with its error.
    pub async fn drive(&mut self) -> Result<()> {
        tracing::debug!(
            source = std::any::type_name::<S>(),
            "chain started"
        );
        let mut flow = self.source.iterate();
        match self.source.pull().await {
            Outcome::Emit(value) => {
                flow.prime(&value);
                self.sink.accept(value).await?;
            }
            Outcome::Suppress => {}
            Outcome::End => {
                tracing::debug!("chain exhausted");
                return Ok(());
            }
        }
        while let Some(value) = flow.advance().await {
            self.sink.accept(value).await?;
        }
        tracing::debug!("chain exhausted");
        Ok(())
    }

    /// Drive the chain as an independent task.
    pub fn spawn(self) -> Running {
        let mut chain = self;
        Running {
            task: spawn(async move { chain.drive().await }),
        }
    }
}

/// Handle of a spawned chain.
///
/// Awaiting it yields the result of the chain, and
/// a cancelled chain counts as a clean shutdown.
/// Dropping it cancels the chain.
pub struct Running {
    task: Task<Result<()>>,
}

impl Running {
    pub fn cancel(&self) {
        self.task.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn detach(self) {
        self.task.detach();
    }
}

impl Future for Running {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.task.poll_unpin(cx).map(|result| match result {
            Ok(result) => result,
            Err(Cancelled) => {
                tracing::debug!("chain cancelled");
                Ok(())
            }
        })
    }
}

/// Await every chain, stopping at the first failure.
///
/// The remaining chains are cancelled when one of
/// them fails.
pub async fn gather<I>(chains: I) -> Result<()>
where
    I: IntoIterator<Item = Running>,
{
    try_join_all(chains).await?;
    Ok(())
}

/// Drive a source into a plain callable.
pub async fn connect<S, F>(source: S, f: F) -> Result<()>
where
    S: Source,
    F: FnMut(S::Output) + 'static,
{
    compose(source, Consumer::new(f)).drive().await
}

/// Drive a source into an async callable.
pub async fn aconnect<S, F>(source: S, f: F) -> Result<()>
where
    S: Source,
    F: AsyncFn(S::Output) + 'static,
{
    compose(source, Consumer::new_async(f)).drive().await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::FlowError;
    use crate::filter::{Apply, pipe};
    use crate::testutil::{Collect, TestFixture, finite};
    use std::cell::RefCell;
    use std::time::Duration;
    use tokio::time::sleep;

    struct Increment;

    impl Pipeline<i32> for Increment {
        type Output = i32;
        type Flow<U>
            = crate::contract::TransformFlow<Self, U>
        where
            U: Flow<Item = i32>;

        async fn transform(&self, value: i32) -> Outcome<i32> {
            Outcome::Emit(value + 1)
        }

        fn flow<U>(stage: Rc<Self>, upstream: U) -> Self::Flow<U>
        where
            U: Flow<Item = i32>,
        {
            crate::contract::TransformFlow::new(stage, upstream)
        }
    }

    #[test]
    fn test_drive() {
        let fx = TestFixture::new();
        let sink = Collect::default();
        let mut chain = finite(vec![1, 2, 3]).then(Increment).into_sink(sink.clone());
        fx.run(chain.drive()).unwrap();
        assert_eq!(sink.take(), vec![2, 3, 4]);
    }

    #[test]
    fn test_stacked() {
        let fx = TestFixture::new();
        let sink = Collect::default();
        let source = finite(vec![1, 2, 3])
            .then(Increment)
            .then(Increment)
            .then(pipe(|v: i32| v * 10));
        fx.run(compose(source, sink.clone()).drive()).unwrap();
        assert_eq!(sink.take(), vec![30, 40, 50]);
    }

    #[test]
    fn test_empty() {
        let fx = TestFixture::new();
        let sink = Collect::<i32>::default();
        fx.run(finite(vec![]).into_sink(sink.clone()).drive())
            .unwrap();
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_connect() {
        let fx = TestFixture::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen1 = seen.clone();
        fx.run(connect(finite(vec!['a', 'b']), move |c| {
            seen1.borrow_mut().push(c)
        }))
        .unwrap();
        let seen2 = seen.clone();
        fx.run(aconnect(finite(vec!['c']), async move |c| {
            sleep(Duration::from_millis(1)).await;
            seen2.borrow_mut().push(c)
        }))
        .unwrap();
        assert_eq!(*seen.borrow(), vec!['a', 'b', 'c']);
    }

    struct Failing;

    impl Sink<i32> for Failing {
        async fn accept(&mut self, value: i32) -> Result<()> {
            if value > 1 {
                return Err(FlowError::Invalid(format!("{value} is too large")));
            }
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure() {
        let fx = TestFixture::new();
        let result = fx.run(finite(vec![1, 2, 3]).into_sink(Failing).drive());
        assert!(matches!(result, Err(FlowError::Invalid(_))));
    }

    #[test]
    fn test_gather_cancel() {
        let fx = TestFixture::new();
        let sink = Collect::default();
        let forever = crate::poll::Poll::new(
            || Outcome::Emit(0),
            Duration::from_millis(10),
        );
        let result = fx.run(async {
            let endless = forever.into_sink(sink.clone()).spawn();
            let finite = finite(vec![1, 2])
                .then(Apply::new(|v: i32| v))
                .into_sink(Collect::default())
                .spawn();
            sleep(Duration::from_millis(35)).await;
            endless.cancel();
            gather([endless, finite]).await
        });
        assert!(result.is_ok());
        assert_eq!(sink.take().len(), 4);
    }

    #[test]
    fn test_running_finished() {
        let fx = TestFixture::new();
        fx.run(async {
            let short = finite(vec![1, 2]).into_sink(Collect::default()).spawn();
            let endless = crate::poll::Poll::new(|| Outcome::Emit(0), Duration::from_millis(10))
                .into_sink(Collect::default())
                .spawn();
            assert!(!short.is_finished());
            sleep(Duration::from_millis(25)).await;
            assert!(short.is_finished());
            assert!(!endless.is_finished());
            endless.cancel();
            sleep(Duration::from_millis(1)).await;
            assert!(endless.is_finished());
            gather([short, endless]).await.unwrap();
        });
    }

    #[test]
    fn test_gather_failure() {
        let fx = TestFixture::new();
        let result = fx.run(async {
            let failing = finite(vec![1, 2]).into_sink(Failing).spawn();
            let endless = crate::poll::Poll::new(|| Outcome::Emit(0), Duration::from_millis(10))
                .into_sink(Collect::default())
                .spawn();
            gather([failing, endless]).await
        });
        assert!(result.is_err());
    }
}
