use crate::error::Result;
use std::rc::Rc;

/// Outcome of pulling a source or transforming a value.
///
/// This is what makes "nothing to emit" and "nothing
/// left" distinguishable: a suppressed outcome is
/// skipped by the flows, it never ends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T> {
    /// A value to pass downstream.
    Emit(T),
    /// Nothing to pass downstream this time.
    Suppress,
    /// The stream is exhausted.
    End,
}

impl<T> Outcome<T> {
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Emit(value) => Outcome::Emit(f(value)),
            Outcome::Suppress => Outcome::Suppress,
            Outcome::End => Outcome::End,
        }
    }

    /// The emitted value, if any.
    pub fn emitted(self) -> Option<T> {
        match self {
            Outcome::Emit(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Outcome::End)
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    /// Probes signal exhaustion by returning `None`.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Outcome::Emit(value),
            None => Outcome::End,
        }
    }
}

/// A single traversal over a source.
///
/// A flow is created by [`Source::iterate`] and is not
/// restartable: once `advance` returned `None` the flow
/// is spent. Iterating the source again creates an
/// independent flow, unaffected by the spent one.
#[allow(async_fn_in_trait)]
pub trait Flow: 'static {
    type Item;

    /// Wait for the next value, `None` once exhausted.
    async fn advance(&mut self) -> Option<Self::Item>;

    /// Tell the flow its consumer already holds this
    /// value, obtained by pulling the source.
    fn prime(&mut self, value: &Self::Item) {
        let _ = value;
    }
}

/// Something that produces values on demand.
///
/// Sources are handles which are free to clone, every
/// clone refers to the same underlying producer. This
/// is how one source feeds many chains (fan-out), and
/// how a flow keeps referring back to its source.
#[allow(async_fn_in_trait)]
pub trait Source: Clone + 'static {
    type Output: Clone + 'static;

    type Flow: Flow<Item = Self::Output>;

    /// Get the current value immediately.
    async fn pull(&self) -> Outcome<Self::Output>;

    /// Create a fresh flow over this source.
    fn iterate(&self) -> Self::Flow;
}

/// Flow which pulls its source on every advance.
///
/// This is the flow of sources which have no notion
/// of waiting, each value is produced as soon as the
/// consumer asks for it.
pub struct PullFlow<S> {
    source: S,
}

impl<S> PullFlow<S>
where
    S: Source,
{
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S> Flow for PullFlow<S>
where
    S: Source,
{
    type Item = S::Output;

    async fn advance(&mut self) -> Option<S::Output> {
        loop {
            match self.source.pull().await {
                Outcome::Emit(value) => return Some(value),
                Outcome::Suppress => continue,
                Outcome::End => return None,
            }
        }
    }
}

/// Something that consumes values.
///
/// The default implementation discards every value,
/// so a sink which is only interesting for what it
/// is bound to needs not override anything.
#[allow(async_fn_in_trait)]
pub trait Sink<T>: 'static {
    /// Consume one value.
    async fn accept(&mut self, value: T) -> Result<()> {
        let _ = value;
        Ok(())
    }
}

/// A transform stage between a source and a sink.
///
/// A pipeline is bound to its upstream with
/// [`crate::SourceExt::then`], which yields a new
/// source republishing the transformed values. The
/// stage is shared by every flow over that source,
/// so state kept in the stage (a smoothed value, a
/// cached sample) is shared too, while state kept in
/// a flow (the last emitted value) is per traversal.
#[allow(async_fn_in_trait)]
pub trait Pipeline<In>: Sized + 'static
where
    In: Clone + 'static,
{
    type Output: Clone + 'static;

    type Flow<U>: Flow<Item = Self::Output>
    where
        U: Flow<Item = In>;

    /// Transform one upstream value.
    async fn transform(&self, value: In) -> Outcome<Self::Output>;

    /// Produce the current value, consulting upstream.
    async fn pull_from<S>(&self, upstream: &S) -> Outcome<Self::Output>
    where
        S: Source<Output = In>,
    {
        match upstream.pull().await {
            Outcome::Emit(value) => self.transform(value).await,
            Outcome::Suppress => Outcome::Suppress,
            Outcome::End => Outcome::End,
        }
    }

    /// Create the downstream flow over an upstream flow.
    fn flow<U>(stage: Rc<Self>, upstream: U) -> Self::Flow<U>
    where
        U: Flow<Item = In>;
}

/// Flow which transforms every upstream value.
///
/// Suppressed values are skipped, and the flow ends
/// with its upstream or when the stage ends it.
pub struct TransformFlow<P, U> {
    stage: Rc<P>,
    upstream: U,
}

impl<P, U> TransformFlow<P, U> {
    pub fn new(stage: Rc<P>, upstream: U) -> Self {
        Self { stage, upstream }
    }
}

impl<P, U> Flow for TransformFlow<P, U>
where
    U: Flow,
    U::Item: Clone + 'static,
    P: Pipeline<U::Item>,
{
    type Item = P::Output;

    async fn advance(&mut self) -> Option<P::Output> {
        loop {
            let value = self.upstream.advance().await?;
            match self.stage.transform(value).await {
                Outcome::Emit(value) => return Some(value),
                Outcome::Suppress => continue,
                Outcome::End => return None,
            }
        }
    }
}
