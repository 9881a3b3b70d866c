use crate::callback::Callback;
use crate::contract::{Flow, Outcome, Pipeline, TransformFlow};
use std::rc::Rc;

/// Stage passing only the values accepted by a predicate.
pub struct Filter<T> {
    predicate: Callback<T, bool>,
}

impl<T> Filter<T>
where
    T: Clone + 'static,
{
    pub fn new<F>(predicate: F) -> Self
    where
        F: FnMut(T) -> bool + 'static,
    {
        Self {
            predicate: Callback::new_sync(predicate),
        }
    }

    pub fn new_async<F>(predicate: F) -> Self
    where
        F: AsyncFn(T) -> bool + 'static,
    {
        Self {
            predicate: Callback::new_async(predicate),
        }
    }
}

impl<T> Pipeline<T> for Filter<T>
where
    T: Clone + 'static,
{
    type Output = T;
    type Flow<U>
        = TransformFlow<Self, U>
    where
        U: Flow<Item = T>;

    async fn transform(&self, value: T) -> Outcome<T> {
        if self.predicate.call(value.clone()).await {
            Outcome::Emit(value)
        } else {
            Outcome::Suppress
        }
    }

    fn flow<U>(stage: Rc<Self>, upstream: U) -> Self::Flow<U>
    where
        U: Flow<Item = T>,
    {
        TransformFlow::new(stage, upstream)
    }
}

/// Stage mapping every value through a function.
pub struct Apply<In, Out> {
    f: Callback<In, Out>,
}

impl<In, Out> Apply<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(In) -> Out + 'static,
    {
        Self {
            f: Callback::new_sync(f),
        }
    }

    pub fn new_async<F>(f: F) -> Self
    where
        F: AsyncFn(In) -> Out + 'static,
    {
        Self {
            f: Callback::new_async(f),
        }
    }
}

impl<In, Out> Pipeline<In> for Apply<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
{
    type Output = Out;
    type Flow<U>
        = TransformFlow<Self, U>
    where
        U: Flow<Item = In>;

    async fn transform(&self, value: In) -> Outcome<Out> {
        Outcome::Emit(self.f.call(value).await)
    }

    fn flow<U>(stage: Rc<Self>, upstream: U) -> Self::Flow<U>
    where
        U: Flow<Item = In>,
    {
        TransformFlow::new(stage, upstream)
    }
}

pub fn pipe<In, Out, F>(f: F) -> Apply<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
    F: FnMut(In) -> Out + 'static,
{
    Apply::new(f)
}

pub fn apipe<In, Out, F>(f: F) -> Apply<In, Out>
where
    In: Clone + 'static,
    Out: Clone + 'static,
    F: AsyncFn(In) -> Out + 'static,
{
    Apply::new_async(f)
}

pub fn filter<T, F>(predicate: F) -> Filter<T>
where
    T: Clone + 'static,
    F: FnMut(T) -> bool + 'static,
{
    Filter::new(predicate)
}

pub fn afilter<T, F>(predicate: F) -> Filter<T>
where
    T: Clone + 'static,
    F: AsyncFn(T) -> bool + 'static,
{
    Filter::new_async(predicate)
}
