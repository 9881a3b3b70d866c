use crate::contract::{Flow, Outcome, Pipeline};
use std::rc::Rc;

/// Stage which drops repeated values.
///
/// The comparison is against the last value this
/// traversal emitted, so the state lives in the
/// flow: a new flow always emits its first value.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dedup;

impl<T> Pipeline<T> for Dedup
where
    T: Clone + PartialEq + 'static,
{
    type Output = T;
    type Flow<U>
        = DedupFlow<U, T>
    where
        U: Flow<Item = T>;

    async fn transform(&self, value: T) -> Outcome<T> {
        Outcome::Emit(value)
    }

    fn flow<U>(_: Rc<Self>, upstream: U) -> DedupFlow<U, T>
    where
        U: Flow<Item = T>,
    {
        DedupFlow::new(upstream)
    }
}

pub struct DedupFlow<U, T> {
    upstream: U,
    last: Option<T>,
}

impl<U, T> DedupFlow<U, T> {
    pub fn new(upstream: U) -> Self {
        Self {
            upstream,
            last: None,
        }
    }
}

impl<U, T> Flow for DedupFlow<U, T>
where
    U: Flow<Item = T>,
    T: Clone + PartialEq + 'static,
{
    type Item = T;

    async fn advance(&mut self) -> Option<T> {
        loop {
            let value = self.upstream.advance().await?;
            if self.last.as_ref() == Some(&value) {
                continue;
            }
            self.last = Some(value.clone());
            return Some(value);
        }
    }

    fn prime(&mut self, value: &T) {
        self.last = Some(value.clone());
    }
}
