use crate::contract::{Flow, Outcome, PullFlow, Sink, Source};
use crate::error::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use trickle_task::framework::{Config, Framework, initialize};

/// Paused-clock scheduler for the unit tests.
///
/// Sleeps advance the virtual clock as soon as every
/// task is idle, so timing assertions are exact.
pub(crate) struct TestFixture {
    framework: Framework,
}

impl TestFixture {
    pub(crate) fn new() -> Self {
        let framework = initialize(Config {
            start_paused: true,
            ..Config::default()
        })
        .unwrap();
        Self { framework }
    }

    pub(crate) fn run<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        self.framework.run(future)
    }
}

/// Source handing out a fixed sequence, then ending.
#[derive(Clone)]
pub(crate) struct Finite<T> {
    items: Rc<RefCell<VecDeque<T>>>,
}

pub(crate) fn finite<T>(items: Vec<T>) -> Finite<T> {
    Finite {
        items: Rc::new(RefCell::new(items.into())),
    }
}

impl<T> Source for Finite<T>
where
    T: Clone + 'static,
{
    type Output = T;
    type Flow = PullFlow<Self>;

    async fn pull(&self) -> Outcome<T> {
        self.items.borrow_mut().pop_front().into()
    }

    fn iterate(&self) -> PullFlow<Self> {
        PullFlow::new(self.clone())
    }
}

/// Sink recording every accepted value.
#[derive(Clone, Default)]
pub(crate) struct Collect<T> {
    pub(crate) items: Rc<RefCell<Vec<T>>>,
}

impl<T> Collect<T> {
    pub(crate) fn take(&self) -> Vec<T> {
        std::mem::take(&mut self.items.borrow_mut())
    }
}

impl<T> Sink<T> for Collect<T>
where
    T: 'static,
{
    async fn accept(&mut self, value: T) -> Result<()> {
        self.items.borrow_mut().push(value);
        Ok(())
    }
}

/// Advance the flow until it is exhausted.
pub(crate) async fn drain<F>(mut flow: F) -> Vec<F::Item>
where
    F: Flow,
{
    let mut items = Vec::new();
    while let Some(item) = flow.advance().await {
        items.push(item);
    }
    items
}
