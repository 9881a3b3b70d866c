use crate::contract::{Flow, Outcome, Pipeline, TransformFlow};
use crate::easing::Interpolate;
use std::cell::RefCell;
use std::rc::Rc;

/// Retention of the previous state by default.
pub const DEFAULT_WEIGHT: f64 = 0.5;

/// Exponentially weighted moving average.
///
/// The first value becomes the state as is, every
/// later value `v` moves it to
/// `weight * previous + (1 - weight) * v`, so a
/// larger weight smooths harder. Feeding a constant
/// leaves the state unchanged.
pub struct Ewma<T> {
    weight: f64,
    state: RefCell<Option<T>>,
}

impl<T> Default for Ewma<T> {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHT)
    }
}

impl<T> Ewma<T> {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            state: RefCell::new(None),
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl<T> Pipeline<T> for Ewma<T>
where
    T: Interpolate,
{
    type Output = T;
    type Flow<U>
        = TransformFlow<Self, U>
    where
        U: Flow<Item = T>;

    async fn transform(&self, value: T) -> Outcome<T> {
        let mut state = self.state.borrow_mut();
        let next = match state.as_ref() {
            None => value,
            Some(previous) => value.lerp(previous, self.weight),
        };
        *state = Some(next.clone());
        Outcome::Emit(next)
    }

    fn flow<U>(stage: Rc<Self>, upstream: U) -> Self::Flow<U>
    where
        U: Flow<Item = T>,
    {
        TransformFlow::new(stage, upstream)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::SourceExt;
    use crate::contract::Source;
    use crate::testutil::{TestFixture, drain, finite};

    #[test]
    fn test_smoothing() {
        let fx = TestFixture::new();
        let source = finite(vec![10.0, 20.0, 20.0, 0.0]).then(Ewma::new(0.75));
        let values = fx.run(drain(source.iterate()));
        assert_eq!(values, vec![10.0, 12.5, 14.375, 10.78125]);
    }

    #[test]
    fn test_constant_idempotent() {
        let fx = TestFixture::new();
        let input = vec![0.1, 0.1, 0.1, 0.1, 0.1, 0.1];
        let source = finite(input.clone()).then(Ewma::new(0.3));
        let values = fx.run(drain(source.iterate()));
        assert_eq!(values, input);
    }

    #[test]
    fn test_shared_state() {
        let fx = TestFixture::new();
        let source = finite(vec![4.0f32, 8.0, 8.0]).then(Ewma::default());
        fx.run(async move {
            assert_eq!(source.pull().await, Outcome::Emit(4.0));
            let mut flow = source.iterate();
            assert_eq!(flow.advance().await, Some(6.0));
            assert_eq!(flow.advance().await, Some(7.0));
        });
    }
}
