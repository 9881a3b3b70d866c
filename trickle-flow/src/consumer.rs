use crate::callback::Callback;
use crate::contract::Sink;
use crate::error::{FlowError, Result};

/// Sink handing every value to a callable.
pub struct Consumer<T> {
    f: Callback<T, Result<()>>,
}

impl<T> Consumer<T>
where
    T: 'static,
{
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(T) + 'static,
    {
        let mut f = f;
        Self {
            f: Callback::new_sync(move |value: T| {
                f(value);
                Ok::<_, FlowError>(())
            }),
        }
    }

    pub fn new_async<F>(f: F) -> Self
    where
        F: AsyncFn(T) + 'static,
    {
        Self {
            f: Callback::new_async(async move |value: T| {
                f(value).await;
                Ok::<_, FlowError>(())
            }),
        }
    }

    /// Consume with a callable which may fail.
    ///
    /// The first failure ends the chain with it.
    pub fn fallible<F>(f: F) -> Self
    where
        F: FnMut(T) -> anyhow::Result<()> + 'static,
    {
        let mut f = f;
        Self {
            f: Callback::new_sync(move |value: T| Ok::<_, FlowError>(f(value)?)),
        }
    }
}

impl<T> Sink<T> for Consumer<T>
where
    T: 'static,
{
    async fn accept(&mut self, value: T) -> Result<()> {
        self.f.call(value).await
    }
}

pub fn consumer<T, F>(f: F) -> Consumer<T>
where
    T: 'static,
    F: FnMut(T) + 'static,
{
    Consumer::new(f)
}

pub fn aconsumer<T, F>(f: F) -> Consumer<T>
where
    T: 'static,
    F: AsyncFn(T) + 'static,
{
    Consumer::new_async(f)
}
