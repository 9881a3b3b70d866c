use futures::future::LocalBoxFuture;
use std::cell::RefCell;

/// AsyncCallback trait that is dyn-compatible.
///
/// The original AsyncFn(A) is not dyn-compatible,
/// but sources and stages keep their callables
/// behind a uniform type, so we must pay the price
/// of boxing the futures.
pub trait AsyncCallback<A, R> {
    fn call_boxed(&self, arg: A) -> LocalBoxFuture<'_, R>;
}

impl<A, R, F> AsyncCallback<A, R> for F
where
    F: AsyncFn(A) -> R,
    A: 'static,
    R: 'static,
{
    fn call_boxed(&self, arg: A) -> LocalBoxFuture<'_, R> {
        Box::pin(async move { (self)(arg).await })
    }
}

/// Plain or asynchronous callable.
///
/// Probes, predicates and transforms are written
/// either way, and are invoked uniformly through
/// [`Callback::call`] after being wrapped.
pub enum Callback<A, R> {
    Sync(RefCell<Box<dyn FnMut(A) -> R>>),
    Async(Box<dyn AsyncCallback<A, R>>),
}

impl<A, R> Callback<A, R>
where
    A: 'static,
    R: 'static,
{
    pub fn new_sync<F>(f: F) -> Self
    where
        F: FnMut(A) -> R + 'static,
    {
        Callback::Sync(RefCell::new(Box::new(f)))
    }

    pub fn new_async<F>(f: F) -> Self
    where
        F: AsyncFn(A) -> R + 'static,
    {
        Callback::Async(Box::new(f))
    }

    /// Invoke the callable, awaiting it if needed.
    ///
    /// A plain callable must not reenter itself, the
    /// borrow of its state lasts for the call.
    pub async fn call(&self, arg: A) -> R {
        match self {
            Callback::Sync(f) => {
                let mut f = f.borrow_mut();
                f(arg)
            }
            Callback::Async(f) => f.call_boxed(arg).await,
        }
    }
}

/// Wrap a plain callable so it awaits like an async one.
pub fn asynchronize<A, R, F>(f: F) -> Callback<A, R>
where
    F: FnMut(A) -> R + 'static,
    A: 'static,
    R: 'static,
{
    Callback::new_sync(f)
}
