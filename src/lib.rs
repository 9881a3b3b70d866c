//! Reactive dataflow for small cooperative schedulers.
//!
//! Programs are written as chains of sources,
//! pipelines and sinks from [`flow`], each chain
//! driven as a task of the single-threaded
//! scheduler of [`task`], with [`main`] booting the
//! scheduler around an async main function.
//!
//! ```ignore
//! use trickle::flow::prelude::*;
//! use trickle::flow::{Dedup, Poll, consumer, gather};
//!
//! #[trickle::main]
//! async fn main() -> anyhow::Result<()> {
//!     let button = Poll::until(read_button, Duration::from_millis(10));
//!     let chain = button.then(Dedup).into_sink(consumer(|pressed| {
//!         println!("pressed: {pressed}");
//!     }));
//!     gather([chain.spawn()]).await?;
//!     Ok(())
//! }
//! ```

pub use trickle_entry as entry;
pub use trickle_flow as flow;
pub use trickle_task as task;

pub use trickle_entry::main;
