//! Cooperative task layer.
//!
//! The dataflow chains of trickle are meant for
//! small devices, where the program is a handful
//! of cooperative tasks on a single thread: one per
//! terminal chain, plus the background jobs that
//! stateful sources spawn for themselves (reverting
//! a latched value, animating an eased value).
//!
//! There is no parallelism among these tasks, they
//! only yield at their suspension points. That is
//! also why nothing here is required to be `Send`,
//! sources freely share `Rc` and `RefCell` state.
//!
//! This crate wraps a current-thread tokio runtime
//! and its `LocalSet` into such a scheduler, and
//! provides owned task handles which cancel the
//! task when dropped, so that entities spawning
//! background work can tie it to their lifetime.

#[doc(hidden)]
pub mod spawner;
#[rustfmt::skip]
pub use spawner::{
    Cancelled, Handle, Task,
    spawn, is_initialized,
};

pub mod framework;

pub mod ready_poll;
