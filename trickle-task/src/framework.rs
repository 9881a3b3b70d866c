//! Manipulation of the task framework itself.
//!
//! Normally the chain writer does not need to care
//! about manipulating the task framework, the entry
//! crate does it for them, so we move it to a
//! submodule to avoid overwhelming them.

use crate::spawner::INITIALIZED;
use anyhow::Result;
use tokio::runtime::{Builder, Runtime};
use tokio::task::LocalSet;

/// Configuration for the task framework.
#[derive(Default, Clone, Debug)]
pub struct Config {
    /// Scheduler ticks between polls of the timer
    /// and I/O drivers, see tokio's `event_interval`.
    pub event_interval: Option<u32>,
    /// Scheduler ticks between checks of the
    /// injection queue, see tokio's
    /// `global_queue_interval`.
    pub global_queue_interval: Option<u32>,
    /// Name of the threads of the blocking pool,
    /// used by stream adapters over stdio.
    pub thread_name: Option<String>,
    /// Start with the clock paused, so that sleeps
    /// advance virtual time instantly.
    #[cfg(any(test, feature = "test-util"))]
    pub start_paused: bool,
}

/// Initialized framework handle.
///
/// This handle owns the single-threaded scheduler
/// every chain and background task runs on. By
/// dropping it, you dispose the entire framework,
/// cancelling whatever tasks are still pending.
pub struct Framework {
    // XXX: the local set must go before the runtime,
    // pending tasks hold timers of the runtime.
    local: LocalSet,
    runtime: Runtime,
}

impl Framework {
    /// Run the future to completion on the scheduler.
    ///
    /// Tasks spawned with [`crate::spawn`] make progress
    /// only while this method is running.
    pub fn run<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        self.local.block_on(&self.runtime, future)
    }
}

impl Drop for Framework {
    fn drop(&mut self) {
        INITIALIZED.set(false);
    }
}

/// Initialize the task framework.
///
/// Please notice that only one framework may be
/// in use on a thread at a time, initializing
/// another one before dropping the first fails.
pub fn initialize(cfg: Config) -> Result<Framework> {
    if INITIALIZED.get() {
        return Err(anyhow::anyhow!("Initialized framework in use."));
    }

    let mut builder = Builder::new_current_thread();
    builder.enable_time();
    if let Some(event_interval) = cfg.event_interval {
        builder.event_interval(event_interval);
    }
    if let Some(global_queue_interval) = cfg.global_queue_interval {
        builder.global_queue_interval(global_queue_interval);
    }
    if let Some(thread_name) = cfg.thread_name.as_ref() {
        builder.thread_name(thread_name);
    }
    #[cfg(any(test, feature = "test-util"))]
    if cfg.start_paused {
        builder.start_paused(true);
    }
    let runtime = builder.build()?;

    INITIALIZED.set(true);
    tracing::debug!(?cfg, "task framework initialized");
    Ok(Framework {
        local: LocalSet::new(),
        runtime,
    })
}
