use tracing_subscriber::EnvFilter;
use trickle_task::framework;

pub use trickle_task::framework::Config;

/// Result type that is forwarded to make it easy
/// for code generation.
pub type Result<T> = anyhow::Result<T>;

/// Intended entrypoint of trickle programs.
pub fn entrypoint<F>(future: F) -> Result<()>
where
    F: Future<Output = Result<()>> + 'static,
{
    entrypoint_with(Config::default(), future)
}

/// Entrypoint with a tuned scheduler.
///
/// Logging is configured from `RUST_LOG` here,
/// then the scheduler is brought up and the main
/// future runs on it until it returns. Whatever
/// chains it spawned and did not await are
/// cancelled when the scheduler is torn down.
pub fn entrypoint_with<F>(cfg: Config, future: F) -> Result<()>
where
    F: Future<Output = Result<()>> + 'static,
{
    // A subscriber installed earlier, for example by
    // the embedding application, takes precedence.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let taskfx = framework::initialize(cfg)?;
    let result = taskfx.run(future);
    if let Err(err) = &result {
        tracing::error!(%err, "main returned an error");
    }
    result
}

pub use trickle_entry_macros::main;
