use thiserror::Error;

/// Result type of the fallible parts of a chain.
pub type Result<T, E = FlowError> = std::result::Result<T, E>;

/// Failure raised by a sink, which ends the chain.
///
/// Exhaustion is never an error, it is the `End`
/// outcome of a source. Neither is cancellation,
/// it is absorbed where the chain is driven.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("stream I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid stream data: {0}")]
    Invalid(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
