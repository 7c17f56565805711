//! Model invariant errors.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised when a model invariant would be violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Illegal publish transition for {target}: {from} -> {to}")]
    IllegalTransition {
        target: String,
        from: String,
        to: String,
    },

    #[error("Job {0} has no edited file to stage")]
    NotTranscoded(usize),
}
