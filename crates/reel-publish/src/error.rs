//! Publish error types.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use reel_models::ModelError;

/// Result type for a single target call.
pub type TargetResult<T> = Result<T, TargetError>;

/// Result type for a coordinated publish.
pub type PublishResult<T> = Result<T, PublishError>;

/// Error from one call against a publish target.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Failed to configure target: {0}")]
    ConfigError(String),

    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        /// Graph API error code, when the body carried one
        code: Option<i64>,
        message: String,
    },

    #[error("Response missing `{0}`")]
    MissingField(&'static str),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl TargetError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn http(status: u16, code: Option<i64>, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            code,
            message: message.into(),
        }
    }

    /// HTTP status, for HTTP-level failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            TargetError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Graph API error code, when present.
    pub fn code(&self) -> Option<i64> {
        match self {
            TargetError::Http { code, .. } => *code,
            _ => None,
        }
    }
}

/// Which half of the protocol failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPhase {
    Create,
    Publish,
}

impl fmt::Display for PublishPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishPhase::Create => write!(f, "create"),
            PublishPhase::Publish => write!(f, "publish"),
        }
    }
}

/// Terminal outcome of a coordinated publish that did not confirm.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The target refused for a reason other than readiness.
    #[error("{target} rejected {phase}: {source}")]
    Rejected {
        target: String,
        phase: PublishPhase,
        source: TargetError,
    },

    /// The target never became ready within the wait budget.
    #[error("{target} not ready after {}s ({attempts} attempts)", .waited.as_secs())]
    Timeout {
        target: String,
        attempts: u32,
        waited: Duration,
    },

    #[error("Invalid publish policy: {0}")]
    InvalidPolicy(String),

    #[error(transparent)]
    State(#[from] ModelError),
}

impl PublishError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PublishError::Timeout { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, PublishError::Rejected { .. })
    }

    /// Target the error concerns, when known.
    pub fn target(&self) -> Option<&str> {
        match self {
            PublishError::Rejected { target, .. } | PublishError::Timeout { target, .. } => {
                Some(target)
            }
            _ => None,
        }
    }
}
