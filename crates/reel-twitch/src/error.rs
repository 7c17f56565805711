//! Discovery error types.

use thiserror::Error;

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors that can occur while discovering clips.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to configure Twitch client: {0}")]
    ConfigError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Twitch API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl DiscoveryError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// True for credential failures.
    pub fn is_auth(&self) -> bool {
        matches!(self, DiscoveryError::AuthError(_))
    }
}
