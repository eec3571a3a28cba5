//! Skald error types

use std::time::Duration;

use crate::types::ProviderId;

/// Skald error types
#[derive(Debug, thiserror::Error)]
pub enum SkaldError {
    // Provider errors
    #[error("{provider} error: {message}")]
    Provider {
        provider: ProviderId,
        message: String,
    },

    #[error("{provider} authentication failed")]
    AuthenticationFailed { provider: ProviderId },

    #[error("{provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: ProviderId,
        retry_after: Option<Duration>,
    },

    /// The provider answered, but with nothing usable.
    #[error("{provider} returned an empty commit message")]
    EmptyResponse { provider: ProviderId },

    // Input errors
    /// Nothing to describe. Not a failed generation: no provider was called.
    #[error("no changes to generate a commit message for")]
    NoChanges,

    // Cancellation
    #[error("cancelled while waiting for a generation slot")]
    RateLimitAborted,

    #[error("generation cancelled")]
    Cancelled,

    // Storage errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SkaldError {
    /// Shorthand for a generic provider failure.
    pub fn provider(provider: ProviderId, message: impl Into<String>) -> Self {
        SkaldError::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Whether this error came from a caller-side cancellation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SkaldError::RateLimitAborted | SkaldError::Cancelled)
    }

    /// Whether this error was produced by (or about) a provider adapter.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            SkaldError::Provider { .. }
                | SkaldError::AuthenticationFailed { .. }
                | SkaldError::RateLimited { .. }
                | SkaldError::EmptyResponse { .. }
        )
    }
}

/// Result type alias for Skald operations
pub type Result<T> = std::result::Result<T, SkaldError>;
