//! Error types for the coaching service.

use std::time::Duration;

use uuid::Uuid;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// LLM provider errors.
///
/// Every failure mode of the completion API maps to its own variant so the
/// controller can tell a bad key apart from an exhausted quota.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited")]
    RateLimited { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Model {model} not available on provider {provider}")]
    ModelNotAvailable { provider: String, model: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

impl LlmError {
    /// Short message suitable for showing to the end user in the chat view.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => {
                "Lex is getting a lot of questions right now. Give it a moment and try again."
            }
            Self::AuthFailed { .. } | Self::ModelNotAvailable { .. } => {
                "The coach is unavailable right now. Please try again later."
            }
            Self::RequestFailed { .. } | Self::InvalidResponse { .. } => {
                "Something went wrong reaching the coach. Please try again."
            }
        }
    }
}

/// Session lookup and lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {id} not found")]
    NotFound { id: Uuid },

    #[error("Session {id} expired after {idle:?} idle")]
    Expired { id: Uuid, idle: Duration },
}
