//! Error types shared by the codec, synchronizer, providers and tooling.

use thiserror::Error;

/// Errors surfaced by blockpad operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An operation needed a focused editor or well-formed input and had neither.
    #[error("{0}")]
    ValidationError(String),

    /// The current document is not bound to any known code block.
    #[error("{0}")]
    ScopeError(String),

    /// Login was rejected, cancelled, or never attempted.
    #[error("{0}")]
    AuthError(String),

    /// A remote call failed.
    #[error("{0}")]
    ProviderError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ApiError {
    /// Short category label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "validation",
            ApiError::ScopeError(_) => "scope",
            ApiError::AuthError(_) => "auth",
            ApiError::ProviderError(_) => "provider",
            ApiError::ConfigError(_) => "config",
            ApiError::IoError(_) => "io",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::ProviderError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::ProviderError(format!("Malformed block data: {}", err))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
