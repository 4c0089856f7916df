//! HTTP error types

use crate::types::HttpMethodError;
use stampede_resilience::Retryable;

/// Error type for HTTP operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(#[from] HttpMethodError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Retryable for HttpError {
    /// Only transport failures are retried; a received status is never retried
    fn is_retryable(&self) -> bool {
        match self {
            HttpError::NetworkError(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            _ => false,
        }
    }
}
