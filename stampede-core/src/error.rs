//! Error types for load-test orchestration

use stampede_config::ConfigError;
use stampede_http::HttpError;
use thiserror::Error;

/// Errors that stop a run before any simulated user starts.
///
/// Failures during a run are data on [`crate::UserResult`], never errors.
#[derive(Error, Debug)]
pub enum LoadTestError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid action set: {0}")]
    InvalidActions(String),

    #[error("Invalid workflow '{action}': {message}")]
    InvalidWorkflow { action: String, message: String },

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] HttpError),

    #[error("Result sink error: {0}")]
    Sink(String),
}

impl LoadTestError {
    /// Shorthand for a configuration problem found outside a single domain
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(ConfigError::ValidationError(message.into()))
    }
}
