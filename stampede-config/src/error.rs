//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Problems found while loading or validating a load-test configuration.
///
/// Any of these aborts a run before a single simulated user starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON config: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A rule spanning several domains, e.g. an action with no workflow
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Invalid environment override {var}: {message}")]
    EnvError { var: String, message: String },

    #[error("Invalid {domain} configuration: {message}")]
    DomainError { domain: String, message: String },
}

impl ConfigError {
    /// The config section at fault, when the error belongs to one
    pub fn domain(&self) -> Option<&str> {
        match self {
            ConfigError::DomainError { domain, .. } => Some(domain),
            _ => None,
        }
    }
}
