//! Request retry configuration

use crate::domains::utils::{validate_duration_range, DurationRange};
use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Retry behaviour for transport-level failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first one fails
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Uniform jitter window slept between attempts
    #[serde(default = "default_backoff")]
    pub backoff: DurationRange,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff: default_backoff(),
        }
    }
}

impl RetryConfig {
    /// Total number of attempts a single request may make
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Validatable for RetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_duration_range(&self.backoff, "backoff", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "retry"
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff() -> DurationRange {
    DurationRange::from_millis(200, 500)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.backoff, DurationRange::from_millis(200, 500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_retries_is_valid() {
        let config = RetryConfig {
            max_retries: 0,
            backoff: DurationRange::zero(),
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.max_attempts(), 1);
    }
}
