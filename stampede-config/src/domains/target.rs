//! Target service (HTTP client) configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the simulated users send their requests, and how
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the service under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,

    /// Connection timeout
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum idle pooled connections per host
    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
            max_idle_per_host: default_max_idle_per_host(),
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.base_url, "base_url", self.domain_name())?;
        validate_positive(self.timeout.as_millis(), "timeout", self.domain_name())?;
        validate_positive(
            self.connect_timeout.as_millis(),
            "connect_timeout",
            self.domain_name(),
        )?;
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    concat!("stampede/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_idle_per_host() -> usize {
    32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_config_defaults() {
        let config = TargetConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("stampede/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_target_config_validation() {
        let mut config = TargetConfig::default();
        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        config = TargetConfig::default();
        config.base_url = "localhost:5000".to_string();
        assert!(config.validate().is_err());

        config = TargetConfig::default();
        config.user_agent = " ".to_string();
        assert!(config.validate().is_err());
    }
}
