//! HTTP client configuration

use stampede_config::TargetConfig;
use std::time::Duration;

/// Settings for the pooled reqwest client shared by all simulated users
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Root URL every workflow path is appended to
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Idle connections kept per host
    pub max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(&TargetConfig::default())
    }
}

impl From<&TargetConfig> for HttpConfig {
    fn from(config: &TargetConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout,
            connect_timeout: config.connect_timeout,
            user_agent: config.user_agent.clone(),
            max_idle_per_host: config.max_idle_per_host,
        }
    }
}
