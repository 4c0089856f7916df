//! Configuration loading and environment variable handling

use crate::domains::LoadTestConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "STAMPEDE".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML or JSON file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<LoadTestConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: LoadTestConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        log::debug!("Loaded configuration from {}", path.display());

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<LoadTestConfig> {
        let mut config = LoadTestConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<LoadTestConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut LoadTestConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_retry_overrides(&mut config.retry)?;
        self.apply_cohort_overrides(&mut config.cohort)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(base_url) = self.get_env_var("BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(timeout) = self.get_env_var("HTTP_TIMEOUT_MS") {
            config.timeout = Duration::from_millis(self.parse_var("HTTP_TIMEOUT_MS", &timeout)?);
        }

        Ok(())
    }

    fn apply_retry_overrides(
        &self,
        config: &mut crate::domains::retry::RetryConfig,
    ) -> ConfigResult<()> {
        if let Ok(max_retries) = self.get_env_var("MAX_RETRIES") {
            config.max_retries = self.parse_var("MAX_RETRIES", &max_retries)?;
        }

        Ok(())
    }

    fn apply_cohort_overrides(
        &self,
        config: &mut crate::domains::cohort::CohortConfig,
    ) -> ConfigResult<()> {
        if let Ok(num_users) = self.get_env_var("NUM_USERS") {
            config.num_users = self.parse_var("NUM_USERS", &num_users)?;
        }

        if let Ok(batch_size) = self.get_env_var("BATCH_SIZE") {
            config.batch_size = self.parse_var("BATCH_SIZE", &batch_size)?;
        }

        if let Ok(delay) = self.get_env_var("BATCH_DELAY_MS") {
            config.batch_delay = Duration::from_millis(self.parse_var("BATCH_DELAY_MS", &delay)?);
        }

        if let Ok(max_workers) = self.get_env_var("MAX_WORKERS") {
            config.max_workers = self.parse_var("MAX_WORKERS", &max_workers)?;
        }

        if let Ok(seed) = self.get_env_var("SEED") {
            config.seed = Some(self.parse_var("SEED", &seed)?);
        }

        if let Ok(mode) = self.get_env_var("MODE") {
            config.mode = self.parse_var("MODE", &mode)?;
        }

        Ok(())
    }

    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = self.parse_var("LOG_LEVEL", &log_level)?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = self.parse_var("LOG_FORMAT", &format)?;
        }

        Ok(())
    }

    fn parse_var<T>(&self, name: &str, value: &str) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        value.trim().parse().map_err(|e: T::Err| {
            ConfigError::EnvError {
                var: format!("{}_{}", self.prefix, name),
                message: e.to_string(),
            }
        })
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
