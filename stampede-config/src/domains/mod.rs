//! Domain-specific configuration modules

pub mod actions;
pub mod cohort;
pub mod logging;
pub mod retry;
pub mod success;
pub mod sweep;
pub mod target;
pub mod time_series;
pub mod utils;
pub mod workflow;

use crate::error::{ConfigError, ConfigResult};
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main load test configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoadTestConfig {
    /// Target service configuration
    #[serde(default)]
    pub target: target::TargetConfig,

    /// Retry/backoff configuration
    #[serde(default)]
    pub retry: retry::RetryConfig,

    /// Batch scheduling configuration
    #[serde(default)]
    pub cohort: cohort::CohortConfig,

    /// Weighted action distribution
    #[serde(default)]
    pub actions: actions::ActionMix,

    /// Request steps per action
    #[serde(default)]
    pub workflows: workflow::WorkflowsConfig,

    /// Success probability model
    #[serde(default)]
    pub success: success::SuccessConfig,

    /// Time-series scheduling (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_series: Option<time_series::TimeSeriesConfig>,

    /// Concurrency sweep (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep: Option<sweep::SweepConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl LoadTestConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.target.validate()?;
        self.retry.validate()?;
        self.cohort.validate()?;
        self.actions.validate()?;
        self.workflows.validate()?;
        self.success.validate()?;
        self.logging.validate()?;

        if let Some(ref time_series) = self.time_series {
            time_series.validate()?;
        }

        if let Some(ref sweep) = self.sweep {
            sweep.validate()?;
        }

        // Every weighted action must map to a workflow
        for action in self.actions.actions() {
            if self.workflows.get(action).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "action '{}' has no workflow defined",
                    action
                )));
            }
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = LoadTestConfig {
            time_series: Some(time_series::TimeSeriesConfig::default()),
            sweep: Some(sweep::SweepConfig::default()),
            ..LoadTestConfig::default()
        };
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LoadTestConfig::default().validate_all().is_ok());
    }

    #[test]
    fn test_action_without_workflow_rejected() {
        let mut config = LoadTestConfig::default();
        config.actions = actions::ActionMix::only("checkout");
        let err = config.validate_all().unwrap_err().to_string();
        assert!(err.contains("checkout"));
    }

    #[test]
    fn test_sample_round_trips() {
        let sample = LoadTestConfig::generate_sample();
        let parsed: LoadTestConfig = serde_yaml::from_str(&sample).unwrap();
        assert!(parsed.validate_all().is_ok());
        assert!(parsed.time_series.is_some());
        assert!(parsed.sweep.is_some());
    }
}
