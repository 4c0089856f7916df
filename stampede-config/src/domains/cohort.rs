//! Cohort (batch scheduling) configuration

use crate::domains::utils::{validate_duration_range, DurationRange};
use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// How simulated users reach the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Real HTTP calls against the target service
    #[default]
    Live,
    /// No network; synthetic latency and success-model outcomes only
    Synthetic,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(RunMode::Live),
            "synthetic" | "dry-run" | "dry_run" => Ok(RunMode::Synthetic),
            _ => Err(format!("Invalid run mode: {}", s)),
        }
    }
}

/// Size and pacing of the simulated user cohort
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    /// Total simulated users in a batch-mode run
    #[serde(default = "default_num_users")]
    pub num_users: usize,

    /// Users per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between consecutive batches
    #[serde(with = "humantime_serde", default = "default_batch_delay")]
    pub batch_delay: Duration,

    /// Upper bound on concurrently live simulated users
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Seed for reproducible action/coin-flip sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub mode: RunMode,

    /// Per-step latency window used in synthetic mode
    #[serde(default = "default_synthetic_latency")]
    pub synthetic_latency: DurationRange,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            num_users: default_num_users(),
            batch_size: default_batch_size(),
            batch_delay: default_batch_delay(),
            max_workers: default_max_workers(),
            seed: None,
            mode: RunMode::default(),
            synthetic_latency: default_synthetic_latency(),
        }
    }
}

impl CohortConfig {
    /// Number of batches `num_users` splits into
    pub fn batch_count(&self) -> usize {
        if self.batch_size == 0 {
            return 0;
        }
        self.num_users.div_ceil(self.batch_size)
    }
}

impl Validatable for CohortConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.num_users, "num_users", self.domain_name())?;
        validate_positive(self.batch_size, "batch_size", self.domain_name())?;
        validate_positive(self.max_workers, "max_workers", self.domain_name())?;
        validate_duration_range(
            &self.synthetic_latency,
            "synthetic_latency",
            self.domain_name(),
        )?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "cohort"
    }
}

// Default value functions
fn default_num_users() -> usize {
    50
}

fn default_batch_size() -> usize {
    20
}

fn default_batch_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_workers() -> usize {
    200
}

fn default_synthetic_latency() -> DurationRange {
    DurationRange::from_millis(100, 800)
}
