//! Utility types and helpers for configuration

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inclusive duration window used for think times, backoff and synthetic latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    #[serde(with = "humantime_serde")]
    pub min: Duration,

    #[serde(with = "humantime_serde")]
    pub max: Duration,
}

impl DurationRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// A window that always yields `value`
    pub fn fixed(value: Duration) -> Self {
        Self::new(value, value)
    }

    pub fn zero() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn from_millis(min: u64, max: u64) -> Self {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }
}

impl Default for DurationRange {
    fn default() -> Self {
        Self::zero()
    }
}

/// Validate that a window is not inverted
pub fn validate_duration_range(
    range: &DurationRange,
    field_name: &str,
    domain: &str,
) -> ConfigResult<()> {
    if range.min > range.max {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!(
                "{}.min ({:?}) must not exceed {}.max ({:?})",
                field_name, range.min, field_name, range.max
            ),
        });
    }
    Ok(())
}

/// Default functions for serde
pub fn default_false() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_range_parses_humantime() {
        let range: DurationRange = serde_yaml::from_str("min: 200ms\nmax: 1s\n").unwrap();
        assert_eq!(range, DurationRange::from_millis(200, 1000));
        assert!(validate_duration_range(&range, "think_time", "workflows").is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let range = DurationRange::from_millis(500, 100);
        let err = validate_duration_range(&range, "backoff", "retry")
            .unwrap_err()
            .to_string();
        assert!(err.contains("retry"));
        assert!(err.contains("backoff.min"));
    }
}
