//! Concurrency sweep configuration

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Successive load levels, each run fully concurrent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    #[serde(default = "default_levels")]
    pub levels: Vec<u32>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
        }
    }
}

impl Validatable for SweepConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.levels.is_empty() {
            return Err(self.validation_error("at least one load level is required"));
        }
        if self.levels.contains(&0) {
            return Err(self.validation_error("load levels must be greater than 0"));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "sweep"
    }
}

fn default_levels() -> Vec<u32> {
    vec![10, 20, 30, 40, 50]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_validation() {
        assert!(SweepConfig::default().validate().is_ok());
        assert!(SweepConfig { levels: vec![] }.validate().is_err());
        assert!(SweepConfig { levels: vec![10, 0] }.validate().is_err());
    }
}
