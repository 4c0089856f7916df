//! Success-probability model configuration
//!
//! Each decay curve is a separate, named strategy. They are not variants of
//! one formula and are never reconciled into one.

use crate::error::ConfigResult;
use crate::validation::{validate_non_negative, validate_unit_interval, Validatable};
use serde::{Deserialize, Serialize};

/// Thresholds for the load-threshold decay curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessThresholds {
    /// Loads at or below this succeed with `base_rate`
    pub safe: u32,

    /// Start of the interpolation; defaults to `safe`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decay_start: Option<u32>,

    /// Loads at or above this succeed with `min_rate`
    pub decay_end: u32,

    pub base_rate: f64,
    pub min_rate: f64,
}

impl SuccessThresholds {
    pub fn decay_start(&self) -> u32 {
        self.decay_start.unwrap_or(self.safe)
    }
}

impl Default for SuccessThresholds {
    fn default() -> Self {
        Self {
            safe: 300,
            decay_start: None,
            decay_end: 400,
            base_rate: 1.0,
            min_rate: 0.1,
        }
    }
}

/// Named decay strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DecayStrategy {
    /// Flat, then linear from `base_rate` to `min_rate`, then flat
    Threshold(SuccessThresholds),

    /// `max(min_rate, base_rate - decay_coefficient * load)`
    Linear {
        base_rate: f64,
        min_rate: f64,
        decay_coefficient: f64,
    },

    /// Certain success up to `safe`, `decay_rate^(load - safe)` up to `cutoff`, `floor` beyond
    ExponentialStep {
        safe: u32,
        cutoff: u32,
        decay_rate: f64,
        floor: f64,
    },

    /// `high_rate` up to `low_benchmark`, falling linearly towards zero (floored at
    /// `low_rate`) until `high_benchmark`, `low_rate` beyond
    BenchmarkLinear {
        low_benchmark: u32,
        high_benchmark: u32,
        high_rate: f64,
        low_rate: f64,
    },

    /// Load-independent rate; 1.0 disables simulated failure
    Constant { rate: f64 },
}

impl Default for DecayStrategy {
    fn default() -> Self {
        DecayStrategy::Threshold(SuccessThresholds::default())
    }
}

/// Success model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessConfig {
    pub model: DecayStrategy,

    /// Symmetric noise as a fraction of the computed probability
    pub noise_fraction: f64,

    /// Multiplicative penalty per elapsed period in time-series runs
    pub fatigue_per_period: f64,
}

impl Default for SuccessConfig {
    fn default() -> Self {
        Self {
            model: DecayStrategy::default(),
            noise_fraction: 0.0,
            fatigue_per_period: 0.0,
        }
    }
}

impl SuccessConfig {
    pub fn with_model(model: DecayStrategy) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }
}

impl Validatable for SuccessConfig {
    fn validate(&self) -> ConfigResult<()> {
        let domain = self.domain_name();
        validate_unit_interval(self.noise_fraction, "noise_fraction", domain)?;
        validate_non_negative(self.fatigue_per_period, "fatigue_per_period", domain)?;

        match &self.model {
            DecayStrategy::Threshold(t) => {
                validate_unit_interval(t.base_rate, "base_rate", domain)?;
                validate_unit_interval(t.min_rate, "min_rate", domain)?;
                if t.min_rate > t.base_rate {
                    return Err(self.validation_error("min_rate must not exceed base_rate"));
                }
                if t.decay_start() < t.safe {
                    return Err(self.validation_error("decay_start must not be below safe"));
                }
                if t.decay_end <= t.decay_start() {
                    return Err(
                        self.validation_error("decay_end must be greater than decay_start")
                    );
                }
            }
            DecayStrategy::Linear {
                base_rate,
                min_rate,
                decay_coefficient,
            } => {
                validate_unit_interval(*base_rate, "base_rate", domain)?;
                validate_unit_interval(*min_rate, "min_rate", domain)?;
                validate_non_negative(*decay_coefficient, "decay_coefficient", domain)?;
            }
            DecayStrategy::ExponentialStep {
                safe,
                cutoff,
                decay_rate,
                floor,
            } => {
                if cutoff < safe {
                    return Err(self.validation_error("cutoff must not be below safe"));
                }
                if !(*decay_rate > 0.0 && *decay_rate <= 1.0) {
                    return Err(self.validation_error(format!(
                        "decay_rate must be within (0, 1], got {}",
                        decay_rate
                    )));
                }
                validate_unit_interval(*floor, "floor", domain)?;
            }
            DecayStrategy::BenchmarkLinear {
                low_benchmark,
                high_benchmark,
                high_rate,
                low_rate,
            } => {
                if high_benchmark <= low_benchmark {
                    return Err(self
                        .validation_error("high_benchmark must be greater than low_benchmark"));
                }
                validate_unit_interval(*high_rate, "high_rate", domain)?;
                validate_unit_interval(*low_rate, "low_rate", domain)?;
                if low_rate > high_rate {
                    return Err(self.validation_error("low_rate must not exceed high_rate"));
                }
            }
            DecayStrategy::Constant { rate } => {
                validate_unit_interval(*rate, "rate", domain)?;
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "success"
    }
}
