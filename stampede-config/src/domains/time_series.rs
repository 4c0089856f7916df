//! Time-series (long duration) scheduling configuration

use crate::error::ConfigResult;
use crate::validation::{
    validate_finite_positive, validate_non_negative, validate_positive, Validatable,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How peak periods raise the load ratio
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeakKernel {
    #[default]
    None,

    /// Multiply the ratio by `factor` on every listed peak period
    Multiplicative {
        #[serde(default = "default_peak_factor")]
        factor: f64,
    },

    /// Smooth bumps centred on each peak: `1 + (scale - 1) * sum(exp(-d^2 / 2 sigma^2))`
    Gaussian {
        #[serde(default = "default_peak_scale")]
        scale: f64,
        #[serde(default = "default_peak_sigma")]
        sigma: f64,
    },
}

/// Bounded random jitter applied to each period's load ratio
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Jitter {
    #[default]
    None,
    /// `ratio + u`, `u` uniform in `[-amount, amount]`
    Additive { amount: f64 },
    /// `ratio * (1 + u)`, `u` uniform in `[-fraction, fraction]`
    Proportional { fraction: f64 },
}

/// Fixed-length load periods with a derived per-period user count
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSeriesConfig {
    /// Length of one period; also the pause between periods
    #[serde(with = "humantime_serde", default = "default_unit_time")]
    pub unit_time: Duration,

    /// Total run length; must be a whole multiple of `unit_time`
    #[serde(with = "humantime_serde", default = "default_total_time")]
    pub total_time: Duration,

    /// Baseline users per period
    #[serde(default = "default_unit_users")]
    pub unit_users: u32,

    /// Amplitude of the sinusoidal oscillation around the baseline
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,

    /// Zero-based indices of peak periods
    #[serde(default)]
    pub peaks: Vec<u32>,

    #[serde(default)]
    pub peak_kernel: PeakKernel,

    #[serde(default)]
    pub jitter: Jitter,
}

impl Default for TimeSeriesConfig {
    fn default() -> Self {
        Self {
            unit_time: default_unit_time(),
            total_time: default_total_time(),
            unit_users: default_unit_users(),
            amplitude: default_amplitude(),
            peaks: Vec::new(),
            peak_kernel: PeakKernel::None,
            jitter: Jitter::Additive { amount: 0.1 },
        }
    }
}

impl TimeSeriesConfig {
    /// Number of periods, or `None` when the durations do not divide evenly
    pub fn num_periods(&self) -> Option<u32> {
        let unit = self.unit_time.as_nanos();
        let total = self.total_time.as_nanos();
        if unit == 0 || total % unit != 0 {
            return None;
        }
        u32::try_from(total / unit).ok()
    }
}

impl Validatable for TimeSeriesConfig {
    fn validate(&self) -> ConfigResult<()> {
        let domain = self.domain_name();
        validate_positive(self.unit_time.as_nanos(), "unit_time", domain)?;
        validate_positive(self.total_time.as_nanos(), "total_time", domain)?;
        validate_positive(self.unit_users, "unit_users", domain)?;
        validate_non_negative(self.amplitude, "amplitude", domain)?;

        if self.num_periods().is_none() {
            return Err(self.validation_error(format!(
                "total_time ({:?}) must be a whole multiple of unit_time ({:?})",
                self.total_time, self.unit_time
            )));
        }

        match &self.peak_kernel {
            PeakKernel::None => {}
            PeakKernel::Multiplicative { factor } => {
                validate_finite_positive(*factor, "peak_kernel.factor", domain)?;
            }
            PeakKernel::Gaussian { scale, sigma } => {
                validate_finite_positive(*scale, "peak_kernel.scale", domain)?;
                validate_finite_positive(*sigma, "peak_kernel.sigma", domain)?;
            }
        }

        match &self.jitter {
            Jitter::None => {}
            Jitter::Additive { amount } => validate_non_negative(*amount, "jitter.amount", domain)?,
            Jitter::Proportional { fraction } => {
                validate_non_negative(*fraction, "jitter.fraction", domain)?;
                if *fraction >= 1.0 {
                    return Err(self.validation_error("jitter.fraction must be below 1"));
                }
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "time_series"
    }
}

// Default value functions
fn default_unit_time() -> Duration {
    Duration::from_secs(10)
}

fn default_total_time() -> Duration {
    Duration::from_secs(60)
}

fn default_unit_users() -> u32 {
    10
}

fn default_amplitude() -> f64 {
    0.5
}

fn default_peak_factor() -> f64 {
    1.5
}

fn default_peak_scale() -> f64 {
    4.0
}

fn default_peak_sigma() -> f64 {
    3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_time_series() {
        let config = TimeSeriesConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_periods(), Some(6));
    }

    #[test]
    fn test_non_divisible_durations_rejected() {
        let config = TimeSeriesConfig {
            unit_time: Duration::from_secs(7),
            total_time: Duration::from_secs(60),
            ..TimeSeriesConfig::default()
        };
        assert_eq!(config.num_periods(), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_kernels_from_yaml() {
        let yaml = r#"
unit_time: 5s
total_time: 1m
unit_users: 10
amplitude: 0
peaks: [2, 6]
peak_kernel:
  kind: gaussian
  scale: 4.0
jitter:
  kind: proportional
  fraction: 0.008
"#;
        let config: TimeSeriesConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_periods(), Some(12));
        assert_eq!(
            config.peak_kernel,
            PeakKernel::Gaussian {
                scale: 4.0,
                sigma: 3.0
            }
        );
        assert_eq!(config.jitter, Jitter::Proportional { fraction: 0.008 });
    }

    #[test]
    fn test_non_finite_kernel_rejected() {
        let config = TimeSeriesConfig {
            peaks: vec![1],
            peak_kernel: PeakKernel::Multiplicative {
                factor: f64::INFINITY,
            },
            ..TimeSeriesConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("peak_kernel.factor"));

        let yaml = "peaks: [2]\npeak_kernel:\n  kind: gaussian\n  sigma: .nan\n";
        let config: TimeSeriesConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());

        let yaml = "peaks: [2]\npeak_kernel:\n  kind: gaussian\n  scale: .inf\n";
        let config: TimeSeriesConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multiplicative_kernel_default_factor() {
        let kernel: PeakKernel = serde_yaml::from_str("kind: multiplicative\n").unwrap();
        assert_eq!(kernel, PeakKernel::Multiplicative { factor: 1.5 });
    }
}
