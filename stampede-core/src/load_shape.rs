//! Per-period user counts for time-series runs

use crate::error::LoadTestError;
use rand::Rng;
use stampede_config::{Jitter, PeakKernel, TimeSeriesConfig};
use std::f64::consts::PI;
use std::time::Duration;
use tracing::warn;

/// Lowest load ratio a period can have
pub const MIN_RATIO: f64 = 0.1;

/// Most concurrent users a single period may ask for
pub const MAX_PERIOD_USERS: u32 = 100_000;

/// Baseline users modulated by a sinusoid, peak kernel and jitter
#[derive(Debug, Clone)]
pub struct LoadShape {
    unit_users: u32,
    amplitude: f64,
    peaks: Vec<u32>,
    kernel: PeakKernel,
    jitter: Jitter,
    num_periods: u32,
    unit_time: Duration,
}

impl LoadShape {
    /// Rejects durations that do not divide into a whole number of periods
    pub fn new(config: &TimeSeriesConfig) -> Result<Self, LoadTestError> {
        let num_periods = config.num_periods().filter(|n| *n > 0).ok_or_else(|| {
            LoadTestError::configuration(format!(
                "time_series total_time ({:?}) must be a whole, non-zero multiple of unit_time ({:?})",
                config.total_time, config.unit_time
            ))
        })?;

        Ok(Self {
            unit_users: config.unit_users,
            amplitude: config.amplitude,
            peaks: config.peaks.clone(),
            kernel: config.peak_kernel.clone(),
            jitter: config.jitter.clone(),
            num_periods,
            unit_time: config.unit_time,
        })
    }

    pub fn num_periods(&self) -> u32 {
        self.num_periods
    }

    pub fn unit_time(&self) -> Duration {
        self.unit_time
    }

    /// Ratio before jitter and flooring
    pub fn base_ratio(&self, period: u32) -> f64 {
        let t = f64::from(period);
        let n = f64::from(self.num_periods.max(1));
        let wave = 1.0 + self.amplitude * (2.0 * PI * t / n).sin();

        let peak = match &self.kernel {
            PeakKernel::None => 1.0,
            PeakKernel::Multiplicative { factor } => {
                if self.peaks.contains(&period) {
                    *factor
                } else {
                    1.0
                }
            }
            PeakKernel::Gaussian { scale, sigma } => {
                let bumps: f64 = self
                    .peaks
                    .iter()
                    .map(|&p| {
                        let d = t - f64::from(p);
                        (-(d * d) / (2.0 * sigma * sigma)).exp()
                    })
                    .sum();
                1.0 + (scale - 1.0) * bumps
            }
        };

        wave * peak
    }

    /// Ratio for a period with jitter applied, never below [`MIN_RATIO`]
    pub fn ratio<R: Rng + ?Sized>(&self, period: u32, rng: &mut R) -> f64 {
        let base = self.base_ratio(period);
        let jittered = match &self.jitter {
            Jitter::None => base,
            Jitter::Additive { amount } if *amount > 0.0 => {
                base + rng.random_range(-amount..=*amount)
            }
            Jitter::Proportional { fraction } if *fraction > 0.0 => {
                base * (1.0 + rng.random_range(-fraction..=*fraction))
            }
            _ => base,
        };
        if jittered.is_nan() {
            return MIN_RATIO;
        }
        jittered.max(MIN_RATIO)
    }

    /// Concurrent users for a period, within `1..=MAX_PERIOD_USERS`
    pub fn users_for_period<R: Rng + ?Sized>(&self, period: u32, rng: &mut R) -> u32 {
        let users = (f64::from(self.unit_users) * self.ratio(period, rng)).floor();
        if users >= f64::from(MAX_PERIOD_USERS) {
            warn!(period, requested = users, cap = MAX_PERIOD_USERS, "Period load capped");
            MAX_PERIOD_USERS
        } else {
            (users as u32).max(1)
        }
    }

    /// User count for every period, in order
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        (0..self.num_periods)
            .map(|period| self.users_for_period(period, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> TimeSeriesConfig {
        TimeSeriesConfig {
            unit_time: Duration::from_secs(10),
            total_time: Duration::from_secs(120),
            unit_users: 10,
            amplitude: 0.5,
            peaks: vec![3],
            peak_kernel: PeakKernel::None,
            jitter: Jitter::None,
        }
    }

    #[test]
    fn test_period_count() {
        let shape = LoadShape::new(&config()).unwrap();
        assert_eq!(shape.num_periods(), 12);
        assert_eq!(shape.plan(&mut StdRng::seed_from_u64(0)).len(), 12);
    }

    #[test]
    fn test_non_divisible_durations_rejected() {
        let mut cfg = config();
        cfg.total_time = Duration::from_secs(125);
        assert!(matches!(
            LoadShape::new(&cfg),
            Err(LoadTestError::Configuration(_))
        ));
    }

    #[test]
    fn test_sinusoid_without_peaks() {
        let shape = LoadShape::new(&config()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!((shape.base_ratio(0) - 1.0).abs() < 1e-12);
        // Quarter of the cycle is the crest
        assert!((shape.base_ratio(3) - 1.5).abs() < 1e-12);
        assert_eq!(shape.users_for_period(3, &mut rng), 15);
        assert_eq!(shape.users_for_period(9, &mut rng), 5);
    }

    #[test]
    fn test_multiplicative_peak() {
        let mut cfg = config();
        cfg.amplitude = 0.0;
        cfg.peak_kernel = PeakKernel::Multiplicative { factor: 1.5 };
        let shape = LoadShape::new(&cfg).unwrap();
        assert_eq!(shape.base_ratio(3), 1.5);
        assert_eq!(shape.base_ratio(4), 1.0);
    }

    #[test]
    fn test_gaussian_peak_is_smooth() {
        let mut cfg = config();
        cfg.amplitude = 0.0;
        cfg.peak_kernel = PeakKernel::Gaussian {
            scale: 4.0,
            sigma: 3.0,
        };
        let shape = LoadShape::new(&cfg).unwrap();
        assert!((shape.base_ratio(3) - 4.0).abs() < 1e-12);
        assert!(shape.base_ratio(4) < shape.base_ratio(3));
        assert!(shape.base_ratio(4) > shape.base_ratio(8));
        assert!(shape.base_ratio(11) > 1.0);
    }

    #[test]
    fn test_ratio_and_users_are_floored() {
        let mut cfg = config();
        cfg.unit_users = 3;
        cfg.amplitude = 5.0;
        cfg.jitter = Jitter::Additive { amount: 0.1 };
        let shape = LoadShape::new(&cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(77);

        for period in 0..shape.num_periods() {
            assert!(shape.ratio(period, &mut rng) >= MIN_RATIO);
            assert!(shape.users_for_period(period, &mut rng) >= 1);
        }
    }

    #[test]
    fn test_runaway_peak_is_capped() {
        let mut cfg = config();
        cfg.peak_kernel = PeakKernel::Multiplicative { factor: f64::INFINITY };
        let shape = LoadShape::new(&cfg).unwrap();
        let plan = shape.plan(&mut StdRng::seed_from_u64(1));
        assert_eq!(plan[3], MAX_PERIOD_USERS);
        assert_eq!(plan[0], 10);

        cfg.peak_kernel = PeakKernel::Multiplicative { factor: 1e9 };
        let shape = LoadShape::new(&cfg).unwrap();
        assert_eq!(shape.users_for_period(3, &mut StdRng::seed_from_u64(1)), MAX_PERIOD_USERS);
    }

    #[test]
    fn test_proportional_jitter_bounds() {
        let mut cfg = config();
        cfg.amplitude = 0.0;
        cfg.jitter = Jitter::Proportional { fraction: 0.2 };
        let shape = LoadShape::new(&cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..500 {
            let r = shape.ratio(1, &mut rng);
            assert!((0.8..=1.2).contains(&r));
        }
    }
}
