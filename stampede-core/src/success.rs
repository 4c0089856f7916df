//! Load-dependent success probability
//!
//! Each [`DecayStrategy`] is evaluated exactly as configured. Noise, when
//! enabled, is applied on top and the result re-clamped to `[0, 1]`. All
//! randomness comes from the caller's generator.

use rand::Rng;
use stampede_config::{DecayStrategy, SuccessConfig, SuccessThresholds};

#[derive(Debug, Clone, PartialEq)]
pub struct SuccessModel {
    strategy: DecayStrategy,
    noise_fraction: f64,
    fatigue_per_period: f64,
}

impl SuccessModel {
    pub fn new(config: &SuccessConfig) -> Self {
        Self {
            strategy: config.model.clone(),
            noise_fraction: config.noise_fraction,
            fatigue_per_period: config.fatigue_per_period,
        }
    }

    pub fn from_strategy(strategy: DecayStrategy) -> Self {
        Self {
            strategy,
            noise_fraction: 0.0,
            fatigue_per_period: 0.0,
        }
    }

    /// Never fails; simulated failures disabled
    pub fn always() -> Self {
        Self::from_strategy(DecayStrategy::Constant { rate: 1.0 })
    }

    pub fn with_noise(mut self, noise_fraction: f64) -> Self {
        self.noise_fraction = noise_fraction;
        self
    }

    pub fn with_fatigue(mut self, fatigue_per_period: f64) -> Self {
        self.fatigue_per_period = fatigue_per_period;
        self
    }

    pub fn strategy(&self) -> &DecayStrategy {
        &self.strategy
    }

    /// Noise-free probability for `load`, including period fatigue when a period is given
    pub fn expected_probability(&self, load: u32, period: Option<u32>) -> f64 {
        let mut p = strategy_probability(&self.strategy, load);
        if let Some(period) = period {
            if self.fatigue_per_period > 0.0 {
                p *= (1.0 - self.fatigue_per_period * f64::from(period)).max(0.0);
            }
        }
        clamp_unit(p)
    }

    /// Probability with bounded symmetric noise, always within `[0, 1]`
    pub fn probability<R: Rng + ?Sized>(&self, load: u32, period: Option<u32>, rng: &mut R) -> f64 {
        let p = self.expected_probability(load, period);
        if self.noise_fraction <= 0.0 {
            return p;
        }
        let u = rng.random_range(-self.noise_fraction..=self.noise_fraction);
        clamp_unit(p + p * u)
    }

    /// One uniform draw compared against the probability
    pub fn coinflip<R: Rng + ?Sized>(&self, load: u32, period: Option<u32>, rng: &mut R) -> bool {
        let p = self.probability(load, period, rng);
        rng.random::<f64>() < p
    }
}

fn clamp_unit(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

fn strategy_probability(strategy: &DecayStrategy, load: u32) -> f64 {
    let load_f = f64::from(load);
    match strategy {
        DecayStrategy::Threshold(t) => threshold(t, load),

        DecayStrategy::Linear {
            base_rate,
            min_rate,
            decay_coefficient,
        } => (base_rate - decay_coefficient * load_f).max(*min_rate),

        DecayStrategy::ExponentialStep {
            safe,
            cutoff,
            decay_rate,
            floor,
        } => {
            if load <= *safe {
                1.0
            } else if load <= *cutoff {
                decay_rate.powi(i32::try_from(load - safe).unwrap_or(i32::MAX))
            } else {
                *floor
            }
        }

        DecayStrategy::BenchmarkLinear {
            low_benchmark,
            high_benchmark,
            high_rate,
            low_rate,
        } => {
            if load <= *low_benchmark {
                *high_rate
            } else if load <= *high_benchmark {
                let span = f64::from(high_benchmark - low_benchmark);
                let progress = (load_f - f64::from(*low_benchmark)) / span;
                (high_rate * (1.0 - progress)).max(*low_rate)
            } else {
                *low_rate
            }
        }

        DecayStrategy::Constant { rate } => *rate,
    }
}

fn threshold(t: &SuccessThresholds, load: u32) -> f64 {
    let start = t.decay_start();
    if load <= t.safe {
        return t.base_rate;
    }
    if load >= t.decay_end {
        return t.min_rate;
    }
    let span = f64::from(t.decay_end.saturating_sub(start)).max(1.0);
    let progress = ((f64::from(load) - f64::from(start)) / span).clamp(0.0, 1.0);
    t.base_rate - (t.base_rate - t.min_rate) * progress
}
