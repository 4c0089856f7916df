//! Jittered backoff between retry attempts

use rand::Rng;
use std::time::Duration;

/// Uniformly random wait drawn from `[min_delay, max_delay]` before each retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffCalculator {
    min_delay: Duration,
    max_delay: Duration,
}

impl BackoffCalculator {
    pub fn uniform(min_delay: Duration, max_delay: Duration) -> Self {
        // An inverted window collapses onto its lower bound
        let max_delay = max_delay.max(min_delay);
        Self {
            min_delay,
            max_delay,
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Draw a delay from the thread-local generator.
    ///
    /// The generator is not `Send`, so it is dropped here before any caller
    /// awaits the returned sleep.
    pub fn calculate_delay(&self) -> Duration {
        let mut rng = rand::rng();
        self.calculate_delay_with(&mut rng)
    }

    /// Draw a delay from the given generator
    pub fn calculate_delay_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_delay == self.max_delay {
            self.min_delay
        } else {
            rng.random_range(self.min_delay..=self.max_delay)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_backoff_within_window() {
        let calc = BackoffCalculator::uniform(Duration::from_millis(200), Duration::from_millis(500));
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let delay = calc.calculate_delay_with(&mut rng);
            assert!(delay >= Duration::from_millis(200));
            assert!(delay <= Duration::from_millis(500));
        }
    }

    #[test]
    fn test_uniform_backoff_is_reproducible() {
        let calc = BackoffCalculator::uniform(Duration::from_millis(200), Duration::from_millis(500));
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);

        let first: Vec<_> = (0..4).map(|_| calc.calculate_delay_with(&mut a)).collect();
        let second: Vec<_> = (0..4).map(|_| calc.calculate_delay_with(&mut b)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_window() {
        let calc = BackoffCalculator::uniform(Duration::from_millis(300), Duration::from_millis(300));
        assert_eq!(calc.calculate_delay(), Duration::from_millis(300));

        let inverted =
            BackoffCalculator::uniform(Duration::from_millis(300), Duration::from_millis(100));
        assert_eq!(inverted.max_delay(), Duration::from_millis(300));
        assert_eq!(inverted.calculate_delay(), Duration::from_millis(300));
    }
}
