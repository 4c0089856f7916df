//! Retry policy and executor

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::backoff::BackoffCalculator;
use stampede_config::RetryConfig;

/// Bounded retry policy: how many attempts, and how long to wait between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Lower edge of the backoff window
    #[serde(with = "humantime_serde")]
    pub min_delay: Duration,

    /// Upper edge of the backoff window
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_millis(200),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            min_delay: config.backoff.min,
            max_delay: config.backoff.max,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, never retried
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// `max_retries` extra attempts with a uniform jittered wait in `[min, max]`
    pub fn jittered(max_retries: u32, min: Duration, max: Duration) -> Self {
        Self {
            max_attempts: max_retries.saturating_add(1),
            min_delay: min,
            max_delay: max,
        }
    }

    pub fn calculator(&self) -> BackoffCalculator {
        BackoffCalculator::uniform(self.min_delay, self.max_delay)
    }
}

/// Trait for errors that can be retried
pub trait Retryable {
    /// Whether this error is retryable
    fn is_retryable(&self) -> bool;
}

/// Retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    calculator: BackoffCalculator,
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        let calculator = policy.calculator();
        Self { policy, calculator }
    }

    /// Run `f` until it succeeds, fails with a non-retryable error, or runs
    /// out of attempts. `f` receives the 1-indexed attempt number.
    pub async fn execute<F, Fut, T, E>(&self, mut f: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match f(attempt).await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!("Operation succeeded after {} attempts", attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !error.is_retryable() {
                        debug!("Operation failed with non-retryable error: {}", error);
                        return Err(RetryError::NonRetryableError {
                            attempts: attempt,
                            error,
                        });
                    }

                    if attempt >= max_attempts {
                        warn!("Operation failed after {} attempts: {}", attempt, error);
                        return Err(RetryError::MaxAttemptsExceeded {
                            attempts: attempt,
                            last_error: error,
                        });
                    }

                    let delay = self.calculator.calculate_delay();

                    debug!(
                        "Attempt {} of {} failed: {}. Retrying in {:?}",
                        attempt, max_attempts, error, delay
                    );
                    sleep(delay).await;

                    attempt += 1;
                }
            }
        }
    }
}

/// Retry error types
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts ({attempts}) exceeded. Last error: {last_error}")]
    MaxAttemptsExceeded { attempts: u32, last_error: E },

    /// Non-retryable error encountered
    #[error("Non-retryable error after {attempts} attempt(s): {error}")]
    NonRetryableError { attempts: u32, error: E },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::MaxAttemptsExceeded { attempts, .. } => *attempts,
            RetryError::NonRetryableError { attempts, .. } => *attempts,
        }
    }

    /// Get the underlying error
    pub fn into_inner(self) -> E {
        match self {
            RetryError::MaxAttemptsExceeded { last_error, .. } => last_error,
            RetryError::NonRetryableError { error, .. } => error,
        }
    }
}
