//! Resilience patterns for stampede
//!
//! Bounded retry policies and the jittered backoff that paces them.

pub mod backoff;
pub mod retry;

// Re-export commonly used types
pub use backoff::BackoffCalculator;
pub use retry::{RetryError, RetryExecutor, RetryPolicy, Retryable};
