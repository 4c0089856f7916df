//! Domain-driven configuration management for stampede
//!
//! Configuration is split by functional domain, each validated on its own,
//! and can be overridden from `STAMPEDE_*` environment variables. The engine
//! consumes the validated values; nothing here performs network I/O.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    actions::{ActionMix, ActionWeight},
    cohort::{CohortConfig, RunMode},
    logging::{LogFormat, LogLevel, LoggingConfig},
    retry::RetryConfig,
    success::{DecayStrategy, SuccessConfig, SuccessThresholds},
    sweep::SweepConfig,
    target::TargetConfig,
    time_series::{Jitter, PeakKernel, TimeSeriesConfig},
    utils::DurationRange,
    workflow::{PayloadKind, StepConfig, WorkflowsConfig},
    LoadTestConfig,
};
