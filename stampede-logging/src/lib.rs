//! Logging setup for stampede
//!
//! Installs a global `tracing` subscriber from the `logging` configuration
//! domain. Everything else in the workspace logs through `tracing` macros.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing, LoggingError};
