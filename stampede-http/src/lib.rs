//! HTTP transport for stampede
//!
//! Provides the [`RequestClient`] seam simulated users call through, and a
//! reqwest implementation with a shared connection pool and bounded,
//! jittered retry of transport failures.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-export main types for convenience
pub use client::{HttpRequestClient, RequestClient};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::{HttpMethod, HttpMethodError, RequestOutcome};
