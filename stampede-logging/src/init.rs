use stampede_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directives}': {message}")]
    InvalidFilter { directives: String, message: String },
}

/// Parse filter directives, e.g. `info` or `debug,reqwest=warn`
pub fn build_env_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directives).map_err(|e| LoggingError::InvalidFilter {
        directives: directives.to_string(),
        message: e.to_string(),
    })
}

/// Initialize logging from configuration
///
/// Logs go to stderr so stdout stays free for run summaries.
pub fn init_logging_from_config(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env_filter = build_env_filter(&config.filter_directives())?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    // Use try_init to avoid panic if global subscriber already set
    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if result.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// Initialize simple tracing for basic console output
///
/// Falls back to `RUST_LOG`, then to `info`, when `log_level` does not parse.
pub fn init_simple_tracing(log_level: &str) {
    let env_filter = build_env_filter(log_level)
        .ok()
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }
}
