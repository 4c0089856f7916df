use stampede_config::{LogFormat, LogLevel, LoggingConfig};
use stampede_logging::{init_logging_from_config, init_simple_tracing};

#[test]
fn test_logging_config_integration() {
    let yaml_config = r#"
level: debug
format: json
include_location: true
filter: "hyper=warn"
"#;

    let config: LoggingConfig = serde_yaml::from_str(yaml_config).unwrap();

    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.filter_directives(), "debug,hyper=warn");

    // First installation wins; later ones are no-ops rather than errors
    init_logging_from_config(&config).unwrap();
    init_logging_from_config(&LoggingConfig::default()).unwrap();
    init_simple_tracing("trace");

    tracing::info!(user_id = 1, "subscriber accepts structured events");
}

#[test]
fn test_every_format_initializes() {
    for format in [
        LogFormat::Text,
        LogFormat::Compact,
        LogFormat::Pretty,
        LogFormat::Json,
    ] {
        let config = LoggingConfig {
            format,
            ..LoggingConfig::default()
        };
        assert!(init_logging_from_config(&config).is_ok());
    }
}
