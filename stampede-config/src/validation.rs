//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

fn domain_error(domain: &str, message: String) -> ConfigError {
    ConfigError::DomainError {
        domain: domain.to_string(),
        message,
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(domain_error(domain, format!("{} cannot be empty", field_name)));
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(domain_error(
            domain,
            format!("{} must be greater than 0, got {}", field_name, value),
        ));
    }
    Ok(())
}

/// Validate a finite, non-negative float
pub fn validate_non_negative(value: f64, field_name: &str, domain: &str) -> ConfigResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(domain_error(
            domain,
            format!("{} must be a finite value >= 0, got {}", field_name, value),
        ));
    }
    Ok(())
}

/// Validate a finite float strictly above zero
pub fn validate_finite_positive(value: f64, field_name: &str, domain: &str) -> ConfigResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(domain_error(
            domain,
            format!("{} must be a finite value > 0, got {}", field_name, value),
        ));
    }
    Ok(())
}

/// Validate a probability-like value in `[0, 1]`
pub fn validate_unit_interval(value: f64, field_name: &str, domain: &str) -> ConfigResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(domain_error(
            domain,
            format!("{} must be within [0, 1], got {}", field_name, value),
        ));
    }
    Ok(())
}

/// Validate a URL
pub fn validate_url(url: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(domain_error(domain, format!("{} cannot be empty", field_name)));
    }

    let parsed = url::Url::parse(url).map_err(|e| {
        domain_error(domain, format!("{} has invalid URL format: {}", field_name, e))
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(domain_error(
            domain,
            format!("{} scheme '{}' not supported (only http/https)", field_name, scheme),
        )),
    }
}

/// Validate an enum choice
pub fn validate_enum_choice<T>(
    value: &str,
    valid_choices: &[T],
    field_name: &str,
    domain: &str,
) -> ConfigResult<()>
where
    T: AsRef<str>,
{
    let valid: Vec<&str> = valid_choices.iter().map(|c| c.as_ref()).collect();

    if !valid.iter().any(|&v| v.eq_ignore_ascii_case(value)) {
        return Err(domain_error(
            domain,
            format!(
                "{} has invalid value '{}'. Valid choices: {}",
                field_name,
                value,
                valid.join(", ")
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(1usize, "n", "test").is_ok());
        assert!(validate_positive(0usize, "n", "test").is_err());
        assert!(validate_positive(-0.5f64, "w", "test").is_err());
    }

    #[test]
    fn test_validate_finite_positive() {
        assert!(validate_finite_positive(1.5, "factor", "test").is_ok());
        assert!(validate_finite_positive(0.0, "factor", "test").is_err());
        assert!(validate_finite_positive(f64::INFINITY, "factor", "test").is_err());
        assert!(validate_finite_positive(f64::NAN, "factor", "test").is_err());
    }

    #[test]
    fn test_validate_unit_interval() {
        assert!(validate_unit_interval(0.0, "p", "test").is_ok());
        assert!(validate_unit_interval(1.0, "p", "test").is_ok());
        assert!(validate_unit_interval(1.01, "p", "test").is_err());
        assert!(validate_unit_interval(f64::NAN, "p", "test").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("http://127.0.0.1:5000", "base_url", "target").is_ok());
        assert!(validate_url("not-a-url", "base_url", "target").is_err());
        assert!(validate_url("ftp://example.com", "base_url", "target").is_err());
    }

    #[test]
    fn test_validate_enum_choice() {
        assert!(validate_enum_choice("get", &["GET", "POST"], "method", "workflows").is_ok());
        let err = validate_enum_choice("PATCHY", &["GET", "POST"], "method", "workflows")
            .unwrap_err()
            .to_string();
        assert!(err.contains("Valid choices: GET, POST"));
    }
}
