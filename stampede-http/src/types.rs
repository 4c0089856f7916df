//! HTTP types and enums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// HTTP methods a workflow step may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Get the string representation of the HTTP method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = HttpMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(HttpMethodError::InvalidMethod(s.to_string())),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Errors that can occur when parsing HTTP methods
#[derive(Error, Debug, Clone)]
pub enum HttpMethodError {
    #[error("Invalid HTTP method: '{0}'. Supported methods are: GET, POST, PUT, PATCH, DELETE")]
    InvalidMethod(String),
}

/// Result of one logical request, after any retries.
///
/// Exactly one of `status_code` and `error` is set. A transport failure that
/// survived every retry has `error` set and no status; any received status,
/// including 5xx, has `status_code` set and no error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOutcome {
    pub status_code: Option<u16>,
    pub error: Option<String>,
    /// Wall-clock time from the first attempt to the final result, backoff included
    pub latency: Duration,
    pub attempts: u32,
    /// Response body, when it parsed as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl RequestOutcome {
    pub fn completed(
        status_code: u16,
        latency: Duration,
        attempts: u32,
        body: Option<serde_json::Value>,
    ) -> Self {
        Self {
            status_code: Some(status_code),
            error: None,
            latency,
            attempts,
            body,
        }
    }

    pub fn failed(error: impl Into<String>, latency: Duration, attempts: u32) -> Self {
        Self {
            status_code: None,
            error: Some(error.into()),
            latency,
            attempts,
            body: None,
        }
    }

    /// Transport succeeded and the target answered 200
    pub fn is_ok(&self) -> bool {
        self.status_code == Some(200)
    }

    /// No response was received at all
    pub fn is_transport_failure(&self) -> bool {
        self.status_code.is_none()
    }
}
