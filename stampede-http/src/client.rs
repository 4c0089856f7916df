//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{HttpMethod, RequestOutcome};
use reqwest::Client;
use serde_json::Value as JsonValue;
use stampede_config::{RetryConfig, TargetConfig};
use stampede_resilience::{RetryExecutor, RetryPolicy};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

/// Executes one logical request against the target service.
///
/// Implementations never fail: transport problems are reported inside the
/// returned [`RequestOutcome`]. They must be callable concurrently from many
/// simulated users.
#[async_trait::async_trait]
pub trait RequestClient: Send + Sync {
    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&JsonValue>,
    ) -> RequestOutcome;
}

#[async_trait::async_trait]
impl<T: RequestClient + ?Sized> RequestClient for std::sync::Arc<T> {
    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&JsonValue>,
    ) -> RequestOutcome {
        (**self).execute(method, path, payload).await
    }
}

/// reqwest-backed [`RequestClient`] with a shared connection pool and bounded retry
#[derive(Debug, Clone)]
pub struct HttpRequestClient {
    client: Client,
    base_url: String,
    retry: RetryExecutor,
}

impl HttpRequestClient {
    /// Build the pooled client; fails only on an unusable base URL or TLS setup
    pub fn new(config: HttpConfig, policy: RetryPolicy) -> Result<Self, HttpError> {
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl(config.base_url));
        }

        debug!(
            "Creating HTTP client for {} with {}s timeout, {} attempt(s) per request",
            config.base_url,
            config.timeout.as_secs(),
            policy.max_attempts
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryExecutor::new(policy),
        })
    }

    /// Build from the `target` and `retry` configuration domains
    pub fn from_config(target: &TargetConfig, retry: &RetryConfig) -> Result<Self, HttpError> {
        Self::new(HttpConfig::from(target), RetryPolicy::from(retry))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// One attempt. Any status counts as a response; only transport failures are errors.
async fn send_once(
    client: &Client,
    method: HttpMethod,
    url: &str,
    payload: Option<&JsonValue>,
) -> Result<(u16, Option<JsonValue>), HttpError> {
    let mut request = client.request(reqwest::Method::from(method), url);
    if let Some(body) = payload {
        request = request.json(body);
    }

    let response = request.send().await?;
    let status = response.status().as_u16();

    // The status is already known, so a broken body is not worth a retry
    let body = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<JsonValue>(&bytes).ok(),
        Err(e) => {
            debug!("Failed to read response body from {}: {}", url, e);
            None
        }
    };

    Ok((status, body))
}

#[async_trait::async_trait]
impl RequestClient for HttpRequestClient {
    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&JsonValue>,
    ) -> RequestOutcome {
        let url = self.url_for(path);
        let attempts = AtomicU32::new(0);
        let started = Instant::now();

        let result = {
            let client = &self.client;
            let url = url.as_str();
            let attempts = &attempts;
            self.retry
                .execute(move |attempt| {
                    attempts.store(attempt, Ordering::Relaxed);
                    send_once(client, method, url, payload)
                })
                .await
        };

        let latency = started.elapsed();
        let attempts = attempts.load(Ordering::Relaxed);

        match result {
            Ok((status, body)) => {
                debug!(%method, url = %url, status, attempts, ?latency, "Request completed");
                RequestOutcome::completed(status, latency, attempts, body)
            }
            Err(retry_error) => {
                let error = retry_error.into_inner();
                warn!(%method, url = %url, attempts, "Request failed: {}", error);
                RequestOutcome::failed(error.to_string(), latency, attempts)
            }
        }
    }
}
