//! HTTP fetch gateway
//!
//! This module is the only place that touches the network. It handles:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Following redirects and recording the final URL
//! - Retrying transient failures with exponential backoff
//! - Error classification

use crate::config::FetchSettings;
use crate::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A response returned by the gateway
///
/// Any status the gateway does not retry is returned as-is, including 4xx
/// codes; the caller decides whether it counts as a failure.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Response headers, lower-cased names
    pub headers: BTreeMap<String, String>,

    /// Response body
    pub body: String,
}

impl FetchResponse {
    /// Returns true for 2xx responses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retry schedule for transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub max_attempts: u32,

    /// Delay after the first failed attempt
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    /// Delay slept after failed attempt `attempt` (0-indexed): `initial * 2^attempt`
    ///
    /// No cap and no jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Returns true for statuses worth retrying (429 and 5xx)
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Returns true for failures of the network call itself
fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
}

fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `settings` - The fetch settings (user agent, timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(settings: &FetchSettings) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,text/css;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .default_headers(headers)
        .timeout(settings.timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sequential GET gateway with retry and backoff
pub struct HttpGateway {
    client: Client,
    policy: RetryPolicy,
    timeout: Duration,
    requests: AtomicU64,
}

impl HttpGateway {
    /// Creates a gateway from the fetch settings
    pub fn new(settings: &FetchSettings) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(settings)?,
            RetryPolicy::new(settings.max_attempts, settings.initial_backoff()),
            settings.timeout(),
        ))
    }

    /// Creates a gateway around an existing client
    pub fn with_client(client: Client, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            client,
            policy,
            timeout,
            requests: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Number of GET requests issued so far, retries included
    pub fn requests_issued(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx, 3xx, 4xx (except 429) | Return the response |
    /// | HTTP 429 | Retry |
    /// | HTTP 5xx | Retry |
    /// | Timeout / connection failure | Retry |
    /// | Redirect loop, builder error | Fail immediately |
    ///
    /// After failed attempt `k` the gateway sleeps `initial * 2^k` before the
    /// next one. Once `max_attempts` calls have been made the last failure is
    /// surfaced as [`FetchError::Transient`].
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let mut last_reason = String::new();

        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                let delay = self.policy.backoff_delay(attempt - 1);
                tracing::warn!(
                    "Retrying {} in {:?} (attempt {}/{}): {}",
                    url,
                    delay,
                    attempt + 1,
                    self.policy.max_attempts,
                    last_reason
                );
                tokio::time::sleep(delay).await;
            }

            match self.send(url, self.timeout).await {
                Ok(response) => return Ok(response),
                Err(Attempt::Retryable(reason)) => last_reason = reason,
                Err(Attempt::Fatal(reason)) => {
                    return Err(FetchError::Request {
                        url: url.to_string(),
                        reason,
                    })
                }
            }
        }

        Err(FetchError::Transient {
            url: url.to_string(),
            attempts: self.policy.max_attempts,
            reason: last_reason,
        })
    }

    /// Issues a single GET with a custom timeout and no retries
    ///
    /// A 429 or 5xx status is reported as an error, like a network failure.
    pub async fn fetch_once(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError> {
        self.send(url, timeout).await.map_err(|attempt| {
            let (Attempt::Retryable(reason) | Attempt::Fatal(reason)) = attempt;
            FetchError::Request {
                url: url.to_string(),
                reason,
            }
        })
    }

    async fn send(&self, url: &str, timeout: Duration) -> Result<FetchResponse, Attempt> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if is_retryable_status(status) {
            return Err(Attempt::Retryable(format!("HTTP {}", status.as_u16())));
        }

        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let body = response.text().await.map_err(classify)?;

        Ok(FetchResponse {
            final_url,
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

/// Outcome of one failed attempt
enum Attempt {
    Retryable(String),
    Fatal(String),
}

fn classify(error: reqwest::Error) -> Attempt {
    if is_retryable_error(&error) {
        Attempt::Retryable(describe_error(&error))
    } else {
        Attempt::Fatal(describe_error(&error))
    }
}
