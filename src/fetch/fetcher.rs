//! Resilient request execution
//!
//! This module implements the bounded retry loop every network access in
//! the engine goes through:
//! - Request descriptions abstracted as [`RequestSpec`]
//! - A fresh proxy sampled for every attempt (no sticky sessions)
//! - Exponential backoff with jitter between attempts
//! - Failure classification into [`FetchErrorKind`]
//! - An optional proxied-to-direct fallback policy for sources whose
//!   anti-bot defenses block proxy exits
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Connect/transport error | Retry with a new proxy |
//! | Timeout | Retry with a new proxy |
//! | Proxy configuration error | Retry with a new proxy |
//! | Non-2xx status | Retry with a new proxy |
//! | Malformed body | Retry with a new proxy |
//! | Attempt ceiling exceeded | `FetchError::ExhaustedRetries` |
//!
//! Exhaustion is terminal for the one URL only; the caller logs it and
//! moves on. Nothing above the fetcher ever retries.

use crate::fetch::client::{build_http_client, HeaderProfile, TransportConfig};
use crate::fetch::proxy::ProxyPool;
use crate::CancelFlag;
use rand::Rng;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// HTTP method for a request spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Description of one HTTP request, independent of any client
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
    pub headers: HeaderProfile,
    pub cookies: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query: Vec::new(),
            form: Vec::new(),
            json: None,
            headers: HeaderProfile::Browser,
            cookies: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_form(mut self, key: &str, value: impl ToString) -> Self {
        self.form.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn with_headers(mut self, profile: HeaderProfile) -> Self {
        self.headers = profile;
        self
    }

    pub fn with_cookie(mut self, name: &str, value: impl ToString) -> Self {
        self.cookies.push((name.to_string(), value.to_string()));
        self
    }
}

/// Classification of a single failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connection-level failure (refused, DNS, TLS, transport)
    Connect,

    /// The request timed out
    Timeout,

    /// The proxy URI was rejected by the client builder
    Proxy,

    /// Non-2xx HTTP status
    Status(u16),

    /// The response body could not be read or decoded
    Body,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connection error"),
            Self::Timeout => write!(f, "timeout"),
            Self::Proxy => write!(f, "proxy error"),
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Body => write!(f, "malformed body"),
        }
    }
}

/// Errors surfaced by the fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("retries exhausted after {attempts} attempts for {url} (last: {last})")]
    ExhaustedRetries {
        url: String,
        attempts: u32,
        last: FetchErrorKind,
    },

    #[error("fetch cancelled for {url}")]
    Cancelled { url: String },
}

/// Per-adapter fetch strategy
///
/// Some sources block proxy exit nodes outright; for those the fetcher
/// falls back to a direct connection once part of the retry budget is
/// consumed. The trigger point is a tunable policy, not a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Every attempt goes through a sampled proxy (when the pool has any)
    ProxiedOnly,

    /// Attempts at or past the given index go out directly
    DirectAfter(u32),
}

impl FetchPolicy {
    /// Whether the attempt at `attempt` (0-based) should use a proxy
    pub fn proxied(&self, attempt: u32) -> bool {
        match self {
            Self::ProxiedOnly => true,
            Self::DirectAfter(threshold) => attempt < *threshold,
        }
    }
}

/// Executes request specs with bounded retries
pub struct Fetcher {
    transport: TransportConfig,
    proxies: ProxyPool,
    max_attempts: u32,
    backoff_base: Duration,
    backoff_cap: Duration,
    cancel: CancelFlag,
}

impl Fetcher {
    pub fn new(
        transport: TransportConfig,
        proxies: ProxyPool,
        max_attempts: u32,
        backoff_base: Duration,
        backoff_cap: Duration,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            transport,
            proxies,
            max_attempts,
            backoff_base,
            backoff_cap,
            cancel,
        }
    }

    /// Fetches a request spec, retrying up to the attempt ceiling
    ///
    /// Performs `max_attempts + 1` tries in total (the first try plus
    /// `max_attempts` retries). Each retry waits
    /// `min(cap, base * 2^attempt) + jitter` and samples a fresh proxy.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The response body
    /// * `Err(FetchError)` - The ceiling was exceeded, or the crawl was
    ///   cancelled between attempts
    pub async fn fetch(&self, spec: &RequestSpec, policy: FetchPolicy) -> Result<String, FetchError> {
        let mut last = FetchErrorKind::Connect;

        for attempt in 0..=self.max_attempts {
            if self.cancel.is_cancelled() {
                return Err(FetchError::Cancelled {
                    url: spec.url.clone(),
                });
            }

            if attempt > 0 {
                tokio::time::sleep(self.backoff_delay(attempt)).await;
            }

            let proxy = if policy.proxied(attempt) {
                self.proxies.sample()
            } else {
                None
            };

            match self.attempt(spec, proxy).await {
                Ok(body) => return Ok(body),
                Err(kind) => {
                    tracing::debug!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt + 1,
                        self.max_attempts + 1,
                        spec.url,
                        kind
                    );
                    last = kind;
                }
            }
        }

        Err(FetchError::ExhaustedRetries {
            url: spec.url.clone(),
            attempts: self.max_attempts + 1,
            last,
        })
    }

    /// Performs one attempt with the given proxy
    ///
    /// The client (and with it any pooled connection) is dropped on every
    /// exit path.
    async fn attempt(
        &self,
        spec: &RequestSpec,
        proxy: Option<&str>,
    ) -> Result<String, FetchErrorKind> {
        let client =
            build_http_client(&self.transport, proxy).map_err(|_| FetchErrorKind::Proxy)?;

        let mut builder = match spec.method {
            HttpMethod::Get => client.get(&spec.url),
            HttpMethod::Post => client.post(&spec.url),
        };

        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }

        builder = spec.headers.apply(builder);

        if !spec.cookies.is_empty() {
            let cookie_line = spec
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header("cookie", cookie_line);
        }

        if let Some(body) = &spec.json {
            builder = builder.json(body);
        } else if !spec.form.is_empty() {
            builder = builder.form(&spec.form);
        }

        let response = builder.send().await.map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchErrorKind::Status(status.as_u16()));
        }

        response.text().await.map_err(|_| FetchErrorKind::Body)
    }

    /// Computes the delay before the given (1-based) retry attempt
    ///
    /// `min(cap, base * 2^attempt)` plus uniform jitter in `[0, base]`.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let shift = attempt.min(16);
        let exponential = self
            .backoff_base
            .saturating_mul(1u32.checked_shl(shift).unwrap_or(u32::MAX));
        let capped = exponential.min(self.backoff_cap);
        let jitter_ms = rand::thread_rng().gen_range(0..=self.backoff_base.as_millis() as u64);
        capped + Duration::from_millis(jitter_ms)
    }
}

/// Maps a reqwest send error onto the fetch taxonomy
fn classify_send_error(error: reqwest::Error) -> FetchErrorKind {
    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_connect() {
        FetchErrorKind::Connect
    } else if error.is_body() || error.is_decode() {
        FetchErrorKind::Body
    } else {
        FetchErrorKind::Connect
    }
}
