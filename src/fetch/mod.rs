//! Fetch module for resilient HTTP access
//!
//! This module contains everything the engine needs to get a page body out
//! of an unreliable network, including:
//! - Explicit transport configuration (timeouts, certificate policy)
//! - Reusable header profiles matching what the target sites expect
//! - A proxy pool sampled randomly per request
//! - A bounded retry loop with exponential backoff and jitter
//! - Error classification

mod client;
mod fetcher;
mod proxy;

pub use client::{build_http_client, HeaderProfile, TransportConfig};
pub use fetcher::{FetchError, FetchErrorKind, FetchPolicy, Fetcher, HttpMethod, RequestSpec};
pub use proxy::ProxyPool;
