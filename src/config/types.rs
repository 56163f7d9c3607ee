use serde::Deserialize;

/// Main configuration structure for Rasid
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    pub classifier: ClassifierConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "search-term")]
    pub search_terms: Vec<SearchTerm>,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum retry attempts per request beyond the first try
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay for exponential backoff (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound on a single backoff delay (seconds)
    #[serde(rename = "backoff-cap-secs", default = "default_backoff_cap_secs")]
    pub backoff_cap_secs: u64,

    /// Rolling retention horizon: articles older than this many days are
    /// terminal signals
    #[serde(rename = "retention-days", default = "default_retention_days")]
    pub retention_days: i64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
    20
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_cap_secs() -> u64 {
    30
}

fn default_retention_days() -> i64 {
    140
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Proxy pool configuration
///
/// Proxies may be listed inline, loaded from a file (one URI per line), or
/// both. An empty pool means all requests go out directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub list: Vec<String>,

    #[serde(rename = "list-file")]
    pub list_file: Option<String>,
}

/// External relevance classifier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Chat-completions style HTTP endpoint
    pub endpoint: String,

    /// Model identifier sent with each request
    pub model: String,

    /// Name of the environment variable holding the API key, if any
    #[serde(rename = "api-key-env")]
    pub api_key_env: Option<String>,

    #[serde(rename = "timeout-secs", default = "default_classifier_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry attempts for throttled classifier calls
    #[serde(rename = "max-attempts", default = "default_classifier_attempts")]
    pub max_attempts: u32,
}

fn default_classifier_timeout_secs() -> u64 {
    60
}

fn default_classifier_attempts() -> u32 {
    4
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory holding one exception-cache JSON file per source
    #[serde(rename = "exception-cache-dir")]
    pub exception_cache_dir: String,
}

/// One search keyword in both article languages
#[derive(Debug, Clone, Deserialize)]
pub struct SearchTerm {
    pub arabic: String,
    pub english: String,
}

/// One crawled source with its speaker set
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    /// Adapter id (e.g. "bna", "spa", "kingabdullah")
    pub id: String,

    /// Speakers watched on this source, in fixed order
    pub speakers: Vec<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Disable TLS certificate verification for this source only.
    /// Some government sites serve broken certificate chains.
    #[serde(rename = "danger-accept-invalid-certs", default)]
    pub danger_accept_invalid_certs: bool,
}

fn default_enabled() -> bool {
    true
}
