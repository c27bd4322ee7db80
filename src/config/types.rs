use crate::markup::MarkupContract;
use crate::storage::DEFAULT_MAX_BATCH_SIZE;
use serde::Deserialize;

/// Main configuration structure for Kakurizer
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub index: IndexConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub markup: MarkupContract,
}

/// Puzzle index configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Index URL that page numbers are appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Hard cap on the number of index pages fetched per scan
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,

    /// Log and skip malformed listings instead of failing the scan
    #[serde(rename = "skip-malformed-listings", default)]
    pub skip_malformed_listings: bool,
}

/// Enrichment worker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Maximum number of puzzles fetched concurrently
    #[serde(
        rename = "max-concurrent-enrichments",
        default = "default_max_concurrent_enrichments"
    )]
    pub max_concurrent_enrichments: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_concurrent_enrichments: default_max_concurrent_enrichments(),
        }
    }
}

fn default_max_concurrent_enrichments() -> usize {
    4
}

/// HTTP client timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Storage tuning
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Records written per insert transaction
    #[serde(rename = "max-batch-size", default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
        }
    }
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}
