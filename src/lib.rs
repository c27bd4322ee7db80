//! Kakurizer: incremental discovery and enrichment of published Kakuro puzzles
//!
//! This crate walks a paginated puzzle index newest-first, stops as soon as it
//! reaches puzzles the store already knows, persists the new ones, and later
//! enriches each stored puzzle with its image and the image's header metadata.

pub mod config;
pub mod crawler;
pub mod enrich;
pub mod markup;
pub mod output;
pub mod record;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Kakurizer operations
#[derive(Debug, Error)]
pub enum KakurizerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Listing parse error on index page {page}: {source}")]
    Listing {
        page: u32,
        source: crawler::ParseError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Network or transport failure while fetching a page or an image
///
/// Non-success HTTP statuses are failures too. None of these are retried.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Transport { url, .. }
            | Self::InvalidUrl { url, .. } => url,
        }
    }
}

/// Result type alias for Kakurizer operations
pub type Result<T> = std::result::Result<T, KakurizerError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{CandidateRecord, Difficulty, EnrichedRecord, ImageFields};
