//! Story-Archiver: a news front-page archiver
//!
//! This crate fetches a news aggregator's front page, extracts the story
//! entries, and archives each unique story's linked page together with the
//! outbound links cited in its discussion thread.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Story-Archiver operations
#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::EntryState,
        to: state::EntryState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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
}

/// Network and HTTP errors raised while retrieving a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body from {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    /// The URL the failed request was addressed to, when known
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Request { url, .. } | Self::Status { url, .. } | Self::Body { url, .. } => {
                Some(url)
            }
            Self::Client(_) => None,
        }
    }
}

/// Errors raised when markup does not have the expected shape
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Missing expected element: {what}")]
    MissingElement { what: String },
}

pub use storage::StorageError;

/// Result type alias for Story-Archiver operations
pub type Result<T> = std::result::Result<T, ArchiverError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for markup extraction
pub type ParseResult<T> = std::result::Result<T, ParseError>;

// Re-export commonly used types
pub use config::Config;
pub use output::CrawlReport;
pub use state::{ClaimSet, Entry, EntryState, Fingerprint};
pub use storage::{ContentStore, FsContentStore};
