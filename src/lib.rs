//! Design-Lens: infers a site's front-end design system from static markup
//!
//! This crate crawls a handful of pages reachable from a seed URL, politely
//! and sequentially, then runs a set of pattern-based detectors over the
//! collected HTML and CSS text to recover the technology stack, design
//! tokens, component class families, accessibility signals and layout
//! metadata. Every extracted fact carries a provenance record and a
//! confidence score.

pub mod config;
pub mod crawler;
pub mod extraction;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for Design-Lens operations
#[derive(Debug, Error)]
pub enum LensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

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

    #[error("Invalid detector pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors surfaced by the HTTP fetch gateway
///
/// A non-2xx response that is not worth retrying is not an error here: it is
/// returned to the caller, which decides how to record it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed after {attempts} attempt(s): {reason}")]
    Transient {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

impl FetchError {
    /// Returns true if the failure was retried before being surfaced
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Result type alias for Design-Lens operations
pub type Result<T> = std::result::Result<T, LensError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlConfig, FetchSettings};
pub use crawler::{crawl, CrawlSession, CrawledPage, Crawler};
pub use extraction::{extract, extract_with, DetectorTables, ExtractionResult};
pub use self::url::{normalize_url, same_origin};
