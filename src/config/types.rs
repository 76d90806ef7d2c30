use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for Design-Lens
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub detectors: DetectorConfig,
}

/// What to crawl. Immutable once the crawl starts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlConfig {
    /// The page the traversal starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Maximum number of pages to fetch (1-20)
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Discard frontier URLs whose origin differs from the seed's
    #[serde(rename = "same-origin-only", default = "default_true")]
    pub same_origin_only: bool,

    /// Fetch the external stylesheets referenced by crawled pages
    #[serde(rename = "include-stylesheets", default = "default_true")]
    pub include_stylesheets: bool,

    /// Free-text notes carried through to the extraction result
    #[serde(default)]
    pub notes: String,
}

impl CrawlConfig {
    /// Creates a crawl configuration for `seed_url` with default limits
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_pages: default_max_pages(),
            same_origin_only: true,
            include_stylesheets: true,
            notes: String::new(),
        }
    }
}

/// Network behaviour of the fetch gateway and crawl loop
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for page and stylesheet requests (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for the robots.txt request (seconds)
    #[serde(rename = "robots-timeout-secs", default = "default_robots_timeout_secs")]
    pub robots_timeout_secs: u64,

    /// Maximum number of attempts per request, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the first retry; doubles for each further retry (milliseconds)
    #[serde(rename = "initial-backoff-ms", default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Pause after every page fetch (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Pause between stylesheet fetches (milliseconds)
    #[serde(rename = "stylesheet-delay-ms", default = "default_stylesheet_delay_ms")]
    pub stylesheet_delay_ms: u64,
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn stylesheet_delay(&self) -> Duration {
        Duration::from_millis(self.stylesheet_delay_ms)
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            robots_timeout_secs: default_robots_timeout_secs(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            page_delay_ms: default_page_delay_ms(),
            stylesheet_delay_ms: default_stylesheet_delay_ms(),
        }
    }
}

/// Optional replacement for the built-in detector tables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectorConfig {
    /// Path to a TOML detector table
    pub table: Option<String>,
}

fn default_max_pages() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    format!(
        "DesignLens/{} (+static design-system analysis; no JavaScript)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_robots_timeout_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_page_delay_ms() -> u64 {
    500
}

fn default_stylesheet_delay_ms() -> u64 {
    300
}
