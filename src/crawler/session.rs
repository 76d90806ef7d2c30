//! Crawl records handed from the crawl phase to the extraction phase

use crate::config::CrawlConfig;
use crate::robots::RobotsAdvisory;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

/// One fetched (or attempted) page
///
/// Owned by the session that created it and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct CrawledPage {
    /// The URL requested (normalized)
    pub url: String,

    /// The URL after redirects
    pub final_url: String,

    /// HTTP status, if a response was received
    pub status: Option<u16>,

    /// Full HTML text
    #[serde(skip)]
    pub html: String,

    /// Response headers, lower-cased names
    pub headers: BTreeMap<String, String>,

    /// Stylesheet URLs referenced by the page
    pub stylesheets: Vec<String>,

    /// Script URLs referenced by the page
    pub scripts: Vec<String>,

    /// Same-origin links discovered on the page
    pub internal_links: Vec<String>,

    pub crawled_at: DateTime<Utc>,

    /// Why the page could not be used, if it failed
    pub error: Option<String>,
}

impl CrawledPage {
    /// Creates a record for a page that could not be fetched or used
    pub fn failed(url: &str, final_url: &str, status: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            final_url: final_url.to_string(),
            status,
            html: String::new(),
            headers: BTreeMap::new(),
            stylesheets: Vec::new(),
            scripts: Vec::new(),
            internal_links: Vec::new(),
            crawled_at: Utc::now(),
            error: Some(error.into()),
        }
    }

    /// Returns true if the page was fetched with a 2xx status
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything the crawl phase produced
///
/// Extraction reads this value only; it never touches the network.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSession {
    pub seed_url: String,

    /// The configuration the crawl ran with
    pub config: CrawlConfig,

    /// Pages in fetch order
    pub pages: Vec<CrawledPage>,

    /// Stylesheet URL to fetched text
    #[serde(rename = "stylesheet_urls", serialize_with = "serialize_keys")]
    pub stylesheets: BTreeMap<String, String>,

    pub robots: RobotsAdvisory,

    /// Advisory notes gathered while crawling
    pub warnings: Vec<String>,

    /// GET requests issued, retries, robots.txt and stylesheets included
    pub total_requests: u64,

    /// Pages recorded with an error
    pub failed_requests: u64,

    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlSession {
    /// Pages fetched with a 2xx status, in fetch order
    pub fn successful_pages(&self) -> impl Iterator<Item = &CrawledPage> {
        self.pages.iter().filter(|page| page.is_success())
    }

    /// Returns true if `url` is a page or stylesheet URL recorded in this session
    pub fn contains_url(&self, url: &str) -> bool {
        self.stylesheets.contains_key(url)
            || self
                .pages
                .iter()
                .any(|page| page.url == url || page.final_url == url)
    }
}

fn serialize_keys<S: Serializer>(map: &BTreeMap<String, String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(map.keys())
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
