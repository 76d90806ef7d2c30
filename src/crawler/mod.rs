//! Crawler module for page and stylesheet fetching
//!
//! This module contains the crawl phase, including:
//! - HTTP fetching with retry and backoff
//! - HTML parsing for stylesheet, script and link discovery
//! - The bounded breadth-first crawl loop
//! - The session record handed to extraction

mod coordinator;
mod fetcher;
mod parser;
mod session;

pub use coordinator::{crawl, CrawlPhase, Crawler};
pub use fetcher::{build_http_client, is_retryable_status, FetchResponse, HttpGateway, RetryPolicy};
pub use parser::{inline_styles, parse_links, ParsedLinks};
pub use session::{CrawlSession, CrawledPage};
