//! Robots.txt handling module
//!
//! This module fetches robots.txt once per crawl and turns it into an
//! advisory verdict. The verdict never blocks the crawl; it is attached to the
//! session so the report can disclose it.

mod parser;

pub use parser::{interpret, RobotsAdvisory, RobotsVerdict};

use crate::crawler::HttpGateway;
use crate::url::origin_root;
use std::time::Duration;
use url::Url;

/// Fetches and interprets robots.txt for the seed's origin
///
/// Fails open: a missing file, a non-2xx status or a network error all yield
/// an "allowed" advisory carrying a warning.
///
/// # Arguments
///
/// * `gateway` - The gateway to issue the request through
/// * `seed` - Any URL on the origin to check
/// * `timeout` - Timeout for this single request
pub async fn check_robots(gateway: &HttpGateway, seed: &Url, timeout: Duration) -> RobotsAdvisory {
    let robots_url = match origin_root(seed).join("robots.txt") {
        Ok(url) => url,
        Err(e) => {
            return RobotsAdvisory::allowed_with_warning(format!(
                "robots.txt location could not be derived: {}; assuming allowed",
                e
            ))
        }
    };

    tracing::debug!("Fetching robots.txt from {}", robots_url);

    match gateway.fetch_once(robots_url.as_str(), timeout).await {
        Ok(response) if response.is_success() => {
            let advisory = RobotsAdvisory::from_content(&response.body);
            if advisory.is_blocked() {
                tracing::warn!("robots.txt at {} disallows all crawling (advisory)", robots_url);
            }
            advisory
        }
        Ok(response) => {
            tracing::info!("No robots.txt at {} (HTTP {})", robots_url, response.status);
            RobotsAdvisory::allowed_with_warning(format!(
                "robots.txt not found (HTTP {}); assuming allowed",
                response.status
            ))
        }
        Err(e) => {
            tracing::warn!("Failed to fetch robots.txt: {}", e);
            RobotsAdvisory::allowed_with_warning(format!(
                "robots.txt could not be fetched ({}); assuming allowed",
                e
            ))
        }
    }
}
