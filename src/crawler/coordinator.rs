//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the bounded breadth-first crawl loop:
//! - Checking robots.txt (advisory only)
//! - Draining the FIFO frontier with a visited set keyed by normalized URL
//! - Recording every attempted page, failures included
//! - Fetching the discovered stylesheets in a second pass
//!
//! Exactly one request is outstanding at any time.

use crate::config::{CrawlConfig, FetchSettings};
use crate::crawler::fetcher::HttpGateway;
use crate::crawler::parser::parse_links;
use crate::crawler::session::{CrawlSession, CrawledPage};
use crate::robots::{check_robots, RobotsAdvisory};
use crate::url::{normalize_parsed, normalize_url, same_origin};
use crate::LensError;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::time::Instant;
use url::Url;

/// Phases of a crawl, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    RobotsCheck,
    Draining,
    AssetFetch,
    Done,
}

/// Main crawler structure
///
/// Owns the gateway; the frontier and visited set live inside [`Crawler::run`].
pub struct Crawler {
    config: CrawlConfig,
    settings: FetchSettings,
    seed: Url,
    gateway: HttpGateway,
    phase: CrawlPhase,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `config` - What to crawl
    /// * `settings` - Network behaviour (timeouts, retries, delays)
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(LensError)` - Invalid configuration or HTTP client failure
    pub fn new(config: CrawlConfig, settings: FetchSettings) -> Result<Self, LensError> {
        config.validate()?;
        let seed = normalize_url(&config.seed_url)?;
        let gateway = HttpGateway::new(&settings)?;

        Ok(Self {
            config,
            settings,
            seed,
            gateway,
            phase: CrawlPhase::Idle,
        })
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn enter(&mut self, phase: CrawlPhase) {
        tracing::debug!("Crawl phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Runs the crawl to completion
    ///
    /// Never fails: network problems are recorded on the pages and the
    /// session is always returned.
    pub async fn run(mut self) -> CrawlSession {
        let started_at = Utc::now();
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl of {} (max {} pages)",
            self.seed,
            self.config.max_pages
        );

        self.enter(CrawlPhase::RobotsCheck);
        let robots =
            check_robots(&self.gateway, &self.seed, self.settings.robots_timeout()).await;
        let mut warnings = robots.warnings.clone();

        self.enter(CrawlPhase::Draining);
        let (pages, stylesheet_urls) = self.drain_frontier().await;
        let failed_requests = pages.iter().filter(|page| !page.is_success()).count() as u64;
        warnings.extend(self.robots_disallowed_warnings(&robots, &pages));

        let mut stylesheets = BTreeMap::new();
        if self.config.include_stylesheets && !stylesheet_urls.is_empty() {
            self.enter(CrawlPhase::AssetFetch);
            stylesheets = self.fetch_stylesheets(&stylesheet_urls).await;
        }

        self.enter(CrawlPhase::Done);
        let elapsed = start_time.elapsed();
        tracing::info!(
            "Crawl completed: {} pages ({} failed), {} stylesheets, {} requests in {:?}",
            pages.len(),
            failed_requests,
            stylesheets.len(),
            self.gateway.requests_issued(),
            elapsed
        );

        CrawlSession {
            seed_url: self.seed.to_string(),
            config: self.config.clone(),
            pages,
            stylesheets,
            robots,
            warnings,
            total_requests: self.gateway.requests_issued(),
            failed_requests,
            elapsed,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Breadth-first page pass
    ///
    /// Returns the pages in fetch order and the stylesheet URLs they
    /// referenced, in discovery order.
    async fn drain_frontier(&self) -> (Vec<CrawledPage>, Vec<String>) {
        let mut frontier: VecDeque<Url> = VecDeque::from([self.seed.clone()]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut pages: Vec<CrawledPage> = Vec::new();
        let mut stylesheet_urls: Vec<String> = Vec::new();
        let mut seen_stylesheets: HashSet<String> = HashSet::new();

        while pages.len() < self.config.max_pages {
            let Some(candidate) = frontier.pop_front() else {
                tracing::info!("Frontier is empty, page pass complete");
                break;
            };

            let url = match normalize_parsed(candidate) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Discarding frontier entry: {}", e);
                    continue;
                }
            };

            if visited.contains(url.as_str()) {
                continue;
            }

            if self.config.same_origin_only && !same_origin(&self.seed, &url) {
                tracing::debug!("Discarding off-origin URL {}", url);
                continue;
            }

            visited.insert(url.to_string());
            tracing::debug!("Fetching page {} ({}/{})", url, pages.len() + 1, self.config.max_pages);

            let page = self.fetch_page(&url).await;

            for sheet in &page.stylesheets {
                if seen_stylesheets.insert(sheet.clone()) {
                    stylesheet_urls.push(sheet.clone());
                }
            }

            for link in &page.internal_links {
                if visited.contains(link) {
                    continue;
                }
                if let Ok(next) = Url::parse(link) {
                    frontier.push_back(next);
                }
            }

            pages.push(page);

            // Uniform spacing after every page fetch, successful or not
            tokio::time::sleep(self.settings.page_delay()).await;
        }

        if pages.len() >= self.config.max_pages {
            tracing::info!("Reached page limit of {}", self.config.max_pages);
        }

        (pages, stylesheet_urls)
    }

    /// Fetches one page and turns the outcome into a record
    async fn fetch_page(&self, url: &Url) -> CrawledPage {
        let response = match self.gateway.fetch(url.as_str()).await {
            Ok(response) => response,
            Err(e) => {
                if e.is_transient() {
                    tracing::warn!("Giving up on {} after retries: {}", url, e);
                } else {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                }
                return CrawledPage::failed(url.as_str(), url.as_str(), None, e.to_string());
            }
        };

        let final_url = Url::parse(&response.final_url).unwrap_or_else(|_| url.clone());

        if self.config.same_origin_only && !same_origin(&self.seed, &final_url) {
            tracing::warn!("{} redirected off-origin to {}", url, final_url);
            return CrawledPage::failed(
                url.as_str(),
                url.as_str(),
                Some(response.status),
                format!("Redirected to a different origin: {}", final_url),
            );
        }

        if !response.is_success() {
            tracing::warn!("{} returned HTTP {}", url, response.status);
            let mut page = CrawledPage::failed(
                url.as_str(),
                final_url.as_str(),
                Some(response.status),
                format!("HTTP {}", response.status),
            );
            page.headers = response.headers;
            return page;
        }

        let links = parse_links(&response.body, &final_url);
        tracing::debug!(
            "{}: {} stylesheets, {} scripts, {} internal links",
            final_url,
            links.stylesheets.len(),
            links.scripts.len(),
            links.internal_links.len()
        );

        CrawledPage {
            url: url.to_string(),
            final_url: final_url.to_string(),
            status: Some(response.status),
            html: response.body,
            headers: response.headers,
            stylesheets: links.stylesheets,
            scripts: links.scripts,
            internal_links: links.internal_links,
            crawled_at: Utc::now(),
            error: None,
        }
    }

    /// Stylesheet pass; failures are dropped silently
    async fn fetch_stylesheets(&self, urls: &[String]) -> BTreeMap<String, String> {
        let mut stylesheets = BTreeMap::new();

        for (index, sheet) in urls.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.settings.stylesheet_delay()).await;
            }

            match self.gateway.fetch(sheet).await {
                Ok(response) if response.is_success() => {
                    tracing::debug!("Fetched stylesheet {} ({} bytes)", sheet, response.body.len());
                    stylesheets.insert(sheet.clone(), response.body);
                }
                Ok(response) => {
                    tracing::debug!("Skipping stylesheet {} (HTTP {})", sheet, response.status);
                }
                Err(e) => {
                    tracing::debug!("Skipping stylesheet {}: {}", sheet, e);
                }
            }
        }

        stylesheets
    }

    /// Advisory notes for fetched pages that robots.txt would disallow
    fn robots_disallowed_warnings(&self, robots: &RobotsAdvisory, pages: &[CrawledPage]) -> Vec<String> {
        let agent = user_agent_token(&self.settings.user_agent);

        pages
            .iter()
            .filter(|page| page.is_success())
            .filter(|page| robots.disallows(&page.url, agent))
            .map(|page| format!("robots.txt disallows {} (advisory only)", page.url))
            .collect()
    }
}

/// Product token of a user agent string ("DesignLens/1.0 (...)" -> "DesignLens")
fn user_agent_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .filter(|token| !token.is_empty())
        .unwrap_or("*")
}

/// Runs a complete crawl
///
/// # Example
///
/// ```no_run
/// use design_lens::config::{CrawlConfig, FetchSettings};
/// use design_lens::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = crawl(CrawlConfig::new("https://example.com"), FetchSettings::default()).await?;
/// println!("{} pages", session.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: CrawlConfig, settings: FetchSettings) -> Result<CrawlSession, LensError> {
    let crawler = Crawler::new(config, settings)?;
    Ok(crawler.run().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawler_creation() {
        let crawler = Crawler::new(CrawlConfig::new("https://example.com/?ref=x"), FetchSettings::default())
            .unwrap();
        assert_eq!(crawler.phase(), CrawlPhase::Idle);
        assert_eq!(crawler.seed.as_str(), "https://example.com/");
    }

    #[test]
    fn test_crawler_rejects_invalid_config() {
        let mut config = CrawlConfig::new("https://example.com");
        config.max_pages = 0;
        assert!(matches!(
            Crawler::new(config, FetchSettings::default()),
            Err(LensError::Config(_))
        ));

        assert!(Crawler::new(CrawlConfig::new("ftp://example.com"), FetchSettings::default()).is_err());
    }

    #[test]
    fn test_user_agent_token() {
        assert_eq!(user_agent_token("DesignLens/1.0 (+info)"), "DesignLens");
        assert_eq!(user_agent_token("TestBot"), "TestBot");
        assert_eq!(user_agent_token(""), "*");
    }
}
