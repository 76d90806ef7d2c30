//! Integration tests for the crawler and extraction pipeline
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl-then-extract cycle end-to-end with millisecond delays.

use design_lens::config::{CrawlConfig, FetchSettings};
use design_lens::crawler::{crawl, CrawlSession, HttpGateway, RetryPolicy};
use design_lens::extraction::{extract, ExtractionResult, SourceInfo};
use design_lens::robots::RobotsVerdict;
use design_lens::FetchError;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fetch settings with short delays and backoff
fn fast_settings() -> FetchSettings {
    FetchSettings {
        user_agent: "TestBot/1.0".to_string(),
        timeout_secs: 5,
        robots_timeout_secs: 2,
        max_attempts: 3,
        initial_backoff_ms: 10,
        page_delay_ms: 10,
        stylesheet_delay_ms: 10,
    }
}

fn config_for(server: &MockServer, max_pages: usize) -> CrawlConfig {
    let mut config = CrawlConfig::new(format!("{}/", server.uri()));
    config.max_pages = max_pages;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

async fn mount_robots(server: &MockServer, content: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content.to_string()))
        .mount(server)
        .await;
}

fn all_sources(result: &ExtractionResult) -> Vec<&SourceInfo> {
    let mut sources: Vec<&SourceInfo> = Vec::new();
    sources.extend(result.colors.iter().map(|c| &c.source));
    sources.extend(result.typography.iter().map(|t| &t.source));
    sources.extend(result.radii.iter().map(|r| &r.source));
    sources.extend(result.shadows.iter().map(|s| &s.source));
    sources.extend(result.custom_properties.iter().map(|p| &p.source));
    sources.extend(result.typography_scale.headings.iter().map(|h| &h.source));
    sources.extend(result.typography_scale.body.iter().map(|b| &b.source));
    sources.extend(result.components.iter().map(|c| &c.source));
    sources.extend(result.accessibility.iter().map(|a| &a.source));
    sources.extend(result.layout.container_widths.iter().map(|w| &w.source));
    sources.extend(result.layout.breakpoints.iter().map(|b| &b.source));
    sources
}

fn assert_unique_pages(session: &CrawlSession) {
    let mut urls: Vec<&str> = session.pages.iter().map(|p| p.url.as_str()).collect();
    let total = urls.len();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), total, "a page was fetched twice");
}

#[tokio::test]
async fn test_full_crawl_and_extract() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head>
                <link rel="stylesheet" href="/css/site.css">
                <style>:root{--color-primary:#3366ff}</style>
                <script id="__NEXT_DATA__" type="application/json">{}</script>
                <script src="/_next/static/chunk.js"></script>
            </head><body>
                <header></header><nav><a href="/about">About</a></nav><main></main>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(
            r#"<html><body><a href="/">Home</a><img src="team.png" alt="Team"></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/css/site.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            ":root{--color-bg:#ffffff;--radius-lg:12px}\n\
             .btn{padding:4px} .btn:hover{opacity:.9}\n\
             h1{font-size:2.5rem}\n\
             @media (min-width: 768px){.container{max-width:720px}}",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let session = crawl(config_for(&server, 5), fast_settings())
        .await
        .expect("crawl should start");

    assert_eq!(session.pages.len(), 2);
    assert!(session.pages.iter().all(|p| p.is_success()));
    assert_eq!(session.stylesheets.len(), 1);
    assert_eq!(session.robots.verdict, RobotsVerdict::Allowed);
    assert_eq!(session.failed_requests, 0);
    // robots.txt + two pages + one stylesheet
    assert_eq!(session.total_requests, 4);

    let result = extract(&session);

    assert_eq!(result.pages_analyzed, 2);
    assert_eq!(result.stylesheets_analyzed, 1);

    let next = result.stack.iter().find(|s| s.name == "Next.js").unwrap();
    assert_eq!(next.confidence, 1.0);
    assert_eq!(next.evidence.len(), 2);

    let colors: Vec<&str> = result.colors.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(colors, vec!["--color-primary", "--color-bg"]);

    let button = result.components.iter().find(|c| c.kind == "button").unwrap();
    assert!(button.has_hover_state);

    assert_eq!(result.layout.breakpoints.len(), 1);
    assert_eq!(result.layout.container_widths[0].value, "720px");
    assert_eq!(result.typography_scale.headings.len(), 1);
}

#[tokio::test]
async fn test_page_limit_is_respected() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a><a href="/d">D</a>"#,
        ))
        .mount(&server)
        .await;

    for page in ["/a", "/b", "/c", "/d"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html("<p>leaf</p>"))
            .mount(&server)
            .await;
    }

    let session = crawl(config_for(&server, 2), fast_settings()).await.unwrap();

    assert_eq!(session.pages.len(), 2);
    assert!(session.pages[1].url.ends_with("/a"));
    assert_unique_pages(&session);
}

#[tokio::test]
async fn test_query_and_fragment_variants_fetched_once() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r##"<a href="/p?x=1">1</a><a href="/p?x=2#top">2</a><a href="/p#frag">3</a><a href="#">top</a>"##,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p"))
        .respond_with(html(r#"<a href="/?utm=1">home</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let session = crawl(config_for(&server, 10), fast_settings()).await.unwrap();

    assert_eq!(session.pages.len(), 2);
    assert_unique_pages(&session);
}

#[tokio::test]
async fn test_robots_block_is_advisory() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>still here</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let session = crawl(config_for(&server, 5), fast_settings()).await.unwrap();

    assert_eq!(session.robots.verdict, RobotsVerdict::Blocked);
    assert_eq!(session.pages.len(), 1);
    assert!(session.pages[0].is_success());
    assert!(!session.warnings.is_empty());

    let result = extract(&session);
    assert!(result.risks.iter().any(|r| r.contains("robots.txt")));
}

#[tokio::test]
async fn test_missing_robots_fails_open() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>home</p>"))
        .mount(&server)
        .await;

    let session = crawl(config_for(&server, 5), fast_settings()).await.unwrap();

    assert_eq!(session.robots.verdict, RobotsVerdict::Allowed);
    assert_eq!(session.robots.warnings.len(), 1);
    assert_eq!(session.pages.len(), 1);
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let session = crawl(config_for(&server, 5), fast_settings()).await.unwrap();

    assert_eq!(session.pages.len(), 1);
    let page = &session.pages[0];
    assert!(!page.is_success());
    assert!(page.error.as_deref().unwrap().contains("3 attempt"));
    assert_eq!(session.failed_requests, 1);
    // robots.txt + three attempts
    assert_eq!(session.total_requests, 4);
}

#[tokio::test]
async fn test_rate_limited_is_retried() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let session = crawl(config_for(&server, 5), fast_settings()).await.unwrap();

    let page = &session.pages[0];
    assert!(!page.is_success());
    assert!(page.error.as_deref().unwrap().contains("3 attempt"));
    assert_eq!(session.total_requests, 4);
}

#[tokio::test]
async fn test_timeout_is_retried() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_millis(1500)))
        .expect(3)
        .mount(&server)
        .await;

    let settings = FetchSettings {
        timeout_secs: 1,
        ..fast_settings()
    };
    let session = crawl(config_for(&server, 5), settings).await.unwrap();

    assert_eq!(session.pages.len(), 1);
    let error = session.pages[0].error.as_deref().unwrap();
    assert!(error.contains("failed after 3 attempt(s)"), "{}", error);
    assert!(error.contains("timeout"), "{}", error);
    assert_eq!(session.total_requests, 4);
}

#[tokio::test]
async fn test_gateway_timeout_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = HttpGateway::with_client(
        reqwest::Client::new(),
        RetryPolicy::new(2, Duration::from_millis(10)),
        Duration::from_millis(100),
    );
    let error = gateway
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert!(error.is_transient());
    assert!(matches!(error, FetchError::Transient { attempts: 2, .. }));
    assert_eq!(gateway.requests_issued(), 2);
}

#[tokio::test]
async fn test_connection_refused_is_retried() {
    // Nothing listens on a port that was bound and released
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let gateway = HttpGateway::new(&fast_settings()).unwrap();
    let error = gateway
        .fetch(&format!("http://{}/", addr))
        .await
        .unwrap_err();

    assert!(error.is_transient());
    assert!(matches!(error, FetchError::Transient { attempts: 3, .. }));
    assert_eq!(gateway.requests_issued(), 3);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let session = crawl(config_for(&server, 5), fast_settings()).await.unwrap();

    let page = &session.pages[0];
    assert_eq!(page.status, Some(404));
    assert_eq!(page.error.as_deref(), Some("HTTP 404"));

    let result = extract(&session);
    assert_eq!(result.pages_analyzed, 0);
    assert!(result.risks.iter().any(|r| r.ends_with(": HTTP 404")));
}

#[tokio::test]
async fn test_failed_stylesheet_is_omitted() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<link rel="stylesheet" href="/ok.css"><link rel="stylesheet" href="/missing.css">"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ok.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string(".card{padding:1rem}"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing.css"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let session = crawl(config_for(&server, 5), fast_settings()).await.unwrap();

    assert_eq!(session.stylesheets.len(), 1);
    assert!(session.stylesheets.keys().all(|url| url.ends_with("/ok.css")));
    assert_eq!(session.failed_requests, 0);
}

#[tokio::test]
async fn test_stylesheets_skipped_when_disabled() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<link rel="stylesheet" href="/site.css">"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/site.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body{}"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config_for(&server, 5);
    config.include_stylesheets = false;
    let session = crawl(config, fast_settings()).await.unwrap();

    assert!(session.stylesheets.is_empty());
    assert_eq!(session.pages[0].stylesheets.len(), 1);
}

#[tokio::test]
async fn test_other_origin_links_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<a href="{}/elsewhere">away</a><a href="/local">local</a>"#,
            other.uri()
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/local"))
        .respond_with(html("<p>local</p>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("<p>should not be fetched</p>"))
        .expect(0)
        .mount(&other)
        .await;

    let session = crawl(config_for(&server, 5), fast_settings()).await.unwrap();

    assert_eq!(session.pages.len(), 2);
    assert!(session
        .pages
        .iter()
        .all(|p| p.final_url.starts_with(&server.uri())));
}

#[tokio::test]
async fn test_off_origin_redirect_recorded_as_failure() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/go">go</a>"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/landing", other.uri()).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html("<p>landing</p>"))
        .mount(&other)
        .await;

    let session = crawl(config_for(&server, 5), fast_settings()).await.unwrap();

    assert_eq!(session.pages.len(), 2);
    let redirected = &session.pages[1];
    assert!(!redirected.is_success());
    assert!(redirected
        .error
        .as_deref()
        .unwrap()
        .starts_with("Redirected to a different origin"));
    // Every recorded page stays on the seed's origin
    assert!(session
        .pages
        .iter()
        .all(|p| p.final_url.starts_with(&server.uri())));
}

#[tokio::test]
async fn test_extracted_sources_trace_to_session() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><link rel="stylesheet" href="/app.css">
            <style>.card{border-radius:6px} .card:focus{outline:2px solid}</style></head>
            <body><a href="/blog">Blog</a><img src="x.png"></body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(html(r#"<style>h2{font-size:1.5rem}</style><p>posts</p>"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            ":root{--text-muted:rgba(0,0,0,.6);--shadow-card:0 2px 4px #0003}\n\
             body{font-family:system-ui;line-height:1.5}\n\
             @media (max-width: 640px){.container{max-width:100%}}",
        ))
        .mount(&server)
        .await;

    let session = crawl(config_for(&server, 5), fast_settings()).await.unwrap();
    let result = extract(&session);

    let sources = all_sources(&result);
    assert!(sources.len() > 5);
    for source in sources {
        assert!(
            session.contains_url(&source.source_url),
            "{} does not appear in the session",
            source.source_url
        );
        assert!((0.0..=1.0).contains(&source.confidence));
    }
    for signal in &result.stack {
        assert!(signal.source_urls.iter().all(|url| session.contains_url(url)));
    }
}
