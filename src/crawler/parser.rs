//! HTML parser for extracting asset references and links
//!
//! This module handles parsing one HTML document to extract:
//! - Stylesheet references (`<link rel="stylesheet">`, `<link type="text/css">`, `@import`)
//! - Script references (`<script src>`)
//! - Same-origin anchor links to follow
//! - The text of inline `<style>` blocks

use crate::extraction::dedupe_by;
use crate::url::{normalize_parsed, same_origin};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[href]").expect("Failed to compile link selector"));
static STYLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("style").expect("Failed to compile style selector"));
static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[src]").expect("Failed to compile script selector"));
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("Failed to compile anchor selector"));

// @import "a.css";  @import url(a.css);  @import url('a.css') screen;
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?["']?([^"'()\s;]+)["']?"#)
        .expect("Failed to compile @import regex")
});

/// Asset references and links found in one HTML document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLinks {
    /// Absolute stylesheet URLs, deduplicated
    pub stylesheets: Vec<String>,

    /// Absolute script URLs, deduplicated
    pub scripts: Vec<String>,

    /// Same-origin page URLs without query or fragment, deduplicated
    pub internal_links: Vec<String>,
}

/// Parses HTML content and extracts asset references and links
///
/// # Link Extraction Rules
///
/// **Stylesheets:** `<link>` elements whose `rel` contains `stylesheet` or
/// whose `type` is `text/css`, plus `@import` rules inside inline `<style>`
/// blocks. All three feed one list.
///
/// **Internal links:** `<a href>` values, excluding `javascript:`, `mailto:`,
/// `tel:`, `data:` and fragment-only targets. Only URLs on the same origin as
/// `base_url` survive; they are stripped of query and fragment.
///
/// Unparseable values are skipped silently.
///
/// # Example
///
/// ```
/// use design_lens::crawler::parse_links;
/// use url::Url;
///
/// let html = r#"<link rel="stylesheet" href="/app.css"><a href="/about?x=1">About</a>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_links(html, &base);
/// assert_eq!(parsed.stylesheets, vec!["https://example.com/app.css"]);
/// assert_eq!(parsed.internal_links, vec!["https://example.com/about"]);
/// ```
pub fn parse_links(html: &str, base_url: &Url) -> ParsedLinks {
    let document = Html::parse_document(html);

    ParsedLinks {
        stylesheets: extract_stylesheets(&document, base_url),
        scripts: extract_scripts(&document, base_url),
        internal_links: extract_internal_links(&document, base_url),
    }
}

/// Returns the text of every inline `<style>` block, in document order
pub fn inline_styles(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&STYLE_SELECTOR)
        .map(|element| element.text().collect::<String>())
        .filter(|css| !css.trim().is_empty())
        .collect()
}

fn extract_stylesheets(document: &Html, base_url: &Url) -> Vec<String> {
    let mut found = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let attrs = element.value();
        let is_stylesheet = attrs
            .attr("rel")
            .map(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("stylesheet"))
            })
            .unwrap_or(false);
        let is_css = attrs
            .attr("type")
            .map(|t| t.trim().eq_ignore_ascii_case("text/css"))
            .unwrap_or(false);

        if !(is_stylesheet || is_css) {
            continue;
        }

        if let Some(url) = attrs.attr("href").and_then(|href| resolve_asset(href, base_url)) {
            found.push(url.to_string());
        }
    }

    for element in document.select(&STYLE_SELECTOR) {
        let css = element.text().collect::<String>();
        for capture in IMPORT_RE.captures_iter(&css) {
            if let Some(url) = resolve_asset(&capture[1], base_url) {
                found.push(url.to_string());
            }
        }
    }

    dedupe_by(found, |url| url.clone())
}

fn extract_scripts(document: &Html, base_url: &Url) -> Vec<String> {
    let found = document
        .select(&SCRIPT_SELECTOR)
        .filter_map(|element| element.value().attr("src"))
        .filter_map(|src| resolve_asset(src, base_url))
        .map(|url| url.to_string())
        .collect();

    dedupe_by(found, |url| url.clone())
}

fn extract_internal_links(document: &Html, base_url: &Url) -> Vec<String> {
    let found = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .filter(|url| same_origin(base_url, url))
        .filter_map(|url| normalize_parsed(url).ok())
        .map(|url| url.to_string())
        .collect();

    dedupe_by(found, |url| url.clone())
}

/// Resolves an asset reference (stylesheet or script) to an absolute URL
fn resolve_asset(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("data:") {
        return None;
    }

    base_url
        .join(href)
        .ok()
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
}

/// Resolves an anchor href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only targets
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    base_url
        .join(href)
        .ok()
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/docs/page").unwrap()
    }

    #[test]
    fn test_stylesheet_link_rel() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="/css/main.css">
            <link rel="preload stylesheet" href="theme.css">
            <link rel="icon" href="/favicon.ico">
        </head></html>"#;
        let parsed = parse_links(html, &base_url());
        assert_eq!(
            parsed.stylesheets,
            vec![
                "https://example.com/css/main.css",
                "https://example.com/docs/theme.css"
            ]
        );
    }

    #[test]
    fn test_stylesheet_link_type() {
        let html = r#"<link type="text/css" href="https://cdn.example.net/lib.css">"#;
        let parsed = parse_links(html, &base_url());
        assert_eq!(parsed.stylesheets, vec!["https://cdn.example.net/lib.css"]);
    }

    #[test]
    fn test_stylesheet_import() {
        let html = r#"<style>
            @import url("/fonts.css");
            @import 'print.css' print;
            body { color: red; }
        </style>"#;
        let parsed = parse_links(html, &base_url());
        assert_eq!(
            parsed.stylesheets,
            vec![
                "https://example.com/fonts.css",
                "https://example.com/docs/print.css"
            ]
        );
    }

    #[test]
    fn test_stylesheets_merge_and_dedupe() {
        let html = r#"
            <link rel="stylesheet" href="/a.css">
            <link type="text/css" href="/a.css">
            <style>@import "/a.css";</style>"#;
        let parsed = parse_links(html, &base_url());
        assert_eq!(parsed.stylesheets, vec!["https://example.com/a.css"]);
    }

    #[test]
    fn test_scripts() {
        let html = r#"
            <script src="/_next/static/chunk.js"></script>
            <script src="/_next/static/chunk.js"></script>
            <script>inline()</script>"#;
        let parsed = parse_links(html, &base_url());
        assert_eq!(
            parsed.scripts,
            vec!["https://example.com/_next/static/chunk.js"]
        );
    }

    #[test]
    fn test_internal_links_same_origin_only() {
        let html = r#"
            <a href="/about">About</a>
            <a href="https://other.com/page">Other</a>
            <a href="http://example.com/insecure">Other scheme</a>"#;
        let parsed = parse_links(html, &base_url());
        assert_eq!(parsed.internal_links, vec!["https://example.com/about"]);
    }

    #[test]
    fn test_internal_links_strip_query_and_fragment() {
        let html = r#"
            <a href="/pricing?plan=pro">Pro</a>
            <a href="/pricing#faq">FAQ</a>
            <a href="/pricing">Pricing</a>"#;
        let parsed = parse_links(html, &base_url());
        assert_eq!(parsed.internal_links, vec!["https://example.com/pricing"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r##"
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Mail</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,hi">Data</a>
            <a href="#section">Jump</a>
            <a href="JavaScript:alert(1)">Upper</a>"##;
        let parsed = parse_links(html, &base_url());
        assert!(parsed.internal_links.is_empty());
    }

    #[test]
    fn test_malformed_href_skipped() {
        let html = r#"<a href="http://[::1">Broken</a><a href="/ok">Ok</a>"#;
        let parsed = parse_links(html, &base_url());
        assert_eq!(parsed.internal_links, vec!["https://example.com/ok"]);
    }

    #[test]
    fn test_inline_styles() {
        let html = r#"<head><style>:root{--a:1px}</style><style>  </style></head>
            <body><style>.card{padding:1rem}</style></body>"#;
        let styles = inline_styles(html);
        assert_eq!(styles.len(), 2);
        assert!(styles[0].contains("--a"));
        assert!(styles[1].contains(".card"));
    }
}
