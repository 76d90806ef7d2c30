//! Text views over a crawl session used by every detector

use crate::crawler::{inline_styles, CrawlSession};
use crate::extraction::types::SourceKind;
use regex::Regex;
use std::borrow::Cow;

/// HTML of one successfully fetched page
#[derive(Debug, Clone)]
pub struct PageText<'a> {
    pub url: &'a str,
    pub html: &'a str,
}

/// One unit of stylesheet text: an inline `<style>` block or a fetched file
#[derive(Debug, Clone)]
pub struct CssUnit<'a> {
    pub url: &'a str,
    pub text: Cow<'a, str>,
    pub kind: SourceKind,
}

/// Everything the detectors scan, borrowed from the session
#[derive(Debug, Clone)]
pub struct Corpus<'a> {
    pub seed_url: &'a str,
    pub pages: Vec<PageText<'a>>,
    /// Inline blocks first (page order), then fetched stylesheets
    pub css_units: Vec<CssUnit<'a>>,
    /// All page markup joined by newlines
    pub markup: String,
    /// All stylesheet text (inline and fetched) joined by newlines
    pub css: String,
}

impl<'a> Corpus<'a> {
    /// Builds the corpus from the successful pages and fetched stylesheets
    pub fn from_session(session: &'a CrawlSession) -> Self {
        let pages: Vec<PageText<'a>> = session
            .successful_pages()
            .map(|page| PageText {
                url: page.final_url.as_str(),
                html: page.html.as_str(),
            })
            .collect();

        let mut css_units: Vec<CssUnit<'a>> = Vec::new();
        for page in &pages {
            for block in inline_styles(page.html) {
                css_units.push(CssUnit {
                    url: page.url,
                    text: Cow::Owned(block),
                    kind: SourceKind::Markup,
                });
            }
        }
        for (url, text) in &session.stylesheets {
            css_units.push(CssUnit {
                url: url.as_str(),
                text: Cow::Borrowed(text.as_str()),
                kind: SourceKind::Stylesheet,
            });
        }

        let markup = pages
            .iter()
            .map(|page| page.html)
            .collect::<Vec<_>>()
            .join("\n");
        let css = css_units
            .iter()
            .map(|unit| unit.text.as_ref())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            seed_url: session.seed_url.as_str(),
            pages,
            css_units,
            markup,
            css,
        }
    }

    /// Number of inline `<style>` blocks
    pub fn inline_block_count(&self) -> usize {
        self.css_units
            .iter()
            .filter(|unit| unit.kind == SourceKind::Markup)
            .count()
    }

    /// First stylesheet unit the pattern matches in
    pub fn first_css_match(&self, pattern: &Regex) -> Option<&CssUnit<'a>> {
        self.css_units.iter().find(|unit| pattern.is_match(&unit.text))
    }

    /// First page the pattern matches in
    pub fn first_page_match(&self, pattern: &Regex) -> Option<&PageText<'a>> {
        self.pages.iter().find(|page| pattern.is_match(page.html))
    }

    /// URL used when a fact has no single originating document
    pub fn primary_url(&self) -> &'a str {
        self.pages.first().map(|page| page.url).unwrap_or(self.seed_url)
    }
}
