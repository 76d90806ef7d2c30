//! Accessibility signals
//!
//! Five fixed checks, each always reported:
//!
//! | Feature                | Present when                          | Confidence                         |
//! |------------------------|---------------------------------------|------------------------------------|
//! | Skip Link              | a skip-link phrase is in the markup   | 0.8 present, 0.6 absent            |
//! | Focus Visible Styles   | `:focus-visible` or `:focus{outline}` | 0.8 present, 0.5 absent            |
//! | ARIA Attributes        | more than 5 `aria-*` attributes       | 0.9 above 20, 0.7 above 5, else 0.5 |
//! | Image Alt Text         | more than 80% of `<img>` carry `alt`  | 0.9 with images, 0.5 without       |
//! | Semantic Landmarks     | at least 3 of nav/main/header/footer  | 0.9 for 4, 0.7 for 3, else 0.5     |

use crate::extraction::corpus::Corpus;
use crate::extraction::types::{AccessibilitySignal, SourceInfo, SourceKind};
use regex::Regex;
use std::sync::LazyLock;

static SKIP_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)skip[\s_-]+(?:to[\s_-]+)?(?:the[\s_-]+)?(?:main[\s_-]+)?(?:content|navigation|main)|skip[_-]link")
        .expect("Failed to compile skip link regex")
});

static FOCUS_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":focus-visible|:focus\s*\{[^}]*outline").expect("Failed to compile focus style regex")
});

static ARIA_ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\baria-[a-z]+\s*=").expect("Failed to compile aria attribute regex")
});

static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("Failed to compile img tag regex"));

static ALT_ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\balt\s*=").expect("Failed to compile alt attribute regex"));

const LANDMARK_TAGS: [&str; 4] = ["nav", "main", "header", "footer"];

static LANDMARK_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    LANDMARK_TAGS
        .iter()
        .map(|tag| {
            let re = Regex::new(&format!(r"(?i)<{}[\s>]", tag))
                .expect("Failed to compile landmark regex");
            (*tag, re)
        })
        .collect()
});

const ARIA_PRESENT_THRESHOLD: usize = 5;
const ARIA_RICH_THRESHOLD: usize = 20;
const ALT_COVERAGE_THRESHOLD: f64 = 0.8;
const LANDMARK_THRESHOLD: usize = 3;

/// Runs all five checks, in table order
pub fn detect_accessibility(corpus: &Corpus<'_>) -> Vec<AccessibilitySignal> {
    vec![
        skip_link(corpus),
        focus_styles(corpus),
        aria_attributes(corpus),
        image_alt_text(corpus),
        semantic_landmarks(corpus),
    ]
}

fn markup_source(corpus: &Corpus<'_>, excerpt: &str, confidence: f64) -> SourceInfo {
    SourceInfo::new(SourceKind::Markup, corpus.primary_url(), excerpt, confidence)
}

fn skip_link(corpus: &Corpus<'_>) -> AccessibilitySignal {
    let hit = corpus.first_page_match(&SKIP_LINK_RE).and_then(|page| {
        SKIP_LINK_RE
            .find(page.html)
            .map(|m| (page.url, m.as_str()))
    });

    match hit {
        Some((url, phrase)) => AccessibilitySignal {
            feature: "Skip Link".to_string(),
            present: true,
            detail: Some(format!("Found \"{}\"", phrase)),
            source: SourceInfo::new(SourceKind::Markup, url, phrase, 0.8),
        },
        None => AccessibilitySignal {
            feature: "Skip Link".to_string(),
            present: false,
            detail: None,
            source: markup_source(corpus, "no skip link phrase", 0.6),
        },
    }
}

fn focus_styles(corpus: &Corpus<'_>) -> AccessibilitySignal {
    let hit = corpus.first_css_match(&FOCUS_STYLE_RE).and_then(|unit| {
        FOCUS_STYLE_RE
            .find(&unit.text)
            .map(|m| SourceInfo::new(unit.kind, unit.url, m.as_str(), 0.8))
    });

    let present = hit.is_some();
    AccessibilitySignal {
        feature: "Focus Visible Styles".to_string(),
        present,
        detail: present.then(|| "Custom focus styling found in stylesheets".to_string()),
        source: hit.unwrap_or_else(|| {
            SourceInfo::new(
                SourceKind::Stylesheet,
                corpus.primary_url(),
                "no :focus-visible or :focus outline rule",
                0.5,
            )
        }),
    }
}

fn aria_attributes(corpus: &Corpus<'_>) -> AccessibilitySignal {
    let count = ARIA_ATTRIBUTE_RE.find_iter(&corpus.markup).count();
    let confidence = if count > ARIA_RICH_THRESHOLD {
        0.9
    } else if count > ARIA_PRESENT_THRESHOLD {
        0.7
    } else {
        0.5
    };

    let detail = format!("{} aria-* attributes found", count);
    AccessibilitySignal {
        feature: "ARIA Attributes".to_string(),
        present: count > ARIA_PRESENT_THRESHOLD,
        source: markup_source(corpus, &detail, confidence),
        detail: Some(detail),
    }
}

fn image_alt_text(corpus: &Corpus<'_>) -> AccessibilitySignal {
    let (total, with_alt) = IMG_TAG_RE
        .find_iter(&corpus.markup)
        .fold((0usize, 0usize), |(total, with_alt), tag| {
            let has_alt = ALT_ATTRIBUTE_RE.is_match(tag.as_str());
            (total + 1, with_alt + usize::from(has_alt))
        });

    // No images means nothing is missing alt text
    let ratio = if total == 0 {
        1.0
    } else {
        with_alt as f64 / total as f64
    };
    let confidence = if total == 0 { 0.5 } else { 0.9 };

    let detail = format!(
        "{}/{} images have alt text ({}%)",
        with_alt,
        total,
        (ratio * 100.0).round() as u32
    );
    AccessibilitySignal {
        feature: "Image Alt Text".to_string(),
        present: ratio > ALT_COVERAGE_THRESHOLD,
        source: markup_source(corpus, &detail, confidence),
        detail: Some(detail),
    }
}

fn semantic_landmarks(corpus: &Corpus<'_>) -> AccessibilitySignal {
    let found: Vec<&str> = LANDMARK_RES
        .iter()
        .filter(|(_, re)| re.is_match(&corpus.markup))
        .map(|(tag, _)| *tag)
        .collect();

    let confidence = match found.len() {
        4 => 0.9,
        3 => 0.7,
        _ => 0.5,
    };

    let detail = if found.is_empty() {
        "No landmark elements found".to_string()
    } else {
        format!("Found <{}>", found.join(">, <"))
    };
    AccessibilitySignal {
        feature: "Semantic Landmarks".to_string(),
        present: found.len() >= LANDMARK_THRESHOLD,
        source: markup_source(corpus, &detail, confidence),
        detail: Some(detail),
    }
}
