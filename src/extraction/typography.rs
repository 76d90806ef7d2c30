//! Heading and body type scale

use crate::extraction::corpus::{Corpus, CssUnit};
use crate::extraction::types::{SourceInfo, TypeScaleEntry, TypographyScale};
use regex::Regex;
use std::sync::LazyLock;

const SCALE_CONFIDENCE: f64 = 0.8;

/// A rule whose block holds declarations only; nested at-rule blocks are skipped
static RULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^{};]+)\{([^{}]*)\}").expect("Failed to compile rule regex")
});

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("Failed to compile comment regex"));

static FONT_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| declaration_regex("font-size"));
static FONT_WEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| declaration_regex("font-weight"));
static LINE_HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| declaration_regex("line-height"));
static FONT_FAMILY_RE: LazyLock<Regex> =
    LazyLock::new(|| declaration_regex("font-family"));

fn declaration_regex(property: &str) -> Regex {
    Regex::new(&format!(r"(?:^|[^\w-]){}\s*:\s*([^;]+)", property))
        .expect("Failed to compile declaration regex")
}

/// Collects heading rules in scan order and the last body rule
///
/// Only bare type selectors count: `.card-body` and `.sub-h2` are classes.
/// A grouped selector such as `h1, h2` yields one entry per heading in the
/// group, in selector order.
pub fn extract_type_scale(corpus: &Corpus<'_>) -> TypographyScale {
    let mut scale = TypographyScale::default();

    for unit in &corpus.css_units {
        let text = COMMENT_RE.replace_all(&unit.text, " ");
        for caps in RULE_RE.captures_iter(&text) {
            let rule = caps[0].trim();
            let block = &caps[2];
            for selector in type_selectors(&caps[1]) {
                match selector.as_str() {
                    "body" => scale.body = Some(scale_entry(unit, "body", block, rule)),
                    tag if is_heading(tag) => {
                        scale.headings.push(scale_entry(unit, tag, block, rule))
                    }
                    _ => {}
                }
            }
        }
    }

    scale
}

/// Lowercased members of a selector list
fn type_selectors(prelude: &str) -> Vec<String> {
    prelude
        .split(',')
        .map(|selector| selector.trim().to_ascii_lowercase())
        .filter(|selector| !selector.is_empty())
        .collect()
}

fn is_heading(tag: &str) -> bool {
    matches!(tag.as_bytes(), [b'h', b'1'..=b'6'])
}

fn scale_entry(unit: &CssUnit<'_>, selector: &str, block: &str, rule: &str) -> TypeScaleEntry {
    TypeScaleEntry {
        selector: selector.to_string(),
        font_size: declaration(&FONT_SIZE_RE, block),
        font_weight: declaration(&FONT_WEIGHT_RE, block),
        line_height: declaration(&LINE_HEIGHT_RE, block),
        font_family: declaration(&FONT_FAMILY_RE, block),
        source: SourceInfo::new(unit.kind, unit.url, rule, SCALE_CONFIDENCE),
    }
}

fn declaration(pattern: &Regex, block: &str) -> Option<String> {
    pattern
        .captures(block)
        .map(|caps| caps[1].trim().to_string())
        .filter(|value| !value.is_empty())
}
