//! Container widths, breakpoints and grid system classification

use crate::extraction::corpus::{Corpus, CssUnit};
use crate::extraction::dedupe::dedupe_by;
use crate::extraction::types::{ExtractedValue, GridSystem, LayoutInfo, SourceInfo};
use regex::Regex;
use std::sync::LazyLock;

const CONTAINER_CONFIDENCE: f64 = 0.8;
const BREAKPOINT_CONFIDENCE: f64 = 0.85;

static CONTAINER_RULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.container\s*\{([^}]*)\}").expect("Failed to compile container rule regex")
});

static MAX_WIDTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w-])max-width\s*:\s*([^;]+)").expect("Failed to compile max-width regex")
});

static MEDIA_PRELUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@media[^{]+").expect("Failed to compile media prelude regex"));

static WIDTH_FEATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((?:min|max)-width\s*:\s*[^)]+\)").expect("Failed to compile width feature regex")
});

static BOOTSTRAP_COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcol-(?:xs|sm|md|lg|xl|xxl)-\d{1,2}\b").expect("Failed to compile column regex")
});

static DISPLAY_GRID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"display\s*:\s*grid").expect("Failed to compile display:grid regex"));

static DISPLAY_FLEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"display\s*:\s*flex").expect("Failed to compile display:flex regex"));

/// Where a grid rule looks for its pattern
#[derive(Debug, Clone, Copy)]
enum Scope {
    Stylesheets,
    Anywhere,
}

struct GridRule {
    pattern: &'static LazyLock<Regex>,
    scope: Scope,
    system: GridSystem,
    evidence: &'static str,
}

/// Checked in order; the first hit decides the classification
static GRID_RULES: [GridRule; 3] = [
    GridRule {
        pattern: &BOOTSTRAP_COLUMN_RE,
        scope: Scope::Anywhere,
        system: GridSystem::BootstrapGrid,
        evidence: "Bootstrap-style .col-{breakpoint}-N classes",
    },
    GridRule {
        pattern: &DISPLAY_GRID_RE,
        scope: Scope::Stylesheets,
        system: GridSystem::CssGrid,
        evidence: "display: grid declarations",
    },
    GridRule {
        pattern: &DISPLAY_FLEX_RE,
        scope: Scope::Stylesheets,
        system: GridSystem::Flexbox,
        evidence: "display: flex declarations",
    },
];

pub fn analyze_layout(corpus: &Corpus<'_>) -> LayoutInfo {
    let mut container_widths = Vec::new();
    let mut breakpoints = Vec::new();

    for unit in &corpus.css_units {
        container_widths.extend(container_widths_in(unit));
        breakpoints.extend(breakpoints_in(unit));
    }

    let (grid_system, evidence) = classify_grid(corpus);

    LayoutInfo {
        container_widths: dedupe_by(container_widths, |w| w.value.clone()),
        breakpoints: dedupe_by(breakpoints, |b| b.value.clone()),
        grid_system,
        evidence,
    }
}

fn container_widths_in(unit: &CssUnit<'_>) -> Vec<ExtractedValue<String>> {
    CONTAINER_RULE_RE
        .captures_iter(&unit.text)
        .filter_map(|caps| {
            let width = MAX_WIDTH_RE.captures(&caps[1])?[1].trim().to_string();
            let source = SourceInfo::new(unit.kind, unit.url, &caps[0], CONTAINER_CONFIDENCE);
            Some(ExtractedValue::new(width, source))
        })
        .collect()
}

fn breakpoints_in(unit: &CssUnit<'_>) -> Vec<ExtractedValue<String>> {
    MEDIA_PRELUDE_RE
        .find_iter(&unit.text)
        .flat_map(|prelude| {
            WIDTH_FEATURE_RE.find_iter(prelude.as_str()).map(move |feature| {
                ExtractedValue::new(
                    feature.as_str().to_string(),
                    SourceInfo::new(unit.kind, unit.url, prelude.as_str(), BREAKPOINT_CONFIDENCE),
                )
            })
        })
        .collect()
}

/// Every rule contributes evidence; the first positive rule wins
fn classify_grid(corpus: &Corpus<'_>) -> (GridSystem, Vec<String>) {
    let hits: Vec<&GridRule> = GRID_RULES
        .iter()
        .filter(|rule| match rule.scope {
            Scope::Stylesheets => rule.pattern.is_match(&corpus.css),
            Scope::Anywhere => rule.pattern.is_match(&corpus.css) || rule.pattern.is_match(&corpus.markup),
        })
        .collect();

    let system = hits.first().map(|rule| rule.system).unwrap_or(GridSystem::Unknown);
    let evidence = hits.iter().map(|rule| rule.evidence.to_string()).collect();
    (system, evidence)
}
