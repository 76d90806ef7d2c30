//! Design token extraction: custom properties, colors, font families, radii
//! and shadows
//!
//! Every scanner works on a single stylesheet unit and keeps no state
//! between units. [`extract_tokens`] runs them over every unit, concatenates
//! the results and deduplicates each collection by its semantic key.

use crate::extraction::corpus::{Corpus, CssUnit};
use crate::extraction::dedupe::dedupe_by;
use crate::extraction::types::{
    ColorFormat, ColorToken, ColorUsage, CustomProperty, ExtractedValue, RadiusToken, ShadowToken,
    SourceInfo, TypographyToken,
};
use regex::Regex;
use std::sync::LazyLock;

const CUSTOM_PROPERTY_CONFIDENCE: f64 = 0.95;
const COLOR_CONFIDENCE: f64 = 0.9;
const FONT_FAMILY_CONFIDENCE: f64 = 0.85;
const VARIABLE_TOKEN_CONFIDENCE: f64 = 0.9;
const DECLARATION_TOKEN_CONFIDENCE: f64 = 0.7;

static CUSTOM_PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[{;\s])(--[A-Za-z0-9_-]+)\s*:\s*([^;}]+)")
        .expect("Failed to compile custom property regex")
});

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)#(?:[0-9a-f]{8}|[0-9a-f]{6}|[0-9a-f]{3,4})\b|rgba?\([^)]*\)|hsla?\([^)]*\)",
    )
    .expect("Failed to compile color regex")
});

static FONT_FAMILY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\w-]*font-family)\s*:\s*([^;}]+)").expect("Failed to compile font-family regex")
});

static BORDER_RADIUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w-])border-radius\s*:\s*([^;}]+)")
        .expect("Failed to compile border-radius regex")
});

static BOX_SHADOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w-])box-shadow\s*:\s*([^;}]+)").expect("Failed to compile box-shadow regex")
});

/// Name keywords checked in order; the first hit decides the usage
const USAGE_RULES: &[(&[&str], ColorUsage)] = &[
    (&["background", "bg"], ColorUsage::Background),
    (&["foreground", "text", "fg"], ColorUsage::Foreground),
    (&["primary"], ColorUsage::Primary),
    (&["secondary"], ColorUsage::Secondary),
    (&["accent"], ColorUsage::Accent),
    (&["border"], ColorUsage::Border),
];

/// All token collections, deduplicated
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    pub custom_properties: Vec<ExtractedValue<CustomProperty>>,
    pub colors: Vec<ColorToken>,
    pub typography: Vec<TypographyToken>,
    pub radii: Vec<RadiusToken>,
    pub shadows: Vec<ShadowToken>,
}

/// Runs every token scanner over every stylesheet unit
pub fn extract_tokens(corpus: &Corpus<'_>) -> TokenSet {
    let mut set = TokenSet::default();

    for unit in &corpus.css_units {
        set.custom_properties.extend(extract_custom_properties(unit));
        set.colors.extend(extract_colors(unit));
        set.typography.extend(extract_font_families(unit));
        set.radii.extend(extract_radii(unit));
        set.shadows.extend(extract_shadows(unit));
    }

    TokenSet {
        custom_properties: dedupe_by(set.custom_properties, |p| p.value.name.clone()),
        colors: dedupe_by(set.colors, |c| c.name.clone()),
        typography: dedupe_by(set.typography, |t| t.value.clone()),
        radii: dedupe_by(set.radii, |r| token_key(&r.name, &r.value)),
        shadows: dedupe_by(set.shadows, |s| token_key(&s.name, &s.value)),
    }
}

/// Variables are keyed by name, direct declarations by their literal value
fn token_key(name: &str, value: &str) -> (bool, String) {
    if name.starts_with("--") {
        (true, name.to_string())
    } else {
        (false, value.to_string())
    }
}

fn source(unit: &CssUnit<'_>, excerpt: &str, confidence: f64) -> SourceInfo {
    SourceInfo::new(unit.kind, unit.url, excerpt, confidence)
}

/// Every `--name: value` declaration, whatever the value
pub fn extract_custom_properties(unit: &CssUnit<'_>) -> Vec<ExtractedValue<CustomProperty>> {
    custom_property_pairs(&unit.text)
        .map(|(name, value, excerpt)| {
            ExtractedValue::new(
                CustomProperty {
                    name: name.to_string(),
                    value: value.to_string(),
                },
                source(unit, excerpt, CUSTOM_PROPERTY_CONFIDENCE),
            )
        })
        .collect()
}

fn custom_property_pairs(text: &str) -> impl Iterator<Item = (&str, &str, &str)> {
    CUSTOM_PROPERTY_RE.captures_iter(text).filter_map(|caps| {
        let name = caps.get(1)?.as_str();
        let value = caps.get(2)?.as_str().trim();
        let excerpt = caps.get(0)?.as_str().trim_start_matches(['{', ';']).trim();
        (!value.is_empty()).then_some((name, value, excerpt))
    })
}

/// Custom properties whose value contains a color literal
///
/// Only the first literal in the value is kept.
pub fn extract_colors(unit: &CssUnit<'_>) -> Vec<ColorToken> {
    custom_property_pairs(&unit.text)
        .filter_map(|(name, value, excerpt)| {
            let literal = COLOR_RE.find(value)?.as_str();
            Some(ColorToken {
                name: name.to_string(),
                value: literal.to_string(),
                format: color_format(literal),
                usage: infer_usage(name),
                source: source(unit, excerpt, COLOR_CONFIDENCE),
            })
        })
        .collect()
}

/// Notation of a color literal matched by the color pattern
pub fn color_format(literal: &str) -> ColorFormat {
    let lowered = literal.to_ascii_lowercase();
    if lowered.starts_with('#') {
        ColorFormat::Hex
    } else if lowered.starts_with("rgba") {
        ColorFormat::Rgba
    } else if lowered.starts_with("rgb") {
        ColorFormat::Rgb
    } else if lowered.starts_with("hsla") {
        ColorFormat::Hsla
    } else {
        ColorFormat::Hsl
    }
}

/// Usage category from a property name, first matching rule wins
pub fn infer_usage(name: &str) -> ColorUsage {
    let lowered = name.to_ascii_lowercase();
    USAGE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, usage)| *usage)
        .unwrap_or(ColorUsage::Unknown)
}

/// Every `font-family` declaration, custom property or not
pub fn extract_font_families(unit: &CssUnit<'_>) -> Vec<TypographyToken> {
    FONT_FAMILY_RE
        .captures_iter(&unit.text)
        .filter_map(|caps| {
            let value = caps.get(2)?.as_str().trim();
            if value.is_empty() {
                return None;
            }
            Some(TypographyToken {
                name: caps[1].to_string(),
                value: value.to_string(),
                source: source(unit, caps.get(0)?.as_str(), FONT_FAMILY_CONFIDENCE),
            })
        })
        .collect()
}

pub fn extract_radii(unit: &CssUnit<'_>) -> Vec<RadiusToken> {
    scan_variable_and_declarations(unit, "radius", &BORDER_RADIUS_RE, "border-radius", |_| true)
        .into_iter()
        .map(|(name, value, source)| RadiusToken { name, value, source })
        .collect()
}

pub fn extract_shadows(unit: &CssUnit<'_>) -> Vec<ShadowToken> {
    scan_variable_and_declarations(unit, "shadow", &BOX_SHADOW_RE, "box-shadow", |value| {
        !value.eq_ignore_ascii_case("none")
    })
    .into_iter()
    .map(|(name, value, source)| ShadowToken { name, value, source })
    .collect()
}

/// Custom properties whose name contains `keyword`, then direct
/// declarations of `property` that are not `var(...)` references
fn scan_variable_and_declarations(
    unit: &CssUnit<'_>,
    keyword: &str,
    declaration: &Regex,
    property: &str,
    accept: impl Fn(&str) -> bool,
) -> Vec<(String, String, SourceInfo)> {
    let mut found: Vec<(String, String, SourceInfo)> = custom_property_pairs(&unit.text)
        .filter(|(name, _, _)| name.to_ascii_lowercase().contains(keyword))
        .map(|(name, value, excerpt)| {
            (
                name.to_string(),
                value.to_string(),
                source(unit, excerpt, VARIABLE_TOKEN_CONFIDENCE),
            )
        })
        .collect();

    for caps in declaration.captures_iter(&unit.text) {
        let value = caps[1].trim();
        if value.is_empty() || value.starts_with("var(") || !accept(value) {
            continue;
        }
        let excerpt = format!("{}: {}", property, value);
        found.push((
            property.to_string(),
            value.to_string(),
            source(unit, &excerpt, DECLARATION_TOKEN_CONFIDENCE),
        ));
    }

    found
}
