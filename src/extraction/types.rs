//! Typed facts produced by extraction
//!
//! Every fact carries a [`SourceInfo`] pointing back at the page or
//! stylesheet it was found in.

use serde::{Deserialize, Serialize};

/// Maximum excerpt length, in characters
pub const EXCERPT_LIMIT: usize = 120;

/// Where a fact was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// HTML markup, including inline `<style>` blocks
    Markup,
    /// A fetched external stylesheet
    Stylesheet,
    /// An HTTP response header
    Header,
}

/// Provenance of an extracted fact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceInfo {
    pub kind: SourceKind,
    pub source_url: String,
    /// Short, whitespace-collapsed excerpt of the matched text
    pub excerpt: String,
    /// Heuristic score in [0, 1]
    pub confidence: f64,
}

impl SourceInfo {
    /// Creates a source record; the excerpt is collapsed and truncated and
    /// the confidence clamped to [0, 1]
    pub fn new(kind: SourceKind, source_url: impl Into<String>, excerpt: &str, confidence: f64) -> Self {
        Self {
            kind,
            source_url: source_url.into(),
            excerpt: make_excerpt(excerpt),
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Clamps a confidence value into [0, 1]; NaN becomes 0
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn make_excerpt(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= EXCERPT_LIMIT {
        collapsed
    } else {
        let mut truncated: String = collapsed.chars().take(EXCERPT_LIMIT - 3).collect();
        truncated.push_str("...");
        truncated
    }
}

/// A typed value with its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedValue<T> {
    pub value: T,
    pub source: SourceInfo,
}

impl<T> ExtractedValue<T> {
    pub fn new(value: T, source: SourceInfo) -> Self {
        Self { value, source }
    }
}

/// A `--name: value` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomProperty {
    pub name: String,
    pub value: String,
}

/// Technology category of a stack detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackCategory {
    Framework,
    CssFramework,
    UiLibrary,
    BuildTool,
    Other,
}

/// A detected technology
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackSignal {
    pub name: String,
    pub category: StackCategory,
    pub confidence: f64,
    /// Descriptions of the fingerprints that matched
    pub evidence: Vec<String>,
    /// Pages and stylesheets where at least one fingerprint matched
    pub source_urls: Vec<String>,
}

/// Color notation as authored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    Hex,
    Rgb,
    Rgba,
    Hsl,
    Hsla,
}

/// What a color token is used for, inferred from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorUsage {
    Background,
    Foreground,
    Primary,
    Secondary,
    Accent,
    Border,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorToken {
    /// Custom property name, e.g. `--color-primary`
    pub name: String,
    /// First color literal found in the declaration value
    pub value: String,
    pub format: ColorFormat,
    pub usage: ColorUsage,
    pub source: SourceInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypographyToken {
    /// Property or variable name the value was declared under
    pub name: String,
    pub value: String,
    pub source: SourceInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadiusToken {
    pub name: String,
    pub value: String,
    pub source: SourceInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowToken {
    pub name: String,
    pub value: String,
    pub source: SourceInfo,
}

/// Style declarations of one heading level or of body text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeScaleEntry {
    /// `h1`..`h6` or `body`
    pub selector: String,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub line_height: Option<String>,
    pub font_family: Option<String>,
    pub source: SourceInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypographyScale {
    /// Every heading rule found, in scan order; a level may repeat
    pub headings: Vec<TypeScaleEntry>,
    /// The last `body` rule found
    pub body: Option<TypeScaleEntry>,
}

/// A recurring component class family
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentPattern {
    pub kind: String,
    /// Up to five distinct matched class snippets
    pub class_patterns: Vec<String>,
    pub has_hover_state: bool,
    pub has_focus_state: bool,
    pub has_active_state: bool,
    pub source: SourceInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessibilitySignal {
    pub feature: String,
    pub present: bool,
    pub detail: Option<String>,
    pub source: SourceInfo,
}

/// Inferred grid system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridSystem {
    BootstrapGrid,
    CssGrid,
    Flexbox,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutInfo {
    pub container_widths: Vec<ExtractedValue<String>>,
    pub breakpoints: Vec<ExtractedValue<String>>,
    pub grid_system: GridSystem,
    pub evidence: Vec<String>,
}

/// Everything extraction produced for one crawl session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub seed_url: String,
    pub stack: Vec<StackSignal>,
    pub colors: Vec<ColorToken>,
    pub typography: Vec<TypographyToken>,
    pub typography_scale: TypographyScale,
    pub radii: Vec<RadiusToken>,
    pub shadows: Vec<ShadowToken>,
    pub custom_properties: Vec<ExtractedValue<CustomProperty>>,
    pub components: Vec<ComponentPattern>,
    pub accessibility: Vec<AccessibilitySignal>,
    pub layout: LayoutInfo,
    pub risks: Vec<String>,
    pub notes: Vec<String>,
    pub pages_analyzed: usize,
    pub stylesheets_analyzed: usize,
}
