//! Recurring component class families and their interactive states

use crate::extraction::corpus::Corpus;
use crate::extraction::dedupe::dedupe_by;
use crate::extraction::tables::ComponentDefinition;
use crate::extraction::types::{ComponentPattern, SourceInfo, SourceKind};
use regex::Regex;

/// Maximum class snippets reported per component kind
pub const MAX_CLASS_PATTERNS: usize = 5;

const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_FRAGMENT: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.9;

/// Runs every component definition over the stylesheet text
///
/// Kinds with no matching selector produce no pattern.
pub fn detect_components(
    corpus: &Corpus<'_>,
    definitions: &[ComponentDefinition],
) -> Vec<ComponentPattern> {
    definitions
        .iter()
        .filter_map(|definition| detect_component(corpus, definition))
        .collect()
}

fn detect_component(corpus: &Corpus<'_>, definition: &ComponentDefinition) -> Option<ComponentPattern> {
    let fragments: Vec<String> = definition
        .patterns
        .iter()
        .flat_map(|pattern| pattern.find_iter(&corpus.css))
        .map(|m| m.as_str().trim_end_matches('{').trim().to_string())
        .filter(|fragment| !fragment.is_empty())
        .collect();

    let mut class_patterns = dedupe_by(fragments, |f| f.clone());
    class_patterns.truncate(MAX_CLASS_PATTERNS);

    let first = class_patterns.first()?;
    let base = base_class(first);

    let source_url = corpus
        .css_units
        .iter()
        .find(|unit| unit.text.contains(first.as_str()))
        .map(|unit| (unit.kind, unit.url))
        .unwrap_or((SourceKind::Stylesheet, corpus.primary_url()));

    let confidence = (BASE_CONFIDENCE + CONFIDENCE_PER_FRAGMENT * class_patterns.len() as f64)
        .min(MAX_CONFIDENCE);
    let source = SourceInfo::new(source_url.0, source_url.1, first, confidence);

    tracing::debug!(
        "Component '{}': {} class pattern(s), base '.{}'",
        definition.kind,
        class_patterns.len(),
        base
    );

    Some(ComponentPattern {
        kind: definition.kind.clone(),
        has_hover_state: has_state(&corpus.css, &base, "hover"),
        has_focus_state: has_state(&corpus.css, &base, "focus"),
        has_active_state: has_state(&corpus.css, &base, "active"),
        class_patterns,
        source,
    })
}

/// Leading class name of a selector fragment, without the dot
///
/// `.btn-primary:hover` gives `btn-primary`.
pub fn base_class(fragment: &str) -> String {
    fragment
        .trim_start()
        .trim_start_matches('.')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Whether some selector on the base class carries the pseudo-class
fn has_state(css: &str, base: &str, state: &str) -> bool {
    if base.is_empty() {
        return false;
    }
    let probe = format!(r"\.{}[^{{,]*:{}", regex::escape(base), state);
    Regex::new(&probe)
        .map(|re| re.is_match(css))
        .unwrap_or(false)
}
