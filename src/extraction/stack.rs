//! Technology stack detection
//!
//! Each detector in the table is scored against the combined markup and
//! stylesheet text:
//!
//! ```text
//! confidence = min(max_weight + min(0.1 * (matches - 1), 0.15), 1.0)
//! ```
//!
//! Detectors with no matching fingerprint produce no signal.

use crate::extraction::corpus::Corpus;
use crate::extraction::tables::StackDetector;
use crate::extraction::types::{clamp_confidence, StackSignal};

/// Bonus per corroborating fingerprint beyond the first
const CORROBORATION_STEP: f64 = 0.1;

/// Maximum total corroboration bonus
const CORROBORATION_CAP: f64 = 0.15;

/// Scores every detector; the result is sorted by descending confidence,
/// ties in table order
pub fn detect_stack(corpus: &Corpus<'_>, detectors: &[StackDetector]) -> Vec<StackSignal> {
    let combined = format!("{}\n{}", corpus.markup, corpus.css);

    let mut signals: Vec<StackSignal> = detectors
        .iter()
        .filter_map(|detector| score_detector(corpus, &combined, detector))
        .collect();

    // Stable sort keeps table order for equal confidence
    signals.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    signals
}

fn score_detector(corpus: &Corpus<'_>, combined: &str, detector: &StackDetector) -> Option<StackSignal> {
    let mut evidence = Vec::new();
    let mut source_urls: Vec<String> = Vec::new();
    let mut max_weight: f64 = 0.0;

    for fingerprint in &detector.fingerprints {
        if !fingerprint.pattern.is_match(combined) {
            continue;
        }

        tracing::trace!("{}: matched '{}'", detector.name, fingerprint.description);
        evidence.push(fingerprint.description.clone());
        max_weight = max_weight.max(fingerprint.weight);

        // Attribute the match to every document it matches in on its own
        let page_hits = corpus
            .pages
            .iter()
            .filter(|page| fingerprint.pattern.is_match(page.html))
            .map(|page| page.url);
        let sheet_hits = corpus
            .css_units
            .iter()
            .filter(|unit| fingerprint.pattern.is_match(&unit.text))
            .map(|unit| unit.url);

        for url in page_hits.chain(sheet_hits) {
            if !source_urls.iter().any(|seen| seen == url) {
                source_urls.push(url.to_string());
            }
        }
    }

    if evidence.is_empty() {
        return None;
    }

    Some(StackSignal {
        name: detector.name.clone(),
        category: detector.category,
        confidence: combine_confidence(max_weight, evidence.len()),
        evidence,
        source_urls,
    })
}

/// Strongest weight plus a capped bonus for corroborating fingerprints
pub fn combine_confidence(max_weight: f64, matches: usize) -> f64 {
    let extra = matches.saturating_sub(1) as f64;
    let bonus = (CORROBORATION_STEP * extra).min(CORROBORATION_CAP);
    clamp_confidence((max_weight + bonus).min(1.0))
}
