//! Heuristic extraction over a finished crawl session
//!
//! Every detector reads the same [`Corpus`] and runs independently of the
//! others. Extraction never touches the network and cannot fail: a pattern
//! that finds nothing yields an empty or omitted result.

pub mod accessibility;
pub mod components;
pub mod corpus;
pub mod dedupe;
pub mod layout;
pub mod stack;
pub mod tables;
pub mod tokens;
pub mod types;
pub mod typography;

pub use corpus::{Corpus, CssUnit, PageText};
pub use dedupe::dedupe_by;
pub use tables::{ComponentDefinition, DetectorTables, Fingerprint, StackDetector};
pub use types::*;

use crate::crawler::CrawlSession;

/// Runs every detector with the built-in tables
pub fn extract(session: &CrawlSession) -> ExtractionResult {
    extract_with(session, DetectorTables::builtin())
}

/// Runs every detector with the given tables
pub fn extract_with(session: &CrawlSession, tables: &DetectorTables) -> ExtractionResult {
    let corpus = Corpus::from_session(session);

    tracing::info!(
        "Extracting from {} page(s), {} stylesheet(s), {} inline style block(s)",
        corpus.pages.len(),
        session.stylesheets.len(),
        corpus.inline_block_count()
    );

    let stack = stack::detect_stack(&corpus, &tables.stack);
    let token_set = tokens::extract_tokens(&corpus);
    let typography_scale = typography::extract_type_scale(&corpus);
    let components = components::detect_components(&corpus, &tables.components);
    let accessibility = accessibility::detect_accessibility(&corpus);
    let layout = layout::analyze_layout(&corpus);

    tracing::info!(
        "Extraction complete: {} stack signal(s), {} color(s), {} font famil(ies), {} component kind(s)",
        stack.len(),
        token_set.colors.len(),
        token_set.typography.len(),
        components.len()
    );

    ExtractionResult {
        seed_url: session.seed_url.clone(),
        stack,
        colors: token_set.colors,
        typography: token_set.typography,
        typography_scale,
        radii: token_set.radii,
        shadows: token_set.shadows,
        custom_properties: token_set.custom_properties,
        components,
        accessibility,
        layout,
        risks: collect_risks(session, &corpus),
        notes: collect_notes(session, &corpus),
        pages_analyzed: corpus.pages.len(),
        stylesheets_analyzed: session.stylesheets.len(),
    }
}

/// Things a reader of the result should be warned about
///
/// The robots advisory (a blocking verdict included) reaches here through the
/// session warnings.
fn collect_risks(session: &CrawlSession, corpus: &Corpus<'_>) -> Vec<String> {
    let mut risks = session.warnings.clone();

    for page in session.pages.iter().filter(|page| !page.is_success()) {
        if let Some(error) = &page.error {
            risks.push(format!("{}: {}", page.url, error));
        }
    }

    if session.config.include_stylesheets && session.stylesheets.is_empty() {
        risks.push("no external stylesheets were analyzed".to_string());
    }

    match corpus.pages.len() {
        0 => risks.push("no pages were fetched successfully; results are empty".to_string()),
        1 => risks.push("only one page was analyzed".to_string()),
        _ => {}
    }

    dedupe_by(risks, |risk| risk.clone())
}

fn collect_notes(session: &CrawlSession, corpus: &Corpus<'_>) -> Vec<String> {
    let mut notes = Vec::new();

    let config_notes = session.config.notes.trim();
    if !config_notes.is_empty() {
        notes.push(config_notes.to_string());
    }

    notes.push(format!(
        "Analyzed {} of {} crawled page(s)",
        corpus.pages.len(),
        session.pages.len()
    ));
    notes.push(format!(
        "Analyzed {} external stylesheet(s) and {} inline style block(s)",
        session.stylesheets.len(),
        corpus.inline_block_count()
    ));
    notes.push(format!(
        "Crawl took {:.1}s with {} request(s)",
        session.elapsed.as_secs_f64(),
        session.total_requests
    ));

    notes
}
