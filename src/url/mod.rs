//! URL handling module for Design-Lens
//!
//! This module provides URL normalization and same-origin checks used by the
//! link parser and the crawl loop.

mod normalize;
mod origin;

// Re-export main functions
pub use normalize::{normalize_parsed, normalize_url, strip_query_and_fragment};
pub use origin::{origin_root, same_origin};
