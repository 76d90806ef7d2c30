use std::collections::HashSet;
use std::hash::Hash;

/// Keeps the first item for each distinct key, preserving order
///
/// Later items with an already-seen key are dropped. Running it again on its
/// own output returns the same sequence.
pub fn dedupe_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}
