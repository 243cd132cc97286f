//! Category pre-filter, applied before ranking.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::types::Record;

/// Keep records carrying at least one selected tag (OR across categories).
///
/// An empty selection passes every record through unchanged, in order.
pub fn filter_by_categories(
    records: &[Arc<Record>],
    selected: &BTreeSet<String>,
) -> Vec<Arc<Record>> {
    if selected.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| record.tags.iter().any(|tag| selected.contains(tag)))
        .cloned()
        .collect()
}

/// Count how many records carry each category, in the order given.
pub fn category_counts<'a>(
    records: &[Arc<Record>],
    categories: &'a [String],
) -> Vec<(&'a str, usize)> {
    categories
        .iter()
        .map(|category| {
            let count = records.iter().filter(|r| r.has_tag(category)).count();
            (category.as_str(), count)
        })
        .collect()
}

/// Toggle a category in the selection; returns the new selection.
pub fn toggle_category(selected: &BTreeSet<String>, category: &str) -> BTreeSet<String> {
    let mut next = selected.clone();
    if !next.remove(category) {
        next.insert(category.to_string());
    }
    next
}
