//! Catalog module - the searchable records and category filtering
//!
//! # Module Structure
//!
//! - `types` - Record, Corpus and the tag-derived RecordKind
//! - `loader` - Embedded default catalog and JSON file loading
//! - `filter` - Category (tag) pre-filter applied before ranking

mod filter;
mod loader;
mod types;

pub use filter::{category_counts, filter_by_categories, toggle_category};
pub use loader::{corpus_from_records, default_corpus, load_catalog_file, parse_catalog};
pub use types::{Corpus, Record, RecordKind};

#[cfg(test)]
#[path = "../catalog_tests.rs"]
mod tests;
