//! Search module - fuzzy matching and weighted ranking
//!
//! This module provides:
//! - Approximate (typo tolerant) scoring of one field against a query
//! - Weighted multi-field ranking with a stable, truncated result list
//! - Highlight segmentation from matched spans
//!
//! # Module Structure
//!
//! - `matcher` - Single-field scorer and compiled query
//! - `ranking` - RankOptions validation, rank(), RankingEngine with query cache
//! - `highlight` - Emphasis segments for a results renderer

mod highlight;
mod matcher;
mod ranking;

pub use highlight::{mark, segments, Segment};
pub use matcher::{
    fuzzy_match, match_field, CompiledQuery, FieldMatch, MatchOptions, ShortQueryPolicy, Span,
    Spans,
};
pub use ranking::{rank, Field, FieldKey, FieldWeight, MatchResult, RankOptions, RankingEngine};

#[cfg(test)]
pub(crate) use matcher::field_norm;

#[cfg(test)]
#[path = "../search_tests.rs"]
mod tests;
