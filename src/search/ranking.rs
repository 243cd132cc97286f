//! Weighted multi-field ranking
//!
//! Each record is matched field by field, the per-field scores are folded
//! into one aggregate, survivors are stably sorted (best first) and the list
//! is cut to `top_k`.
//!
//! # Aggregate score
//!
//! A matched field contributes `quality = (threshold - score) / threshold`
//! (1.0 for a perfect match, 0.0 for a match right at the threshold); an
//! unmatched field contributes nothing. Qualities are summed with their
//! field weights and divided by the total weight of the fields the record
//! actually has text for, giving `Q` in `[0, 1]`. The aggregate is
//! `threshold * (1 - Q)`, so it is never above the threshold, it rises with
//! every field's dissimilarity, and a high-weight field outranks a low-weight
//! one for an equally good match.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

use super::matcher::{match_field, CompiledQuery, MatchOptions, Span, Spans};
use crate::catalog::Record;
use crate::error::{CommandLibraryError, Result};

/// A searchable record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Description,
    Tags,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Tags => "tags",
        }
    }
}

/// Relative weight of one field. Weights need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeight {
    pub name: Field,
    pub weight: f64,
}

impl FieldWeight {
    pub fn new(name: Field, weight: f64) -> Self {
        Self { name, weight }
    }
}

/// Where a span was found. Tags are addressed individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Name,
    Description,
    Tag(usize),
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Name => f.write_str("name"),
            FieldKey::Description => f.write_str("description"),
            FieldKey::Tag(index) => write!(f, "tags[{}]", index),
        }
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One ranked record. Created per ranking pass, discarded after render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub record: Arc<Record>,
    pub score: f64,
    pub matched_spans: BTreeMap<FieldKey, Spans>,
}

impl MatchResult {
    fn unscored(record: &Arc<Record>) -> Self {
        Self {
            record: Arc::clone(record),
            score: 0.0,
            matched_spans: BTreeMap::new(),
        }
    }

    pub fn spans(&self, key: FieldKey) -> &[Span] {
        self.matched_spans
            .get(&key)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }
}

// ============================================
// OPTIONS
// ============================================

/// Validated ranking configuration. Construction is the call boundary where
/// malformed weight tables, thresholds and `top_k` values are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct RankOptions {
    weights: Vec<FieldWeight>,
    matching: MatchOptions,
    top_k: usize,
}

impl RankOptions {
    pub fn new(weights: Vec<FieldWeight>, matching: MatchOptions, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(CommandLibraryError::InvalidTopK);
        }
        matching.validate()?;
        validate_weights(&weights)?;
        Ok(Self {
            weights,
            matching,
            top_k,
        })
    }

    pub fn weights(&self) -> &[FieldWeight] {
        &self.weights
    }

    pub fn matching(&self) -> &MatchOptions {
        &self.matching
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn threshold(&self) -> f64 {
        self.matching.threshold
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        use crate::config::defaults::*;
        Self {
            weights: default_field_weights(),
            matching: MatchOptions::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

fn validate_weights(weights: &[FieldWeight]) -> Result<()> {
    if weights.is_empty() {
        return Err(CommandLibraryError::InvalidWeights {
            field: "*".into(),
            reason: "at least one weighted field is required".into(),
        });
    }

    for (i, fw) in weights.iter().enumerate() {
        let field = fw.name.as_str().to_string();
        if !fw.weight.is_finite() {
            return Err(CommandLibraryError::InvalidWeights {
                field,
                reason: format!("weight must be finite, got {}", fw.weight),
            });
        }
        if fw.weight < 0.0 {
            return Err(CommandLibraryError::InvalidWeights {
                field,
                reason: format!("weight must not be negative, got {}", fw.weight),
            });
        }
        if weights[..i].iter().any(|other| other.name == fw.name) {
            return Err(CommandLibraryError::InvalidWeights {
                field,
                reason: "field listed more than once".into(),
            });
        }
    }

    if weights.iter().all(|fw| fw.weight == 0.0) {
        return Err(CommandLibraryError::InvalidWeights {
            field: "*".into(),
            reason: "at least one weight must be positive".into(),
        });
    }
    Ok(())
}

// ============================================
// RANKING
// ============================================

/// Rank `records` against `query`.
///
/// A blank query skips scoring and returns every record, in order, without
/// applying `top_k`. Otherwise only records with at least one matching field
/// survive, sorted ascending by aggregate score with insertion order breaking
/// ties, truncated to `top_k`.
pub fn rank(records: &[Arc<Record>], query: &str, options: &RankOptions) -> Vec<MatchResult> {
    rank_compiled(records, &CompiledQuery::new(query), options)
}

pub(crate) fn rank_compiled(
    records: &[Arc<Record>],
    query: &CompiledQuery,
    options: &RankOptions,
) -> Vec<MatchResult> {
    if query.is_empty() {
        return records.iter().map(MatchResult::unscored).collect();
    }

    let mut matches: Vec<MatchResult> = records
        .iter()
        .filter_map(|record| score_record(record, query, options))
        .collect();

    // sort_by is stable: equal scores keep corpus order
    matches.sort_by(|a, b| a.score.total_cmp(&b.score));
    matches.truncate(options.top_k);
    matches
}

fn score_record(
    record: &Arc<Record>,
    query: &CompiledQuery,
    options: &RankOptions,
) -> Option<MatchResult> {
    let threshold = options.threshold();
    let matching = options.matching();

    let mut total_weight = 0.0;
    let mut weighted_quality = 0.0;
    let mut any_match = false;
    let mut matched_spans = BTreeMap::new();

    for fw in options.weights().iter().filter(|fw| fw.weight > 0.0) {
        let best = match fw.name {
            Field::Name | Field::Description => {
                let (text, key) = if fw.name == Field::Name {
                    (record.name.as_str(), FieldKey::Name)
                } else {
                    (record.description.as_str(), FieldKey::Description)
                };
                if text.trim().is_empty() {
                    continue;
                }
                match_field(text, query, matching).map(|m| {
                    if !m.spans.is_empty() {
                        matched_spans.insert(key, m.spans);
                    }
                    m.score
                })
            }
            Field::Tags => {
                if record.tags.iter().all(|t| t.trim().is_empty()) {
                    continue;
                }
                let mut best: Option<f64> = None;
                for (index, tag) in record.tags.iter().enumerate() {
                    if let Some(m) = match_field(tag, query, matching) {
                        if !m.spans.is_empty() {
                            matched_spans.insert(FieldKey::Tag(index), m.spans);
                        }
                        best = Some(best.map_or(m.score, |b: f64| b.min(m.score)));
                    }
                }
                best
            }
        };

        total_weight += fw.weight;
        if let Some(score) = best {
            any_match = true;
            weighted_quality += fw.weight * quality(score, threshold);
        }
    }

    if !any_match || total_weight <= 0.0 {
        return None;
    }

    let aggregate = threshold * (1.0 - (weighted_quality / total_weight).clamp(0.0, 1.0));
    Some(MatchResult {
        record: Arc::clone(record),
        score: aggregate,
        matched_spans,
    })
}

#[inline]
fn quality(score: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        // Only perfect matches pass a zero threshold
        return 1.0;
    }
    ((threshold - score) / threshold).clamp(0.0, 1.0)
}

// ============================================
// ENGINE (with compiled query cache)
// ============================================

/// Ranking engine holding validated options and a single-entry compiled
/// query cache keyed by the raw query string.
///
/// Ranking the same query repeatedly (category toggles, resizes that
/// re-request results) reuses the compiled query instead of rebuilding it.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    options: RankOptions,
    cache: Option<(String, Arc<CompiledQuery>)>,
}

impl RankingEngine {
    pub fn new(options: RankOptions) -> Self {
        Self {
            options,
            cache: None,
        }
    }

    pub fn options(&self) -> &RankOptions {
        &self.options
    }

    /// Compiled query for `query`, rebuilt only when the query text changes.
    pub fn compiled(&mut self, query: &str) -> Arc<CompiledQuery> {
        if let Some((key, compiled)) = &self.cache {
            if key == query {
                return Arc::clone(compiled);
            }
        }
        let compiled = Arc::new(CompiledQuery::new(query));
        self.cache = Some((query.to_string(), Arc::clone(&compiled)));
        compiled
    }

    pub fn rank(&mut self, records: &[Arc<Record>], query: &str) -> Vec<MatchResult> {
        let compiled = self.compiled(query);
        rank_compiled(records, &compiled, &self.options)
    }
}
