//! Approximate single-field matching
//!
//! Scores one text field against a query. Scores are dissimilarities in
//! `[0, 1]`: 0 is a perfect match and anything above the configured threshold
//! is reported as no match.
//!
//! The score comes from the minimum edit distance between the query and the
//! best-aligned substring of the field (free start and end in the field),
//! divided by the query length. When location matters, the distance between
//! the expected and actual alignment start is added, scaled by `distance`.
//! Matching folds case one char at a time so span offsets stay aligned with
//! the original text's char indices.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{CommandLibraryError, Result};

/// What to do with queries shorter than `min_match_char_length`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShortQueryPolicy {
    /// Short queries match every field with a perfect score.
    #[default]
    MatchAll,
    /// Short queries are scored like any other; the minimum length only
    /// drops highlight spans shorter than it.
    ScoreNormally,
}

/// Tunables for a single field match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    /// Maximum acceptable score; anything above is no match.
    pub threshold: f64,
    /// Offset (in chars) over which the proximity penalty reaches 1.0.
    pub distance: u32,
    /// Expected char offset of the match when location is not ignored.
    pub location: usize,
    pub min_match_char_length: usize,
    pub ignore_location: bool,
    pub ignore_field_norm: bool,
    pub short_query: ShortQueryPolicy,
}

impl Default for MatchOptions {
    fn default() -> Self {
        use crate::config::defaults::*;
        Self {
            threshold: DEFAULT_THRESHOLD,
            distance: DEFAULT_DISTANCE,
            location: DEFAULT_LOCATION,
            min_match_char_length: DEFAULT_MIN_MATCH_CHAR_LENGTH,
            ignore_location: DEFAULT_IGNORE_LOCATION,
            ignore_field_norm: DEFAULT_IGNORE_FIELD_NORM,
            short_query: ShortQueryPolicy::default(),
        }
    }
}

impl MatchOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(CommandLibraryError::InvalidThreshold(self.threshold));
        }
        if self.min_match_char_length == 0 {
            return Err(CommandLibraryError::InvalidOptions(
                "minMatchCharLength must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// A run of matched chars: `start` and `length` are char counts, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub length: usize,
}

impl Span {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

pub type Spans = SmallVec<[Span; 4]>;

/// Result of matching one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub score: f64,
    pub spans: Spans,
}

impl FieldMatch {
    fn perfect() -> Self {
        Self {
            score: 0.0,
            spans: Spans::new(),
        }
    }
}

/// A query prepared for matching: trimmed and case-folded once, reused
/// across every field of every record in a ranking pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    source: String,
    folded: Vec<char>,
}

impl CompiledQuery {
    /// Only the first `MAX_PATTERN_CHARS` chars take part in matching.
    pub fn new(query: &str) -> Self {
        let source = query.trim().to_string();
        let folded = source
            .chars()
            .take(crate::config::defaults::MAX_PATTERN_CHARS)
            .map(fold_char)
            .collect();
        Self { source, folded }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    pub fn char_len(&self) -> usize {
        self.folded.len()
    }
}

#[inline]
fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Score `text` against `query`. Returns `None` for no match.
///
/// Pure: identical inputs always give identical output.
pub fn fuzzy_match(text: &str, query: &str, options: &MatchOptions) -> Option<f64> {
    match_field(text, &CompiledQuery::new(query), options).map(|m| m.score)
}

/// Score `text` against a compiled query, including matched spans.
pub fn match_field(text: &str, query: &CompiledQuery, options: &MatchOptions) -> Option<FieldMatch> {
    let pattern = &query.folded;
    if pattern.is_empty() {
        return Some(FieldMatch::perfect());
    }
    if pattern.len() < options.min_match_char_length
        && options.short_query == ShortQueryPolicy::MatchAll
    {
        return Some(FieldMatch::perfect());
    }

    let haystack: Vec<char> = text.chars().map(fold_char).collect();
    let alignment = best_alignment(&haystack, pattern, options);
    if alignment.score > options.threshold {
        return None;
    }

    // Longer fields drift toward the threshold but never past it
    let score = if options.ignore_field_norm {
        alignment.score
    } else {
        let norm = field_norm(text);
        alignment.score + (options.threshold - alignment.score) * (1.0 - norm)
    };

    Some(FieldMatch {
        score,
        spans: merge_positions(&alignment.matched, options.min_match_char_length),
    })
}

/// 1 / sqrt(word count), rounded to three decimals. 1.0 for single words.
pub(crate) fn field_norm(text: &str) -> f64 {
    let tokens = text.split_whitespace().count().max(1) as f64;
    (1000.0 / tokens.sqrt()).round() / 1000.0
}

// ============================================
// ALIGNMENT
// ============================================

const DIAG: u8 = 0;
const UP: u8 = 1;
const LEFT: u8 = 2;

struct Alignment {
    score: f64,
    /// Haystack char indices where a query char matched exactly, ascending.
    matched: Vec<usize>,
}

/// Approximate substring alignment (Sellers): row 0 is free so the match may
/// start anywhere in the haystack; the best end column is picked by score.
fn best_alignment(haystack: &[char], pattern: &[char], options: &MatchOptions) -> Alignment {
    let m = pattern.len();
    let n = haystack.len();
    let width = n + 1;

    let mut cost = vec![0u32; (m + 1) * width];
    let mut origin = vec![0usize; (m + 1) * width];
    let mut step = vec![DIAG; (m + 1) * width];

    for (j, o) in origin.iter_mut().enumerate().take(width) {
        *o = j;
    }

    for i in 1..=m {
        let row = i * width;
        let prev = (i - 1) * width;
        cost[row] = i as u32;
        step[row] = UP;

        for j in 1..=n {
            let diag = cost[prev + j - 1] + u32::from(pattern[i - 1] != haystack[j - 1]);
            let up = cost[prev + j] + 1;
            let left = cost[row + j - 1] + 1;

            let (best, dir, from) = if diag <= up && diag <= left {
                (diag, DIAG, origin[prev + j - 1])
            } else if up <= left {
                (up, UP, origin[prev + j])
            } else {
                (left, LEFT, origin[row + j - 1])
            };
            cost[row + j] = best;
            step[row + j] = dir;
            origin[row + j] = from;
        }
    }

    let last = m * width;
    let mut best_score = f64::INFINITY;
    let mut best_end = 0;
    for j in 0..=n {
        let score = compute_score(cost[last + j], m, origin[last + j], options);
        if score < best_score {
            best_score = score;
            best_end = j;
        }
    }

    let mut matched = Vec::with_capacity(m);
    let (mut i, mut j) = (m, best_end);
    while i > 0 {
        match step[i * width + j] {
            DIAG => {
                if pattern[i - 1] == haystack[j - 1] {
                    matched.push(j - 1);
                }
                i -= 1;
                j -= 1;
            }
            UP => i -= 1,
            _ => j -= 1,
        }
    }
    matched.reverse();

    Alignment {
        score: best_score,
        matched,
    }
}

fn compute_score(errors: u32, pattern_len: usize, location: usize, options: &MatchOptions) -> f64 {
    let accuracy = f64::from(errors) / pattern_len as f64;
    if options.ignore_location {
        return accuracy.min(1.0);
    }

    let proximity = location.abs_diff(options.location);
    if options.distance == 0 {
        return if proximity == 0 { accuracy.min(1.0) } else { 1.0 };
    }
    (accuracy + proximity as f64 / f64::from(options.distance)).min(1.0)
}

fn merge_positions(positions: &[usize], min_len: usize) -> Spans {
    let min_len = min_len.max(1);
    let mut spans = Spans::new();
    let mut iter = positions.iter().copied();
    let Some(first) = iter.next() else {
        return spans;
    };

    let mut current = Span {
        start: first,
        length: 1,
    };
    for pos in iter {
        if pos == current.end() {
            current.length += 1;
        } else {
            if current.length >= min_len {
                spans.push(current);
            }
            current = Span {
                start: pos,
                length: 1,
            };
        }
    }
    if current.length >= min_len {
        spans.push(current);
    }
    spans
}
