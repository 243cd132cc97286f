use std::sync::Arc;

use super::*;
use crate::catalog::{default_corpus, Record};
use crate::error::CommandLibraryError;

fn opts() -> MatchOptions {
    MatchOptions::default()
}

fn corpus(records: Vec<Record>) -> Vec<Arc<Record>> {
    records.into_iter().map(Arc::new).collect()
}

fn ids(results: &[MatchResult]) -> Vec<u64> {
    results.iter().map(|r| r.record.id).collect()
}

fn span(start: usize, length: usize) -> Span {
    Span { start, length }
}

// ============================================
// fuzzy_match / match_field
// ============================================

#[test]
fn test_exact_match_scores_zero() {
    assert_eq!(fuzzy_match("git commit", "git commit", &opts()), Some(0.0));
    assert_eq!(fuzzy_match("docker run", "docker", &opts()), Some(0.0));
}

#[test]
fn test_match_is_case_insensitive() {
    assert_eq!(fuzzy_match("Docker", "dOCKER", &opts()), Some(0.0));
    let m = match_field("docker run", &CompiledQuery::new("DOCK"), &opts()).unwrap();
    assert_eq!(m.score, 0.0);
    assert_eq!(m.spans.as_slice(), &[span(0, 4)]);
}

#[test]
fn test_typo_within_threshold_matches() {
    let m = match_field("kubectl get pods", &CompiledQuery::new("kubctl"), &opts()).unwrap();
    assert!((m.score - 1.0 / 6.0).abs() < 1e-9);
    assert_eq!(m.spans.as_slice(), &[span(0, 3), span(4, 3)]);

    let score = fuzzy_match("docker", "dockr", &opts()).unwrap();
    assert!((score - 0.2).abs() < 1e-9);
}

#[test]
fn test_transposition_costs_two_edits() {
    // 2 / 10 is under the threshold, 2 / 6 is not
    let score = fuzzy_match("git commit", "gti commit", &opts()).unwrap();
    assert!((score - 0.2).abs() < 1e-9);
    assert_eq!(fuzzy_match("docker", "docekr", &opts()), None);
}

#[test]
fn test_no_match_above_threshold() {
    assert_eq!(fuzzy_match("docker run", "xyzzyq", &opts()), None);
    // Query longer than the field needs too many insertions
    assert_eq!(fuzzy_match("abc", "abcdef", &opts()), None);
}

#[test]
fn test_long_query_is_capped_before_matching() {
    let field = "abcdefghijklmnopqrstuvwxyzabcdef";
    let long_query = format!("{}{}", field, "q".repeat(3000));

    let compiled = CompiledQuery::new(&long_query);
    assert_eq!(compiled.char_len(), 32);
    assert_eq!(compiled.source().chars().count(), 3032);
    // Only the leading 32 chars are matched, so the tail is ignored
    assert_eq!(fuzzy_match(field, &long_query, &opts()), Some(0.0));

    let corpus = default_corpus().unwrap();
    let options = RankOptions::default();
    let results = rank(corpus.records(), &"x".repeat(3000), &options);
    assert!(results.is_empty());
}

#[test]
fn test_scores_are_monotonic_in_errors() {
    let exact = fuzzy_match("kubectl", "kubectl", &opts()).unwrap();
    let one = fuzzy_match("kubectl", "kubctl", &opts()).unwrap();
    let two = fuzzy_match("kubectl", "kbctl", &opts());
    assert!(exact < one);
    assert!(two.map_or(true, |s| s > one));
}

#[test]
fn test_scores_stay_in_unit_interval() {
    let lenient = MatchOptions {
        threshold: 1.0,
        ..opts()
    };
    for (text, query) in [("a", "zzzzzz"), ("", "abc"), ("hello", "help"), ("x y z", "xyz")] {
        let score = fuzzy_match(text, query, &lenient).unwrap();
        assert!((0.0..=1.0).contains(&score), "{text} / {query}: {score}");
    }
}

#[test]
fn test_empty_query_is_perfect_match() {
    assert_eq!(fuzzy_match("anything", "", &opts()), Some(0.0));
    assert_eq!(fuzzy_match("anything", "   ", &opts()), Some(0.0));
    let m = match_field("anything", &CompiledQuery::new(""), &opts()).unwrap();
    assert!(m.spans.is_empty());
}

#[test]
fn test_short_query_match_all_policy() {
    // Default policy: shorter than min_match_char_length matches everything
    assert_eq!(fuzzy_match("git", "x", &opts()), Some(0.0));
}

#[test]
fn test_short_query_score_normally_policy() {
    let options = MatchOptions {
        short_query: ShortQueryPolicy::ScoreNormally,
        ..opts()
    };
    assert_eq!(fuzzy_match("git", "x", &options), None);

    let m = match_field("git", &CompiledQuery::new("g"), &options).unwrap();
    assert_eq!(m.score, 0.0);
    // Single-char runs are below the minimum highlight length
    assert!(m.spans.is_empty());
}

#[test]
fn test_min_match_char_length_filters_spans() {
    let strict = MatchOptions {
        threshold: 1.0,
        ..opts()
    };
    let m = match_field("hello", &CompiledQuery::new("hel"), &strict).unwrap();
    assert_eq!(m.spans.as_slice(), &[span(0, 3)]);

    let m = match_field("xaxbxc", &CompiledQuery::new("abc"), &strict).unwrap();
    assert!(m.spans.is_empty());

    let keep_all = MatchOptions {
        min_match_char_length: 1,
        ..strict
    };
    let m = match_field("xaxbxc", &CompiledQuery::new("abc"), &keep_all).unwrap();
    assert!(!m.spans.is_empty());
    assert!(m.spans.iter().all(|s| s.length == 1));
}

#[test]
fn test_location_penalty_when_not_ignored() {
    let options = MatchOptions {
        ignore_location: false,
        ..opts()
    };
    // "world" starts at char 6: 6 / 100
    let score = fuzzy_match("hello world", "world", &options).unwrap();
    assert!((score - 0.06).abs() < 1e-9);
    assert_eq!(fuzzy_match("world hello", "world", &options), Some(0.0));
}

#[test]
fn test_zero_distance_requires_exact_location() {
    let options = MatchOptions {
        ignore_location: false,
        distance: 0,
        ..opts()
    };
    assert_eq!(fuzzy_match("hello world", "world", &options), None);
    assert_eq!(fuzzy_match("world hello", "world", &options), Some(0.0));
}

#[test]
fn test_field_norm() {
    assert_eq!(field_norm("git"), 1.0);
    assert_eq!(field_norm(""), 1.0);
    assert_eq!(field_norm("a b c d"), 0.5);
    assert_eq!(field_norm("a b"), 0.707);
}

#[test]
fn test_field_norm_penalizes_long_fields() {
    let options = MatchOptions {
        ignore_field_norm: false,
        ..opts()
    };
    // 0 + (0.3 - 0) * (1 - 0.5)
    let score = fuzzy_match("git commit changes now", "git", &options).unwrap();
    assert!((score - 0.15).abs() < 1e-9);
    assert_eq!(fuzzy_match("git", "git", &options), Some(0.0));
}

#[test]
fn test_unicode_spans_are_char_offsets() {
    let m = match_field("Café Crème", &CompiledQuery::new("CRÈME"), &opts()).unwrap();
    assert_eq!(m.score, 0.0);
    assert_eq!(m.spans.as_slice(), &[span(5, 5)]);

    let score = fuzzy_match("Café Crème", "creme", &opts()).unwrap();
    assert!((score - 0.2).abs() < 1e-9);
}

#[test]
fn test_compiled_query_trims_and_counts_chars() {
    let q = CompiledQuery::new("  Crème ");
    assert_eq!(q.source(), "Crème");
    assert_eq!(q.char_len(), 5);
    assert!(!q.is_empty());
    assert!(CompiledQuery::new(" \t ").is_empty());
}

#[test]
fn test_match_options_validate() {
    assert!(opts().validate().is_ok());
    for threshold in [-0.1, 1.5, f64::NAN] {
        let options = MatchOptions { threshold, ..opts() };
        assert!(matches!(
            options.validate(),
            Err(CommandLibraryError::InvalidThreshold(_))
        ));
    }
}

// ============================================
// rank
// ============================================

#[test]
fn test_rank_respects_top_k() {
    let corpus = default_corpus().unwrap();
    let options = RankOptions::new(default_weights(), opts(), 5).unwrap();
    for query in ["git", "docker", "g", "install", "kubctl", "zzzz"] {
        let results = rank(corpus.records(), query, &options);
        assert!(results.len() <= 5, "{query}");
    }
}

#[test]
fn test_rank_scores_never_exceed_threshold() {
    let corpus = default_corpus().unwrap();
    let options = RankOptions::default();
    for query in ["git commit", "docker", "dockr", "commit", "network", "pip"] {
        for result in rank(corpus.records(), query, &options) {
            assert!(result.score >= 0.0);
            assert!(result.score <= options.threshold(), "{query}: {}", result.score);
        }
    }
}

#[test]
fn test_rank_empty_query_returns_corpus_in_order() {
    let corpus = default_corpus().unwrap();
    let options = RankOptions::new(default_weights(), opts(), 3).unwrap();
    let results = rank(corpus.records(), "", &options);
    // top_k does not apply to the unscored listing
    assert_eq!(results.len(), corpus.len());
    assert_eq!(ids(&results), corpus.iter().map(|r| r.id).collect::<Vec<_>>());
    assert!(results.iter().all(|r| r.score == 0.0 && r.matched_spans.is_empty()));

    let again = rank(corpus.records(), "  ", &options);
    assert_eq!(ids(&again), ids(&results));
}

#[test]
fn test_rank_exact_name_beats_tag_only_match() {
    let corpus = default_corpus().unwrap();
    let results = rank(corpus.records(), "git commit", &RankOptions::default());
    assert_eq!(results[0].record.id, 4);
    assert!((results[0].score - 0.09).abs() < 1e-9);
    assert!(results[1..].iter().all(|r| r.score > results[0].score));
}

#[test]
fn test_rank_name_weight_outranks_tag_weight() {
    let records = corpus(vec![
        Record::new(1, "compose up", "start services", &["Docker"]),
        Record::new(2, "docker run", "launch a box", &["Container"]),
    ]);
    let results = rank(&records, "docker", &RankOptions::default());
    assert_eq!(ids(&results), vec![2, 1]);
    assert!((results[0].score - 0.09).abs() < 1e-9);
    assert!((results[1].score - 0.27).abs() < 1e-9);
    assert_eq!(results[1].spans(FieldKey::Tag(0)), &[span(0, 6)]);
    assert!(results[1].spans(FieldKey::Name).is_empty());
}

#[test]
fn test_rank_is_stable_for_equal_scores() {
    let records = corpus(vec![
        Record::new(30, "tar", "archive", &["Linux"]),
        Record::new(10, "tar", "archive", &["Linux"]),
        Record::new(20, "tar", "archive", &["Linux"]),
    ]);
    let results = rank(&records, "tar", &RankOptions::default());
    assert_eq!(ids(&results), vec![30, 10, 20]);

    let corpus = default_corpus().unwrap();
    let results = rank(corpus.records(), "docker", &RankOptions::default());
    assert_eq!(&ids(&results)[..5], &[14, 16, 20, 88, 89]);
}

#[test]
fn test_rank_top_k_larger_than_candidates() {
    let records = corpus(vec![
        Record::new(1, "git push", "upload", &["Git"]),
        Record::new(2, "ls", "list", &["Linux"]),
    ]);
    let options = RankOptions::new(default_weights(), opts(), 1000).unwrap();
    let results = rank(&records, "git push", &options);
    assert_eq!(ids(&results), vec![1]);
}

#[test]
fn test_rank_short_query_truncates_corpus_order() {
    let corpus = default_corpus().unwrap();
    let results = rank(corpus.records(), "g", &RankOptions::default());
    assert_eq!(results.len(), 50);
    assert_eq!(ids(&results), (1..=50).collect::<Vec<u64>>());
}

#[test]
fn test_rank_empty_corpus() {
    let results = rank(&[], "docker", &RankOptions::default());
    assert!(results.is_empty());
    assert!(rank(&[], "", &RankOptions::default()).is_empty());
}

#[test]
fn test_rank_no_match_is_empty_not_error() {
    let corpus = default_corpus().unwrap();
    assert!(rank(corpus.records(), "xyzzyq", &RankOptions::default()).is_empty());
}

#[test]
fn test_rank_zero_weight_field_is_ignored() {
    let records = corpus(vec![Record::new(1, "compose up", "start", &["Docker"])]);
    let weights = vec![
        FieldWeight::new(Field::Name, 1.0),
        FieldWeight::new(Field::Tags, 0.0),
    ];
    let options = RankOptions::new(weights, opts(), 10).unwrap();
    assert!(rank(&records, "docker", &options).is_empty());
}

#[test]
fn test_rank_blank_fields_do_not_dilute() {
    let records = corpus(vec![Record::new(1, "docker", "", &[])]);
    let results = rank(&records, "docker", &RankOptions::default());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 0.0);
}

#[test]
fn test_match_result_serializes_field_keys() {
    let records = corpus(vec![Record::new(7, "docker run", "run", &["Container", "Docker"])]);
    let results = rank(&records, "docker", &RankOptions::default());
    let json = serde_json::to_value(&results[0]).unwrap();
    assert_eq!(json["record"]["id"], 7);
    assert_eq!(json["matchedSpans"]["name"][0]["length"], 6);
    assert_eq!(json["matchedSpans"]["tags[1]"][0]["start"], 0);
}

// ============================================
// RankOptions validation
// ============================================

fn default_weights() -> Vec<FieldWeight> {
    crate::config::default_field_weights()
}

#[test]
fn test_rank_options_reject_zero_top_k() {
    assert!(matches!(
        RankOptions::new(default_weights(), opts(), 0),
        Err(CommandLibraryError::InvalidTopK)
    ));
}

#[test]
fn test_rank_options_reject_bad_weights() {
    let cases = vec![
        vec![],
        vec![FieldWeight::new(Field::Name, -1.0)],
        vec![FieldWeight::new(Field::Name, f64::NAN)],
        vec![FieldWeight::new(Field::Name, 0.0), FieldWeight::new(Field::Tags, 0.0)],
        vec![FieldWeight::new(Field::Name, 0.5), FieldWeight::new(Field::Name, 0.5)],
    ];
    for weights in cases {
        assert!(matches!(
            RankOptions::new(weights, opts(), 10),
            Err(CommandLibraryError::InvalidWeights { .. })
        ));
    }
}

#[test]
fn test_rank_options_reject_bad_threshold() {
    let matching = MatchOptions {
        threshold: 2.0,
        ..opts()
    };
    assert!(matches!(
        RankOptions::new(default_weights(), matching, 10),
        Err(CommandLibraryError::InvalidThreshold(_))
    ));
}

#[test]
fn test_rank_options_accept_unnormalized_weights() {
    let weights = vec![
        FieldWeight::new(Field::Name, 7.0),
        FieldWeight::new(Field::Description, 2.0),
        FieldWeight::new(Field::Tags, 1.0),
    ];
    let scaled = RankOptions::new(weights, opts(), 50).unwrap();
    let corpus = default_corpus().unwrap();
    let a = rank(corpus.records(), "git commit", &scaled);
    let b = rank(corpus.records(), "git commit", &RankOptions::default());
    assert_eq!(ids(&a), ids(&b));
}

// ============================================
// RankingEngine
// ============================================

#[test]
fn test_engine_reuses_compiled_query() {
    let mut engine = RankingEngine::new(RankOptions::default());
    let first = engine.compiled("docker");
    let second = engine.compiled("docker");
    assert!(Arc::ptr_eq(&first, &second));

    let other = engine.compiled("git");
    assert!(!Arc::ptr_eq(&first, &other));
    let back = engine.compiled("docker");
    assert!(!Arc::ptr_eq(&first, &back));
}

#[test]
fn test_engine_matches_free_function() {
    let corpus = default_corpus().unwrap();
    let mut engine = RankingEngine::new(RankOptions::default());
    for query in ["dockr", "dockr", "install", ""] {
        let cached = engine.rank(corpus.records(), query);
        let direct = rank(corpus.records(), query, engine.options());
        assert_eq!(ids(&cached), ids(&direct));
    }
}

// ============================================
// highlight
// ============================================

#[test]
fn test_segments_split_on_spans() {
    let segs = segments("docker run", &[span(0, 4)]);
    assert_eq!(
        segs,
        vec![
            Segment { text: "dock", emphasized: true },
            Segment { text: "er run", emphasized: false },
        ]
    );
}

#[test]
fn test_segments_unicode() {
    let segs = segments("Café Crème", &[span(5, 5)]);
    assert_eq!(segs[0], Segment { text: "Café ", emphasized: false });
    assert_eq!(segs[1], Segment { text: "Crème", emphasized: true });
    assert_eq!(segs.len(), 2);
}

#[test]
fn test_segments_without_spans_or_text() {
    assert_eq!(
        segments("plain", &[]),
        vec![Segment { text: "plain", emphasized: false }]
    );
    assert_eq!(segments("", &[]), vec![Segment { text: "", emphasized: false }]);
}

#[test]
fn test_segments_clip_overlap_and_out_of_range() {
    let segs = segments("abcdef", &[span(0, 3), span(2, 2), span(10, 4)]);
    let joined: String = segs.iter().map(|s| s.text).collect();
    assert_eq!(joined, "abcdef");
    assert_eq!(segs[0], Segment { text: "abc", emphasized: true });
    assert_eq!(segs[1], Segment { text: "d", emphasized: true });
    assert_eq!(segs[2], Segment { text: "ef", emphasized: false });
}

#[test]
fn test_mark_wraps_emphasis() {
    assert_eq!(
        mark("kubectl get pods", &[span(0, 3), span(4, 3)], "[", "]"),
        "[kub]e[ctl] get pods"
    );
}
