use super::defaults::*;
use super::*;
use crate::search::{Field, FieldWeight, ShortQueryPolicy};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.search.threshold, 0.3);
    assert_eq!(config.search.distance, 100);
    assert_eq!(config.search.min_match_char_length, 2);
    assert!(config.search.ignore_location);
    assert!(config.search.ignore_field_norm);
    assert_eq!(config.search.top_k, 50);
    assert_eq!(config.debounce_window(), Duration::from_millis(150));
    assert_eq!(config.grid.overscan_rows, 1);
    assert_eq!(config.categories.len(), DEFAULT_CATEGORIES.len());
}

#[test]
fn test_default_config_validates() {
    Config::default().validate().expect("defaults must be valid");
}

#[test]
fn test_default_weights_order_and_values() {
    let weights = default_field_weights();
    assert_eq!(
        weights,
        vec![
            FieldWeight::new(Field::Name, 0.7),
            FieldWeight::new(Field::Description, 0.2),
            FieldWeight::new(Field::Tags, 0.1),
        ]
    );
}

#[test]
fn test_empty_json_uses_defaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.search.top_k, DEFAULT_TOP_K);
    assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
    assert_eq!(config.grid.breakpoints.len(), default_breakpoints().len());
}

#[test]
fn test_partial_json_overrides() {
    let json = r#"{
        "search": {
            "threshold": 0.4,
            "topK": 10,
            "shortQuery": "scoreNormally",
            "keys": [{"name": "name", "weight": 2.0}, {"name": "tags", "weight": 1.0}]
        },
        "debounceMs": 80,
        "grid": {"overscanRows": 3}
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.search.threshold, 0.4);
    assert_eq!(config.search.top_k, 10);
    assert_eq!(config.search.short_query, ShortQueryPolicy::ScoreNormally);
    assert_eq!(config.search.keys.len(), 2);
    assert_eq!(config.search.distance, DEFAULT_DISTANCE);
    assert_eq!(config.debounce_ms, 80);
    assert_eq!(config.grid.overscan_rows, 3);

    let options = config.rank_options().unwrap();
    assert_eq!(options.top_k(), 10);
    assert_eq!(options.threshold(), 0.4);
}

#[test]
fn test_breakpoint_json_without_max_width() {
    let json = r#"{"grid": {"breakpoints": [
        {"maxWidth": 800, "minCardWidth": 200, "maxCardWidth": 300, "cardHeight": 150, "gap": 8},
        {"minCardWidth": 320, "maxCardWidth": 400, "cardHeight": 180, "gap": 16}
    ]}}"#;
    let config: Config = serde_json::from_str(json).unwrap();
    let table = config.breakpoint_table().unwrap();
    assert_eq!(table.entries().len(), 2);
    assert_eq!(table.entries()[1].max_width, None);
}

#[test]
fn test_validate_rejects_zero_top_k() {
    let mut config = Config::default();
    config.search.top_k = 0;
    assert!(matches!(
        config.validate(),
        Err(crate::error::CommandLibraryError::InvalidTopK)
    ));
}

#[test]
fn test_validate_rejects_negative_weight() {
    let mut config = Config::default();
    config.search.keys[1].weight = -0.5;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("description"));
}

#[test]
fn test_validate_rejects_empty_breakpoints() {
    let mut config = Config::default();
    config.grid.breakpoints.clear();
    assert!(matches!(
        config.validate(),
        Err(crate::error::CommandLibraryError::InvalidBreakpoints(_))
    ));
}

#[test]
fn test_validate_rejects_bad_reserved_height() {
    let mut config = Config::default();
    config.grid.reserved_height = -1.0;
    assert!(matches!(
        config.validate(),
        Err(crate::error::CommandLibraryError::Config(_))
    ));
}

#[test]
fn test_validate_rejects_zero_min_match_char_length() {
    let mut config = Config::default();
    config.search.min_match_char_length = 0;
    assert!(matches!(
        config.validate(),
        Err(crate::error::CommandLibraryError::InvalidOptions(_))
    ));
}

#[test]
fn test_negative_top_k_is_a_parse_error() {
    let result = serde_json::from_str::<Config>(r#"{"search": {"topK": -1}}"#);
    assert!(result.is_err());
}

#[test]
fn test_load_config_missing_file_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(Some(&dir.path().join("config.json")));
    assert_eq!(config.search.top_k, DEFAULT_TOP_K);
}

#[test]
fn test_load_config_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"debounceMs": 42, "search": {{"topK": 7}}}}"#).unwrap();
    let config = load_config(Some(file.path()));
    assert_eq!(config.debounce_ms, 42);
    assert_eq!(config.search.top_k, 7);
}

#[test]
fn test_load_config_malformed_file_returns_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"search": {{"keys": [{{"name": "title", "weight": 1}}]}}}}"#).unwrap();
    let config = load_config(Some(file.path()));
    assert_eq!(config.search.keys, default_field_weights());
}

#[test]
fn test_config_serialization_roundtrip() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();
    let back: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(back.search.keys, config.search.keys);
    assert_eq!(back.grid.breakpoints, config.grid.breakpoints);
    assert_eq!(back.categories, config.categories);
}

#[test]
fn test_default_config_path_file_name() {
    let path = default_config_path();
    assert!(path.ends_with(".command-library/config.json"));
}
