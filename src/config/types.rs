//! Configuration type definitions
//!
//! Every field is optional in the JSON file; missing fields take the values
//! in `defaults`. Validation into runtime types happens in `Config` methods
//! so a malformed table fails at startup, not mid-search.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::error::{CommandLibraryError, Result};
use crate::grid::{Breakpoint, BreakpointTable};
use crate::search::{FieldWeight, MatchOptions, RankOptions, ShortQueryPolicy};

// ============================================
// SEARCH CONFIG
// ============================================

/// Fuzzy matching and ranking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Weighted fields (default: name 0.7, description 0.2, tags 0.1)
    #[serde(default = "default_field_weights")]
    pub keys: Vec<FieldWeight>,
    /// Maximum accepted dissimilarity in [0, 1] (default: 0.3)
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Proximity decay distance in chars (default: 100)
    #[serde(default = "default_distance")]
    pub distance: u32,
    /// Expected match offset when location is not ignored (default: 0)
    #[serde(default)]
    pub location: usize,
    /// Shortest query / highlight run considered (default: 2)
    #[serde(default = "default_min_match_char_length")]
    pub min_match_char_length: usize,
    /// Score independent of where the match occurs (default: true)
    #[serde(default = "default_ignore_location")]
    pub ignore_location: bool,
    /// Do not penalize longer fields (default: true)
    #[serde(default = "default_ignore_field_norm")]
    pub ignore_field_norm: bool,
    /// Behaviour for queries shorter than min_match_char_length (default: matchAll)
    #[serde(default)]
    pub short_query: ShortQueryPolicy,
    /// Maximum results returned for a non-empty query (default: 50)
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_distance() -> u32 {
    DEFAULT_DISTANCE
}
fn default_min_match_char_length() -> usize {
    DEFAULT_MIN_MATCH_CHAR_LENGTH
}
fn default_ignore_location() -> bool {
    DEFAULT_IGNORE_LOCATION
}
fn default_ignore_field_norm() -> bool {
    DEFAULT_IGNORE_FIELD_NORM
}
fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            keys: default_field_weights(),
            threshold: DEFAULT_THRESHOLD,
            distance: DEFAULT_DISTANCE,
            location: DEFAULT_LOCATION,
            min_match_char_length: DEFAULT_MIN_MATCH_CHAR_LENGTH,
            ignore_location: DEFAULT_IGNORE_LOCATION,
            ignore_field_norm: DEFAULT_IGNORE_FIELD_NORM,
            short_query: ShortQueryPolicy::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl SearchConfig {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            threshold: self.threshold,
            distance: self.distance,
            location: self.location,
            min_match_char_length: self.min_match_char_length,
            ignore_location: self.ignore_location,
            ignore_field_norm: self.ignore_field_norm,
            short_query: self.short_query,
        }
    }
}

// ============================================
// GRID CONFIG
// ============================================

/// Results grid settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    /// Breakpoint table, ascending by maxWidth; last entry may omit maxWidth
    #[serde(default = "default_breakpoints")]
    pub breakpoints: Vec<Breakpoint>,
    /// Rows rendered beyond the visible window on each side (default: 1)
    #[serde(default = "default_overscan_rows")]
    pub overscan_rows: usize,
    /// Height reserved above the grid when sizing it to the window (default: 300)
    #[serde(default = "default_reserved_height")]
    pub reserved_height: f64,
}

fn default_overscan_rows() -> usize {
    DEFAULT_OVERSCAN_ROWS
}
fn default_reserved_height() -> f64 {
    DEFAULT_RESERVED_HEIGHT
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            breakpoints: default_breakpoints(),
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
            reserved_height: DEFAULT_RESERVED_HEIGHT,
        }
    }
}

// ============================================
// MAIN CONFIG
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub grid: GridConfig,
    /// Quiescence window for typed queries in milliseconds (default: 150)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Category chips shown to users
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            search: SearchConfig::default(),
            grid: GridConfig::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            categories: default_categories(),
        }
    }
}

impl Config {
    /// Validated ranking options, or a descriptive error for malformed weights,
    /// thresholds or top_k.
    pub fn rank_options(&self) -> Result<RankOptions> {
        RankOptions::new(
            self.search.keys.clone(),
            self.search.match_options(),
            self.search.top_k,
        )
    }

    /// Validated breakpoint table.
    pub fn breakpoint_table(&self) -> Result<BreakpointTable> {
        BreakpointTable::new(self.grid.breakpoints.clone())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Validate every table without building anything else.
    pub fn validate(&self) -> Result<()> {
        self.rank_options()?;
        self.breakpoint_table()?;
        let reserved = self.grid.reserved_height;
        if !reserved.is_finite() || reserved < 0.0 {
            return Err(CommandLibraryError::Config(format!(
                "grid.reservedHeight must be a non-negative number, got {}",
                reserved
            )));
        }
        Ok(())
    }
}
