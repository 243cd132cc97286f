//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

use crate::grid::Breakpoint;
use crate::search::{Field, FieldWeight};

/// Default field weights (relative, need not sum to 1)
pub const DEFAULT_NAME_WEIGHT: f64 = 0.7;
pub const DEFAULT_DESCRIPTION_WEIGHT: f64 = 0.2;
pub const DEFAULT_TAGS_WEIGHT: f64 = 0.1;

/// Default matcher settings
pub const DEFAULT_THRESHOLD: f64 = 0.3;
pub const DEFAULT_DISTANCE: u32 = 100;
pub const DEFAULT_LOCATION: usize = 0;
pub const DEFAULT_MIN_MATCH_CHAR_LENGTH: usize = 2;
pub const DEFAULT_IGNORE_LOCATION: bool = true;
pub const DEFAULT_IGNORE_FIELD_NORM: bool = true;

/// Query chars fed to the matcher; the rest of a longer query is ignored
pub const MAX_PATTERN_CHARS: usize = 32;

/// Maximum number of ranked results handed to the renderer
pub const DEFAULT_TOP_K: usize = 50;

/// Quiescence window before a typed query is ranked
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

/// Extra rows rendered above and below the visible window
pub const DEFAULT_OVERSCAN_ROWS: usize = 1;

/// Results grid sizing for the 1024..1536 band
pub const DEFAULT_MIN_CARD_WIDTH: f64 = 320.0;
pub const DEFAULT_MAX_CARD_WIDTH: f64 = 400.0;
pub const DEFAULT_CARD_HEIGHT: f64 = 180.0;
pub const DEFAULT_GRID_GAP: f64 = 16.0;

/// Vertical space reserved above the results grid (header, search bar, chips)
pub const DEFAULT_RESERVED_HEIGHT: f64 = 300.0;

/// Category chips offered to users
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Git",
    "Docker",
    "npm",
    "Node.js",
    "Linux",
    "Unix",
    "Kubernetes",
    "AWS",
    "Database",
    "Network",
    "Security",
    "Python",
    "Monitoring",
    "Package Manager",
];

pub fn default_field_weights() -> Vec<FieldWeight> {
    vec![
        FieldWeight::new(Field::Name, DEFAULT_NAME_WEIGHT),
        FieldWeight::new(Field::Description, DEFAULT_DESCRIPTION_WEIGHT),
        FieldWeight::new(Field::Tags, DEFAULT_TAGS_WEIGHT),
    ]
}

/// Breakpoints at 640 (phones), 1024 (tablets), 1536 (desktops), then open-ended.
pub fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint {
            max_width: Some(640.0),
            min_card_width: 260.0,
            max_card_width: 640.0,
            card_height: 200.0,
            gap: 12.0,
        },
        Breakpoint {
            max_width: Some(1024.0),
            min_card_width: 300.0,
            max_card_width: 400.0,
            card_height: 190.0,
            gap: DEFAULT_GRID_GAP,
        },
        Breakpoint {
            max_width: Some(1536.0),
            min_card_width: DEFAULT_MIN_CARD_WIDTH,
            max_card_width: DEFAULT_MAX_CARD_WIDTH,
            card_height: DEFAULT_CARD_HEIGHT,
            gap: DEFAULT_GRID_GAP,
        },
        Breakpoint {
            max_width: None,
            min_card_width: DEFAULT_MIN_CARD_WIDTH,
            max_card_width: 440.0,
            card_height: DEFAULT_CARD_HEIGHT,
            gap: 20.0,
        },
    ]
}
