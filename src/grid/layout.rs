//! Responsive grid layout
//!
//! Pure mapping from viewport width and item count to grid geometry. Safe to
//! call on every resize frame: no hidden state, no accumulated drift.

use serde::{Deserialize, Serialize};

use crate::error::{CommandLibraryError, Result};

/// One row of the breakpoint table.
///
/// `max_width` is exclusive; `None` means unbounded and is only allowed on
/// the last entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    #[serde(default)]
    pub max_width: Option<f64>,
    pub min_card_width: f64,
    pub max_card_width: f64,
    pub card_height: f64,
    pub gap: f64,
}

/// Validated, ascending breakpoint table.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable {
    entries: Vec<Breakpoint>,
}

impl BreakpointTable {
    pub fn new(entries: Vec<Breakpoint>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CommandLibraryError::InvalidBreakpoints(
                "table must have at least one entry".into(),
            ));
        }

        let last = entries.len() - 1;
        let mut previous: Option<f64> = None;
        for (i, bp) in entries.iter().enumerate() {
            let invalid = |reason: String| {
                Err(CommandLibraryError::InvalidBreakpoints(format!(
                    "entry {}: {}",
                    i, reason
                )))
            };

            let sizes = [bp.min_card_width, bp.max_card_width, bp.card_height, bp.gap];
            if sizes.iter().any(|v| !v.is_finite()) {
                return invalid("sizes must be finite".into());
            }
            if bp.min_card_width <= 0.0 {
                return invalid(format!("minCardWidth must be positive, got {}", bp.min_card_width));
            }
            if bp.max_card_width < bp.min_card_width {
                return invalid(format!(
                    "maxCardWidth {} is below minCardWidth {}",
                    bp.max_card_width, bp.min_card_width
                ));
            }
            if bp.card_height <= 0.0 {
                return invalid(format!("cardHeight must be positive, got {}", bp.card_height));
            }
            if bp.gap < 0.0 {
                return invalid(format!("gap must not be negative, got {}", bp.gap));
            }

            match bp.max_width {
                Some(w) if !w.is_finite() => return invalid("maxWidth must be finite".into()),
                Some(w) => {
                    if previous.is_some_and(|p| w <= p) {
                        return invalid("maxWidth values must be strictly ascending".into());
                    }
                    previous = Some(w);
                }
                None if i != last => {
                    return invalid("only the last entry may omit maxWidth".into());
                }
                None => {}
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Breakpoint] {
        &self.entries
    }

    /// First entry whose `max_width` exceeds `viewport_width`, else the last.
    pub fn select(&self, viewport_width: f64) -> &Breakpoint {
        self.entries
            .iter()
            .find(|bp| bp.max_width.map_or(true, |max| max > viewport_width))
            .unwrap_or(&self.entries[self.entries.len() - 1])
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self {
            entries: crate::config::default_breakpoints(),
        }
    }
}

/// Grid geometry for one (viewport width, item count) pair.
///
/// Never mutated in place; a resize or a new result list produces a new one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridGeometry {
    pub column_count: usize,
    pub card_width: f64,
    pub card_height: f64,
    pub gap: f64,
    pub row_count: usize,
    /// Item count the geometry was computed for
    pub item_count: usize,
}

/// Absolute position of one card inside the grid's scroll content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl GridGeometry {
    /// Vertical distance between consecutive row tops.
    pub fn row_stride(&self) -> f64 {
        self.card_height + self.gap
    }

    /// Horizontal distance between consecutive column lefts.
    pub fn column_stride(&self) -> f64 {
        self.card_width + self.gap
    }

    /// Total scrollable height of all rows.
    pub fn content_height(&self) -> f64 {
        self.row_count as f64 * self.row_stride()
    }

    /// Height to give the grid viewport inside a window: the window minus the
    /// reserved chrome, but no taller than the content.
    pub fn viewport_height(&self, window_height: f64, reserved_height: f64) -> f64 {
        (window_height - reserved_height)
            .min(self.content_height())
            .max(0.0)
    }

    /// Card rectangle for a cell; every cell is inset by one gap on the top
    /// and left of its slot.
    pub fn cell_rect(&self, row: usize, column: usize) -> CellRect {
        CellRect {
            left: column as f64 * self.column_stride() + self.gap,
            top: row as f64 * self.row_stride() + self.gap,
            width: self.card_width,
            height: self.card_height,
        }
    }
}

/// Compute grid geometry.
///
/// ```text
/// columnCount = max(1, floor((width + gap) / (minCardWidth + gap)))
/// cardWidth   = min(maxCardWidth, floor((width - gap*(columnCount+1)) / columnCount))
/// rowCount    = ceil(itemCount / columnCount)
/// ```
///
/// Non-finite widths are treated as 0. Card width never goes below 0.
pub fn layout(viewport_width: f64, item_count: usize, table: &BreakpointTable) -> GridGeometry {
    let width = if viewport_width.is_finite() {
        viewport_width
    } else {
        0.0
    };
    let bp = table.select(width);

    // min_card_width > 0 and gap >= 0 are guaranteed by BreakpointTable::new
    let fitting = ((width + bp.gap) / (bp.min_card_width + bp.gap)).floor();
    let column_count = if fitting >= 1.0 { fitting as usize } else { 1 };

    let available = width - bp.gap * (column_count as f64 + 1.0);
    let card_width = (available / column_count as f64)
        .floor()
        .min(bp.max_card_width)
        .max(0.0);

    GridGeometry {
        column_count,
        card_width,
        card_height: bp.card_height,
        gap: bp.gap,
        row_count: item_count.div_ceil(column_count),
        item_count,
    }
}
