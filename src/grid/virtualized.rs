//! Virtualized cell window
//!
//! Resolves which (row, column) cells of a grid must render for a scroll
//! position. Only rows intersecting the viewport, plus `overscan` rows on each
//! side, are produced.

use super::layout::{CellRect, GridGeometry};

/// A cell inside the render window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleCell<'a, T> {
    pub row: usize,
    pub column: usize,
    /// Flat index into the result list (`row * column_count + column`)
    pub index: usize,
    pub item: &'a T,
    pub rect: CellRect,
}

/// Inclusive row window `[first, last]` to render, or `None` when the grid has
/// no rows.
pub fn row_window(
    geometry: &GridGeometry,
    scroll_offset: f64,
    viewport_height: f64,
    overscan_rows: usize,
) -> Option<(usize, usize)> {
    if geometry.row_count == 0 {
        return None;
    }
    let last_row = geometry.row_count - 1;
    let stride = geometry.row_stride();

    let scroll = sanitize(scroll_offset);
    let height = sanitize(viewport_height);

    let first_visible = (scroll / stride).floor();
    let last_visible = (((scroll + height) / stride).ceil() - 1.0).max(first_visible);

    // f64 -> usize casts saturate, so huge offsets land on last_row
    let first_visible = (first_visible as usize).min(last_row);
    let last_visible = (last_visible as usize).min(last_row);

    let first = first_visible.saturating_sub(overscan_rows);
    let last = last_visible.saturating_add(overscan_rows).min(last_row);
    Some((first, last))
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Cells to render for the current scroll position.
///
/// Cells whose index is at or beyond the result count are omitted. The count
/// is the smaller of the geometry's item count and `results.len()`, so a
/// geometry computed for a different list can never reach past the slice.
pub fn visible_cells<'a, T>(
    geometry: &GridGeometry,
    results: &'a [T],
    scroll_offset: f64,
    viewport_height: f64,
    overscan_rows: usize,
) -> Vec<VisibleCell<'a, T>> {
    let Some((first, last)) = row_window(geometry, scroll_offset, viewport_height, overscan_rows)
    else {
        return Vec::new();
    };

    let result_count = geometry.item_count.min(results.len());
    let columns = geometry.column_count;
    let mut cells = Vec::with_capacity((last - first + 1) * columns);

    for row in first..=last {
        for column in 0..columns {
            let index = row * columns + column;
            if index >= result_count {
                break;
            }
            cells.push(VisibleCell {
                row,
                column,
                index,
                item: &results[index],
                rect: geometry.cell_rect(row, column),
            });
        }
    }
    cells
}
