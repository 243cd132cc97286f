//! Results grid: responsive geometry and the virtualized cell window.

mod layout;
mod virtualized;

pub use layout::{layout, Breakpoint, BreakpointTable, CellRect, GridGeometry};
pub use virtualized::{row_window, visible_cells, VisibleCell};

#[cfg(test)]
#[path = "../grid_tests.rs"]
mod tests;
