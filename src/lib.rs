//! Command Library - fuzzy search over a catalog of terminal commands
//!
//! This library provides typo-tolerant, field-weighted ranking of catalog
//! records, a category pre-filter, a responsive virtualized results grid and
//! the debounced event session that ties them together.

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod grid;
pub mod logging;
pub mod search;
pub mod session;
pub mod stdin_events;

pub use error::{CommandLibraryError, Result};
