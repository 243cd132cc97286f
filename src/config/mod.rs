//! Configuration module - search, grid and debounce settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.command-library/config.json
//! - Default values for all settings
//! - Validating the config into ranking options and a breakpoint table
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, SearchConfig, GridConfig)
//! - `loader` - File system loading and parsing

pub(crate) mod defaults;
mod loader;
mod types;

pub use defaults::{default_breakpoints, default_field_weights, DEFAULT_CATEGORIES};
pub use loader::{default_config_path, load_config, DEFAULT_CONFIG_PATH};
pub use types::{Config, GridConfig, SearchConfig};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
