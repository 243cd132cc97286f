//! Configuration loading from file system
//!
//! Reads a JSON file (default ~/.command-library/config.json). Any failure
//! logs a warning and falls back to defaults; structural validation happens
//! later in `Config::validate`.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::types::Config;

pub const DEFAULT_CONFIG_PATH: &str = "~/.command-library/config.json";

/// Path of the user config file, tilde expanded.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref())
}

/// Load configuration from `path`, or the default path when `None`.
///
/// Returns Config::default() if the file is missing or cannot be parsed.
#[instrument(name = "load_config", skip_all)]
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = match path {
        Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()),
        None => default_config_path(),
    };

    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    let contents = match std::fs::read_to_string(&config_path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to read config file, using defaults"
            );
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(contents.trim()) {
        Ok(config) => {
            info!(path = %config_path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            let error_hint = if e.to_string().contains("unknown variant") {
                "\n\nHint: field names in 'search.keys' must be one of \"name\", \"description\", \"tags\" \
                 and 'search.shortQuery' one of \"matchAll\", \"scoreNormally\"."
            } else {
                ""
            };
            warn!(
                error = %e,
                path = %config_path.display(),
                hint = %error_hint,
                "Failed to parse config JSON, using defaults"
            );
            Config::default()
        }
    }
}
