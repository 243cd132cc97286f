use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// How a failed command is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning, // bad user-supplied file (catalog, config)
    Error,   // caller bug, operation refused
}

/// Domain-specific errors for the command library.
///
/// None of these describe a runtime data condition: an empty corpus, a query
/// that matches nothing or a zero-width viewport are all valid states. These
/// variants only fire when a caller hands in a value that breaks an invariant.
#[derive(Error, Debug)]
pub enum CommandLibraryError {
    #[error("top_k must be at least 1")]
    InvalidTopK,

    #[error("threshold must be a finite value in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("invalid weight for field '{field}': {reason}")]
    InvalidWeights { field: String, reason: String },

    #[error("invalid breakpoint table: {0}")]
    InvalidBreakpoints(String),

    #[error("invalid search options: {0}")]
    InvalidOptions(String),

    #[error("failed to parse catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("failed to read catalog from '{}': {source}", path.display())]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate record id {0} in catalog")]
    DuplicateRecordId(u64),

    #[error("configuration error: {0}")]
    Config(String),
}

impl CommandLibraryError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CatalogParse(_) | Self::CatalogIo { .. } | Self::Config(_) => {
                ErrorSeverity::Warning
            }
            _ => ErrorSeverity::Error,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandLibraryError>;

/// Severity of the first `CommandLibraryError` in an error chain.
/// Errors from outside the crate (I/O on stdout, serde) count as `Error`.
pub fn severity_of(err: &anyhow::Error) -> ErrorSeverity {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CommandLibraryError>())
        .map_or(ErrorSeverity::Error, CommandLibraryError::severity)
}

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use command_library::error::ResultExt;
///
/// let catalog = load_catalog_file(&path).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

/// Panic in debug mode, log error in release mode.
///
/// Use for "impossible" states that should crash during development
/// but gracefully degrade in production.
#[macro_export]
macro_rules! debug_panic {
    ( $($fmt_arg:tt)* ) => {
        if cfg!(debug_assertions) {
            panic!( $($fmt_arg)* );
        } else {
            tracing::error!("IMPOSSIBLE STATE: {}", format_args!($($fmt_arg)*));
        }
    };
}
