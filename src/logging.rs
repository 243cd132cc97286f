//! Structured JSONL logging plus human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.command-library/logs/command-library.jsonl) - structured for tooling
//! - **Compact to stderr** - human-readable for developers
//!
//! stdout is reserved for command output (search results, `listen` status lines),
//! so nothing here ever writes to it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use command_library::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init();
//!
//! tracing::info!(event_type = "app_start", "Application started");
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "command-library.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// If the log file cannot be opened only the stderr layer is installed.
pub fn init() -> LoggingGuard {
    let log_path = log_path();
    if let Some(log_dir) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("[LOGGING] Failed to create log directory: {}", e);
        }
    }

    // Environment filter - default to info, allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Compact layer for stderr (human developers)
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let file = OpenOptions::new().create(true).append(true).open(&log_path);

    // Non-blocking writer so a slow disk never stalls the event loop
    let (json_layer, file_guard, open_error) = match file {
        Ok(file) => {
            let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);
            let json_layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(json_layer), Some(file_guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    // A subscriber installed earlier (tests, embedding hosts) wins
    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    match open_error {
        None => tracing::debug!(
            event_type = "app_lifecycle",
            action = "started",
            log_path = %log_path.display(),
            installed,
            "Application logging initialized"
        ),
        Some(e) => tracing::warn!(
            error = %e,
            log_path = %log_path.display(),
            "Failed to open log file, logging to stderr only"
        ),
    }

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (~/.command-library/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".command-library").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("command-library-logs"))
}

/// Get the path to the JSONL log file
fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

// =============================================================================
// STRUCTURED LOGGING HELPERS
// =============================================================================

/// Log a completed ranking pass with structured fields
pub fn log_search_event(seq: u64, query: &str, candidates: usize, results: usize) {
    tracing::debug!(
        event_type = "search_event",
        seq = seq,
        query = query,
        candidates = candidates,
        results = results,
        "Ranked {} of {} candidates for '{}'",
        results,
        candidates,
        query
    );
}

/// Log a performance metric with structured fields
pub fn log_perf(operation: &str, duration_ms: u64, threshold_ms: u64) {
    if duration_ms > threshold_ms {
        tracing::warn!(
            event_type = "performance",
            operation = operation,
            duration_ms = duration_ms,
            threshold_ms = threshold_ms,
            is_slow = true,
            "Slow operation: {} took {}ms (threshold: {}ms)",
            operation,
            duration_ms,
            threshold_ms
        );
    } else {
        tracing::debug!(
            event_type = "performance",
            operation = operation,
            duration_ms = duration_ms,
            threshold_ms = threshold_ms,
            is_slow = false,
            "Operation {} completed in {}ms",
            operation,
            duration_ms
        );
    }
}

/// Log an error with structured fields and context
pub fn log_error(category: &str, error: &str, context: Option<&str>) {
    let msg = match context {
        Some(ctx) => format!("{}: {} (context: {})", category, error, ctx),
        None => format!("{}: {}", category, error),
    };

    tracing::error!(
        event_type = "error",
        category = category,
        error_message = error,
        context = context,
        "{}",
        msg
    );
}


#[cfg(test)]
#[path = "logging_tests.rs"]
mod init_tests;
