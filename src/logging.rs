//! Tracing configuration and log routing.
//!
//! The server logs to stdout with a compact formatter and appends the same events to a log file:
//! `PLAINLY_LOG_FILE` when set, otherwise `logs/plainly.log`. The CLI logs to stderr only so that
//! stdout carries nothing but results.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_ENV: &str = "PLAINLY_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/plainly.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Configure tracing subscribers for stdout and file logging.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Keeps the non-blocking writer guard alive for the process lifetime.
/// - Falls back to stdout only when the log file cannot be opened.
pub fn init_tracing() {
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = open_log_writer(&log_file_path(std::env::var(LOG_FILE_ENV).ok())).map(
        |writer| {
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact()
        },
    );

    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

/// Install a stderr-only subscriber for the CLI (`warn` by default, `debug` when verbose).
pub fn init_cli_tracing(verbose: bool) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(if verbose { "debug" } else { "warn" }))
        .with(stderr_layer)
        .init();
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Resolve the log file location from an optional override.
fn log_file_path(configured: Option<String>) -> PathBuf {
    configured
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

/// Open `path` for appending behind a non-blocking writer, creating parent directories.
fn open_log_writer(path: &Path) -> Option<NonBlocking> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(writer)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}
