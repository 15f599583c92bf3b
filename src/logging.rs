//! Tracing setup for the `architect` binary.
//!
//! Two layers: JSON lines to `.architect/logs/architect.log` (filtered by
//! `RUST_LOG`, default [`DEFAULT_FILTER`]) and terse stderr output that only
//! shows warnings unless `--verbose` is set, so it does not fight with the
//! progress bars.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const DEFAULT_FILTER: &str = "architect=info,architect_common=info";
pub const LOG_FILE: &str = "architect.log";

fn file_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("architect=debug,architect_common=debug")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    })
}

fn console_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("architect=debug,architect_common=debug")
    } else {
        EnvFilter::new("warn")
    }
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init_logging(log_dir: Option<&Path>, verbose: bool) -> Option<WorkerGuard> {
    let mut guard = None;
    let file_layer = match log_dir.map(|dir| std::fs::create_dir_all(dir).map(|_| dir)) {
        Some(Ok(dir)) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(file_filter(verbose)),
            )
        }
        Some(Err(err)) => {
            eprintln!("Warning: failed to create logs directory: {}", err);
            None
        }
        None => None,
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(console_filter(verbose));

    // A subscriber may already be installed (tests); that is fine.
    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    guard
}
