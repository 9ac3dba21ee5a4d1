//! Logging setup, modeled on `tetra_core::debug::setup_logging_default`:
//! an `EnvFilter`-driven `tracing-subscriber` on stdout, plus an optional
//! non-blocking file appender. Unlike the teacher this skips the custom
//! `FormatEvent` implementation -- that formatter's module-path rewriting
//! and TDMA timestamp field exist for a radio stack's tick structure that
//! has no equivalent here, so the default `fmt` layer is used instead.

use std::fs::OpenOptions;
use std::sync::Once;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Sets up stdout logging and, if `log_file` is given, a verbose mirror to
/// that file. Returns a guard that must be kept alive for as long as file
/// logging should keep working. Safe to call more than once per process
/// (e.g. from multiple integration tests) -- only the first call takes
/// effect.
pub fn init(log_file: Option<&str>) -> Option<WorkerGuard> {
    let mut guard = None;
    INIT.call_once(|| {
        let stdout_layer = fmt::layer();

        guard = match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .expect("failed to open log file");
                let (file_writer, file_guard) = tracing_appender::non_blocking(file);
                let file_layer = fmt::layer().with_writer(file_writer).with_ansi(false);

                tracing_subscriber::registry()
                    .with(stdout_layer.with_filter(default_filter()))
                    .with(file_layer.with_filter(EnvFilter::new("debug")))
                    .init();

                Some(file_guard)
            }
            None => {
                tracing_subscriber::registry()
                    .with(stdout_layer.with_filter(default_filter()))
                    .init();
                None
            }
        };
    });
    guard
}
