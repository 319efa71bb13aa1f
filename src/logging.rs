//! Tracing configuration and log routing.
//!
//! Pipeline runs log to stderr with a compact formatter and to a file. `DOCSUM_LOG_FILE`
//! selects the file; otherwise logs go to `logs/docsum.log`. Stdout stays free for the
//! JSON printed by `docsum-file`.
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_DIR: &str = "logs";
const LOG_FILE_NAME: &str = "docsum.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the console and file subscribers.
///
/// `RUST_LOG` controls filtering and defaults to `info`. The appender guard lives in a static
/// so buffered lines are flushed for the whole process lifetime.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    match file_writer() {
        Some(writer) => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_ansi(false)
                    .compact(),
            )
            .init(),
        None => registry.init(),
    }
}

fn file_writer() -> Option<NonBlocking> {
    let configured = std::env::var("DOCSUM_LOG_FILE")
        .ok()
        .filter(|value| !value.trim().is_empty());

    let (non_blocking, guard) = match configured {
        Some(path) => append_to(Path::new(&path))?,
        None => {
            if let Err(err) = std::fs::create_dir_all(LOG_DIR) {
                eprintln!("Failed to create {LOG_DIR} directory: {err}");
                return None;
            }
            tracing_appender::non_blocking(tracing_appender::rolling::never(
                LOG_DIR,
                LOG_FILE_NAME,
            ))
        }
    };
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}

fn append_to(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}
