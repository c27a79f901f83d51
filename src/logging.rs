use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "hh-ntuplizer.log";

/// Default filter directive; `verbose` raises the crate to debug
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "hh_ntuplizer=debug"
    } else {
        "hh_ntuplizer=info"
    }
}

/// Initializes the logging system with both console and JSON file output.
///
/// `RUST_LOG` wins over the default directive when set. The returned guard
/// flushes the file writer when dropped and must be held for the whole job.
pub fn init_logging(log_dir: &Path, verbose: bool) -> WorkerGuard {
    let _ = fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stderr);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // A second initialization (e.g. in tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    guard
}
