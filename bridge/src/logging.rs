//! Tracing subscriber setup for the bridge binaries.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Where log lines go besides the rolling file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// File only. Required for the stdio host, whose stdout is the channel.
    FileOnly,
    /// File and stderr.
    FileAndStderr,
}

/// Install the global subscriber writing to `<log_dir>/<prefix>.YYYY-MM-DD`.
///
/// `RUST_LOG` takes precedence over `default_filter`. Keep the returned
/// guard alive for the lifetime of the process or buffered lines are lost.
pub fn init(
    log_dir: &Path,
    prefix: &str,
    default_filter: &str,
    target: LogTarget,
) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);
    let stderr_layer = match target {
        LogTarget::FileOnly => None,
        LogTarget::FileAndStderr => Some(fmt::layer().with_writer(std::io::stderr)),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(filter)
        .init();

    Ok(guard)
}
