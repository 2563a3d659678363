//! Subscriber setup for the `parish-admin` binary.
//!
//! Every command logs to stderr. With `--log-dir <dir>` the same events are
//! also appended as JSON lines to `<dir>/parish-admin.log.YYYY-MM-DD`, which
//! is where inbox fetches, status updates and editor writes can be audited
//! after the fact. `RUST_LOG` filters both outputs.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the `--log-dir` file writer running. Dropping it flushes pending
/// lines.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

const LOG_FILE_PREFIX: &str = "parish-admin.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Logging for `parish-admin --log-dir <logs_dir>`: daily JSON files plus
/// stderr. Keep the returned guard alive until the command finishes.
///
/// # Errors
///
/// Returns an error if `logs_dir` cannot be created or a subscriber is
/// already installed.
pub fn init_production(logs_dir: &Path) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir).map_err(|e| {
        anyhow::anyhow!(
            "failed to create logs directory {}: {e}",
            logs_dir.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(json_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(LoggingGuard { _guard: guard })
}

/// Logging for a plain `parish-admin` invocation: stderr only.
/// Later calls are no-ops, so tests can call it freely.
pub fn init_cli() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}
