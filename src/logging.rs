//! File logging for the TUI and the one-shot commands.
//!
//! Nothing is logged to the terminal: the TUI owns it. Records go through a
//! non-blocking writer into `stayhub.<date>.log`, rotated daily, and only
//! the newest [`MAX_LOG_FILES`] files are kept.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "stayhub=info,warn";

/// Filter used by `--debug` when `RUST_LOG` is not set.
const DEBUG_LOG_FILTER: &str = "stayhub=debug,warn";

/// Overrides the log directory.
pub const LOG_DIR_ENV: &str = "STAYHUB_LOG_DIR";

const LOG_FILE_PREFIX: &str = "stayhub";
const MAX_LOG_FILES: usize = 7;

/// Keeps the background log writer alive. Buffered records are flushed
/// when it is dropped, so hold it until the end of `main`.
#[must_use = "logs are lost when the guard is dropped early"]
pub struct LogGuard {
    _worker: WorkerGuard,
    directory: PathBuf,
}

impl LogGuard {
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` always wins over `debug`. The directory is
/// [`log_directory`], created if missing.
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created,
/// if the rolling appender cannot open its file, or if a global subscriber
/// is already installed.
pub fn init(debug: bool) -> anyhow::Result<LogGuard> {
    let directory = log_directory().context("could not determine the log directory")?;
    std::fs::create_dir_all(&directory)
        .with_context(|| format!("failed to create {}", directory.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&directory)
        .context("failed to open the log file")?;
    let (writer, worker) = tracing_appender::non_blocking(appender);

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::new(filter_directives(rust_log.as_deref(), debug));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)
        .context("a global tracing subscriber is already set")?;

    let debug_enabled = debug;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), debug = debug_enabled, "StayHub starting up");
    tracing::debug!(log_dir = %directory.display(), "Log directory");

    Ok(LogGuard {
        _worker: worker,
        directory,
    })
}

/// Directives for the subscriber filter. An invalid `RUST_LOG` falls back
/// to the default instead of disabling logging.
fn filter_directives(rust_log: Option<&str>, debug: bool) -> &str {
    let fallback = if debug {
        DEBUG_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .filter(|directives| EnvFilter::try_new(directives).is_ok())
        .unwrap_or(fallback)
}

fn resolve_log_directory(
    override_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    override_dir
        .filter(|dir| !dir.as_os_str().is_empty())
        .or_else(|| data_dir.map(|base| base.join("stayhub").join("logs")))
}

/// Where log files are written: `$STAYHUB_LOG_DIR`, or `stayhub/logs` under
/// the platform's local data directory.
///
/// - Linux: `~/.local/share/stayhub/logs/`
/// - macOS: `~/Library/Application Support/stayhub/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\stayhub\logs\`
pub fn log_directory() -> Option<PathBuf> {
    resolve_log_directory(
        std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
        dirs::data_local_dir(),
    )
}

pub fn shutdown() {
    tracing::info!("StayHub shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_directory_under_data_dir() {
        let dir = resolve_log_directory(None, Some(PathBuf::from("/data"))).unwrap();
        assert_eq!(dir, PathBuf::from("/data/stayhub/logs"));
    }

    #[test]
    fn test_log_directory_override_wins() {
        let dir = resolve_log_directory(
            Some(PathBuf::from("/tmp/stayhub-logs")),
            Some(PathBuf::from("/data")),
        );
        assert_eq!(dir, Some(PathBuf::from("/tmp/stayhub-logs")));
        let dir = resolve_log_directory(Some(PathBuf::new()), Some(PathBuf::from("/data")));
        assert_eq!(dir, Some(PathBuf::from("/data/stayhub/logs")));
        assert_eq!(resolve_log_directory(None, None), None);
    }

    #[test]
    #[serial]
    fn test_log_directory_reads_env_override() {
        let temp = tempfile::tempdir().unwrap();
        std::env::set_var(LOG_DIR_ENV, temp.path());
        let dir = log_directory();
        std::env::remove_var(LOG_DIR_ENV);
        assert_eq!(dir.as_deref(), Some(temp.path()));
    }

    #[test]
    fn test_filter_directives_defaults() {
        assert_eq!(filter_directives(None, false), DEFAULT_LOG_FILTER);
        assert_eq!(filter_directives(None, true), DEBUG_LOG_FILTER);
        assert_eq!(filter_directives(Some("  "), false), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_filter_directives_prefer_rust_log() {
        assert_eq!(filter_directives(Some("stayhub=trace"), true), "stayhub=trace");
        assert_eq!(filter_directives(Some("stayhub=loud"), false), DEFAULT_LOG_FILTER);
    }
}
