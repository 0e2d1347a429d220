//! File-backed tracing setup. The terminal belongs to the UI, so logs go to
//! a file.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` wins over the configured level.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Subscriber writing to `log_file`, shared by `init` and tests.
pub fn build_subscriber(
    log_file: File,
    default_level: &str,
) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(fmt_layer)
}

/// Install the global subscriber. Returns false when the log file could not
/// be opened; the app then runs without logging.
pub fn init(log_file_path: &Path, default_level: &str) -> bool {
    if let Some(parent) = log_file_path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }
    let Ok(log_file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
    else {
        return false;
    };
    build_subscriber(log_file, default_level).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_reach_the_file() {
        let log_file = tempfile::NamedTempFile::new().unwrap();
        let subscriber = build_subscriber(log_file.reopen().unwrap(), "debug");
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(route = "/reports/accumulated", "navigated");
        });
        let contents = std::fs::read_to_string(log_file.path()).unwrap();
        assert!(contents.contains("navigated"));
        assert!(contents.contains("/reports/accumulated"));
    }

    #[test]
    fn test_bad_level_falls_back() {
        let filter = env_filter("not a [level");
        assert!(!filter.to_string().is_empty());
    }
}
