//! Logging setup
//!
//! The TUI owns the terminal, so logs go to a file through a non-blocking writer.
//! `PITWALL_LOG` takes an `EnvFilter` directive; otherwise the `-v` count picks
//! the level.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::data::client::default_cache_dir;

/// Environment variable holding an explicit filter directive
pub const LOG_ENV: &str = "PITWALL_LOG";

/// Log file name inside the cache directory
pub const LOG_FILE_NAME: &str = "pitwall.log";

/// Filter directive for a `-v` count
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Default log file location
pub fn default_log_path() -> PathBuf {
    default_cache_dir()
        .map(|dir| dir.join(LOG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME))
}

/// Installs the global subscriber writing to `path`.
///
/// The returned guard flushes buffered lines on drop and must live until exit.
pub fn init_logging(verbose: u8, path: &Path) -> io::Result<WorkerGuard> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!("pitwall={}", level_for_verbosity(verbose)))
    });

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), "warn");
        assert_eq!(level_for_verbosity(1), "info");
        assert_eq!(level_for_verbosity(2), "debug");
        assert_eq!(level_for_verbosity(9), "trace");
    }

    #[test]
    fn test_default_log_path_file_name() {
        assert!(default_log_path().ends_with(LOG_FILE_NAME));
    }
}
