//! Process logging: leveled text lines with UTC timestamps via `tracing`.
//!
//! The terminal is the display surface, so log lines go to a file unless
//! `logging.stderr` is set. Every lifecycle stage (startup, display ready,
//! data loaded, data-load failure, exit) emits one line.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::time::ChronoUtc;

use crate::core::config::LoggingConfig;
use crate::core::errors::{QgError, Result};

/// UTC timestamp layout, millisecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Install the global subscriber for the configured sink and level.
///
/// Fails with `LoggingInit` when a subscriber is already installed or the log
/// file cannot be opened.
pub fn init(config: &LoggingConfig, level: LevelFilter) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_timer(ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_max_level(level)
        .with_target(false);

    let result = if config.stderr {
        builder.with_writer(std::io::stderr).try_init()
    } else {
        let file = open_log_file(&config.file)?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
    };

    result.map_err(|error| QgError::LoggingInit {
        details: error.to_string(),
    })
}

/// Open `path` for appending, creating the parent directory first.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| QgError::io(parent, source))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| QgError::io(path, source))
}
