//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::core::errors::{QgError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "QG_CONFIG";

/// Full qso-glance configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
    pub data: DataConfig,
    #[serde(skip)]
    pub config_file: PathBuf,
}

/// Contact-log store location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

/// Log verbosity and sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    /// Log file; the terminal itself is the display surface.
    pub file: PathBuf,
    /// Send log lines to stderr instead of `file`.
    pub stderr: bool,
}

/// Target display size in pixels; unset means the whole terminal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Aggregate loading behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DataConfig {
    /// Fetch every aggregate, not only the one the active chart needs.
    pub preload_all: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("qso_log.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: data_dir().join("qso-glance.log"),
            stderr: false,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { preload_all: true }
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[QG-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

fn data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("qso-glance")
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        home_dir()
            .join(".config")
            .join("qso-glance")
            .join("config.toml")
    }

    /// Load config from `QG_CONFIG` or the default path, then apply env overrides.
    pub fn load_from_env() -> Result<Self> {
        let explicit = env_var(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load(explicit.as_deref())
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let mut cfg = Self::read_file(&path_buf, path.is_some())?;
        cfg.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn read_file(path: &Path, is_explicit_path: bool) -> Result<Self> {
        if path.exists() {
            let raw = fs::read_to_string(path).map_err(|source| QgError::io(path, source))?;
            Ok(toml::from_str(&raw)?)
        } else if is_explicit_path {
            Err(QgError::MissingConfig {
                path: path.to_path_buf(),
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Deterministic hash of the effective config for logging.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Parsed log level; only valid after [`Config::validate`] passed.
    pub fn log_level(&self) -> Result<LevelFilter> {
        parse_level(&self.logging.level)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("QG_DATABASE_PATH") {
            self.database.path = PathBuf::from(raw);
        }

        if let Some(raw) = lookup("QG_LOG_LEVEL") {
            self.logging.level = raw.trim().to_ascii_lowercase();
        }
        if let Some(raw) = lookup("QG_LOG_FILE") {
            self.logging.file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("QG_LOG_STDERR") {
            self.logging.stderr = parse_env_bool("QG_LOG_STDERR", &raw)?;
        }

        if let Some(raw) = lookup("QG_DISPLAY_WIDTH") {
            self.display.width = Some(parse_env_u32("QG_DISPLAY_WIDTH", &raw)?);
        }
        if let Some(raw) = lookup("QG_DISPLAY_HEIGHT") {
            self.display.height = Some(parse_env_u32("QG_DISPLAY_HEIGHT", &raw)?);
        }

        if let Some(raw) = lookup("QG_DATA_PRELOAD_ALL") {
            self.data.preload_all = parse_env_bool("QG_DATA_PRELOAD_ALL", &raw)?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(QgError::InvalidConfig {
                details: "database.path must not be empty".to_string(),
            });
        }

        parse_level(&self.logging.level)?;

        if !self.logging.stderr && self.logging.file.as_os_str().is_empty() {
            return Err(QgError::InvalidConfig {
                details: "logging.file must be set unless logging.stderr=true".to_string(),
            });
        }

        for (name, value) in [
            ("display.width", self.display.width),
            ("display.height", self.display.height),
        ] {
            if value == Some(0) {
                return Err(QgError::InvalidConfig {
                    details: format!("{name} must be >= 1 when set"),
                });
            }
        }

        Ok(())
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter> {
    match raw {
        "error" => Ok(LevelFilter::ERROR),
        "warn" => Ok(LevelFilter::WARN),
        "info" => Ok(LevelFilter::INFO),
        "debug" => Ok(LevelFilter::DEBUG),
        "trace" => Ok(LevelFilter::TRACE),
        other => Err(QgError::InvalidConfig {
            details: format!(
                "logging.level must be one of error|warn|info|debug|trace, got {other:?}"
            ),
        }),
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u32(name: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|error| QgError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.trim()
        .parse::<bool>()
        .map_err(|error| QgError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
