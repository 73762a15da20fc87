//! QG-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, QgError>;

/// Top-level error type for qso-glance.
#[derive(Debug, Error)]
pub enum QgError {
    #[error("[QG-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[QG-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[QG-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[QG-1101] logging setup failure: {details}")]
    LoggingInit { details: String },

    #[error("[QG-2001] could not initialize display: {details}")]
    DisplayInit { details: String },

    #[error("[QG-2002] display I/O failure during {context}: {source}")]
    DisplayIo {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("[QG-3001] contact log store unavailable at {path}: {details}")]
    DataStoreUnavailable { path: PathBuf, details: String },

    #[error("[QG-3002] contact log store operation failed in {context}: {details}")]
    DataStoreOperational {
        context: &'static str,
        details: String,
    },

    #[error("[QG-4001] render failure for {visualization}: {details}")]
    Render {
        visualization: &'static str,
        details: String,
    },

    #[error("[QG-3900] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl QgError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "QG-1001",
            Self::MissingConfig { .. } => "QG-1002",
            Self::ConfigParse { .. } => "QG-1003",
            Self::LoggingInit { .. } => "QG-1101",
            Self::DisplayInit { .. } => "QG-2001",
            Self::DisplayIo { .. } => "QG-2002",
            Self::DataStoreUnavailable { .. } => "QG-3001",
            Self::DataStoreOperational { .. } => "QG-3002",
            Self::Render { .. } => "QG-4001",
            Self::Io { .. } => "QG-3900",
        }
    }

    /// Whether the failure came from the contact-log store.
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::DataStoreUnavailable { .. } | Self::DataStoreOperational { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for terminal write/read failures.
    #[must_use]
    pub const fn display_io(context: &'static str, source: std::io::Error) -> Self {
        Self::DisplayIo { context, source }
    }

    /// Convenience constructor for render failures.
    #[must_use]
    pub fn render(visualization: &'static str, details: impl Into<String>) -> Self {
        Self::Render {
            visualization,
            details: details.into(),
        }
    }
}

impl From<rusqlite::Error> for QgError {
    fn from(value: rusqlite::Error) -> Self {
        Self::DataStoreOperational {
            context: "rusqlite",
            details: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for QgError {
    fn from(value: serde_json::Error) -> Self {
        Self::ConfigParse {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for QgError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
