//! Structured error types for configuration loading.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidEnvironment,
    DirectoryReadFailure,
    FileLoadFailure,
    StoreWriteFailure,
}

/// Why a single configuration file could not be turned into a mapping.
#[derive(Debug, Error)]
pub enum FileLoadCause {
    #[error("could not read file")]
    Read(#[from] io::Error),

    #[error("invalid YAML")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON")]
    Json(#[from] serde_json::Error),

    /// The document parsed, but its top level is a scalar or a list.
    #[error("top level is {found}, expected a mapping")]
    NotAMapping { found: &'static str },
}

/// Rejection raised by a [`ConfigStore`](crate::config::ConfigStore) write.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Fatal conditions raised while loading configuration.
///
/// A missing environment directory is not an error; see
/// [`LoadOutcome`](crate::config::LoadOutcome).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid environment name '{name}': {reason}")]
    InvalidEnvironment { name: String, reason: &'static str },

    #[error("failed to read config directory {}", .path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load config file {}", .path.display())]
    FileLoad {
        path: PathBuf,
        #[source]
        cause: FileLoadCause,
    },

    #[error("config store rejected namespace '{namespace}'")]
    StoreWrite {
        namespace: String,
        #[source]
        source: StoreError,
    },
}

impl LoadError {
    pub fn file_load(path: &Path, cause: impl Into<FileLoadCause>) -> Self {
        Self::FileLoad {
            path: path.to_path_buf(),
            cause: cause.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            LoadError::InvalidEnvironment { .. } => ErrorCode::InvalidEnvironment,
            LoadError::ReadDirectory { .. } => ErrorCode::DirectoryReadFailure,
            LoadError::FileLoad { .. } => ErrorCode::FileLoadFailure,
            LoadError::StoreWrite { .. } => ErrorCode::StoreWriteFailure,
        }
    }

    /// The file or directory involved, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            LoadError::ReadDirectory { path, .. } | LoadError::FileLoad { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Flatten into a serializable report for machine-readable output.
    pub fn report(&self) -> ErrorReport {
        let details = match self {
            LoadError::ReadDirectory { source, .. } => Some(source.to_string()),
            LoadError::FileLoad { cause, .. } => Some(match cause {
                FileLoadCause::Read(e) => e.to_string(),
                FileLoadCause::Yaml(e) => e.to_string(),
                FileLoadCause::Json(e) => e.to_string(),
                FileLoadCause::NotAMapping { .. } => cause.to_string(),
            }),
            LoadError::StoreWrite { source, .. } => Some(source.to_string()),
            LoadError::InvalidEnvironment { .. } => None,
        };
        let namespace = match self {
            LoadError::StoreWrite { namespace, .. } => Some(namespace.clone()),
            _ => None,
        };

        ErrorReport {
            code: self.code(),
            message: self.to_string(),
            path: self.path().map(|p| p.display().to_string()),
            namespace,
            details,
        }
    }
}

/// Structured error for JSON output.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Result type for loader operations.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
