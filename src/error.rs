//! Error types for cfgcache
//!
//! Every operation returns `CacheResult<T>`. Errors are never retried locally;
//! callers decide whether a failure means "rebuild" or "skip caching".

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Coarse classification of a [`CacheError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The cache file or a dependency file is missing
    NotFound,
    /// Permission denied, lock contention, disk full or any other OS failure
    Io,
    /// Stored bytes are not a valid configuration (corruption or version mismatch)
    Deserialization,
}

/// All errors produced by the configuration cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error {context} ({}): {source}", path.display())]
    Io {
        context: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt cache file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Cache file {} has {what} {found}, expected {expected}", path.display())]
    VersionMismatch {
        path: PathBuf,
        what: &'static str,
        found: String,
        expected: String,
    },

    #[error("Failed to serialize configuration: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    /// Create an I/O error, folding `NotFound` into its own variant
    pub fn io(context: impl Into<String>, path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound {
                path: path.to_path_buf(),
            };
        }
        Self::write_io(context, path, source)
    }

    /// Create an I/O error without the `NotFound` folding
    ///
    /// Write failures are always reported as I/O, even when the parent
    /// directory is missing.
    pub fn write_io(context: impl Into<String>, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn corrupt(path: &Path, reason: impl ToString) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Which bucket of the error taxonomy this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } | Self::Serialize { .. } => ErrorKind::Io,
            Self::Corrupt { .. } | Self::VersionMismatch { .. } => ErrorKind::Deserialization,
        }
    }

    /// Get a hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::VersionMismatch { .. } => {
                Some("The cache was written by another version; delete it to force a rebuild")
            }
            Self::Corrupt { .. } => Some("Delete the cache file to force a rebuild"),
            _ => None,
        }
    }
}
