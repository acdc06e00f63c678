//! Error types for the audit log.

use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by audit log implementations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Underlying I/O failure while opening, reading, or writing the log.
    #[error("audit log i/o error at {path}: {source}")]
    Io {
        /// Log file involved in the failure.
        path: PathBuf,
        /// Source [`std::io::Error`].
        #[source]
        source: std::io::Error,
    },
    /// The log contents are not valid UTF-8.
    #[error("audit log at {path} is not valid UTF-8")]
    Encoding {
        /// Log file involved in the failure.
        path: PathBuf,
    },
}

impl MemoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for audit log operations.
pub type MemoryResult<T> = Result<T, MemoryError>;
