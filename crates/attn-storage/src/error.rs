//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during session log storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session log not found: {0}")]
    NotFound(String),

    #[error("Malformed session log {name} (line {line}): {reason}")]
    Malformed {
        name: String,
        line: usize,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn malformed(name: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.into(),
            line,
            reason: reason.into(),
        }
    }
}
