//! Monitor error types.

use thiserror::Error;

pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Replay error at line {line}: {reason}")]
    Replay { line: usize, reason: String },

    #[error("Metrics exporter failed: {0}")]
    Metrics(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    pub fn replay(line: usize, reason: impl Into<String>) -> Self {
        Self::Replay {
            line,
            reason: reason.into(),
        }
    }
}
