//! Structured session logging.
//!
//! Every lifecycle event of a monitoring session carries the same
//! `session_id` and `operation` fields, so one session can be followed
//! through JSON logs.

use attn_models::{SessionId, StatusCounts};
use tracing::{error, info, warn, Span};

/// Session logger with consistent contextual fields.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    session_id: String,
    operation: String,
}

impl SessionLogger {
    /// Create a logger for one session and operation (e.g. "monitor", "replay").
    pub fn new(session_id: &SessionId, operation: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_started(&self, strategy: &str, predictor: &str) {
        info!(
            session_id = %self.session_id,
            operation = %self.operation,
            strategy = strategy,
            predictor = predictor,
            "Session started"
        );
    }

    /// The frame source ran dry; the session stays open until stopped.
    pub fn log_stream_ended(&self, frames: usize) {
        info!(
            session_id = %self.session_id,
            operation = %self.operation,
            frames = frames,
            "Frame stream ended"
        );
    }

    pub fn log_discarded(&self) {
        warn!(
            session_id = %self.session_id,
            operation = %self.operation,
            "Session stopped without frames, nothing persisted"
        );
    }

    pub fn log_persist_failed(&self, err: &dyn std::error::Error) {
        error!(
            session_id = %self.session_id,
            operation = %self.operation,
            error = %err,
            "Failed to persist session log"
        );
    }

    pub fn log_stopped(&self, counts: &StatusCounts) {
        info!(
            session_id = %self.session_id,
            operation = %self.operation,
            frames = counts.total(),
            engaged = counts.engaged(),
            "Session stopped"
        );
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span covering work done on behalf of this session.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "session",
            session_id = %self.session_id,
            operation = %self.operation
        )
    }
}
