//! End-of-session report.

use serde::{Deserialize, Serialize};

use crate::{SessionId, StatusCounts};

/// What a user sees right after stopping a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub total_frames: usize,
    pub counts: StatusCounts,
    /// Engagement score, 0..=100 with two decimals.
    pub score: f64,
}
