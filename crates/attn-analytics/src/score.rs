//! Engagement score for a single session.
//!
//! `score = round(100 * (Attentive + Blinking) / total, 2)`. Blinking counts
//! as engaged; every other status (including the blink-rate verdicts) does not.

use attn_models::{SessionId, SessionLog, SessionSummary, StatusCounts};
use attn_storage::{SessionStore, StorageError};
use tracing::{debug, warn};

use crate::metrics::record_score_failure;

/// Round to `decimals` places. Exact ties go to the even digit.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Score from per-status counts. Empty logs score 0.
pub fn engagement_score(counts: &StatusCounts) -> f64 {
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }
    round_to(100.0 * counts.engaged() as f64 / total as f64, 2)
}

/// Summary of an in-memory log.
pub fn summarize(log: &SessionLog) -> SessionSummary {
    let counts = log.counts();
    SessionSummary {
        session_id: log.id.clone(),
        total_frames: counts.total(),
        score: engagement_score(&counts),
        counts,
    }
}

/// Score a persisted session.
///
/// Never fails: a missing, unreadable or malformed log is logged and scores 0.
pub async fn compute_score<S>(store: &S, id: &SessionId) -> f64
where
    S: SessionStore + ?Sized,
{
    match store.read(id).await {
        Ok(log) => {
            let score = engagement_score(&log.counts());
            debug!(session_id = %id, frames = log.len(), score = score, "Computed session score");
            score
        }
        Err(e) => {
            let reason = match &e {
                StorageError::NotFound(_) => "not_found",
                StorageError::Malformed { .. } => "malformed",
                StorageError::Io(_) => "io",
            };
            warn!(session_id = %id, error = %e, "Failed to score session, using 0");
            record_score_failure(reason);
            0.0
        }
    }
}
