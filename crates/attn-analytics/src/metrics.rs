//! Analytics counters.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const SCORE_FAILURES_TOTAL: &str = "attn_score_failures_total";
    pub const ARCHIVE_SKIPPED_TOTAL: &str = "attn_archive_skipped_total";
}

/// Record a session log that could not be scored.
pub fn record_score_failure(reason: &'static str) {
    counter!(names::SCORE_FAILURES_TOTAL, "reason" => reason).increment(1);
}

/// Record a store entry left out of the archive.
pub fn record_archive_skip() {
    counter!(names::ARCHIVE_SKIPPED_TOTAL).increment(1);
}
