//! Session analytics.
//!
//! This crate provides:
//! - The engagement score of one session and end-of-session summaries
//! - The archive of persisted sessions with display dates and scores
//! - Weekday × hour heatmaps of session scores
//!
//! Every query degrades instead of failing: unreadable logs score 0 and
//! unrecognised files are left out of the archive.

pub mod archive;
pub mod heatmap;
pub mod metrics;
pub mod score;

pub use archive::{list_archive, session_scores};
pub use heatmap::{build_heatmap, HeatmapGrid, HOURS_PER_DAY};
pub use score::{compute_score, engagement_score, summarize};
