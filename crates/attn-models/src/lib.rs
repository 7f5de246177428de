//! Shared data models for the attention monitor.
//!
//! This crate provides Serde-serializable types for:
//! - Per-frame attention statuses and timestamped frame records
//! - Session identities and session logs
//! - Archive listing entries
//! - Weekday × hour heatmap series
//! - End-of-session summaries

pub mod archive;
pub mod heatmap;
pub mod session;
pub mod status;
pub mod summary;

// Re-export common types
pub use archive::{ArchiveEntry, ArchiveSortKey, ArchiveSortKeyParseError, ARCHIVE_DATE_FORMAT};
pub use heatmap::{HeatmapPoint, HeatmapSeries, SessionScore, WEEKDAY_LABELS};
pub use session::{FrameRecord, SessionId, SessionIdError, SessionLog, StatusCounts, SESSION_PREFIX};
pub use status::{StatusKind, StatusParseError};
pub use summary::SessionSummary;
