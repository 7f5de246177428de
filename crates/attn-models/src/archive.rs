//! Archive listing models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Display format for archive dates, e.g. `Oct 15, 2023 02:30 PM`.
pub const ARCHIVE_DATE_FORMAT: &str = "%b %d, %Y %I:%M %p";

/// One persisted session as shown in the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ArchiveEntry {
    /// Session start formatted with [`ARCHIVE_DATE_FORMAT`].
    pub date: String,
    /// Engagement score (0-100, 2 decimals).
    pub score: f64,
    /// Stored file name of the session log.
    pub filename: String,
}

/// Ordering key for archive listings (always newest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveSortKey {
    /// File modification time of the stored log.
    #[default]
    ModifiedTime,
    /// Start timestamp embedded in the session name.
    EmbeddedTimestamp,
}

impl ArchiveSortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveSortKey::ModifiedTime => "modified",
            ArchiveSortKey::EmbeddedTimestamp => "embedded",
        }
    }
}

impl fmt::Display for ArchiveSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ArchiveSortKey {
    type Err = ArchiveSortKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "modified" | "modified_time" | "mtime" => Ok(ArchiveSortKey::ModifiedTime),
            "embedded" | "embedded_timestamp" | "started" => Ok(ArchiveSortKey::EmbeddedTimestamp),
            _ => Err(ArchiveSortKeyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown archive sort key: {0}")]
pub struct ArchiveSortKeyParseError(String);
