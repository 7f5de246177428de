//! Session identities, frame records and session logs.

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::StatusKind;

/// Prefix shared by every persisted session name.
pub const SESSION_PREFIX: &str = "session_";

/// Timestamp layout embedded in session names.
const SESSION_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Identity of one monitoring session: `session_<YYYYMMDD>_<HHMMSS>`.
///
/// The start instant is local wall-clock time, second resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId {
    name: String,
    started_at: NaiveDateTime,
}

impl SessionId {
    /// Build the identity for a session that started at `started_at`.
    pub fn from_start(started_at: NaiveDateTime) -> Self {
        // Sub-second precision is not part of the identity.
        let started_at = started_at.with_nanosecond(0).unwrap_or(started_at);
        let name = format!(
            "{}{}",
            SESSION_PREFIX,
            started_at.format(SESSION_TIME_FORMAT)
        );
        Self { name, started_at }
    }

    /// Identity for a session starting now.
    pub fn now() -> Self {
        Self::from_start(Local::now().naive_local())
    }

    /// Parse a session name. The text must match `session_<YYYYMMDD>_<HHMMSS>` exactly.
    pub fn parse(name: &str) -> Result<Self, SessionIdError> {
        let stamp = name
            .strip_prefix(SESSION_PREFIX)
            .ok_or_else(|| SessionIdError::MissingPrefix(name.to_string()))?;

        let started_at = NaiveDateTime::parse_from_str(stamp, SESSION_TIME_FORMAT)
            .map_err(|_| SessionIdError::InvalidTimestamp(name.to_string()))?;

        // Reject non-canonical spellings chrono tolerates (e.g. extra digits).
        if started_at.format(SESSION_TIME_FORMAT).to_string() != stamp {
            return Err(SessionIdError::InvalidTimestamp(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            started_at,
        })
    }

    /// Get the session name.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Start instant embedded in the name.
    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.name
    }
}

/// Session identity parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionIdError {
    #[error("Session name '{0}' does not start with 'session_'")]
    MissingPrefix(String),

    #[error("Session name '{0}' does not embed a YYYYMMDD_HHMMSS timestamp")]
    InvalidTimestamp(String),
}

/// One classified frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Wall-clock instant the frame was classified.
    pub timestamp: DateTime<Local>,
    /// Classifier output for the frame.
    pub status: StatusKind,
}

impl FrameRecord {
    pub fn new(timestamp: DateTime<Local>, status: StatusKind) -> Self {
        Self { timestamp, status }
    }

    /// Record stamped with the current time.
    pub fn now(status: StatusKind) -> Self {
        Self::new(Local::now(), status)
    }
}

/// Ordered frame records for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLog {
    pub id: SessionId,
    pub records: Vec<FrameRecord>,
}

impl SessionLog {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            records: Vec::new(),
        }
    }

    pub fn with_records(id: SessionId, records: Vec<FrameRecord>) -> Self {
        Self { id, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-status frame counts.
    pub fn counts(&self) -> StatusCounts {
        StatusCounts::from_statuses(self.records.iter().map(|r| r.status))
    }
}

/// Frame counts per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    counts: BTreeMap<StatusKind, usize>,
}

impl StatusCounts {
    pub fn from_statuses(statuses: impl IntoIterator<Item = StatusKind>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            counts.add(status);
        }
        counts
    }

    pub fn add(&mut self, status: StatusKind) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    pub fn get(&self, status: StatusKind) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// Total number of frames.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Frames whose status counts as engaged.
    pub fn engaged(&self) -> usize {
        self.counts
            .iter()
            .filter(|(status, _)| status.is_engaged())
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatusKind, usize)> + '_ {
        self.counts.iter().map(|(status, count)| (*status, *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn oct_15_1430() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 10, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_session_id_from_start() {
        let id = SessionId::from_start(oct_15_1430());
        assert_eq!(id.as_str(), "session_20231015_143000");
        assert_eq!(id.started_at(), oct_15_1430());
    }

    #[test]
    fn test_session_id_drops_subsecond_precision() {
        let start = oct_15_1430() + chrono::Duration::milliseconds(750);
        let id = SessionId::from_start(start);
        assert_eq!(id.started_at(), oct_15_1430());
    }

    #[test]
    fn test_session_id_parse() {
        let id = SessionId::parse("session_20231015_143000").unwrap();
        assert_eq!(id.started_at(), oct_15_1430());

        assert_eq!(
            SessionId::parse("foo"),
            Err(SessionIdError::MissingPrefix("foo".to_string()))
        );
        assert!(SessionId::parse("session_2023101_143000").is_err());
        assert!(SessionId::parse("session_20231015_143000.csv").is_err());
        assert!(SessionId::parse("session_20231345_143000").is_err());
    }

    #[test]
    fn test_session_id_serde_transparent() {
        let id = SessionId::parse("session_20231015_143000").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"session_20231015_143000\"");

        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<SessionId>("\"nope\"").is_err());
    }

    #[test]
    fn test_status_counts() {
        let counts = StatusCounts::from_statuses([
            StatusKind::Attentive,
            StatusKind::Attentive,
            StatusKind::Blinking,
            StatusKind::Sleeping,
        ]);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.engaged(), 3);
        assert_eq!(counts.get(StatusKind::Sleeping), 1);
        assert_eq!(counts.get(StatusKind::LookingAway), 0);
    }
}
