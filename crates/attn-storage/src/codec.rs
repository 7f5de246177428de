//! Session log CSV encoding.
//!
//! Layout:
//!
//! ```text
//! timestamp,status
//! 2023-10-15T14:30:00.040+02:00,Attentive
//! 2023-10-15T14:30:00.073+02:00,Looking Away
//! ```
//!
//! Statuses are written as display labels. Readers locate columns by header
//! name, so extra columns written by other tools are ignored.

use attn_models::{FrameRecord, SessionId, SessionLog, StatusKind};
use chrono::{DateTime, Local, SecondsFormat};

use crate::error::{StorageError, StorageResult};

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const STATUS_COLUMN: &str = "status";

/// Encode a session log as CSV text.
pub fn encode_log(log: &SessionLog) -> String {
    let mut out = String::with_capacity(32 + log.len() * 40);
    out.push_str(TIMESTAMP_COLUMN);
    out.push(',');
    out.push_str(STATUS_COLUMN);
    out.push('\n');

    for record in &log.records {
        out.push_str(&record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, false));
        out.push(',');
        out.push_str(record.status.label());
        out.push('\n');
    }
    out
}

/// Decode CSV text written by [`encode_log`].
pub fn decode_log(id: SessionId, text: &str) -> StorageResult<SessionLog> {
    let name = id.as_str().to_string();
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| StorageError::malformed(&name, 1, "missing header"))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let column = |wanted: &str| {
        columns
            .iter()
            .position(|c| *c == wanted)
            .ok_or_else(|| StorageError::malformed(&name, 1, format!("missing '{wanted}' column")))
    };
    let ts_idx = column(TIMESTAMP_COLUMN)?;
    let status_idx = column(STATUS_COLUMN)?;

    let mut records = Vec::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |idx: usize| {
            fields
                .get(idx)
                .copied()
                .ok_or_else(|| StorageError::malformed(&name, line_no, "missing field"))
        };

        let timestamp = DateTime::parse_from_rfc3339(field(ts_idx)?)
            .map_err(|e| StorageError::malformed(&name, line_no, format!("bad timestamp: {e}")))?
            .with_timezone(&Local);
        let status: StatusKind = field(status_idx)?
            .parse()
            .map_err(|e| StorageError::malformed(&name, line_no, format!("{e}")))?;

        records.push(FrameRecord::new(timestamp, status));
    }

    Ok(SessionLog::with_records(id, records))
}
