//! In-memory frame record accumulation for the active session.

use attn_models::{FrameRecord, SessionId, SessionLog, StatusKind};
use chrono::{DateTime, Local};

/// Owns the records of one session until it is flushed.
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    log: SessionLog,
}

impl SessionRecorder {
    pub fn new(id: SessionId) -> Self {
        Self {
            log: SessionLog::new(id),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.log.id
    }

    /// Append one classified frame.
    pub fn record(&mut self, timestamp: DateTime<Local>, status: StatusKind) {
        self.log.records.push(FrameRecord::new(timestamp, status));
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Hand the accumulated log over for persistence.
    pub fn into_log(self) -> SessionLog {
        self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_keep_order() {
        let id = SessionId::parse("session_20231015_143000").unwrap();
        let mut recorder = SessionRecorder::new(id.clone());
        assert!(recorder.is_empty());

        let t0 = Local::now();
        recorder.record(t0, StatusKind::Searching);
        recorder.record(t0, StatusKind::Attentive);

        let log = recorder.into_log();
        assert_eq!(log.id, id);
        assert_eq!(
            log.records.iter().map(|r| r.status).collect::<Vec<_>>(),
            vec![StatusKind::Searching, StatusKind::Attentive]
        );
    }
}
