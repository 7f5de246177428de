//! Session archive listing.

use std::cmp::Reverse;

use attn_models::{ArchiveEntry, ArchiveSortKey, SessionId, SessionScore, ARCHIVE_DATE_FORMAT};
use attn_storage::{SessionStore, StoredSession};
use tracing::{debug, warn};

use crate::metrics::record_archive_skip;
use crate::score::compute_score;

/// Stored logs whose names parse as session identities, newest first.
async fn sessions_in_store<S>(store: &S, sort: ArchiveSortKey) -> Vec<(StoredSession, SessionId)>
where
    S: SessionStore + ?Sized,
{
    let stored = match store.list().await {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "Failed to list session store");
            return Vec::new();
        }
    };

    let mut sessions: Vec<(StoredSession, SessionId)> = stored
        .into_iter()
        .filter_map(|entry| match SessionId::parse(entry.stem()) {
            Ok(id) => Some((entry, id)),
            Err(e) => {
                debug!(filename = %entry.filename, error = %e, "Skipping non-session file");
                record_archive_skip();
                None
            }
        })
        .collect();

    match sort {
        ArchiveSortKey::ModifiedTime => sessions.sort_by_key(|(entry, _)| Reverse(entry.modified)),
        ArchiveSortKey::EmbeddedTimestamp => {
            sessions.sort_by_key(|(_, id)| Reverse(id.started_at()))
        }
    }
    sessions
}

/// List every persisted session with its display date and score.
///
/// Files whose names don't match `session_<YYYYMMDD>_<HHMMSS>.csv` are skipped.
pub async fn list_archive<S>(store: &S, sort: ArchiveSortKey) -> Vec<ArchiveEntry>
where
    S: SessionStore + ?Sized,
{
    let sessions = sessions_in_store(store, sort).await;

    let mut entries = Vec::with_capacity(sessions.len());
    for (stored, id) in sessions {
        let score = compute_score(store, &id).await;
        entries.push(ArchiveEntry {
            date: id.started_at().format(ARCHIVE_DATE_FORMAT).to_string(),
            score,
            filename: stored.filename,
        });
    }

    debug!(entries = entries.len(), sort = %sort, "Listed session archive");
    entries
}

/// `(start, score)` for every persisted session, oldest first. Feeds the heatmap.
pub async fn session_scores<S>(store: &S) -> Vec<SessionScore>
where
    S: SessionStore + ?Sized,
{
    let mut sessions = sessions_in_store(store, ArchiveSortKey::EmbeddedTimestamp).await;
    sessions.reverse();

    let mut scores = Vec::with_capacity(sessions.len());
    for (_, id) in sessions {
        let score = compute_score(store, &id).await;
        scores.push(SessionScore::new(id.started_at(), score));
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use attn_models::{FrameRecord, SessionLog, StatusKind};
    use attn_storage::LocalSessionStore;
    use std::time::{Duration, SystemTime};

    async fn persist(store: &LocalSessionStore, name: &str, statuses: &[StatusKind]) {
        let id = SessionId::parse(name).unwrap();
        let records = statuses.iter().map(|s| FrameRecord::now(*s)).collect();
        store.persist(&SessionLog::with_records(id, records)).await.unwrap();
    }

    fn set_mtime(store: &LocalSessionStore, filename: &str, secs_after_epoch: u64) {
        let file = std::fs::File::options()
            .write(true)
            .open(store.root().join(filename))
            .unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch))
            .unwrap();
    }

    #[tokio::test]
    async fn test_archive_entry_format_and_skip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalSessionStore::new(dir.path());
        persist(
            &store,
            "session_20231015_143000",
            &[StatusKind::Attentive, StatusKind::LookingAway],
        )
        .await;
        std::fs::write(dir.path().join("foo.csv"), "timestamp,status\n").unwrap();

        let entries = list_archive(&store, ArchiveSortKey::ModifiedTime).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, "Oct 15, 2023 02:30 PM");
        assert_eq!(entries[0].score, 50.0);
        assert_eq!(entries[0].filename, "session_20231015_143000.csv");
    }

    #[tokio::test]
    async fn test_archive_sort_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalSessionStore::new(dir.path());
        persist(&store, "session_20230101_090000", &[StatusKind::Attentive]).await;
        persist(&store, "session_20240101_090000", &[StatusKind::Sleeping]).await;

        // The older session was modified most recently.
        set_mtime(&store, "session_20230101_090000.csv", 2_000_000_000);
        set_mtime(&store, "session_20240101_090000.csv", 1_000_000_000);

        let by_mtime = list_archive(&store, ArchiveSortKey::ModifiedTime).await;
        assert_eq!(by_mtime[0].filename, "session_20230101_090000.csv");
        assert_eq!(by_mtime[0].score, 100.0);

        let by_start = list_archive(&store, ArchiveSortKey::EmbeddedTimestamp).await;
        assert_eq!(by_start[0].filename, "session_20240101_090000.csv");
        assert_eq!(by_start[0].score, 0.0);
    }

    #[tokio::test]
    async fn test_archive_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalSessionStore::new(dir.path().join("reports"));
        assert!(list_archive(&store, ArchiveSortKey::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_session_scores_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalSessionStore::new(dir.path());
        persist(&store, "session_20240101_090000", &[StatusKind::Sleeping]).await;
        persist(&store, "session_20230101_090000", &[StatusKind::Blinking]).await;
        std::fs::write(dir.path().join("session_bad.csv"), "timestamp,status\n").unwrap();

        let scores = session_scores(&store).await;
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].timestamp.to_string(), "2023-01-01 09:00:00");
        assert_eq!(scores[0].score, 100.0);
        assert_eq!(scores[1].score, 0.0);
    }
}
