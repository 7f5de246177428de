//! Session store abstraction and the local directory implementation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use attn_models::{SessionId, SessionLog};
use tracing::{debug, info, warn};

use crate::codec::{decode_log, encode_log};
use crate::error::{StorageError, StorageResult};

/// File extension of persisted session logs.
pub const LOG_EXTENSION: &str = "csv";

/// A persisted log as seen by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    /// File name including extension, e.g. `session_20231015_143000.csv`.
    pub filename: String,
    /// Last modification time (epoch if the platform can't tell).
    pub modified: SystemTime,
}

impl StoredSession {
    /// File name without the `.csv` extension.
    pub fn stem(&self) -> &str {
        self.filename
            .strip_suffix(LOG_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(&self.filename)
    }
}

/// Persistence for finished session logs. Persisted logs are read-only.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a finished log under its session identity.
    async fn persist(&self, log: &SessionLog) -> StorageResult<SessionId>;

    /// Enumerate persisted logs. A missing store is empty, not an error.
    async fn list(&self) -> StorageResult<Vec<StoredSession>>;

    /// Read one persisted log.
    async fn read(&self, id: &SessionId) -> StorageResult<SessionLog>;
}

/// Session store backed by a directory of CSV files.
#[derive(Debug, Clone)]
pub struct LocalSessionStore {
    root: PathBuf,
}

impl LocalSessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the log file for a session.
    pub fn path_for(&self, id: &SessionId) -> PathBuf {
        self.root.join(format!("{}.{}", id.as_str(), LOG_EXTENSION))
    }
}

#[async_trait]
impl SessionStore for LocalSessionStore {
    async fn persist(&self, log: &SessionLog) -> StorageResult<SessionId> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.path_for(&log.id);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            // Two sessions started within the same second share a name.
            warn!(path = %path.display(), "Overwriting existing session log");
        }

        // Write to a temp file first so readers never see a partial log.
        let tmp = path.with_extension("csv.tmp");
        tokio::fs::write(&tmp, encode_log(log)).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                debug!(path = %tmp.display(), error = %cleanup, "Failed to remove temp log");
            }
            return Err(e.into());
        }

        info!(
            session_id = %log.id,
            frames = log.len(),
            path = %path.display(),
            "Persisted session log"
        );
        Ok(log.id.clone())
    }

    async fn list(&self) -> StorageResult<Vec<StoredSession>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(root = %self.root.display(), "Session store does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut sessions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_log = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(LOG_EXTENSION));
            if !is_log {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat session log");
                    continue;
                }
            };

            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            sessions.push(StoredSession {
                filename: filename.to_string(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }

        Ok(sessions)
    }

    async fn read(&self, id: &SessionId) -> StorageResult<SessionLog> {
        let path = self.path_for(id);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::not_found(id.as_str()));
            }
            Err(e) => return Err(e.into()),
        };
        decode_log(id.clone(), &text)
    }
}
