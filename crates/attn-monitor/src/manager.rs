//! Session lifecycle.
//!
//! A `SessionManager` owns at most one active session. Frames are processed
//! serially under the manager's mutex (pull → classify → record), and
//! `stop_session` takes the same mutex, so a stop waits for the in-flight
//! frame before releasing the source and flushing the log.

use std::sync::Arc;
use std::time::{Duration, Instant};

use attn_analytics::summarize;
use attn_models::{SessionId, SessionLog, SessionSummary, StatusKind};
use attn_storage::{LocalSessionStore, SessionStore};
use attn_vision::{
    load_predictor, AttentionClassifier, ClassifierConfig, FrameSource, HeadPosePredictor,
};
use chrono::{DateTime, Local, TimeDelta};
use tokio::sync::Mutex;
use tracing::{debug, warn, Instrument};

use crate::config::MonitorConfig;
use crate::logging::SessionLogger;
use crate::metrics::{record_frame, record_session_persisted};
use crate::recorder::SessionRecorder;

/// Result of one `process_next_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was classified and recorded.
    Classified(StatusKind),
    /// The source has no more frames; the session is still open.
    StreamEnded,
    /// No session is active.
    Idle,
}

struct ActiveSession {
    recorder: SessionRecorder,
    classifier: AttentionClassifier,
    source: Box<dyn FrameSource>,
    logger: SessionLogger,
    started_at: DateTime<Local>,
    started_instant: Instant,
    stream_ended: bool,
}

impl ActiveSession {
    /// Clock reading for a frame captured `ms` after the session started.
    /// `None` when the offset is past what either clock can represent.
    fn clock_at_offset(&self, ms: u64) -> Option<(Instant, DateTime<Local>)> {
        let instant = self.started_instant.checked_add(Duration::from_millis(ms))?;
        let delta = TimeDelta::try_milliseconds(i64::try_from(ms).ok()?)?;
        let timestamp = self.started_at.checked_add_signed(delta)?;
        Some((instant, timestamp))
    }
}

/// Owns the single active monitoring session.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    predictor: Arc<dyn HeadPosePredictor>,
    classifier_config: ClassifierConfig,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        predictor: Arc<dyn HeadPosePredictor>,
        classifier_config: ClassifierConfig,
    ) -> Self {
        Self {
            store,
            predictor,
            classifier_config,
            active: Mutex::new(None),
        }
    }

    /// Local directory store and the configured head-pose model.
    ///
    /// A missing model is not an error; frames with open eyes are then
    /// classified as `ModelMissing`.
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            Arc::new(LocalSessionStore::new(&config.reports_dir)),
            load_predictor(&config.model_path),
            config.classifier.clone(),
        )
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    /// Start monitoring `source`.
    ///
    /// If a session is already active its id is returned and `source` is
    /// released unused.
    pub async fn start_session(&self, mut source: Box<dyn FrameSource>) -> SessionId {
        let mut active = self.active.lock().await;
        if let Some(session) = active.as_ref() {
            debug!(session_id = %session.recorder.id(), "Session already active");
            source.release();
            return session.recorder.id().clone();
        }

        let started_at = Local::now();
        let id = SessionId::from_start(started_at.naive_local());
        let classifier =
            AttentionClassifier::from_config(&self.classifier_config, Arc::clone(&self.predictor));
        let logger = SessionLogger::new(&id, "monitor");
        logger.log_started(classifier.strategy_name(), self.predictor.name());

        *active = Some(ActiveSession {
            recorder: SessionRecorder::new(id.clone()),
            classifier,
            source,
            logger,
            started_at,
            started_instant: Instant::now(),
            stream_ended: false,
        });
        id
    }

    pub async fn is_active(&self) -> bool {
        self.active.lock().await.is_some()
    }

    pub async fn active_session_id(&self) -> Option<SessionId> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|s| s.recorder.id().clone())
    }

    /// Pull, classify and record one frame.
    pub async fn process_next_frame(&self) -> FrameOutcome {
        let mut active = self.active.lock().await;
        let Some(session) = active.as_mut() else {
            return FrameOutcome::Idle;
        };
        if session.stream_ended {
            return FrameOutcome::StreamEnded;
        }

        let Some(frame) = session.source.next_frame() else {
            session.stream_ended = true;
            session.logger.log_stream_ended(session.recorder.len());
            return FrameOutcome::StreamEnded;
        };

        // Replayed frames carry their capture offset; live frames are stamped now.
        let stamped = frame.offset_ms.and_then(|ms| {
            let clock = session.clock_at_offset(ms);
            if clock.is_none() {
                warn!(
                    session_id = %session.recorder.id(),
                    offset_ms = ms,
                    "Frame offset out of range, stamping with current time"
                );
            }
            clock
        });
        let (now, timestamp) = stamped.unwrap_or_else(|| (Instant::now(), Local::now()));

        let status = session.classifier.classify_frame(&frame, now);
        session.recorder.record(timestamp, status);
        record_frame(status);
        FrameOutcome::Classified(status)
    }

    /// Process frames until the source runs dry. Returns frames recorded.
    pub async fn run_until_stream_end(&self) -> usize {
        let mut frames = 0;
        while let FrameOutcome::Classified(_) = self.process_next_frame().await {
            frames += 1;
        }
        frames
    }

    /// Stop the active session, persisting its log if it has any frames.
    ///
    /// Returns `None` when idle, when nothing was recorded, or when the log
    /// could not be persisted (the failure is logged).
    pub async fn stop_session(&self) -> Option<SessionId> {
        self.finish().await.map(|log| log.id)
    }

    /// Like [`stop_session`](Self::stop_session), returning the session summary.
    pub async fn stop_and_summarize(&self) -> Option<SessionSummary> {
        self.finish().await.map(|log| summarize(&log))
    }

    async fn finish(&self) -> Option<SessionLog> {
        let mut active = self.active.lock().await;
        let mut session = active.take()?;
        session.source.release();

        let logger = session.logger;
        if session.recorder.is_empty() {
            logger.log_discarded();
            return None;
        }

        let log = session.recorder.into_log();
        let span = logger.create_span();
        match self.store.persist(&log).instrument(span).await {
            Ok(_) => {
                record_session_persisted();
                logger.log_stopped(&log.counts());
                Some(log)
            }
            Err(e) => {
                logger.log_persist_failed(&e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attn_vision::landmarks::synthetic::face_with_openness;
    use attn_vision::{ClassifierPolicy, Frame, NullPredictor, VecFrameSource};
    use chrono::Datelike;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Frame source that reports releases to the test.
    struct TrackedSource {
        inner: VecFrameSource,
        releases: Arc<AtomicUsize>,
    }

    impl TrackedSource {
        fn new(frames: Vec<Frame>) -> (Box<dyn FrameSource>, Arc<AtomicUsize>) {
            let releases = Arc::new(AtomicUsize::new(0));
            let source = Self {
                inner: VecFrameSource::new(frames),
                releases: Arc::clone(&releases),
            };
            (Box::new(source), releases)
        }
    }

    impl FrameSource for TrackedSource {
        fn next_frame(&mut self) -> Option<Frame> {
            self.inner.next_frame()
        }

        fn release(&mut self) {
            if !self.inner.is_released() {
                self.releases.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.release();
        }

        fn is_released(&self) -> bool {
            self.inner.is_released()
        }
    }

    fn manager(dir: &std::path::Path, policy: ClassifierPolicy) -> SessionManager {
        let config = ClassifierConfig {
            policy,
            ..Default::default()
        };
        SessionManager::new(
            Arc::new(LocalSessionStore::new(dir)),
            Arc::new(NullPredictor),
            config,
        )
    }

    fn closed(offset_ms: u64) -> Frame {
        Frame::with_face(640, 480, face_with_openness(0.02)).at_offset(offset_ms)
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), ClassifierPolicy::Hysteresis);

        let (first, _) = TrackedSource::new(vec![]);
        let (second, second_releases) = TrackedSource::new(vec![]);
        let id = manager.start_session(first).await;
        assert_eq!(manager.start_session(second).await, id);
        assert_eq!(second_releases.load(Ordering::SeqCst), 1);
        assert_eq!(manager.active_session_id().await, Some(id));
    }

    #[tokio::test]
    async fn test_idle_manager() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), ClassifierPolicy::Hysteresis);
        assert_eq!(manager.process_next_frame().await, FrameOutcome::Idle);
        assert!(manager.stop_session().await.is_none());
        assert!(!manager.is_active().await);
    }

    #[tokio::test]
    async fn test_stop_persists_once_and_releases_source() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), ClassifierPolicy::Hysteresis);
        let frames = vec![
            Frame::without_face(640, 480),
            closed(0),
            Frame::without_face(640, 480),
        ];
        let (source, releases) = TrackedSource::new(frames);

        manager.start_session(source).await;
        assert_eq!(manager.run_until_stream_end().await, 3);
        assert_eq!(manager.process_next_frame().await, FrameOutcome::StreamEnded);

        let id = manager.stop_session().await.unwrap();
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(manager.stop_session().await.is_none());
        assert!(!manager.is_active().await);

        let log = manager.store().read(&id).await.unwrap();
        assert_eq!(
            log.records.iter().map(|r| r.status).collect::<Vec<_>>(),
            vec![StatusKind::Searching, StatusKind::Blinking, StatusKind::NotDetected]
        );
        assert_eq!(manager.store().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_session_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), ClassifierPolicy::Hysteresis);
        let (source, releases) = TrackedSource::new(vec![]);

        manager.start_session(source).await;
        assert!(manager.stop_session().await.is_none());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(manager.store().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replayed_offsets_drive_sleep_detection() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), ClassifierPolicy::Hysteresis);
        let frames = (0..=20).map(|i| closed(i * 100)).collect();
        let (source, _) = TrackedSource::new(frames);

        manager.start_session(source).await;
        let mut statuses = Vec::new();
        while let FrameOutcome::Classified(status) = manager.process_next_frame().await {
            statuses.push(status);
        }

        assert_eq!(statuses[14], StatusKind::Blinking);
        assert_eq!(statuses[15], StatusKind::Sleeping);
        assert_eq!(statuses[20], StatusKind::Sleeping);

        let summary = manager.stop_and_summarize().await.unwrap();
        assert_eq!(summary.total_frames, 21);
        assert_eq!(summary.counts.get(StatusKind::Blinking), 15);
        assert_eq!(summary.score, 71.43);
    }

    #[tokio::test]
    async fn test_out_of_range_offsets_fall_back_to_wall_clock() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), ClassifierPolicy::Hysteresis);
        let frames = vec![
            Frame::without_face(640, 480).at_offset(10_000_000_000_000_000),
            Frame::without_face(640, 480).at_offset(u64::MAX),
            closed(0),
        ];
        let (source, _) = TrackedSource::new(frames);

        let id = manager.start_session(source).await;
        assert_eq!(manager.run_until_stream_end().await, 3);
        assert_eq!(manager.stop_session().await, Some(id.clone()));

        let log = manager.store().read(&id).await.unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log.records[0].status, StatusKind::Searching);
        assert_eq!(log.records[1].status, StatusKind::Searching);
        assert_eq!(log.records[2].status, StatusKind::Blinking);
        assert!(log.records.iter().all(|r| r.timestamp.year() < 3000));
    }

    #[tokio::test]
    async fn test_persist_failure_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "occupied").unwrap();
        let manager = manager(&blocker, ClassifierPolicy::BlinkRate);
        let (source, releases) = TrackedSource::new(vec![closed(0)]);

        manager.start_session(source).await;
        assert_eq!(
            manager.process_next_frame().await,
            FrameOutcome::Classified(StatusKind::Attentive)
        );
        assert!(manager.stop_session().await.is_none());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(!manager.is_active().await);
    }
}
