//! Monitor configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use attn_models::ArchiveSortKey;
use attn_vision::{ClassifierConfig, ClassifierPolicy};
use tracing::warn;

/// Monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Directory holding persisted session logs
    pub reports_dir: PathBuf,
    /// Head-pose model artifact (`.json`, or `.onnx` with the `onnx` feature)
    pub model_path: PathBuf,
    /// Classifier strategy and thresholds
    pub classifier: ClassifierConfig,
    /// Archive ordering
    pub archive_sort: ArchiveSortKey,
    /// Prometheus scrape endpoint; disabled when unset
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("reports"),
            model_path: PathBuf::from("engagement_model.json"),
            classifier: ClassifierConfig::default(),
            archive_sort: ArchiveSortKey::ModifiedTime,
            metrics_addr: None,
        }
    }
}

impl MonitorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = ClassifierConfig::default();

        let policy = match std::env::var("ATTN_CLASSIFIER") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Invalid ATTN_CLASSIFIER, using hysteresis");
                ClassifierPolicy::Hysteresis
            }),
            Err(_) => defaults.policy,
        };

        let archive_sort = match std::env::var("ATTN_ARCHIVE_SORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Invalid ATTN_ARCHIVE_SORT, using modification time");
                ArchiveSortKey::ModifiedTime
            }),
            Err(_) => ArchiveSortKey::default(),
        };

        let classifier = ClassifierConfig {
            policy,
            ear_threshold: std::env::var("ATTN_EAR_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.ear_threshold),
            sleep_threshold_ms: std::env::var("ATTN_SLEEP_THRESHOLD_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sleep_threshold_ms),
            blink_window_frames: std::env::var("ATTN_BLINK_WINDOW_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.blink_window_frames),
            max_closed_frames: std::env::var("ATTN_MAX_CLOSED_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_closed_frames),
            ..defaults
        };

        Self {
            reports_dir: std::env::var("ATTN_REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("reports")),
            model_path: std::env::var("ATTN_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("engagement_model.json")),
            classifier,
            archive_sort,
            metrics_addr: std::env::var("ATTN_METRICS_ADDR")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 9] = [
        "ATTN_REPORTS_DIR",
        "ATTN_MODEL_PATH",
        "ATTN_CLASSIFIER",
        "ATTN_EAR_THRESHOLD",
        "ATTN_SLEEP_THRESHOLD_MS",
        "ATTN_BLINK_WINDOW_FRAMES",
        "ATTN_MAX_CLOSED_FRAMES",
        "ATTN_ARCHIVE_SORT",
        "ATTN_METRICS_ADDR",
    ];

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.model_path, PathBuf::from("engagement_model.json"));
        assert_eq!(config.classifier.policy, ClassifierPolicy::Hysteresis);
        assert_eq!(config.archive_sort, ArchiveSortKey::ModifiedTime);
        assert!(config.metrics_addr.is_none());
    }

    // Single test touching the environment so parallel tests don't race.
    #[test]
    fn test_from_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
        let config = MonitorConfig::from_env();
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.classifier.sleep_threshold_ms, 1500);

        std::env::set_var("ATTN_REPORTS_DIR", "/tmp/attn-reports");
        std::env::set_var("ATTN_CLASSIFIER", "blink_rate");
        std::env::set_var("ATTN_EAR_THRESHOLD", "0.2");
        std::env::set_var("ATTN_BLINK_WINDOW_FRAMES", "not-a-number");
        std::env::set_var("ATTN_ARCHIVE_SORT", "embedded");
        std::env::set_var("ATTN_METRICS_ADDR", "127.0.0.1:9100");

        let config = MonitorConfig::from_env();
        assert_eq!(config.reports_dir, PathBuf::from("/tmp/attn-reports"));
        assert_eq!(config.classifier.policy, ClassifierPolicy::BlinkRate);
        assert_eq!(config.classifier.ear_threshold, 0.2);
        assert_eq!(config.classifier.blink_window_frames, 90);
        assert_eq!(config.archive_sort, ArchiveSortKey::EmbeddedTimestamp);
        assert_eq!(config.metrics_addr, Some("127.0.0.1:9100".parse().unwrap()));

        std::env::set_var("ATTN_CLASSIFIER", "nonsense");
        assert_eq!(MonitorConfig::from_env().classifier.policy, ClassifierPolicy::Hysteresis);

        for var in VARS {
            std::env::remove_var(var);
        }
    }
}
