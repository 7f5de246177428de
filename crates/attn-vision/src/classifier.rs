//! Per-frame attention classification.
//!
//! `AttentionClassifier` owns the cross-frame state for one session. It
//! handles face presence itself and hands every frame with a face to a
//! `ClassifierStrategy`:
//!
//! | Policy | Eyes closed | Eyes open |
//! |--------|-------------|-----------|
//! | `Hysteresis` | `Blinking` → `Sleeping` after 1.5 s | head-pose predictor |
//! | `BlinkRate` | counts blinks per window | window verdict |

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use attn_models::StatusKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::blink_rate::BlinkRateStrategy;
use crate::frame::Frame;
use crate::hysteresis::HysteresisStrategy;
use crate::landmarks::{average_ear, LandmarkSet};
use crate::predictor::HeadPosePredictor;

/// Classification strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierPolicy {
    /// Eye-closure duration hysteresis with head-pose fallback.
    #[default]
    Hysteresis,
    /// Rolling blink-rate windows.
    BlinkRate,
}

impl ClassifierPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierPolicy::Hysteresis => "hysteresis",
            ClassifierPolicy::BlinkRate => "blink_rate",
        }
    }
}

impl fmt::Display for ClassifierPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClassifierPolicy {
    type Err = ClassifierPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hysteresis" | "duration" => Ok(ClassifierPolicy::Hysteresis),
            "blink_rate" | "blink-rate" | "blinkrate" => Ok(ClassifierPolicy::BlinkRate),
            _ => Err(ClassifierPolicyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown classifier policy: {0}")]
pub struct ClassifierPolicyParseError(String);

/// Configuration for attention classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Strategy to run (default: hysteresis)
    pub policy: ClassifierPolicy,

    /// Average EAR below which eyes count as closed (default: 0.25)
    pub ear_threshold: f64,

    /// Closed-eye duration that counts as sleep, inclusive (default: 1500 ms)
    pub sleep_threshold_ms: u64,

    /// Face frames per blink-rate window (default: 90, ~3 s)
    pub blink_window_frames: u32,

    /// Closed-eye run, in frames, that forces `LowAttention` (default: 45)
    pub max_closed_frames: u32,

    /// Blinks per window still considered attentive (default: 5)
    pub attentive_max_blinks: u32,

    /// Blinks per window still considered merely tired (default: 12)
    pub tired_max_blinks: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            policy: ClassifierPolicy::Hysteresis,
            ear_threshold: 0.25,
            sleep_threshold_ms: 1500,
            blink_window_frames: 90,
            max_closed_frames: 45,
            attentive_max_blinks: 5,
            tired_max_blinks: 12,
        }
    }
}

impl ClassifierConfig {
    pub fn sleep_threshold(&self) -> Duration {
        Duration::from_millis(self.sleep_threshold_ms)
    }
}

/// One frame with a detected face, ready for a strategy.
#[derive(Debug, Clone, Copy)]
pub struct EyeObservation<'a> {
    pub landmarks: &'a LandmarkSet,
    /// Average of left and right eye aspect ratios.
    pub ear: f64,
}

/// Interchangeable per-frame policy over the EAR signal.
pub trait ClassifierStrategy: Send {
    /// Classify a frame with a face.
    fn classify(&mut self, observation: &EyeObservation<'_>, now: Instant) -> StatusKind;

    /// Drop closed-eye state after a frame without a face.
    fn reset(&mut self);

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Stateful classifier for one monitoring session.
pub struct AttentionClassifier {
    strategy: Box<dyn ClassifierStrategy>,
    face_seen: bool,
}

impl AttentionClassifier {
    pub fn new(strategy: Box<dyn ClassifierStrategy>) -> Self {
        Self {
            strategy,
            face_seen: false,
        }
    }

    /// Build the strategy selected by `config.policy`.
    pub fn from_config(config: &ClassifierConfig, predictor: Arc<dyn HeadPosePredictor>) -> Self {
        let strategy: Box<dyn ClassifierStrategy> = match config.policy {
            ClassifierPolicy::Hysteresis => Box::new(HysteresisStrategy::new(
                config.ear_threshold,
                config.sleep_threshold(),
                predictor,
            )),
            ClassifierPolicy::BlinkRate => Box::new(BlinkRateStrategy::from_config(config)),
        };
        Self::new(strategy)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Classify one frame; exactly one status per call.
    pub fn classify_frame(&mut self, frame: &Frame, now: Instant) -> StatusKind {
        let Some(landmarks) = frame.face.as_ref() else {
            self.strategy.reset();
            return if self.face_seen {
                StatusKind::NotDetected
            } else {
                StatusKind::Searching
            };
        };

        self.face_seen = true;
        let ear = average_ear(landmarks, frame.width, frame.height);
        let status = self
            .strategy
            .classify(&EyeObservation { landmarks, ear }, now);

        debug!(ear = ear, status = %status, strategy = self.strategy.name(), "Classified frame");
        status
    }
}
