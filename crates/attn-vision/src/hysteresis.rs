//! Eye-closure duration hysteresis with head-pose fallback.
//!
//! Closed eyes always win over the head-pose model: a frame below the EAR
//! threshold is `Blinking` until the eyes have been closed for the sleep
//! threshold, then `Sleeping`. Only open-eye frames reach the predictor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use attn_models::StatusKind;
use tracing::warn;

use crate::classifier::{ClassifierStrategy, EyeObservation};
use crate::predictor::{HeadPosePredictor, PoseLabel};

pub struct HysteresisStrategy {
    ear_threshold: f64,
    sleep_threshold: Duration,
    predictor: Arc<dyn HeadPosePredictor>,
    /// Instant of the first frame in the current closed-eye run.
    eye_closed_since: Option<Instant>,
}

impl HysteresisStrategy {
    pub fn new(
        ear_threshold: f64,
        sleep_threshold: Duration,
        predictor: Arc<dyn HeadPosePredictor>,
    ) -> Self {
        Self {
            ear_threshold,
            sleep_threshold,
            predictor,
            eye_closed_since: None,
        }
    }

    /// Start of the ongoing closed-eye run, if any.
    pub fn eye_closed_since(&self) -> Option<Instant> {
        self.eye_closed_since
    }

    fn classify_head_pose(&self, observation: &EyeObservation<'_>) -> StatusKind {
        if !self.predictor.is_available() {
            return StatusKind::ModelMissing;
        }

        let Some(features) = observation.landmarks.feature_vector() else {
            warn!(
                landmarks = observation.landmarks.len(),
                "Face mesh too small for head-pose features"
            );
            return StatusKind::ModelMissing;
        };

        match self.predictor.predict(&features) {
            Ok(PoseLabel::Distracted) => StatusKind::LookingAway,
            Ok(PoseLabel::Other) => StatusKind::Attentive,
            Err(e) => {
                warn!(error = %e, predictor = self.predictor.name(), "Head-pose prediction failed");
                StatusKind::ModelMissing
            }
        }
    }
}

impl ClassifierStrategy for HysteresisStrategy {
    fn classify(&mut self, observation: &EyeObservation<'_>, now: Instant) -> StatusKind {
        if observation.ear < self.ear_threshold {
            let since = *self.eye_closed_since.get_or_insert(now);
            let elapsed = now.saturating_duration_since(since);
            return if elapsed >= self.sleep_threshold {
                StatusKind::Sleeping
            } else {
                StatusKind::Blinking
            };
        }

        self.eye_closed_since = None;
        self.classify_head_pose(observation)
    }

    fn reset(&mut self) {
        self.eye_closed_since = None;
    }

    fn name(&self) -> &'static str {
        "hysteresis"
    }
}
