//! Rolling blink-rate classification.
//!
//! Counts open→closed eye transitions over fixed windows of face frames and
//! turns the count into a verdict at each window boundary. The verdict holds
//! until the next boundary. A closed-eye run longer than `max_closed_frames`
//! forces `LowAttention` immediately and for the rest of the window.

use std::time::Instant;

use attn_models::StatusKind;
use tracing::debug;

use crate::classifier::{ClassifierConfig, ClassifierStrategy, EyeObservation};

pub struct BlinkRateStrategy {
    ear_threshold: f64,
    window_frames: u32,
    max_closed_frames: u32,
    attentive_max_blinks: u32,
    tired_max_blinks: u32,

    frames_in_window: u32,
    blinks_in_window: u32,
    eye_closed: bool,
    closed_run: u32,
    sustained_closure: bool,
    verdict: StatusKind,
    last_blink_count: Option<u32>,
}

impl BlinkRateStrategy {
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            ear_threshold: config.ear_threshold,
            window_frames: config.blink_window_frames.max(1),
            max_closed_frames: config.max_closed_frames,
            attentive_max_blinks: config.attentive_max_blinks,
            tired_max_blinks: config.tired_max_blinks,
            frames_in_window: 0,
            blinks_in_window: 0,
            eye_closed: false,
            closed_run: 0,
            sustained_closure: false,
            // Nothing observed yet; give the user the benefit of the doubt.
            verdict: StatusKind::Attentive,
            last_blink_count: None,
        }
    }

    /// Blink count of the last completed window.
    pub fn last_blink_count(&self) -> Option<u32> {
        self.last_blink_count
    }

    fn judge(&self, blinks: u32) -> StatusKind {
        if self.sustained_closure {
            StatusKind::LowAttention
        } else if blinks <= self.attentive_max_blinks {
            StatusKind::Attentive
        } else if blinks <= self.tired_max_blinks {
            StatusKind::PossiblyTired
        } else {
            StatusKind::LowAttention
        }
    }
}

impl ClassifierStrategy for BlinkRateStrategy {
    fn classify(&mut self, observation: &EyeObservation<'_>, _now: Instant) -> StatusKind {
        self.frames_in_window += 1;

        if observation.ear < self.ear_threshold {
            if !self.eye_closed {
                self.blinks_in_window += 1;
                self.eye_closed = true;
            }
            self.closed_run += 1;
            if self.closed_run > self.max_closed_frames {
                self.sustained_closure = true;
                self.verdict = StatusKind::LowAttention;
            }
        } else {
            self.eye_closed = false;
            self.closed_run = 0;
        }

        if self.frames_in_window >= self.window_frames {
            self.verdict = self.judge(self.blinks_in_window);
            debug!(
                blinks = self.blinks_in_window,
                sustained_closure = self.sustained_closure,
                verdict = %self.verdict,
                "Blink-rate window closed"
            );
            self.last_blink_count = Some(self.blinks_in_window);
            self.frames_in_window = 0;
            self.blinks_in_window = 0;
            self.sustained_closure = false;
        }

        self.verdict
    }

    fn reset(&mut self) {
        self.eye_closed = false;
        self.closed_run = 0;
    }

    fn name(&self) -> &'static str {
        "blink_rate"
    }
}
