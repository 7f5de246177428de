//! Attention status definitions.
//!
//! A `StatusKind` is emitted exactly once per processed frame by the
//! attention classifier:
//!
//! - `Searching` / `NotDetected`: no face in the frame
//! - `ModelMissing`: eyes open but no head-pose predictor loaded
//! - `Sleeping` / `Blinking`: eyes closed (long / short)
//! - `Attentive` / `LookingAway`: eyes open, head-pose verdict
//! - `PossiblyTired` / `LowAttention`: rolling blink-rate verdicts

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Attention status for a single frame.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// No face has been seen yet in this session.
    Searching,

    /// A face was seen earlier in the session but not in this frame.
    NotDetected,

    /// Eyes are open but no head-pose predictor is available.
    ModelMissing,

    /// Eyes have stayed closed past the sleep threshold.
    Sleeping,

    /// Eyes are closed, but not yet for long enough to count as sleep.
    Blinking,

    /// Eyes open and the head-pose predictor sees the user facing the screen.
    Attentive,

    /// Eyes open and the head-pose predictor reports a distracted pose.
    LookingAway,

    /// Blink-rate window verdict: elevated blink count.
    PossiblyTired,

    /// Blink-rate window verdict: very high blink count or sustained closure.
    LowAttention,
}

impl StatusKind {
    /// All statuses in display order.
    pub const ALL: &'static [StatusKind] = &[
        StatusKind::Searching,
        StatusKind::NotDetected,
        StatusKind::ModelMissing,
        StatusKind::Sleeping,
        StatusKind::Blinking,
        StatusKind::Attentive,
        StatusKind::LookingAway,
        StatusKind::PossiblyTired,
        StatusKind::LowAttention,
    ];

    /// Machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Searching => "searching",
            StatusKind::NotDetected => "not_detected",
            StatusKind::ModelMissing => "model_missing",
            StatusKind::Sleeping => "sleeping",
            StatusKind::Blinking => "blinking",
            StatusKind::Attentive => "attentive",
            StatusKind::LookingAway => "looking_away",
            StatusKind::PossiblyTired => "possibly_tired",
            StatusKind::LowAttention => "low_attention",
        }
    }

    /// Label written to persisted session logs and shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            StatusKind::Searching => "Searching",
            StatusKind::NotDetected => "Not Detected",
            StatusKind::ModelMissing => "Model Missing",
            StatusKind::Sleeping => "Sleeping",
            StatusKind::Blinking => "Blinking",
            StatusKind::Attentive => "Attentive",
            StatusKind::LookingAway => "Looking Away",
            StatusKind::PossiblyTired => "Possibly Tired",
            StatusKind::LowAttention => "Low Attention",
        }
    }

    /// Whether a frame with this status counts toward the engagement score.
    ///
    /// A normal blink is not inattention, so `Blinking` counts as engaged.
    pub fn is_engaged(&self) -> bool {
        matches!(self, StatusKind::Attentive | StatusKind::Blinking)
    }

    /// Returns true if the frame had no usable face.
    pub fn is_face_absent(&self) -> bool {
        matches!(self, StatusKind::Searching | StatusKind::NotDetected)
    }

    /// Returns true if the status reflects closed eyes.
    pub fn is_eyes_closed(&self) -> bool {
        matches!(self, StatusKind::Sleeping | StatusKind::Blinking)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for StatusKind {
    type Err = StatusParseError;

    /// Accepts both display labels ("Looking Away") and snake_case names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        StatusKind::ALL
            .iter()
            .copied()
            .find(|status| {
                status.label().eq_ignore_ascii_case(trimmed)
                    || status.as_str().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| StatusParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown attention status: {0}")]
pub struct StatusParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("Attentive".parse::<StatusKind>().unwrap(), StatusKind::Attentive);
        assert_eq!("Looking Away".parse::<StatusKind>().unwrap(), StatusKind::LookingAway);
        assert_eq!("looking_away".parse::<StatusKind>().unwrap(), StatusKind::LookingAway);
        assert_eq!(" model missing ".parse::<StatusKind>().unwrap(), StatusKind::ModelMissing);
        assert!("Drowsy".parse::<StatusKind>().is_err());
    }

    #[test]
    fn test_label_round_trips_for_every_status() {
        for status in StatusKind::ALL {
            assert_eq!(status.label().parse::<StatusKind>().unwrap(), *status);
        }
    }

    #[test]
    fn test_engaged_statuses() {
        let engaged: Vec<_> = StatusKind::ALL.iter().filter(|s| s.is_engaged()).collect();
        assert_eq!(engaged, vec![&StatusKind::Blinking, &StatusKind::Attentive]);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&StatusKind::LookingAway).unwrap();
        assert_eq!(json, "\"looking_away\"");
    }
}
