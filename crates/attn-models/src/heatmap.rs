//! Weekday × hour heatmap models.

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Weekday labels, Monday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Session-level input to the heatmap: when it started and how it scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionScore {
    pub timestamp: NaiveDateTime,
    pub score: f64,
}

impl SessionScore {
    pub fn new(timestamp: NaiveDateTime, score: f64) -> Self {
        Self { timestamp, score }
    }
}

/// One hour cell of a weekday series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HeatmapPoint {
    /// Hour label, e.g. `"14:00"`.
    #[serde(rename = "x")]
    pub label: String,
    /// Average score for the bucket (1 decimal), 0 when empty.
    #[serde(rename = "y")]
    pub value: f64,
}

/// 24 hourly points for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HeatmapSeries {
    /// Weekday label from [`WEEKDAY_LABELS`].
    pub name: String,
    pub data: Vec<HeatmapPoint>,
}
