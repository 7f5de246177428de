//! Weekday × hour engagement heatmap.

use attn_models::{HeatmapPoint, HeatmapSeries, SessionScore, WEEKDAY_LABELS};
use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::score::round_to;

pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Bucket {
    sum: f64,
    count: u32,
}

/// Accumulates session scores into 7 × 24 `(sum, count)` buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    buckets: [[Bucket; HOURS_PER_DAY]; 7],
}

impl Default for HeatmapGrid {
    fn default() -> Self {
        Self {
            buckets: [[Bucket::default(); HOURS_PER_DAY]; 7],
        }
    }
}

impl HeatmapGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one score at its session's local start time.
    pub fn add(&mut self, timestamp: NaiveDateTime, score: f64) {
        let day = timestamp.weekday().num_days_from_monday() as usize;
        let hour = timestamp.hour() as usize;
        let bucket = &mut self.buckets[day][hour];
        bucket.sum += score;
        bucket.count += 1;
    }

    /// Sessions recorded in a bucket. `weekday` is 0 for Monday.
    pub fn count(&self, weekday: usize, hour: usize) -> u32 {
        self.buckets
            .get(weekday)
            .and_then(|row| row.get(hour))
            .map_or(0, |b| b.count)
    }

    /// Mean score of a bucket, one decimal; 0 when empty.
    pub fn average(&self, weekday: usize, hour: usize) -> f64 {
        match self.buckets.get(weekday).and_then(|row| row.get(hour)) {
            Some(b) if b.count > 0 => round_to(b.sum / f64::from(b.count), 1),
            _ => 0.0,
        }
    }

    /// One 24-point series per weekday, `Mon` first.
    pub fn to_series(&self) -> Vec<HeatmapSeries> {
        WEEKDAY_LABELS
            .iter()
            .enumerate()
            .map(|(day, name)| HeatmapSeries {
                name: (*name).to_string(),
                data: (0..HOURS_PER_DAY)
                    .map(|hour| HeatmapPoint {
                        label: format!("{hour}:00"),
                        value: self.average(day, hour),
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Build the heatmap series from per-session scores.
pub fn build_heatmap(scores: &[SessionScore]) -> Vec<HeatmapSeries> {
    let mut grid = HeatmapGrid::new();
    for s in scores {
        grid.add(s.timestamp, s.score);
    }
    grid.to_series()
}
