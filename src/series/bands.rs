// Mean and standard-deviation bands over the failure series
//
// Two policies:
// - whole range: one estimate over every failure, drawn as flat two-point
//   lines between the first and last failure
// - sliding window: a FIFO of failures trimmed to a trailing span of
//   `days * 86_400_000` ms, one band point per failure once the series has
//   covered a full window

use super::builder::Point;
use crate::timestamp::{Timestamp, MS_PER_DAY};
use crate::variance::{online_variance, VarianceResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How band statistics are aggregated over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// One estimate over the whole failure series
    #[default]
    WholeRange,
    /// Trailing window of the given length in days
    Sliding { days: u32 },
}

impl WindowPolicy {
    /// Zero days selects the whole-range policy
    pub fn from_days(days: u32) -> Self {
        if days == 0 {
            WindowPolicy::WholeRange
        } else {
            WindowPolicy::Sliding { days }
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            WindowPolicy::WholeRange => 0,
            WindowPolicy::Sliding { days } => *days,
        }
    }

    /// Window span in milliseconds, `None` for the whole-range policy
    pub fn threshold_ms(&self) -> Option<f64> {
        match self {
            WindowPolicy::WholeRange => None,
            WindowPolicy::Sliding { days } => Some(f64::from(*days) * MS_PER_DAY),
        }
    }
}

/// Mean, upper (mean + stddev) and lower (mean - stddev) line series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bands {
    pub mean: Vec<Point>,
    pub upper: Vec<Point>,
    pub lower: Vec<Point>,
}

impl Bands {
    fn push(&mut self, timestamp: Timestamp, stats: VarianceResult) {
        self.mean.push(Point::new(timestamp, stats.mean));
        self.upper.push(Point::new(timestamp, stats.upper()));
        self.lower.push(Point::new(timestamp, stats.lower()));
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Number of points in each of the three series
    pub fn len(&self) -> usize {
        self.mean.len()
    }
}

/// Compute band series for an ascending failure series
///
/// Failures with an invalid timestamp never contribute. With one valid
/// failure or fewer the bands are empty.
pub fn compute_bands(failures: &[Point], policy: WindowPolicy) -> Bands {
    let valid: Vec<Point> = failures
        .iter()
        .filter(|p| p.timestamp.is_valid())
        .copied()
        .collect();

    if valid.len() <= 1 {
        tracing::debug!(
            failures = valid.len(),
            "not enough failures for a variance band"
        );
        return Bands::default();
    }

    let bands = match policy.threshold_ms() {
        None => whole_range_bands(&valid),
        Some(threshold) => sliding_window_bands(&valid, threshold),
    };

    tracing::debug!(
        failures = valid.len(),
        window_days = policy.days(),
        band_points = bands.len(),
        "computed failure bands"
    );

    bands
}

fn whole_range_bands(failures: &[Point]) -> Bands {
    let mut bands = Bands::default();
    let (Some(first), Some(last)) = (failures.first(), failures.last()) else {
        return bands;
    };

    if let Some(stats) = online_variance(failures) {
        bands.push(first.timestamp, stats);
        bands.push(last.timestamp, stats);
    }
    bands
}

// The growth check measures from the first failure of the series while the
// trim loop measures from the window front. Both use strict comparisons; the
// pairing decides which points land in each window and must not change.
fn sliding_window_bands(failures: &[Point], threshold: f64) -> Bands {
    let mut bands = Bands::default();
    let Some(origin) = failures.first().map(|p| p.timestamp) else {
        return bands;
    };
    let mut window: VecDeque<Point> = VecDeque::new();

    for point in failures {
        window.push_back(*point);
        let newest = point.timestamp;

        if newest.since(origin) < threshold {
            continue;
        }

        while window
            .front()
            .is_some_and(|front| newest.since(front.timestamp) > threshold)
        {
            window.pop_front();
        }

        if let Some(stats) = online_variance(&window) {
            bands.push(newest, stats);
        }
    }

    bands
}
