// Partitioning of raw records into pass/fail point series
//
// Records are sorted by build date (invalid dates last), then split into
// failures (valued at their metric) and passes (valued at zero). Records
// without an outcome join neither series. A revision lookup keyed by build
// timestamp is built from the records before sorting.

use super::bands::{compute_bands, Bands, WindowPolicy};
use crate::record::ResultRecord;
use crate::timestamp::Timestamp;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// A plotted `[timestamp, value]` pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Point {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.timestamp, self.value).serialize(serializer)
    }
}

/// What to do with records whose build date did not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidTimestampPolicy {
    /// Keep them, ordered after every valid record
    #[default]
    SortLast,
    /// Discard them before partitioning
    Drop,
}

/// Options for [`build_plot`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesOptions {
    pub window: WindowPolicy,
    pub invalid_timestamps: InvalidTimestampPolicy,
}

impl SeriesOptions {
    /// Options for a window length in days (0 = whole range)
    pub fn with_window_days(days: u32) -> Self {
        Self {
            window: WindowPolicy::from_days(days),
            ..Self::default()
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// Neither a failure nor a pass to plot
    #[error("no results to plot")]
    NoData {
        first_point: Option<String>,
        last_point: Option<String>,
    },
}

/// Failure and pass series plus the data tooltips and range display need
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesBundle {
    pub failures: Vec<Point>,
    pub passes: Vec<Point>,
    /// Display date of the earliest record, `None` without records
    pub first_point: Option<String>,
    /// Display date of the latest record, `None` without records
    pub last_point: Option<String>,
    /// Build timestamp (ms) to revision
    pub revisions: BTreeMap<i64, Option<String>>,
    /// Records whose build date did not parse
    pub invalid_timestamps: usize,
}

impl SeriesBundle {
    pub fn from_records(records: &[ResultRecord], policy: InvalidTimestampPolicy) -> Self {
        let mut revisions = BTreeMap::new();
        let mut dated: Vec<(Timestamp, &ResultRecord)> = Vec::with_capacity(records.len());
        let mut invalid_timestamps = 0;

        for record in records {
            let timestamp = record.timestamp();
            match timestamp.key() {
                Some(key) => {
                    revisions.insert(key, record.revision.clone());
                }
                None => {
                    invalid_timestamps += 1;
                    tracing::warn!(builddate = %record.builddate, "unparseable build date");
                    if policy == InvalidTimestampPolicy::Drop {
                        continue;
                    }
                }
            }
            dated.push((timestamp, record));
        }

        dated.sort_by(|a, b| a.0.cmp(&b.0));

        let first_point = dated.first().map(|(_, r)| r.display_date());
        let last_point = dated.last().map(|(_, r)| r.display_date());

        let mut failures = Vec::new();
        let mut passes = Vec::new();
        for (timestamp, record) in &dated {
            match record.pass {
                Some(false) => failures.push(Point::new(*timestamp, record.metric)),
                Some(true) => passes.push(Point::new(*timestamp, 0.0)),
                None => {}
            }
        }

        tracing::debug!(
            records = records.len(),
            failures = failures.len(),
            passes = passes.len(),
            invalid_timestamps,
            "partitioned results"
        );

        Self {
            failures,
            passes,
            first_point,
            last_point,
            revisions,
            invalid_timestamps,
        }
    }

    /// True when there is neither a failure nor a pass
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty() && self.passes.is_empty()
    }

    /// Revision tested by the build at `timestamp`
    pub fn revision_at(&self, timestamp: Timestamp) -> Option<&str> {
        let key = timestamp.key()?;
        self.revisions.get(&key)?.as_deref()
    }
}

/// Plot-ready series: point series plus failure bands
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    #[serde(flatten)]
    pub bundle: SeriesBundle,
    pub bands: Bands,
    pub window: WindowPolicy,
}

/// Build every plotted series for `records`
///
/// Returns [`SeriesError::NoData`] when there is nothing to plot so the
/// caller can show a "no data" state instead of an empty chart.
pub fn build_plot(
    records: &[ResultRecord],
    options: &SeriesOptions,
) -> Result<PlotSeries, SeriesError> {
    let bundle = SeriesBundle::from_records(records, options.invalid_timestamps);

    if bundle.is_empty() {
        return Err(SeriesError::NoData {
            first_point: bundle.first_point,
            last_point: bundle.last_point,
        });
    }

    let bands = compute_bands(&bundle.failures, options.window);

    Ok(PlotSeries {
        bundle,
        bands,
        window: options.window,
    })
}
