//! Raw test-result records
//!
//! One `ResultRecord` is one test run as returned by the results API. Runs
//! of the same revision can be collapsed with [`aggregate_by_revision`].

use crate::timestamp::{BuildDate, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Build date of the tested revision
    pub builddate: BuildDate,

    /// Display date; falls back to the raw build date when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default)]
    pub revision: Option<String>,

    /// Outcome; `None` when the run has no recorded outcome
    #[serde(default)]
    pub pass: Option<bool>,

    /// Failure severity (sum of squared unresponsive times)
    #[serde(default)]
    pub metric: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

impl ResultRecord {
    /// Minimal record with only the fields the series builder reads
    pub fn new(builddate: impl Into<BuildDate>, pass: Option<bool>, metric: f64) -> Self {
        Self {
            builddate: builddate.into(),
            date: None,
            revision: None,
            pass,
            metric,
            test_name: None,
            platform_name: None,
            branch_name: None,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn timestamp(&self) -> Timestamp {
        self.builddate.timestamp()
    }

    pub fn display_date(&self) -> String {
        match &self.date {
            Some(date) => date.clone(),
            None => self.builddate.to_string(),
        }
    }
}

/// Collapse runs of the same revision into one record
///
/// The first run of each revision supplies the metadata. The metric becomes
/// the arithmetic mean of the group. The outcome is a failure if any run
/// failed, a pass if every run passed, and unknown otherwise. Groups are
/// returned in the order their revision first appears.
pub fn aggregate_by_revision(records: &[ResultRecord]) -> Vec<ResultRecord> {
    let mut order: Vec<Option<&str>> = Vec::new();
    let mut groups: HashMap<Option<&str>, Vec<&ResultRecord>> = HashMap::new();

    for record in records {
        let key = record.revision.as_deref();
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(record);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .filter_map(|group| {
            let first = group.first()?;
            let mut merged = (*first).clone();
            merged.metric = group.iter().map(|r| r.metric).sum::<f64>() / group.len() as f64;
            merged.pass = if group.iter().any(|r| r.pass == Some(false)) {
                Some(false)
            } else if group.iter().all(|r| r.pass == Some(true)) {
                Some(true)
            } else {
                None
            };
            Some(merged)
        })
        .collect()
}
