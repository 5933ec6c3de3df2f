//! Renderer-agnostic chart description
//!
//! Turns plot-ready series into the series list, axis metadata and hover
//! lookup a charting front end needs. The JSON document is versioned so
//! renderers can check what they are reading.

use crate::config::PlotConfig;
use crate::query::DateRange;
use crate::series::{PlotSeries, Point, SeriesError, WindowPolicy};
use crate::tooltip::{Tooltip, TooltipValue};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

pub const CHART_FORMAT: &str = "peptrend-chart-v1";

/// What a plotted series represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    Failures,
    Passes,
    Mean,
    Upper,
    Lower,
}

/// One drawn series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSpec {
    pub role: SeriesRole,
    /// Legend label; the lower band shares the upper band's legend entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Palette index
    pub color: usize,
    /// Draw point markers
    pub points: bool,
    /// Draw connecting lines
    pub lines: bool,
    pub hoverable: bool,
    pub data: Vec<Point>,
}

impl SeriesSpec {
    fn scatter(role: SeriesRole, label: &str, color: usize, data: Vec<Point>) -> Self {
        Self {
            role,
            label: Some(label.to_string()),
            color,
            points: true,
            lines: false,
            hoverable: true,
            data,
        }
    }

    fn line(role: SeriesRole, label: Option<&str>, color: usize, data: Vec<Point>) -> Self {
        Self {
            role,
            label: label.map(str::to_string),
            color,
            points: false,
            lines: true,
            hoverable: false,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    /// `time` for a date axis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
}

/// Complete chart description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub series: Vec<SeriesSpec>,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub legend_position: String,
    /// Index of the failure series in `series`
    pub failure_series: Option<usize>,
    /// Index of the pass series in `series`
    pub pass_series: Option<usize>,
    pub window: WindowPolicy,
    /// Build timestamp (ms) to revision, for tooltips
    pub revisions: BTreeMap<i64, Option<String>>,
}

impl ChartSpec {
    pub fn new(plot: &PlotSeries, config: &PlotConfig) -> Self {
        let bundle = &plot.bundle;
        let mut series = Vec::new();
        let mut color = 0;
        let mut failure_series = None;
        let mut pass_series = None;

        if !bundle.failures.is_empty() {
            series.push(SeriesSpec::scatter(
                SeriesRole::Failures,
                "failures",
                color,
                bundle.failures.clone(),
            ));
            failure_series = Some(series.len() - 1);
        }
        color += 1;

        if !bundle.passes.is_empty() {
            series.push(SeriesSpec::scatter(
                SeriesRole::Passes,
                "passes",
                color,
                bundle.passes.clone(),
            ));
            pass_series = Some(series.len() - 1);
        }
        color += 1;

        let dated_failures = bundle
            .failures
            .iter()
            .filter(|p| p.timestamp.is_valid())
            .count();
        if dated_failures > 1 {
            series.push(SeriesSpec::line(
                SeriesRole::Mean,
                Some("mean failure"),
                color,
                plot.bands.mean.clone(),
            ));
            color += 1;
            series.push(SeriesSpec::line(
                SeriesRole::Upper,
                Some("failure std dev"),
                color,
                plot.bands.upper.clone(),
            ));
            series.push(SeriesSpec::line(
                SeriesRole::Lower,
                None,
                color,
                plot.bands.lower.clone(),
            ));
        }

        Self {
            series,
            x_axis: AxisSpec {
                mode: Some("time".to_string()),
                label: "build date".to_string(),
                min: None,
            },
            y_axis: AxisSpec {
                mode: None,
                label: config.y_axis_label.clone(),
                min: Some(0.0),
            },
            legend_position: "ne".to_string(),
            failure_series,
            pass_series,
            window: plot.window,
            revisions: bundle.revisions.clone(),
        }
    }

    /// Value shown when hovering `point` of series `series_index`
    ///
    /// Band series are not hoverable and yield `None`.
    pub fn hover_value(&self, series_index: usize, point: &Point) -> Option<TooltipValue> {
        if Some(series_index) == self.failure_series {
            Some(TooltipValue::Metric(point.value))
        } else if Some(series_index) == self.pass_series {
            Some(TooltipValue::Pass)
        } else {
            None
        }
    }

    /// Tooltip for the `point_index`-th point of series `series_index`
    pub fn tooltip(
        &self,
        series_index: usize,
        point_index: usize,
        branch: &str,
        config: &PlotConfig,
    ) -> Option<Tooltip> {
        let point = self.series.get(series_index)?.data.get(point_index)?;
        let value = self.hover_value(series_index, point)?;
        let revision = point
            .timestamp
            .key()
            .and_then(|key| self.revisions.get(&key))
            .and_then(|rev| rev.as_deref());

        Some(Tooltip::new(point.timestamp, value, branch, revision, config))
    }
}

/// Versioned chart output, with an explicit no-data state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDocument {
    pub version: String,
    pub format: String,
    pub no_data: bool,
    pub first_point: Option<String>,
    pub last_point: Option<String>,
    /// Selected build days, when the results were filtered by date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
    /// Offered period the range corresponds to; 0 for a custom range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
}

impl ChartDocument {
    pub fn from_plot(plot: Result<PlotSeries, SeriesError>, config: &PlotConfig) -> Self {
        match plot {
            Ok(plot) => Self {
                version: env!("CARGO_PKG_VERSION").to_string(),
                format: CHART_FORMAT.to_string(),
                no_data: false,
                first_point: plot.bundle.first_point.clone(),
                last_point: plot.bundle.last_point.clone(),
                range: None,
                period: None,
                chart: Some(ChartSpec::new(&plot, config)),
            },
            Err(SeriesError::NoData {
                first_point,
                last_point,
            }) => Self {
                version: env!("CARGO_PKG_VERSION").to_string(),
                format: CHART_FORMAT.to_string(),
                no_data: true,
                first_point,
                last_point,
                range: None,
                period: None,
                chart: None,
            },
        }
    }

    /// Record the date range the results were selected with
    ///
    /// `period` is the matching offered period, or 0 when the range is
    /// custom (does not end `today` or has no offered length).
    pub fn with_range(mut self, range: DateRange, today: NaiveDate, periods: &[u32]) -> Self {
        self.period = Some(range.matching_period(today, periods).unwrap_or(0));
        self.range = Some(range);
        self
    }
}
