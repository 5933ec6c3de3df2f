//! Result selection: date ranges and record filtering
//!
//! A query picks results by branch, platform and test (any of the listed
//! names per field, every field that lists names must match) and by build
//! date. The end date is inclusive: everything built on the end day is
//! selected, i.e. `builddate < end + 1 day`.

use crate::record::ResultRecord;
use crate::route::RouteParams;
use crate::timestamp::{iso_date_string, parse_iso_date, Timestamp};
use anyhow::{bail, Result};
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Inclusive range of build days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The `days` days leading up to and including `end`
    pub fn for_period(end: NaiveDate, days: u32) -> Self {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Resolve optional route dates against `today`
    ///
    /// A missing end date means today. Without a start date the default
    /// period ending on the end date is used.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
        default_period_days: u32,
    ) -> Result<Self> {
        let end = match end {
            Some(text) => match parse_iso_date(text) {
                Some(date) => date,
                None => bail!("Invalid end date: {} (expected YYYY-MM-DD)", text),
            },
            None => today,
        };

        let Some(start) = start else {
            return Ok(Self::for_period(end, default_period_days));
        };

        let start = match parse_iso_date(start) {
            Some(date) => date,
            None => bail!("Invalid start date: {} (expected YYYY-MM-DD)", start),
        };

        if end < start {
            bail!(
                "End date {} is before start date {}",
                iso_date_string(end),
                iso_date_string(start)
            );
        }

        Ok(Self { start, end })
    }

    /// Length in days between start and end
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// The offered period this range corresponds to, if any
    ///
    /// Only ranges ending today can match a period; anything else is a
    /// custom range (`None`).
    pub fn matching_period(&self, today: NaiveDate, periods: &[u32]) -> Option<u32> {
        if self.end != today {
            return None;
        }
        let days = self.days();
        periods.iter().copied().find(|p| i64::from(*p) == days)
    }

    /// First timestamp after the range (midnight after the end day)
    pub fn end_exclusive(&self) -> Timestamp {
        match self.end.checked_add_days(Days::new(1)) {
            Some(next) => Timestamp::from_date(next),
            None => Timestamp::INVALID,
        }
    }

    pub fn contains(&self, timestamp: Timestamp) -> bool {
        timestamp.is_valid()
            && timestamp >= Timestamp::from_date(self.start)
            && timestamp < self.end_exclusive()
    }
}

/// Selection criteria for result records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultQuery {
    pub branches: Vec<String>,
    pub platforms: Vec<String>,
    pub tests: Vec<String>,
    pub range: Option<DateRange>,
}

impl ResultQuery {
    /// Query for the selection encoded in a permalink
    pub fn from_route(
        route: &RouteParams,
        today: NaiveDate,
        default_period_days: u32,
    ) -> Result<Self> {
        let range = DateRange::resolve(
            route.start_date.as_deref(),
            route.end_date.as_deref(),
            today,
            default_period_days,
        )?;

        Ok(Self {
            branches: route.branch.iter().cloned().collect(),
            platforms: route.platform.iter().cloned().collect(),
            tests: route.test.iter().cloned().collect(),
            range: Some(range),
        })
    }

    pub fn matches(&self, record: &ResultRecord) -> bool {
        field_matches(&self.branches, record.branch_name.as_deref())
            && field_matches(&self.platforms, record.platform_name.as_deref())
            && field_matches(&self.tests, record.test_name.as_deref())
            && self
                .range
                .map_or(true, |range| range.contains(record.timestamp()))
    }

    pub fn filter(&self, records: &[ResultRecord]) -> Vec<ResultRecord> {
        let selected: Vec<ResultRecord> = records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        tracing::debug!(
            total = records.len(),
            selected = selected.len(),
            "filtered results"
        );
        selected
    }
}

fn field_matches(wanted: &[String], actual: Option<&str>) -> bool {
    wanted.is_empty() || actual.is_some_and(|a| wanted.iter().any(|w| w == a))
}
