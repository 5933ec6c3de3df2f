//! Build-date normalization
//!
//! Build dates arrive as date strings, date-time strings or epoch
//! milliseconds. Everything is normalized to epoch milliseconds stored as
//! `f64`; a build date that cannot be parsed becomes NaN rather than zero so
//! callers can detect and reject it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Milliseconds in one day
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Build id format used by the build infrastructure (e.g. `20120403063158`)
pub const BUILD_ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// Date-time formats accepted for naive (offset-less) build dates, read as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Epoch-millisecond timestamp, NaN when the source did not parse
///
/// Ordering is total: valid timestamps compare numerically and every invalid
/// timestamp sorts after all valid ones.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp(f64);

impl Timestamp {
    pub const INVALID: Timestamp = Timestamp(f64::NAN);

    pub fn from_millis(millis: f64) -> Self {
        Self(millis)
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis() as f64)
    }

    /// Midnight UTC at the start of `date`
    pub fn from_date(date: NaiveDate) -> Self {
        match date.and_hms_opt(0, 0, 0) {
            Some(dt) => Self::from_datetime(dt.and_utc()),
            None => Self::INVALID,
        }
    }

    pub fn millis(&self) -> f64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_finite()
    }

    /// Milliseconds elapsed since `earlier` (NaN if either side is invalid)
    pub fn since(&self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }

    /// Integral milliseconds, used as lookup key; `None` for invalid values
    pub fn key(&self) -> Option<i64> {
        if self.is_valid() {
            Some(self.0 as i64)
        } else {
            None
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.key().and_then(DateTime::from_timestamp_millis)
    }

    /// Parse a textual build date
    ///
    /// Accepts RFC 3339 (`2012-04-03T06:31:58Z`), naive date-times
    /// (`2012-04-03T06:31:58`, `2012-04-03 06:31:58`, read as UTC) and plain
    /// dates (`2012-04-03`, midnight UTC). Anything else is invalid.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Self::from_datetime(dt.with_timezone(&Utc));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Self::from_datetime(dt.and_utc());
            }
        }

        match parse_iso_date(text) {
            Some(date) => Self::from_date(date),
            None => Self::INVALID,
        }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "invalid"),
        }
    }
}

/// Raw build date as found in a result record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildDate {
    /// Epoch milliseconds
    Millis(f64),
    /// Date or date-time text
    Text(String),
}

impl BuildDate {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            BuildDate::Millis(ms) => Timestamp::from_millis(*ms),
            BuildDate::Text(text) => Timestamp::parse(text),
        }
    }
}

impl fmt::Display for BuildDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildDate::Millis(ms) => write!(f, "{}", ms),
            BuildDate::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for BuildDate {
    fn from(text: &str) -> Self {
        BuildDate::Text(text.to_string())
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Format a date as `YYYY-MM-DD`
pub fn iso_date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYYMMDDHHMMSS` build id into a UTC date-time
pub fn parse_build_id(build_id: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(build_id.trim(), BUILD_ID_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date_is_utc_midnight() {
        let ts = Timestamp::parse("2020-01-01");
        assert_eq!(ts.millis(), 1_577_836_800_000.0);
    }

    #[test]
    fn test_parse_naive_datetime() {
        let ts = Timestamp::parse("2012-04-03T06:31:58");
        let spaced = Timestamp::parse("2012-04-03 06:31:58");
        assert!(ts.is_valid());
        assert_eq!(ts, spaced);
        assert_eq!(ts.to_string(), "2012-04-03 06:31:58");
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let utc = Timestamp::parse("2012-04-03T06:31:58Z");
        let offset = Timestamp::parse("2012-04-03T08:31:58+02:00");
        assert_eq!(utc, offset);
    }

    #[test]
    fn test_parse_garbage_is_invalid() {
        let ts = Timestamp::parse("last tuesday");
        assert!(!ts.is_valid());
        assert!(ts.millis().is_nan());
        assert!(ts.key().is_none());
        assert_eq!(ts.to_string(), "invalid");
    }

    #[test]
    fn test_invalid_sorts_last() {
        let mut stamps = vec![
            Timestamp::INVALID,
            Timestamp::from_millis(20.0),
            Timestamp::from_millis(-5.0),
            Timestamp::INVALID,
            Timestamp::from_millis(10.0),
        ];
        stamps.sort();
        let millis: Vec<f64> = stamps.iter().take(3).map(|t| t.millis()).collect();
        assert_eq!(millis, vec![-5.0, 10.0, 20.0]);
        assert!(!stamps[3].is_valid());
        assert!(!stamps[4].is_valid());
    }

    #[test]
    fn test_build_date_deserializes_text_or_number() {
        let text: BuildDate = serde_json::from_str("\"2020-01-02\"").unwrap();
        let number: BuildDate = serde_json::from_str("1577923200000").unwrap();
        assert_eq!(text.timestamp(), number.timestamp());
    }

    #[test]
    fn test_parse_build_id() {
        let dt = parse_build_id("20120403063158").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2012-04-03 06:31:58");
        assert!(parse_build_id("2012-04-03").is_err());
    }

    #[test]
    fn test_iso_date_round_trip() {
        let date = parse_iso_date("2012-01-31").unwrap();
        assert_eq!(iso_date_string(date), "2012-01-31");
        assert!(parse_iso_date("31/01/2012").is_none());
    }
}
