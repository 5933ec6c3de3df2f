//! Hover tooltips for chart points
//!
//! A tooltip shows the build date in UTC, the hovered value (metric or
//! "pass") and, when known, the revision with a link into the branch's
//! repository.

use crate::config::PlotConfig;
use crate::timestamp::Timestamp;
use serde::{Serialize, Serializer};
use std::fmt;

/// Value shown for the hovered point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TooltipValue {
    Metric(f64),
    Pass,
}

impl Serialize for TooltipValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TooltipValue::Metric(metric) => serializer.serialize_f64(*metric),
            TooltipValue::Pass => serializer.serialize_str("pass"),
        }
    }
}

impl fmt::Display for TooltipValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TooltipValue::Metric(metric) => write!(f, "{}", metric),
            TooltipValue::Pass => f.write_str("pass"),
        }
    }
}

/// Tooltip content for one point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    /// `YYYY-MM-DD HH:MM:SS` in UTC
    pub date: String,
    pub value: TooltipValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Tooltip {
    pub fn new(
        timestamp: Timestamp,
        value: TooltipValue,
        branch: &str,
        revision: Option<&str>,
        config: &PlotConfig,
    ) -> Self {
        let revision = revision.filter(|r| !r.is_empty());
        let url = revision.and_then(|rev| {
            config
                .revision_url_base(branch)
                .map(|base| format!("{}{}", base, rev))
        });

        Self {
            date: timestamp.to_string(),
            value,
            revision: revision.map(str::to_string),
            url,
        }
    }
}

impl fmt::Display for Tooltip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.date, self.value)?;
        match (&self.revision, &self.url) {
            (Some(_), Some(url)) => write!(f, " ({})", url),
            (Some(revision), None) => write!(f, " (revision {})", revision),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_with_known_branch() {
        let config = PlotConfig::default();
        let tooltip = Tooltip::new(
            Timestamp::parse("2012-04-03T06:31:58"),
            TooltipValue::Metric(12.5),
            "mozilla-inbound",
            Some("abcdef012345"),
            &config,
        );
        assert_eq!(tooltip.date, "2012-04-03 06:31:58");
        assert_eq!(
            tooltip.url.as_deref(),
            Some("https://hg.mozilla.org/integration/mozilla-inbound/rev/abcdef012345")
        );
        assert_eq!(
            tooltip.to_string(),
            "2012-04-03 06:31:58: 12.5 (https://hg.mozilla.org/integration/mozilla-inbound/rev/abcdef012345)"
        );
    }

    #[test]
    fn test_tooltip_unknown_branch_has_no_url() {
        let tooltip = Tooltip::new(
            Timestamp::parse("2012-04-03"),
            TooltipValue::Pass,
            "birch",
            Some("abc"),
            &PlotConfig::default(),
        );
        assert_eq!(tooltip.revision.as_deref(), Some("abc"));
        assert!(tooltip.url.is_none());
        assert_eq!(tooltip.to_string(), "2012-04-03 00:00:00: pass (revision abc)");
    }

    #[test]
    fn test_tooltip_without_revision() {
        let tooltip = Tooltip::new(
            Timestamp::parse("2012-04-03"),
            TooltipValue::Metric(1.0),
            "try",
            None,
            &PlotConfig::default(),
        );
        assert!(tooltip.revision.is_none());
        assert!(tooltip.url.is_none());
    }

    #[test]
    fn test_tooltip_serializes_pass_as_string() {
        let tooltip = Tooltip::new(
            Timestamp::parse("2012-04-03"),
            TooltipValue::Pass,
            "try",
            Some(""),
            &PlotConfig::default(),
        );
        let json = serde_json::to_value(&tooltip).unwrap();
        assert_eq!(json["value"], "pass");
        assert!(json.get("revision").is_none());
    }
}
