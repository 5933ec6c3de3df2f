//! Plot configuration (peptrend.toml)
//!
//! # Example peptrend.toml
//!
//! ```toml
//! window_days = 7
//! default_period_days = 14
//! periods = [1, 7, 14, 30]
//!
//! [revision_urls]
//! mozilla-central = "https://hg.mozilla.org/mozilla-central/rev/"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_Y_AXIS_LABEL: &str = "sum of squares of unresponsive times in ms / 1000";

/// Configuration for chart generation
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
///
/// # Example
/// ```
/// use peptrend::config::PlotConfig;
///
/// let config = PlotConfig::default();
/// assert_eq!(config.window_days, 0); // whole-range bands
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Sliding band window in days (0 = one band over the whole range)
    pub window_days: u32,

    /// Period selected when no start date is given
    pub default_period_days: u32,

    /// Periods (days) offered by the range picker
    pub periods: Vec<u32>,

    /// Y axis caption
    pub y_axis_label: String,

    /// Branch name → base URL that a revision id is appended to
    pub revision_urls: BTreeMap<String, String>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        let revision_urls = [
            (
                "mozilla-inbound",
                "https://hg.mozilla.org/integration/mozilla-inbound/rev/",
            ),
            ("mozilla-central", "https://hg.mozilla.org/mozilla-central/rev/"),
            ("try", "https://hg.mozilla.org/try/rev/"),
        ]
        .into_iter()
        .map(|(branch, url)| (branch.to_string(), url.to_string()))
        .collect();

        Self {
            window_days: 0,
            default_period_days: 7,
            periods: vec![1, 7, 14, 30, 60, 90],
            y_axis_label: DEFAULT_Y_AXIS_LABEL.to_string(),
            revision_urls,
        }
    }
}

impl PlotConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    /// Revision URL base for `branch`, if one is configured
    pub fn revision_url_base(&self, branch: &str) -> Option<&str> {
        self.revision_urls.get(branch).map(String::as_str)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.periods.contains(&0) {
            return Err("periods must be positive day counts".to_string());
        }

        if !self.periods.contains(&self.default_period_days) {
            return Err(format!(
                "default_period_days {} is not one of the offered periods {:?}",
                self.default_period_days, self.periods
            ));
        }

        if let Some((branch, _)) = self.revision_urls.iter().find(|(_, url)| url.is_empty()) {
            return Err(format!("revision URL for branch '{}' is empty", branch));
        }

        Ok(())
    }
}
