//! CLI argument parsing for peptrend

use crate::query::ResultQuery;
use crate::route::RouteParams;
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "peptrend")]
#[command(version)]
#[command(about = "Pass/fail trend series with rolling variance bands for peptest results", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long)]
    pub debug: bool,

    /// Plot configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build chart series from result records (JSON array)
    Plot(PlotArgs),
    /// Extract result records from peptest logs
    ParseLog(ParseLogArgs),
}

#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Result records as a JSON array ("-" reads stdin)
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    pub input: String,

    /// Sliding band window in days (0 = whole range; overrides config)
    #[arg(short, long = "window", value_name = "DAYS")]
    pub window_days: Option<u32>,

    /// Dashboard permalink selecting branch/platform/test/dates (e.g. #/try/linux/test_a)
    #[arg(long, value_name = "HASH")]
    pub route: Option<String>,

    /// Only results from this branch (repeatable)
    #[arg(long = "branch", value_name = "NAME")]
    pub branches: Vec<String>,

    /// Only results from this platform (repeatable)
    #[arg(long = "platform", value_name = "NAME")]
    pub platforms: Vec<String>,

    /// Only results of this test (repeatable)
    #[arg(long = "test", value_name = "NAME")]
    pub tests: Vec<String>,

    /// First build day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,

    /// Last build day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,

    /// Date that open-ended ranges are resolved against (defaults to today, UTC)
    #[arg(long, value_name = "DATE", hide = true)]
    pub today: Option<String>,

    /// Average repeated runs of the same revision before plotting
    #[arg(long)]
    pub aggregate: bool,

    /// Discard records whose build date does not parse instead of sorting them last
    #[arg(long = "drop-invalid")]
    pub drop_invalid: bool,
}

impl PlotArgs {
    /// Record selection requested on the command line, `None` for everything
    ///
    /// Dates only restrict the selection when a route, `--start` or `--end`
    /// is given.
    pub fn query(&self, today: NaiveDate, default_period_days: u32) -> Result<Option<ResultQuery>> {
        let mut route = match &self.route {
            Some(hash) => RouteParams::parse(hash)?,
            None => RouteParams::default(),
        };
        if let Some(start) = &self.start {
            route.start_date = Some(start.clone());
        }
        if let Some(end) = &self.end {
            route.end_date = Some(end.clone());
        }

        let dated = self.route.is_some() || route.start_date.is_some() || route.end_date.is_some();
        let mut query = if dated {
            ResultQuery::from_route(&route, today, default_period_days)?
        } else {
            ResultQuery::default()
        };

        query.branches.extend(self.branches.iter().cloned());
        query.platforms.extend(self.platforms.iter().cloned());
        query.tests.extend(self.tests.iter().cloned());

        if query == ResultQuery::default() {
            Ok(None)
        } else {
            Ok(Some(query))
        }
    }
}

#[derive(Args, Debug)]
pub struct ParseLogArgs {
    /// Log files named <branch>_<platform>_test...
    #[arg(required = true, value_name = "LOG")]
    pub logs: Vec<PathBuf>,

    /// Build id (YYYYMMDDHHMMSS) to use instead of the one in the log
    #[arg(long = "build-id", value_name = "ID")]
    pub build_id: Option<String>,

    /// Revision tested by the build
    #[arg(long, value_name = "REV")]
    pub revision: Option<String>,
}
