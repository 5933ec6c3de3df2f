//! peptrend - pass/fail trend series with rolling variance bands
//!
//! This library turns peptest result records (pass/fail outcomes with a
//! failure metric per build date) into chart-ready series: failure and pass
//! scatter series plus mean and standard-deviation bands computed either over
//! the whole range or over a trailing time window. It also covers the
//! surrounding plumbing: log ingestion, result selection, dashboard
//! permalinks and tooltip content.

pub mod chart;
pub mod cli;
pub mod config;
pub mod logparse;
pub mod query;
pub mod record;
pub mod route;
pub mod series;
pub mod timestamp;
pub mod tooltip;
pub mod variance;
