//! peptest log ingestion
//!
//! Turns a peptest log into result records. The log file name carries the
//! branch and platform (`mozilla-central_linux64_test-peptest-bm12.txt`),
//! the log body carries the build id and one line per test:
//!
//! ```text
//! buildid: 20120403063158
//! PEP TEST-UNEXPECTED-FAIL | test_scroll | fail (metric: 17.4)
//! PEP TEST-PASS | test_resize | pass
//! ```
//!
//! Logs are published gzip-compressed; [`parse_log_file`] reads both
//! compressed and plain files. Lines are decoded lossily so stray non-UTF-8
//! bytes in build output never hide the results around them.

use crate::record::ResultRecord;
use crate::timestamp::{parse_build_id, BuildDate};
use flate2::read::GzDecoder;
use regex::Regex;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

const FAIL_MARKER: &str = "PEP TEST-UNEXPECTED-FAIL";
const PASS_MARKER: &str = "PEP TEST-PASS";

/// First two bytes of every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Error, Debug)]
pub enum LogParseError {
    #[error("log file name does not name a branch and platform: {0}")]
    BadFileName(String),

    #[error("no build id found in log")]
    MissingBuildId,

    #[error("invalid build id: {0}")]
    InvalidBuildId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LogParseError>;

fn file_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^_]+)_(.+)_test").expect("valid file name regex"))
}

fn build_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^buildid: (\d+)").expect("valid build id regex"))
}

fn metric_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"metric: ([\d.]*)").expect("valid metric regex"))
}

/// One test outcome found in a log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedResult {
    pub test: String,
    pub pass: bool,
    pub metric: f64,
}

/// Everything extracted from one log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedLog {
    pub branch: String,
    pub platform: String,
    pub build_id: Option<String>,
    pub results: Vec<ParsedResult>,
    /// Failure lines that carried no metric
    pub skipped_lines: usize,
}

impl ParsedLog {
    /// Convert to result records dated by the build id
    pub fn into_records(self, revision: Option<&str>) -> Result<Vec<ResultRecord>> {
        let build_id = self.build_id.ok_or(LogParseError::MissingBuildId)?;
        let built = parse_build_id(&build_id)
            .map_err(|_| LogParseError::InvalidBuildId(build_id.clone()))?;
        let builddate = built.format("%Y-%m-%dT%H:%M:%S").to_string();

        let records = self
            .results
            .into_iter()
            .map(|result| ResultRecord {
                builddate: BuildDate::Text(builddate.clone()),
                date: None,
                revision: revision.map(str::to_string),
                pass: Some(result.pass),
                metric: result.metric,
                test_name: Some(result.test),
                platform_name: Some(self.platform.clone()),
                branch_name: Some(self.branch.clone()),
            })
            .collect();
        Ok(records)
    }
}

/// Branch and platform named by a log file name
pub fn branch_and_platform(file_name: &str) -> Result<(String, String)> {
    let caps = file_name_regex()
        .captures(file_name)
        .ok_or_else(|| LogParseError::BadFileName(file_name.to_string()))?;
    Ok((caps[1].to_string(), caps[2].to_string()))
}

/// Parse log lines from `reader`
///
/// `build_id` overrides the id found in the log; otherwise the first
/// `buildid:` line is used.
pub fn parse_log<R: BufRead>(
    mut reader: R,
    file_name: &str,
    build_id: Option<&str>,
) -> Result<ParsedLog> {
    let (branch, platform) = branch_and_platform(file_name)?;
    let mut build_id = build_id.filter(|id| !id.is_empty()).map(str::to_string);
    let mut results = Vec::new();
    let mut skipped_lines = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);

        if build_id.is_none() {
            if let Some(caps) = build_id_regex().captures(line) {
                tracing::debug!(build_id = &caps[1], %branch, %platform, "found build id");
                build_id = Some(caps[1].to_string());
            }
        }

        if line.contains(FAIL_MARKER) {
            let parts: Vec<&str> = line.split('|').map(str::trim).collect();
            let (Some(test), Some(message)) = (parts.get(1), parts.get(2)) else {
                tracing::error!("Bad failure message: {}", line);
                skipped_lines += 1;
                continue;
            };
            match metric_regex()
                .captures(message)
                .and_then(|caps| caps[1].parse::<f64>().ok())
            {
                Some(metric) => {
                    tracing::debug!("failure in test {}: {:.1}", test, metric);
                    results.push(ParsedResult {
                        test: test.to_string(),
                        pass: false,
                        metric,
                    });
                }
                None => {
                    tracing::error!("Bad failure message: {}", line);
                    skipped_lines += 1;
                }
            }
        } else if line.contains(PASS_MARKER) {
            let parts: Vec<&str> = line.split('|').map(str::trim).collect();
            if let Some(test) = parts.get(1) {
                tracing::debug!("pass in test {}", test);
                results.push(ParsedResult {
                    test: test.to_string(),
                    pass: true,
                    metric: 0.0,
                });
            }
        }
    }

    Ok(ParsedLog {
        branch,
        platform,
        build_id,
        results,
        skipped_lines,
    })
}

/// Parse a log file from disk
///
/// Files with a `.gz` extension or a gzip header are decompressed on the
/// fly.
pub fn parse_log_file<P: AsRef<Path>>(path: P, build_id: Option<&str>) -> Result<ParsedLog> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LogParseError::BadFileName(path.display().to_string()))?;
    let mut reader = BufReader::new(File::open(path)?);

    let gzipped = path.extension().is_some_and(|ext| ext == "gz")
        || reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if gzipped {
        tracing::debug!(log = %path.display(), "reading gzip-compressed log");
        parse_log(BufReader::new(GzDecoder::new(reader)), file_name, build_id)
    } else {
        parse_log(reader, file_name, build_id)
    }
}
