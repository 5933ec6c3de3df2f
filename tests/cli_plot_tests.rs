//! Integration tests for `peptrend plot`
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use predicates::prelude::*;
use serde_json::Value;

const RESULTS: &str = "tests/fixtures/results.json";

fn plot(args: &[&str]) -> Value {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("peptrend");
    cmd.arg("plot").arg("--input").arg(RESULTS).args(args);

    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "plot failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn series_values(doc: &Value, index: usize) -> Vec<f64> {
    doc["chart"]["series"][index]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|point| point[1].as_f64().unwrap())
        .collect()
}

#[test]
fn test_plot_document_format() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("peptrend");
    cmd.arg("plot").arg("--input").arg(RESULTS);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"format\": \"peptrend-chart-v1\""))
        .stdout(predicate::str::contains("\"no_data\": false"))
        .stdout(predicate::str::contains("\"mean failure\""));
}

#[test]
fn test_plot_whole_range_bands() {
    let doc = plot(&["--branch", "mozilla-central"]);

    assert_eq!(series_values(&doc, 0), vec![10.0, 20.0, 40.0, 30.0]);
    assert_eq!(series_values(&doc, 1), vec![0.0, 0.0]);

    let mean = series_values(&doc, 2);
    assert_eq!(mean.len(), 2);
    assert!((mean[0] - 25.0).abs() < 1e-9);

    let upper = series_values(&doc, 3);
    assert!((upper[0] - (25.0 + 125f64.sqrt())).abs() < 1e-9);

    assert_eq!(doc["first_point"], "2012-04-01T06:31:58");
    assert_eq!(doc["last_point"], "2012-04-05T03:12:44");
}

#[test]
fn test_plot_sliding_window() {
    let doc = plot(&["--branch", "mozilla-central", "--window", "1"]);
    assert_eq!(series_values(&doc, 2), vec![20.0, 30.0, 30.0]);
    assert_eq!(doc["chart"]["window"]["sliding"]["days"], 1);
}

#[test]
fn test_plot_window_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("peptrend.toml");
    std::fs::write(&config, "window_days = 1\n").unwrap();

    let doc = plot(&[
        "--branch",
        "mozilla-central",
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(series_values(&doc, 2), vec![20.0, 30.0, 30.0]);
}

#[test]
fn test_plot_aggregate_by_revision() {
    let doc = plot(&["--branch", "mozilla-central", "--aggregate"]);
    assert_eq!(series_values(&doc, 0), vec![10.0, 30.0, 30.0]);
}

#[test]
fn test_plot_route_selection() {
    let doc = plot(&["--route", "#/try/win32/test_resize/2012-04-03/2012-04-03"]);
    let series = doc["chart"]["series"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series_values(&doc, 0), vec![500.0]);
    assert_eq!(doc["chart"]["revisions"]["1333447200000"], "99aa88bb77cc");
    assert_eq!(doc["range"]["start"], "2012-04-03");
    assert_eq!(doc["period"], 0);
}

#[test]
fn test_plot_route_default_period() {
    let doc = plot(&[
        "--route",
        "#/mozilla-central/linux/test_scroll",
        "--today",
        "2012-04-06",
    ]);
    assert_eq!(series_values(&doc, 0).len(), 4);
    assert_eq!(doc["range"]["start"], "2012-03-30");
    assert_eq!(doc["range"]["end"], "2012-04-06");
    assert_eq!(doc["period"], 7);

    // A week ending 2012-04-03 only reaches the first failures
    let doc = plot(&[
        "--route",
        "#/mozilla-central/linux/test_scroll",
        "--today",
        "2012-04-03",
    ]);
    assert_eq!(series_values(&doc, 0), vec![10.0, 20.0, 40.0]);
}

#[test]
fn test_plot_no_data() {
    let doc = plot(&["--branch", "mozilla-aurora"]);
    assert_eq!(doc["no_data"], true);
    assert!(doc["first_point"].is_null());
    assert!(doc["last_point"].is_null());
    assert!(doc.get("chart").is_none());
    assert!(doc.get("period").is_none());
}

#[test]
fn test_plot_reads_stdin() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("peptrend");
    cmd.arg("plot").write_stdin(
        r#"[{"builddate":"2020-01-01","pass":false,"metric":4},
            {"builddate":"2020-01-02","pass":false,"metric":6}]"#,
    );

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(series_values(&doc, 1), vec![5.0, 5.0]);
    assert_eq!(series_values(&doc, 2), vec![6.0, 6.0]);
    assert_eq!(series_values(&doc, 3), vec![4.0, 4.0]);
}

#[test]
fn test_plot_rejects_malformed_input() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("peptrend");
    cmd.arg("plot").write_stdin("{not json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse result records"));
}

#[test]
fn test_plot_rejects_bad_route() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("peptrend");
    cmd.arg("plot")
        .arg("--input")
        .arg(RESULTS)
        .arg("--route")
        .arg("#/a/b/c/d/e/f");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("at most 5"));
}

#[test]
fn test_plot_missing_input_file() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("peptrend");
    cmd.arg("plot").arg("--input").arg("tests/fixtures/missing.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
