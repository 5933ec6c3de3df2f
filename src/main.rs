use anyhow::{Context, Result};
use clap::Parser;
use peptrend::chart::ChartDocument;
use peptrend::cli::{Cli, Command, ParseLogArgs, PlotArgs};
use peptrend::config::PlotConfig;
use peptrend::logparse;
use peptrend::record::{aggregate_by_revision, ResultRecord};
use peptrend::series::{build_plot, InvalidTimestampPolicy, SeriesOptions, WindowPolicy};
use peptrend::timestamp::parse_iso_date;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(path: Option<&Path>) -> Result<PlotConfig> {
    match path {
        Some(path) => PlotConfig::from_file(path),
        None => Ok(PlotConfig::default()),
    }
}

/// Read result records from a file, or stdin for "-"
fn read_records(input: &str) -> Result<Vec<ResultRecord>> {
    let content = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read results from stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))?
    };

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse result records from {}", input))
}

fn run_plot(args: &PlotArgs, config: &PlotConfig) -> Result<()> {
    let today = match &args.today {
        Some(text) => parse_iso_date(text)
            .with_context(|| format!("Invalid --today date: {} (expected YYYY-MM-DD)", text))?,
        None => chrono::Utc::now().date_naive(),
    };

    let mut records = read_records(&args.input)?;

    let query = args.query(today, config.default_period_days)?;
    if let Some(query) = &query {
        records = query.filter(&records);
    }

    if args.aggregate {
        records = aggregate_by_revision(&records);
    }

    let options = SeriesOptions {
        window: WindowPolicy::from_days(args.window_days.unwrap_or(config.window_days)),
        invalid_timestamps: if args.drop_invalid {
            InvalidTimestampPolicy::Drop
        } else {
            InvalidTimestampPolicy::SortLast
        },
    };

    let plot = build_plot(&records, &options);
    if let Err(e) = &plot {
        tracing::info!("{}", e);
    }

    let mut document = ChartDocument::from_plot(plot, config);
    if let Some(range) = query.and_then(|q| q.range) {
        document = document.with_range(range, today, &config.periods);
    }
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn run_parse_log(args: &ParseLogArgs) -> Result<()> {
    let mut records = Vec::new();

    for path in &args.logs {
        let log = logparse::parse_log_file(path, args.build_id.as_deref())
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(
            log = %path.display(),
            results = log.results.len(),
            skipped = log.skipped_lines,
            "parsed log"
        );
        records.extend(
            log.into_records(args.revision.as_deref())
                .with_context(|| format!("No usable build date in {}", path.display()))?,
        );
    }

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = load_config(args.config.as_deref())?;

    match &args.command {
        Command::Plot(plot_args) => run_plot(plot_args, &config)?,
        Command::ParseLog(log_args) => run_parse_log(log_args)?,
    }

    Ok(())
}
