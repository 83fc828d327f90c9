//! CLI entry point for the sales cleaning pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use sales_cleaning::{
    CleaningSummary, EmptyColumnPolicy, Pipeline, PipelineConfig, TracingProgressReporter,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Environment variable overriding the default input path.
const INPUT_ENV: &str = "SALES_CLEANING_INPUT";
/// Environment variable overriding the default output path.
const OUTPUT_ENV: &str = "SALES_CLEANING_OUTPUT";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "E-commerce sales data cleaning pipeline",
    long_about = "Cleans a raw e-commerce sales CSV: imputes missing values, coerces types, \
                  removes duplicates and outliers, normalizes text and derives \
                  ComputedTotal/Year/Month.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  SALES_CLEANING_INPUT     Input CSV path when --input is not given\n  \
                  SALES_CLEANING_OUTPUT    Output CSV path when --output is not given\n\n\
                  EXAMPLES:\n  \
                  # Default paths (../data/raw_ecommerce_sales.csv)\n  \
                  sales-cleaning\n\n  \
                  # Explicit paths and a stricter filter\n  \
                  sales-cleaning -i raw.csv -o cleaned.csv --threshold 2.5\n\n  \
                  # Machine-readable summary\n  \
                  sales-cleaning --json | jq .duplicates_removed"
)]
struct Args {
    /// Path to the raw CSV file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path of the cleaned CSV file to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with a pipeline configuration
    ///
    /// Fields not present in the file keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Z-score threshold for outlier removal
    #[arg(long)]
    threshold: Option<f64>,

    /// Fail when a column has no values to impute from
    #[arg(long)]
    fail_on_empty_column: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the run summary as JSON to stdout
    ///
    /// Disables all progress logs; only outputs the final JSON summary.
    #[arg(long)]
    json: bool,

    /// Write the run summary as JSON next to the output file
    ///
    /// The report will be saved as <output_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (disabled if --json is set)
    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    let config = build_config(&args)?;
    info!(
        "Cleaning {} -> {}",
        config.input_path.display(),
        config.output_path.display()
    );

    let mut builder = Pipeline::builder().config(config);
    if !args.quiet && !args.json {
        builder = builder.progress_reporter(Arc::new(TracingProgressReporter));
    }
    let pipeline = builder.build()?;

    let result = pipeline.run()?;
    handle_pipeline_output(&result.summary, pipeline.config(), &args)
}

/// Resolve the configuration: flags, then environment, then config file, then defaults.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(input) = resolve_path(args.input.as_ref(), INPUT_ENV) {
        config.input_path = input;
    }
    if let Some(output) = resolve_path(args.output.as_ref(), OUTPUT_ENV) {
        config.output_path = output;
    }
    if let Some(threshold) = args.threshold {
        config.zscore_threshold = threshold;
    }
    if args.fail_on_empty_column {
        config.empty_column_policy = EmptyColumnPolicy::Fail;
    }

    config.validate()?;
    Ok(config)
}

fn resolve_path(flag: Option<&PathBuf>, env_var: &str) -> Option<PathBuf> {
    flag.cloned().or_else(|| {
        std::env::var(env_var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    })
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report next to the output file
fn handle_pipeline_output(
    summary: &CleaningSummary,
    config: &PipelineConfig,
    args: &Args,
) -> Result<()> {
    if args.emit_report {
        let report_path = report_path_for(&config.output_path);
        std::fs::write(&report_path, serde_json::to_string_pretty(summary)?)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    print_human_readable_summary(summary);
    Ok(())
}

/// `<dir>/<output_stem>_report.json` for the given output file.
fn report_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output.with_file_name(format!("{}_report.json", stem))
}

/// Print a human-readable summary of the cleaning results.
fn print_human_readable_summary(summary: &CleaningSummary) {
    println!();
    println!("{}", "=".repeat(60));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(60));
    println!("{}", summary);

    let changed: Vec<&String> = summary.stages.iter().flat_map(|s| &s.steps).collect();
    if !changed.is_empty() {
        println!();
        println!("Actions Taken:");
        for step in changed.iter().take(10) {
            println!("  - {}", step);
        }
        if changed.len() > 10 {
            println!("  ... and {} more actions", changed.len() - 10);
        }
    }

    println!();
    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the summary as JSON");
    println!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_path_sits_next_to_output() {
        assert_eq!(
            report_path_for(Path::new("../data/cleaned_ecommerce_sales.csv")),
            PathBuf::from("../data/cleaned_ecommerce_sales_report.json")
        );
        assert_eq!(
            report_path_for(Path::new("out.csv")),
            PathBuf::from("out_report.json")
        );
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "sales-cleaning",
            "-i",
            "raw.csv",
            "-o",
            "clean.csv",
            "--threshold",
            "2.5",
            "--fail-on-empty-column",
        ]);
        let config = build_config(&args).unwrap();

        assert_eq!(config.input_path, PathBuf::from("raw.csv"));
        assert_eq!(config.output_path, PathBuf::from("clean.csv"));
        assert_eq!(config.zscore_threshold, 2.5);
        assert_eq!(config.empty_column_policy, EmptyColumnPolicy::Fail);
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        let args = Args::parse_from([
            "sales-cleaning",
            "-i",
            "raw.csv",
            "-o",
            "clean.csv",
            "--threshold=0",
        ]);
        assert!(build_config(&args).is_err());
    }
}
