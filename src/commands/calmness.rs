//! Calmness command implementation.
//!
//! The calmness command:
//! 1. Discovers benchmarks with reference runs
//! 2. Evaluates every tested sampling rate of each benchmark
//! 3. Selects one rate per benchmark
//! 4. Writes the verdict table, the JSON report and the rate manifest

use super::models::WorkArgs;
use crate::calmness::{evaluate_benchmark, select_rate};
use crate::layout::{list_named_dirs, WorkLayout};
use crate::output::{render_calmness_summary, write_calmness_table, write_rate_manifest, write_report};
use crate::parser::schema::{CalmnessReport, SkippedBenchmark};
use crate::utils::config::{
    AnalysisConfig, CALMNESS_REPORT_FILE, CALMNESS_TABLE_FILE, RATE_MANIFEST_FILE, SCHEMA_VERSION,
};
use crate::utils::resolve_config;
use anyhow::{Context, Result};
use log::{info, warn};
use std::time::Instant;

/// Execute the calmness command
///
/// **Public** - main entry point called from main.rs
pub fn execute_calmness(args: WorkArgs) -> Result<CalmnessReport> {
    let config = resolve_config(args.config.as_deref(), Some(args.work_directory.as_path()))
        .context("Failed to load analysis config")?;
    let layout = WorkLayout::new(&args.work_directory);

    let report = check_calmness(&layout, &config)?;

    if args.print_summary {
        println!("{}", render_calmness_summary(&report));
    }
    Ok(report)
}

/// Evaluate every benchmark under `calmness/` and write the outputs
///
/// A benchmark that fails is recorded as skipped; the others are unaffected.
pub fn check_calmness(layout: &WorkLayout, config: &AnalysisConfig) -> Result<CalmnessReport> {
    let start_time = Instant::now();

    // Step 1: Discover benchmarks
    info!("Step 1/4: Discovering benchmarks...");
    let benchmarks =
        list_named_dirs(layout.reference_root()).context("Failed to list reference benchmarks")?;

    // Step 2: Evaluate rates
    info!("Step 2/4: Evaluating {} benchmarks...", benchmarks.len());
    let mut verdicts = Vec::new();
    let mut skipped = Vec::new();

    for benchmark in &benchmarks {
        match evaluate_benchmark(layout, benchmark, config) {
            Ok(mut benchmark_verdicts) => verdicts.append(&mut benchmark_verdicts),
            Err(e) => {
                warn!("{}: skipped ({})", benchmark, e);
                skipped.push(SkippedBenchmark {
                    benchmark: benchmark.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    verdicts.sort_by(|a, b| {
        a.benchmark
            .cmp(&b.benchmark)
            .then(a.sampling_rate.cmp(&b.sampling_rate))
    });

    // Step 3: Select rates
    info!("Step 3/4: Selecting sampling rates...");
    let selections: Vec<_> = benchmarks
        .iter()
        .filter_map(|benchmark| select_rate(benchmark, config.size_label(benchmark), &verdicts))
        .collect();
    for selection in selections.iter().filter(|s| s.degraded) {
        warn!(
            "{}: no calm rate, falling back to {}ms",
            selection.benchmark, selection.rate_ms
        );
    }

    let report = CalmnessReport {
        version: SCHEMA_VERSION.to_string(),
        verdicts,
        selections,
        skipped,
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    // Step 4: Write outputs
    info!("Step 4/4: Writing calmness outputs...");
    let summary_dir = layout.summary_dir();
    write_calmness_table(summary_dir.join(CALMNESS_TABLE_FILE), &report.verdicts)
        .context("Failed to write calmness table")?;
    write_report(&report, summary_dir.join(CALMNESS_REPORT_FILE))
        .context("Failed to write calmness report")?;
    write_rate_manifest(summary_dir.join(RATE_MANIFEST_FILE), &report.selections)
        .context("Failed to write rate manifest")?;

    info!(
        "✓ Calmness checked in {:.2}s ({} verdicts, {} calm, {} benchmarks skipped)",
        start_time.elapsed().as_secs_f64(),
        report.verdicts.len(),
        report.verdicts.iter().filter(|v| v.is_calm).count(),
        report.skipped.len()
    );

    Ok(report)
}
