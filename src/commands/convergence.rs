//! Convergence command implementation.
//!
//! Checks every benchmark under `profiling/` and writes
//! `summary/convergence.json`.

use super::models::WorkArgs;
use crate::convergence::evaluate_benchmark;
use crate::layout::{list_named_dirs, WorkLayout};
use crate::output::{render_convergence_summary, write_report};
use crate::parser::schema::{ConvergenceReport, SkippedBenchmark};
use crate::utils::config::{CONVERGENCE_REPORT_FILE, SCHEMA_VERSION};
use crate::utils::resolve_config;
use anyhow::{Context, Result};
use log::{info, warn};

/// Execute the convergence command
///
/// **Public** - main entry point called from main.rs
pub fn execute_convergence(args: WorkArgs) -> Result<ConvergenceReport> {
    // Only validated here; convergence has no tunables of its own
    resolve_config(args.config.as_deref(), Some(args.work_directory.as_path()))
        .context("Failed to load analysis config")?;
    let layout = WorkLayout::new(&args.work_directory);

    let report = check_convergence(&layout)?;

    if args.print_summary {
        println!("{}", render_convergence_summary(&report));
    }
    Ok(report)
}

/// Check every benchmark with attribution batches and write the report
pub fn check_convergence(layout: &WorkLayout) -> Result<ConvergenceReport> {
    let benchmarks =
        list_named_dirs(layout.profiling_root()).context("Failed to list profiled benchmarks")?;
    info!("Checking convergence of {} benchmarks...", benchmarks.len());

    let mut verdicts = Vec::new();
    let mut skipped = Vec::new();
    for benchmark in &benchmarks {
        match evaluate_benchmark(layout, benchmark) {
            Ok(verdict) => verdicts.push(verdict),
            Err(e) => {
                warn!("{}: skipped ({})", benchmark, e);
                skipped.push(SkippedBenchmark {
                    benchmark: benchmark.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let report = ConvergenceReport {
        version: SCHEMA_VERSION.to_string(),
        verdicts,
        skipped,
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    write_report(&report, layout.summary_dir().join(CONVERGENCE_REPORT_FILE))
        .context("Failed to write convergence report")?;

    Ok(report)
}
