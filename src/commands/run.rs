//! Full pipeline over a work directory.
//!
//! Attributes every profiling batch, then checks convergence, then
//! calmness. Stages whose input tree is absent are skipped.

use super::attribute::attribute_batch;
use super::calmness::check_calmness;
use super::convergence::check_convergence;
use super::models::WorkArgs;
use crate::layout::{list_named_dirs, list_numeric_dirs, WorkLayout};
use crate::output::{render_calmness_summary, render_convergence_summary};
use crate::parser::schema::{CalmnessReport, ConvergenceReport};
use crate::utils::config::AnalysisConfig;
use crate::utils::resolve_config;
use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::time::Instant;

/// What the full pipeline produced
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub batches_attributed: usize,
    pub batches_skipped: usize,
    pub convergence: Option<ConvergenceReport>,
    pub calmness: Option<CalmnessReport>,
}

/// Execute the run command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Neither `calmness/` nor `profiling/` exists under the work directory
/// * Config file cannot be loaded
/// * A report cannot be written
pub fn execute_run(args: WorkArgs) -> Result<RunOutcome> {
    let layout = WorkLayout::new(&args.work_directory);
    if !layout.has_calmness_data() && !layout.has_profiling_data() {
        bail!(
            "Nothing to analyse in {}: expected calmness/ or profiling/",
            layout.root().display()
        );
    }

    let config = resolve_config(args.config.as_deref(), Some(args.work_directory.as_path()))
        .context("Failed to load analysis config")?;

    let outcome = run_pipeline(&layout, &config)?;

    if args.print_summary {
        if let Some(report) = &outcome.convergence {
            println!("{}", render_convergence_summary(report));
        }
        if let Some(report) = &outcome.calmness {
            println!("{}", render_calmness_summary(report));
        }
    }
    Ok(outcome)
}

/// Run every stage the work directory has data for
pub fn run_pipeline(layout: &WorkLayout, config: &AnalysisConfig) -> Result<RunOutcome> {
    let start_time = Instant::now();
    let mut outcome = RunOutcome::default();

    if layout.has_profiling_data() {
        info!("Attributing profiling batches...");
        let (attributed, skipped) = attribute_all_batches(layout, config)?;
        outcome.batches_attributed = attributed;
        outcome.batches_skipped = skipped;

        outcome.convergence = Some(check_convergence(layout)?);
    } else {
        info!("No profiling/ directory, skipping attribution and convergence");
    }

    if layout.has_calmness_data() {
        outcome.calmness = Some(check_calmness(layout, config)?);
    } else {
        info!("No calmness/ directory, skipping calmness");
    }

    info!(
        "✓ Pipeline finished in {:.2}s ({} batches attributed, {} skipped)",
        start_time.elapsed().as_secs_f64(),
        outcome.batches_attributed,
        outcome.batches_skipped
    );
    Ok(outcome)
}

/// Attribute `profiling/<bench>/<batch>/` for every benchmark and batch
///
/// Returns `(attributed, skipped)` batch counts.
fn attribute_all_batches(layout: &WorkLayout, config: &AnalysisConfig) -> Result<(usize, usize)> {
    let mut attributed = 0;
    let mut skipped = 0;

    let benchmarks =
        list_named_dirs(layout.profiling_root()).context("Failed to list profiled benchmarks")?;
    for benchmark in &benchmarks {
        let batches = match list_numeric_dirs(layout.profiling_root().join(benchmark)) {
            Ok(batches) => batches,
            Err(e) => {
                warn!("{}: skipped ({})", benchmark, e);
                continue;
            }
        };

        for batch in batches {
            match attribute_batch(&layout.batch_runs(benchmark, batch), config) {
                Ok(_) => attributed += 1,
                Err(e) => {
                    warn!("{} batch {}: skipped ({:#})", benchmark, batch, e);
                    skipped += 1;
                }
            }
        }
    }

    Ok((attributed, skipped))
}
