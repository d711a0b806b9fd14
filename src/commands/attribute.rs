//! Attribute command implementation.
//!
//! The attribute command, for one batch directory:
//! 1. Discovers runs and drops warm-up runs
//! 2. Attributes each run's energy to methods
//! 3. Summarises the batch
//! 4. Writes per-run tables and batch summaries

use super::models::AttributeArgs;
use crate::aggregator::{
    attribute_run, calculate_energy_distribution, summarize_components, summarize_methods,
    summarize_runtime, AttributionReport, EnergyDistribution, MethodTotal, RuntimeSummary,
    StackFilter,
};
use crate::layout::RunTree;
use crate::output::{
    render_batch_summary, write_component_summary, write_epoch_energy, write_method_records,
    write_method_summary, write_runtime_summary,
};
use crate::parser::load_run;
use crate::utils::config::{
    AnalysisConfig, COMPONENT_SUMMARY_FILE, METHOD_SUMMARY_FILE, RUNTIME_SUMMARY_FILE,
};
use crate::utils::resolve_config;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// What attributing one batch produced
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub runs_attributed: usize,
    pub runs_skipped: usize,
    pub degraded_runs: usize,
    pub counter_anomalies: usize,
    /// Method ranking over all attributed runs
    pub methods: Vec<MethodTotal>,
    pub distribution: EnergyDistribution,
    pub runtime: RuntimeSummary,
}

/// Execute the attribute command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Config file cannot be loaded
/// * No run survives warm-up exclusion or loading
/// * Output files cannot be written
pub fn execute_attribute(args: AttributeArgs) -> Result<BatchOutcome> {
    let config = resolve_config(args.config.as_deref(), Some(args.dir.as_path()))
        .context("Failed to load analysis config")?;

    let outcome = attribute_batch(&RunTree::new(&args.dir), &config)?;

    if args.print_summary {
        println!(
            "{}",
            render_batch_summary(&outcome.methods, &outcome.distribution, args.top_methods)
        );
    }

    Ok(outcome)
}

/// Attribute every steady-state run of a batch and write its outputs
///
/// A run that fails to load is logged and skipped; the batch fails only
/// when no run could be attributed.
pub fn attribute_batch(tree: &RunTree, config: &AnalysisConfig) -> Result<BatchOutcome> {
    let start_time = Instant::now();
    info!("Attributing batch: {}", tree.base().display());

    // Step 1: Discover runs
    info!("Step 1/4: Discovering runs...");
    let runs = tree
        .steady_state_runs(config.warmup_divisor)
        .context("Failed to list runs")?;

    // Step 2: Attribute each run
    info!("Step 2/4: Attributing {} runs...", runs.len());
    let filter = StackFilter::new(&config.stack_filter);
    let method_dir = tree.processed_dir().join("method");
    let energy_dir = tree.processed_dir().join("energy");

    let mut reports: Vec<AttributionReport> = Vec::with_capacity(runs.len());
    let mut runs_skipped = 0;

    for run in runs {
        let data = match load_run(tree, run) {
            Ok(data) => data,
            Err(e) => {
                warn!("Run {}: skipped ({})", run, e);
                runs_skipped += 1;
                continue;
            }
        };

        let report = attribute_run(&data, &config.counter, &config.attribution, &filter);
        debug!(
            "Run {}: {:.3} J over {} epochs, mean {:.1} active threads",
            run,
            report.total_joules(),
            report.epoch_energy.len(),
            report.mean_active_threads
        );

        write_method_records(method_dir.join(format!("{}.csv", run)), &report.records)
            .with_context(|| format!("Failed to write method table for run {}", run))?;
        write_epoch_energy(energy_dir.join(format!("{}.csv", run)), &report.epoch_energy)
            .with_context(|| format!("Failed to write energy table for run {}", run))?;

        reports.push(report);
    }

    if reports.is_empty() {
        bail!("No run in {} could be attributed", tree.base().display());
    }

    // Step 3: Summarize
    info!("Step 3/4: Summarizing {} runs...", reports.len());
    let methods = summarize_methods(reports.iter().flat_map(|r| r.records.iter()));
    let components = summarize_components(&reports);
    let distribution = calculate_energy_distribution(&methods, &config.attribution.placeholder);
    let runtime = summarize_runtime(&reports);
    info!("Energy distribution: {}", distribution.summary());
    info!(
        "Runtime: {:.3}s ± {:.3}s, {:.1} active threads",
        runtime.mean_secs, runtime.std_secs, runtime.mean_active_threads
    );

    // Step 4: Write summaries
    info!("Step 4/4: Writing summaries...");
    let summary_dir = tree.summary_dir();
    write_method_summary(summary_dir.join(METHOD_SUMMARY_FILE), &methods)
        .context("Failed to write method summary")?;
    write_component_summary(summary_dir.join(COMPONENT_SUMMARY_FILE), &components)
        .context("Failed to write component summary")?;
    write_runtime_summary(summary_dir.join(RUNTIME_SUMMARY_FILE), &runtime)
        .context("Failed to write runtime summary")?;

    let outcome = BatchOutcome {
        runs_attributed: reports.len(),
        runs_skipped,
        degraded_runs: reports.iter().filter(|r| r.degraded).count(),
        counter_anomalies: reports.iter().map(|r| r.anomalies.len()).sum(),
        methods,
        distribution,
        runtime,
    };

    info!(
        "✓ Batch attributed in {:.2}s ({} runs, {} skipped, {} degraded)",
        start_time.elapsed().as_secs_f64(),
        outcome.runs_attributed,
        outcome.runs_skipped,
        outcome.degraded_runs
    );

    Ok(outcome)
}
