//! Convergence: has the method energy ranking stopped moving?
//!
//! Each attribution batch of a benchmark leaves a method summary behind.
//! The checker compares the ranking built from all batches but the newest
//! with the ranking built from all of them. It only reports; deciding
//! whether to collect more batches is up to the caller.

pub mod checker;

pub use checker::{check_convergence, method_shares};

use crate::layout::{list_numeric_dirs, WorkLayout};
use crate::output::read_method_summary;
use crate::parser::schema::{ConvergenceVerdict, MethodEnergyRecord, RunId};
use crate::utils::config::METHOD_SUMMARY_FILE;
use crate::utils::error::AnalysisError;
use log::{debug, warn};

/// Load every batch summary of a benchmark as records tagged with the batch id
///
/// Batch summaries carry no epoch, so every record has epoch 0. A batch
/// without a summary is logged and left out.
///
/// # Errors
/// * `AnalysisError::MissingInput` - the benchmark has no profiling directory
/// * `AnalysisError::Malformed` - a summary exists but cannot be parsed
pub fn load_batches(
    layout: &WorkLayout,
    benchmark: &str,
) -> Result<Vec<MethodEnergyRecord>, AnalysisError> {
    let batches: Vec<RunId> = list_numeric_dirs(layout.profiling_root().join(benchmark))?;
    let mut records = Vec::new();

    for batch in batches {
        let path = layout
            .batch_runs(benchmark, batch)
            .summary_dir()
            .join(METHOD_SUMMARY_FILE);
        if !path.is_file() {
            warn!("{} batch {}: no method summary, skipped", benchmark, batch);
            continue;
        }

        let totals = read_method_summary(&path).map_err(|e| AnalysisError::malformed(&path, e))?;
        debug!("{} batch {}: {} methods", benchmark, batch, totals.len());
        records.extend(totals.into_iter().map(|(method, joules)| MethodEnergyRecord {
            epoch: 0,
            method,
            run: batch,
            joules,
        }));
    }

    Ok(records)
}

/// Load and check one benchmark
pub fn evaluate_benchmark(
    layout: &WorkLayout,
    benchmark: &str,
) -> Result<ConvergenceVerdict, AnalysisError> {
    let records = load_batches(layout, benchmark)?;
    Ok(check_convergence(benchmark, &records))
}
