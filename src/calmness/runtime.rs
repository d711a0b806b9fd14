//! Runtime perturbation: how much slower a profiled run is than the reference.

use crate::layout::RunTree;
use crate::parser::run_files::{read_timestamps, require};
use crate::parser::schema::RunId;
use crate::stats::{Degeneracy, Metric, SampleSummary};
use crate::utils::config::TIMESTAMP_FILE;
use crate::utils::error::AnalysisError;

/// Relative runtime change and its propagated uncertainty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeComparison {
    pub reference: SampleSummary,
    pub profiled: SampleSummary,
    /// `(mean_profiled - mean_reference) / mean_reference`
    pub deviation: Metric,
    /// First-order error propagation of the ratio of means
    pub deviation_std: Metric,
}

/// Duration in seconds of each listed run
pub fn run_durations(tree: &RunTree, runs: &[RunId]) -> Result<Vec<f64>, AnalysisError> {
    runs.iter()
        .map(|&run| {
            let path = require(tree.file_for(run, TIMESTAMP_FILE))?;
            let span = read_timestamps(&path).map_err(|e| AnalysisError::malformed(&path, e))?;
            Ok(span.duration_secs())
        })
        .collect()
}

/// Compare profiled durations against reference durations
///
/// Returns `None` when either sample is empty.
pub fn compare_runtimes(reference: &[f64], profiled: &[f64]) -> Option<RuntimeComparison> {
    let reference = SampleSummary::from_sample(reference)?;
    let profiled = SampleSummary::from_sample(profiled)?;

    if reference.mean == 0.0 {
        let undefined = Metric::Undefined(Degeneracy::NonFinite);
        return Some(RuntimeComparison {
            reference,
            profiled,
            deviation: undefined,
            deviation_std: undefined,
        });
    }

    let ratio = profiled.mean / reference.mean;
    let deviation = Metric::from_f64(ratio - 1.0);
    let deviation_std = match (
        profiled.coefficient_of_variation(),
        reference.coefficient_of_variation(),
    ) {
        (Some(cv_p), Some(cv_r)) => Metric::from_f64(ratio * (cv_p.powi(2) + cv_r.powi(2)).sqrt()),
        _ => Metric::Undefined(Degeneracy::NonFinite),
    };

    Some(RuntimeComparison {
        reference,
        profiled,
        deviation,
        deviation_std,
    })
}
