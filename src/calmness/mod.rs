//! Calmness: does profiling at a given rate perturb the program?
//!
//! Each sampling rate of a benchmark is compared against unprofiled
//! reference runs on three axes: runtime, per-epoch frequency distribution
//! (temporal) and per-core frequency distribution (spatial).

pub mod frequency;
pub mod runtime;
pub mod verdict;

pub use frequency::{compare_series, pooled_bands, Axis, SeriesComparison};
pub use runtime::{compare_runtimes, RuntimeComparison};
pub use verdict::{build_verdict, is_calm, select_rate};

use crate::layout::{list_numeric_dirs, WorkLayout};
use crate::parser::schema::CalmnessVerdict;
use crate::stats::AdaptiveBinner;
use crate::utils::config::{AnalysisConfig, PROFILED_FREQUENCY_FILE, REFERENCE_FREQUENCY_FILE};
use crate::utils::error::AnalysisError;
use log::{debug, info, warn};

/// Evaluate every tested sampling rate of one benchmark
///
/// **Public** - main entry point for calmness checking
///
/// # Arguments
/// * `layout` - Work directory
/// * `benchmark` - Benchmark name (directory under the reference root)
/// * `config` - Analysis configuration
///
/// # Returns
/// One verdict per rate, ordered by rate. A rate whose files cannot be read
/// is logged and left out.
///
/// # Errors
/// * `AnalysisError::MissingInput` - reference runs or the profile directory are absent
/// * `AnalysisError::Malformed` - a reference file fails to parse
/// * `AnalysisError::EmptyRunSet` - no reference runs survive warm-up exclusion
pub fn evaluate_benchmark(
    layout: &WorkLayout,
    benchmark: &str,
    config: &AnalysisConfig,
) -> Result<Vec<CalmnessVerdict>, AnalysisError> {
    let reference_tree = layout.reference_runs(benchmark);
    let reference_runs = reference_tree.steady_state_runs(config.warmup_divisor)?;

    let reference_durations = runtime::run_durations(&reference_tree, &reference_runs)?;
    let reference_frequencies = frequency::normalize_reference(&frequency::load_frequencies(
        &reference_tree,
        &reference_runs,
        REFERENCE_FREQUENCY_FILE,
        config.frequency_divisor,
    )?);

    let rates = list_numeric_dirs(layout.profile_root().join(benchmark))?;
    info!("{}: {} reference runs, {} rates", benchmark, reference_runs.len(), rates.len());

    let binner = AdaptiveBinner::new(&config.binning);
    let mut verdicts = Vec::with_capacity(rates.len());

    for rate in rates {
        let profiled_tree = layout.profiled_runs(benchmark, rate);
        let outcome = profiled_tree
            .steady_state_runs(config.warmup_divisor)
            .and_then(|runs| {
                let durations = runtime::run_durations(&profiled_tree, &runs)?;
                let frequencies = frequency::load_frequencies(
                    &profiled_tree,
                    &runs,
                    PROFILED_FREQUENCY_FILE,
                    config.frequency_divisor,
                )?;
                Ok((durations, frequencies))
            });

        let (durations, frequencies) = match outcome {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("{} @ {}ms: skipped ({})", benchmark, rate, e);
                continue;
            }
        };

        let profiled_frequencies = frequency::normalize_profiled(&frequencies, &reference_frequencies);
        let runtime = compare_runtimes(&reference_durations, &durations);
        let bands = pooled_bands(&profiled_frequencies, &reference_frequencies, &binner);
        if bands.is_none() {
            debug!("{} @ {}ms: frequencies collapse to counts", benchmark, rate);
        }

        let temporal = compare_series(
            &profiled_frequencies,
            &reference_frequencies,
            Axis::Temporal,
            bands.as_ref(),
        );
        let spatial = compare_series(
            &profiled_frequencies,
            &reference_frequencies,
            Axis::Spatial,
            bands.as_ref(),
        );

        let verdict = build_verdict(
            benchmark,
            rate,
            runtime.as_ref(),
            &temporal,
            &spatial,
            &config.calmness,
        );
        debug!(
            "{} @ {}ms: runtime {} temporal {} spatial {} calm={}",
            benchmark,
            rate,
            verdict.runtime_deviation,
            verdict.temporal_correlation,
            verdict.spatial_correlation,
            verdict.is_calm
        );
        verdicts.push(verdict);
    }

    Ok(verdicts)
}
