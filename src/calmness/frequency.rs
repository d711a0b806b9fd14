//! Temporal and spatial CPU frequency comparison.
//!
//! Frequencies from both sides are pooled and cut into bands with the
//! adaptive binner. Each side then becomes a series of band occupancy
//! fractions, keyed by epoch (temporal) or by core (spatial), and the two
//! series are correlated.

use crate::layout::RunTree;
use crate::parser::run_files::{read_frequencies, require};
use crate::parser::schema::{FrequencySample, RunId};
use crate::stats::{
    correlation_std_error, distinct_count, pearson, AdaptiveBinner, BinEdges, Degeneracy, Metric,
};
use crate::utils::error::AnalysisError;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// What a comparison series is indexed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// One point per (epoch, band)
    Temporal,
    /// One point per (core, band)
    Spatial,
}

impl Axis {
    fn key(&self, sample: &FrequencySample) -> i64 {
        match self {
            Axis::Temporal => sample.epoch,
            Axis::Spatial => i64::from(sample.cpu),
        }
    }
}

/// Correlation of a profiled series against the reference series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesComparison {
    pub correlation: Metric,
    pub std_error: Metric,
    /// `sqrt((max - min)^2 / n)` over the profiled series
    pub rms: Metric,
    /// Number of aligned points
    pub points: usize,
}

/// Read and pool the frequency files of several runs
pub fn load_frequencies(
    tree: &RunTree,
    runs: &[RunId],
    file_name: &str,
    divisor: f64,
) -> Result<Vec<FrequencySample>, AnalysisError> {
    let mut pooled = Vec::new();
    for &run in runs {
        let path = require(tree.file_for(run, file_name))?;
        let samples =
            read_frequencies(&path, run, divisor).map_err(|e| AnalysisError::malformed(&path, e))?;
        pooled.extend(samples);
    }
    Ok(pooled)
}

/// Largest epoch in a pooled sample
pub fn max_epoch(samples: &[FrequencySample]) -> Option<i64> {
    samples.iter().map(|s| s.epoch).max()
}

/// Rescale epochs so the mean per-run length maps onto `target_max`
///
/// Each epoch becomes `round(epoch * target_max / mean(per-run max epoch))`.
/// Samples are returned unchanged when the mean run length is zero.
pub fn rescale_epochs(samples: &[FrequencySample], target_max: i64) -> Vec<FrequencySample> {
    let mut per_run: BTreeMap<RunId, i64> = BTreeMap::new();
    for sample in samples {
        let entry = per_run.entry(sample.run).or_insert(sample.epoch);
        *entry = (*entry).max(sample.epoch);
    }
    if per_run.is_empty() {
        return Vec::new();
    }

    let mean_length = per_run.values().map(|&e| e as f64).sum::<f64>() / per_run.len() as f64;
    if mean_length == 0.0 {
        return samples.to_vec();
    }
    let scale = target_max as f64 / mean_length;

    samples
        .iter()
        .map(|sample| FrequencySample {
            epoch: (sample.epoch as f64 * scale).round_ties_even() as i64,
            ..*sample
        })
        .collect()
}

/// Normalize reference epochs onto their own pooled maximum
pub fn normalize_reference(samples: &[FrequencySample]) -> Vec<FrequencySample> {
    match max_epoch(samples) {
        Some(target) => rescale_epochs(samples, target),
        None => Vec::new(),
    }
}

/// Normalize profiled epochs onto the (normalized) reference maximum
pub fn normalize_profiled(
    samples: &[FrequencySample],
    reference: &[FrequencySample],
) -> Vec<FrequencySample> {
    match max_epoch(reference) {
        Some(target) => rescale_epochs(samples, target),
        None => samples.to_vec(),
    }
}

/// Pooled band edges, or `None` when the comparison must collapse to counts
pub fn pooled_bands(
    profiled: &[FrequencySample],
    reference: &[FrequencySample],
    binner: &AdaptiveBinner,
) -> Option<BinEdges> {
    let pooled: Vec<f64> = profiled
        .iter()
        .chain(reference)
        .map(|s| s.frequency)
        .collect();

    if distinct_count(&pooled) < 2 {
        return None;
    }
    binner.edges(&pooled).filter(|edges| edges.bin_count() > 0)
}

/// Series values keyed by (axis key, band)
///
/// With bands, a value is the fraction of that key's samples falling in the
/// band. Without bands, a value is the raw sample count of the key.
fn occupancy(
    samples: &[FrequencySample],
    axis: Axis,
    bands: Option<&BinEdges>,
) -> BTreeMap<(i64, usize), f64> {
    let mut counts: BTreeMap<(i64, usize), f64> = BTreeMap::new();
    let mut totals: BTreeMap<i64, f64> = BTreeMap::new();

    for sample in samples {
        let key = axis.key(sample);
        let band = match bands {
            Some(edges) => match edges.locate(sample.frequency) {
                Some(band) => band,
                None => continue,
            },
            None => 0,
        };
        *counts.entry((key, band)).or_insert(0.0) += 1.0;
        *totals.entry(key).or_insert(0.0) += 1.0;
    }

    if bands.is_some() {
        for ((key, _), value) in counts.iter_mut() {
            *value /= totals[key];
        }
    }
    counts
}

/// Compare profiled against reference along one axis
///
/// Only keys observed on both sides take part; each is crossed with every
/// band, and a band never seen at a key contributes 0.
pub fn compare_series(
    profiled: &[FrequencySample],
    reference: &[FrequencySample],
    axis: Axis,
    bands: Option<&BinEdges>,
) -> SeriesComparison {
    let profiled_values = occupancy(profiled, axis, bands);
    let reference_values = occupancy(reference, axis, bands);

    let profiled_keys: BTreeSet<i64> = profiled_values.keys().map(|(k, _)| *k).collect();
    let reference_keys: BTreeSet<i64> = reference_values.keys().map(|(k, _)| *k).collect();
    let band_count = bands.map_or(1, BinEdges::bin_count);

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for key in profiled_keys.intersection(&reference_keys) {
        for band in 0..band_count {
            xs.push(profiled_values.get(&(*key, band)).copied().unwrap_or(0.0));
            ys.push(reference_values.get(&(*key, band)).copied().unwrap_or(0.0));
        }
    }

    let correlation = pearson(&xs, &ys);
    let comparison = SeriesComparison {
        correlation,
        std_error: correlation_std_error(correlation, xs.len()),
        rms: extreme_rms(&xs),
        points: xs.len(),
    };

    debug!(
        "{:?} comparison over {} points: r = {}",
        axis, comparison.points, comparison.correlation
    );
    comparison
}

/// `sqrt((max - min)^2 / n)`
fn extreme_rms(series: &[f64]) -> Metric {
    if series.is_empty() {
        return Metric::Undefined(Degeneracy::TooFewPoints);
    }
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    Metric::from_f64(((max - min).powi(2) / series.len() as f64).sqrt())
}
