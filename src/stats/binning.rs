//! Adaptive histogram binning.
//!
//! Bin count follows a halved Freedman-Diaconis rule, capped at a ceiling.
//! Samples with no interquartile spread get the ceiling directly.

use super::descriptive::quantile_sorted;
use crate::utils::config::BinningConfig;
use log::debug;

/// Evenly spaced, ascending histogram edges
#[derive(Debug, Clone, PartialEq)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    /// Number of bins (edges - 1)
    pub fn bin_count(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bin holding `value`; bins are closed on the right: `(lo, hi]`
    ///
    /// The first bin also accepts its left edge.
    pub fn locate(&self, value: f64) -> Option<usize> {
        if self.bin_count() == 0 || !value.is_finite() {
            return None;
        }

        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if value < first || value > last {
            return None;
        }

        // First edge >= value closes the bin that holds it
        let upper = self.edges.partition_point(|edge| *edge < value);
        Some(upper.saturating_sub(1).min(self.bin_count() - 1))
    }
}

/// Computes data-driven bin edges
#[derive(Debug, Clone)]
pub struct AdaptiveBinner {
    max_bins: usize,
    padding: f64,
}

impl Default for AdaptiveBinner {
    fn default() -> Self {
        Self::new(&BinningConfig::default())
    }
}

impl AdaptiveBinner {
    pub fn new(config: &BinningConfig) -> Self {
        Self {
            max_bins: config.max_bins,
            padding: config.padding,
        }
    }

    /// Bin count for a sample, before edges are laid out
    ///
    /// Returns `None` for an empty sample or one containing non-finite values.
    pub fn bin_count(&self, sample: &[f64]) -> Option<usize> {
        let sorted = sorted_finite(sample)?;
        Some(self.bin_count_sorted(&sorted))
    }

    /// Edges for a sample: `bin_count + 1` points over `[min - pad, max + pad]`
    ///
    /// A bin count of zero yields a single edge; callers must then compare
    /// without binning, as they must for samples with fewer than two
    /// distinct values.
    pub fn edges(&self, sample: &[f64]) -> Option<BinEdges> {
        let sorted = sorted_finite(sample)?;
        let count = self.bin_count_sorted(&sorted);

        let low = sorted[0] - self.padding;
        let high = sorted[sorted.len() - 1] + self.padding;

        let edges = if count == 0 {
            vec![low]
        } else {
            let step = (high - low) / count as f64;
            (0..=count)
                .map(|i| if i == count { high } else { low + step * i as f64 })
                .collect()
        };

        debug!(
            "Binned {} values into {} bins over [{:.3}, {:.3}]",
            sorted.len(),
            count,
            low,
            high
        );

        Some(BinEdges { edges })
    }

    fn bin_count_sorted(&self, sorted: &[f64]) -> usize {
        let n = sorted.len() as f64;
        let iqr = quantile_sorted(sorted, 0.75) - quantile_sorted(sorted, 0.25);

        if iqr > 0.0 {
            let range = sorted[sorted.len() - 1] - sorted[0];
            let raw = (range * n.cbrt() / iqr / 2.0).floor();
            (raw as usize).min(self.max_bins)
        } else {
            self.max_bins
        }
    }
}

/// Sorted copy of a sample, `None` if empty or containing NaN/inf
fn sorted_finite(sample: &[f64]) -> Option<Vec<f64>> {
    if sample.is_empty() || sample.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(sorted)
}
