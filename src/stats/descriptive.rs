//! Basic descriptive statistics over `f64` samples.

use serde::{Deserialize, Serialize};

/// Arithmetic mean, `None` for an empty sample
pub fn mean(sample: &[f64]) -> Option<f64> {
    if sample.is_empty() {
        return None;
    }
    Some(sample.iter().sum::<f64>() / sample.len() as f64)
}

/// Population standard deviation (divides by n), `None` for an empty sample
pub fn population_std(sample: &[f64]) -> Option<f64> {
    let m = mean(sample)?;
    let variance = sample.iter().map(|x| (x - m).powi(2)).sum::<f64>() / sample.len() as f64;
    Some(variance.sqrt())
}

/// Quantile with linear interpolation between closest ranks
///
/// Matches the default used by most dataframe libraries: position
/// `q * (n - 1)` in the sorted sample.
pub fn quantile(sample: &[f64], q: f64) -> Option<f64> {
    if sample.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(quantile_sorted(&sorted, q))
}

/// Quantile of an already sorted, non-empty sample
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Number of distinct values (exact comparison)
pub fn distinct_count(sample: &[f64]) -> usize {
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup_by(|a, b| a.total_cmp(b).is_eq());
    sorted.len()
}

/// Mean and spread of a set of per-run measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

impl SampleSummary {
    /// Summarise a sample; `None` when empty
    pub fn from_sample(sample: &[f64]) -> Option<Self> {
        Some(Self {
            mean: mean(sample)?,
            std: population_std(sample)?,
            count: sample.len(),
        })
    }

    /// Coefficient of variation, `None` when the mean is zero
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        if self.mean == 0.0 {
            None
        } else {
            Some(self.std / self.mean)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let sample = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&sample), Some(5.0));
        assert_eq!(population_std(&sample), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sample = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&sample, 0.0), Some(1.0));
        assert_eq!(quantile(&sample, 1.0), Some(4.0));
        assert_eq!(quantile(&sample, 0.25), Some(1.75));
        assert_eq!(quantile(&sample, 0.75), Some(3.25));
        assert_eq!(quantile(&sample, 1.5), None);
    }

    #[test]
    fn test_distinct_count() {
        assert_eq!(distinct_count(&[1.0, 1.0, 2.0, 3.0, 3.0]), 3);
        assert_eq!(distinct_count(&[]), 0);
    }

    #[test]
    fn test_summary_cv() {
        let summary = SampleSummary::from_sample(&[9.9, 10.1]).unwrap();
        assert!((summary.mean - 10.0).abs() < 1e-12);
        assert!((summary.coefficient_of_variation().unwrap() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_summary_keeps_input_precision() {
        let summary = SampleSummary::from_sample(&[0.002, 0.002]).unwrap();
        assert_eq!(summary.mean, 0.002);
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.mean.to_string(), "0.002");
    }
}
