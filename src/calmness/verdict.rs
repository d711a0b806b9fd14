//! Acceptance rule and sampling rate selection.

use super::frequency::SeriesComparison;
use super::runtime::RuntimeComparison;
use crate::parser::schema::{CalmnessVerdict, RateSelection};
use crate::stats::{Degeneracy, Metric};
use crate::utils::config::CalmnessThresholds;

/// Whether the runtime criterion holds
///
/// Accepted when the deviation is small outright, or when it lies within
/// `deviation_sigmas` propagated standard deviations.
pub fn runtime_is_calm(deviation: Metric, deviation_std: Metric, thresholds: &CalmnessThresholds) -> bool {
    let Some(deviation) = deviation.value() else {
        return false;
    };
    let deviation = deviation.abs();
    deviation < thresholds.max_runtime_deviation
        || deviation_std
            .value()
            .map_or(false, |std| deviation <= thresholds.deviation_sigmas * std)
}

/// Full acceptance rule; any undefined input makes it false
pub fn is_calm(
    deviation: Metric,
    deviation_std: Metric,
    temporal_correlation: Metric,
    spatial_correlation: Metric,
    thresholds: &CalmnessThresholds,
) -> bool {
    runtime_is_calm(deviation, deviation_std, thresholds)
        && temporal_correlation.exceeds(thresholds.min_temporal_correlation)
        && spatial_correlation.exceeds(thresholds.min_spatial_correlation)
}

/// Assemble the verdict for one (benchmark, rate) pair
pub fn build_verdict(
    benchmark: &str,
    sampling_rate: u32,
    runtime: Option<&RuntimeComparison>,
    temporal: &SeriesComparison,
    spatial: &SeriesComparison,
    thresholds: &CalmnessThresholds,
) -> CalmnessVerdict {
    let missing = Metric::Undefined(Degeneracy::TooFewPoints);
    let (deviation, deviation_std) =
        runtime.map_or((missing, missing), |r| (r.deviation, r.deviation_std));

    CalmnessVerdict {
        benchmark: benchmark.to_string(),
        sampling_rate,
        runtime_deviation: deviation,
        runtime_deviation_std: deviation_std,
        temporal_correlation: temporal.correlation,
        temporal_correlation_err: temporal.std_error,
        temporal_rms: temporal.rms,
        spatial_correlation: spatial.correlation,
        spatial_correlation_err: spatial.std_error,
        spatial_rms: spatial.rms,
        is_calm: is_calm(
            deviation,
            deviation_std,
            temporal.correlation,
            spatial.correlation,
            thresholds,
        ),
    }
}

/// Pick one sampling rate for a benchmark
///
/// The smallest calm rate wins. With no calm rate the smallest tested rate
/// is returned and flagged as degraded. `None` when nothing was tested.
pub fn select_rate(benchmark: &str, size: &str, verdicts: &[CalmnessVerdict]) -> Option<RateSelection> {
    let tested = verdicts.iter().filter(|v| v.benchmark == benchmark);

    let calm = tested
        .clone()
        .filter(|v| v.is_calm)
        .map(|v| v.sampling_rate)
        .min();
    let (rate_ms, degraded) = match calm {
        Some(rate) => (rate, false),
        None => (tested.map(|v| v.sampling_rate).min()?, true),
    };

    Some(RateSelection {
        benchmark: benchmark.to_string(),
        size: size.to_string(),
        rate_ms,
        degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(r: f64) -> SeriesComparison {
        SeriesComparison {
            correlation: Metric::Value(r),
            std_error: Metric::Value(0.01),
            rms: Metric::Value(0.1),
            points: 30,
        }
    }

    fn verdict(rate: u32, calm: bool) -> CalmnessVerdict {
        let mut verdict = build_verdict(
            "h2",
            rate,
            None,
            &series(0.9),
            &series(0.9),
            &CalmnessThresholds::default(),
        );
        verdict.is_calm = calm;
        verdict
    }

    #[test]
    fn test_threshold_scenario_is_calm() {
        let thresholds = CalmnessThresholds::default();
        // 3% slower, std irrelevant
        assert!(is_calm(
            Metric::Value(0.03),
            Metric::Value(0.0001),
            Metric::Value(0.90),
            Metric::Value(0.88),
            &thresholds
        ));
    }

    #[test]
    fn test_large_deviation_within_sigma() {
        let thresholds = CalmnessThresholds::default();
        assert!(runtime_is_calm(Metric::Value(-0.08), Metric::Value(0.05), &thresholds));
        assert!(!runtime_is_calm(Metric::Value(0.08), Metric::Value(0.01), &thresholds));
    }

    #[test]
    fn test_undefined_correlation_is_not_calm() {
        let thresholds = CalmnessThresholds::default();
        assert!(!is_calm(
            Metric::Value(0.0),
            Metric::Value(0.0),
            Metric::Undefined(Degeneracy::ZeroVariance),
            Metric::Value(0.99),
            &thresholds
        ));
        // Threshold is exclusive
        assert!(!is_calm(
            Metric::Value(0.0),
            Metric::Value(0.0),
            Metric::Value(0.85),
            Metric::Value(0.99),
            &thresholds
        ));
    }

    #[test]
    fn test_select_smallest_calm_rate() {
        let verdicts = vec![verdict(1, false), verdict(4, true), verdict(2, true)];
        let selection = select_rate("h2", "large", &verdicts).unwrap();
        assert_eq!(selection.rate_ms, 2);
        assert!(!selection.degraded);
        assert_eq!(selection.size, "large");
    }

    #[test]
    fn test_select_falls_back_to_smallest_rate() {
        let verdicts = vec![verdict(8, false), verdict(4, false)];
        let selection = select_rate("h2", "default", &verdicts).unwrap();
        assert_eq!(selection.rate_ms, 4);
        assert!(selection.degraded);

        assert!(select_rate("pmd", "default", &verdicts).is_none());
    }
}
