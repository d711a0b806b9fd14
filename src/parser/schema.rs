//! Data model shared across the pipeline, plus the report schema written to disk.
//!
//! Every entity is a plain value: produced by one stage, read by the next.

use crate::stats::Metric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Run (or batch) index as it appears in directory names
pub type RunId = u32;

/// Raw cumulative counter values for one socket at one epoch
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReading {
    pub socket: u32,
    pub epoch: u64,
    /// `None` when the cell was empty
    pub package: Option<f64>,
    pub dram: Option<f64>,
}

/// Corrected per-epoch consumption; both fields are always >= 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyDelta {
    pub socket: u32,
    pub epoch: u64,
    pub package_joules: f64,
    pub dram_joules: f64,
}

impl EnergyDelta {
    pub fn total(&self) -> f64 {
        self.package_joules + self.dram_joules
    }
}

/// One asynchronous call stack sample
#[derive(Debug, Clone, PartialEq)]
pub struct CallStackSample {
    pub timestamp_ns: u64,
    pub thread_id: u64,
    /// Innermost frame first
    pub frames: Vec<String>,
}

/// What the thread manifest says about a thread
///
/// Objects are read as spans (unknown keys ignored); anything else, usually the
/// thread name, only marks the thread as known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThreadLiveness {
    Span {
        #[serde(default)]
        start: Option<u64>,
        #[serde(default)]
        end: Option<u64>,
    },
    Known(serde_json::Value),
}

impl ThreadLiveness {
    /// Whether the thread was alive at `timestamp_ns`
    pub fn contains(&self, timestamp_ns: u64) -> bool {
        match self {
            ThreadLiveness::Span { start, end } => {
                start.map_or(true, |s| timestamp_ns >= s) && end.map_or(true, |e| timestamp_ns <= e)
            }
            ThreadLiveness::Known(_) => true,
        }
    }
}

/// Thread id -> liveness, read once per run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadLivenessMap(pub BTreeMap<u64, ThreadLiveness>);

impl ThreadLivenessMap {
    /// Whether `thread_id` may receive energy for a sample taken at `timestamp_ns`
    pub fn admits(&self, thread_id: u64, timestamp_ns: u64) -> bool {
        self.0
            .get(&thread_id)
            .map_or(false, |liveness| liveness.contains(timestamp_ns))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Energy attributed to one method in one epoch of one run (or batch)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodEnergyRecord {
    pub epoch: u64,
    pub method: String,
    /// Run or batch identifier
    pub run: RunId,
    pub joules: f64,
}

/// One core's frequency at one epoch of one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencySample {
    pub run: RunId,
    pub cpu: u32,
    pub epoch: i64,
    pub frequency: f64,
}

/// Calmness of one sampling rate for one benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalmnessVerdict {
    pub benchmark: String,
    pub sampling_rate: u32,
    pub runtime_deviation: Metric,
    pub runtime_deviation_std: Metric,
    pub temporal_correlation: Metric,
    pub temporal_correlation_err: Metric,
    pub temporal_rms: Metric,
    pub spatial_correlation: Metric,
    pub spatial_correlation_err: Metric,
    pub spatial_rms: Metric,
    pub is_calm: bool,
}

/// The sampling rate chosen for a benchmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSelection {
    pub benchmark: String,
    pub size: String,
    pub rate_ms: u32,
    /// No tested rate was calm; this is the smallest rate regardless
    pub degraded: bool,
}

/// Stability of a method energy ranking across batches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceVerdict {
    pub benchmark: String,
    pub batch_count: usize,
    pub method_count: usize,
    pub rank_correlation: Metric,
    pub rank_correlation_std: Metric,
    pub rank_rmse: Metric,
}

/// Top-level calmness report written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalmnessReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Every (benchmark, rate) verdict, sorted
    pub verdicts: Vec<CalmnessVerdict>,

    /// One accepted rate per benchmark
    pub selections: Vec<RateSelection>,

    /// Benchmarks that could not be evaluated, with the reason
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedBenchmark>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// Top-level convergence report written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceReport {
    pub version: String,
    pub verdicts: Vec<ConvergenceVerdict>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedBenchmark>,
    pub generated_at: String,
}

/// A benchmark dropped under isolate-and-continue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBenchmark {
    pub benchmark: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_manifest_shapes() {
        let manifest: ThreadLivenessMap = serde_json::from_str(
            r#"{"1": "main", "7": {"start": 100, "end": 200}, "9": {"name": "worker"}}"#,
        )
        .unwrap();

        assert_eq!(manifest.len(), 3);
        assert!(manifest.admits(1, 5));
        assert!(manifest.admits(7, 150));
        assert!(!manifest.admits(7, 250));
        assert!(manifest.admits(9, 0));
        assert!(!manifest.admits(42, 150));
    }
}
