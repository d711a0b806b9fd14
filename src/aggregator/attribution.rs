//! Split each epoch's energy across the methods sampled in it.
//!
//! Attribution is proportional to sample counts: a method seen in 3 of the 4
//! surviving samples of an epoch receives 75% of that epoch's energy. Energy
//! that no surviving sample can claim goes to the placeholder identifier, so
//! for every epoch the attributed joules sum to the measured delta.

use super::counter::{normalize_counters, CounterAnomaly};
use super::stack_filter::{FilteredStack, Rejection, StackFilter};
use crate::parser::schema::{MethodEnergyRecord, RunId};
use crate::parser::RunData;
use crate::utils::config::{AttributionConfig, CounterConfig};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Why a call stack sample did not take part in attribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Mapped outside `[1, last_epoch]` or before the run started
    OutOfRange,
    /// Thread absent from the manifest or not alive at that time
    ThreadNotLive,
    /// Thread already sampled in this epoch
    Duplicate,
    /// Stack taken inside the profiler
    Profiler,
    /// Stack held no application frame
    NoApplicationFrame,
    /// Innermost application frame is harness code
    Harness,
    /// No energy reading exists for the epoch
    NoEnergy,
}

impl From<Rejection> for DropReason {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Profiler => DropReason::Profiler,
            Rejection::NoApplicationFrame => DropReason::NoApplicationFrame,
            Rejection::Harness => DropReason::Harness,
        }
    }
}

/// Everything attribution learned about one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributionReport {
    pub run: RunId,

    /// One record per (epoch, method), ordered by epoch then method
    pub records: Vec<MethodEnergyRecord>,

    /// Corrected energy per epoch (all sockets, package + dram)
    pub epoch_energy: BTreeMap<u64, f64>,

    /// Corrected (package, dram) totals per socket
    pub socket_energy: BTreeMap<u32, (f64, f64)>,

    /// Samples that were charged to a method
    pub attributed_samples: usize,

    /// Samples left out, by reason
    pub dropped_samples: BTreeMap<DropReason, usize>,

    /// Mean number of distinct threads charged per sampled epoch
    pub mean_active_threads: f64,

    /// Wall-clock length of the run, from its timestamp file
    pub duration_secs: f64,

    /// Counter deltas that had to be floored
    pub anomalies: Vec<CounterAnomaly>,

    /// The run had no call stack file; everything went to the placeholder
    pub degraded: bool,
}

impl AttributionReport {
    /// Total attributed energy
    pub fn total_joules(&self) -> f64 {
        self.records.iter().map(|r| r.joules).sum()
    }

    pub fn dropped_total(&self) -> usize {
        self.dropped_samples.values().sum()
    }
}

/// Attribute one run's energy to methods
///
/// **Public** - main entry point for attribution
///
/// # Arguments
/// * `run` - Loaded run files
/// * `counter` - Wraparound settings for the counter normalizer
/// * `attribution` - Bucket width and placeholder identifier
/// * `filter` - Stack trace filter
///
/// # Returns
/// Records whose joules sum, per epoch, to that epoch's corrected energy.
/// Epochs with no energy and no samples produce no records.
pub fn attribute_run(
    run: &RunData,
    counter: &CounterConfig,
    attribution: &AttributionConfig,
    filter: &StackFilter,
) -> AttributionReport {
    let normalized = normalize_counters(&run.energy, counter);
    let epoch_energy = normalized.epoch_totals();

    let mut report = AttributionReport {
        run: run.run,
        socket_energy: normalized.socket_totals(),
        anomalies: normalized.anomalies,
        duration_secs: run.span.duration_secs(),
        ..Default::default()
    };

    let Some(samples) = run.samples.as_deref() else {
        warn!("Run {}: degraded mode, all energy to {}", run.run, attribution.placeholder);
        report.degraded = true;
        report.records = epoch_energy
            .iter()
            .filter(|(_, joules)| **joules > 0.0)
            .map(|(&epoch, &joules)| placeholder_record(epoch, run.run, joules, attribution))
            .collect();
        report.epoch_energy = epoch_energy;
        return report;
    };

    let bucket = attribution.bucket_width_ns;
    let last_epoch = run.span.duration_ns() / bucket;

    // (epoch, method, thread) -> sample count
    let mut tally: BTreeMap<(u64, &str, u64), usize> = BTreeMap::new();
    // (epoch, thread): each thread contributes at most one sample per epoch
    let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(samples.len());

    for sample in samples {
        let epoch = match sample.timestamp_ns.checked_sub(run.span.start_ns) {
            Some(relative) => relative / bucket,
            None => {
                drop_sample(&mut report, DropReason::OutOfRange);
                continue;
            }
        };
        if epoch < 1 || epoch > last_epoch {
            drop_sample(&mut report, DropReason::OutOfRange);
            continue;
        }

        if let Some(threads) = &run.threads {
            if !threads.admits(sample.thread_id, sample.timestamp_ns) {
                drop_sample(&mut report, DropReason::ThreadNotLive);
                continue;
            }
        }

        if !seen.insert((epoch, sample.thread_id)) {
            drop_sample(&mut report, DropReason::Duplicate);
            continue;
        }

        let method = match filter.filter(&sample.frames) {
            FilteredStack::Application(frames) => frames[0].as_str(),
            FilteredStack::Rejected(reason) => {
                drop_sample(&mut report, reason.into());
                continue;
            }
        };

        if !epoch_energy.contains_key(&epoch) {
            drop_sample(&mut report, DropReason::NoEnergy);
            continue;
        }

        *tally.entry((epoch, method, sample.thread_id)).or_insert(0) += 1;
        report.attributed_samples += 1;
    }

    // Collapse threads: epoch -> method -> count
    let mut by_epoch: BTreeMap<u64, BTreeMap<&str, usize>> = BTreeMap::new();
    let mut epoch_threads: BTreeMap<u64, HashSet<u64>> = BTreeMap::new();
    for (&(epoch, method, thread), &count) in &tally {
        *by_epoch.entry(epoch).or_default().entry(method).or_insert(0) += count;
        epoch_threads.entry(epoch).or_default().insert(thread);
    }
    if !epoch_threads.is_empty() {
        let active: usize = epoch_threads.values().map(HashSet::len).sum();
        report.mean_active_threads = active as f64 / epoch_threads.len() as f64;
    }

    for (&epoch, &joules) in &epoch_energy {
        match by_epoch.get(&epoch) {
            Some(methods) => {
                let total: usize = methods.values().sum();
                for (method, count) in methods {
                    let weight = *count as f64 / total as f64;
                    report.records.push(MethodEnergyRecord {
                        epoch,
                        method: method.to_string(),
                        run: run.run,
                        joules: weight * joules,
                    });
                }
            }
            None if joules > 0.0 => {
                report
                    .records
                    .push(placeholder_record(epoch, run.run, joules, attribution));
            }
            None => {}
        }
    }

    debug!(
        "Run {}: {} samples attributed, {} dropped, {} records",
        run.run,
        report.attributed_samples,
        report.dropped_total(),
        report.records.len()
    );

    report.epoch_energy = epoch_energy;
    report
}

fn drop_sample(report: &mut AttributionReport, reason: DropReason) {
    *report.dropped_samples.entry(reason).or_insert(0) += 1;
}

fn placeholder_record(
    epoch: u64,
    run: RunId,
    joules: f64,
    attribution: &AttributionConfig,
) -> MethodEnergyRecord {
    MethodEnergyRecord {
        epoch,
        method: attribution.placeholder.clone(),
        run,
        joules,
    }
}
