//! Wrapping energy counter correction.
//!
//! RAPL registers are fixed width and wrap. Consecutive readings are
//! differenced per socket; a negative difference is assumed to be a single
//! wrap and corrected by adding the register modulus. More than one wrap
//! between two readings cannot be detected.

use crate::parser::schema::{EnergyDelta, EnergyReading};
use crate::utils::config::CounterConfig;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which counter of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterDomain {
    Package,
    Dram,
}

/// A delta that stayed negative after correction and was floored to 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterAnomaly {
    pub socket: u32,
    pub epoch: u64,
    pub domain: CounterDomain,
    pub raw_delta: f64,
}

/// Corrected deltas plus any data-quality anomalies
#[derive(Debug, Clone, Default)]
pub struct NormalizedEnergy {
    /// One delta per input reading, ordered by (socket, epoch)
    pub deltas: Vec<EnergyDelta>,
    pub anomalies: Vec<CounterAnomaly>,
}

impl NormalizedEnergy {
    /// Total energy per epoch, summed over sockets and domains
    pub fn epoch_totals(&self) -> BTreeMap<u64, f64> {
        let mut totals = BTreeMap::new();
        for delta in &self.deltas {
            *totals.entry(delta.epoch).or_insert(0.0) += delta.total();
        }
        totals
    }

    /// Package and dram totals per socket
    pub fn socket_totals(&self) -> BTreeMap<u32, (f64, f64)> {
        let mut totals = BTreeMap::new();
        for delta in &self.deltas {
            let entry = totals.entry(delta.socket).or_insert((0.0, 0.0));
            entry.0 += delta.package_joules;
            entry.1 += delta.dram_joules;
        }
        totals
    }
}

/// Correct one raw difference
///
/// Returns the corrected value and whether it had to be floored.
pub fn correct_wraparound(delta: f64, wraparound: f64) -> (f64, bool) {
    if delta >= 0.0 {
        return (delta, false);
    }
    let corrected = delta + wraparound;
    if corrected >= 0.0 {
        (corrected, false)
    } else {
        (0.0, true)
    }
}

/// Turn cumulative readings into per-epoch deltas
///
/// Readings are grouped by socket and ordered by epoch. The first reading of
/// each socket has no predecessor and gets a delta of 0. A missing value on
/// either side of a difference yields 0.
pub fn normalize_counters(readings: &[EnergyReading], config: &CounterConfig) -> NormalizedEnergy {
    let mut by_socket: BTreeMap<u32, Vec<&EnergyReading>> = BTreeMap::new();
    for reading in readings {
        by_socket.entry(reading.socket).or_default().push(reading);
    }

    let mut result = NormalizedEnergy::default();

    for (socket, mut series) in by_socket {
        series.sort_by_key(|r| r.epoch);

        let mut previous: Option<&EnergyReading> = None;
        for reading in series {
            let (package_joules, dram_joules) = match previous {
                None => (0.0, 0.0),
                Some(prev) => {
                    let package = corrected_difference(
                        prev.package,
                        reading.package,
                        config.wraparound,
                    );
                    let dram = corrected_difference(prev.dram, reading.dram, config.wraparound);

                    for (domain, outcome) in
                        [(CounterDomain::Package, package), (CounterDomain::Dram, dram)]
                    {
                        if let Some(raw_delta) = outcome.1 {
                            result.anomalies.push(CounterAnomaly {
                                socket,
                                epoch: reading.epoch,
                                domain,
                                raw_delta,
                            });
                        }
                    }

                    (package.0, dram.0)
                }
            };

            result.deltas.push(EnergyDelta {
                socket,
                epoch: reading.epoch,
                package_joules,
                dram_joules,
            });
            previous = Some(reading);
        }
    }

    if !result.anomalies.is_empty() {
        warn!(
            "{} counter deltas stayed negative after wraparound correction (floored to 0)",
            result.anomalies.len()
        );
    }
    debug!("Normalized {} counter readings", result.deltas.len());

    result
}

/// Corrected difference and, when floored, the raw difference
fn corrected_difference(previous: Option<f64>, current: Option<f64>, wraparound: f64) -> (f64, Option<f64>) {
    match (previous, current) {
        (Some(prev), Some(cur)) => {
            let raw = cur - prev;
            let (value, floored) = correct_wraparound(raw, wraparound);
            (value, floored.then_some(raw))
        }
        _ => (0.0, None),
    }
}
