//! Batch-level summaries of attributed energy.
//!
//! A batch is summarised over its steady-state runs: total energy per method
//! (the ranking the convergence checker compares across batches), corrected
//! package/dram energy per socket, and how concentrated the energy is.

use super::attribution::AttributionReport;
use crate::parser::schema::MethodEnergyRecord;
use crate::stats::SampleSummary;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total energy charged to one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodTotal {
    pub method: String,
    pub joules: f64,
    /// Share of the batch total, in [0, 1]
    pub share: f64,
}

/// Corrected energy for one socket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentTotal {
    pub socket: u32,
    pub package_joules: f64,
    pub dram_joules: f64,
}

/// Sum attributed energy per method, sorted by energy (descending)
///
/// **Public** - produces the method ranking
///
/// Ties are broken by method name so the order is deterministic.
pub fn summarize_methods<'a, I>(records: I) -> Vec<MethodTotal>
where
    I: IntoIterator<Item = &'a MethodEnergyRecord>,
{
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.method.as_str()).or_insert(0.0) += record.joules;
    }

    let grand_total: f64 = totals.values().sum();
    let mut methods: Vec<MethodTotal> = totals
        .into_iter()
        .map(|(method, joules)| MethodTotal {
            method: method.to_string(),
            joules,
            share: if grand_total > 0.0 {
                joules / grand_total
            } else {
                0.0
            },
        })
        .collect();

    methods.sort_by(|a, b| {
        b.joules
            .total_cmp(&a.joules)
            .then_with(|| a.method.cmp(&b.method))
    });

    debug!("Summarized {} methods", methods.len());
    methods
}

/// Sum corrected package and dram energy per socket over several runs
pub fn summarize_components(reports: &[AttributionReport]) -> Vec<ComponentTotal> {
    let mut totals: BTreeMap<u32, (f64, f64)> = BTreeMap::new();
    for report in reports {
        for (&socket, &(package, dram)) in &report.socket_energy {
            let entry = totals.entry(socket).or_insert((0.0, 0.0));
            entry.0 += package;
            entry.1 += dram;
        }
    }

    totals
        .into_iter()
        .map(|(socket, (package_joules, dram_joules))| ComponentTotal {
            socket,
            package_joules,
            dram_joules,
        })
        .collect()
}

/// Run length and thread activity of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSummary {
    pub runs: usize,
    pub mean_secs: f64,
    /// Population standard deviation of the run lengths
    pub std_secs: f64,
    /// Averaged over runs that had call stacks; 0 when none did
    pub mean_active_threads: f64,
}

/// Summarise run durations and active threads over several runs
pub fn summarize_runtime(reports: &[AttributionReport]) -> RuntimeSummary {
    let durations: Vec<f64> = reports.iter().map(|r| r.duration_secs).collect();
    let threads: Vec<f64> = reports
        .iter()
        .filter(|r| !r.degraded)
        .map(|r| r.mean_active_threads)
        .collect();

    let runtime = SampleSummary::from_sample(&durations);
    let active = SampleSummary::from_sample(&threads);

    RuntimeSummary {
        runs: reports.len(),
        mean_secs: runtime.map_or(0.0, |s| s.mean),
        std_secs: runtime.map_or(0.0, |s| s.std),
        mean_active_threads: active.map_or(0.0, |s| s.mean),
    }
}

/// Energy concentration statistics
///
/// **Public** - returned from calculate_energy_distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyDistribution {
    /// Total attributed energy
    pub total_joules: f64,

    /// Number of distinct methods (placeholder included)
    pub method_count: usize,

    /// Share of the total that went to the placeholder
    pub placeholder_share: f64,

    /// Share held by the top 10% of methods
    pub top_10_percent_share: f64,
}

impl EnergyDistribution {
    /// Check if energy is highly concentrated
    ///
    /// Returns true if the top 10% of methods hold more than 80% of the energy
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_share > 0.8
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.3} J | Methods: {} | Unattributed: {:.1}% | Top 10%: {:.1}%",
            self.total_joules,
            self.method_count,
            self.placeholder_share * 100.0,
            self.top_10_percent_share * 100.0
        )
    }
}

/// Concentration statistics for a method ranking
///
/// # Arguments
/// * `methods` - Output of `summarize_methods` (sorted descending)
/// * `placeholder` - Identifier of unattributed energy
pub fn calculate_energy_distribution(
    methods: &[MethodTotal],
    placeholder: &str,
) -> EnergyDistribution {
    if methods.is_empty() {
        return EnergyDistribution::default();
    }

    let total_joules: f64 = methods.iter().map(|m| m.joules).sum();
    let share = |joules: f64| {
        if total_joules > 0.0 {
            joules / total_joules
        } else {
            0.0
        }
    };

    let top_count = (methods.len() as f64 * 0.1).ceil() as usize;
    let top_joules: f64 = methods.iter().take(top_count).map(|m| m.joules).sum();
    let placeholder_joules: f64 = methods
        .iter()
        .filter(|m| m.method == placeholder)
        .map(|m| m.joules)
        .sum();

    EnergyDistribution {
        total_joules,
        method_count: methods.len(),
        placeholder_share: share(placeholder_joules),
        top_10_percent_share: share(top_joules),
    }
}
