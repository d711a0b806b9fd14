//! Ranking stability across accumulated batches.

use crate::parser::schema::{ConvergenceVerdict, MethodEnergyRecord, RunId};
use crate::stats::{correlation_std_error, pearson, rmse, Degeneracy, Metric};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Each method's share of the total energy, summing to 1
///
/// Empty when the records carry no energy.
pub fn method_shares<'a, I>(records: I) -> BTreeMap<&'a str, f64>
where
    I: IntoIterator<Item = &'a MethodEnergyRecord>,
{
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.method.as_str()).or_insert(0.0) += record.joules;
    }

    let total: f64 = totals.values().sum();
    if total <= 0.0 {
        return BTreeMap::new();
    }
    totals.values_mut().for_each(|joules| *joules /= total);
    totals
}

/// Compare the ranking without the newest batch against the ranking with it
///
/// **Public** - main entry point for convergence checking
///
/// Records are partitioned by their `run` field, which holds the batch id.
/// Group 0 holds every batch below the largest id, group 1 holds all
/// batches. With fewer than two batches there is nothing to compare and
/// every metric is undefined.
pub fn check_convergence(benchmark: &str, records: &[MethodEnergyRecord]) -> ConvergenceVerdict {
    let batches: BTreeSet<RunId> = records.iter().map(|r| r.run).collect();
    let methods: BTreeSet<&str> = records.iter().map(|r| r.method.as_str()).collect();

    let mut verdict = ConvergenceVerdict {
        benchmark: benchmark.to_string(),
        batch_count: batches.len(),
        method_count: methods.len(),
        rank_correlation: Metric::Undefined(Degeneracy::TooFewPoints),
        rank_correlation_std: Metric::Undefined(Degeneracy::TooFewPoints),
        rank_rmse: Metric::Undefined(Degeneracy::TooFewPoints),
    };

    let Some(&newest) = batches.last() else {
        return verdict;
    };
    if batches.len() < 2 {
        debug!("{}: single batch, convergence undefined", benchmark);
        return verdict;
    }

    let previous = method_shares(records.iter().filter(|r| r.run < newest));
    let current = method_shares(records);

    let xs: Vec<f64> = methods.iter().map(|&m| share_of(&previous, m)).collect();
    let ys: Vec<f64> = methods.iter().map(|&m| share_of(&current, m)).collect();

    verdict.rank_correlation = pearson(&xs, &ys);
    verdict.rank_correlation_std = correlation_std_error(verdict.rank_correlation, xs.len());
    verdict.rank_rmse = if previous.is_empty() || current.is_empty() {
        Metric::Undefined(Degeneracy::ZeroVariance)
    } else {
        rmse(&xs, &ys)
    };

    debug!(
        "{}: {} batches, {} methods, r = {}, rmse = {}",
        benchmark, verdict.batch_count, verdict.method_count, verdict.rank_correlation, verdict.rank_rmse
    );
    verdict
}

/// Share of a method, 0 when the group never saw it
fn share_of(shares: &BTreeMap<&str, f64>, method: &str) -> f64 {
    shares.get(method).copied().unwrap_or(0.0)
}
