//! CSV tables and the rate manifest.
//!
//! Tables are comma-separated with a header row and go through `csv`, so
//! anything we write reads back with the same quoting rules.

use super::prepare_output_path;
use crate::aggregator::summary::{ComponentTotal, MethodTotal, RuntimeSummary};
use crate::parser::delimited::DelimitedTable;
use crate::parser::schema::{CalmnessVerdict, MethodEnergyRecord, RateSelection};
use crate::utils::config::{ENERGY_COLUMNS, METHOD_COLUMNS, OUTPUT_DELIMITER, TRACE_JOINER};
use crate::utils::error::{OutputError, ParseError};
use csv::WriterBuilder;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Write header and rows as a CSV table
///
/// Fields holding the delimiter, a quote or a newline are quoted.
fn write_table<I>(path: &Path, header: &[&str], rows: I) -> Result<(), OutputError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    prepare_output_path(path)?;
    let mut writer = WriterBuilder::new()
        .delimiter(OUTPUT_DELIMITER)
        .from_path(path)?;

    writer.write_record(header)?;
    let mut count = 0;
    for row in rows {
        writer.write_record(&row)?;
        count += 1;
    }
    writer.flush()?;

    debug!("Wrote {} rows to {}", count, path.display());
    Ok(())
}

fn write_text(path: &Path, content: &str) -> Result<(), OutputError> {
    prepare_output_path(path)?;
    fs::write(path, content)?;
    debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}

/// Per-run attribution: `epoch,method,energy`
pub fn write_method_records(
    path: impl AsRef<Path>,
    records: &[MethodEnergyRecord],
) -> Result<(), OutputError> {
    let rows = records.iter().map(|r| {
        vec![r.epoch.to_string(), r.method.clone(), r.joules.to_string()]
    });
    write_table(path.as_ref(), &["epoch", "method", "energy"], rows)
}

/// Per-run corrected energy: `epoch,energy`
pub fn write_epoch_energy(
    path: impl AsRef<Path>,
    epoch_energy: &BTreeMap<u64, f64>,
) -> Result<(), OutputError> {
    let rows = epoch_energy
        .iter()
        .map(|(epoch, joules)| vec![epoch.to_string(), joules.to_string()]);
    write_table(path.as_ref(), &["epoch", "energy"], rows)
}

/// Batch method ranking: `method,energy,share`
pub fn write_method_summary(
    path: impl AsRef<Path>,
    methods: &[MethodTotal],
) -> Result<(), OutputError> {
    let rows = methods.iter().map(|m| {
        vec![m.method.clone(), m.joules.to_string(), m.share.to_string()]
    });
    write_table(path.as_ref(), &["method", "energy", "share"], rows)
}

/// Batch component totals: `socket,package,dram`
pub fn write_component_summary(
    path: impl AsRef<Path>,
    components: &[ComponentTotal],
) -> Result<(), OutputError> {
    let rows = components.iter().map(|c| {
        vec![
            c.socket.to_string(),
            c.package_joules.to_string(),
            c.dram_joules.to_string(),
        ]
    });
    write_table(path.as_ref(), &["socket", "package", "dram"], rows)
}

/// Batch runtime: `runs,runtime,runtime_std,active_threads`
pub fn write_runtime_summary(
    path: impl AsRef<Path>,
    runtime: &RuntimeSummary,
) -> Result<(), OutputError> {
    let row = vec![
        runtime.runs.to_string(),
        runtime.mean_secs.to_string(),
        runtime.std_secs.to_string(),
        runtime.mean_active_threads.to_string(),
    ];
    write_table(
        path.as_ref(),
        &["runs", "runtime", "runtime_std", "active_threads"],
        [row],
    )
}

/// Read a method summary back as method -> energy
///
/// The method is the first `;`-separated element of the method column, so
/// summaries that list whole traces reduce to their innermost frame. Rows
/// reducing to the same method are summed.
///
/// Summaries written by `attribute` hold innermost frames only; the split
/// matters for summaries produced by older tooling.
pub fn read_method_summary(path: impl AsRef<Path>) -> Result<BTreeMap<String, f64>, ParseError> {
    let table = DelimitedTable::read(path, OUTPUT_DELIMITER)?;
    let method = table.column(METHOD_COLUMNS)?;
    let energy = table.column(ENERGY_COLUMNS)?;

    let mut totals = BTreeMap::new();
    for row in table.rows() {
        let name = row
            .cell(method)
            .split(TRACE_JOINER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        let joules: f64 = row.parse_optional(energy, "energy")?.unwrap_or(0.0);
        *totals.entry(name).or_insert(0.0) += joules;
    }
    Ok(totals)
}

/// Calmness verdicts, one row per (benchmark, rate)
///
/// Undefined metrics are written as `NaN`.
pub fn write_calmness_table(
    path: impl AsRef<Path>,
    verdicts: &[CalmnessVerdict],
) -> Result<(), OutputError> {
    let header = [
        "benchmark",
        "rate",
        "runtime",
        "runtime_std",
        "temporal",
        "temporal_err",
        "temporal_rms",
        "spatial",
        "spatial_err",
        "spatial_rms",
        "calm",
    ];
    let rows = verdicts.iter().map(|v| {
        vec![
            v.benchmark.clone(),
            v.sampling_rate.to_string(),
            v.runtime_deviation.to_cell(),
            v.runtime_deviation_std.to_cell(),
            v.temporal_correlation.to_cell(),
            v.temporal_correlation_err.to_cell(),
            v.temporal_rms.to_cell(),
            v.spatial_correlation.to_cell(),
            v.spatial_correlation_err.to_cell(),
            v.spatial_rms.to_cell(),
            v.is_calm.to_string(),
        ]
    });
    write_table(path.as_ref(), &header, rows)
}

/// Rate manifest: `<benchmark> <size> <rate-ms>` per line
pub fn write_rate_manifest(
    path: impl AsRef<Path>,
    selections: &[RateSelection],
) -> Result<(), OutputError> {
    let content: String = selections
        .iter()
        .map(|s| format!("{} {} {}\n", s.benchmark, s.size, s.rate_ms))
        .collect();
    write_text(path.as_ref(), &content)
}

/// Read a rate manifest
///
/// The manifest does not record whether a selection was degraded, so every
/// entry comes back with `degraded == false`.
pub fn read_rate_manifest(path: impl AsRef<Path>) -> Result<Vec<RateSelection>, ParseError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [benchmark, size, rate] = fields[..] else {
                return Err(ParseError::RowWidth {
                    line: index + 1,
                    expected: 3,
                    found: fields.len(),
                });
            };
            let rate_ms = rate.parse().map_err(|_| ParseError::InvalidValue {
                line: index + 1,
                column: "rate".to_string(),
                value: rate.to_string(),
            })?;
            Ok(RateSelection {
                benchmark: benchmark.to_string(),
                size: size.to_string(),
                rate_ms,
                degraded: false,
            })
        })
        .collect()
}
