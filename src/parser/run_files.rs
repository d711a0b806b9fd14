//! Loaders for the files of a single run directory.
//!
//! Required files (timestamps, energy) fail the run when absent; the call
//! stack file and thread manifest are optional and their absence puts the run
//! in degraded mode.

use super::delimited::DelimitedTable;
use super::schema::{
    CallStackSample, EnergyReading, FrequencySample, RunId, ThreadLivenessMap,
};
use crate::layout::RunTree;
use crate::utils::config::{
    CPU_COLUMNS, ENERGY_FILE, EPOCH_COLUMNS, FIELD_DELIMITER, FRAME_SEPARATOR, FREQUENCY_COLUMNS,
    METHOD_FILE, PACKAGE_COLUMNS, DRAM_COLUMNS, SOCKET_COLUMNS, THREAD_COLUMNS, THREAD_FILE,
    TIMESTAMP_COLUMNS, TIMESTAMP_FILE, TRACE_COLUMNS,
};
use crate::utils::error::{AnalysisError, ParseError};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// First and last timestamp of a run, in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSpan {
    pub start_ns: u64,
    pub end_ns: u64,
}

impl RunSpan {
    pub fn duration_ns(&self) -> u64 {
        self.end_ns - self.start_ns
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_ns() as f64 / 1e9
    }
}

/// Everything attribution needs from one run directory
#[derive(Debug, Clone)]
pub struct RunData {
    pub run: RunId,
    pub span: RunSpan,
    pub energy: Vec<EnergyReading>,
    /// `None` when the run has no call stack file
    pub samples: Option<Vec<CallStackSample>>,
    /// `None` when the run has no thread manifest
    pub threads: Option<ThreadLivenessMap>,
}

/// Read the timestamp file: sample index -> nanosecond timestamp
pub fn read_timestamps(path: impl AsRef<Path>) -> Result<RunSpan, ParseError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stamps: BTreeMap<String, u64> = serde_json::from_reader(BufReader::new(file))?;

    let start_ns = stamps.values().copied().min();
    let end_ns = stamps.values().copied().max();
    match (start_ns, end_ns) {
        (Some(start_ns), Some(end_ns)) => Ok(RunSpan { start_ns, end_ns }),
        _ => Err(ParseError::InvalidFormat(format!(
            "{} has no timestamps",
            path.display()
        ))),
    }
}

/// Read raw counter readings (`socket;epoch;package;dram`)
pub fn read_energy(path: impl AsRef<Path>) -> Result<Vec<EnergyReading>, ParseError> {
    let table = DelimitedTable::read(path, FIELD_DELIMITER)?;
    let socket = table.column(SOCKET_COLUMNS)?;
    let epoch = table.column(EPOCH_COLUMNS)?;
    let package = table.column(PACKAGE_COLUMNS)?;
    let dram = table.column(DRAM_COLUMNS)?;

    table
        .rows()
        .iter()
        .map(|row| {
            Ok(EnergyReading {
                socket: row.parse_required(socket, "socket")?,
                epoch: row.parse_required(epoch, "epoch")?,
                package: row.parse_optional(package, "package")?,
                dram: row.parse_optional(dram, "dram")?,
            })
        })
        .collect()
}

/// Read call stack samples (`timestamp;id;trace;epoch`)
///
/// Rows with a negative epoch are collector filler and are skipped.
pub fn read_call_stacks(path: impl AsRef<Path>) -> Result<Vec<CallStackSample>, ParseError> {
    let table = DelimitedTable::read(path, FIELD_DELIMITER)?;
    let timestamp = table.column(TIMESTAMP_COLUMNS)?;
    let thread = table.column(THREAD_COLUMNS)?;
    let trace = table.column(TRACE_COLUMNS)?;
    let epoch = table.optional_column(EPOCH_COLUMNS);

    let mut samples = Vec::with_capacity(table.rows().len());
    let mut filler = 0usize;

    for row in table.rows() {
        if let Some(epoch) = epoch {
            let value: Option<i64> = row.parse_optional(epoch, "epoch")?;
            if value.map_or(false, |e| e < 0) {
                filler += 1;
                continue;
            }
        }

        let frames = row
            .cell(trace)
            .split(FRAME_SEPARATOR)
            .map(str::trim)
            .filter(|frame| !frame.is_empty())
            .map(str::to_string)
            .collect();

        samples.push(CallStackSample {
            timestamp_ns: row.parse_required(timestamp, "timestamp")?,
            thread_id: row.parse_required(thread, "id")?,
            frames,
        });
    }

    if filler > 0 {
        debug!("Skipped {} filler rows with negative epoch", filler);
    }

    Ok(samples)
}

/// Read the thread manifest
pub fn read_thread_manifest(path: impl AsRef<Path>) -> Result<ThreadLivenessMap, ParseError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Read per-core frequencies (`epoch;cpu;freq`), scaled down by `divisor` and truncated
pub fn read_frequencies(
    path: impl AsRef<Path>,
    run: RunId,
    divisor: f64,
) -> Result<Vec<FrequencySample>, ParseError> {
    let table = DelimitedTable::read(path, FIELD_DELIMITER)?;
    let epoch = table.column(EPOCH_COLUMNS)?;
    let cpu = table.column(CPU_COLUMNS)?;
    let frequency = table.column(FREQUENCY_COLUMNS)?;

    let mut samples = Vec::with_capacity(table.rows().len());
    for row in table.rows() {
        // Cores without a reading for an epoch are left out
        let Some(raw) = row.parse_optional::<f64>(frequency, "freq")? else {
            continue;
        };
        samples.push(FrequencySample {
            run,
            cpu: row.parse_required(cpu, "cpu")?,
            epoch: row.parse_required(epoch, "epoch")?,
            frequency: (raw / divisor).trunc(),
        });
    }
    Ok(samples)
}

/// Load one run for attribution
///
/// # Errors
/// * `AnalysisError::MissingInput` - timestamp or energy file absent
/// * `AnalysisError::Malformed` - any present file fails to parse
pub fn load_run(tree: &RunTree, run: RunId) -> Result<RunData, AnalysisError> {
    let time_path = require(tree.file_for(run, TIMESTAMP_FILE))?;
    let energy_path = require(tree.file_for(run, ENERGY_FILE))?;

    let span = read_timestamps(&time_path).map_err(|e| AnalysisError::malformed(&time_path, e))?;
    let energy = read_energy(&energy_path).map_err(|e| AnalysisError::malformed(&energy_path, e))?;

    let method_path = tree.file_for(run, METHOD_FILE);
    let samples = if method_path.is_file() {
        Some(read_call_stacks(&method_path).map_err(|e| AnalysisError::malformed(&method_path, e))?)
    } else {
        warn!(
            "Run {}: no call stack file, attributing to placeholder",
            run
        );
        None
    };

    let thread_path = tree.file_for(run, THREAD_FILE);
    let threads = if thread_path.is_file() {
        Some(
            read_thread_manifest(&thread_path)
                .map_err(|e| AnalysisError::malformed(&thread_path, e))?,
        )
    } else {
        None
    };

    debug!(
        "Run {}: {} energy rows, {} samples, duration {:.3}s",
        run,
        energy.len(),
        samples.as_ref().map_or(0, Vec::len),
        span.duration_secs()
    );

    Ok(RunData {
        run,
        span,
        energy,
        samples,
        threads,
    })
}

/// Fail with `MissingInput` unless the file exists
pub fn require(path: PathBuf) -> Result<PathBuf, AnalysisError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(AnalysisError::MissingInput(path))
    }
}
