//! Raw input parsing and schema definitions.
//!
//! This module handles:
//! - Reading `;`-delimited collector tables
//! - Loading per-run timestamp, energy, call stack, thread and frequency files
//! - Defining the data model and report schema

pub mod delimited;
pub mod run_files;
pub mod schema;

// Re-export main types
pub use run_files::{load_run, read_frequencies, read_timestamps, RunData, RunSpan};
pub use schema::{
    CalmnessReport, CalmnessVerdict, CallStackSample, ConvergenceReport, ConvergenceVerdict,
    EnergyDelta, EnergyReading, FrequencySample, MethodEnergyRecord, RateSelection, RunId,
    SkippedBenchmark, ThreadLiveness, ThreadLivenessMap,
};
