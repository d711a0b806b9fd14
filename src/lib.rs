//! calmcheck
//!
//! Method-level energy attribution and sampling calmness validation for
//! managed-runtime profiles.
//!
//! This crate provides the core implementation for the `calmcheck` CLI
//! tool. It reads the per-run files written by an energy profiler
//! (hardware counters, sampled call stacks, thread manifests, CPU
//! frequencies) and produces:
//!
//! - per-method energy tables for every run of a batch
//! - a calmness verdict per benchmark and sampling rate, plus the
//!   selected rate for each benchmark
//! - a convergence verdict on the stability of method rankings across
//!   batches
//!
//! ## Getting Started
//!
//! ```bash
//! calmcheck run --work-directory ./work --summary
//! calmcheck --help
//! ```

pub mod aggregator;
pub mod calmness;
pub mod commands;
pub mod convergence;
pub mod layout;
pub mod output;
pub mod parser;
pub mod stats;
pub mod utils;
