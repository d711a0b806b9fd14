//! Turning raw run files into per-method energy.
//!
//! This module handles:
//! - Correcting wrapping energy counters into per-epoch deltas
//! - Reducing call stacks to the innermost application frame
//! - Splitting each epoch's energy across the sampled methods
//! - Batch-level method, component and runtime summaries

pub mod attribution;
pub mod counter;
pub mod stack_filter;
pub mod summary;

// Re-export main types and functions
pub use attribution::{attribute_run, AttributionReport, DropReason};
pub use counter::{correct_wraparound, normalize_counters, CounterAnomaly, NormalizedEnergy};
pub use stack_filter::{FilteredStack, Rejection, StackFilter};
pub use summary::{
    calculate_energy_distribution, summarize_components, summarize_methods, summarize_runtime,
    ComponentTotal, EnergyDistribution, MethodTotal, RuntimeSummary,
};
