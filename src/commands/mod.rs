//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod attribute;
pub mod calmness;
pub mod convergence;
pub mod models;
pub mod run;
pub mod utils;

// Re-export main command functions
pub use attribute::{attribute_batch, execute_attribute, BatchOutcome};
pub use calmness::{check_calmness, execute_calmness};
pub use convergence::{check_convergence, execute_convergence};
pub use models::{AttributeArgs, WorkArgs};
pub use run::{execute_run, run_pipeline, RunOutcome};
pub use utils::{display_version, validate_report_file};
