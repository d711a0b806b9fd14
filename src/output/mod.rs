//! Output writers for reports and tables.
//!
//! This module handles writing data to disk in various formats:
//! - JSON reports (calmness, convergence)
//! - CSV tables (per-run attribution, batch summaries, calmness verdicts)
//! - The plain-text rate manifest
//! - Coloured terminal summaries

pub mod json;
pub mod table;
pub mod terminal;

// Re-export main functions
pub use json::{read_report, write_report};
pub use terminal::{render_batch_summary, render_calmness_summary, render_convergence_summary};
pub use table::{
    read_method_summary, read_rate_manifest, write_calmness_table, write_component_summary,
    write_epoch_energy, write_method_records, write_method_summary, write_rate_manifest,
    write_runtime_summary,
};

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Validate that an output path is writable and create its parent directories
///
/// # Errors
/// * `OutputError::InvalidPath` - path is empty, is a directory, or its parent cannot be created
pub fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
