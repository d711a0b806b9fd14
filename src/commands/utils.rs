use crate::output::read_report;
use crate::parser::schema::CalmnessReport;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a calmness report JSON file and print its summary
pub fn validate_report_file(file_path: &Path) -> Result<CalmnessReport> {
    println!("Validating report: {}", file_path.display());

    let report: CalmnessReport = read_report(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    println!("✓ Valid calmness report");
    println!("  Version: {}", report.version);
    println!("  Generated: {}", report.generated_at);
    println!(
        "  Verdicts: {} ({} calm)",
        report.verdicts.len(),
        report.verdicts.iter().filter(|v| v.is_calm).count()
    );
    println!(
        "  Selections: {} ({} degraded)",
        report.selections.len(),
        report.selections.iter().filter(|s| s.degraded).count()
    );
    println!("  Skipped benchmarks: {}", report.skipped.len());

    Ok(report)
}

/// Display version information
pub fn display_version() {
    println!("calmcheck v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Method-level energy attribution and sampling calmness validation.");
}
