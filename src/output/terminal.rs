//! Terminal rendering of reports.
//!
//! Human-readable summaries with colour cues for calm and not-calm
//! verdicts, degraded selections and undefined metrics.

use crate::aggregator::summary::{EnergyDistribution, MethodTotal};
use crate::parser::schema::{CalmnessReport, ConvergenceReport, SkippedBenchmark};
use crate::stats::Metric;
use colored::*;

const RULE: &str = "---------------------------------------------------\n";

/// Render a calmness report
pub fn render_calmness_summary(report: &CalmnessReport) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&"Calmness Summary".bold().to_string());
    out.push('\n');
    out.push_str(RULE);

    for verdict in &report.verdicts {
        let status = if verdict.is_calm {
            "calm".green()
        } else {
            "not calm".red()
        };
        out.push_str(&format!(
            "{:<12} {:>5}ms  runtime {:>10}  temporal {:>10}  spatial {:>10}  {}\n",
            verdict.benchmark,
            verdict.sampling_rate,
            render_metric(&verdict.runtime_deviation),
            render_metric(&verdict.temporal_correlation),
            render_metric(&verdict.spatial_correlation),
            status
        ));
    }

    if !report.selections.is_empty() {
        out.push_str("\nSelected rates:\n");
        for selection in &report.selections {
            let line = format!(
                "  {} ({}): {}ms",
                selection.benchmark, selection.size, selection.rate_ms
            );
            if selection.degraded {
                out.push_str(&format!("{} {}\n", line.yellow(), "(no calm rate)".yellow()));
            } else {
                out.push_str(&format!("{}\n", line));
            }
        }
    }

    out.push_str(&render_skipped(&report.skipped));
    out
}

/// Render a convergence report
pub fn render_convergence_summary(report: &ConvergenceReport) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&"Convergence Summary".bold().to_string());
    out.push('\n');
    out.push_str(RULE);

    for verdict in &report.verdicts {
        out.push_str(&format!(
            "{:<12} batches {:>3}  methods {:>5}  r {:>10} ± {:<10}  rmse {}\n",
            verdict.benchmark,
            verdict.batch_count,
            verdict.method_count,
            render_metric(&verdict.rank_correlation),
            render_metric(&verdict.rank_correlation_std),
            render_metric(&verdict.rank_rmse)
        ));
    }

    out.push_str(&render_skipped(&report.skipped));
    out
}

/// Render the top of a batch's method ranking
pub fn render_batch_summary(
    methods: &[MethodTotal],
    distribution: &EnergyDistribution,
    top_n: usize,
) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&"Method Energy".bold().to_string());
    out.push('\n');
    out.push_str(RULE);
    out.push_str(&format!("{}\n\n", distribution.summary()));

    for (i, method) in methods.iter().take(top_n).enumerate() {
        out.push_str(&format!(
            "{:>3}. {:>10.3} J ({:>5.1}%)  {}\n",
            i + 1,
            method.joules,
            method.share * 100.0,
            method.method
        ));
    }
    out
}

fn render_metric(metric: &Metric) -> String {
    match metric {
        Metric::Value(v) => format!("{:.4}", v),
        Metric::Undefined(_) => "undefined".dimmed().to_string(),
    }
}

fn render_skipped(skipped: &[SkippedBenchmark]) -> String {
    if skipped.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nSkipped:\n");
    for entry in skipped {
        out.push_str(&format!("  {} {}: {}\n", "!".yellow(), entry.benchmark, entry.reason));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::RateSelection;

    #[test]
    fn test_calmness_summary_mentions_selection() {
        colored::control::set_override(false);
        let report = CalmnessReport {
            version: "1.0.0".to_string(),
            verdicts: vec![],
            selections: vec![RateSelection {
                benchmark: "h2".to_string(),
                size: "large".to_string(),
                rate_ms: 4,
                degraded: true,
            }],
            skipped: vec![SkippedBenchmark {
                benchmark: "pmd".to_string(),
                reason: "Required input missing".to_string(),
            }],
            generated_at: String::new(),
        };

        let text = render_calmness_summary(&report);
        assert!(text.contains("h2 (large): 4ms"));
        assert!(text.contains("(no calm rate)"));
        assert!(text.contains("pmd: Required input missing"));
    }
}
