mod common;

use calmcheck::calmness::evaluate_benchmark;
use calmcheck::commands::check_calmness;
use calmcheck::layout::WorkLayout;
use calmcheck::output::{read_rate_manifest, read_report};
use calmcheck::parser::schema::CalmnessReport;
use calmcheck::stats::Metric;
use calmcheck::utils::config::AnalysisConfig;
use calmcheck::utils::error::AnalysisError;
use pretty_assertions::assert_eq;
use std::fs;

const ONE_SECOND: u64 = 1_000_000_000;

#[test]
fn test_identical_rate_is_calm() {
    let temp_dir = tempfile::tempdir().unwrap();
    common::write_reference_runs(temp_dir.path(), "fop");
    common::write_profiled_runs(temp_dir.path(), "fop", 1, ONE_SECOND);

    let layout = WorkLayout::new(temp_dir.path());
    let verdicts = evaluate_benchmark(&layout, "fop", &AnalysisConfig::default()).unwrap();

    assert_eq!(verdicts.len(), 1);
    let verdict = &verdicts[0];
    assert_eq!(verdict.sampling_rate, 1);
    assert_eq!(verdict.runtime_deviation, Metric::Value(0.0));
    assert!(verdict.temporal_correlation.exceeds(0.999));
    assert!(verdict.spatial_correlation.exceeds(0.999));
    assert!(verdict.is_calm);
}

#[test]
fn test_slow_rate_is_not_calm() {
    let temp_dir = tempfile::tempdir().unwrap();
    common::write_reference_runs(temp_dir.path(), "fop");
    common::write_profiled_runs(temp_dir.path(), "fop", 5, 2 * ONE_SECOND);

    let layout = WorkLayout::new(temp_dir.path());
    let verdicts = evaluate_benchmark(&layout, "fop", &AnalysisConfig::default()).unwrap();

    assert_eq!(verdicts[0].runtime_deviation, Metric::Value(1.0));
    assert!(!verdicts[0].is_calm);
}

#[test]
fn test_rate_without_files_is_skipped() {
    let temp_dir = tempfile::tempdir().unwrap();
    common::write_reference_runs(temp_dir.path(), "fop");
    common::write_profiled_runs(temp_dir.path(), "fop", 1, ONE_SECOND);
    fs::create_dir_all(temp_dir.path().join("calmness/profile/fop/20/raw/0")).unwrap();

    let layout = WorkLayout::new(temp_dir.path());
    let verdicts = evaluate_benchmark(&layout, "fop", &AnalysisConfig::default()).unwrap();

    let rates: Vec<u32> = verdicts.iter().map(|v| v.sampling_rate).collect();
    assert_eq!(rates, vec![1]);
}

#[test]
fn test_missing_profile_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    common::write_reference_runs(temp_dir.path(), "fop");

    let layout = WorkLayout::new(temp_dir.path());
    let err = evaluate_benchmark(&layout, "fop", &AnalysisConfig::default()).unwrap_err();

    assert!(matches!(err, AnalysisError::MissingInput(_)));
}

#[test]
fn test_check_calmness_writes_outputs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let work = temp_dir.path();

    // fop: calm at 1ms, perturbed at 5ms
    common::write_reference_runs(work, "fop");
    common::write_profiled_runs(work, "fop", 1, ONE_SECOND);
    common::write_profiled_runs(work, "fop", 5, 2 * ONE_SECOND);

    // h2: never calm
    common::write_reference_runs(work, "h2");
    common::write_profiled_runs(work, "h2", 4, 2 * ONE_SECOND);
    common::write_profiled_runs(work, "h2", 2, 2 * ONE_SECOND);

    // pmd: no profiled runs at all
    common::write_reference_runs(work, "pmd");

    let mut config = AnalysisConfig::default();
    config
        .benchmark_sizes
        .insert("h2".to_string(), "large".to_string());

    let report = check_calmness(&WorkLayout::new(work), &config).unwrap();

    let verdicts: Vec<(&str, u32, bool)> = report
        .verdicts
        .iter()
        .map(|v| (v.benchmark.as_str(), v.sampling_rate, v.is_calm))
        .collect();
    assert_eq!(
        verdicts,
        vec![
            ("fop", 1, true),
            ("fop", 5, false),
            ("h2", 2, false),
            ("h2", 4, false),
        ]
    );

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].benchmark, "pmd");

    let manifest = fs::read_to_string(work.join("summary/calm-rates.txt")).unwrap();
    assert_eq!(manifest, "fop default 1\nh2 large 2\n");
    assert!(report.selections.iter().any(|s| s.benchmark == "h2" && s.degraded));

    let selections = read_rate_manifest(work.join("summary/calm-rates.txt")).unwrap();
    assert_eq!(selections.len(), 2);
    assert_eq!(selections[1].rate_ms, 2);

    let table = fs::read_to_string(work.join("summary/calmness.csv")).unwrap();
    assert!(table.starts_with("benchmark,rate,runtime,"));
    assert_eq!(table.lines().count(), 5);

    let written: CalmnessReport = read_report(work.join("summary/calmness.json")).unwrap();
    assert_eq!(written.verdicts.len(), 4);
    assert_eq!(written.selections, report.selections);
}
