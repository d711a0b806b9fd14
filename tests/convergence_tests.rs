mod common;

use calmcheck::commands::check_convergence;
use calmcheck::convergence::{evaluate_benchmark, load_batches};
use calmcheck::layout::WorkLayout;
use calmcheck::stats::{Degeneracy, Metric};
use pretty_assertions::assert_eq;
use std::path::Path;

fn write_summary(work: &Path, benchmark: &str, batch: u32, rows: &[(&str, f64)]) {
    let mut content = String::from("method,energy,share\n");
    for (method, joules) in rows {
        content.push_str(&format!("{},{},0\n", method, joules));
    }
    common::write(
        &work
            .join("profiling")
            .join(benchmark)
            .join(batch.to_string())
            .join("summary/method.csv"),
        &content,
    );
}

#[test]
fn test_load_batches_tags_records() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_summary(temp_dir.path(), "fop", 0, &[("a.A.a", 2.0), ("b.B.b", 1.0)]);
    write_summary(temp_dir.path(), "fop", 1, &[("a.A.a", 4.0)]);
    // Batch without a summary is left out
    std::fs::create_dir_all(temp_dir.path().join("profiling/fop/2/raw")).unwrap();

    let records = load_batches(&WorkLayout::new(temp_dir.path()), "fop").unwrap();

    let tagged: Vec<(u32, &str, f64)> = records
        .iter()
        .map(|r| (r.run, r.method.as_str(), r.joules))
        .collect();
    assert_eq!(
        tagged,
        vec![(0, "a.A.a", 2.0), (0, "b.B.b", 1.0), (1, "a.A.a", 4.0)]
    );
    assert!(records.iter().all(|r| r.epoch == 0));
}

#[test]
fn test_stable_batches_converge() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rows = [("a.A.a", 6.0), ("b.B.b", 3.0), ("c.C.c", 1.0)];
    for batch in 0..3 {
        write_summary(temp_dir.path(), "fop", batch, &rows);
    }

    let verdict = evaluate_benchmark(&WorkLayout::new(temp_dir.path()), "fop").unwrap();

    assert_eq!(verdict.batch_count, 3);
    assert_eq!(verdict.method_count, 3);
    assert!(verdict.rank_correlation.exceeds(0.999));
    assert!(verdict.rank_rmse.value().unwrap() < 1e-12);
}

#[test]
fn test_single_batch_is_undefined() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_summary(temp_dir.path(), "fop", 0, &[("a.A.a", 1.0), ("b.B.b", 2.0)]);

    let verdict = evaluate_benchmark(&WorkLayout::new(temp_dir.path()), "fop").unwrap();

    assert_eq!(verdict.batch_count, 1);
    assert_eq!(
        verdict.rank_correlation,
        Metric::Undefined(Degeneracy::TooFewPoints)
    );
}

#[test]
fn test_check_convergence_writes_report() {
    let temp_dir = tempfile::tempdir().unwrap();
    let work = temp_dir.path();
    write_summary(work, "fop", 0, &[("a.A.a", 6.0), ("b.B.b", 3.0), ("c.C.c", 1.0)]);
    write_summary(work, "fop", 1, &[("a.A.a", 1.0), ("b.B.b", 3.0), ("c.C.c", 6.0)]);
    write_summary(work, "h2", 0, &[("x.X.x", 1.0)]);

    let report = check_convergence(&WorkLayout::new(work)).unwrap();

    let benchmarks: Vec<&str> = report.verdicts.iter().map(|v| v.benchmark.as_str()).collect();
    assert_eq!(benchmarks, vec!["fop", "h2"]);
    assert!(report.skipped.is_empty());

    // Adding the reversed batch flattens the ranking but keeps its direction
    let fop = &report.verdicts[0];
    assert!(fop.rank_correlation.exceeds(0.0));
    assert!(fop.rank_rmse.value().unwrap() > 0.0);

    assert!(work.join("summary/convergence.json").is_file());
}
