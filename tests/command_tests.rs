mod common;

use calmcheck::commands::{
    execute_attribute, execute_run, validate_report_file, AttributeArgs, WorkArgs,
};
use calmcheck::output::read_method_summary;
use pretty_assertions::assert_eq;
use std::fs;

const ONE_SECOND: u64 = 1_000_000_000;

#[test]
fn test_attribute_command_writes_tables() {
    let temp_dir = tempfile::tempdir().unwrap();
    let batch = temp_dir.path();
    common::write_batch(batch, 2);

    let outcome = execute_attribute(AttributeArgs {
        dir: batch.to_path_buf(),
        ..Default::default()
    })
    .unwrap();

    // Run 0 is warm-up
    assert_eq!(outcome.runs_attributed, 1);
    assert_eq!(outcome.runs_skipped, 0);
    assert_eq!(outcome.degraded_runs, 0);
    assert!(batch.join("processed/method/1.csv").is_file());
    assert!(batch.join("processed/energy/1.csv").is_file());
    assert!(!batch.join("processed/method/0.csv").exists());

    let energy = fs::read_to_string(batch.join("processed/energy/1.csv")).unwrap();
    assert_eq!(energy, "epoch,energy\n0,0\n1,3\n2,3\n3,3\n4,3\n");

    let totals = read_method_summary(batch.join("summary/method.csv")).unwrap();
    assert_eq!(totals["<unattributed>"], 6.0);
    assert_eq!(totals["com.app.Store.flush"], 3.75);
    assert_eq!(totals["com.app.Worker.compute"], 2.25);

    let components = fs::read_to_string(batch.join("summary/component.csv")).unwrap();
    assert_eq!(components, "socket,package,dram\n0,8,4\n");
}

#[test]
fn test_attribute_writes_runtime_summary() {
    let temp_dir = tempfile::tempdir().unwrap();
    let batch = temp_dir.path();
    common::write_batch(batch, 3);
    common::write_timestamps(&batch.join("raw/1"), ONE_SECOND / 2);
    common::write_timestamps(&batch.join("raw/2"), 3 * ONE_SECOND / 2);

    let outcome = execute_attribute(AttributeArgs {
        dir: batch.to_path_buf(),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(outcome.runtime.runs, 2);
    assert_eq!(outcome.runtime.mean_active_threads, 2.5);

    let runtime = fs::read_to_string(batch.join("summary/runtime.csv")).unwrap();
    assert_eq!(
        runtime,
        "runs,runtime,runtime_std,active_threads\n2,1,0.5,2.5\n"
    );
}

#[test]
fn test_attribute_drops_warmup_runs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let batch = temp_dir.path();
    common::write_batch(batch, 10);

    let outcome = execute_attribute(AttributeArgs {
        dir: batch.to_path_buf(),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(outcome.runs_attributed, 8);
    for run in 0..2 {
        assert!(!batch.join(format!("processed/method/{}.csv", run)).exists());
    }
    for run in 2..10 {
        assert!(batch.join(format!("processed/method/{}.csv", run)).is_file());
    }
}

#[test]
fn test_attribute_skips_broken_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let batch = temp_dir.path();
    common::write_batch(batch, 3);
    fs::remove_file(batch.join("raw/2/energy.csv")).unwrap();

    let outcome = execute_attribute(AttributeArgs {
        dir: batch.to_path_buf(),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(outcome.runs_attributed, 1);
    assert_eq!(outcome.runs_skipped, 1);
}

#[test]
fn test_attribute_reads_config_from_batch() {
    let temp_dir = tempfile::tempdir().unwrap();
    let batch = temp_dir.path();
    common::write_batch(batch, 2);
    common::write(
        &batch.join("analysis.toml"),
        "[attribution]\nplaceholder = \"<idle>\"\n",
    );

    let outcome = execute_attribute(AttributeArgs {
        dir: batch.to_path_buf(),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(outcome.methods[0].method, "<idle>");
    assert_eq!(outcome.distribution.placeholder_share, 0.5);
}

#[test]
fn test_run_requires_input_trees() {
    let temp_dir = tempfile::tempdir().unwrap();

    let result = execute_run(WorkArgs {
        work_directory: temp_dir.path().to_path_buf(),
        ..Default::default()
    });

    assert!(result.is_err());
}

#[test]
fn test_run_full_pipeline() {
    let temp_dir = tempfile::tempdir().unwrap();
    let work = temp_dir.path();

    common::write_batch(&work.join("profiling/fop/0"), 2);
    common::write_batch(&work.join("profiling/fop/1"), 2);
    // Batch with no runs is skipped, not fatal
    fs::create_dir_all(work.join("profiling/fop/2")).unwrap();

    common::write_reference_runs(work, "fop");
    common::write_profiled_runs(work, "fop", 1, ONE_SECOND);

    let outcome = execute_run(WorkArgs {
        work_directory: work.to_path_buf(),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(outcome.batches_attributed, 2);
    assert_eq!(outcome.batches_skipped, 1);

    let convergence = outcome.convergence.unwrap();
    assert_eq!(convergence.verdicts.len(), 1);
    assert_eq!(convergence.verdicts[0].batch_count, 2);
    assert!(convergence.verdicts[0].rank_correlation.exceeds(0.999));

    let calmness = outcome.calmness.unwrap();
    assert_eq!(calmness.verdicts.len(), 1);
    assert!(calmness.verdicts[0].is_calm);

    for file in ["convergence.json", "calmness.json", "calmness.csv", "calm-rates.txt"] {
        assert!(work.join("summary").join(file).is_file(), "{}", file);
    }

    let report = validate_report_file(&work.join("summary/calmness.json")).unwrap();
    assert_eq!(report.selections[0].rate_ms, 1);
}

#[test]
fn test_run_with_profiling_only() {
    let temp_dir = tempfile::tempdir().unwrap();
    let work = temp_dir.path();
    common::write_batch(&work.join("profiling/fop/0"), 2);

    let outcome = execute_run(WorkArgs {
        work_directory: work.to_path_buf(),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(outcome.batches_attributed, 1);
    assert!(outcome.convergence.is_some());
    assert!(outcome.calmness.is_none());
}

#[test]
fn test_validate_rejects_garbage() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("calmness.json");
    fs::write(&path, "not json").unwrap();

    assert!(validate_report_file(&path).is_err());
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let batch = temp_dir.path();
    common::write_batch(batch, 2);
    common::write(&batch.join("analysis.toml"), "warmup_divisor = 0\n");

    let result = execute_attribute(AttributeArgs {
        dir: batch.to_path_buf(),
        ..Default::default()
    });

    assert!(result.is_err());
}
