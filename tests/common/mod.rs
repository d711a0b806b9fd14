//! On-disk fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Run start used by every fixture, in nanoseconds
pub const START_NS: u64 = 1_000_000_000;

/// Half a millisecond, the default bucket width
pub const BUCKET_NS: u64 = 500_000;

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// `time.json` spanning `duration_ns` from `START_NS`
pub fn write_timestamps(run_dir: &Path, duration_ns: u64) {
    write(
        &run_dir.join("time.json"),
        &format!(
            r#"{{"0": {}, "1": {}}}"#,
            START_NS,
            START_NS + duration_ns
        ),
    );
}

/// One socket, epochs 0..=4, 3 J per epoch after the first reading
pub fn write_energy(run_dir: &Path) {
    let mut content = String::from("socket;epoch;package;dram\n");
    for epoch in 0..=4u32 {
        content.push_str(&format!("0;{};{};{}\n", epoch, 100 + 2 * epoch, 50 + epoch));
    }
    write(&run_dir.join("energy.csv"), &content);
}

/// Epoch 1: `com.app.Worker.compute` on threads 1-3, `com.app.Store.flush` on 4.
/// Epoch 2: `com.app.Store.flush` on thread 1. Epochs 3 and 4 have none.
pub fn write_call_stacks(run_dir: &Path) {
    let at = |epoch: u64, offset: u64| START_NS + epoch * BUCKET_NS + offset;
    let compute = "java.util.HashMap.get@com.app.Worker.compute@com.app.Main.main";
    let flush = "com.app.Store.flush@com.app.Main.main";

    let rows = [
        (at(1, 10), 1, compute),
        (at(1, 20), 2, compute),
        (at(1, 30), 3, compute),
        (at(1, 40), 4, flush),
        (at(2, 10), 1, flush),
    ];

    let mut content = String::from("timestamp;id;trace;epoch\n");
    for (timestamp, thread, trace) in rows {
        content.push_str(&format!("{};{};{};0\n", timestamp, thread, trace));
    }
    // Collector filler
    content.push_str(&format!("{};1;com.app.Main.main;-1\n", at(3, 0)));
    write(&run_dir.join("method.csv"), &content);
}

pub fn write_thread_manifest(run_dir: &Path) {
    write(&run_dir.join("id.json"), r#"{"1": "main", "2": {"start": 0}, "3": "worker", "4": "worker"}"#);
}

/// A complete run directory for attribution (2 ms long, last epoch 4)
pub fn write_attribution_run(run_dir: &Path) {
    write_timestamps(run_dir, 2_000_000);
    write_energy(run_dir);
    write_call_stacks(run_dir);
    write_thread_manifest(run_dir);
}

/// A batch directory with `runs` identical runs
pub fn write_batch(batch_dir: &Path, runs: u32) {
    for run in 0..runs {
        write_attribution_run(&batch_dir.join("raw").join(run.to_string()));
    }
}

/// Four cores over epochs 0..=4; core 3 jumps from 1 GHz-ish to 2 at epoch 2
pub fn frequency_table() -> String {
    let mut content = String::from("epoch;cpu;freq\n");
    for epoch in 0..=4 {
        for cpu in 0..4 {
            let freq = if cpu == 3 && epoch >= 2 { 2_000_000 } else { 1_000_000 };
            content.push_str(&format!("{};{};{}\n", epoch, cpu, freq));
        }
    }
    content
}

/// Reference runs for a benchmark: 1 s each, three runs (one is warm-up)
pub fn write_reference_runs(work: &Path, benchmark: &str) {
    for run in 0..3 {
        let run_dir = work
            .join("calmness/calm")
            .join(benchmark)
            .join("raw")
            .join(run.to_string());
        write_timestamps(&run_dir, 1_000_000_000);
        write(&run_dir.join("freqs.csv"), &frequency_table());
    }
}

/// Profiled runs at one rate, identical frequencies, given duration
pub fn write_profiled_runs(work: &Path, benchmark: &str, rate: u32, duration_ns: u64) {
    for run in 0..3 {
        let run_dir = work
            .join("calmness/profile")
            .join(benchmark)
            .join(rate.to_string())
            .join("raw")
            .join(run.to_string());
        write_timestamps(&run_dir, duration_ns);
        write(&run_dir.join("cpu.csv"), &frequency_table());
    }
}
