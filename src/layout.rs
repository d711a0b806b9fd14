//! Work directory conventions.
//!
//! ```text
//! <work>/calmness/calm/<bench>/raw/<run>/...           reference (unprofiled) runs
//! <work>/calmness/profile/<bench>/<rate>/raw/<run>/... profiled runs per rate
//! <work>/profiling/<bench>/<batch>/raw/<run>/...       attribution batches
//! ```
//!
//! Paths are always built from an explicit run id; nothing captures loop state.

use crate::parser::schema::RunId;
use crate::utils::error::AnalysisError;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level work directory
#[derive(Debug, Clone)]
pub struct WorkLayout {
    root: PathBuf,
}

impl WorkLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reference runs: `<work>/calmness/calm`
    pub fn reference_root(&self) -> PathBuf {
        self.root.join("calmness").join("calm")
    }

    /// Profiled runs: `<work>/calmness/profile`
    pub fn profile_root(&self) -> PathBuf {
        self.root.join("calmness").join("profile")
    }

    /// Attribution batches: `<work>/profiling`
    pub fn profiling_root(&self) -> PathBuf {
        self.root.join("profiling")
    }

    /// Where aggregate reports go
    pub fn summary_dir(&self) -> PathBuf {
        self.root.join("summary")
    }

    pub fn has_calmness_data(&self) -> bool {
        self.reference_root().is_dir() && self.profile_root().is_dir()
    }

    pub fn has_profiling_data(&self) -> bool {
        self.profiling_root().is_dir()
    }

    /// Reference run tree for a benchmark
    pub fn reference_runs(&self, benchmark: &str) -> RunTree {
        RunTree::new(self.reference_root().join(benchmark))
    }

    /// Profiled run tree for a benchmark at a sampling rate
    pub fn profiled_runs(&self, benchmark: &str, rate: u32) -> RunTree {
        RunTree::new(self.profile_root().join(benchmark).join(rate.to_string()))
    }

    /// Attribution batch tree
    pub fn batch_runs(&self, benchmark: &str, batch: RunId) -> RunTree {
        RunTree::new(self.profiling_root().join(benchmark).join(batch.to_string()))
    }
}

/// A directory holding `raw/<run>/` subdirectories
#[derive(Debug, Clone)]
pub struct RunTree {
    base: PathBuf,
}

impl RunTree {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.base.join("raw")
    }

    /// Directory of one run
    pub fn path_for(&self, run: RunId) -> PathBuf {
        self.raw_dir().join(run.to_string())
    }

    /// A named file inside one run
    pub fn file_for(&self, run: RunId, file_name: &str) -> PathBuf {
        self.path_for(run).join(file_name)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.base.join("processed")
    }

    pub fn summary_dir(&self) -> PathBuf {
        self.base.join("summary")
    }

    /// All run ids, numerically sorted
    pub fn runs(&self) -> Result<Vec<RunId>, AnalysisError> {
        list_numeric_dirs(self.raw_dir())
    }

    /// Run ids with warm-up runs removed
    pub fn steady_state_runs(&self, warmup_divisor: usize) -> Result<Vec<RunId>, AnalysisError> {
        let runs = self.runs()?;
        let kept = steady_state(&runs, warmup_divisor).to_vec();
        debug!(
            "{}: {} runs, {} after warm-up exclusion",
            self.base.display(),
            runs.len(),
            kept.len()
        );
        if kept.is_empty() {
            return Err(AnalysisError::EmptyRunSet(self.raw_dir()));
        }
        Ok(kept)
    }
}

/// Number of leading warm-up runs: `ceil(run_count / divisor)`
pub fn warmup_count(run_count: usize, divisor: usize) -> usize {
    if divisor == 0 {
        return 0;
    }
    run_count.div_ceil(divisor)
}

/// Drop the warm-up prefix of an ordered run sequence
pub fn steady_state<T>(runs: &[T], divisor: usize) -> &[T] {
    let skip = warmup_count(runs.len(), divisor).min(runs.len());
    &runs[skip..]
}

/// Subdirectories whose names are integers, sorted numerically
pub fn list_numeric_dirs(dir: impl AsRef<Path>) -> Result<Vec<u32>, AnalysisError> {
    let mut ids: Vec<u32> = list_named_dirs(dir)?
        .iter()
        .filter_map(|name| name.parse::<u32>().ok())
        .collect();
    ids.sort_unstable();
    Ok(ids)
}

/// Subdirectory names, sorted
///
/// # Errors
/// * `AnalysisError::MissingInput` - `dir` does not exist or cannot be listed
pub fn list_named_dirs(dir: impl AsRef<Path>) -> Result<Vec<String>, AnalysisError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|_| AnalysisError::MissingInput(dir.to_path_buf()))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();
    Ok(names)
}
