//! Configuration and constants for the analysis pipeline.
//!
//! `AnalysisConfig` is built once (defaults, optionally overridden by a TOML
//! file) and passed by reference into every component.

use super::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// RAPL energy registers wrap at this value (in the units the collector writes)
pub const RAPL_WRAPAROUND: f64 = 16384.0;

/// Upper bound on the number of histogram bins
pub const MAX_BINS: usize = 21;

/// Pad applied to both ends of the histogram range
pub const BIN_EDGE_PADDING: f64 = 0.01;

/// The first `ceil(runs / WARMUP_DIVISOR)` runs are JIT/VM warm-up
pub const WARMUP_DIVISOR: usize = 5;

/// Width of an attribution epoch in nanoseconds (0.5 ms)
pub const DEFAULT_BUCKET_WIDTH_NS: u64 = 500_000;

/// Raw frequencies are divided by this and truncated before binning
pub const FREQUENCY_DIVISOR: f64 = 10_000.0;

/// Method identifier that receives energy nobody could be blamed for
pub const PLACEHOLDER_METHOD: &str = "<unattributed>";

/// Name of the optional config file looked up in the work directory
pub const CONFIG_FILE_NAME: &str = "analysis.toml";

// Per-run file names
pub const TIMESTAMP_FILE: &str = "time.json";
pub const ENERGY_FILE: &str = "energy.csv";
pub const METHOD_FILE: &str = "method.csv";
pub const THREAD_FILE: &str = "id.json";
pub const REFERENCE_FREQUENCY_FILE: &str = "freqs.csv";
pub const PROFILED_FREQUENCY_FILE: &str = "cpu.csv";

/// Delimiter used by every raw delimited file
pub const FIELD_DELIMITER: u8 = b';';

/// Separator between frames inside a raw `trace` cell
pub const FRAME_SEPARATOR: char = '@';

/// Separator between frames of a whole trace in a method summary
///
/// We only write innermost frames; the split matters for summaries that
/// list whole traces.
pub const TRACE_JOINER: char = ';';

/// Delimiter of the CSV tables we write
pub const OUTPUT_DELIMITER: u8 = b',';

// Report file names under `<work>/summary`
pub const CALMNESS_TABLE_FILE: &str = "calmness.csv";
pub const CALMNESS_REPORT_FILE: &str = "calmness.json";
pub const RATE_MANIFEST_FILE: &str = "calm-rates.txt";
pub const CONVERGENCE_REPORT_FILE: &str = "convergence.json";

// Batch summary file names under `<batch>/summary`
pub const METHOD_SUMMARY_FILE: &str = "method.csv";
pub const COMPONENT_SUMMARY_FILE: &str = "component.csv";
pub const RUNTIME_SUMMARY_FILE: &str = "runtime.csv";

// Column aliases (different collector versions use different names)
pub const SOCKET_COLUMNS: &[&str] = &["socket"];
pub const EPOCH_COLUMNS: &[&str] = &["epoch"];
pub const PACKAGE_COLUMNS: &[&str] = &["package", "pkg"];
pub const DRAM_COLUMNS: &[&str] = &["dram"];
pub const TIMESTAMP_COLUMNS: &[&str] = &["timestamp", "time"];
pub const THREAD_COLUMNS: &[&str] = &["id", "thread", "tid"];
pub const TRACE_COLUMNS: &[&str] = &["trace", "stack"];
pub const CPU_COLUMNS: &[&str] = &["cpu", "core"];
pub const FREQUENCY_COLUMNS: &[&str] = &["freq", "frequency"];
pub const METHOD_COLUMNS: &[&str] = &["method", "trace"];
pub const ENERGY_COLUMNS: &[&str] = &["energy", "joules"];

/// Complete analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Warm-up runs dropped = ceil(runs / warmup_divisor)
    pub warmup_divisor: usize,

    /// Counter wraparound handling
    pub counter: CounterConfig,

    /// Epoch attribution settings
    pub attribution: AttributionConfig,

    /// Which frames count as application code
    pub stack_filter: StackFilterConfig,

    /// Adaptive histogram settings
    pub binning: BinningConfig,

    /// Acceptance thresholds for calmness
    pub calmness: CalmnessThresholds,

    /// Divisor applied to raw frequencies before binning
    pub frequency_divisor: f64,

    /// Benchmark -> input size label, written to the rate manifest
    pub benchmark_sizes: BTreeMap<String, String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            warmup_divisor: WARMUP_DIVISOR,
            counter: CounterConfig::default(),
            attribution: AttributionConfig::default(),
            stack_filter: StackFilterConfig::default(),
            binning: BinningConfig::default(),
            calmness: CalmnessThresholds::default(),
            frequency_divisor: FREQUENCY_DIVISOR,
            benchmark_sizes: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    /// Size label for a benchmark ("default" when unknown)
    pub fn size_label(&self, benchmark: &str) -> &str {
        self.benchmark_sizes
            .get(benchmark)
            .map(String::as_str)
            .unwrap_or("default")
    }

    /// Reject values that would make the pipeline meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.warmup_divisor == 0 {
            return Err(ConfigError::Invalid("warmup_divisor must be > 0".to_string()));
        }
        if !(self.counter.wraparound > 0.0) {
            return Err(ConfigError::Invalid("counter.wraparound must be > 0".to_string()));
        }
        if self.attribution.bucket_width_ns == 0 {
            return Err(ConfigError::Invalid(
                "attribution.bucket_width_ns must be > 0".to_string(),
            ));
        }
        if self.binning.max_bins == 0 {
            return Err(ConfigError::Invalid("binning.max_bins must be > 0".to_string()));
        }
        if !(self.frequency_divisor > 0.0) {
            return Err(ConfigError::Invalid("frequency_divisor must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Wrapping counter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub wraparound: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            wraparound: RAPL_WRAPAROUND,
        }
    }
}

/// Epoch attribution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Bucket width used to map sample timestamps to epochs
    pub bucket_width_ns: u64,

    /// Identifier that receives energy with no observed method
    pub placeholder: String,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            bucket_width_ns: DEFAULT_BUCKET_WIDTH_NS,
            placeholder: PLACEHOLDER_METHOD.to_string(),
        }
    }
}

/// Namespace lists driving the stack trace filter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackFilterConfig {
    /// Runtime / standard library package prefixes
    pub runtime_namespaces: Vec<String>,

    /// A raw trace mentioning any of these came from the profiler itself
    pub profiler_packages: Vec<String>,

    /// Innermost application frames under these belong to the benchmark harness
    pub harness_packages: Vec<String>,
}

impl Default for StackFilterConfig {
    fn default() -> Self {
        Self {
            runtime_namespaces: ["java.", "javax.", "jdk.", "sun.", "org.apache.commons."]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            profiler_packages: ["chappie", "jlibc", "jrapl"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            harness_packages: vec!["org.dacapo.harness".to_string()],
        }
    }
}

/// Adaptive histogram settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    pub max_bins: usize,
    pub padding: f64,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            max_bins: MAX_BINS,
            padding: BIN_EDGE_PADDING,
        }
    }
}

/// Calmness acceptance thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalmnessThresholds {
    /// Relative runtime deviation accepted outright
    pub max_runtime_deviation: f64,

    /// Deviation accepted when within this many propagated standard deviations
    pub deviation_sigmas: f64,

    /// Minimum temporal correlation (exclusive)
    pub min_temporal_correlation: f64,

    /// Minimum spatial correlation (exclusive)
    pub min_spatial_correlation: f64,
}

impl Default for CalmnessThresholds {
    fn default() -> Self {
        Self {
            max_runtime_deviation: 0.05,
            deviation_sigmas: 2.0,
            min_temporal_correlation: 0.85,
            min_spatial_correlation: 0.85,
        }
    }
}

/// Load a configuration file
///
/// # Errors
/// * `ConfigError::Io` - file cannot be read
/// * `ConfigError::Toml` - file is not valid TOML for this schema
/// * `ConfigError::Invalid` - values fail validation
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AnalysisConfig = toml::from_str(&contents)?;
    config.validate()?;
    debug!("Loaded analysis config from {}", path.display());
    Ok(config)
}

/// Resolve the configuration for a run
///
/// An explicit path wins; otherwise `<work_dir>/analysis.toml` is used when
/// present; otherwise built-in defaults.
pub fn resolve_config(
    explicit: Option<&Path>,
    work_dir: Option<&Path>,
) -> Result<AnalysisConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let candidate: Option<PathBuf> = work_dir.map(|dir| dir.join(CONFIG_FILE_NAME));
    match candidate {
        Some(path) if path.is_file() => load_config(path),
        _ => Ok(AnalysisConfig::default()),
    }
}
