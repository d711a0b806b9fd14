use std::path::PathBuf;

/// Arguments for the attribute command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AttributeArgs {
    /// Batch directory holding `raw/<run>/`
    pub dir: PathBuf,

    /// Explicit config file (otherwise `<dir>/analysis.toml` or defaults)
    pub config: Option<PathBuf>,

    /// Print the method ranking to stdout
    pub print_summary: bool,

    /// Number of methods shown in the summary
    pub top_methods: usize,
}

impl Default for AttributeArgs {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            config: None,
            print_summary: false,
            top_methods: 10,
        }
    }
}

/// Arguments shared by the work-directory commands
///
/// **Public** - used by calmness, convergence and run
#[derive(Debug, Clone)]
pub struct WorkArgs {
    /// Work directory holding `calmness/` and/or `profiling/`
    pub work_directory: PathBuf,

    /// Explicit config file (otherwise `<work>/analysis.toml` or defaults)
    pub config: Option<PathBuf>,

    /// Print a coloured summary to stdout
    pub print_summary: bool,
}

impl Default for WorkArgs {
    fn default() -> Self {
        Self {
            work_directory: PathBuf::from("."),
            config: None,
            print_summary: false,
        }
    }
}
