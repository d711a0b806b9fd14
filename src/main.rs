//! calmcheck CLI
//!
//! Attributes measured energy to program methods and checks that sampling
//! did not disturb the workload it measured.

use anyhow::Result;
use calmcheck::commands::{
    display_version, execute_attribute, execute_calmness, execute_convergence, execute_run,
    validate_report_file, AttributeArgs, WorkArgs,
};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

/// calmcheck - energy attribution and sampling calmness validation
#[derive(Parser, Debug)]
#[command(name = "calmcheck")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Analysis config file (TOML); defaults to <dir>/analysis.toml when present
    #[arg(short, long, global = true, env = "CALMCHECK_CONFIG")]
    config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Attribute the energy of one batch of runs to methods
    Attribute {
        /// Batch directory holding raw/<run>/
        #[arg(short, long)]
        dir: PathBuf,

        /// Number of methods shown in the summary
        #[arg(long, default_value = "10")]
        top_methods: usize,

        /// Print the method ranking to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Check that sampling rates leave runtime and frequencies undisturbed
    Calmness {
        /// Work directory holding calmness/calm and calmness/profile
        #[arg(short, long)]
        work_directory: PathBuf,

        /// Print a summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Check that method rankings are stable across batches
    Convergence {
        /// Work directory holding profiling/
        #[arg(short, long)]
        work_directory: PathBuf,

        /// Print a summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Attribute all batches, then check convergence and calmness
    Run {
        /// Work directory holding calmness/ and/or profiling/
        #[arg(short, long)]
        work_directory: PathBuf,

        /// Print a summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a calmness report JSON file
    Validate {
        /// Path to calmness.json
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = cli.config;

    // Execute command
    match cli.command {
        Commands::Attribute {
            dir,
            top_methods,
            summary,
        } => {
            execute_attribute(AttributeArgs {
                dir,
                config,
                print_summary: summary,
                top_methods,
            })?;
        }

        Commands::Calmness {
            work_directory,
            summary,
        } => {
            execute_calmness(work_args(work_directory, config, summary))?;
        }

        Commands::Convergence {
            work_directory,
            summary,
        } => {
            execute_convergence(work_args(work_directory, config, summary))?;
        }

        Commands::Run {
            work_directory,
            summary,
        } => {
            execute_run(work_args(work_directory, config, summary))?;
        }

        Commands::Validate { file } => {
            validate_report_file(&file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

fn work_args(work_directory: PathBuf, config: Option<PathBuf>, print_summary: bool) -> WorkArgs {
    WorkArgs {
        work_directory,
        config,
        print_summary,
    }
}
