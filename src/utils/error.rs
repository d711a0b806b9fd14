//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading raw run files
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing column (expected one of {expected:?})")]
    MissingColumn { expected: Vec<String> },

    #[error("Line {line}: expected {expected} fields, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: invalid value {value:?} in column '{column}'")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Malformed delimited data: {0}")]
    Csv(csv::Error),

    #[error("File has no header row")]
    Empty,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl From<csv::Error> for ParseError {
    /// Ragged rows keep their line number; anything else is passed through
    fn from(err: csv::Error) -> Self {
        if let csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } = err.kind()
        {
            return ParseError::RowWidth {
                line: pos.as_ref().map(|p| p.line() as usize).unwrap_or(0),
                expected: *expected_len as usize,
                found: *len as usize,
            };
        }
        ParseError::Csv(err)
    }
}

/// Errors raised by the analysis stages
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Required input missing: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Malformed input in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("No usable runs in {}", .0.display())]
    EmptyRunSet(PathBuf),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl AnalysisError {
    /// Wrap a parse failure with the file it came from
    pub fn malformed(path: impl Into<PathBuf>, source: ParseError) -> Self {
        AnalysisError::Malformed {
            path: path.into(),
            source,
        }
    }
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    CsvFailed(#[from] csv::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
