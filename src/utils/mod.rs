//! Utility modules for configuration and error handling.

pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use config::{resolve_config, AnalysisConfig};
pub use error::{AnalysisError, ConfigError, OutputError, ParseError};
