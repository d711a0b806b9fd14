//! Statistics shared by the calmness and convergence checks.
//!
//! - Descriptive statistics (mean, population std, quantiles)
//! - Adaptive histogram binning
//! - Pearson correlation with typed undefined results

pub mod binning;
pub mod correlation;
pub mod descriptive;
pub mod metric;

// Re-export main types and functions
pub use binning::{AdaptiveBinner, BinEdges};
pub use correlation::{correlation_std_error, pearson, rmse};
pub use descriptive::{distinct_count, mean, population_std, quantile, SampleSummary};
pub use metric::{Degeneracy, Metric};
