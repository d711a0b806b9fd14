//! Typed result for statistics that may not be computable.
//!
//! A correlation over a constant series, or a standard error over two points,
//! has no meaningful value. Those cases carry the reason instead of a numeric
//! sentinel so callers can tell "poor" from "could not compute".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a metric could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    /// Not enough observations for the formula
    TooFewPoints,
    /// One of the inputs has no spread
    ZeroVariance,
    /// An input or intermediate value was NaN or infinite
    NonFinite,
}

/// A statistic that is either a finite value or undefined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Value(f64),
    Undefined(Degeneracy),
}

impl Metric {
    /// Wrap a raw number, turning NaN/inf into `Undefined(NonFinite)`
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Metric::Value(value)
        } else {
            Metric::Undefined(Degeneracy::NonFinite)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    /// Apply `f` to a defined value; undefined passes through
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Metric {
        match self {
            Metric::Value(v) => Metric::from_f64(f(v)),
            undefined => undefined,
        }
    }

    /// Strictly greater than; false when undefined
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.value().map_or(false, |v| v > threshold)
    }

    /// Text for CSV cells ("NaN" when undefined)
    pub fn to_cell(&self) -> String {
        match self {
            Metric::Value(v) => v.to_string(),
            Metric::Undefined(_) => "NaN".to_string(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{:.4}", v),
            Metric::Undefined(reason) => write!(f, "undefined ({:?})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_becomes_undefined() {
        assert_eq!(
            Metric::from_f64(f64::NAN),
            Metric::Undefined(Degeneracy::NonFinite)
        );
        assert_eq!(Metric::from_f64(0.5), Metric::Value(0.5));
    }

    #[test]
    fn test_undefined_never_exceeds() {
        let undefined = Metric::Undefined(Degeneracy::ZeroVariance);
        assert!(!undefined.exceeds(-1.0));
        assert!(Metric::Value(0.9).exceeds(0.85));
        assert!(!Metric::Value(0.85).exceeds(0.85));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&Metric::Undefined(Degeneracy::TooFewPoints)).unwrap();
        assert_eq!(json, r#"{"undefined":"too_few_points"}"#);

        let json = serde_json::to_string(&Metric::Value(0.25)).unwrap();
        assert_eq!(json, r#"{"value":0.25}"#);
    }
}
