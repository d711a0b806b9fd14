//! Pearson correlation and its standard error.

use super::metric::{Degeneracy, Metric};

/// Pearson correlation coefficient of two equally long series
///
/// Symmetric in its arguments. Undefined when fewer than two pairs exist,
/// when lengths differ, or when either series is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Metric {
    if xs.len() != ys.len() || xs.len() < 2 {
        return Metric::Undefined(Degeneracy::TooFewPoints);
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Metric::Undefined(Degeneracy::NonFinite);
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Metric::Undefined(Degeneracy::ZeroVariance);
    }

    Metric::from_f64((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Standard error of a correlation over `n` points: `sqrt((1 - r^2) / (n - 2))`
pub fn correlation_std_error(r: Metric, n: usize) -> Metric {
    if n < 3 {
        return Metric::Undefined(Degeneracy::TooFewPoints);
    }
    r.map(|r| ((1.0 - r * r) / (n - 2) as f64).sqrt())
}

/// Root mean squared difference of two equally long series
pub fn rmse(xs: &[f64], ys: &[f64]) -> Metric {
    if xs.len() != ys.len() || xs.is_empty() {
        return Metric::Undefined(Degeneracy::TooFewPoints);
    }
    let sum: f64 = xs.iter().zip(ys).map(|(x, y)| (x - y).powi(2)).sum();
    Metric::from_f64((sum / xs.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_correlation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        assert_eq!(pearson(&xs, &ys), Metric::Value(1.0));

        let inverse = [8.0, 6.0, 4.0, 2.0];
        assert_eq!(pearson(&xs, &inverse), Metric::Value(-1.0));
    }

    #[test]
    fn test_pearson_is_symmetric() {
        let xs = [0.1, 0.7, 0.3, 0.9, 0.4];
        let ys = [0.2, 0.5, 0.35, 0.8, 0.1];
        assert_eq!(pearson(&xs, &ys), pearson(&ys, &xs));
    }

    #[test]
    fn test_constant_series_is_undefined() {
        assert_eq!(
            pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Metric::Undefined(Degeneracy::ZeroVariance)
        );
        assert_eq!(
            pearson(&[1.0], &[2.0]),
            Metric::Undefined(Degeneracy::TooFewPoints)
        );
    }

    #[test]
    fn test_std_error() {
        let err = correlation_std_error(Metric::Value(0.6), 6);
        // sqrt(0.64 / 4) = 0.4
        assert!((err.value().unwrap() - 0.4).abs() < 1e-12);

        assert_eq!(
            correlation_std_error(Metric::Value(0.6), 2),
            Metric::Undefined(Degeneracy::TooFewPoints)
        );
        assert_eq!(
            correlation_std_error(Metric::Undefined(Degeneracy::ZeroVariance), 10),
            Metric::Undefined(Degeneracy::ZeroVariance)
        );
    }

    #[test]
    fn test_rmse() {
        let err = rmse(&[0.5, 0.5], &[0.4, 0.6]);
        assert!((err.value().unwrap() - 0.1).abs() < 1e-12);
    }
}
