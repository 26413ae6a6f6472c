//! Ordinary least squares trend lines.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Direction implied by the sign of a slope.
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Increasing
        } else if slope < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    #[serde(rename = "trend")]
    pub direction: TrendDirection,
    /// Absolute slope.
    pub strength: f64,
}

impl TrendLine {
    /// Value of the line at `x`.
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `ys` against `xs` by least squares.
///
/// Only the paired prefix of the two slices is used. Returns `None` with
/// fewer than two points or when every `x` is the same.
///
/// # Example
///
/// ```
/// use datascope::stats::{TrendDirection, fit_line};
///
/// let line = fit_line(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
/// assert_eq!(line.slope, 2.0);
/// assert_eq!(line.intercept, 1.0);
/// assert_eq!(line.direction, TrendDirection::Increasing);
/// ```
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<TrendLine> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let y_mean = ys.iter().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean).powi(2);
    }
    if denominator == 0.0 {
        return None;
    }

    let slope = numerator / denominator;
    Some(TrendLine {
        slope,
        intercept: y_mean - slope * x_mean,
        direction: TrendDirection::from_slope(slope),
        strength: slope.abs(),
    })
}

/// Fit `ys` against their positions `0, 1, 2, ...`.
pub fn fit_indexed(ys: &[f64]) -> Option<TrendLine> {
    let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
    fit_line(&xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_exact_line() {
        let line = fit_indexed(&[10.0, 8.0, 6.0, 4.0]).unwrap();
        assert_eq!(line.slope, -2.0);
        assert_eq!(line.intercept, 10.0);
        assert_eq!(line.direction, TrendDirection::Decreasing);
        assert_eq!(line.strength, 2.0);
        assert_eq!(line.predict(5.0), 0.0);
    }

    #[test]
    fn test_flat_series_is_stable() {
        let line = fit_indexed(&[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(line.slope, 0.0);
        assert_eq!(line.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(fit_indexed(&[]).is_none());
        assert!(fit_indexed(&[1.0]).is_none());
        assert!(fit_line(&[2.0, 2.0], &[1.0, 5.0]).is_none());
    }

    #[test]
    fn test_uses_paired_prefix() {
        let line = fit_line(&[0.0, 1.0, 2.0], &[0.0, 1.0]).unwrap();
        assert_eq!(line.slope, 1.0);
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_value(fit_indexed(&[1.0, 2.0]).unwrap()).unwrap();
        assert_eq!(json["trend"], "increasing");
        assert_eq!(json["strength"], 1.0);
    }
}
