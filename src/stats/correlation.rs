//! Serial structure of a series in its original order.

use serde::Serialize;

use super::trend::{TrendLine, fit_indexed};

/// Largest autocorrelation lag reported.
pub const MAX_LAG: usize = 10;

/// Wald-Wolfowitz runs test about the mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunsTest {
    pub runs: usize,
    pub expected_runs: f64,
    pub z_score: f64,
    /// `|z_score| < 1.96`.
    pub is_random: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationStats {
    /// Autocorrelation at lags `1..=min(10, n / 3)`.
    pub autocorrelation: Vec<f64>,
    pub runs_test: RunsTest,
    /// Least squares fit of value against position.
    pub trend: TrendLine,
}

/// Sample autocorrelation at `lag`.
pub fn autocorrelation(data: &[f64], mean: f64, lag: usize) -> f64 {
    let numerator: f64 = data
        .iter()
        .zip(data.iter().skip(lag))
        .map(|(a, b)| (a - mean) * (b - mean))
        .sum();
    let denominator: f64 = data.iter().map(|x| (x - mean).powi(2)).sum();
    numerator / denominator
}

/// Runs of values above / not above the mean.
pub fn runs_test(data: &[f64], mean: f64) -> RunsTest {
    let above: Vec<bool> = data.iter().map(|&x| x > mean).collect();
    let runs = 1 + above.windows(2).filter(|w| w[0] != w[1]).count();

    let n1 = above.iter().filter(|&&a| a).count() as f64;
    let n2 = above.len() as f64 - n1;
    let total = n1 + n2;

    let expected_runs = 2.0 * n1 * n2 / total + 1.0;
    let variance =
        2.0 * n1 * n2 * (2.0 * n1 * n2 - n1 - n2) / (total.powi(2) * (total - 1.0));
    let z_score = (runs as f64 - expected_runs) / variance.sqrt();

    RunsTest {
        runs,
        expected_runs,
        z_score,
        is_random: z_score.abs() < 1.96,
    }
}

/// Serial statistics; `None` for fewer than two values.
pub fn correlation(data: &[f64], mean: f64) -> Option<CorrelationStats> {
    let n = data.len();
    if n < 2 {
        return None;
    }

    let max_lag = MAX_LAG.min(n / 3);
    Some(CorrelationStats {
        autocorrelation: (1..=max_lag)
            .map(|lag| autocorrelation(data, mean, lag))
            .collect(),
        runs_test: runs_test(data, mean),
        trend: fit_indexed(data)?,
    })
}
