//! Shape of a distribution: moments, normality checks, histogram and
//! kernel density estimate.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use serde::Serialize;

use super::descriptive::DescriptiveStats;
use super::special::chi_square_cdf;
use crate::options::{Bandwidth, BinRule};

/// Points at which the density estimate is evaluated.
pub const DENSITY_POINTS: usize = 100;

/// Shapiro-Wilk sample size limits.
const SHAPIRO_MIN: usize = 3;
const SHAPIRO_MAX: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    pub statistic: f64,
    /// `statistic < 0.95`.
    pub significant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JarqueBera {
    pub statistic: f64,
    pub p_value: f64,
    /// `p_value < 0.05`.
    pub significant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalityTests {
    /// `None` outside 3..=5000 observations.
    pub shapiro_wilk: Option<ShapiroWilk>,
    pub jarque_bera: JarqueBera,
}

/// Equal-width histogram over `[min, max]`; the last bin is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Histogram {
    pub counts: Vec<usize>,
    /// `counts.len() + 1` edges from min to max.
    pub bin_edges: Vec<f64>,
    pub bin_width: f64,
}

/// Gaussian kernel density estimate sampled on an even grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityEstimate {
    pub x: Vec<f64>,
    pub density: Vec<f64>,
    pub bandwidth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    pub skewness: f64,
    /// Non-excess kurtosis; 3 for a normal distribution.
    pub kurtosis: f64,
    /// `|skewness| < 0.5` and `|kurtosis - 3| < 0.5`.
    pub is_normal: bool,
    pub normality_tests: NormalityTests,
    pub histogram: Histogram,
    /// `None` when the bandwidth is not a positive finite number.
    pub density_estimation: Option<DensityEstimate>,
}

/// Population standardized third and fourth moments.
fn moments(data: &[f64], mean: f64, std_dev: f64) -> (f64, f64) {
    let n = data.len() as f64;
    let (mut m3, mut m4) = (0.0, 0.0);
    for x in data {
        let z = (x - mean) / std_dev;
        m3 += z.powi(3);
        m4 += z.powi(4);
    }
    (m3 / n, m4 / n)
}

/// Simplified Shapiro-Wilk W: every extreme pair carries weight `1/sqrt(2)`.
pub fn shapiro_wilk(sorted: &[f64], mean: f64) -> Option<ShapiroWilk> {
    let n = sorted.len();
    if !(SHAPIRO_MIN..=SHAPIRO_MAX).contains(&n) {
        return None;
    }

    let denominator: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum();
    let numerator: f64 = (0..n / 2)
        .map(|i| FRAC_1_SQRT_2 * (sorted[n - 1 - i] - sorted[i]))
        .sum();
    let statistic = numerator * numerator / denominator;

    Some(ShapiroWilk {
        statistic,
        significant: statistic < 0.95,
    })
}

/// Jarque-Bera test with a chi-square(2) p-value.
pub fn jarque_bera(n: usize, skewness: f64, kurtosis: f64) -> JarqueBera {
    let statistic = n as f64 / 6.0 * (skewness.powi(2) + (kurtosis - 3.0).powi(2) / 4.0);
    let p_value = 1.0 - chi_square_cdf(statistic, 2.0);
    JarqueBera {
        statistic,
        p_value,
        significant: p_value < 0.05,
    }
}

/// Bin `data` into `bins` equal-width bins between `min` and `max`.
///
/// With zero width every value lands in the first bin.
pub fn histogram(data: &[f64], min: f64, max: f64, bins: usize) -> Histogram {
    let bins = bins.max(1);
    let bin_width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];

    for &value in data {
        let idx = if bin_width > 0.0 {
            (((value - min) / bin_width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }

    Histogram {
        counts,
        bin_edges: (0..=bins).map(|i| min + i as f64 * bin_width).collect(),
        bin_width,
    }
}

/// Gaussian KDE with bandwidth `h`, evaluated at [`DENSITY_POINTS`] evenly
/// spaced points across `[min, max]`.
pub fn kernel_density(data: &[f64], min: f64, max: f64, h: f64) -> Option<DensityEstimate> {
    if data.is_empty() || !h.is_finite() || h <= 0.0 {
        return None;
    }

    let norm = (2.0 * PI).sqrt();
    let scale = data.len() as f64 * h;
    let x: Vec<f64> = (0..DENSITY_POINTS)
        .map(|i| min + i as f64 / (DENSITY_POINTS - 1) as f64 * (max - min))
        .collect();
    let density = x
        .iter()
        .map(|xi| {
            let kernel_sum: f64 = data
                .iter()
                .map(|v| {
                    let z = (xi - v) / h;
                    (-0.5 * z * z).exp() / norm
                })
                .sum();
            kernel_sum / scale
        })
        .collect();

    Some(DensityEstimate {
        x,
        density,
        bandwidth: h,
    })
}

/// Distribution shape of a non-empty series.
pub fn distribution(
    data: &[f64],
    sorted: &[f64],
    descriptive: &DescriptiveStats,
    bin_rule: BinRule,
    bandwidth: Bandwidth,
) -> DistributionStats {
    let n = data.len();
    let (skewness, kurtosis) = moments(data, descriptive.mean, descriptive.std_dev);
    let h = bandwidth.resolve(n, descriptive.std_dev);

    DistributionStats {
        skewness,
        kurtosis,
        is_normal: skewness.abs() < 0.5 && (kurtosis - 3.0).abs() < 0.5,
        normality_tests: NormalityTests {
            shapiro_wilk: shapiro_wilk(sorted, descriptive.mean),
            jarque_bera: jarque_bera(n, skewness, kurtosis),
        },
        histogram: histogram(data, descriptive.min, descriptive.max, bin_rule.bin_count(n)),
        density_estimation: kernel_density(data, descriptive.min, descriptive.max, h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::descriptive::describe;

    #[test]
    fn test_symmetric_moments() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let (skew, kurt) = moments(&data, 3.0, 2f64.sqrt());
        assert!(skew.abs() < 1e-12);
        // (4 + 0.25 + 0 + 0.25 + 4) / 5
        assert!((kurt - 1.7).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_last_bin_closed() {
        let data = [0.0, 1.0, 2.0, 3.0, 4.0];
        let hist = histogram(&data, 0.0, 4.0, 2);
        assert_eq!(hist.counts, vec![2, 3]);
        assert_eq!(hist.bin_edges, vec![0.0, 2.0, 4.0]);
        assert_eq!(hist.bin_width, 2.0);
        assert_eq!(hist.counts.iter().sum::<usize>(), data.len());
    }

    #[test]
    fn test_histogram_zero_width() {
        let hist = histogram(&[5.0, 5.0, 5.0], 5.0, 5.0, 3);
        assert_eq!(hist.counts, vec![3, 0, 0]);
        assert_eq!(hist.bin_width, 0.0);
    }

    #[test]
    fn test_kernel_density() {
        let data = [0.0, 1.0, 2.0];
        let kde = kernel_density(&data, 0.0, 2.0, 0.5).unwrap();
        assert_eq!(kde.x.len(), DENSITY_POINTS);
        assert_eq!(kde.x[0], 0.0);
        assert_eq!(kde.x[DENSITY_POINTS - 1], 2.0);
        assert!(kde.density.iter().all(|d| *d > 0.0));
        // symmetric data gives a symmetric curve
        let (first, last) = (kde.density[0], kde.density[DENSITY_POINTS - 1]);
        assert!((first - last).abs() < 1e-12);

        assert!(kernel_density(&data, 0.0, 2.0, 0.0).is_none());
        assert!(kernel_density(&data, 0.0, 2.0, f64::NAN).is_none());
    }

    #[test]
    fn test_shapiro_wilk_bounds() {
        assert!(shapiro_wilk(&[1.0, 2.0], 1.5).is_none());
        let sw = shapiro_wilk(&[1.0, 2.0, 3.0], 2.0).unwrap();
        // numerator (3 - 1) / sqrt(2), denominator 2
        assert!((sw.statistic - 1.0).abs() < 1e-12);
        assert!(!sw.significant);
    }

    #[test]
    fn test_jarque_bera_normal_shape() {
        let jb = jarque_bera(100, 0.0, 3.0);
        assert_eq!(jb.statistic, 0.0);
        assert_eq!(jb.p_value, 1.0);
        assert!(!jb.significant);

        let skewed = jarque_bera(1000, 2.0, 9.0);
        assert!(skewed.significant);
    }

    #[test]
    fn test_distribution_single_value() {
        let data = [4.0];
        let descriptive = describe(&data, &data).unwrap();
        let dist = distribution(
            &data,
            &data,
            &descriptive,
            BinRule::Sturges,
            Bandwidth::Silverman,
        );
        assert!(dist.skewness.is_nan());
        assert!(!dist.is_normal);
        assert_eq!(dist.histogram.counts, vec![1]);
        assert!(dist.density_estimation.is_none());
        assert!(dist.normality_tests.shapiro_wilk.is_none());
    }
}
