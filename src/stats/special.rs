//! Closed-form approximations of the normal and chi-square distributions.

use std::f64::consts::SQRT_2;

/// Error function, Abramowitz and Stegun formula 7.1.26 (|error| < 1.5e-7).
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal cumulative distribution function.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// Chi-square CDF via the Wilson-Hilferty cube-root transform.
pub fn chi_square_cdf(x: f64, df: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let z = (x / df).cbrt() - (1.0 - 2.0 / (9.0 * df));
    normal_cdf(z * (9.0 * df / 2.0).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erf() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
        assert!((erf(3.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_normal_cdf() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!(normal_cdf(-8.0) < 1e-6);
    }

    #[test]
    fn test_chi_square_cdf() {
        assert_eq!(chi_square_cdf(0.0, 2.0), 0.0);
        assert_eq!(chi_square_cdf(-1.0, 2.0), 0.0);
        // 95th percentile of chi-square with 2 degrees of freedom is 5.991
        assert!((chi_square_cdf(5.991, 2.0) - 0.95).abs() < 0.01);
        assert!(chi_square_cdf(100.0, 2.0) > 0.999);
    }
}
