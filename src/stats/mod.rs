//! Statistics over numeric series.

pub mod calculator;
pub mod correlation;
pub mod descriptive;
pub mod distribution;
pub mod special;
pub mod trend;

pub use calculator::{StatisticalCalculator, StatisticalSummary};
pub use correlation::{CorrelationStats, RunsTest};
pub use descriptive::{DescriptiveStats, Quartiles, percentile};
pub use distribution::{
    DensityEstimate, DistributionStats, Histogram, JarqueBera, NormalityTests, ShapiroWilk,
};
pub use trend::{TrendDirection, TrendLine, fit_indexed, fit_line};

use crate::tabular::type_inference::detect_cell_value;

/// Pull every numeric token out of free text. Tokens are separated by
/// whitespace, commas or semicolons; anything that is not a finite number
/// is skipped.
///
/// ```
/// assert_eq!(datascope::stats::parse_numbers("1, 2.5;x\n-3e1"), vec![1.0, 2.5, -30.0]);
/// ```
pub fn parse_numbers(text: &str) -> Vec<f64> {
    text.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|token| !token.is_empty())
        .filter_map(|token| detect_cell_value(token).as_finite())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_numbers("4 5\t6\n"), vec![4.0, 5.0, 6.0]);
        assert_eq!(parse_numbers("a, true, 1e400, 7"), vec![7.0]);
        assert!(parse_numbers("").is_empty());
    }
}
