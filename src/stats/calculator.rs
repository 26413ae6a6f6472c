//! Memoizing front end over the descriptive, distribution and correlation
//! statistics.

use std::sync::OnceLock;

use serde::Serialize;

use super::correlation::{CorrelationStats, correlation};
use super::descriptive::{DescriptiveStats, describe};
use super::distribution::{DistributionStats, distribution};
use crate::options::{Bandwidth, BinRule};
use crate::value::Value;

/// Everything the calculator knows about one series. Each part is `None`
/// when the series is too short for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticalSummary {
    pub descriptive: Option<DescriptiveStats>,
    pub distribution: Option<DistributionStats>,
    /// Needs at least two values.
    pub correlation: Option<CorrelationStats>,
}

/// Computes summary statistics over a numeric series.
///
/// Non-finite input is dropped on the way in. The result of
/// [`calculate`](Self::calculate) is cached until the data or a setting
/// changes.
///
/// # Example
///
/// ```
/// use datascope::StatisticalCalculator;
///
/// let mut calc = StatisticalCalculator::new();
/// calc.set_data([1.0, 2.0, 3.0, 4.0, 5.0, f64::NAN]);
/// let summary = calc.calculate();
///
/// let descriptive = summary.descriptive.as_ref().unwrap();
/// assert_eq!(descriptive.count, 5);
/// assert_eq!(descriptive.median, 3.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatisticalCalculator {
    /// Histogram bin rule.
    bin_rule: BinRule,
    /// Kernel density bandwidth.
    bandwidth: Bandwidth,
    /// Finite values in input order.
    data: Vec<f64>,
    /// Same values, ascending.
    sorted: Vec<f64>,
    summary: OnceLock<StatisticalSummary>,
}

impl StatisticalCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the histogram bin rule.
    pub fn bin_rule(&mut self, bin_rule: BinRule) -> &mut Self {
        self.bin_rule = bin_rule;
        self.summary = OnceLock::new();
        self
    }

    /// Set the kernel density bandwidth.
    pub fn bandwidth(&mut self, bandwidth: Bandwidth) -> &mut Self {
        self.bandwidth = bandwidth;
        self.summary = OnceLock::new();
        self
    }

    /// Replace the series. NaN and infinite values are discarded.
    pub fn set_data<I>(&mut self, numbers: I) -> &mut Self
    where
        I: IntoIterator<Item = f64>,
    {
        self.data = numbers.into_iter().filter(|n| n.is_finite()).collect();
        self.sorted = self.data.clone();
        self.sorted.sort_by(f64::total_cmp);
        self.summary = OnceLock::new();
        self
    }

    /// Replace the series with the finite numbers among `values`; other
    /// cells are skipped.
    pub fn set_values(&mut self, values: &[Value]) -> &mut Self {
        self.set_data(values.iter().filter_map(Value::as_finite))
    }

    /// The retained series, in input order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// The retained series, ascending.
    pub fn sorted_data(&self) -> &[f64] {
        &self.sorted
    }

    /// Compute, or return the cached, summary.
    pub fn calculate(&self) -> &StatisticalSummary {
        self.summary.get_or_init(|| {
            let _span = tracing::debug_span!("calculate", n = self.data.len()).entered();
            let descriptive = describe(&self.data, &self.sorted);
            let distribution = descriptive.as_ref().map(|d| {
                distribution(&self.data, &self.sorted, d, self.bin_rule, self.bandwidth)
            });
            let correlation = descriptive
                .as_ref()
                .and_then(|d| correlation(&self.data, d.mean));

            StatisticalSummary {
                descriptive,
                distribution,
                correlation,
            }
        })
    }
}
