use std::str::FromStr;

use serde::Serialize;

use crate::error::AnalysisError;

/// Date format preference for ambiguous date parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePreference {
    /// Day-Month-Year format (e.g., 31/12/2023).
    DmyFormat,
    /// Month-Day-Year format (e.g., 12/31/2023).
    #[default]
    MdyFormat,
}

impl DatePreference {
    /// Returns true if day comes before month in ambiguous dates.
    pub fn is_dmy(&self) -> bool {
        matches!(self, DatePreference::DmyFormat)
    }
}

/// Largest bin count any rule yields.
pub const MAX_BINS: usize = 10_000;

/// Rule for choosing the number of histogram bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinRule {
    /// `ceil(log2(n) + 1)`.
    #[default]
    Sturges,
    /// `ceil(2 * n^(1/3))`.
    Rice,
    /// `ceil(sqrt(n))`.
    Sqrt,
    /// A fixed number of bins.
    Fixed(usize),
}

impl BinRule {
    /// Number of bins this rule yields for `n` observations, between 1 and
    /// [`MAX_BINS`].
    pub fn bin_count(&self, n: usize) -> usize {
        let n = n as f64;
        let bins = match self {
            BinRule::Sturges => (n.log2() + 1.0).ceil(),
            BinRule::Rice => (2.0 * n.cbrt()).ceil(),
            BinRule::Sqrt => n.sqrt().ceil(),
            BinRule::Fixed(k) => *k as f64,
        };
        if bins.is_finite() && bins >= 1.0 {
            (bins as usize).min(MAX_BINS)
        } else {
            1
        }
    }
}

impl FromStr for BinRule {
    type Err = AnalysisError;

    /// Parse `sturges`, `rice`, `sqrt`, or a bin count in `1..=MAX_BINS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sturges" => Ok(BinRule::Sturges),
            "rice" => Ok(BinRule::Rice),
            "sqrt" => Ok(BinRule::Sqrt),
            other => match other.parse::<usize>() {
                Ok(0) => Err(AnalysisError::InvalidConfig(
                    "histogram needs at least one bin".to_string(),
                )),
                Ok(k) if k > MAX_BINS => Err(AnalysisError::InvalidConfig(format!(
                    "at most {MAX_BINS} histogram bins, got {k}"
                ))),
                Ok(k) => Ok(BinRule::Fixed(k)),
                Err(_) => Err(AnalysisError::InvalidConfig(format!(
                    "unknown bin rule '{s}'"
                ))),
            },
        }
    }
}

/// Kernel density bandwidth selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Bandwidth {
    /// Silverman's rule of thumb: `1.06 * stdDev * n^-0.2`.
    #[default]
    Silverman,
    /// A caller-supplied bandwidth.
    Fixed(f64),
}

impl Bandwidth {
    /// Resolve the bandwidth for a sample of size `n` with standard deviation `std_dev`.
    pub fn resolve(&self, n: usize, std_dev: f64) -> f64 {
        match self {
            Bandwidth::Silverman => 1.06 * std_dev * (n as f64).powf(-0.2),
            Bandwidth::Fixed(h) => *h,
        }
    }
}

impl FromStr for Bandwidth {
    type Err = AnalysisError;

    /// Parse `silverman` or a positive, finite bandwidth.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("silverman") {
            return Ok(Bandwidth::Silverman);
        }
        match s.parse::<f64>() {
            Ok(h) if h.is_finite() && h > 0.0 => Ok(Bandwidth::Fixed(h)),
            _ => Err(AnalysisError::InvalidConfig(format!(
                "bandwidth must be 'silverman' or a positive number, got '{s}'"
            ))),
        }
    }
}
