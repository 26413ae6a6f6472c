//! Location, spread and order statistics.

use foldhash::HashMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

/// Summary of a numeric series. Spread measures are population measures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Every value sharing the highest frequency.
    pub mode: Vec<f64>,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub quartiles: Quartiles,
    pub iqr: f64,
    /// `100 * std_dev / mean`; not finite when the mean is zero.
    pub coefficient_of_variation: f64,
}

/// Linearly interpolated percentile of ascending data, `p` in `0..=100`.
///
/// The rank is `p / 100 * (n - 1)`; fractional ranks interpolate between
/// the neighbouring order statistics.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = rank - lower as f64;
    Some((1.0 - weight) * sorted[lower] + weight * sorted[upper])
}

/// All values tied for the highest count, in the order each first reached
/// that count.
pub fn mode(data: &[f64]) -> Vec<f64> {
    let mut counts: HashMap<u64, usize> = HashMap::default();
    let mut best = 0;
    let mut modes = Vec::new();

    for &value in data {
        // 0.0 and -0.0 count as one value
        let key = if value == 0.0 { 0 } else { value.to_bits() };
        let count = counts.entry(key).or_insert(0);
        *count += 1;

        if *count > best {
            best = *count;
            modes.clear();
            modes.push(value);
        } else if *count == best {
            modes.push(value);
        }
    }
    modes
}

/// Describe a series given in original order plus its ascending copy.
pub fn describe(data: &[f64], sorted: &[f64]) -> Option<DescriptiveStats> {
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    let count = data.len();
    let n = count as f64;

    let sum: f64 = data.iter().sum();
    let mean = sum / n;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let q1 = percentile(sorted, 25.0)?;
    let median = percentile(sorted, 50.0)?;
    let q3 = percentile(sorted, 75.0)?;

    Some(DescriptiveStats {
        count,
        sum,
        mean,
        median,
        mode: mode(data),
        variance,
        std_dev,
        min,
        max,
        range: max - min,
        quartiles: Quartiles { q1, q2: median, q3 },
        iqr: q3 - q1,
        coefficient_of_variation: std_dev / mean * 100.0,
    })
}
