//! Dated numeric series: ordering, bounds, trend and simple seasonality.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::options::DatePreference;
use crate::stats::trend::{TrendLine, fit_line};
use crate::temporal::{parse_date, to_datetime};
use crate::value::{Record, Value};

/// Widest moving-average window.
const MAX_WINDOW: usize = 5;

/// Share of the value range added above and below the bounds.
const BOUNDS_PADDING: f64 = 0.1;

/// Allowed deviation of each gap from the mean gap for a regular series.
const GAP_TOLERANCE: f64 = 0.1;

/// One observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

impl TimePoint {
    pub fn new(date: DateTime<Utc>, value: f64) -> Self {
        Self { date, value }
    }

    /// Milliseconds since the Unix epoch.
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.date.timestamp_millis()
    }
}

/// Extent of a series. The value bounds are padded by a tenth of the raw
/// range on each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesBounds {
    pub min_date: DateTime<Utc>,
    pub max_date: DateTime<Utc>,
    pub min_value: f64,
    pub max_value: f64,
    /// `max_value - min_value`, padding included.
    pub value_range: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSeriesStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seasonality {
    /// Every gap between consecutive points is within 10% of the mean gap.
    pub detected: bool,
    /// Mean gap in milliseconds.
    pub period_millis: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesAnalysis {
    pub stats: TimeSeriesStats,
    /// Fit of value against timestamp; `None` when every point shares one
    /// instant.
    pub trend: Option<TrendLine>,
    /// Needs at least two points.
    pub seasonality: Option<Seasonality>,
    /// Trailing means over a window of `min(5, n / 3)` points.
    pub moving_average: Vec<f64>,
    pub bounds: SeriesBounds,
}

/// A time-ordered numeric series.
///
/// # Example
///
/// ```
/// use datascope::{CsvReader, TimeSeries, options::DatePreference};
///
/// let rows = CsvReader::new()
///     .read_str("day,sales\n2024-01-02,12\n2024-01-01,10\n2024-01-03,14\n")
///     .unwrap();
/// let series = TimeSeries::from_records(&rows, "day", "sales", DatePreference::MdyFormat).unwrap();
/// let analysis = series.analyze().unwrap();
///
/// assert_eq!(analysis.stats.mean, 12.0);
/// assert!(analysis.seasonality.unwrap().detected);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    points: Vec<TimePoint>,
    dropped: usize,
    trendline: Option<TrendLine>,
}

impl TimeSeries {
    /// Build a series from points, dropping non-finite values and sorting
    /// by date.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = TimePoint>,
    {
        let mut dropped = 0;
        let points = points
            .into_iter()
            .filter(|p| {
                let keep = p.value.is_finite();
                if !keep {
                    dropped += 1;
                }
                keep
            })
            .collect();
        Self::from_sorted(points, dropped)
    }

    /// Build a series from two columns of tabular rows.
    ///
    /// Dates may be date values, epoch milliseconds or text; values are
    /// coerced to numbers. Rows where either side fails are dropped and
    /// counted. A column absent from the first row is an error.
    pub fn from_records(
        rows: &[Record],
        date_column: &str,
        value_column: &str,
        preference: DatePreference,
    ) -> Result<Self> {
        if let Some(first) = rows.first() {
            for column in [date_column, value_column] {
                if !first.contains_key(column) {
                    return Err(AnalysisError::InvalidInput(format!(
                        "column '{column}' not found"
                    )));
                }
            }
        }

        let mut dropped = 0;
        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            let date = row
                .get(date_column)
                .and_then(|v| date_of(v, preference));
            let value = row
                .get(value_column)
                .and_then(Value::to_number)
                .filter(|n| n.is_finite());

            match (date, value) {
                (Some(date), Some(value)) => points.push(TimePoint::new(date, value)),
                _ => dropped += 1,
            }
        }

        Ok(Self::from_sorted(points, dropped))
    }

    fn from_sorted(mut points: Vec<TimePoint>, dropped: usize) -> Self {
        points.sort_by_key(|p| p.date);
        if dropped > 0 {
            tracing::warn!(dropped, kept = points.len(), "skipped unusable time series points");
        }

        let xs: Vec<f64> = points.iter().map(|p| p.timestamp() as f64).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.value).collect();
        let trendline = fit_line(&xs, &ys);

        Self {
            points,
            dropped,
            trendline,
        }
    }

    /// Points in date order.
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    /// Number of input points that were discarded.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Least squares line of value against epoch milliseconds.
    pub fn trendline(&self) -> Option<&TrendLine> {
        self.trendline.as_ref()
    }

    /// Date and padded value extent; `None` for an empty series.
    pub fn bounds(&self) -> Option<SeriesBounds> {
        let first = self.points.first()?;
        let last = self.points.last()?;

        let (min, max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.value), hi.max(p.value))
            });
        let padding = (max - min) * BOUNDS_PADDING;

        Some(SeriesBounds {
            min_date: first.date,
            max_date: last.date,
            min_value: min - padding,
            max_value: max + padding,
            value_range: max - min + 2.0 * padding,
        })
    }

    /// Summary statistics, trend, seasonality and moving average.
    pub fn analyze(&self) -> Option<TimeSeriesAnalysis> {
        let bounds = self.bounds()?;
        let values: Vec<f64> = self.points.iter().map(|p| p.value).collect();
        let n = values.len();

        let stats = TimeSeriesStats {
            mean: values.iter().sum::<f64>() / n as f64,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };

        let window = MAX_WINDOW.min(n / 3);
        let moving_average = if window == 0 {
            Vec::new()
        } else {
            values
                .windows(window)
                .map(|w| w.iter().sum::<f64>() / window as f64)
                .collect()
        };

        Some(TimeSeriesAnalysis {
            stats,
            trend: self.trendline,
            seasonality: self.seasonality(),
            moving_average,
            bounds,
        })
    }

    fn seasonality(&self) -> Option<Seasonality> {
        if self.points.len() < 2 {
            return None;
        }
        let gaps: Vec<f64> = self
            .points
            .windows(2)
            .map(|w| (w[1].timestamp() - w[0].timestamp()) as f64)
            .collect();
        let mean_gap = gaps.iter().sum::<f64>() / gaps.len() as f64;

        Some(Seasonality {
            detected: gaps
                .iter()
                .all(|g| (g - mean_gap).abs() < mean_gap * GAP_TOLERANCE),
            period_millis: mean_gap,
        })
    }
}

/// Interpret a cell as a point in time.
fn date_of(value: &Value, preference: DatePreference) -> Option<DateTime<Utc>> {
    match value {
        Value::Date(ms) => to_datetime(*ms),
        Value::Number(n) if n.is_finite() && n.fract() == 0.0 => to_datetime(*n as i64),
        Value::String(s) => parse_date(s, preference).and_then(to_datetime),
        _ => None,
    }
}
