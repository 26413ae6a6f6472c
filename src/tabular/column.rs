//! Per-column statistics.

use chrono::{DateTime, Utc};
use foldhash::HashSet;
use indexmap::IndexMap;
use serde::Serialize;

use super::type_inference::infer_column_type;
use crate::field_type::Type;
use crate::options::DatePreference;
use crate::temporal::{parse_date, to_datetime};
use crate::value::Value;

type FastIndexMap<K, V> = IndexMap<K, V, foldhash::fast::RandomState>;

/// Statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: Type,
    /// Number of present (non-missing) values.
    pub count: usize,
    /// Number of distinct present values.
    pub unique: usize,
    /// Number of missing or null values.
    pub missing: usize,
    pub stats: TypeStats,
}

/// Type-specific statistics; the variant always matches the column type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypeStats {
    Numeric(NumericStats),
    String(StringStats),
    Date(DateStats),
    Boolean(BooleanStats),
    Mixed(MixedStats),
}

/// Numeric column statistics. The summary fields are `None` when the column
/// holds no finite number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// Population standard deviation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    pub zeros: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringStats {
    pub min_length: usize,
    pub max_length: usize,
    pub avg_length: f64,
    /// Count of empty strings.
    pub empty: usize,
    pub min_words: usize,
    pub max_words: usize,
    pub top_values: Vec<TopValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopValue {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateStats {
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
    pub range_millis: i64,
    pub invalid_dates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanStats {
    pub true_count: usize,
    pub false_count: usize,
    pub true_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedStats {
    /// Count per primitive tag, in first-seen order.
    pub type_distribution: IndexMap<Type, usize>,
    pub predominant_type: Type,
}

/// Computes [`ColumnStats`] for a single column of values.
#[derive(Debug, Clone)]
pub struct ColumnProfiler {
    /// Day/month order for ambiguous numeric dates.
    date_preference: DatePreference,
    /// Leading values checked before promoting a string column to dates.
    date_sample_size: usize,
    /// Number of most frequent values reported for string columns.
    top_values: usize,
}

impl Default for ColumnProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnProfiler {
    pub fn new() -> Self {
        Self {
            date_preference: DatePreference::MdyFormat,
            date_sample_size: 10,
            top_values: 5,
        }
    }

    /// Set the date preference for ambiguous date parsing.
    pub fn date_preference(&mut self, date_preference: DatePreference) -> &mut Self {
        self.date_preference = date_preference;
        self
    }

    /// Set how many leading values must parse as dates for date promotion
    /// (at least 1).
    pub fn date_sample_size(&mut self, size: usize) -> &mut Self {
        self.date_sample_size = size.max(1);
        self
    }

    /// Set how many top values string columns report.
    pub fn top_values(&mut self, count: usize) -> &mut Self {
        self.top_values = count;
        self
    }

    /// Profile a column given every cell, missing ones included.
    pub fn profile(&self, name: &str, values: &[Value]) -> ColumnStats {
        let present: Vec<Value> = values.iter().filter(|v| !v.is_missing()).cloned().collect();
        let missing = values.len() - present.len();
        self.profile_present(name, &present, missing)
    }

    /// Profile a column from its present values and a separate missing count.
    pub fn profile_present(&self, name: &str, present: &[Value], missing: usize) -> ColumnStats {
        let column_type =
            infer_column_type(present, self.date_preference, self.date_sample_size);
        let unique = present.iter().collect::<HashSet<_>>().len();

        let stats = match column_type {
            Type::Number => TypeStats::Numeric(numeric_stats(present)),
            Type::String => TypeStats::String(string_stats(present, self.top_values)),
            Type::Date => TypeStats::Date(date_stats(present, self.date_preference)),
            Type::Boolean => TypeStats::Boolean(boolean_stats(present)),
            Type::Mixed => TypeStats::Mixed(mixed_stats(present)),
        };

        ColumnStats {
            name: name.to_string(),
            column_type,
            count: present.len(),
            unique,
            missing,
            stats,
        }
    }
}

/// Median of an ascending slice: middle value or mean of the two middles.
fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn numeric_stats(values: &[Value]) -> NumericStats {
    let mut numbers: Vec<f64> = values.iter().filter_map(Value::as_finite).collect();
    if numbers.is_empty() {
        return NumericStats::default();
    }
    numbers.sort_by(f64::total_cmp);

    let n = numbers.len() as f64;
    let mean = numbers.iter().sum::<f64>() / n;
    let variance = numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    NumericStats {
        min: numbers.first().copied(),
        max: numbers.last().copied(),
        mean: Some(mean),
        median: median_of_sorted(&numbers),
        std_dev: Some(variance.sqrt()),
        zeros: numbers.iter().filter(|&&x| x == 0.0).count(),
        negative: numbers.iter().filter(|&&x| x < 0.0).count(),
    }
}

fn string_stats(values: &[Value], top_n: usize) -> StringStats {
    if values.is_empty() {
        return StringStats::default();
    }

    let texts: Vec<String> = values.iter().map(ToString::to_string).collect();
    let lengths: Vec<usize> = texts.iter().map(|t| t.chars().count()).collect();
    let words: Vec<usize> = texts.iter().map(|t| t.split_whitespace().count()).collect();

    StringStats {
        min_length: lengths.iter().copied().min().unwrap_or(0),
        max_length: lengths.iter().copied().max().unwrap_or(0),
        avg_length: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
        empty: texts.iter().filter(|t| t.is_empty()).count(),
        min_words: words.iter().copied().min().unwrap_or(0),
        max_words: words.iter().copied().max().unwrap_or(0),
        top_values: top_values(&texts, top_n),
    }
}

/// Most frequent values, descending by count; ties keep first-seen order.
fn top_values(texts: &[String], top_n: usize) -> Vec<TopValue> {
    let mut frequency: FastIndexMap<&str, usize> = FastIndexMap::default();
    for text in texts {
        *frequency.entry(text.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = frequency.into_iter().collect();
    // sort_by is stable, so equal counts stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(value, count)| TopValue {
            value: value.to_string(),
            count,
        })
        .collect()
}

fn date_stats(values: &[Value], preference: DatePreference) -> DateStats {
    let mut invalid_dates = 0;
    let mut bounds: Option<(i64, i64)> = None;

    for value in values {
        let parsed = match value {
            Value::Date(ms) => Some(*ms),
            Value::String(s) => parse_date(s, preference),
            _ => None,
        };
        match parsed {
            Some(ms) => {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(ms), hi.max(ms)),
                    None => (ms, ms),
                });
            }
            None => invalid_dates += 1,
        }
    }

    match bounds {
        Some((earliest, latest)) => DateStats {
            earliest: to_datetime(earliest),
            latest: to_datetime(latest),
            range_millis: latest - earliest,
            invalid_dates,
        },
        None => DateStats {
            invalid_dates,
            ..DateStats::default()
        },
    }
}

fn boolean_stats(values: &[Value]) -> BooleanStats {
    let total = values.len();
    let true_count = values
        .iter()
        .filter(|v| matches!(v, Value::Boolean(true)))
        .count();

    BooleanStats {
        true_count,
        false_count: total - true_count,
        true_percentage: if total == 0 {
            0.0
        } else {
            true_count as f64 / total as f64 * 100.0
        },
    }
}

fn mixed_stats(values: &[Value]) -> MixedStats {
    let mut type_distribution: IndexMap<Type, usize> = IndexMap::new();
    for tag in values.iter().filter_map(Value::tag) {
        *type_distribution.entry(tag).or_insert(0) += 1;
    }

    let mut predominant_type = Type::Mixed;
    let mut best = 0;
    for (&tag, &count) in &type_distribution {
        if count > best {
            best = count;
            predominant_type = tag;
        }
    }

    MixedStats {
        type_distribution,
        predominant_type,
    }
}
