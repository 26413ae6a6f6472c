//! Dataset-level profiling over tabular records.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;

use super::column::{ColumnProfiler, ColumnStats};
use crate::field_type::Type;
use crate::options::DatePreference;
use crate::value::{Record, Value};

/// Dataset-wide summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    /// Share of present cells, 0-100. Zero for an empty table.
    pub completeness_percent: f64,
    /// Number of columns per inferred type, in first-seen order.
    pub type_distribution: IndexMap<Type, usize>,
    /// Rough in-memory footprint of the present cells.
    pub memory_size_estimate_bytes: usize,
}

/// Result of profiling a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableProfile {
    pub summary: DatasetSummary,
    pub columns: IndexMap<String, ColumnStats>,
}

/// Approximate bytes held by one present cell: strings at two bytes per
/// character, numbers and dates at eight, booleans at one.
fn cell_size(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count() * 2,
        Value::Boolean(_) => 1,
        Value::Number(_) | Value::Date(_) => 8,
        Value::Null | Value::Missing => 0,
    }
}

#[derive(Debug, Clone)]
struct ColumnAccumulator {
    name: String,
    present: Vec<Value>,
    missing: usize,
}

impl ColumnAccumulator {
    fn new(name: String) -> Self {
        Self {
            name,
            present: Vec::new(),
            missing: 0,
        }
    }
}

/// Mergeable partial state for profiling a table in chunks.
///
/// The column set is fixed by the first row ever pushed. Rows lacking one of
/// those columns count it as missing; columns the first row did not have are
/// ignored.
///
/// # Example
///
/// ```
/// use datascope::{CsvReader, TableAccumulator, TableProfiler};
///
/// let reader = CsvReader::new();
/// let mut left = TableAccumulator::new();
/// left.push_rows(&reader.read_str("a\n1\n2\n").unwrap());
/// let mut right = TableAccumulator::new();
/// right.push_rows(&reader.read_str("a\n3\n").unwrap());
///
/// left.merge(right);
/// let profile = left.finish(&TableProfiler::new());
/// assert_eq!(profile.summary.row_count, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableAccumulator {
    columns: Vec<ColumnAccumulator>,
    rows: usize,
    memory_bytes: usize,
    initialized: bool,
}

impl TableAccumulator {
    /// Create an empty accumulator; the first row fixes the columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accumulator with a known column set.
    pub fn with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names
                .into_iter()
                .map(|n| ColumnAccumulator::new(n.into()))
                .collect(),
            initialized: true,
            ..Self::default()
        }
    }

    /// Number of rows seen so far.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Add a single row.
    pub fn push_row(&mut self, row: &Record) {
        if !self.initialized {
            self.columns = row.keys().cloned().map(ColumnAccumulator::new).collect();
            self.initialized = true;
        }

        for column in &mut self.columns {
            match row.get(&column.name) {
                Some(value) if !value.is_missing() => {
                    self.memory_bytes += cell_size(value);
                    column.present.push(value.clone());
                }
                _ => column.missing += 1,
            }
        }
        self.rows += 1;
    }

    /// Add a chunk of rows.
    pub fn push_rows(&mut self, rows: &[Record]) {
        for row in rows {
            self.push_row(row);
        }
    }

    /// Fold another accumulator's rows into this one.
    ///
    /// Rows from `other` are treated as coming after this accumulator's rows.
    /// Columns `other` never saw are counted as missing for its rows.
    pub fn merge(&mut self, mut other: TableAccumulator) {
        if !self.initialized {
            *self = other;
            return;
        }
        if !other.initialized {
            return;
        }

        for column in &mut self.columns {
            match other.columns.iter_mut().find(|c| c.name == column.name) {
                Some(theirs) => {
                    self.memory_bytes += theirs.present.iter().map(cell_size).sum::<usize>();
                    column.present.append(&mut theirs.present);
                    column.missing += theirs.missing;
                }
                None => column.missing += other.rows,
            }
        }
        self.rows += other.rows;
    }

    /// Profile every column and assemble the dataset summary.
    pub fn finish(self, profiler: &TableProfiler) -> TableProfile {
        let rows = self.rows;
        let column_profiler = &profiler.columns;

        let stats: Vec<ColumnStats> = self
            .columns
            .into_par_iter()
            .map(|c| column_profiler.profile_present(&c.name, &c.present, c.missing))
            .collect();

        let column_count = stats.len();
        let total_cells = rows * column_count;
        let missing_cells: usize = stats.iter().map(|c| c.missing).sum();
        let completeness_percent = if total_cells == 0 {
            0.0
        } else {
            (total_cells - missing_cells) as f64 / total_cells as f64 * 100.0
        };

        let mut type_distribution: IndexMap<Type, usize> = IndexMap::new();
        for column in &stats {
            *type_distribution.entry(column.column_type).or_insert(0) += 1;
        }

        let summary = DatasetSummary {
            row_count: rows,
            column_count,
            completeness_percent,
            type_distribution,
            memory_size_estimate_bytes: self.memory_bytes,
        };

        tracing::debug!(
            rows,
            columns = column_count,
            completeness = completeness_percent,
            "profiled table"
        );

        TableProfile {
            summary,
            columns: stats.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }
}

/// Profiles tabular records column by column.
///
/// # Example
///
/// ```
/// use datascope::{CsvReader, TableProfiler, Type};
///
/// let rows = CsvReader::new().read_str("id,name\n1,Ann\n2,Bo\n3,\n").unwrap();
/// let profile = TableProfiler::new().profile(&rows);
///
/// assert_eq!(profile.summary.row_count, 3);
/// assert_eq!(profile.columns["id"].column_type, Type::Number);
/// assert_eq!(profile.columns["name"].missing, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableProfiler {
    columns: ColumnProfiler,
}

impl TableProfiler {
    /// Create a profiler with default settings.
    pub fn new() -> Self {
        Self {
            columns: ColumnProfiler::new(),
        }
    }

    /// Set the date preference for ambiguous date parsing.
    pub fn date_preference(&mut self, date_preference: DatePreference) -> &mut Self {
        self.columns.date_preference(date_preference);
        self
    }

    /// Set how many leading values are checked for date promotion.
    pub fn date_sample_size(&mut self, size: usize) -> &mut Self {
        self.columns.date_sample_size(size);
        self
    }

    /// Set how many top values string columns report.
    pub fn top_values(&mut self, count: usize) -> &mut Self {
        self.columns.top_values(count);
        self
    }

    /// The column-level profiler this table profiler delegates to.
    pub fn column_profiler(&self) -> &ColumnProfiler {
        &self.columns
    }

    /// Profile a complete set of rows.
    #[tracing::instrument(level = "debug", skip_all, fields(rows = rows.len()))]
    pub fn profile(&self, rows: &[Record]) -> TableProfile {
        let mut acc = TableAccumulator::new();
        acc.push_rows(rows);
        acc.finish(self)
    }

    /// Profile rows arriving in chunks, threading one accumulator through.
    pub fn profile_chunks<'a, I>(&self, chunks: I) -> TableProfile
    where
        I: IntoIterator<Item = &'a [Record]>,
    {
        let mut acc = TableAccumulator::new();
        for chunk in chunks {
            acc.push_rows(chunk);
        }
        acc.finish(self)
    }
}
