//! Tabular input: reading rows, inferring column types, and profiling.

pub mod column;
pub mod profiler;
pub mod reader;
pub mod type_inference;

pub use column::{
    BooleanStats, ColumnProfiler, ColumnStats, DateStats, MixedStats, NumericStats, StringStats,
    TopValue, TypeStats,
};
pub use profiler::{DatasetSummary, TableAccumulator, TableProfile, TableProfiler};
pub use reader::{CsvReader, records_from_json};
pub use type_inference::{detect_cell_value, infer_column_type};
