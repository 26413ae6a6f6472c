//! datascope: profiling and exploration for tabular, hierarchical and
//! numeric data.
//!
//! Four analyses share one value model:
//!
//! - [`TableProfiler`] infers a type for every column of a table and
//!   computes per-column and dataset-wide statistics.
//! - [`TreeWalker`] maps the structure of a JSON document into a path index,
//!   which [`find_by_pattern`], [`resolve`] and [`diff`] query.
//! - [`StatisticalCalculator`] describes a numeric series: moments,
//!   normality checks, histogram, density estimate, serial correlation.
//! - [`TimeSeries`] orders dated values and reports trend and regularity.
//!
//! # Quick Start
//!
//! ```
//! use datascope::{CsvReader, StatisticalCalculator, TableProfiler, Type};
//!
//! let rows = CsvReader::new()
//!     .read_str("city,temp\nOslo,4.5\nRome,18\nLima,\n")
//!     .unwrap();
//!
//! let profile = TableProfiler::new().profile(&rows);
//! assert_eq!(profile.columns["temp"].column_type, Type::Number);
//! assert_eq!(profile.columns["temp"].missing, 1);
//!
//! let mut calc = StatisticalCalculator::new();
//! calc.set_values(&rows.iter().map(|r| r["temp"].clone()).collect::<Vec<_>>());
//! let mean = calc.calculate().descriptive.as_ref().unwrap().mean;
//! assert_eq!(mean, 11.25);
//! ```
//!
//! # Configuration
//!
//! Every analysis is configured through a builder whose setters return
//! `&mut Self`:
//!
//! ```
//! use datascope::{StatisticalCalculator, TableProfiler};
//! use datascope::options::{Bandwidth, BinRule, DatePreference};
//!
//! let mut profiler = TableProfiler::new();
//! profiler
//!     .date_preference(DatePreference::DmyFormat)
//!     .date_sample_size(20)
//!     .top_values(3);
//!
//! let mut calc = StatisticalCalculator::new();
//! calc.bin_rule(BinRule::Rice).bandwidth(Bandwidth::Fixed(0.5));
//! ```
//!
//! Results are plain `serde::Serialize` data; not-enough-data cases come back
//! as `None` rather than errors.

mod encoding;
mod error;
mod field_type;
pub mod options;
mod regexes;
pub mod stats;
pub mod tabular;
mod temporal;
pub mod timeseries;
pub mod tree;
mod value;

pub use encoding::{decode_text, read_text_file};
pub use error::{AnalysisError, Result};
pub use field_type::Type;
pub use options::{Bandwidth, BinRule, DatePreference};
pub use stats::{StatisticalCalculator, StatisticalSummary};
pub use tabular::{
    ColumnProfiler, ColumnStats, CsvReader, DatasetSummary, TableAccumulator, TableProfile,
    TableProfiler, TypeStats, records_from_json,
};
pub use temporal::parse_date;
pub use timeseries::{TimePoint, TimeSeries, TimeSeriesAnalysis};
pub use tree::{
    DiffEntry, DiffKind, NodeType, PathEntry, TreeAnalysis, TreeWalker, diff, find_by_pattern,
    flatten, parse_json, resolve,
};
pub use value::{Record, Value};
