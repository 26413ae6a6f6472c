//! Delimited text and JSON rows into typed records.

use foldhash::{HashSet, HashSetExt};

use super::type_inference::detect_cell_value;
use crate::error::{AnalysisError, Result};
use crate::value::{Record, Value};

/// Reader for delimited text with a header row.
///
/// # Example
///
/// ```
/// use datascope::{CsvReader, Value};
///
/// let rows = CsvReader::new().read_str("name,age\nAlice,30\n\nBob,\n").unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0]["age"], Value::Number(30.0));
/// assert_eq!(rows[1]["age"], Value::Missing);
/// ```
#[derive(Debug, Clone)]
pub struct CsvReader {
    /// Field delimiter.
    delimiter: u8,
    /// Quote character, or `None` to disable quoting.
    quote: Option<u8>,
    /// Whether rows may have a different field count than the header.
    flexible: bool,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReader {
    /// Create a reader for comma-separated, double-quoted text.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote: Some(b'"'),
            flexible: true,
        }
    }

    /// Set the field delimiter.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the quote character (`None` disables quoting).
    pub fn quote(&mut self, quote: Option<u8>) -> &mut Self {
        self.quote = quote;
        self
    }

    /// Allow or reject rows whose field count differs from the header's.
    pub fn flexible(&mut self, flexible: bool) -> &mut Self {
        self.flexible = flexible;
        self
    }

    /// Parse delimited text into records keyed by the header row.
    ///
    /// Blank lines are skipped. Short rows leave their trailing columns
    /// `Missing`; fields past the header width are dropped.
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = text.len()))]
    pub fn read_str(&self, text: &str) -> Result<Vec<Record>> {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(self.flexible);

        match self.quote {
            None => {
                builder.quoting(false);
            }
            Some(q) => {
                builder.quoting(true);
                builder.quote(q);
            }
        }

        let mut reader = builder.from_reader(text.as_bytes());
        let headers = unique_headers(reader.headers()?);

        let mut rows = Vec::new();
        let mut overflow_rows = 0usize;
        let mut record = csv::StringRecord::new();

        while reader.read_record(&mut record)? {
            if record.len() == 1 && record[0].is_empty() {
                continue;
            }
            if record.len() > headers.len() {
                overflow_rows += 1;
            }

            let row: Record = headers
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let value = record.get(idx).map_or(Value::Missing, detect_cell_value);
                    (name.clone(), value)
                })
                .collect();
            rows.push(row);
        }

        if overflow_rows > 0 {
            tracing::warn!(
                rows = overflow_rows,
                "rows had more fields than the header; extra fields ignored"
            );
        }
        tracing::debug!(rows = rows.len(), columns = headers.len(), "parsed delimited text");

        Ok(rows)
    }
}

/// Header names with repeats renamed `name_1`, `name_2`, ... so every
/// column keeps its own key.
fn unique_headers(raw: &csv::StringRecord) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut renamed = 0usize;
    let names = raw
        .iter()
        .map(|name| {
            let mut candidate = name.to_string();
            let mut suffix = 0usize;
            while seen.contains(&candidate) {
                suffix += 1;
                candidate = format!("{name}_{suffix}");
            }
            if suffix > 0 {
                renamed += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect();

    if renamed > 0 {
        tracing::warn!(columns = renamed, "duplicate header names renamed");
    }
    names
}

/// Convert a parsed JSON array of objects into records.
///
/// Scalars map onto [`Value`]; nested arrays and objects are kept as their
/// JSON text. Anything other than an array of objects is rejected.
pub fn records_from_json(value: &serde_json::Value) -> Result<Vec<Record>> {
    let serde_json::Value::Array(items) = value else {
        return Err(AnalysisError::InvalidInput(
            "tabular JSON must be an array of objects".to_string(),
        ));
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| match item {
            serde_json::Value::Object(map) => Ok(map
                .iter()
                .map(|(key, v)| (key.clone(), Value::from(v)))
                .collect()),
            _ => Err(AnalysisError::InvalidInput(format!(
                "row {idx} is not a JSON object"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_simple_csv() {
        let rows = CsvReader::new()
            .read_str("a,b,c\n1,x,true\n2,y,false\n")
            .unwrap();

        assert_eq!(rows.len(), 2);
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(rows[0]["a"], Value::Number(1.0));
        assert_eq!(rows[0]["b"], Value::from("x"));
        assert_eq!(rows[1]["c"], Value::Boolean(false));
    }

    #[test]
    fn test_read_quoted_csv() {
        let rows = CsvReader::new()
            .read_str("\"a,b\",c\n\"hello, world\",3\n")
            .unwrap();
        assert_eq!(rows[0]["a,b"], Value::from("hello, world"));
    }

    #[test]
    fn test_ragged_rows_and_blank_lines() {
        let rows = CsvReader::new()
            .read_str("a,b,c\n1,2\n\n4,5,6,7\n")
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["c"], Value::Missing);
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1]["c"], Value::Number(6.0));
    }

    #[test]
    fn test_strict_rejects_ragged_rows() {
        let result = CsvReader::new().flexible(false).read_str("a,b\n1\n");
        assert!(matches!(result, Err(AnalysisError::Csv(_))));
    }

    #[test]
    fn test_custom_delimiter() {
        let rows = CsvReader::new()
            .delimiter(b';')
            .read_str("a;b\n1;2\n")
            .unwrap();
        assert_eq!(rows[0]["b"], Value::Number(2.0));
    }

    #[test]
    fn test_duplicate_headers_are_renamed() {
        let rows = CsvReader::new().read_str("a,a,a_1,a\n1,x,true,2\n").unwrap();
        let names: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "a_1", "a_1_1", "a_2"]);
        assert_eq!(rows[0]["a"], Value::Number(1.0));
        assert_eq!(rows[0]["a_1"], Value::String("x".to_string()));
        assert_eq!(rows[0]["a_1_1"], Value::Boolean(true));
        assert_eq!(rows[0]["a_2"], Value::Number(2.0));
    }

    #[test]
    fn test_header_only() {
        let rows = CsvReader::new().read_str("a,b\n").unwrap();
        assert!(rows.is_empty());
        assert!(CsvReader::new().read_str("").unwrap().is_empty());
    }

    #[test]
    fn test_records_from_json() {
        let json = serde_json::json!([{"a": 1, "b": null}, {"a": "x", "c": [1]}]);
        let rows = records_from_json(&json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["b"], Value::Null);
        assert_eq!(rows[1]["c"], Value::from("[1]"));

        assert!(records_from_json(&serde_json::json!({"a": 1})).is_err());
        assert!(records_from_json(&serde_json::json!([1, 2])).is_err());
    }
}
