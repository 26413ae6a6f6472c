//! Type detection for cells and columns.

use crate::field_type::Type;
use crate::options::DatePreference;
use crate::regexes::FLOAT_PATTERN;
use crate::temporal::is_date;
use crate::value::Value;

/// Integers longer than this stay text; they are identifiers, not quantities,
/// and would lose precision as `f64`.
const MAX_INTEGER_DIGITS: usize = 15;

/// Check for boolean literals using exhaustive match instead of regex.
/// This is a hot path optimization - called for every cell.
#[inline]
fn parse_boolean(s: &str) -> Option<bool> {
    match s {
        "true" | "TRUE" | "True" => Some(true),
        "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Check for numeric text. Whitespace around the number is tolerated.
#[inline]
fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !FLOAT_PATTERN.is_match(trimmed) {
        return None;
    }

    let is_integer = !trimmed.contains(['.', 'e', 'E']);
    let digits = trimmed.bytes().filter(u8::is_ascii_digit).count();
    if is_integer && digits > MAX_INTEGER_DIGITS {
        return None;
    }

    trimmed.parse().ok()
}

/// Convert a single raw cell into a typed value.
///
/// Empty cells are `Missing`; boolean literals and numeric text are
/// converted; everything else is kept verbatim as a string.
pub fn detect_cell_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Missing;
    }

    if let Some(b) = parse_boolean(raw) {
        return Value::Boolean(b);
    }

    if let Some(n) = parse_number(raw) {
        return Value::Number(n);
    }

    Value::String(raw.to_string())
}

/// Infer the semantic type of a column from its present values.
///
/// A single primitive tag wins outright, except that an all-string column
/// whose first `date_sample_size` values all parse as dates becomes `Date`.
/// Several tags make the column `Mixed`. With no values at all the column
/// falls back to `String`.
pub fn infer_column_type(
    values: &[Value],
    date_preference: DatePreference,
    date_sample_size: usize,
) -> Type {
    let mut tags = values.iter().filter_map(Value::tag);
    let Some(first) = tags.next() else {
        return Type::String;
    };

    let merged = tags.fold(first, Type::merge);
    if merged != Type::String {
        return merged;
    }

    let looks_like_dates = values
        .iter()
        .filter(|v| !v.is_missing())
        .take(date_sample_size.max(1))
        .all(|v| v.as_str().is_some_and(|s| is_date(s, date_preference)));

    if looks_like_dates { Type::Date } else { Type::String }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MDY: DatePreference = DatePreference::MdyFormat;

    #[test]
    fn test_detect_cell_value() {
        assert_eq!(detect_cell_value("123"), Value::Number(123.0));
        assert_eq!(detect_cell_value("-12.5"), Value::Number(-12.5));
        assert_eq!(detect_cell_value(" 7 "), Value::Number(7.0));
        assert_eq!(detect_cell_value("1e3"), Value::Number(1000.0));
        assert_eq!(detect_cell_value("true"), Value::Boolean(true));
        assert_eq!(detect_cell_value("FALSE"), Value::Boolean(false));
        assert_eq!(detect_cell_value("yes"), Value::from("yes"));
        assert_eq!(detect_cell_value("2023-12-31"), Value::from("2023-12-31"));
        assert_eq!(detect_cell_value(""), Value::Missing);
        assert_eq!(detect_cell_value(" "), Value::from(" "));
    }

    #[test]
    fn test_long_integers_stay_text() {
        assert_eq!(
            detect_cell_value("12345678901234567890"),
            Value::from("12345678901234567890")
        );
        assert_eq!(
            detect_cell_value("123456789012345"),
            Value::Number(123_456_789_012_345.0)
        );
    }

    #[test]
    fn test_infer_single_tag() {
        let values = vec![Value::from(1.0), Value::from(2.0)];
        assert_eq!(infer_column_type(&values, MDY, 10), Type::Number);

        let values = vec![Value::from(true), Value::from(false)];
        assert_eq!(infer_column_type(&values, MDY, 10), Type::Boolean);
    }

    #[test]
    fn test_infer_mixed() {
        let values = vec![Value::from(1.0), Value::from("a")];
        assert_eq!(infer_column_type(&values, MDY, 10), Type::Mixed);
    }

    #[test]
    fn test_infer_date_promotion() {
        let values: Vec<Value> = ["2023-01-01", "2023-01-02", "01/03/2023"]
            .into_iter()
            .map(Value::from)
            .collect();
        assert_eq!(infer_column_type(&values, MDY, 10), Type::Date);

        let values: Vec<Value> = ["2023-01-01", "soon"].into_iter().map(Value::from).collect();
        assert_eq!(infer_column_type(&values, MDY, 10), Type::String);
    }

    #[test]
    fn test_date_promotion_only_samples_prefix() {
        let mut values: Vec<Value> = (1..=10)
            .map(|d| Value::from(format!("2023-01-{d:02}")))
            .collect();
        values.push(Value::from("not a date"));

        assert_eq!(infer_column_type(&values, MDY, 10), Type::Date);
        assert_eq!(infer_column_type(&values, MDY, 11), Type::String);
    }

    #[test]
    fn test_infer_empty_defaults_to_string() {
        assert_eq!(infer_column_type(&[], MDY, 10), Type::String);
        assert_eq!(infer_column_type(&[Value::Null], MDY, 10), Type::String);
    }
}
