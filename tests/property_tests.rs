//! Property-based tests for datascope.
//!
//! Invariants checked over generated inputs:
//! - order statistics: the median is the interpolated 50th percentile, does
//!   not depend on input order, and sits with the mean inside `[min, max]`
//! - histogram counts add up to the number of observations
//! - table profiles: `unique <= count`, `count + missing == rows`, and
//!   chunked accumulation equals a single pass
//! - documents: every flattened leaf resolves to its own value (keys may
//!   hold dots, backslashes or be empty), paths are unique, and a document
//!   never differs from itself

use datascope::stats::percentile;
use datascope::{
    DiffKind, Record, StatisticalCalculator, TableAccumulator, TableProfiler, TreeWalker, Value,
    diff, flatten, resolve,
};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

fn arb_series() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6..1.0e6f64, 1..200)
}

fn arb_cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Missing),
        Just(Value::Null),
        (-3i32..3).prop_map(|n| Value::Number(f64::from(n))),
        "[ab]{0,2}".prop_map(Value::String),
        any::<bool>().prop_map(Value::Boolean),
    ]
}

fn arb_table() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(prop::collection::vec(arb_cell(), 3), 0..40).prop_map(|rows| {
        rows.into_iter()
            .map(|cells| {
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (format!("c{i}"), v))
                    .collect()
            })
            .collect()
    })
}

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        (-1000i64..1000).prop_map(serde_json::Value::from),
        "[a-z ]{0,6}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
            prop::collection::vec(("[a-z.\\\\]{0,3}", inner), 0..4)
                .prop_map(|entries| serde_json::Value::Object(entries.into_iter().collect())),
        ]
    })
}

fn sorted(data: &[f64]) -> Vec<f64> {
    let mut s = data.to_vec();
    s.sort_by(f64::total_cmp);
    s
}

// ============================================================================
// Statistics
// ============================================================================

proptest! {
    #[test]
    fn test_median_is_interpolated_percentile(data in arb_series()) {
        let mut calc = StatisticalCalculator::new();
        calc.set_data(data.iter().copied());
        let median = calc.calculate().descriptive.as_ref().unwrap().median;

        prop_assert_eq!(Some(median), percentile(&sorted(&data), 50.0));

        let mut reversed = data.clone();
        reversed.reverse();
        calc.set_data(reversed);
        prop_assert_eq!(calc.calculate().descriptive.as_ref().unwrap().median, median);
    }

    #[test]
    fn test_location_within_range(data in arb_series()) {
        let mut calc = StatisticalCalculator::new();
        calc.set_data(data);
        let d = calc.calculate().descriptive.clone().unwrap();
        let tolerance = 1e-9 * d.max.abs().max(d.min.abs()).max(1.0);

        prop_assert!(d.min <= d.mean + tolerance);
        prop_assert!(d.mean <= d.max + tolerance);
        prop_assert!(d.min <= d.median && d.median <= d.max);
        prop_assert!(d.quartiles.q1 <= d.quartiles.q3);
        prop_assert!(d.variance >= 0.0);
    }

    #[test]
    fn test_histogram_counts_every_value(data in arb_series(), bins in 1usize..30) {
        let mut calc = StatisticalCalculator::new();
        calc.set_data(data.iter().copied())
            .bin_rule(datascope::BinRule::Fixed(bins));
        let hist = &calc.calculate().distribution.as_ref().unwrap().histogram;

        prop_assert_eq!(hist.counts.len(), bins);
        prop_assert_eq!(hist.bin_edges.len(), bins + 1);
        prop_assert_eq!(hist.counts.iter().sum::<usize>(), data.len());
    }
}

// ============================================================================
// Tables
// ============================================================================

proptest! {
    #[test]
    fn test_column_counts_are_consistent(rows in arb_table()) {
        let profile = TableProfiler::new().profile(&rows);
        prop_assert_eq!(profile.summary.row_count, rows.len());

        for column in profile.columns.values() {
            prop_assert!(column.unique <= column.count);
            prop_assert_eq!(column.count + column.missing, rows.len());
        }
        prop_assert!(profile.summary.completeness_percent >= 0.0);
        prop_assert!(profile.summary.completeness_percent <= 100.0);
    }

    #[test]
    fn test_chunked_equals_single_pass(rows in arb_table(), chunk in 1usize..7) {
        let profiler = TableProfiler::new();

        let mut acc = TableAccumulator::new();
        for part in rows.chunks(chunk) {
            let mut partial = TableAccumulator::new();
            partial.push_rows(part);
            acc.merge(partial);
        }

        prop_assert_eq!(acc.finish(&profiler), profiler.profile(&rows));
    }
}

// ============================================================================
// Documents
// ============================================================================

proptest! {
    #[test]
    fn test_leaves_resolve_to_indexed_values(doc in arb_json()) {
        let index = TreeWalker::new().walk(&doc).paths;
        for (path, value) in flatten(&index) {
            prop_assert_eq!(resolve(&doc, &path), Some(&value));
        }
    }

    #[test]
    fn test_every_node_gets_its_own_path(doc in arb_json()) {
        fn count(value: &serde_json::Value) -> usize {
            1 + match value {
                serde_json::Value::Object(map) => map.values().map(count).sum(),
                serde_json::Value::Array(items) => items.iter().map(count).sum(),
                _ => 0,
            }
        }
        prop_assert_eq!(TreeWalker::new().walk(&doc).paths.len(), count(&doc));
    }

    #[test]
    fn test_document_has_no_self_diff(doc in arb_json()) {
        prop_assert!(diff(&doc, &doc).is_empty());
    }

    #[test]
    fn test_adding_a_key_is_one_addition(doc in arb_json(), value in any::<i32>()) {
        let mut root = serde_json::Map::new();
        root.insert("base".to_string(), doc);
        let a = serde_json::Value::Object(root.clone());
        root.insert("extra".to_string(), serde_json::Value::from(value));
        let b = serde_json::Value::Object(root);

        let additions: Vec<_> = diff(&a, &b)
            .into_iter()
            .filter(|d| d.kind == DiffKind::Added)
            .collect();
        prop_assert_eq!(additions.len(), 1);
        prop_assert_eq!(additions[0].path.as_str(), "extra");
    }
}
