//! Lookups over a document and its path index: wildcard search, direct
//! resolution, structural diff and flattening.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::walker::{EMPTY_KEY, NodeType, PathEntry, PathIndex, TreeWalker};

/// Split a dotted path into raw segments on unescaped dots. The root path
/// has none.
fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in path.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '.' => {
                out.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&path[start..]);
    out
}

/// Object key named by a raw segment.
fn unescape(segment: &str) -> Cow<'_, str> {
    if segment == EMPTY_KEY {
        return Cow::Borrowed("");
    }
    if !segment.contains('\\') {
        return Cow::Borrowed(segment);
    }
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Entries whose path matches `pattern`, in index order.
///
/// `*` matches exactly one segment; every other segment must match
/// literally, and the segment counts must agree. Patterns use the same
/// escaping as indexed paths (`\.` for a dot inside a key).
///
/// # Example
///
/// ```
/// use datascope::{TreeWalker, find_by_pattern, parse_json};
///
/// let doc = parse_json(r#"{"a": [{"c": 1}, {"c": 2, "d": 3}]}"#).unwrap();
/// let index = TreeWalker::new().walk(&doc).paths;
/// let hits: Vec<&str> = find_by_pattern(&index, "a.*.c")
///     .iter()
///     .map(|e| e.path.as_str())
///     .collect();
/// assert_eq!(hits, ["a.0.c", "a.1.c"]);
/// ```
pub fn find_by_pattern<'a>(index: &'a PathIndex, pattern: &str) -> Vec<&'a PathEntry> {
    let wanted = segments(pattern);
    index
        .values()
        .filter(|entry| {
            let have = segments(&entry.path);
            have.len() == wanted.len()
                && wanted
                    .iter()
                    .zip(&have)
                    .all(|(w, h)| *w == "*" || w == h)
        })
        .collect()
}

/// Follow a dotted path from `root`. Object segments are (escaped) keys,
/// array segments are indices. `None` when any segment is absent.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path)
        .into_iter()
        .try_fold(root, |current, segment| match current {
            Value::Object(map) => map.get(&*unescape(segment)),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Leaf path to leaf value, in index order.
pub fn flatten(index: &PathIndex) -> IndexMap<String, Value> {
    index
        .values()
        .filter_map(|entry| entry.value.clone().map(|v| (entry.path.clone(), v)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Changed,
}

/// One difference between two documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: DiffKind,
    /// Value in the first document, absent for additions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<Value>,
    /// Value in the second document, absent for removals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<Value>,
}

/// Structural differences from `a` to `b`.
///
/// Paths only in `a` are removals, paths only in `b` additions. Every
/// shared path whose values differ is reported as changed, so a changed leaf
/// also marks each of its ancestors up to the root. Entries follow `a`'s
/// path order, then `b`'s additions in `b`'s order.
pub fn diff(a: &Value, b: &Value) -> Vec<DiffEntry> {
    let walker = TreeWalker::new();
    let left = walker.walk(a).paths;
    let right = walker.walk(b).paths;

    let mut out = Vec::new();
    for path in left.keys() {
        let original = resolve(a, path);
        if !right.contains_key(path) {
            out.push(DiffEntry {
                path: path.clone(),
                kind: DiffKind::Removed,
                original: original.cloned(),
                new: None,
            });
            continue;
        }
        let new = resolve(b, path);
        if original != new {
            out.push(DiffEntry {
                path: path.clone(),
                kind: DiffKind::Changed,
                original: original.cloned(),
                new: new.cloned(),
            });
        }
    }

    for path in right.keys().filter(|p| !left.contains_key(*p)) {
        out.push(DiffEntry {
            path: path.clone(),
            kind: DiffKind::Added,
            original: None,
            new: resolve(b, path).cloned(),
        });
    }

    tracing::debug!(differences = out.len(), "diffed documents");
    out
}

/// Convenience: the `NodeType` of whatever sits at `path`.
pub fn type_at(root: &Value, path: &str) -> Option<NodeType> {
    resolve(root, path).map(NodeType::of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index(doc: &Value) -> PathIndex {
        TreeWalker::new().walk(doc).paths
    }

    #[test]
    fn test_wildcard_matches_single_segment() {
        let doc = json!({"a": [{"c": 1}, {"c": 2}], "b": {"c": {"d": 3}}});
        let idx = index(&doc);
        let hits: Vec<&str> = find_by_pattern(&idx, "a.*.c")
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(hits, vec!["a.0.c", "a.1.c"]);

        let doc = json!({"a": {"b": {"c": {"d": 1}}}});
        let idx = index(&doc);
        assert!(find_by_pattern(&idx, "a.*.c").is_empty());
        assert_eq!(find_by_pattern(&idx, "a.b.c.d").len(), 1);
    }

    #[test]
    fn test_root_pattern() {
        let idx = index(&json!({"a": 1}));
        let hits = find_by_pattern(&idx, "");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "");
        assert_eq!(find_by_pattern(&idx, "*").len(), 1);
    }

    #[test]
    fn test_resolve() {
        let doc = json!({"a": [10, {"b": null}], "x": "y"});
        assert_eq!(resolve(&doc, ""), Some(&doc));
        assert_eq!(resolve(&doc, "a.0"), Some(&json!(10)));
        assert_eq!(resolve(&doc, "a.1.b"), Some(&Value::Null));
        assert_eq!(resolve(&doc, "a.2"), None);
        assert_eq!(resolve(&doc, "a.first"), None);
        assert_eq!(resolve(&doc, "x.len"), None);
        assert_eq!(type_at(&doc, "a"), Some(NodeType::Array));
    }

    #[test]
    fn test_resolve_matches_index() {
        let doc = json!({"a": {"b": [1, "two", false, null]}, "c": 3.5});
        for (path, value) in flatten(&index(&doc)) {
            assert_eq!(resolve(&doc, &path), Some(&value), "path {path}");
        }
    }

    #[test]
    fn test_flatten_leaves_only() {
        let flat = flatten(&index(&json!({"a": {"b": 1}, "c": [true]})));
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a.b", "c.0"]);
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let doc = json!({"a": [1, {"b": "x"}], "c": null});
        assert!(diff(&doc, &doc).is_empty());
    }

    #[test]
    fn test_diff_added_key() {
        let a = json!({"a": 1, "n": {"x": 1}});
        let b = json!({"a": 1, "n": {"x": 1}, "z": true});
        let changes = diff(&a, &b);
        assert_eq!(
            changes,
            vec![DiffEntry {
                path: "z".to_string(),
                kind: DiffKind::Added,
                original: None,
                new: Some(json!(true)),
            }]
        );
    }

    #[test]
    fn test_diff_changes_and_removals() {
        let a = json!({"a": 1, "b": {"c": 2}, "d": [1, 2], "e": "gone"});
        let b = json!({"a": 2, "b": {"c": 2}, "d": {"0": 1}, "f": [9]});
        let changes: Vec<(String, DiffKind)> = diff(&a, &b)
            .into_iter()
            .map(|d| (d.path, d.kind))
            .collect();

        assert_eq!(
            changes,
            vec![
                ("".to_string(), DiffKind::Changed),
                ("a".to_string(), DiffKind::Changed),
                ("d".to_string(), DiffKind::Changed),
                ("d.1".to_string(), DiffKind::Removed),
                ("e".to_string(), DiffKind::Removed),
                ("f".to_string(), DiffKind::Added),
                ("f.0".to_string(), DiffKind::Added),
            ]
        );
    }

    #[test]
    fn test_diff_marks_changed_ancestors() {
        let a = json!({"outer": {"inner": {"v": 1}}, "same": [1]});
        let b = json!({"outer": {"inner": {"v": 2}}, "same": [1]});
        let changes = diff(&a, &b);

        let paths: Vec<&str> = changes.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["", "outer", "outer.inner", "outer.inner.v"]);
        assert!(changes.iter().all(|d| d.kind == DiffKind::Changed));

        let leaf = &changes[3];
        assert_eq!(leaf.original, Some(json!(1)));
        assert_eq!(leaf.new, Some(json!(2)));
        assert_eq!(changes[0].original, Some(a));
    }

    #[test]
    fn test_diff_scalar_change_reports_root() {
        let changes: Vec<(String, DiffKind)> = diff(&json!({"a": 1}), &json!({"a": 2}))
            .into_iter()
            .map(|d| (d.path, d.kind))
            .collect();
        assert_eq!(
            changes,
            vec![
                ("".to_string(), DiffKind::Changed),
                ("a".to_string(), DiffKind::Changed),
            ]
        );
    }

    #[test]
    fn test_segments_split_on_unescaped_dots() {
        assert!(segments("").is_empty());
        assert_eq!(segments("a.b"), vec!["a", "b"]);
        assert_eq!(segments("a\\.b.c"), vec!["a\\.b", "c"]);
        assert_eq!(segments("w\\\\.x"), vec!["w\\\\", "x"]);
        assert_eq!(unescape("a\\.b"), "a.b");
        assert_eq!(unescape("w\\\\"), "w\\");
        assert_eq!(unescape(EMPTY_KEY), "");
    }

    #[test]
    fn test_keys_with_dots_and_empty_keys_resolve() {
        let doc = json!({"x.y": 7, "x": {"y": 8}, "": {"": [null]}, "b\\s": 1});
        let idx = index(&doc);

        assert_eq!(resolve(&doc, "x\\.y"), Some(&json!(7)));
        assert_eq!(resolve(&doc, "x.y"), Some(&json!(8)));
        assert_eq!(resolve(&doc, "\\0.\\0.0"), Some(&Value::Null));
        assert_eq!(resolve(&doc, "b\\\\s"), Some(&json!(1)));
        for (path, value) in flatten(&idx) {
            assert_eq!(resolve(&doc, &path), Some(&value), "path {path}");
        }

        let hits: Vec<&str> = find_by_pattern(&idx, "*.y")
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(hits, vec!["x.y"]);
        assert_eq!(find_by_pattern(&idx, "x\\.y").len(), 1);
    }
}
