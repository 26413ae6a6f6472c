//! Depth-first walk over a JSON document: structure map, path index and
//! structural statistics in a single pass.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Default depth past which nodes are truncated.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Kind of a node in a JSON tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
    /// Placeholder for a subtree cut off by the depth limit.
    Truncated,
}

impl NodeType {
    /// Kind of a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => NodeType::Object,
            Value::Array(_) => NodeType::Array,
            Value::String(_) => NodeType::String,
            Value::Number(_) => NodeType::Number,
            Value::Bool(_) => NodeType::Boolean,
            Value::Null => NodeType::Null,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            NodeType::Object => "object",
            NodeType::Array => "array",
            NodeType::String => "string",
            NodeType::Number => "number",
            NodeType::Boolean => "boolean",
            NodeType::Null => "null",
            NodeType::Truncated => "truncated",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structure map of a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode {
    Leaf {
        #[serde(rename = "type")]
        node_type: NodeType,
        value: Value,
    },
    Internal {
        #[serde(rename = "type")]
        node_type: NodeType,
        children: IndexMap<String, TreeNode>,
    },
    Truncated,
}

/// One entry of the flattened path index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// The value itself, for leaves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Number of children, for objects and arrays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_count: Option<usize>,
    pub depth: usize,
}

/// Path string to entry, in pre-order.
pub type PathIndex = IndexMap<String, PathEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthStats {
    pub min: usize,
    pub max: usize,
    pub avg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberStats {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: usize,
    pub avg: f64,
}

/// Aggregate facts about a document's shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureStats {
    /// Sum of key counts over every object.
    pub total_keys: usize,
    pub max_depth: usize,
    pub array_count: usize,
    /// Leaf tallies for strings, numbers and booleans, in first-seen order.
    pub value_type_counts: IndexMap<NodeType, usize>,
    pub null_count: usize,
    /// Character lengths of string leaves; `None` without strings.
    pub string_length_stats: Option<LengthStats>,
    /// Numeric leaves; `None` without numbers.
    pub number_stats: Option<NumberStats>,
}

/// Result of walking a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeAnalysis {
    pub structure: TreeNode,
    pub paths: PathIndex,
    pub stats: StructureStats,
}

/// Path segment standing for the empty object key.
pub(crate) const EMPTY_KEY: &str = "\\0";

/// Path segment for an object key or array index: `\` and `.` are
/// backslash-escaped, the empty key becomes [`EMPTY_KEY`].
pub(crate) fn escape_key(key: &str) -> Cow<'_, str> {
    if key.is_empty() {
        return Cow::Borrowed(EMPTY_KEY);
    }
    if !key.contains(['.', '\\']) {
        return Cow::Borrowed(key);
    }
    let mut out = String::with_capacity(key.len() + 2);
    for c in key.chars() {
        if matches!(c, '.' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Join a child key onto a parent path; the root path is empty.
pub(crate) fn child_path(parent: &str, key: &str) -> String {
    let segment = escape_key(key);
    if parent.is_empty() {
        segment.into_owned()
    } else {
        format!("{parent}.{segment}")
    }
}

/// Running accumulators for the single walk.
#[derive(Default)]
struct Collector {
    paths: PathIndex,
    stats: StructureStats,
    string_lengths: Option<(usize, usize, usize, usize)>,
    numbers: Option<NumberStats>,
}

impl Collector {
    fn record_string(&mut self, len: usize) {
        self.string_lengths = Some(match self.string_lengths {
            Some((min, max, sum, count)) => (min.min(len), max.max(len), sum + len, count + 1),
            None => (len, len, len, 1),
        });
    }

    fn record_number(&mut self, n: f64) {
        let acc = self.numbers.get_or_insert(NumberStats {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
            avg: 0.0,
        });
        acc.min = acc.min.min(n);
        acc.max = acc.max.max(n);
        acc.sum += n;
        acc.count += 1;
    }

    fn finish(mut self, structure: TreeNode) -> TreeAnalysis {
        self.stats.string_length_stats = self.string_lengths.map(|(min, max, sum, count)| {
            LengthStats {
                min,
                max,
                avg: sum as f64 / count as f64,
            }
        });
        self.stats.number_stats = self.numbers.map(|mut n| {
            n.avg = n.sum / n.count as f64;
            n
        });

        TreeAnalysis {
            structure,
            paths: self.paths,
            stats: self.stats,
        }
    }
}

/// Walks JSON documents.
///
/// # Example
///
/// ```
/// use datascope::{TreeWalker, parse_json};
///
/// let doc = parse_json(r#"{"user": {"name": "Ann", "tags": ["a", "b"]}}"#).unwrap();
/// let analysis = TreeWalker::new().walk(&doc);
///
/// assert!(analysis.paths.contains_key("user.tags.1"));
/// assert_eq!(analysis.stats.max_depth, 3);
/// assert_eq!(analysis.stats.total_keys, 3);
/// ```
#[derive(Debug, Clone)]
pub struct TreeWalker {
    max_depth: usize,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeWalker {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the deepest level that is still expanded. Nodes below it are
    /// recorded as truncated.
    pub fn max_depth(&mut self, depth: usize) -> &mut Self {
        self.max_depth = depth;
        self
    }

    /// Walk a document, building its structure map, path index and stats.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn walk(&self, root: &Value) -> TreeAnalysis {
        let mut collector = Collector::default();
        let structure = self.visit(root, String::new(), 0, &mut collector);
        let analysis = collector.finish(structure);
        tracing::debug!(
            paths = analysis.paths.len(),
            max_depth = analysis.stats.max_depth,
            "walked document"
        );
        analysis
    }

    fn visit(&self, value: &Value, path: String, depth: usize, out: &mut Collector) -> TreeNode {
        out.stats.max_depth = out.stats.max_depth.max(depth);

        if depth > self.max_depth {
            tracing::warn!(path = %path, depth, "depth limit reached; subtree truncated");
            out.paths.insert(
                path.clone(),
                PathEntry {
                    path,
                    node_type: NodeType::Truncated,
                    value: None,
                    child_count: None,
                    depth,
                },
            );
            return TreeNode::Truncated;
        }

        let node_type = NodeType::of(value);
        let children: Vec<(String, &Value)> = match value {
            Value::Object(map) => {
                out.stats.total_keys += map.len();
                map.iter().map(|(k, v)| (k.clone(), v)).collect()
            }
            Value::Array(items) => {
                out.stats.array_count += 1;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect()
            }
            leaf => {
                match leaf {
                    Value::Null => out.stats.null_count += 1,
                    Value::String(s) => out.record_string(s.chars().count()),
                    Value::Number(n) => {
                        if let Some(n) = n.as_f64() {
                            out.record_number(n);
                        }
                    }
                    _ => {}
                }
                if node_type != NodeType::Null {
                    *out.stats.value_type_counts.entry(node_type).or_insert(0) += 1;
                }

                out.paths.insert(
                    path.clone(),
                    PathEntry {
                        path,
                        node_type,
                        value: Some(leaf.clone()),
                        child_count: None,
                        depth,
                    },
                );
                return TreeNode::Leaf {
                    node_type,
                    value: leaf.clone(),
                };
            }
        };

        // Parent goes in before its children.
        out.paths.insert(
            path.clone(),
            PathEntry {
                path: path.clone(),
                node_type,
                value: None,
                child_count: Some(children.len()),
                depth,
            },
        );

        let children = children
            .into_iter()
            .map(|(key, child)| {
                let node = self.visit(child, child_path(&path, &key), depth + 1, out);
                (key, node)
            })
            .collect();

        TreeNode::Internal {
            node_type,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested_arrays(levels: usize) -> Value {
        let mut value = json!(1);
        for _ in 0..levels {
            value = Value::Array(vec![value]);
        }
        value
    }

    #[test]
    fn test_dotted_and_empty_keys_keep_distinct_paths() {
        let doc = json!({"a.b": 1, "a": {"b": 2}, "": 5, "w\\x": {"": true}});
        let analysis = TreeWalker::new().walk(&doc);

        let paths: Vec<&str> = analysis.paths.keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec!["", "a\\.b", "a", "a.b", "\\0", "w\\\\x", "w\\\\x.\\0"]
        );
        assert_eq!(analysis.paths[""].node_type, NodeType::Object);
        assert_eq!(analysis.paths[""].child_count, Some(4));
        assert_eq!(analysis.paths["a\\.b"].value, Some(json!(1)));
        assert_eq!(analysis.paths["a.b"].value, Some(json!(2)));
        assert_eq!(analysis.paths["\\0"].value, Some(json!(5)));
    }

    #[test]
    fn test_paths_in_pre_order() {
        let doc = json!({"a": {"b": 1, "c": [true, null]}, "d": "x"});
        let analysis = TreeWalker::new().walk(&doc);

        let paths: Vec<&str> = analysis.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["", "a", "a.b", "a.c", "a.c.0", "a.c.1", "d"]);

        let root = &analysis.paths[""];
        assert_eq!(root.node_type, NodeType::Object);
        assert_eq!(root.child_count, Some(2));
        assert_eq!(root.depth, 0);

        let leaf = &analysis.paths["a.c.0"];
        assert_eq!(leaf.value, Some(json!(true)));
        assert_eq!(leaf.depth, 3);
        assert_eq!(analysis.paths["a.c.1"].node_type, NodeType::Null);
    }

    #[test]
    fn test_structure_stats() {
        let doc = json!({
            "name": "héllo",
            "tags": ["ab", "", null],
            "n": [1, 2.5, -3],
            "ok": false
        });
        let stats = TreeWalker::new().walk(&doc).stats;

        assert_eq!(stats.total_keys, 4);
        assert_eq!(stats.array_count, 2);
        assert_eq!(stats.null_count, 1);
        assert_eq!(stats.max_depth, 2);

        let counts: Vec<(NodeType, usize)> = stats.value_type_counts.into_iter().collect();
        assert_eq!(
            counts,
            vec![
                (NodeType::String, 3),
                (NodeType::Number, 3),
                (NodeType::Boolean, 1)
            ]
        );

        let lengths = stats.string_length_stats.unwrap();
        assert_eq!((lengths.min, lengths.max), (0, 5));
        assert!((lengths.avg - 7.0 / 3.0).abs() < 1e-12);

        let numbers = stats.number_stats.unwrap();
        assert_eq!((numbers.min, numbers.max), (-3.0, 2.5));
        assert_eq!(numbers.sum, 0.5);
        assert_eq!(numbers.count, 3);
    }

    #[test]
    fn test_scalar_root() {
        let analysis = TreeWalker::new().walk(&json!(42));
        assert_eq!(analysis.paths.len(), 1);
        assert_eq!(analysis.paths[""].value, Some(json!(42)));
        assert_eq!(analysis.stats.max_depth, 0);
        assert!(analysis.stats.string_length_stats.is_none());
        assert_eq!(
            analysis.structure,
            TreeNode::Leaf {
                node_type: NodeType::Number,
                value: json!(42)
            }
        );
    }

    #[test]
    fn test_max_depth_matches_nesting() {
        for levels in [0, 1, 5, 20] {
            let stats = TreeWalker::new().walk(&nested_arrays(levels)).stats;
            assert_eq!(stats.max_depth, levels);
        }
    }

    #[test]
    fn test_deep_nesting_is_truncated() {
        let analysis = TreeWalker::new().walk(&nested_arrays(25));
        assert_eq!(analysis.stats.max_depth, DEFAULT_MAX_DEPTH + 1);

        let truncated: Vec<&PathEntry> = analysis
            .paths
            .values()
            .filter(|e| e.node_type == NodeType::Truncated)
            .collect();
        assert_eq!(truncated.len(), 1);
        assert_eq!(truncated[0].depth, 21);
        assert_eq!(analysis.stats.array_count, 21);
    }

    #[test]
    fn test_custom_depth_limit() {
        let doc = json!({"a": {"b": {"c": 1}}});
        let analysis = TreeWalker::new().max_depth(1).walk(&doc);
        assert_eq!(analysis.paths["a.b"].node_type, NodeType::Truncated);
        assert!(!analysis.paths.contains_key("a.b.c"));

        let TreeNode::Internal { children, .. } = &analysis.structure else {
            panic!("expected internal root");
        };
        let TreeNode::Internal { children, .. } = &children["a"] else {
            panic!("expected internal node");
        };
        assert_eq!(children["b"], TreeNode::Truncated);
    }

    #[test]
    fn test_serialized_structure() {
        let analysis = TreeWalker::new().walk(&json!({"a": [1]}));
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["structure"]["kind"], "internal");
        assert_eq!(json["structure"]["children"]["a"]["type"], "array");
        assert_eq!(json["paths"]["a.0"]["value"], 1);
        assert_eq!(json["paths"]["a"]["childCount"], 1);
        assert_eq!(json["stats"]["totalKeys"], 1);
    }
}
