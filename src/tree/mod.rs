//! Hierarchical (JSON) documents: parsing, walking and path queries.

pub mod query;
pub mod walker;

pub use query::{DiffEntry, DiffKind, diff, find_by_pattern, flatten, resolve, type_at};
pub use walker::{
    LengthStats, NodeType, NumberStats, PathEntry, PathIndex, StructureStats, TreeAnalysis,
    TreeNode, TreeWalker,
};

use crate::error::Result;

/// Parse JSON text, keeping object keys in document order.
///
/// Malformed text is reported as [`AnalysisError::Json`] with the line and
/// column of the failure.
///
/// [`AnalysisError::Json`]: crate::AnalysisError::Json
pub fn parse_json(text: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(text)?)
}
