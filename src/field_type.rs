use serde::Serialize;
use std::fmt;

/// Semantic type inferred for a column or a leaf value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    /// Numeric value.
    Number,
    /// Text value (fallback type).
    #[default]
    String,
    /// Boolean value.
    Boolean,
    /// Date or date-time value.
    Date,
    /// More than one primitive type present.
    Mixed,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Type {
    /// Lowercase name, as used in reports.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Type::Number => "number",
            Type::String => "string",
            Type::Boolean => "boolean",
            Type::Date => "date",
            Type::Mixed => "mixed",
        }
    }

    /// Merge two primitive tags. Differing tags collapse to `Mixed`.
    pub fn merge(self, other: Type) -> Type {
        if self == other { self } else { Type::Mixed }
    }
}
