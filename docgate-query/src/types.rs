//! Common types used in filter translation.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{QueryError, QueryResult};

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// Get the SQL keyword for this sort order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Read a sort direction from a request value.
    ///
    /// Accepts `1` / `-1` and the strings `asc` / `desc` (any case).
    pub fn from_json(field: &str, value: &JsonValue) -> QueryResult<Self> {
        match value {
            JsonValue::Number(n) => match n.as_i64() {
                Some(1) => Ok(Self::Asc),
                Some(-1) => Ok(Self::Desc),
                _ => Err(QueryError::invalid_sort(
                    field,
                    format!("direction must be 1 or -1, got {}", n),
                )),
            },
            JsonValue::String(s) => match s.to_lowercase().as_str() {
                "asc" | "ascending" => Ok(Self::Asc),
                "desc" | "descending" => Ok(Self::Desc),
                _ => Err(QueryError::invalid_sort(
                    field,
                    format!("unknown direction '{}'", s),
                )),
            },
            other => Err(QueryError::invalid_sort(
                field,
                format!("direction must be a number or string, got {}", other),
            )),
        }
    }

    /// Numeric spelling (`1` or `-1`).
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Client field name.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
}

impl SortField {
    /// Create a new sort key.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Create an ascending sort key.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    /// Create a descending sort key.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// JSON value types recognised by `$type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    /// A JSON string.
    String,
    /// A JSON number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
    /// JSON `null`.
    Null,
}

impl JsonType {
    /// Look a type up by name (case-insensitive). `bool` and `int`-style
    /// aliases are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "string" | "str" => Some(Self::String),
            "number" | "int" | "integer" | "long" | "double" | "decimal" => Some(Self::Number),
            "boolean" | "bool" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_order_from_json() {
        assert_eq!(SortOrder::from_json("a", &json!(1)).unwrap(), SortOrder::Asc);
        assert_eq!(SortOrder::from_json("a", &json!(-1)).unwrap(), SortOrder::Desc);
        assert_eq!(SortOrder::from_json("a", &json!("DESC")).unwrap(), SortOrder::Desc);
        assert!(SortOrder::from_json("a", &json!(0)).is_err());
        assert!(SortOrder::from_json("a", &json!("up")).is_err());
        assert!(SortOrder::from_json("a", &json!(null)).is_err());
    }

    #[test]
    fn test_sort_order_sql() {
        assert_eq!(SortOrder::Asc.as_sql(), "ASC");
        assert_eq!(SortOrder::Desc.to_string(), "DESC");
        assert_eq!(SortOrder::Desc.as_i64(), -1);
    }

    #[test]
    fn test_json_type_from_name() {
        assert_eq!(JsonType::from_name("STRING"), Some(JsonType::String));
        assert_eq!(JsonType::from_name("bool"), Some(JsonType::Boolean));
        assert_eq!(JsonType::from_name("int"), Some(JsonType::Number));
        assert_eq!(JsonType::from_name("date"), None);
    }
}
