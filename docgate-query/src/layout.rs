//! Physical layout of a document table and field-path resolution.
//!
//! Documents live in a table with a native identity column and a JSON payload
//! column. A client field name resolves to a [`FieldTarget`]: either the
//! identity column itself, or a [`JsonPath`] into the payload.

use serde::{Deserialize, Serialize};

use crate::sql::quote_identifier;

/// Column layout of a document table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Client-facing name of the identity field.
    pub identity_field: String,
    /// Native column holding the identity.
    pub identity_column: String,
    /// Column holding the JSON payload.
    pub data_column: String,
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self {
            identity_field: "_id".to_string(),
            identity_column: "id".to_string(),
            data_column: "data".to_string(),
        }
    }
}

impl DocumentLayout {
    /// Create a layout with explicit names.
    pub fn new(
        identity_field: impl Into<String>,
        identity_column: impl Into<String>,
        data_column: impl Into<String>,
    ) -> Self {
        Self {
            identity_field: identity_field.into(),
            identity_column: identity_column.into(),
            data_column: data_column.into(),
        }
    }

    /// Check whether a client field addresses the identity column.
    pub fn is_identity(&self, field: &str) -> bool {
        field == self.identity_field
    }

    /// Resolve a client field to the storage location it addresses.
    pub fn target(&self, field: &str) -> FieldTarget {
        if self.is_identity(field) {
            FieldTarget::Identity {
                column: quote_identifier(&self.identity_column),
            }
        } else {
            FieldTarget::Json {
                column: quote_identifier(&self.data_column),
                path: JsonPath::parse(field),
            }
        }
    }
}

/// Where a client field lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    /// The native identity column (already quoted if needed).
    Identity {
        /// Column expression.
        column: String,
    },
    /// A path inside the JSON payload column.
    Json {
        /// Payload column expression.
        column: String,
        /// Path inside the payload.
        path: JsonPath,
    },
}

impl FieldTarget {
    /// Check if this target is the identity column.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity { .. })
    }
}

/// A segment in a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object key access.
    Key(String),
    /// Array index access.
    Index(u32),
}

/// A path into a JSON document, parsed from dotted client notation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JsonPath {
    /// Path segments.
    pub segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Parse a dotted field name (`address.lines.0`) into a path.
    ///
    /// All-digit segments become array indices.
    pub fn parse(field: &str) -> Self {
        let segments = field
            .split('.')
            .map(|segment| {
                if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                    match segment.parse::<u32>() {
                        Ok(i) => PathSegment::Index(i),
                        Err(_) => PathSegment::Key(segment.to_string()),
                    }
                } else {
                    PathSegment::Key(segment.to_string())
                }
            })
            .collect();
        Self { segments }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// All but the last segment.
    pub fn parent(&self) -> JsonPath {
        let n = self.segments.len().saturating_sub(1);
        Self {
            segments: self.segments[..n].to_vec(),
        }
    }

    /// Render as an SQL/JSON path string (`$.a."b c"[0]`).
    ///
    /// Keys that are not plain identifiers are double-quoted with `"` and `\`
    /// backslash-escaped. The result still needs literal quoting.
    pub fn to_jsonpath_string(&self) -> String {
        let mut path = String::from("$");

        for segment in &self.segments {
            match segment {
                PathSegment::Key(name) => {
                    path.push('.');
                    if is_plain_key(name) {
                        path.push_str(name);
                    } else {
                        path.push('"');
                        path.push_str(&escape_path_key(name));
                        path.push('"');
                    }
                }
                PathSegment::Index(idx) => {
                    path.push('[');
                    path.push_str(&idx.to_string());
                    path.push(']');
                }
            }
        }

        path
    }

    /// Render as a PostgreSQL text-array path (`{a,"b c",0}`).
    ///
    /// The result still needs literal quoting.
    pub fn to_postgres_array(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment {
                PathSegment::Key(name) if is_plain_key(name) => name.clone(),
                PathSegment::Key(name) => format!("\"{}\"", escape_path_key(name)),
                PathSegment::Index(idx) => idx.to_string(),
            })
            .collect();
        format!("{{{}}}", parts.join(","))
    }
}

fn is_plain_key(name: &str) -> bool {
    !name.is_empty()
        && name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape_path_key(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_path_parse() {
        let path = JsonPath::parse("address.lines.0");
        assert_eq!(
            path.segments,
            vec![
                PathSegment::Key("address".into()),
                PathSegment::Key("lines".into()),
                PathSegment::Index(0),
            ]
        );
        assert_eq!(path.to_jsonpath_string(), "$.address.lines[0]");
        assert_eq!(path.to_postgres_array(), "{address,lines,0}");
    }

    #[test]
    fn test_json_path_quotes_special_keys() {
        let path = JsonPath::parse("first name");
        assert_eq!(path.to_jsonpath_string(), "$.\"first name\"");
        assert_eq!(path.to_postgres_array(), "{\"first name\"}");

        let path = JsonPath::parse("a\"b\\c");
        assert_eq!(path.to_jsonpath_string(), "$.\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_json_path_parent() {
        let path = JsonPath::parse("a.b.c");
        assert_eq!(path.parent().to_jsonpath_string(), "$.a.b");
        assert_eq!(path.last(), Some(&PathSegment::Key("c".into())));
        assert_eq!(JsonPath::parse("a").parent().to_jsonpath_string(), "$");
    }

    #[test]
    fn test_layout_target() {
        let layout = DocumentLayout::default();
        assert!(layout.target("_id").is_identity());
        match layout.target("price") {
            FieldTarget::Json { column, path } => {
                assert_eq!(column, "data");
                assert_eq!(path.to_jsonpath_string(), "$.price");
            }
            other => panic!("expected json target, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_quotes_columns() {
        let layout = DocumentLayout::new("key", "order", "doc body");
        assert_eq!(
            layout.target("key"),
            FieldTarget::Identity {
                column: "\"order\"".into()
            }
        );
    }
}
