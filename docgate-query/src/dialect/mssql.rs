//! SQL Server dialect over NVARCHAR JSON payload columns.

use crate::layout::{FieldTarget, JsonPath, PathSegment};
use crate::pattern::{LIKE_ESCAPE, PatternSyntax};
use crate::types::JsonType;

use super::{DatabaseDialect, DialectKind, like_predicate};

/// Collation forcing case-sensitive comparison regardless of the column's.
const CASE_SENSITIVE_COLLATION: &str = "Latin1_General_CS_AS";

/// Microsoft SQL Server dialect.
///
/// Scalars are read with `JSON_VALUE`, objects and arrays with `JSON_QUERY`.
/// Key presence and JSON types come from `OPENJSON` over the parent path,
/// which reports a numeric `type` per key:
///
/// | type | JSON    |
/// |------|---------|
/// | 0    | null    |
/// | 1    | string  |
/// | 2    | number  |
/// | 3    | boolean |
/// | 4    | array   |
/// | 5    | object  |
#[derive(Debug, Clone, Copy, Default)]
pub struct MsSqlDialect;

impl MsSqlDialect {
    /// `OPENJSON` row lookup for the last path segment.
    fn openjson_key_check(&self, column: &str, path: &JsonPath, type_filter: Option<&str>) -> String {
        let key = match path.last() {
            Some(PathSegment::Key(key)) => key.clone(),
            Some(PathSegment::Index(idx)) => idx.to_string(),
            None => String::new(),
        };
        let mut check = format!(
            "SELECT 1 FROM OPENJSON({}, {}) WHERE [key] = N{}",
            column,
            self.escape_path(&path.parent()),
            self.quote_literal(&key)
        );
        if let Some(filter) = type_filter {
            check.push_str(" AND [type] ");
            check.push_str(filter);
        }
        format!("EXISTS ({})", check)
    }
}

impl DatabaseDialect for MsSqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::MsSql
    }

    fn placeholder_prefix(&self) -> char {
        '@'
    }

    fn positional_placeholder(&self, index: usize) -> String {
        format!("@P{}", index)
    }

    fn extract_text(&self, column: &str, path: &JsonPath) -> String {
        format!("JSON_VALUE({}, {})", column, self.escape_path(path))
    }

    fn extract_numeric(&self, column: &str, path: &JsonPath) -> String {
        format!("TRY_CAST({} AS DECIMAL(38, 10))", self.extract_text(column, path))
    }

    fn extract_json(&self, column: &str, path: &JsonPath) -> String {
        format!("JSON_QUERY({}, {})", column, self.escape_path(path))
    }

    fn cast_to_string(&self, column: &str) -> String {
        format!("CAST({} AS NVARCHAR(MAX))", column)
    }

    fn json_param(&self, placeholder: &str) -> String {
        placeholder.to_string()
    }

    fn emulated_pattern(&self, regex: &str, _case_insensitive: bool) -> String {
        PatternSyntax::TransactSqlLike.convert(regex)
    }

    fn pattern_match(&self, target: &FieldTarget, param: &str, case_insensitive: bool) -> String {
        let escape = self.quote_literal(&LIKE_ESCAPE.to_string());
        let subject = self.pattern_subject(target);
        if case_insensitive {
            like_predicate(&subject, param, &escape, true)
        } else {
            let subject = format!("{} COLLATE {}", subject, CASE_SENSITIVE_COLLATION);
            like_predicate(&subject, param, &escape, false)
        }
    }

    fn json_exists(&self, column: &str, path: &JsonPath, exists: bool) -> String {
        let check = self.openjson_key_check(column, path, None);
        if exists { check } else { format!("NOT {}", check) }
    }

    fn json_type_check(&self, column: &str, path: &JsonPath, json_type: JsonType) -> String {
        let code = match json_type {
            JsonType::Null => 0,
            JsonType::String => 1,
            JsonType::Number => 2,
            JsonType::Boolean => 3,
            JsonType::Array => 4,
            JsonType::Object => 5,
        };
        self.openjson_key_check(column, path, Some(&format!("= {}", code)))
    }

    fn pagination_requires_order(&self) -> bool {
        true
    }

    fn pagination(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (None, None) => None,
            (Some(limit), offset) => Some(format!(
                "OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                offset.unwrap_or(0),
                limit
            )),
            (None, Some(offset)) => Some(format!("OFFSET {} ROWS", offset)),
        }
    }
}
