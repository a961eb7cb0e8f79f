//! MySQL dialect over JSON payload columns.

use crate::layout::{FieldTarget, JsonPath};
use crate::sql::quote_literal_backslash;
use crate::types::JsonType;

use super::{DatabaseDialect, DialectKind};

/// MySQL 8 / MariaDB dialect.
///
/// String literals escape backslashes, as MySQL treats `\` as an escape
/// character inside quotes by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

/// Largest row count MySQL accepts; used for offset-only pagination.
const MAX_ROWS: u64 = u64::MAX;

impl DatabaseDialect for MySqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    fn quote_literal(&self, value: &str) -> String {
        quote_literal_backslash(value)
    }

    fn extract_text(&self, column: &str, path: &JsonPath) -> String {
        format!("JSON_UNQUOTE({})", self.extract_json(column, path))
    }

    fn extract_numeric(&self, column: &str, path: &JsonPath) -> String {
        format!("CAST({} AS DECIMAL(65,30))", self.extract_text(column, path))
    }

    fn extract_json(&self, column: &str, path: &JsonPath) -> String {
        format!("JSON_EXTRACT({}, {})", column, self.escape_path(path))
    }

    fn cast_to_string(&self, column: &str) -> String {
        format!("CAST({} AS CHAR)", column)
    }

    fn json_param(&self, placeholder: &str) -> String {
        format!("CAST({} AS JSON)", placeholder)
    }

    fn supports_native_regex(&self) -> bool {
        true
    }

    fn regex_match(&self, target: &FieldTarget, param: &str, case_insensitive: bool) -> String {
        let expr = match target {
            FieldTarget::Identity { column } => self.cast_to_string(column),
            FieldTarget::Json { column, path } => self.extract_text(column, path),
        };
        let mode = if case_insensitive { "'i'" } else { "'c'" };
        format!("REGEXP_LIKE({}, {}, {})", expr, param, mode)
    }

    fn json_exists(&self, column: &str, path: &JsonPath, exists: bool) -> String {
        let check = format!(
            "JSON_CONTAINS_PATH({}, 'one', {})",
            column,
            self.escape_path(path)
        );
        if exists { check } else { format!("NOT {}", check) }
    }

    fn json_type_check(&self, column: &str, path: &JsonPath, json_type: JsonType) -> String {
        let expr = format!("JSON_TYPE({})", self.extract_json(column, path));
        match json_type {
            JsonType::String => format!("{} = 'STRING'", expr),
            JsonType::Number => format!(
                "{} IN ('INTEGER', 'UNSIGNED INTEGER', 'DOUBLE', 'DECIMAL')",
                expr
            ),
            JsonType::Boolean => format!("{} = 'BOOLEAN'", expr),
            JsonType::Array => format!("{} = 'ARRAY'", expr),
            JsonType::Object => format!("{} = 'OBJECT'", expr),
            JsonType::Null => format!("{} = 'NULL'", expr),
        }
    }

    fn pagination(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (None, None) => None,
            (Some(limit), None) => Some(format!("LIMIT {}", limit)),
            (limit, Some(offset)) => Some(format!(
                "LIMIT {} OFFSET {}",
                limit.unwrap_or(MAX_ROWS),
                offset
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DocumentLayout;
    use pretty_assertions::assert_eq;

    fn target(field: &str) -> FieldTarget {
        DocumentLayout::default().target(field)
    }

    #[test]
    fn test_extract() {
        let d = MySqlDialect;
        assert_eq!(
            d.target_text(&target("address.city")),
            "JSON_UNQUOTE(JSON_EXTRACT(data, '$.address.city'))"
        );
        assert_eq!(
            d.compare(&target("price"), super::super::Comparison::Lte, "?"),
            "CAST(JSON_UNQUOTE(JSON_EXTRACT(data, '$.price')) AS DECIMAL(65,30)) <= ?"
        );
    }

    #[test]
    fn test_path_literal_escapes_backslash() {
        let d = MySqlDialect;
        assert_eq!(
            d.target_text(&target("a\\b")),
            "JSON_UNQUOTE(JSON_EXTRACT(data, '$.\"a\\\\\\\\b\"'))"
        );
    }

    #[test]
    fn test_exists() {
        let d = MySqlDialect;
        assert_eq!(
            d.exists(&target("email"), true),
            "JSON_CONTAINS_PATH(data, 'one', '$.email')"
        );
        assert_eq!(
            d.exists(&target("email"), false),
            "NOT JSON_CONTAINS_PATH(data, 'one', '$.email')"
        );
    }

    #[test]
    fn test_regex() {
        let d = MySqlDialect;
        assert_eq!(
            d.regex_match(&target("name"), "?", true),
            "REGEXP_LIKE(JSON_UNQUOTE(JSON_EXTRACT(data, '$.name')), ?, 'i')"
        );
        assert_eq!(
            d.regex_match(&target("_id"), "?", false),
            "REGEXP_LIKE(CAST(id AS CHAR), ?, 'c')"
        );
    }

    #[test]
    fn test_type_check() {
        let d = MySqlDialect;
        assert_eq!(
            d.type_check(&target("flag"), JsonType::Boolean),
            "JSON_TYPE(JSON_EXTRACT(data, '$.flag')) = 'BOOLEAN'"
        );
    }

    #[test]
    fn test_offset_only_pagination() {
        let d = MySqlDialect;
        assert_eq!(
            d.pagination(None, Some(20)).as_deref(),
            Some("LIMIT 18446744073709551615 OFFSET 20")
        );
    }
}
