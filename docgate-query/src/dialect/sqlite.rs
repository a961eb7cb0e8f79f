//! SQLite dialect using the JSON1 functions.

use crate::layout::{FieldTarget, JsonPath};
use crate::pattern::{LIKE_ESCAPE, PatternSyntax};
use crate::types::JsonType;

use super::{DatabaseDialect, DialectKind, like_predicate};

/// SQLite JSON1 dialect.
///
/// `json_extract` returns SQL-typed scalars, so the text form renders
/// numbers through `CAST(... AS TEXT)` and booleans through `json_type`,
/// giving the same text other backends produce. Case-sensitive `$regex` is
/// emulated with GLOB, case-insensitive with LIKE.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    fn raw_extract(&self, column: &str, path: &JsonPath) -> String {
        format!("json_extract({}, {})", column, self.escape_path(path))
    }
}

impl DatabaseDialect for SqliteDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn extract_text(&self, column: &str, path: &JsonPath) -> String {
        format!(
            "CASE json_type({c}, {p}) WHEN 'true' THEN 'true' WHEN 'false' THEN 'false' \
             ELSE CAST(json_extract({c}, {p}) AS TEXT) END",
            c = column,
            p = self.escape_path(path)
        )
    }

    fn extract_numeric(&self, column: &str, path: &JsonPath) -> String {
        format!("CAST({} AS REAL)", self.raw_extract(column, path))
    }

    fn extract_json(&self, column: &str, path: &JsonPath) -> String {
        self.raw_extract(column, path)
    }

    fn cast_to_string(&self, column: &str) -> String {
        format!("CAST({} AS TEXT)", column)
    }

    fn json_param(&self, placeholder: &str) -> String {
        format!("json({})", placeholder)
    }

    fn emulated_pattern(&self, regex: &str, case_insensitive: bool) -> String {
        if case_insensitive {
            PatternSyntax::Like.convert(regex)
        } else {
            PatternSyntax::Glob.convert(regex)
        }
    }

    fn pattern_match(&self, target: &FieldTarget, param: &str, case_insensitive: bool) -> String {
        let subject = self.pattern_subject(target);
        if case_insensitive {
            like_predicate(&subject, param, &self.quote_literal(&LIKE_ESCAPE.to_string()), true)
        } else {
            format!("{} GLOB {}", subject, param)
        }
    }

    fn json_exists(&self, column: &str, path: &JsonPath, exists: bool) -> String {
        let check = if exists { "IS NOT NULL" } else { "IS NULL" };
        format!(
            "json_type({}, {}) {}",
            column,
            self.escape_path(path),
            check
        )
    }

    fn json_type_check(&self, column: &str, path: &JsonPath, json_type: JsonType) -> String {
        let expr = format!("json_type({}, {})", column, self.escape_path(path));
        match json_type {
            JsonType::String => format!("{} = 'text'", expr),
            JsonType::Number => format!("{} IN ('integer', 'real')", expr),
            JsonType::Boolean => format!("{} IN ('true', 'false')", expr),
            JsonType::Array => format!("{} = 'array'", expr),
            JsonType::Object => format!("{} = 'object'", expr),
            JsonType::Null => format!("{} = 'null'", expr),
        }
    }

    fn pagination(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (None, None) => None,
            (Some(limit), None) => Some(format!("LIMIT {}", limit)),
            (Some(limit), Some(offset)) => Some(format!("LIMIT {} OFFSET {}", limit, offset)),
            (None, Some(offset)) => Some(format!("LIMIT -1 OFFSET {}", offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DocumentLayout;
    use crate::value::FilterValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn target(field: &str) -> FieldTarget {
        DocumentLayout::default().target(field)
    }

    const STATUS_TEXT: &str = "CASE json_type(data, '$.status') WHEN 'true' THEN 'true' \
        WHEN 'false' THEN 'false' ELSE CAST(json_extract(data, '$.status') AS TEXT) END";

    #[test]
    fn test_extract() {
        let d = SqliteDialect;
        assert_eq!(d.target_text(&target("status")), STATUS_TEXT);
        assert_eq!(
            d.extract_json("data", &JsonPath::parse("items.2.sku")),
            "json_extract(data, '$.items[2].sku')"
        );
        assert_eq!(
            d.compare(&target("age"), super::super::Comparison::Gte, ":p"),
            "CAST(json_extract(data, '$.age') AS REAL) >= :p"
        );
    }

    #[test]
    fn test_equality_compares_text() {
        let d = SqliteDialect;
        assert_eq!(d.equals(&target("status"), ":p"), format!("{} = :p", STATUS_TEXT));
        assert_eq!(d.text_param(&json!(30)), FilterValue::String("30".into()));
        assert_eq!(d.text_param(&json!(true)), FilterValue::String("true".into()));
    }

    #[test]
    fn test_regex_emulation() {
        let d = SqliteDialect;
        assert!(!d.supports_native_regex());
        assert_eq!(
            d.pattern_match(&target("status"), ":p", false),
            format!("{} GLOB :p", STATUS_TEXT)
        );
        assert_eq!(
            d.pattern_match(&target("status"), ":p", true),
            format!("LOWER({}) LIKE LOWER(:p) ESCAPE '\\'", STATUS_TEXT)
        );
        assert_eq!(d.emulated_pattern("^Al", false), "Al*");
        assert_eq!(d.emulated_pattern("^Al", true), "Al%");
        assert_eq!(d.pattern_match(&target("_id"), ":p", false), "CAST(id AS TEXT) GLOB :p");
    }

    #[test]
    fn test_exists_and_type() {
        let d = SqliteDialect;
        assert_eq!(
            d.exists(&target("email"), true),
            "json_type(data, '$.email') IS NOT NULL"
        );
        assert_eq!(
            d.type_check(&target("n"), JsonType::Number),
            "json_type(data, '$.n') IN ('integer', 'real')"
        );
    }

    #[test]
    fn test_offset_only_pagination() {
        assert_eq!(
            SqliteDialect.pagination(None, Some(5)).as_deref(),
            Some("LIMIT -1 OFFSET 5")
        );
    }
}
