//! PostgreSQL dialect over JSONB payload columns.

use crate::layout::{FieldTarget, JsonPath, PathSegment};
use crate::types::JsonType;

use super::{DatabaseDialect, DialectKind};

/// PostgreSQL JSONB dialect.
///
/// Single-segment paths use `->` / `->>`; deeper paths use `#>` / `#>>` with
/// a text-array path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    fn path_expr(&self, column: &str, path: &JsonPath, as_text: bool) -> String {
        match path.segments.as_slice() {
            [PathSegment::Key(key)] => {
                let arrow = if as_text { "->>" } else { "->" };
                format!("{} {} {}", column, arrow, self.quote_literal(key))
            }
            [PathSegment::Index(idx)] => {
                let arrow = if as_text { "->>" } else { "->" };
                format!("{} {} {}", column, arrow, idx)
            }
            _ => {
                let arrow = if as_text { "#>>" } else { "#>" };
                format!(
                    "{} {} {}",
                    column,
                    arrow,
                    self.quote_literal(&path.to_postgres_array())
                )
            }
        }
    }
}

impl DatabaseDialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn positional_placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn extract_text(&self, column: &str, path: &JsonPath) -> String {
        self.path_expr(column, path, true)
    }

    /// Non-numeric values yield NULL instead of a cast error.
    fn extract_numeric(&self, column: &str, path: &JsonPath) -> String {
        format!(
            "CASE WHEN jsonb_typeof({}) = 'number' THEN ({})::numeric END",
            self.path_expr(column, path, false),
            self.path_expr(column, path, true)
        )
    }

    fn extract_json(&self, column: &str, path: &JsonPath) -> String {
        self.path_expr(column, path, false)
    }

    fn cast_to_string(&self, column: &str) -> String {
        format!("CAST({} AS TEXT)", column)
    }

    fn json_param(&self, placeholder: &str) -> String {
        format!("CAST({} AS jsonb)", placeholder)
    }

    fn supports_native_regex(&self) -> bool {
        true
    }

    fn regex_match(&self, target: &FieldTarget, param: &str, case_insensitive: bool) -> String {
        let expr = match target {
            FieldTarget::Identity { column } => self.cast_to_string(column),
            FieldTarget::Json { column, path } => self.extract_text(column, path),
        };
        let op = if case_insensitive { "~*" } else { "~" };
        format!("{} {} {}", expr, op, param)
    }

    fn json_exists(&self, column: &str, path: &JsonPath, exists: bool) -> String {
        let check = if exists { "IS NOT NULL" } else { "IS NULL" };
        format!("({}) {}", self.extract_json(column, path), check)
    }

    fn json_type_check(&self, column: &str, path: &JsonPath, json_type: JsonType) -> String {
        format!(
            "jsonb_typeof({}) = {}",
            self.extract_json(column, path),
            self.quote_literal(json_type.name())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DocumentLayout;
    use crate::types::SortOrder;
    use pretty_assertions::assert_eq;

    fn json(field: &str) -> FieldTarget {
        DocumentLayout::default().target(field)
    }

    #[test]
    fn test_extract_single_segment() {
        let d = PostgresDialect;
        assert_eq!(d.target_text(&json("status")), "data ->> 'status'");
        assert_eq!(
            d.compare(&json("price"), super::super::Comparison::Gt, ":p"),
            "CASE WHEN jsonb_typeof(data -> 'price') = 'number' THEN (data ->> 'price')::numeric END > :p"
        );
        assert_eq!(
            d.extract_numeric("data", &JsonPath::parse("dims.w")),
            "CASE WHEN jsonb_typeof(data #> '{dims,w}') = 'number' THEN (data #>> '{dims,w}')::numeric END"
        );
    }

    #[test]
    fn test_extract_nested_path() {
        let d = PostgresDialect;
        assert_eq!(d.target_text(&json("address.city")), "data #>> '{address,city}'");
        assert_eq!(d.target_text(&json("tags.0")), "data #>> '{tags,0}'");
    }

    #[test]
    fn test_key_is_escaped() {
        let d = PostgresDialect;
        assert_eq!(d.target_text(&json("o'brien")), "data ->> 'o''brien'");
    }

    #[test]
    fn test_exists_and_type() {
        let d = PostgresDialect;
        assert_eq!(d.exists(&json("email"), true), "(data -> 'email') IS NOT NULL");
        assert_eq!(d.exists(&json("a.b"), false), "(data #> '{a,b}') IS NULL");
        assert_eq!(
            d.type_check(&json("tags"), JsonType::Array),
            "jsonb_typeof(data -> 'tags') = 'array'"
        );
    }

    #[test]
    fn test_identity_uses_column() {
        let d = PostgresDialect;
        let id = json("_id");
        assert_eq!(d.equals(&id, ":p"), "id = :p");
        assert_eq!(d.regex_match(&id, ":p", false), "CAST(id AS TEXT) ~ :p");
        assert_eq!(d.exists(&id, true), "id IS NOT NULL");
        assert_eq!(d.order_by(&id, SortOrder::Desc), "id DESC");
    }

    #[test]
    fn test_regex_native() {
        let d = PostgresDialect;
        assert_eq!(d.regex_match(&json("name"), ":p", true), "data ->> 'name' ~* :p");
    }

    #[test]
    fn test_positional() {
        assert_eq!(PostgresDialect.positional_placeholder(3), "$3");
    }
}
