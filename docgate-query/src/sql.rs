//! SQL text utilities: identifier quoting, literal escaping, and field-path
//! sanitisation.
//!
//! Escaping here is total: every function accepts any input string and
//! produces a fragment that cannot terminate the surrounding quote.

/// Escape an identifier with double quotes (for column names, not values).
pub fn escape_identifier(name: &str) -> String {
    let escaped = name.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Check if an identifier needs quoting.
pub fn needs_quoting(name: &str) -> bool {
    let reserved = [
        "user", "order", "group", "select", "from", "where", "table", "index", "key", "primary",
        "default", "null", "not", "and", "or", "in", "is", "like", "case", "when", "then", "else",
        "end", "as", "on", "limit", "offset", "all", "distinct", "having", "values", "set",
    ];

    if name.is_empty() || reserved.contains(&name.to_lowercase().as_str()) {
        return true;
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return true;
    }

    !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote an identifier if needed.
pub fn quote_identifier(name: &str) -> String {
    if needs_quoting(name) {
        escape_identifier(name)
    } else {
        name.to_string()
    }
}

/// Render a single-quoted SQL string literal by doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render a single-quoted SQL string literal for engines where backslash is
/// an escape character inside literals (MySQL by default).
pub fn quote_literal_backslash(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Reduce a field path to characters safe inside a parameter name.
///
/// `address.city` becomes `address_city`; anything outside `[A-Za-z0-9_]`
/// becomes `_`.
pub fn sanitize_param_name(field: &str) -> String {
    let mut out: String = field
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !out.starts_with(|c: char| c.is_ascii_alphabetic()) {
        out.insert_str(0, "p_");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier("user"), "\"user\"");
        assert_eq!(escape_identifier("has\"quote"), "\"has\"\"quote\"");
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("data"), "data");
        assert_eq!(quote_identifier("order"), "\"order\"");
        assert_eq!(quote_identifier("doc body"), "\"doc body\"");
        assert_eq!(quote_identifier("1col"), "\"1col\"");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("name"), "'name'");
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
        assert_eq!(quote_literal("a\\b"), "'a\\b'");
        assert_eq!(quote_literal_backslash("a\\b'c"), "'a\\\\b''c'");
    }

    #[test]
    fn test_sanitize_param_name() {
        assert_eq!(sanitize_param_name("price"), "price");
        assert_eq!(sanitize_param_name("address.city"), "address_city");
        assert_eq!(sanitize_param_name("_id"), "p__id");
        assert_eq!(sanitize_param_name("x'; drop"), "x___drop");
        assert_eq!(sanitize_param_name(""), "p_");
    }
}
