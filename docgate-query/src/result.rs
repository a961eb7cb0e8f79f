//! Translation output consumed by the storage adapter.

use crate::dialect::DatabaseDialect;
use crate::predicate::{ALWAYS_TRUE, Parameters, SqlPredicate};
use crate::request::Projection;
use crate::value::FilterValue;

/// WHERE fragment, ORDER BY fragment, bound parameters and pagination.
///
/// Clauses are stored without their leading keywords.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterResult {
    /// WHERE fragment with named placeholders.
    pub where_clause: Option<String>,
    /// ORDER BY items, comma separated.
    pub order_by_clause: Option<String>,
    /// Named parameter bindings.
    pub parameters: Parameters,
    /// Row limit.
    pub limit: Option<u64>,
    /// Row offset.
    pub offset: Option<u64>,
    /// Validated projection.
    pub projection: Option<Projection>,
}

impl FilterResult {
    /// Start building a result.
    pub fn builder() -> FilterResultBuilder {
        FilterResultBuilder::default()
    }

    /// Check if there is a non-vacuous WHERE fragment.
    pub fn has_where_clause(&self) -> bool {
        matches!(self.where_clause.as_deref(), Some(w) if !w.trim().is_empty() && w != ALWAYS_TRUE)
    }

    /// Check if there is an ORDER BY fragment.
    pub fn has_order_by_clause(&self) -> bool {
        matches!(self.order_by_clause.as_deref(), Some(o) if !o.trim().is_empty())
    }

    /// Render LIMIT/OFFSET for `dialect`.
    pub fn pagination_clause(&self, dialect: &dyn DatabaseDialect) -> Option<String> {
        dialect.pagination(self.limit, self.offset)
    }

    /// Rewrite the WHERE fragment to positional placeholders.
    ///
    /// Returns the rewritten fragment and the values in placeholder order.
    /// Placeholder-like text inside quoted literals or identifiers is left
    /// untouched, as are names that are not bound parameters.
    pub fn to_positional(&self, dialect: &dyn DatabaseDialect) -> (String, Vec<FilterValue>) {
        match self.where_clause.as_deref() {
            Some(clause) => rewrite_positional(clause, &self.parameters, dialect),
            None => (String::new(), Vec::new()),
        }
    }

    /// Render the statement tail (` WHERE … ORDER BY … LIMIT …`) with named
    /// placeholders.
    pub fn sql_tail(&self, dialect: &dyn DatabaseDialect) -> String {
        let mut sql = String::new();

        if self.has_where_clause() {
            if let Some(clause) = &self.where_clause {
                sql.push_str(" WHERE ");
                sql.push_str(clause);
            }
        }

        let pagination = self.pagination_clause(dialect);

        if let Some(order) = self.order_by_clause.as_deref().filter(|_| self.has_order_by_clause()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        } else if pagination.is_some() && dialect.pagination_requires_order() {
            sql.push_str(" ORDER BY (SELECT NULL)");
        }

        if let Some(pagination) = pagination {
            sql.push(' ');
            sql.push_str(&pagination);
        }

        sql
    }
}

fn rewrite_positional(
    clause: &str,
    parameters: &Parameters,
    dialect: &dyn DatabaseDialect,
) -> (String, Vec<FilterValue>) {
    let prefix = dialect.placeholder_prefix();
    let mut out = String::with_capacity(clause.len());
    let mut values = Vec::with_capacity(parameters.len());
    let mut quote: Option<char> = None;
    let mut chars = clause.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                out.push(c);
            }
            None if c == prefix => {
                let start = i + c.len_utf8();
                let mut end = start;
                while let Some(&(j, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        end = j + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let name = &clause[start..end];
                match parameters.get(name) {
                    Some(value) => {
                        values.push(value.clone());
                        out.push_str(&dialect.positional_placeholder(values.len()));
                    }
                    None => {
                        out.push(c);
                        out.push_str(name);
                    }
                }
            }
            None => out.push(c),
        }
    }

    (out, values)
}

/// Accumulating builder for [`FilterResult`].
#[derive(Debug, Default)]
pub struct FilterResultBuilder {
    result: FilterResult,
}

impl FilterResultBuilder {
    /// AND a predicate into the WHERE clause. Always-true predicates are
    /// dropped.
    pub fn predicate(mut self, predicate: SqlPredicate) -> Self {
        if predicate.is_always_true() {
            return self;
        }
        let (fragment, parameters) = predicate.into_parts();
        self.result.where_clause = Some(match self.result.where_clause.take() {
            Some(existing) => format!("({} AND {})", existing, fragment),
            None => fragment,
        });
        self.result.parameters.extend(parameters);
        self
    }

    /// Append an ORDER BY item.
    pub fn order_by(mut self, item: impl Into<String>) -> Self {
        let item = item.into();
        self.result.order_by_clause = Some(match self.result.order_by_clause.take() {
            Some(existing) => format!("{}, {}", existing, item),
            None => item,
        });
        self
    }

    /// Set the limit.
    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.result.limit = limit;
        self
    }

    /// Set the offset.
    pub fn offset(mut self, offset: Option<u64>) -> Self {
        self.result.offset = offset;
        self
    }

    /// Set the projection.
    pub fn projection(mut self, projection: Option<Projection>) -> Self {
        self.result.projection = projection;
        self
    }

    /// Finish building.
    pub fn build(self) -> FilterResult {
        self.result
    }
}
