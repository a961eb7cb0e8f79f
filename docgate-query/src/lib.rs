//! # docgate-query
//!
//! Filter-expression compiler for the docgate data gateway.
//!
//! Clients send MongoDB-style filters. This crate turns them into validated,
//! parameterized, dialect-specific SQL over tables that keep documents in a
//! JSON column next to a native identity column:
//! - Parse nested filter JSON into a [`FilterNode`] tree
//! - Compile each node through an operator strategy into a [`SqlPredicate`]
//! - Assemble WHERE, ORDER BY and pagination into a [`FilterResult`]
//!
//! ## Translating a request
//!
//! ```rust
//! use docgate_query::prelude::*;
//! use serde_json::json;
//!
//! let translator = FilterTranslator::for_kind(DialectKind::Postgres);
//! let request = FilterRequest::from_json(&json!({
//!     "filter": {"$or": [{"category": "a"}, {"price": {"$gt": 100}}]},
//!     "options": {"limit": 5, "skip": 10, "sort": {"price": -1}}
//! })).unwrap();
//!
//! let result = translator.translate(&request).unwrap();
//! let (sql, values) = result.to_positional(translator.dialect());
//! assert_eq!(
//!     sql,
//!     "(data ->> 'category' = $1 OR \
//!      CASE WHEN jsonb_typeof(data -> 'price') = 'number' THEN (data ->> 'price')::numeric END > $2)"
//! );
//! assert_eq!(values, vec![FilterValue::from("a"), FilterValue::Int(100)]);
//! assert_eq!(result.order_by_clause.as_deref(), Some("data ->> 'price' DESC"));
//! assert_eq!(result.limit, Some(5));
//! assert_eq!(result.offset, Some(10));
//! ```
//!
//! ## Filter grammar
//!
//! | Form                         | Meaning                             |
//! |------------------------------|-------------------------------------|
//! | `{"f": v}`                   | implicit `$eq`                      |
//! | `{"f": {"$gt": 1, ...}}`     | operator map, conditions ANDed      |
//! | `{"a": 1, "b": 2}`           | implicit AND of siblings            |
//! | `{"$and"/"$or"/"$nor": [..]}`| logical combinators over filters    |
//! | `{"$not": {..}}`             | negation of one filter              |
//!
//! Comparison operators: `$eq $ne $gt $gte $lt $lte $in $nin $regex $exists
//! $type`, plus `$options` alongside `$regex`.
//!
//! ## Dialects
//!
//! [`DialectKind`] selects a built-in [`DatabaseDialect`]: PostgreSQL, MySQL,
//! SQLite or SQL Server. The dialect is injected into the translator, so
//! several can coexist in one process.

pub mod dialect;
pub mod error;
pub mod layout;
pub mod logging;
pub mod node;
pub mod operator;
pub mod parser;
pub mod pattern;
pub mod predicate;
pub mod request;
pub mod result;
pub mod sql;
pub mod translator;
pub mod types;
pub mod value;

pub use dialect::{
    Comparison, DatabaseDialect, DialectKind, MsSqlDialect, MySqlDialect, PostgresDialect,
    SqliteDialect,
};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use layout::{DocumentLayout, FieldTarget, JsonPath, PathSegment};
pub use node::{Condition, FieldFilter, FilterNode};
pub use operator::{CompileContext, ComparisonOperator, LogicalOperator, Operator};
pub use parser::{DEFAULT_MAX_DEPTH, FilterParser, parse_filter};
pub use pattern::{PatternSyntax, RegexOptions, regex_to_glob, regex_to_like};
pub use predicate::{Parameters, SqlPredicate};
pub use request::{FilterOptions, FilterRequest, Projection, ReservedParams, parse_sort_param};
pub use result::{FilterResult, FilterResultBuilder};
pub use translator::FilterTranslator;
pub use types::{JsonType, SortField, SortOrder};
pub use value::FilterValue;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::{DatabaseDialect, DialectKind};
    pub use crate::error::{ErrorCode, QueryError, QueryResult};
    pub use crate::layout::DocumentLayout;
    pub use crate::node::FilterNode;
    pub use crate::operator::{ComparisonOperator, LogicalOperator, Operator};
    pub use crate::parser::FilterParser;
    pub use crate::predicate::SqlPredicate;
    pub use crate::request::{FilterOptions, FilterRequest};
    pub use crate::result::FilterResult;
    pub use crate::translator::FilterTranslator;
    pub use crate::types::{SortField, SortOrder};
    pub use crate::value::FilterValue;
}
