//! Filter operators and their SQL compilation strategies.
//!
//! Operators are closed enums dispatched by exhaustive `match`. Lookup is
//! case-insensitive against both the `$`-prefixed symbol and the bare name:
//!
//! ```rust
//! use docgate_query::{ComparisonOperator, LogicalOperator, Operator};
//!
//! assert_eq!(
//!     Operator::from_symbol("$GTE").unwrap(),
//!     Operator::Comparison(ComparisonOperator::Gte)
//! );
//! assert_eq!(
//!     Operator::from_symbol("or").unwrap(),
//!     Operator::Logical(LogicalOperator::Or)
//! );
//! assert!(Operator::from_symbol("$near").is_err());
//! ```

use std::fmt;

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::dialect::{Comparison, DatabaseDialect};
use crate::error::{QueryError, QueryResult};
use crate::layout::{DocumentLayout, FieldTarget};
use crate::pattern::RegexOptions;
use crate::predicate::{SqlPredicate, next_param_name};
use crate::types::JsonType;
use crate::value::FilterValue;

/// What a compilation step needs: the dialect and the table layout.
#[derive(Debug, Clone, Copy)]
pub struct CompileContext<'a> {
    /// Target dialect.
    pub dialect: &'a dyn DatabaseDialect,
    /// Table layout used to resolve field names.
    pub layout: &'a DocumentLayout,
}

impl<'a> CompileContext<'a> {
    /// Create a new context.
    pub fn new(dialect: &'a dyn DatabaseDialect, layout: &'a DocumentLayout) -> Self {
        Self { dialect, layout }
    }

    /// Mint a parameter for `field`, returning its name and placeholder.
    fn bind(&self, field: &str) -> (String, String) {
        let name = next_param_name(field);
        let placeholder = self.dialect.placeholder(&name);
        (name, placeholder)
    }
}

/// Field-level comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// Equality.
    Eq,
    /// Inequality. Also matches documents missing the field.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Membership in a list.
    In,
    /// Non-membership in a list. Also matches documents missing the field.
    Nin,
    /// Regular-expression match.
    Regex,
    /// Key presence.
    Exists,
    /// JSON type check.
    Type,
}

impl ComparisonOperator {
    /// Every comparison operator.
    pub const ALL: [ComparisonOperator; 11] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::Nin,
        Self::Regex,
        Self::Exists,
        Self::Type,
    ];

    /// Canonical symbol (`$eq`).
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Regex => "$regex",
            Self::Exists => "$exists",
            Self::Type => "$type",
        }
    }

    /// Bare name (`eq`).
    pub fn name(&self) -> &'static str {
        &self.symbol()[1..]
    }

    /// Check whether `value` is an acceptable operand.
    pub fn is_valid_value(&self, value: &JsonValue) -> bool {
        match self {
            Self::Eq | Self::Ne => !value.is_null(),
            Self::Gt | Self::Gte | Self::Lt | Self::Lte => FilterValue::numeric_of(value).is_some(),
            Self::In | Self::Nin => value.is_array(),
            Self::Regex | Self::Type => value.is_string(),
            Self::Exists => value.is_boolean(),
        }
    }

    fn expectation(&self) -> &'static str {
        match self {
            Self::Eq | Self::Ne => "value must not be null",
            Self::Gt | Self::Gte | Self::Lt | Self::Lte => "value must be numeric",
            Self::In | Self::Nin => "value must be an array",
            Self::Regex => "pattern must be a string",
            Self::Exists => "value must be a boolean",
            Self::Type => "type name must be a string",
        }
    }

    /// Compile this operator applied to `field` with `value`.
    pub fn apply(
        &self,
        ctx: &CompileContext<'_>,
        field: &str,
        value: &JsonValue,
    ) -> QueryResult<SqlPredicate> {
        self.apply_with_options(ctx, field, value, None)
    }

    /// Compile this operator with `$options` (only meaningful for `$regex`).
    pub fn apply_with_options(
        &self,
        ctx: &CompileContext<'_>,
        field: &str,
        value: &JsonValue,
        options: Option<&str>,
    ) -> QueryResult<SqlPredicate> {
        if !self.is_valid_value(value) {
            let err = QueryError::invalid_value(
                self.symbol(),
                field,
                format!("{}, got {}", self.expectation(), value),
            );
            return Err(match self {
                Self::Eq | Self::Ne if value.is_null() => {
                    err.with_suggestion("Use $exists or {\"$type\": \"null\"} to match missing or null fields")
                }
                _ => err,
            });
        }

        let target = ctx.layout.target(field);

        match self {
            Self::Eq => equality(ctx, field, &target, value, false),
            Self::Ne => equality(ctx, field, &target, value, true),
            Self::Gt => comparison(ctx, field, &target, value, Comparison::Gt),
            Self::Gte => comparison(ctx, field, &target, value, Comparison::Gte),
            Self::Lt => comparison(ctx, field, &target, value, Comparison::Lt),
            Self::Lte => comparison(ctx, field, &target, value, Comparison::Lte),
            Self::In => membership(ctx, field, &target, value, false, self.symbol()),
            Self::Nin => membership(ctx, field, &target, value, true, self.symbol()),
            Self::Regex => {
                let options = match options {
                    Some(options) => RegexOptions::parse(field, options)?,
                    None => RegexOptions::default(),
                };
                regex(ctx, field, &target, value, options)
            }
            Self::Exists => {
                let exists = value.as_bool().unwrap_or(true);
                Ok(SqlPredicate::raw(ctx.dialect.exists(&target, exists)))
            }
            Self::Type => {
                let name = value.as_str().unwrap_or_default();
                match JsonType::from_name(name) {
                    Some(json_type) => Ok(SqlPredicate::raw(ctx.dialect.type_check(&target, json_type))),
                    None => {
                        warn!(field = %field, type_name = %name, "Unknown $type name, condition ignored");
                        Ok(SqlPredicate::always_true())
                    }
                }
            }
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn equality(
    ctx: &CompileContext<'_>,
    field: &str,
    target: &FieldTarget,
    value: &JsonValue,
    negate: bool,
) -> QueryResult<SqlPredicate> {
    let (name, placeholder) = ctx.bind(field);
    let dialect = ctx.dialect;

    match target {
        FieldTarget::Identity { .. } => {
            if value.is_object() || value.is_array() {
                return Err(QueryError::invalid_value(
                    if negate { "$ne" } else { "$eq" },
                    field,
                    "identity cannot be compared with a structured value",
                ));
            }
            let fragment = if negate {
                dialect.not_equals(target, &placeholder)
            } else {
                dialect.equals(target, &placeholder)
            };
            Ok(SqlPredicate::new(fragment, [(name, FilterValue::from_json(value))]))
        }
        FieldTarget::Json { column, path } if value.is_object() || value.is_array() => {
            let fragment = if negate {
                dialect.json_not_equals(column, path, &placeholder)
            } else {
                dialect.json_equals(column, path, &placeholder)
            };
            Ok(SqlPredicate::new(fragment, [(name, FilterValue::Json(value.clone()))]))
        }
        FieldTarget::Json { .. } => {
            let fragment = if negate {
                dialect.not_equals(target, &placeholder)
            } else {
                dialect.equals(target, &placeholder)
            };
            Ok(SqlPredicate::new(fragment, [(name, dialect.text_param(value))]))
        }
    }
}

fn comparison(
    ctx: &CompileContext<'_>,
    field: &str,
    target: &FieldTarget,
    value: &JsonValue,
    op: Comparison,
) -> QueryResult<SqlPredicate> {
    let number = FilterValue::numeric_of(value).ok_or_else(|| {
        QueryError::invalid_value(op.as_sql(), field, format!("value must be numeric, got {}", value))
    })?;
    let (name, placeholder) = ctx.bind(field);
    Ok(SqlPredicate::new(
        ctx.dialect.compare(target, op, &placeholder),
        [(name, number)],
    ))
}

fn membership(
    ctx: &CompileContext<'_>,
    field: &str,
    target: &FieldTarget,
    value: &JsonValue,
    negate: bool,
    symbol: &str,
) -> QueryResult<SqlPredicate> {
    let items = value.as_array().map(Vec::as_slice).unwrap_or_default();

    if items.is_empty() {
        return Ok(if negate {
            SqlPredicate::always_true()
        } else {
            SqlPredicate::always_false()
        });
    }

    let mut placeholders = Vec::with_capacity(items.len());
    let mut parameters = Vec::with_capacity(items.len());

    for item in items {
        if item.is_null() || item.is_object() || item.is_array() {
            return Err(QueryError::invalid_value(
                symbol,
                field,
                format!("list elements must be scalars, got {}", item),
            ));
        }
        let (name, placeholder) = ctx.bind(field);
        let bound = if target.is_identity() {
            FilterValue::from_json(item)
        } else {
            ctx.dialect.text_param(item)
        };
        placeholders.push(placeholder);
        parameters.push((name, bound));
    }

    let fragment = if negate {
        ctx.dialect.not_in_list(target, &placeholders)
    } else {
        ctx.dialect.in_list(target, &placeholders)
    };
    Ok(SqlPredicate::new(fragment, parameters))
}

fn regex(
    ctx: &CompileContext<'_>,
    field: &str,
    target: &FieldTarget,
    value: &JsonValue,
    options: RegexOptions,
) -> QueryResult<SqlPredicate> {
    let pattern = value.as_str().unwrap_or_default();

    if let Err(e) = regex_lite::Regex::new(pattern) {
        return Err(QueryError::invalid_value(
            "$regex",
            field,
            format!("invalid pattern: {}", e),
        ));
    }

    let (name, placeholder) = ctx.bind(field);
    let dialect = ctx.dialect;

    if dialect.supports_native_regex() {
        Ok(SqlPredicate::new(
            dialect.regex_match(target, &placeholder, options.case_insensitive),
            [(name, FilterValue::String(pattern.to_string()))],
        ))
    } else {
        Ok(SqlPredicate::new(
            dialect.pattern_match(target, &placeholder, options.case_insensitive),
            [(
                name,
                FilterValue::String(dialect.emulated_pattern(pattern, options.case_insensitive)),
            )],
        ))
    }
}

/// Boolean combinators over sub-filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    /// All children match.
    And,
    /// Any child matches.
    Or,
    /// The single child does not match.
    Not,
    /// No child matches.
    Nor,
}

impl LogicalOperator {
    /// Every logical operator.
    pub const ALL: [LogicalOperator; 4] = [Self::And, Self::Or, Self::Not, Self::Nor];

    /// Canonical symbol (`$and`).
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::And => "$and",
            Self::Or => "$or",
            Self::Not => "$not",
            Self::Nor => "$nor",
        }
    }

    /// Bare name (`and`).
    pub fn name(&self) -> &'static str {
        &self.symbol()[1..]
    }

    /// Combine compiled children.
    ///
    /// `$and` of nothing is always-true, `$or` of nothing always-false, and
    /// `$nor` is the negation of `$or`. `$not` takes exactly one child.
    pub fn combine(&self, children: Vec<SqlPredicate>) -> QueryResult<SqlPredicate> {
        match self {
            Self::And => Ok(SqlPredicate::and(children)),
            Self::Or => Ok(SqlPredicate::or(children)),
            Self::Nor => Ok(SqlPredicate::not(SqlPredicate::or(children))),
            Self::Not => {
                let count = children.len();
                let mut children = children.into_iter();
                match (children.next(), count) {
                    (Some(child), 1) => Ok(SqlPredicate::not(child)),
                    _ => Err(QueryError::invalid_filter(format!(
                        "$not takes exactly one condition, got {}",
                        count
                    ))
                    .with_operator("$not")),
                }
            }
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Any filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// A field-level comparison.
    Comparison(ComparisonOperator),
    /// A boolean combinator.
    Logical(LogicalOperator),
}

impl Operator {
    /// Resolve an operator by symbol (`$eq`) or name (`eq`), ignoring case.
    pub fn from_symbol(symbol: &str) -> QueryResult<Self> {
        let wanted = symbol.trim().to_lowercase();

        if let Some(op) = ComparisonOperator::ALL
            .iter()
            .find(|op| op.symbol() == wanted || op.name() == wanted)
        {
            return Ok(Self::Comparison(*op));
        }

        if let Some(op) = LogicalOperator::ALL
            .iter()
            .find(|op| op.symbol() == wanted || op.name() == wanted)
        {
            return Ok(Self::Logical(*op));
        }

        Err(QueryError::unknown_operator(symbol))
    }

    /// Canonical symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Comparison(op) => op.symbol(),
            Self::Logical(op) => op.symbol(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
