//! Recursive-descent parser from client filter JSON to a [`FilterNode`] tree.
//!
//! ```rust
//! use docgate_query::{FilterNode, FilterParser};
//! use serde_json::json;
//!
//! let filter = json!({"status": "active", "price": {"$gte": 10, "$lte": 20}});
//! let node = FilterParser::new().parse_value(&filter).unwrap();
//! assert!(matches!(node, FilterNode::Composite(ref children) if children.len() == 2));
//! ```

use serde_json::{Map, Value as JsonValue};

use crate::error::{QueryError, QueryResult};
use crate::node::{Condition, FieldFilter, FilterNode};
use crate::operator::{ComparisonOperator, LogicalOperator, Operator};

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

const LOGICAL_SIGIL: char = '$';
const OPTIONS_KEY: &str = "$options";

/// Builds filter trees from MongoDB-style JSON.
#[derive(Debug, Clone, Copy)]
pub struct FilterParser {
    max_depth: usize,
}

impl Default for FilterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterParser {
    /// Create a parser with the default depth limit.
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The configured depth limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parse a filter value. `null` is treated as an empty filter; anything
    /// other than an object is rejected.
    pub fn parse_value(&self, filter: &JsonValue) -> QueryResult<FilterNode> {
        match filter {
            JsonValue::Null => Ok(FilterNode::match_all()),
            JsonValue::Object(map) => self.parse(map),
            other => Err(QueryError::invalid_filter(format!(
                "filter must be an object, got {}",
                type_name(other)
            ))),
        }
    }

    /// Parse a filter map.
    pub fn parse(&self, filter: &Map<String, JsonValue>) -> QueryResult<FilterNode> {
        self.parse_map(filter, 1)
    }

    fn parse_map(&self, filter: &Map<String, JsonValue>, depth: usize) -> QueryResult<FilterNode> {
        if depth > self.max_depth {
            return Err(QueryError::invalid_filter(format!(
                "filter nesting exceeds maximum depth of {}",
                self.max_depth
            )));
        }

        let mut nodes = Vec::with_capacity(filter.len());
        for (key, value) in filter {
            if key.starts_with(LOGICAL_SIGIL) {
                nodes.push(self.parse_logical(key, value, depth)?);
            } else {
                nodes.push(self.parse_field(key, value)?);
            }
        }

        if nodes.len() == 1 {
            if let Some(node) = nodes.pop() {
                return Ok(node);
            }
        }
        Ok(FilterNode::Composite(nodes))
    }

    fn parse_logical(&self, key: &str, value: &JsonValue, depth: usize) -> QueryResult<FilterNode> {
        let operator = match Operator::from_symbol(key)? {
            Operator::Logical(op) => op,
            Operator::Comparison(op) => {
                return Err(QueryError::invalid_filter(format!(
                    "{} must be nested under a field",
                    op.symbol()
                ))
                .with_operator(op.symbol()));
            }
        };

        let children = match operator {
            LogicalOperator::Not => match value {
                JsonValue::Object(map) => vec![self.parse_map(map, depth + 1)?],
                other => {
                    return Err(QueryError::invalid_filter(format!(
                        "$not requires a filter object, got {}",
                        type_name(other)
                    ))
                    .with_operator("$not"));
                }
            },
            LogicalOperator::And | LogicalOperator::Or | LogicalOperator::Nor => {
                let items = value.as_array().ok_or_else(|| {
                    QueryError::invalid_filter(format!(
                        "{} requires an array of filter objects, got {}",
                        operator.symbol(),
                        type_name(value)
                    ))
                    .with_operator(operator.symbol())
                })?;
                items
                    .iter()
                    .map(|item| match item {
                        JsonValue::Object(map) => self.parse_map(map, depth + 1),
                        other => Err(QueryError::invalid_filter(format!(
                            "{} elements must be filter objects, got {}",
                            operator.symbol(),
                            type_name(other)
                        ))
                        .with_operator(operator.symbol())),
                    })
                    .collect::<QueryResult<Vec<_>>>()?
            }
        };

        Ok(FilterNode::Logical { operator, children })
    }

    fn parse_field(&self, field: &str, value: &JsonValue) -> QueryResult<FilterNode> {
        if field.is_empty() {
            return Err(QueryError::invalid_filter("field name must not be empty"));
        }

        let conditions = match value {
            JsonValue::Object(ops) => parse_operator_map(field, ops)?,
            direct => vec![Condition::new(ComparisonOperator::Eq, direct.clone())],
        };

        Ok(FilterNode::Field(FieldFilter {
            field: field.to_string(),
            conditions,
        }))
    }
}

fn parse_operator_map(field: &str, ops: &Map<String, JsonValue>) -> QueryResult<Vec<Condition>> {
    if ops.is_empty() {
        return Err(QueryError::invalid_filter(format!(
            "operator map for '{}' is empty",
            field
        ))
        .with_field(field));
    }

    let mut conditions = Vec::with_capacity(ops.len());
    let mut options = None;

    for (key, value) in ops {
        if key.eq_ignore_ascii_case(OPTIONS_KEY) {
            let flags = value.as_str().ok_or_else(|| {
                QueryError::invalid_value(OPTIONS_KEY, field, format!("options must be a string, got {}", value))
            })?;
            options = Some(flags.to_string());
            continue;
        }

        match Operator::from_symbol(key).map_err(|e| e.with_field(field))? {
            Operator::Comparison(operator) => conditions.push(Condition::new(operator, value.clone())),
            Operator::Logical(op) => {
                return Err(QueryError::invalid_filter(format!(
                    "logical operator {} cannot be applied to field '{}'",
                    op.symbol(),
                    field
                ))
                .with_field(field)
                .with_operator(op.symbol()));
            }
        }
    }

    if let Some(flags) = options {
        let regex = conditions
            .iter_mut()
            .find(|c| c.operator == ComparisonOperator::Regex)
            .ok_or_else(|| {
                QueryError::invalid_filter(format!("$options on '{}' requires $regex", field))
                    .with_field(field)
                    .with_operator(OPTIONS_KEY)
            })?;
        regex.options = Some(flags);
    }

    Ok(conditions)
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Parse a filter value with the default parser.
pub fn parse_filter(filter: &JsonValue) -> QueryResult<FilterNode> {
    FilterParser::new().parse_value(filter)
}
