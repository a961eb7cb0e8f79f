//! Filter tree produced by the parser.

use serde_json::Value as JsonValue;

use crate::error::QueryResult;
use crate::operator::{CompileContext, ComparisonOperator, LogicalOperator};
use crate::predicate::SqlPredicate;

/// A node of a parsed filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Implicit AND of sibling conditions. Empty means "match everything".
    Composite(Vec<FilterNode>),
    /// Conditions on a single field.
    Field(FieldFilter),
    /// An explicit logical operator.
    Logical {
        /// The operator.
        operator: LogicalOperator,
        /// Operands.
        children: Vec<FilterNode>,
    },
}

/// One or more conditions on a single field, implicitly ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Client field name (dotted path).
    pub field: String,
    /// Conditions in request order.
    pub conditions: Vec<Condition>,
}

/// A single `operator: value` pair on a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The operator.
    pub operator: ComparisonOperator,
    /// Raw operand.
    pub value: JsonValue,
    /// `$options` flags, for `$regex`.
    pub options: Option<String>,
}

impl Condition {
    /// Create a condition without options.
    pub fn new(operator: ComparisonOperator, value: JsonValue) -> Self {
        Self {
            operator,
            value,
            options: None,
        }
    }
}

impl FieldFilter {
    /// Field with a single implicit-equality condition.
    pub fn equals(field: impl Into<String>, value: JsonValue) -> Self {
        Self {
            field: field.into(),
            conditions: vec![Condition::new(ComparisonOperator::Eq, value)],
        }
    }
}

impl FilterNode {
    /// A node matching every row.
    pub fn match_all() -> Self {
        Self::Composite(Vec::new())
    }

    /// Check if this is an empty composite.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Composite(children) if children.is_empty())
    }

    /// Nesting depth; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Field(_) => 1,
            Self::Composite(children) | Self::Logical { children, .. } => {
                1 + children.iter().map(FilterNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Visit every field condition in the tree, depth first.
    pub fn try_for_each_condition<E>(
        &self,
        f: &mut impl FnMut(&str, &Condition) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            Self::Field(filter) => {
                for condition in &filter.conditions {
                    f(&filter.field, condition)?;
                }
                Ok(())
            }
            Self::Composite(children) | Self::Logical { children, .. } => {
                for child in children {
                    child.try_for_each_condition(f)?;
                }
                Ok(())
            }
        }
    }

    /// Compile the tree into a parameterized predicate.
    pub fn to_predicate(&self, ctx: &CompileContext<'_>) -> QueryResult<SqlPredicate> {
        match self {
            Self::Composite(children) => {
                let compiled = children
                    .iter()
                    .map(|child| child.to_predicate(ctx))
                    .collect::<QueryResult<Vec<_>>>()?;
                Ok(collapse_and(compiled))
            }
            Self::Field(filter) => {
                let compiled = filter
                    .conditions
                    .iter()
                    .map(|c| {
                        c.operator
                            .apply_with_options(ctx, &filter.field, &c.value, c.options.as_deref())
                    })
                    .collect::<QueryResult<Vec<_>>>()?;
                Ok(collapse_and(compiled))
            }
            Self::Logical { operator, children } => {
                let compiled = children
                    .iter()
                    .map(|child| child.to_predicate(ctx))
                    .collect::<QueryResult<Vec<_>>>()?;
                operator.combine(compiled)
            }
        }
    }
}

/// AND a list, returning a single element unwrapped.
fn collapse_and(mut predicates: Vec<SqlPredicate>) -> SqlPredicate {
    if predicates.len() == 1 {
        if let Some(only) = predicates.pop() {
            return only;
        }
    }
    SqlPredicate::and(predicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::layout::DocumentLayout;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_depth() {
        let leaf = FilterNode::Field(FieldFilter::equals("a", json!(1)));
        assert_eq!(leaf.depth(), 1);
        let tree = FilterNode::Logical {
            operator: LogicalOperator::Or,
            children: vec![FilterNode::Composite(vec![leaf.clone()]), leaf],
        };
        assert_eq!(tree.depth(), 3);
        assert_eq!(FilterNode::match_all().depth(), 1);
    }

    #[test]
    fn test_empty_composite_is_always_true() {
        let layout = DocumentLayout::default();
        let ctx = CompileContext::new(DialectKind::Postgres.dialect(), &layout);
        assert!(FilterNode::match_all().to_predicate(&ctx).unwrap().is_always_true());
    }

    #[test]
    fn test_single_condition_not_wrapped() {
        let layout = DocumentLayout::default();
        let ctx = CompileContext::new(DialectKind::Postgres.dialect(), &layout);
        let node = FilterNode::Composite(vec![FilterNode::Field(FieldFilter::equals("a", json!("x")))]);
        let p = node.to_predicate(&ctx).unwrap();
        assert!(p.fragment().starts_with("data ->> 'a' = :a_"));
    }

    #[test]
    fn test_visit_conditions() {
        let node = FilterNode::Logical {
            operator: LogicalOperator::And,
            children: vec![
                FilterNode::Field(FieldFilter::equals("a", json!(1))),
                FilterNode::Field(FieldFilter::equals("b", json!(2))),
            ],
        };
        let mut seen = Vec::new();
        node.try_for_each_condition::<()>(&mut |field, c| {
            seen.push((field.to_string(), c.operator));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), ComparisonOperator::Eq),
                ("b".to_string(), ComparisonOperator::Eq)
            ]
        );
    }
}
