//! Endpoint allow-list enforcement for parsed filters.

use docgate_query::{FilterNode, QueryError, QueryResult, SortField};

use crate::endpoint::EndpointConfig;

/// Checks a parsed filter and its sort keys against an endpoint's
/// allow-lists. The identity field is always filterable and sortable.
///
/// Validation is structural only: values are checked later, during
/// translation.
#[derive(Debug, Clone, Copy)]
pub struct FilterValidator<'a> {
    endpoint: &'a EndpointConfig,
    identity_field: &'a str,
}

impl<'a> FilterValidator<'a> {
    /// Create a validator for `endpoint`.
    pub fn new(endpoint: &'a EndpointConfig, identity_field: &'a str) -> Self {
        Self {
            endpoint,
            identity_field,
        }
    }

    /// Check every field condition in `node`.
    pub fn validate(&self, node: &FilterNode) -> QueryResult<()> {
        node.try_for_each_condition(&mut |field, condition| {
            if field == self.identity_field {
                return Ok(());
            }
            if !self.endpoint.allows_field(field) {
                return Err(QueryError::field_not_allowed(field));
            }
            if !self.endpoint.allows_operator(field, condition.operator) {
                return Err(QueryError::operator_not_allowed(field, condition.operator.symbol()));
            }
            Ok(())
        })
    }

    /// Check sort keys.
    pub fn validate_sort(&self, sort: &[SortField]) -> QueryResult<()> {
        for key in sort {
            if key.field != self.identity_field && !self.endpoint.allows_sort(&key.field) {
                return Err(QueryError::invalid_sort(
                    &key.field,
                    "sorting on this field is not allowed for this endpoint",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgate_query::{ErrorCode, parse_filter};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn endpoint() -> EndpointConfig {
        EndpointConfig::new("/products", "products")
            .allow_filter("status", ["$eq", "$in"])
            .allow_filter("price", ["$gt", "$gte", "$lt", "$lte"])
            .allow_sort("price")
    }

    #[test]
    fn test_allowed_filter_passes() {
        let endpoint = endpoint();
        let validator = FilterValidator::new(&endpoint, "_id");
        let node = parse_filter(&json!({
            "$or": [{"status": "a"}, {"price": {"$gt": 1}}],
            "_id": {"$ne": 3}
        }))
        .unwrap();
        assert!(validator.validate(&node).is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let endpoint = endpoint();
        let validator = FilterValidator::new(&endpoint, "_id");
        let node = parse_filter(&json!({"$not": {"secret": 1}})).unwrap();
        let err = validator.validate(&node).unwrap_err();
        assert_eq!(err.code, ErrorCode::FieldNotAllowed);
        assert_eq!(err.context.field.as_deref(), Some("secret"));
    }

    #[test]
    fn test_operator_rejected() {
        let endpoint = endpoint();
        let validator = FilterValidator::new(&endpoint, "_id");
        let node = parse_filter(&json!({"status": {"$regex": "^a"}})).unwrap();
        let err = validator.validate(&node).unwrap_err();
        assert_eq!(err.code, ErrorCode::OperatorNotAllowed);
        assert_eq!(err.context.operator.as_deref(), Some("$regex"));
    }

    #[test]
    fn test_sort_validation() {
        let endpoint = endpoint();
        let validator = FilterValidator::new(&endpoint, "_id");
        assert!(validator
            .validate_sort(&[SortField::desc("price"), SortField::asc("_id")])
            .is_ok());
        let err = validator.validate_sort(&[SortField::asc("status")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSort);
    }
}
