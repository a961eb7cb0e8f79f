//! Client filter requests and their query-parameter form.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{QueryError, QueryResult};
use crate::types::{SortField, SortOrder};

/// One client query intent: a filter plus options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    /// MongoDB-style filter map.
    #[serde(default)]
    pub filter: Map<String, JsonValue>,
    /// Sort, pagination and projection.
    #[serde(default)]
    pub options: FilterOptions,
}

/// Sort, pagination and projection options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Sort keys in priority order, each `1`/`-1` (or `"asc"`/`"desc"`).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub sort: Map<String, JsonValue>,
    /// Maximum number of rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Number of rows to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    /// Field projection (`{field: 0|1}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<Map<String, JsonValue>>,
}

impl FilterRequest {
    /// Create a request from a filter map.
    pub fn new(filter: Map<String, JsonValue>) -> Self {
        Self {
            filter,
            options: FilterOptions::default(),
        }
    }

    /// Deserialize a request body.
    pub fn from_json(body: &JsonValue) -> QueryResult<Self> {
        Self::deserialize(body)
            .map_err(|e| QueryError::invalid_filter(format!("malformed filter request: {}", e)))
    }

    /// Parse a request body from text.
    pub fn from_json_str(body: &str) -> QueryResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| QueryError::invalid_filter(format!("malformed filter request: {}", e)))
    }

    /// Add a sort key.
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.options
            .sort
            .insert(field.into(), JsonValue::from(order.as_i64()));
        self
    }

    /// Set the limit.
    pub fn limit(mut self, limit: i64) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// Set the skip.
    pub fn skip(mut self, skip: i64) -> Self {
        self.options.skip = Some(skip);
        self
    }

    /// Build a request from flat query parameters.
    ///
    /// Non-reserved parameters become implicit string equalities. `limit`,
    /// `skip` (alias `offset`) and `sort` populate options; other reserved
    /// names are left to their owning subsystems. A repeated filter parameter
    /// keeps its last value.
    pub fn from_query_params<I, K, V>(params: I, reserved: &ReservedParams) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::default();

        for (key, value) in params {
            let key = key.as_ref();
            let value = value.as_ref();

            if !reserved.contains(key) {
                request
                    .filter
                    .insert(key.to_string(), JsonValue::String(value.to_string()));
                continue;
            }

            match key.to_lowercase().as_str() {
                "limit" => request.options.limit = Some(parse_int("limit", value)?),
                "skip" | "offset" => request.options.skip = Some(parse_int("skip", value)?),
                "sort" => {
                    for sort in parse_sort_param(value)? {
                        request
                            .options
                            .sort
                            .insert(sort.field, JsonValue::from(sort.order.as_i64()));
                    }
                }
                _ => {}
            }
        }

        Ok(request)
    }
}

fn parse_int(name: &str, value: &str) -> QueryResult<i64> {
    value.trim().parse::<i64>().map_err(|_| {
        QueryError::invalid_value(name, name, format!("expected an integer, got '{}'", value))
    })
}

/// Parse a `sort` query parameter: comma-separated fields, `-` prefix for
/// descending, optional `+` for ascending.
pub fn parse_sort_param(value: &str) -> QueryResult<Vec<SortField>> {
    let mut fields = Vec::new();

    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (field, order) = if let Some(rest) = part.strip_prefix('-') {
            (rest.trim(), SortOrder::Desc)
        } else if let Some(rest) = part.strip_prefix('+') {
            (rest.trim(), SortOrder::Asc)
        } else {
            (part, SortOrder::Asc)
        };

        if field.is_empty() {
            return Err(QueryError::invalid_sort(part, "missing field name"));
        }
        fields.push(SortField::new(field, order));
    }

    Ok(fields)
}

/// Query-parameter names that are never treated as filter fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedParams {
    names: HashSet<String>,
}

impl ReservedParams {
    /// Names reserved for pagination, sorting and change-feed controls.
    pub const DEFAULT: [&'static str; 10] = [
        "limit",
        "skip",
        "offset",
        "sort",
        "fields",
        "page",
        "page_size",
        "cursor",
        "since",
        "checkpoint",
    ];

    /// Reserve additional names.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.names
            .extend(extra.into_iter().map(|s| s.as_ref().to_lowercase()));
        self
    }

    /// Check whether a name is reserved (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }
}

impl Default for ReservedParams {
    fn default() -> Self {
        Self {
            names: Self::DEFAULT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Field projection: either an inclusion list or an exclusion list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Whether listed fields are included (`true`) or excluded.
    pub include: bool,
    /// Listed fields, excluding the identity field.
    pub fields: Vec<String>,
    /// Whether the identity field is returned.
    pub identity: bool,
}

impl Projection {
    /// Validate a `{field: 0|1}` map.
    ///
    /// Inclusion and exclusion cannot be mixed, except that the identity field
    /// may be excluded from an inclusion projection (and vice versa).
    pub fn parse(spec: &Map<String, JsonValue>, identity_field: &str) -> QueryResult<Self> {
        let mut include: Option<bool> = None;
        let mut identity = true;
        let mut fields = Vec::new();

        for (field, flag) in spec {
            let flag = match flag {
                JsonValue::Bool(b) => *b,
                JsonValue::Number(n) => match n.as_i64() {
                    Some(0) => false,
                    Some(1) => true,
                    _ => {
                        return Err(QueryError::invalid_projection(format!(
                            "projection for '{}' must be 0 or 1, got {}",
                            field, n
                        ))
                        .with_field(field));
                    }
                },
                other => {
                    return Err(QueryError::invalid_projection(format!(
                        "projection for '{}' must be 0, 1, true or false, got {}",
                        field, other
                    ))
                    .with_field(field));
                }
            };

            if field == identity_field {
                identity = flag;
                continue;
            }

            match include {
                None => include = Some(flag),
                Some(mode) if mode != flag => {
                    return Err(QueryError::invalid_projection(
                        "projection cannot mix inclusion and exclusion",
                    )
                    .with_field(field));
                }
                Some(_) => {}
            }
            fields.push(field.clone());
        }

        Ok(Self {
            include: include.unwrap_or(false),
            fields,
            identity,
        })
    }

    /// Check whether a field is returned.
    pub fn includes(&self, field: &str) -> bool {
        let listed = self.fields.iter().any(|f| f == field);
        if self.include { listed } else { !listed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_from_json() {
        let request = FilterRequest::from_json(&json!({
            "filter": {"status": "active"},
            "options": {"sort": {"price": -1, "name": 1}, "limit": 5, "skip": 10}
        }))
        .unwrap();
        assert_eq!(request.filter.get("status"), Some(&json!("active")));
        assert_eq!(request.options.limit, Some(5));
        assert_eq!(request.options.skip, Some(10));
        let keys: Vec<&String> = request.options.sort.keys().collect();
        assert_eq!(keys, vec!["price", "name"]);
    }

    #[test]
    fn test_request_defaults() {
        let request = FilterRequest::from_json(&json!({})).unwrap();
        assert!(request.filter.is_empty());
        assert_eq!(request.options, FilterOptions::default());
    }

    #[test]
    fn test_request_malformed() {
        let err = FilterRequest::from_json(&json!({"filter": []})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFilter);
        assert!(FilterRequest::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_parse_sort_param() {
        assert_eq!(
            parse_sort_param("-price, name,+age").unwrap(),
            vec![
                SortField::desc("price"),
                SortField::asc("name"),
                SortField::asc("age")
            ]
        );
        assert!(parse_sort_param("").unwrap().is_empty());
        assert_eq!(
            parse_sort_param("-").unwrap_err().code,
            ErrorCode::InvalidSort
        );
    }

    #[test]
    fn test_from_query_params() {
        let reserved = ReservedParams::default();
        let request = FilterRequest::from_query_params(
            [
                ("status", "active"),
                ("limit", "5"),
                ("offset", "10"),
                ("sort", "-price"),
                ("cursor", "abc"),
            ],
            &reserved,
        )
        .unwrap();
        assert_eq!(request.filter.len(), 1);
        assert_eq!(request.filter.get("status"), Some(&json!("active")));
        assert_eq!(request.options.limit, Some(5));
        assert_eq!(request.options.skip, Some(10));
        assert_eq!(request.options.sort.get("price"), Some(&json!(-1)));
    }

    #[test]
    fn test_query_params_bad_limit() {
        let err = FilterRequest::from_query_params([("limit", "ten")], &ReservedParams::default())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFilterValue);
    }

    #[test]
    fn test_reserved_extra() {
        let reserved = ReservedParams::default().with_extra(["Format"]);
        assert!(reserved.contains("format"));
        assert!(reserved.contains("LIMIT"));
        assert!(!reserved.contains("status"));
    }

    #[test]
    fn test_projection_inclusion() {
        let spec = json!({"name": 1, "price": 1, "_id": 0});
        let projection = Projection::parse(spec.as_object().unwrap(), "_id").unwrap();
        assert!(projection.include);
        assert!(!projection.identity);
        assert!(projection.includes("name"));
        assert!(!projection.includes("secret"));
    }

    #[test]
    fn test_projection_exclusion() {
        let spec = json!({"secret": 0});
        let projection = Projection::parse(spec.as_object().unwrap(), "_id").unwrap();
        assert!(!projection.include);
        assert!(projection.identity);
        assert!(projection.includes("name"));
        assert!(!projection.includes("secret"));
    }

    #[test]
    fn test_projection_identity_only() {
        let spec = json!({"_id": 0});
        let projection = Projection::parse(spec.as_object().unwrap(), "_id").unwrap();
        assert!(!projection.identity);
        assert!(projection.includes("anything"));
    }

    #[test]
    fn test_projection_mixed_rejected() {
        let spec = json!({"a": 1, "b": 0});
        let err = Projection::parse(spec.as_object().unwrap(), "_id").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidProjection);

        let spec = json!({"a": 2});
        assert!(Projection::parse(spec.as_object().unwrap(), "_id").is_err());
    }
}
