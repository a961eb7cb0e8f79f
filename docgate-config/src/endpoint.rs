//! Endpoint definitions and the `(verb, path)` registry.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docgate_query::{ComparisonOperator, Operator, QueryError, QueryResult};

use crate::error::{ConfigError, ConfigResult};

/// Wildcard accepted in operator allow-lists and as a field key.
pub const WILDCARD: &str = "*";

/// HTTP verbs an endpoint can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    /// GET.
    #[serde(alias = "get")]
    Get,
    /// POST.
    #[serde(alias = "post")]
    Post,
    /// PUT.
    #[serde(alias = "put")]
    Put,
    /// PATCH.
    #[serde(alias = "patch")]
    Patch,
    /// DELETE.
    #[serde(alias = "delete")]
    Delete,
}

impl HttpVerb {
    /// Get the verb as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(ConfigError::invalid_value("verb", format!("unknown HTTP verb `{}`", other))),
        }
    }
}

/// One configured endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Request path, e.g. `/products`.
    pub path: String,

    /// HTTP verb.
    #[serde(default = "default_verb")]
    pub verb: HttpVerb,

    /// Backing table.
    pub table: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// Filterable fields mapped to allowed operator symbols.
    ///
    /// Absent means no restriction. `"*"` as an operator allows every
    /// operator; `"*"` as a field applies to fields not listed explicitly. A
    /// rule on `address` also covers `address.city`.
    #[serde(default)]
    pub filterable: Option<IndexMap<String, Vec<String>>>,

    /// Sortable fields. Absent means no restriction.
    #[serde(default)]
    pub sortable: Option<Vec<String>>,

    /// Embedded collection fields addressable as sub-entities.
    #[serde(default)]
    pub sub_entities: Vec<String>,
}

fn default_verb() -> HttpVerb {
    HttpVerb::Get
}

impl EndpointConfig {
    /// Create an unrestricted GET endpoint.
    pub fn new(path: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            path: normalize_path(&path.into()),
            verb: HttpVerb::Get,
            table: table.into(),
            description: None,
            filterable: None,
            sortable: None,
            sub_entities: Vec::new(),
        }
    }

    /// Set the verb.
    pub fn with_verb(mut self, verb: HttpVerb) -> Self {
        self.verb = verb;
        self
    }

    /// Allow filtering `field` with the given operator symbols.
    pub fn allow_filter<I, S>(mut self, field: impl Into<String>, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filterable
            .get_or_insert_with(IndexMap::new)
            .insert(field.into(), operators.into_iter().map(Into::into).collect());
        self
    }

    /// Allow sorting on `field`.
    pub fn allow_sort(mut self, field: impl Into<String>) -> Self {
        self.sortable.get_or_insert_with(Vec::new).push(field.into());
        self
    }

    /// Check that every operator symbol in the allow-list resolves.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::invalid_value("endpoints.path", "path must not be empty"));
        }
        if self.table.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                format!("endpoints[{}].table", self.path),
                "table must not be empty",
            ));
        }

        for (field, operators) in self.filterable.iter().flatten() {
            for symbol in operators {
                if symbol == WILDCARD {
                    continue;
                }
                match Operator::from_symbol(symbol) {
                    Ok(Operator::Comparison(_)) => {}
                    Ok(Operator::Logical(op)) => {
                        return Err(ConfigError::invalid_value(
                            format!("endpoints[{}].filterable.{}", self.path, field),
                            format!("logical operator `{}` cannot be restricted per field", op),
                        ));
                    }
                    Err(_) => {
                        return Err(ConfigError::invalid_value(
                            format!("endpoints[{}].filterable.{}", self.path, field),
                            format!("unknown operator `{}`", symbol),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Allowed operator symbols for `field`, or `None` when the field is not
    /// filterable.
    fn rule_for(&self, field: &str) -> Option<Option<&[String]>> {
        let Some(filterable) = &self.filterable else {
            return Some(None);
        };

        let mut candidate = field;
        loop {
            if let Some(ops) = filterable.get(candidate) {
                return Some(Some(ops.as_slice()));
            }
            match candidate.rfind('.') {
                Some(idx) => candidate = &candidate[..idx],
                None => break,
            }
        }

        filterable.get(WILDCARD).map(|ops| Some(ops.as_slice()))
    }

    /// Check whether `field` may be filtered at all.
    pub fn allows_field(&self, field: &str) -> bool {
        self.rule_for(field).is_some()
    }

    /// Check whether `operator` may be applied to `field`.
    pub fn allows_operator(&self, field: &str, operator: ComparisonOperator) -> bool {
        match self.rule_for(field) {
            None => false,
            Some(None) => true,
            Some(Some(symbols)) => symbols.iter().any(|symbol| {
                symbol == WILDCARD
                    || matches!(Operator::from_symbol(symbol), Ok(Operator::Comparison(op)) if op == operator)
            }),
        }
    }

    /// Check whether `field` may be sorted on.
    pub fn allows_sort(&self, field: &str) -> bool {
        match &self.sortable {
            None => true,
            Some(fields) => fields.iter().any(|f| f == field || f == WILDCARD),
        }
    }
}

/// Trim a trailing slash, keeping `/` itself.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.len() > 1 {
        trimmed.trim_end_matches('/').to_string()
    } else {
        trimmed.to_string()
    }
}

/// Endpoints keyed by `(verb, path)`.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: IndexMap<(HttpVerb, String), EndpointConfig>,
}

impl EndpointRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting duplicates and invalid allow-lists.
    pub fn from_endpoints(endpoints: impl IntoIterator<Item = EndpointConfig>) -> ConfigResult<Self> {
        let mut registry = Self::new();
        for endpoint in endpoints {
            registry.register(endpoint)?;
        }
        Ok(registry)
    }

    /// Add an endpoint.
    pub fn register(&mut self, mut endpoint: EndpointConfig) -> ConfigResult<()> {
        endpoint.validate()?;
        endpoint.path = normalize_path(&endpoint.path);
        let key = (endpoint.verb, endpoint.path.clone());

        if self.endpoints.contains_key(&key) {
            return Err(ConfigError::DuplicateEndpoint {
                verb: endpoint.verb.to_string(),
                path: endpoint.path,
            });
        }

        debug!(verb = %endpoint.verb, path = %endpoint.path, table = %endpoint.table, "Registered endpoint");
        self.endpoints.insert(key, endpoint);
        Ok(())
    }

    /// Look an endpoint up.
    pub fn get(&self, verb: HttpVerb, path: &str) -> QueryResult<&EndpointConfig> {
        let path = normalize_path(path);
        self.endpoints
            .get(&(verb, path.clone()))
            .ok_or_else(|| QueryError::unknown_endpoint(verb, path))
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Iterate over endpoints in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EndpointConfig> {
        self.endpoints.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgate_query::ErrorCode;
    use pretty_assertions::assert_eq;

    fn products() -> EndpointConfig {
        EndpointConfig::new("/products", "products")
            .allow_filter("status", ["$eq", "$in"])
            .allow_filter("price", ["*"])
            .allow_filter("address", ["eq"])
            .allow_sort("price")
    }

    #[test]
    fn test_verb_parse() {
        assert_eq!("get".parse::<HttpVerb>().unwrap(), HttpVerb::Get);
        assert_eq!("Patch".parse::<HttpVerb>().unwrap(), HttpVerb::Patch);
        assert!("TRACE".parse::<HttpVerb>().is_err());
    }

    #[test]
    fn test_allows_operator() {
        let endpoint = products();
        assert!(endpoint.allows_operator("status", ComparisonOperator::In));
        assert!(!endpoint.allows_operator("status", ComparisonOperator::Regex));
        assert!(endpoint.allows_operator("price", ComparisonOperator::Gt));
        assert!(!endpoint.allows_field("secret"));
    }

    #[test]
    fn test_nested_paths_inherit_rule() {
        let endpoint = products();
        assert!(endpoint.allows_operator("address.city", ComparisonOperator::Eq));
        assert!(!endpoint.allows_operator("address.city", ComparisonOperator::Ne));
    }

    #[test]
    fn test_wildcard_field() {
        let endpoint = EndpointConfig::new("/any", "any").allow_filter("*", ["$eq"]);
        assert!(endpoint.allows_operator("whatever", ComparisonOperator::Eq));
        assert!(!endpoint.allows_operator("whatever", ComparisonOperator::Gt));
    }

    #[test]
    fn test_unrestricted_endpoint() {
        let endpoint = EndpointConfig::new("/open", "open");
        assert!(endpoint.allows_operator("anything", ComparisonOperator::Regex));
        assert!(endpoint.allows_sort("anything"));
    }

    #[test]
    fn test_validate_rejects_unknown_operator() {
        let endpoint = EndpointConfig::new("/p", "p").allow_filter("a", ["$between"]);
        assert!(matches!(endpoint.validate(), Err(ConfigError::InvalidValue { .. })));
        let endpoint = EndpointConfig::new("/p", "p").allow_filter("a", ["$or"]);
        assert!(endpoint.validate().is_err());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = EndpointRegistry::from_endpoints([
            products(),
            products().with_verb(HttpVerb::Post),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(HttpVerb::Get, "/products/").unwrap().table, "products");

        let err = registry.get(HttpVerb::Delete, "/products").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownEndpoint);
    }

    #[test]
    fn test_registry_duplicate() {
        let err = EndpointRegistry::from_endpoints([products(), products()]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateEndpoint { .. }));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/a/b/"), "/a/b");
        assert_eq!(normalize_path("/"), "/");
    }
}
