//! # docgate
//!
//! A configuration-driven data gateway that stores JSON documents in a
//! relational table and answers MongoDB-style filters with parameterized,
//! dialect-specific SQL.
//!
//! ## Crates
//!
//! - [`query`]: the filter-expression compiler (parser, operators, dialects,
//!   translator)
//! - [`config`]: `docgate.toml` loading, endpoint registry and allow-lists
//!
//! ## Quick start
//!
//! ```rust
//! use docgate::prelude::*;
//! use serde_json::json;
//!
//! let gateway = Gateway::from_config(GatewayConfig::parse(r#"
//!     [database]
//!     dialect = "postgres"
//!
//!     [[endpoints]]
//!     path = "/products"
//!     table = "products"
//!
//!     [endpoints.filterable]
//!     category = ["$eq"]
//!     price = ["$gt", "$lt"]
//! "#).unwrap()).unwrap();
//!
//! let request = FilterRequest::from_json(&json!({
//!     "filter": {"category": "books", "price": {"$lt": 20}}
//! })).unwrap();
//!
//! let prepared = gateway.prepare(HttpVerb::Get, "/products", &request).unwrap();
//! let (sql, values) = prepared.result.to_positional(gateway.dialect());
//!
//! assert_eq!(prepared.table, "products");
//! assert_eq!(
//!     sql,
//!     "(data ->> 'category' = $1 AND \
//!      CASE WHEN jsonb_typeof(data -> 'price') = 'number' THEN (data ->> 'price')::numeric END < $2)"
//! );
//! assert_eq!(values.len(), 2);
//! ```
//!
//! ## Features
//!
//! - `tracing-subscriber`: enables [`query::logging::init`] output

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info};

use docgate_config::{EndpointRegistry, FilterValidator, GatewayConfig, HttpVerb};
use docgate_query::{
    DatabaseDialect, FilterRequest, FilterResult, FilterTranslator, QueryError,
};

/// Re-export of the filter compiler.
pub mod query {
    pub use docgate_query::*;
}

/// Re-export of gateway configuration.
pub mod config {
    pub use docgate_config::*;
}

/// Errors surfaced by the gateway.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A filter, sort, projection or endpoint lookup was rejected.
    #[error(transparent)]
    #[diagnostic(code(docgate::query))]
    Query(#[from] QueryError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] docgate_config::ConfigError),
}

impl Error {
    /// Check if the error was caused by the client request.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Query(e) => e.is_client_error(),
            Self::Config(_) => false,
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A validated, translated request ready for the storage adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    /// Table backing the endpoint.
    pub table: String,
    /// Clauses and parameters.
    pub result: FilterResult,
}

/// Wires configuration, dialect, endpoint registry, validation and
/// translation together.
#[derive(Debug)]
pub struct Gateway {
    config: GatewayConfig,
    registry: EndpointRegistry,
    translator: FilterTranslator,
}

impl Gateway {
    /// Build a gateway from a parsed configuration.
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let registry = config.registry()?;
        let translator = config.translator()?;

        info!(
            dialect = %translator.dialect().name(),
            endpoints = registry.len(),
            "Gateway configured"
        );

        Ok(Self {
            config,
            registry,
            translator,
        })
    }

    /// Load `docgate.toml` from `path` and build a gateway.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(GatewayConfig::from_file(path)?)
    }

    /// The loaded configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The endpoint registry.
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// The translator for the configured dialect.
    pub fn translator(&self) -> &FilterTranslator {
        &self.translator
    }

    /// The configured dialect.
    pub fn dialect(&self) -> &dyn DatabaseDialect {
        self.translator.dialect()
    }

    /// Validate and translate a request against the endpoint at
    /// `(verb, path)`.
    pub fn prepare(&self, verb: HttpVerb, path: &str, request: &FilterRequest) -> Result<PreparedQuery> {
        let endpoint = self.registry.get(verb, path)?;
        let node = self.translator.parse(&request.filter)?;
        let sort = self.translator.sort_fields(&request.options)?;

        let validator = FilterValidator::new(endpoint, &self.translator.layout().identity_field);
        validator.validate(&node)?;
        validator.validate_sort(&sort)?;

        let result = self.translator.translate_parsed(&node, &request.options)?;

        debug!(verb = %verb, path = %path, table = %endpoint.table, "Prepared query");

        Ok(PreparedQuery {
            table: endpoint.table.clone(),
            result,
        })
    }

    /// Validate and translate flat query parameters.
    pub fn prepare_query_params<I, K, V>(&self, verb: HttpVerb, path: &str, params: I) -> Result<PreparedQuery>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = FilterRequest::from_query_params(params, self.translator.reserved_params())?;
        self.prepare(verb, path, &request)
    }
}

/// Commonly used types.
pub mod prelude {
    pub use crate::{Error, Gateway, PreparedQuery, Result};
    pub use docgate_config::{EndpointConfig, GatewayConfig, HttpVerb};
    pub use docgate_query::prelude::*;
}
