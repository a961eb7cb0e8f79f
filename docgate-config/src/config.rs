//! Configuration file parsing for `docgate.toml`.
//!
//! ```toml
//! [database]
//! url = "${DATABASE_URL:-postgres://localhost/app}"
//!
//! [storage]
//! identity_field = "_id"
//! identity_column = "id"
//! data_column = "data"
//!
//! [query]
//! default_limit = 50
//! max_limit = 500
//!
//! [[endpoints]]
//! path = "/products"
//! verb = "GET"
//! table = "products"
//! sortable = ["price", "name"]
//!
//! [endpoints.filterable]
//! status = ["$eq", "$in"]
//! price = ["*"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use docgate_query::{DEFAULT_MAX_DEPTH, DialectKind, DocumentLayout, FilterTranslator, ReservedParams};

use crate::endpoint::{EndpointConfig, EndpointRegistry};
use crate::env::{EnvSource, StdEnvSource, expand};
use crate::error::{ConfigError, ConfigResult};

/// Main configuration structure for `docgate.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Database selection.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Document table layout.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Query limits.
    #[serde(default)]
    pub query: QueryConfig,

    /// Endpoint definitions.
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl GatewayConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::from_file_with_env(path, &StdEnvSource)
    }

    /// Load configuration from a file path with a custom environment.
    pub fn from_file_with_env(path: impl AsRef<Path>, env: &dyn EnvSource) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!(path = %path.display(), "Loading gateway config");
        Self::parse_with_env(&content, env)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        Self::parse_with_env(content, &StdEnvSource)
    }

    /// Parse configuration from a TOML string with a custom environment.
    pub fn parse_with_env(content: &str, env: &dyn EnvSource) -> ConfigResult<Self> {
        let expanded = expand(content, env)?;
        let config: Self = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        self.database.dialect()?;

        if self.query.max_depth == 0 {
            return Err(ConfigError::invalid_value("query.max_depth", "must be at least 1"));
        }
        if let (Some(default), Some(max)) = (self.query.default_limit, self.query.max_limit) {
            if default > max {
                return Err(ConfigError::invalid_value(
                    "query.default_limit",
                    format!("{} exceeds max_limit {}", default, max),
                ));
            }
        }
        for (key, value) in [
            ("storage.identity_field", &self.storage.identity_field),
            ("storage.identity_column", &self.storage.identity_column),
            ("storage.data_column", &self.storage.data_column),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid_value(key, "must not be empty"));
            }
        }
        Ok(())
    }

    /// Build the endpoint registry.
    pub fn registry(&self) -> ConfigResult<EndpointRegistry> {
        EndpointRegistry::from_endpoints(self.endpoints.iter().cloned())
    }

    /// Build a translator for the configured dialect, layout and limits.
    pub fn translator(&self) -> ConfigResult<FilterTranslator> {
        let dialect = self.database.dialect()?;
        Ok(FilterTranslator::for_kind(dialect)
            .with_layout(self.storage.layout())
            .with_max_depth(self.query.max_depth)
            .with_default_limit(self.query.default_limit)
            .with_max_limit(self.query.max_limit)
            .with_reserved_params(self.query.reserved_params()))
    }
}

/// Database selection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Explicit dialect name (`postgres`, `mysql`, `sqlite`, `mssql`, or an
    /// alias).
    #[serde(default)]
    pub dialect: Option<String>,

    /// Connection URL, inspected when no dialect is given.
    #[serde(default)]
    pub url: Option<String>,
}

impl DatabaseConfig {
    /// Resolve the dialect: explicit name, then URL scheme, then PostgreSQL.
    pub fn dialect(&self) -> ConfigResult<DialectKind> {
        if let Some(name) = self.dialect.as_deref().filter(|n| !n.trim().is_empty()) {
            return DialectKind::from_name(name)
                .ok_or_else(|| ConfigError::UnknownDialect(name.to_string()));
        }

        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            match DialectKind::from_url(url) {
                Some(kind) => return Ok(kind),
                None => warn!("Could not infer dialect from database URL, using default"),
            }
        }

        Ok(DialectKind::default())
    }
}

/// Document table layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Client-facing identity field.
    #[serde(default = "default_identity_field")]
    pub identity_field: String,

    /// Native identity column.
    #[serde(default = "default_identity_column")]
    pub identity_column: String,

    /// JSON payload column.
    #[serde(default = "default_data_column")]
    pub data_column: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            identity_field: default_identity_field(),
            identity_column: default_identity_column(),
            data_column: default_data_column(),
        }
    }
}

impl StorageConfig {
    /// Convert to a compiler layout.
    pub fn layout(&self) -> DocumentLayout {
        DocumentLayout::new(
            self.identity_field.clone(),
            self.identity_column.clone(),
            self.data_column.clone(),
        )
    }
}

fn default_identity_field() -> String {
    "_id".to_string()
}

fn default_identity_column() -> String {
    "id".to_string()
}

fn default_data_column() -> String {
    "data".to_string()
}

/// Query limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Limit applied when a request gives none.
    #[serde(default)]
    pub default_limit: Option<u64>,

    /// Upper bound for requested limits.
    #[serde(default)]
    pub max_limit: Option<u64>,

    /// Maximum filter nesting depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Additional query-parameter names excluded from filters.
    #[serde(default)]
    pub extra_reserved_params: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: None,
            max_limit: None,
            max_depth: default_max_depth(),
            extra_reserved_params: Vec::new(),
        }
    }
}

impl QueryConfig {
    /// Reserved query-parameter names, defaults plus extras.
    pub fn reserved_params(&self) -> ReservedParams {
        ReservedParams::default().with_extra(&self.extra_reserved_params)
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
