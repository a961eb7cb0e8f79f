//! # docgate-config
//!
//! Gateway configuration for docgate.
//!
//! - [`GatewayConfig`]: `docgate.toml` with `${VAR}` interpolation
//! - [`EndpointRegistry`]: endpoints keyed by verb and path
//! - [`FilterValidator`]: per-endpoint field and operator allow-lists
//!
//! ```rust
//! use docgate_config::{GatewayConfig, HttpVerb};
//!
//! let config = GatewayConfig::parse(r#"
//!     [database]
//!     dialect = "sqlite"
//!
//!     [[endpoints]]
//!     path = "/products"
//!     table = "products"
//! "#).unwrap();
//!
//! let registry = config.registry().unwrap();
//! assert_eq!(registry.get(HttpVerb::Get, "/products").unwrap().table, "products");
//! ```

pub mod config;
pub mod endpoint;
pub mod env;
pub mod error;
pub mod validator;

pub use config::{DatabaseConfig, GatewayConfig, QueryConfig, StorageConfig};
pub use endpoint::{EndpointConfig, EndpointRegistry, HttpVerb, WILDCARD, normalize_path};
pub use env::{EnvSource, MapEnvSource, StdEnvSource, expand};
pub use error::{ConfigError, ConfigResult};
pub use validator::FilterValidator;
