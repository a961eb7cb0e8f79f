//! Error types for configuration loading.

// Fields are read by the derive macros.
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading gateway configuration.
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    /// Error reading a file.
    #[error("failed to read config file: {path}")]
    #[diagnostic(code(docgate::config::io_error))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing TOML.
    #[error("failed to parse config: {0}")]
    #[diagnostic(code(docgate::config::toml_error))]
    Toml(#[from] toml::de::Error),

    /// Referenced environment variable is not set.
    #[error("environment variable `{0}` is not set")]
    #[diagnostic(
        code(docgate::config::missing_env),
        help("set the variable or give the reference a `:-` default")
    )]
    MissingEnvVar(String),

    /// Environment reference is malformed or a required variable reported an
    /// error.
    #[error("invalid environment reference `{name}`: {message}")]
    #[diagnostic(code(docgate::config::invalid_env))]
    InvalidEnvRef { name: String, message: String },

    /// A setting has an invalid value.
    #[error("invalid value for `{key}`: {message}")]
    #[diagnostic(code(docgate::config::invalid_value))]
    InvalidValue { key: String, message: String },

    /// Two endpoints share a verb and path.
    #[error("duplicate endpoint `{verb} {path}`")]
    #[diagnostic(code(docgate::config::duplicate_endpoint))]
    DuplicateEndpoint { verb: String, path: String },

    /// Explicit dialect name is not supported.
    #[error("unknown database dialect `{0}`")]
    #[diagnostic(
        code(docgate::config::unknown_dialect),
        help("use one of: postgres, mysql, sqlite, mssql")
    )]
    UnknownDialect(String),
}

impl ConfigError {
    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
