//! Logging setup for docgate.
//!
//! All crates log through `tracing`. This module installs a subscriber once,
//! driven by environment variables:
//!
//! - `DOCGATE_DEBUG=true|1|yes` - enable debug-level logging
//! - `DOCGATE_LOG_LEVEL=trace|debug|info|warn|error` - explicit level
//! - `DOCGATE_LOG_FORMAT=json|pretty|compact` - output format (default: json)
//!
//! Without the `tracing-subscriber` feature, [`init`] is a no-op and callers
//! are expected to install their own subscriber.
//!
//! ```rust,no_run
//! use docgate_query::logging;
//!
//! logging::init();
//! ```
//!
//! Translation events:
//!
//! ```rust,ignore
//! debug!(dialect = %name, parameters = n, "Translated filter");
//! warn!(field = %field, type_name = %name, "Unknown $type name, condition ignored");
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "DOCGATE_DEBUG";
const LEVEL_VAR: &str = "DOCGATE_LOG_LEVEL";
const FORMAT_VAR: &str = "DOCGATE_LOG_FORMAT";

/// Subscriber output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line human-readable output.
    Compact,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to JSON.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::Json,
        }
    }

    /// Format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Whether any logging was requested.
    pub enabled: bool,
    /// Level directive.
    pub level: &'static str,
    /// Output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Resolve settings from raw variable values.
    pub fn resolve(debug: Option<&str>, level: Option<&str>, format: Option<&str>) -> Self {
        let debug = debug.map(is_truthy).unwrap_or(false);
        let fallback = if debug { "debug" } else { "warn" };
        let resolved = match level.map(|l| l.trim().to_lowercase()) {
            Some(l) => match l.as_str() {
                "trace" => "trace",
                "debug" => "debug",
                "info" => "info",
                "warn" => "warn",
                "error" => "error",
                _ => fallback,
            },
            None => fallback,
        };

        Self {
            enabled: debug || level.is_some(),
            level: resolved,
            format: format.map(LogFormat::parse).unwrap_or_default(),
        }
    }

    /// Resolve settings from the process environment.
    pub fn from_env() -> Self {
        let debug = env::var(DEBUG_VAR).ok();
        let level = env::var(LEVEL_VAR).ok();
        let format = env::var(FORMAT_VAR).ok();
        Self::resolve(debug.as_deref(), level.as_deref(), format.as_deref())
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Initialize logging from the environment. Subsequent calls are no-ops.
pub fn init() {
    init_with(LogSettings::from_env());
}

/// Initialize logging with explicit settings. Subsequent calls are no-ops.
///
/// A global subscriber installed by the host application is left in place.
pub fn init_with(settings: LogSettings) {
    INIT.call_once(|| {
        if !settings.enabled {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = settings.level;
            let filter = EnvFilter::try_new(format!(
                "docgate={},docgate_query={},docgate_config={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let installed = match settings.format {
                LogFormat::Json => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                LogFormat::Compact => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                LogFormat::Pretty => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_err() {
                return;
            }

            tracing::info!(
                level = level,
                format = settings.format.as_str(),
                "docgate logging initialized"
            );
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            let _ = settings;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = LogSettings::resolve(None, None, None);
        assert!(!settings.enabled);
        assert_eq!(settings.level, "warn");
        assert_eq!(settings.format, LogFormat::Json);
    }

    #[test]
    fn test_debug_flag() {
        let settings = LogSettings::resolve(Some("YES"), None, Some("compact"));
        assert!(settings.enabled);
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.format, LogFormat::Compact);
    }

    #[test]
    fn test_explicit_level_wins() {
        let settings = LogSettings::resolve(Some("true"), Some("error"), None);
        assert_eq!(settings.level, "error");
        let settings = LogSettings::resolve(None, Some("bogus"), None);
        assert!(settings.enabled);
        assert_eq!(settings.level, "warn");
    }

    #[test]
    fn test_init_with_existing_subscriber() {
        let _ = tracing::subscriber::set_global_default(tracing::subscriber::NoSubscriber::default());
        let settings = LogSettings::resolve(Some("1"), Some("debug"), Some("compact"));
        init_with(settings.clone());
        init_with(settings);
        init();
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(LogFormat::parse("Pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Json);
    }
}
