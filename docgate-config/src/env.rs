//! Environment variable interpolation for configuration text.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{ConfigError, ConfigResult};

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;
}

/// Environment source backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a map, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Expand `${VAR}` references in `input`.
///
/// Supported forms:
/// - `${VAR}`: required; unset or empty is an error
/// - `${VAR:-default}`: `default` when unset or empty
/// - `${VAR:?message}`: required, failing with `message`
/// - `$$`: a literal `$`
///
/// A `$` not followed by `{` or `$` is kept as is.
pub fn expand(input: &str, source: &dyn EnvSource) -> ConfigResult<String> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('{') => {
                chars.next();
                result.push_str(&expand_braced(&mut chars, source)?);
            }
            Some('$') => {
                chars.next();
                result.push('$');
            }
            _ => result.push('$'),
        }
    }

    Ok(result)
}

fn expand_braced(chars: &mut Peekable<Chars<'_>>, source: &dyn EnvSource) -> ConfigResult<String> {
    let mut name = String::new();
    let mut modifier: Option<char> = None;
    let mut argument = String::new();
    let mut closed = false;

    while let Some(c) = chars.next() {
        if c == '}' {
            closed = true;
            break;
        }
        if modifier.is_some() {
            argument.push(c);
        } else if c == ':' {
            modifier = Some(chars.next().unwrap_or(':'));
        } else {
            name.push(c);
        }
    }

    if !closed {
        return Err(ConfigError::InvalidEnvRef {
            name,
            message: "missing closing `}`".to_string(),
        });
    }
    if name.is_empty() {
        return Err(ConfigError::InvalidEnvRef {
            name,
            message: "empty variable name".to_string(),
        });
    }

    match source.get(&name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => match modifier {
            Some('-') => Ok(argument),
            Some('?') => Err(ConfigError::InvalidEnvRef {
                message: if argument.is_empty() {
                    format!("required variable `{}` is not set", name)
                } else {
                    argument
                },
                name,
            }),
            Some(other) => Err(ConfigError::InvalidEnvRef {
                name,
                message: format!("unsupported modifier `:{}`", other),
            }),
            None => Err(ConfigError::MissingEnvVar(name)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn env() -> MapEnvSource {
        MapEnvSource::new()
            .set("DB_HOST", "db.internal")
            .set("EMPTY", "")
    }

    #[test]
    fn test_expand_required() {
        assert_eq!(
            expand("postgres://${DB_HOST}/app", &env()).unwrap(),
            "postgres://db.internal/app"
        );
    }

    #[test]
    fn test_expand_default() {
        assert_eq!(expand("${PORT:-5432}", &env()).unwrap(), "5432");
        assert_eq!(expand("${EMPTY:-x}", &env()).unwrap(), "x");
        assert_eq!(expand("${DB_HOST:-x}", &env()).unwrap(), "db.internal");
    }

    #[test]
    fn test_expand_missing() {
        assert!(matches!(
            expand("${NOPE}", &env()),
            Err(ConfigError::MissingEnvVar(name)) if name == "NOPE"
        ));
    }

    #[test]
    fn test_expand_required_message() {
        match expand("${NOPE:?set NOPE first}", &env()) {
            Err(ConfigError::InvalidEnvRef { name, message }) => {
                assert_eq!(name, "NOPE");
                assert_eq!(message, "set NOPE first");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_literal_dollars() {
        assert_eq!(expand("cost $5 and $$HOME", &env()).unwrap(), "cost $5 and $HOME");
    }

    #[test]
    fn test_unclosed_reference() {
        assert!(matches!(
            expand("${DB_HOST", &env()),
            Err(ConfigError::InvalidEnvRef { .. })
        ));
    }
}
