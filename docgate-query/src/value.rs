//! Bound parameter values.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A value bound to a named parameter of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// Structured JSON value (object or array), bound as serialized JSON.
    Json(JsonValue),
}

impl FilterValue {
    /// Convert a JSON scalar into its native parameter form.
    ///
    /// Objects and arrays become [`FilterValue::Json`].
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            JsonValue::String(s) => Self::String(s.clone()),
            other => Self::Json(other.clone()),
        }
    }

    /// Convert a JSON value into the text a JSON text-extraction yields for it.
    ///
    /// Strings lose their quotes; numbers and booleans use their JSON spelling.
    pub fn text_of(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Null => Self::Null,
            other => Self::String(other.to_string()),
        }
    }

    /// Coerce a JSON value to a number, accepting numeric strings.
    ///
    /// Returns `None` for values with no numeric reading.
    pub fn numeric_of(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(n) => Some(match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64()?),
            }),
            JsonValue::String(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    Some(Self::Int(i))
                } else {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(Self::Float)
                }
            }
            _ => None,
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}
