//! Error types for filter compilation with actionable messages.
//!
//! Every failure raised while parsing, validating, or translating a client
//! filter is a [`QueryError`]. Errors are local and synchronous: they describe
//! malformed client input and are never retried.
//!
//! # Error Codes
//!
//! Error codes follow the pattern `G{category}{number}`:
//! - 1xxx: Client filter errors (unknown operator, bad shape, bad value, ...)
//! - 9xxx: Internal errors
//!
//! ```rust
//! use docgate_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::unknown_operator("$between");
//! assert_eq!(err.code, ErrorCode::UnknownOperator);
//! assert_eq!(err.code.code(), "G1001");
//! assert!(err.is_client_error());
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for filter compilation.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unrecognized operator symbol (G1001).
    UnknownOperator = 1001,
    /// Wrong shape for a filter or logical operator (G1002).
    InvalidFilter = 1002,
    /// Operator-specific value precondition violated (G1003).
    InvalidFilterValue = 1003,
    /// Field is not in the endpoint allow-list (G1004).
    FieldNotAllowed = 1004,
    /// Operator is not allowed for the field (G1005).
    OperatorNotAllowed = 1005,
    /// Sort specification is malformed or not allowed (G1006).
    InvalidSort = 1006,
    /// Projection mixes inclusion and exclusion or is malformed (G1007).
    InvalidProjection = 1007,
    /// No endpoint registered for the request (G1008).
    UnknownEndpoint = 1008,

    /// Internal error (G9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "G1001").
    pub fn code(&self) -> String {
        format!("G{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnknownOperator => "Unknown operator",
            Self::InvalidFilter => "Invalid filter",
            Self::InvalidFilterValue => "Invalid filter value",
            Self::FieldNotAllowed => "Field not allowed",
            Self::OperatorNotAllowed => "Operator not allowed",
            Self::InvalidSort => "Invalid sort",
            Self::InvalidProjection => "Invalid projection",
            Self::UnknownEndpoint => "Unknown endpoint",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The field involved.
    pub field: Option<String>,
    /// The operator symbol involved.
    pub operator: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

/// Errors that can occur while compiling a filter.
#[derive(Error, Debug, Clone)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the operator symbol.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.context.operator = Some(operator.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    // ============== Constructor Functions ==============

    /// Create an unknown operator error.
    pub fn unknown_operator(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self::new(
            ErrorCode::UnknownOperator,
            format!("Unknown operator '{}'", symbol),
        )
        .with_operator(&symbol)
        .with_suggestion(
            "Use one of $eq, $ne, $gt, $gte, $lt, $lte, $in, $nin, $regex, $exists, $type, $and, $or, $not, $nor",
        )
    }

    /// Create an invalid filter (shape) error.
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFilter, message)
    }

    /// Create an invalid filter value error.
    pub fn invalid_value(
        operator: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let operator = operator.into();
        let field = field.into();
        Self::new(
            ErrorCode::InvalidFilterValue,
            format!(
                "Invalid value for {} on '{}': {}",
                operator,
                field,
                message.into()
            ),
        )
        .with_field(&field)
        .with_operator(&operator)
    }

    /// Create a field-not-allowed error.
    pub fn field_not_allowed(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::FieldNotAllowed,
            format!("Filtering on '{}' is not allowed for this endpoint", field),
        )
        .with_field(&field)
    }

    /// Create an operator-not-allowed error.
    pub fn operator_not_allowed(field: impl Into<String>, operator: impl Into<String>) -> Self {
        let field = field.into();
        let operator = operator.into();
        Self::new(
            ErrorCode::OperatorNotAllowed,
            format!("Operator {} is not allowed on '{}'", operator, field),
        )
        .with_field(&field)
        .with_operator(&operator)
    }

    /// Create an invalid sort error.
    pub fn invalid_sort(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::InvalidSort,
            format!("Invalid sort on '{}': {}", field, message.into()),
        )
        .with_field(&field)
    }

    /// Create an invalid projection error.
    pub fn invalid_projection(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidProjection, message)
    }

    /// Create an unknown endpoint error.
    pub fn unknown_endpoint(verb: impl fmt::Display, path: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnknownEndpoint,
            format!("No endpoint registered for {} {}", verb, path),
        )
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::Internal,
            format!("Internal error: {}", message.into()),
        )
    }

    // ============== Error Checks ==============

    /// Check if this error was caused by malformed client input.
    pub fn is_client_error(&self) -> bool {
        (self.code as u16) < 2000
    }

    /// Check if this is an unknown operator error.
    pub fn is_unknown_operator(&self) -> bool {
        self.code == ErrorCode::UnknownOperator
    }

    /// Display the full error with context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = format!("Error [{}]: {}\n", self.code.code(), self.message);

        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }
        if let Some(ref operator) = self.context.operator {
            output.push_str(&format!("  → Operator: {}\n", operator));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::UnknownOperator.code(), "G1001");
        assert_eq!(ErrorCode::InvalidFilter.code(), "G1002");
        assert_eq!(ErrorCode::InvalidFilterValue.code(), "G1003");
        assert_eq!(ErrorCode::Internal.code(), "G9001");
    }

    #[test]
    fn test_unknown_operator_error() {
        let err = QueryError::unknown_operator("$between");
        assert!(err.is_unknown_operator());
        assert!(err.message.contains("$between"));
        assert_eq!(err.context.operator.as_deref(), Some("$between"));
        assert!(!err.context.suggestions.is_empty());
    }

    #[test]
    fn test_invalid_value_context() {
        let err = QueryError::invalid_value("$in", "status", "expected an array");
        assert_eq!(err.code, ErrorCode::InvalidFilterValue);
        assert_eq!(err.context.field.as_deref(), Some("status"));
        assert!(err.to_string().starts_with("[G1003]"));
    }

    #[test]
    fn test_client_errors() {
        assert!(QueryError::invalid_filter("bad").is_client_error());
        assert!(QueryError::field_not_allowed("secret").is_client_error());
        assert!(!QueryError::internal("boom").is_client_error());
    }

    #[test]
    fn test_display_full() {
        let err = QueryError::operator_not_allowed("price", "$regex")
            .with_suggestion("Use $eq instead");
        let output = err.display_full();
        assert!(output.contains("G1005"));
        assert!(output.contains("price"));
        assert!(output.contains("Suggestions"));
    }
}
