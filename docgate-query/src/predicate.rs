//! Parameterized predicate fragments and their boolean composition.
//!
//! A [`SqlPredicate`] is a WHERE-clause fragment plus the values bound to the
//! named placeholders inside it. Leaf predicates mint their parameter names
//! from a process-wide atomic sequence, so fragments produced by concurrent
//! translations can be merged without key collisions.
//!
//! ```rust
//! use docgate_query::{FilterValue, SqlPredicate};
//!
//! let a = SqlPredicate::new("x = :x_1", [("x_1".to_string(), FilterValue::Int(1))]);
//! let b = SqlPredicate::new("y = :y_2", [("y_2".to_string(), FilterValue::Int(2))]);
//! let both = SqlPredicate::and([a, b]);
//! assert_eq!(both.fragment(), "(x = :x_1 AND y = :y_2)");
//! assert_eq!(both.parameters().len(), 2);
//!
//! assert_eq!(SqlPredicate::and([]).fragment(), "1=1");
//! assert_eq!(SqlPredicate::or([]).fragment(), "1=0");
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::sql::sanitize_param_name;
use crate::value::FilterValue;

/// Fragment that matches every row.
pub const ALWAYS_TRUE: &str = "1=1";
/// Fragment that matches no row.
pub const ALWAYS_FALSE: &str = "1=0";

static PARAM_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Mint a parameter name unique for the lifetime of the process.
///
/// The name is the sanitised field name followed by the next value of a
/// shared atomic counter, e.g. `price_41`.
pub fn next_param_name(field: &str) -> String {
    let n = PARAM_SEQUENCE.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{}_{}", sanitize_param_name(field), n)
}

/// Named parameters bound to a predicate, in binding order.
pub type Parameters = IndexMap<String, FilterValue>;

/// A parameterized boolean condition fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlPredicate {
    fragment: String,
    parameters: Parameters,
}

impl SqlPredicate {
    /// Create a predicate from a fragment and its bindings.
    pub fn new(
        fragment: impl Into<String>,
        parameters: impl IntoIterator<Item = (String, FilterValue)>,
    ) -> Self {
        Self {
            fragment: fragment.into(),
            parameters: parameters.into_iter().collect(),
        }
    }

    /// Create a predicate without bindings.
    pub fn raw(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            parameters: Parameters::new(),
        }
    }

    /// A predicate that matches every row.
    pub fn always_true() -> Self {
        Self::raw(ALWAYS_TRUE)
    }

    /// A predicate that matches no row.
    pub fn always_false() -> Self {
        Self::raw(ALWAYS_FALSE)
    }

    /// Check if this predicate is the literal always-true fragment.
    pub fn is_always_true(&self) -> bool {
        self.fragment == ALWAYS_TRUE
    }

    /// Check if this predicate is the literal always-false fragment.
    pub fn is_always_false(&self) -> bool {
        self.fragment == ALWAYS_FALSE
    }

    /// The SQL fragment.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// The bound parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Split into fragment and parameters.
    pub fn into_parts(self) -> (String, Parameters) {
        (self.fragment, self.parameters)
    }

    /// Combine predicates with AND. Zero predicates yield always-true.
    pub fn and(predicates: impl IntoIterator<Item = SqlPredicate>) -> Self {
        Self::join(predicates, " AND ").unwrap_or_else(Self::always_true)
    }

    /// Combine predicates with OR. Zero predicates yield always-false.
    pub fn or(predicates: impl IntoIterator<Item = SqlPredicate>) -> Self {
        Self::join(predicates, " OR ").unwrap_or_else(Self::always_false)
    }

    /// Negate a predicate.
    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: SqlPredicate) -> Self {
        Self {
            fragment: format!("NOT ({})", predicate.fragment),
            parameters: predicate.parameters,
        }
    }

    fn join(predicates: impl IntoIterator<Item = SqlPredicate>, connective: &str) -> Option<Self> {
        let mut fragments = Vec::new();
        let mut parameters = Parameters::new();

        for predicate in predicates {
            fragments.push(predicate.fragment);
            for (name, value) in predicate.parameters {
                debug_assert!(!parameters.contains_key(&name), "duplicate parameter {}", name);
                parameters.insert(name, value);
            }
        }

        if fragments.is_empty() {
            return None;
        }

        Some(Self {
            fragment: format!("({})", fragments.join(connective)),
            parameters,
        })
    }
}
