//! Orchestrates parsing, compilation and result assembly.

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::dialect::{DatabaseDialect, DialectKind};
use crate::error::QueryResult;
use crate::layout::DocumentLayout;
use crate::node::FilterNode;
use crate::operator::CompileContext;
use crate::parser::FilterParser;
use crate::predicate::SqlPredicate;
use crate::request::{FilterOptions, FilterRequest, Projection, ReservedParams};
use crate::result::FilterResult;
use crate::types::{SortField, SortOrder};

/// Translates filter requests into [`FilterResult`]s for one dialect.
///
/// A translator is immutable once built and can be shared across threads.
///
/// ```rust
/// use docgate_query::{DialectKind, FilterRequest, FilterTranslator};
/// use serde_json::json;
///
/// let translator = FilterTranslator::new(DialectKind::Postgres.shared());
/// let request = FilterRequest::from_json(&json!({
///     "filter": {"status": "active"},
///     "options": {"sort": {"price": -1}, "limit": 10}
/// })).unwrap();
///
/// let result = translator.translate(&request).unwrap();
/// assert!(result.has_where_clause());
/// assert_eq!(result.order_by_clause.as_deref(), Some("data ->> 'price' DESC"));
/// assert_eq!(result.limit, Some(10));
/// ```
#[derive(Debug, Clone)]
pub struct FilterTranslator {
    dialect: Arc<dyn DatabaseDialect>,
    layout: DocumentLayout,
    parser: FilterParser,
    reserved: ReservedParams,
    default_limit: Option<u64>,
    max_limit: Option<u64>,
}

impl FilterTranslator {
    /// Create a translator with the default layout.
    pub fn new(dialect: Arc<dyn DatabaseDialect>) -> Self {
        Self {
            dialect,
            layout: DocumentLayout::default(),
            parser: FilterParser::new(),
            reserved: ReservedParams::default(),
            default_limit: None,
            max_limit: None,
        }
    }

    /// Create a translator for a built-in dialect.
    pub fn for_kind(kind: DialectKind) -> Self {
        Self::new(kind.shared())
    }

    /// Set the table layout.
    pub fn with_layout(mut self, layout: DocumentLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the maximum filter nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.parser = self.parser.with_max_depth(max_depth);
        self
    }

    /// Set the reserved query-parameter names.
    pub fn with_reserved_params(mut self, reserved: ReservedParams) -> Self {
        self.reserved = reserved;
        self
    }

    /// Limit applied when a request gives none.
    pub fn with_default_limit(mut self, limit: Option<u64>) -> Self {
        self.default_limit = limit.filter(|l| *l > 0);
        self
    }

    /// Upper bound for requested limits.
    pub fn with_max_limit(mut self, limit: Option<u64>) -> Self {
        self.max_limit = limit.filter(|l| *l > 0);
        self
    }

    /// The active dialect.
    pub fn dialect(&self) -> &dyn DatabaseDialect {
        self.dialect.as_ref()
    }

    /// The table layout.
    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    /// The parser used for filter maps.
    pub fn parser(&self) -> &FilterParser {
        &self.parser
    }

    /// The reserved query-parameter names.
    pub fn reserved_params(&self) -> &ReservedParams {
        &self.reserved
    }

    fn context(&self) -> CompileContext<'_> {
        CompileContext::new(self.dialect.as_ref(), &self.layout)
    }

    /// Parse a filter map into a tree.
    pub fn parse(&self, filter: &Map<String, JsonValue>) -> QueryResult<FilterNode> {
        self.parser.parse(filter)
    }

    /// Compile a tree into a predicate.
    pub fn compile(&self, node: &FilterNode) -> QueryResult<SqlPredicate> {
        node.to_predicate(&self.context())
    }

    /// Translate a request.
    pub fn translate(&self, request: &FilterRequest) -> QueryResult<FilterResult> {
        let node = self.parse(&request.filter)?;
        self.translate_parsed(&node, &request.options)
    }

    /// Translate an already-parsed (and possibly validated) tree.
    pub fn translate_parsed(
        &self,
        node: &FilterNode,
        options: &FilterOptions,
    ) -> QueryResult<FilterResult> {
        let mut builder = FilterResult::builder();

        if !node.is_empty() {
            builder = builder.predicate(self.compile(node)?);
        }

        for item in self.order_by_items(&self.sort_fields(options)?) {
            builder = builder.order_by(item);
        }

        let projection = options
            .projection
            .as_ref()
            .map(|spec| Projection::parse(spec, &self.layout.identity_field))
            .transpose()?;

        let result = builder
            .limit(self.effective_limit(options.limit))
            .offset(options.skip.filter(|s| *s > 0).map(|s| s as u64))
            .projection(projection)
            .build();

        debug!(
            dialect = %self.dialect.name(),
            parameters = result.parameters.len(),
            has_where = result.has_where_clause(),
            has_order_by = result.has_order_by_clause(),
            limit = ?result.limit,
            offset = ?result.offset,
            "Translated filter"
        );

        Ok(result)
    }

    /// Translate flat query parameters.
    pub fn translate_query_params<I, K, V>(&self, params: I) -> QueryResult<FilterResult>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = FilterRequest::from_query_params(params, &self.reserved)?;
        self.translate(&request)
    }

    /// Read the sort keys of a request, in priority order.
    pub fn sort_fields(&self, options: &FilterOptions) -> QueryResult<Vec<SortField>> {
        options
            .sort
            .iter()
            .map(|(field, direction)| {
                SortOrder::from_json(field, direction).map(|order| SortField::new(field.clone(), order))
            })
            .collect()
    }

    /// Render ORDER BY items for sort keys.
    pub fn order_by_items(&self, sort: &[SortField]) -> Vec<String> {
        sort.iter()
            .map(|s| self.dialect.order_by(&self.layout.target(&s.field), s.order))
            .collect()
    }

    fn effective_limit(&self, requested: Option<i64>) -> Option<u64> {
        let limit = requested
            .filter(|l| *l > 0)
            .map(|l| l as u64)
            .or(self.default_limit);
        match (limit, self.max_limit) {
            (Some(limit), Some(max)) if limit > max => Some(max),
            (limit, _) => limit,
        }
    }
}
