//! Filter compilation: query parameters to a [`FilterSet`].

use serde::{Deserialize, Serialize};

use crate::ast::{self, FilterNode, Grouped};
use crate::config::{FailurePolicy, QueryConfig};
use crate::entry::{build_entry, FilterEntry};
use crate::error::{FilterError, FilterParseError, Result};
use crate::extract::extract_filter_tokens;
use crate::params::QueryParams;
use crate::predicate::{self, Predicate};
use crate::value::Schema;

/// Compiled filters of one request, one entry per filter key, in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    entries: Vec<FilterEntry>,
}

impl FilterSet {
    pub fn new(entries: Vec<FilterEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combinable predicate tree over raw comparisons.
    pub fn tree(&self) -> FilterNode {
        ast::assemble(self.entries.iter().map(|entry| Grouped {
            group: entry.group,
            node: ast::entry_node(entry),
        }))
    }

    /// Bind against `schema`, rejecting the request on any coercion issue.
    pub fn bind(&self, schema: &Schema) -> Result<Predicate> {
        predicate::bind(self, schema, FailurePolicy::Reject)
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a FilterEntry;
    type IntoIter = std::slice::Iter<'a, FilterEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Filter compiler carrying the marker, limits and failure policy.
#[derive(Debug, Clone, Default)]
pub struct FilterCompiler {
    config: QueryConfig,
}

impl FilterCompiler {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Compile every filter key of `params`.
    ///
    /// Under [`FailurePolicy::Reject`] all keys are still inspected so the error
    /// lists every problem; under [`FailurePolicy::Drop`] bad keys are skipped.
    pub fn compile(&self, params: &QueryParams) -> Result<FilterSet> {
        let tokens = extract_filter_tokens(params, &self.config);

        let mut entries = Vec::with_capacity(tokens.len());
        let mut issues = Vec::new();

        for token in &tokens {
            match build_entry(token) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(issue) => match self.config.failure_policy {
                    FailurePolicy::Reject => issues.push(issue),
                    FailurePolicy::Drop => {
                        tracing::warn!(key = %token.key, error = %issue, "Dropping invalid filter");
                    }
                },
            }
        }

        if !issues.is_empty() {
            return Err(FilterParseError::new(issues));
        }

        if entries.len() > self.config.max_filters {
            return Err(FilterError::TooManyFilters {
                count: entries.len(),
                max: self.config.max_filters,
            }
            .into());
        }

        tracing::debug!(
            keys = tokens.len(),
            filters = entries.len(),
            "Compiled filters"
        );

        Ok(FilterSet::new(entries))
    }

    /// Bind `filters` against `schema` using this compiler's failure policy.
    pub fn bind(&self, filters: &FilterSet, schema: &Schema) -> Result<Predicate> {
        predicate::bind(filters, schema, self.config.failure_policy)
    }
}

/// Compile the filters of one request with the default configuration.
pub fn compile_filters(params: &QueryParams) -> Result<FilterSet> {
    FilterCompiler::default().compile(params)
}
