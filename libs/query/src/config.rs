//! Query-shaping configuration

use serde::{Deserialize, Serialize};

/// What to do with a filter key that fails to compile or bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Reject the whole request with every issue found.
    #[default]
    Reject,
    /// Drop the offending entry and keep the rest.
    Drop,
}

/// Settings shared by the filter compiler and the include resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Substring (matched ignoring case) that marks a query key as a filter.
    pub filter_marker: String,
    /// Name of the include parameter (matched ignoring case).
    pub include_param: String,
    pub failure_policy: FailurePolicy,
    /// Maximum number of compiled filter entries per request.
    pub max_filters: usize,
    /// Include paths longer than this are truncated.
    pub max_include_depth: usize,
    /// Include paths beyond this count are ignored.
    pub max_include_paths: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            filter_marker: "filter".to_string(),
            include_param: "include".to_string(),
            failure_policy: FailurePolicy::Reject,
            max_filters: 64,
            max_include_depth: 8,
            max_include_paths: 32,
        }
    }
}

impl QueryConfig {
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.filter_marker.trim().is_empty() {
            return Err("filter_marker must not be empty".to_string());
        }
        if self.include_param.trim().is_empty() {
            return Err("include_param must not be empty".to_string());
        }
        if self.max_filters == 0 {
            return Err("max_filters must be greater than 0".to_string());
        }
        if self.max_include_depth == 0 {
            return Err("max_include_depth must be greater than 0".to_string());
        }
        if self.max_include_paths == 0 {
            return Err("max_include_paths must be greater than 0".to_string());
        }
        Ok(())
    }

    pub(crate) fn is_filter_key(&self, key: &str) -> bool {
        key.to_lowercase()
            .contains(&self.filter_marker.to_lowercase())
    }
}
