//! Filter key selection and bracket segment extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::QueryConfig;
use crate::params::QueryParams;

static BRACKET_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*?)\]").expect("invalid bracket segment regex"));

/// One query key selected as a filter, split into its bracket segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterToken {
    /// Raw query key (e.g. `filter[name][$eq]`).
    pub key: String,
    /// Trimmed bracket contents, left to right. Empty when the key has no brackets.
    pub segments: Vec<String>,
    /// Every value supplied for the key, in request order.
    pub values: Vec<String>,
}

/// Select filter keys (in collection order) and extract their bracket segments.
pub fn extract_filter_tokens(params: &QueryParams, config: &QueryConfig) -> Vec<FilterToken> {
    params
        .iter()
        .filter(|(key, _)| config.is_filter_key(key))
        .map(|(key, values)| FilterToken {
            key: key.to_string(),
            segments: bracket_segments(key),
            values: values.to_vec(),
        })
        .collect()
}

/// Non-greedy `[...]` matches over the raw key; text outside brackets is ignored.
pub fn bracket_segments(key: &str) -> Vec<String> {
    BRACKET_SEGMENT
        .captures_iter(key)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}
