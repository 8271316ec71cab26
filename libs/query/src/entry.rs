//! Classification of bracket segments into filter entries.

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::extract::FilterToken;
use crate::operation::{BoolOp, Operation};

/// One constraint parsed from one query key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    /// Raw query key the entry was built from.
    pub key: String,
    /// Field names in bracket order.
    pub fields: Vec<String>,
    /// Combines `fields` when there is more than one.
    pub intra_operator: BoolOp,
    /// Explicit `$and` / `$or` marker carried by the key, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<BoolOp>,
    pub operation: Operation,
    /// Raw right-hand side, not yet coerced.
    pub value: String,
}

/// How a single bracket segment is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Group(BoolOp),
    Operation(Operation),
    /// `$`-prefixed text that names no operator (the `$` is stripped).
    UnknownOperation(&'a str),
    /// Non-negative integer, reserved for ordered-group addressing.
    Index(u64),
    Field(&'a str),
    Empty,
}

/// Classify one trimmed bracket segment.
pub fn classify_segment(segment: &str) -> Segment<'_> {
    if segment.is_empty() {
        return Segment::Empty;
    }

    if let Some(name) = segment.strip_prefix('$') {
        if let Some(op) = BoolOp::parse(name) {
            return Segment::Group(op);
        }
        return match Operation::parse(name) {
            Some(op) => Segment::Operation(op),
            None => Segment::UnknownOperation(name),
        };
    }

    if let Ok(index) = segment.parse::<u64>() {
        return Segment::Index(index);
    }

    Segment::Field(segment)
}

/// Build the entry for one filter key.
///
/// Returns `Ok(None)` for keys that carry neither a field nor an operator;
/// those are treated as no-op filters.
pub fn build_entry(token: &FilterToken) -> Result<Option<FilterEntry>, FilterError> {
    let mut fields = Vec::new();
    let mut group = None;
    let mut operation = None;

    for raw in &token.segments {
        match classify_segment(raw) {
            Segment::Group(op) => group = Some(op),
            Segment::Operation(op) => {
                if operation.is_some() {
                    return Err(FilterError::DuplicateOperation {
                        key: token.key.clone(),
                    });
                }
                operation = Some(op);
            }
            Segment::UnknownOperation(name) => {
                return Err(FilterError::UnknownOperator {
                    key: token.key.clone(),
                    segment: name.to_string(),
                });
            }
            Segment::Index(_) | Segment::Empty => {}
            Segment::Field(name) => fields.push(name.to_string()),
        }
    }

    let operation = match (operation, fields.is_empty()) {
        (None, true) => {
            tracing::debug!(key = %token.key, "Ignoring filter key without field or operator");
            return Ok(None);
        }
        (None, false) => {
            return Err(FilterError::MissingOperation {
                key: token.key.clone(),
            })
        }
        (Some(_), true) => {
            return Err(FilterError::MissingField {
                key: token.key.clone(),
            })
        }
        (Some(op), false) => op,
    };

    if token.values.len() > 1 {
        tracing::warn!(
            key = %token.key,
            ignored = token.values.len() - 1,
            "Filter key repeated; using the first value"
        );
    }
    let value = token.values.first().cloned().unwrap_or_default();

    Ok(Some(FilterEntry {
        key: token.key.clone(),
        fields,
        intra_operator: group.unwrap_or_default(),
        group,
        operation,
        value,
    }))
}
