//! Typed predicates: filter sets bound to a schema, and their evaluation.
//!
//! Binding coerces every raw operand to the declared field type, so a
//! [`Predicate`] can only fail to match, never fail to evaluate.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::ast::{self, Grouped, Node};
use crate::compile::FilterSet;
use crate::config::FailurePolicy;
use crate::entry::FilterEntry;
use crate::error::{FilterError, FilterParseError, Result};
use crate::operation::{split_list, Bound, Operand, Operation, OperationKind, TextMatch};
use crate::value::{FieldType, Schema, Value};

/// Coerced right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BoundOperand {
    Single(Value),
    List(Vec<Value>),
    None,
}

/// One typed comparison against a declared field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    /// Field name as declared in the schema.
    pub field: String,
    pub field_type: FieldType,
    pub operation: Operation,
    pub operand: BoundOperand,
}

impl Condition {
    /// Decide the condition for the record's value of the field.
    pub fn test(&self, actual: &Value) -> bool {
        let semantics = self.operation.semantics();

        let positive = match semantics.kind {
            OperationKind::Nullity => actual.is_null(),
            _ if matches!(actual, Value::Null) => false,
            OperationKind::Equality => match &self.operand {
                BoundOperand::Single(expected) => {
                    actual.equals(expected, semantics.case_insensitive)
                }
                _ => false,
            },
            OperationKind::Ordering => match (&self.operand, semantics.bound) {
                (BoundOperand::Single(expected), Some(bound)) => actual
                    .compare(expected)
                    .is_some_and(|ordering| bound_holds(bound, ordering)),
                _ => false,
            },
            OperationKind::Text => match (&self.operand, actual.as_str(), semantics.text) {
                (BoundOperand::Single(Value::String(pattern)), Some(haystack), Some(mode)) => {
                    text_matches(mode, haystack, pattern, semantics.case_insensitive)
                }
                _ => false,
            },
            OperationKind::Membership => match &self.operand {
                BoundOperand::List(candidates) => {
                    candidates.iter().any(|c| actual.equals(c, false))
                }
                _ => false,
            },
        };

        positive != semantics.negated
    }
}

fn bound_holds(bound: Bound, ordering: Ordering) -> bool {
    match bound {
        Bound::Lt => ordering == Ordering::Less,
        Bound::Lte => ordering != Ordering::Greater,
        Bound::Gt => ordering == Ordering::Greater,
        Bound::Gte => ordering != Ordering::Less,
    }
}

fn text_matches(mode: TextMatch, haystack: &str, pattern: &str, ignore_case: bool) -> bool {
    let (haystack, pattern) = if ignore_case {
        (haystack.to_lowercase(), pattern.to_lowercase())
    } else {
        (haystack.to_string(), pattern.to_string())
    };
    match mode {
        TextMatch::Contains => haystack.contains(&pattern),
        TextMatch::StartsWith => haystack.starts_with(&pattern),
        TextMatch::EndsWith => haystack.ends_with(&pattern),
    }
}

/// Source of field values for evaluation.
pub trait Record {
    /// Value of `field` read as `field_type`; `None` when absent or unreadable.
    fn value(&self, field: &str, field_type: FieldType) -> Option<Value>;
}

impl Record for Map<String, JsonValue> {
    fn value(&self, field: &str, field_type: FieldType) -> Option<Value> {
        let json = self.get(field).or_else(|| {
            self.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(field))
                .map(|(_, v)| v)
        })?;
        field_type.from_json(json)
    }
}

impl Record for JsonValue {
    fn value(&self, field: &str, field_type: FieldType) -> Option<Value> {
        self.as_object()?.value(field, field_type)
    }
}

impl Record for HashMap<String, Value> {
    fn value(&self, field: &str, _field_type: FieldType) -> Option<Value> {
        self.get(field).cloned()
    }
}

impl Record for BTreeMap<String, Value> {
    fn value(&self, field: &str, _field_type: FieldType) -> Option<Value> {
        self.get(field).cloned()
    }
}

/// A filter set bound to a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Predicate {
    root: Node<Condition>,
}

impl Predicate {
    /// Predicate that accepts every record.
    pub fn always() -> Self {
        Self {
            root: Node::All(Vec::new()),
        }
    }

    pub fn root(&self) -> &Node<Condition> {
        &self.root
    }

    pub fn conditions(&self) -> Vec<&Condition> {
        self.root.leaves()
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.root.evaluate(&|condition: &Condition| {
            let actual = record
                .value(&condition.field, condition.field_type)
                .unwrap_or(Value::Null);
            condition.test(&actual)
        })
    }

    /// Keep the records this predicate accepts.
    pub fn filter<'a, R, I>(&'a self, records: I) -> impl Iterator<Item = R> + 'a
    where
        R: Record + 'a,
        I: IntoIterator<Item = R>,
        I::IntoIter: 'a,
    {
        records.into_iter().filter(move |r| self.matches(r))
    }
}

pub(crate) fn bind(filters: &FilterSet, schema: &Schema, policy: FailurePolicy) -> Result<Predicate> {
    let mut grouped = Vec::with_capacity(filters.len());
    let mut issues = Vec::new();

    for entry in filters {
        match bind_entry(entry, schema) {
            Ok(node) => grouped.push(Grouped {
                group: entry.group,
                node,
            }),
            Err(mut errors) => match policy {
                FailurePolicy::Reject => issues.append(&mut errors),
                FailurePolicy::Drop => {
                    for error in &errors {
                        tracing::warn!(key = %entry.key, error = %error, "Dropping unbindable filter");
                    }
                }
            },
        }
    }

    if !issues.is_empty() {
        return Err(FilterParseError::new(issues));
    }

    Ok(Predicate {
        root: ast::assemble(grouped),
    })
}

fn bind_entry(
    entry: &FilterEntry,
    schema: &Schema,
) -> std::result::Result<Node<Condition>, Vec<FilterError>> {
    let mut conditions = Vec::with_capacity(entry.fields.len());
    let mut errors = Vec::new();

    for field in &entry.fields {
        match bind_condition(field, entry.operation, &entry.value, schema) {
            Ok(condition) => conditions.push(Node::Test(condition)),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(Node::combine(entry.intra_operator, conditions))
    } else {
        Err(errors)
    }
}

/// Bind one field comparison, validating the operator against the field type.
pub fn bind_condition(
    field: &str,
    operation: Operation,
    raw: &str,
    schema: &Schema,
) -> std::result::Result<Condition, FilterError> {
    let (declared, field_type) = schema
        .resolve(field)
        .ok_or_else(|| FilterError::UnknownField {
            field: field.to_string(),
        })?;

    let semantics = operation.semantics();
    if semantics.kind == OperationKind::Ordering && !field_type.is_orderable() {
        return Err(FilterError::UnorderableField {
            field: declared.to_string(),
            operation,
            field_type,
        });
    }
    if semantics.kind == OperationKind::Text && field_type != FieldType::String {
        return Err(FilterError::UnsupportedOperation {
            field: declared.to_string(),
            operation,
            field_type,
        });
    }

    let coerce = |token: &str| {
        field_type
            .coerce(token)
            .ok_or_else(|| FilterError::TypeCoercion {
                field: declared.to_string(),
                value: token.to_string(),
                expected: field_type,
            })
    };

    let operand = match semantics.operand {
        Operand::Single => BoundOperand::Single(coerce(raw)?),
        Operand::List => BoundOperand::List(
            split_list(raw)
                .into_iter()
                .map(coerce)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        ),
        Operand::Ignored => BoundOperand::None,
    };

    Ok(Condition {
        field: declared.to_string(),
        field_type,
        operation,
        operand,
    })
}
