//! Error types for filter compilation and binding

use std::fmt;

use thiserror::Error;

use crate::operation::Operation;
use crate::value::FieldType;

/// Result type alias
pub type Result<T> = std::result::Result<T, FilterParseError>;

/// A single problem found while compiling or binding one filter key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown operator '{segment}' in filter key '{key}'")]
    UnknownOperator { key: String, segment: String },

    #[error("filter key '{key}' specifies more than one operator")]
    DuplicateOperation { key: String },

    #[error("filter key '{key}' names a field but no operator")]
    MissingOperation { key: String },

    #[error("filter key '{key}' has an operator but no field")]
    MissingField { key: String },

    #[error("value '{value}' for field '{field}' is not a valid {expected}")]
    TypeCoercion {
        field: String,
        value: String,
        expected: FieldType,
    },

    #[error("operator '{operation}' requires an orderable field, but '{field}' is {field_type}")]
    UnorderableField {
        field: String,
        operation: Operation,
        field_type: FieldType,
    },

    #[error("operator '{operation}' applies to string fields only, but '{field}' is {field_type}")]
    UnsupportedOperation {
        field: String,
        operation: Operation,
        field_type: FieldType,
    },

    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("{count} filters exceed the maximum of {max}")]
    TooManyFilters { count: usize, max: usize },
}

impl FilterError {
    /// Stable machine-readable code for this issue.
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::UnknownOperator { .. } => "unknown_operator",
            FilterError::DuplicateOperation { .. } => "duplicate_operator",
            FilterError::MissingOperation { .. } => "missing_operator",
            FilterError::MissingField { .. } => "missing_field",
            FilterError::TypeCoercion { .. } => "type_coercion",
            FilterError::UnorderableField { .. } => "unorderable_field",
            FilterError::UnsupportedOperation { .. } => "unsupported_operation",
            FilterError::UnknownField { .. } => "unknown_field",
            FilterError::TooManyFilters { .. } => "too_many_filters",
        }
    }
}

/// Every issue that made a request's filters unusable.
///
/// All issues stem from client input, so this always maps to a 400-class response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParseError {
    pub issues: Vec<FilterError>,
}

impl FilterParseError {
    pub fn new(issues: Vec<FilterError>) -> Self {
        Self { issues }
    }

    /// HTTP status the boundary should answer with.
    pub fn status_code(&self) -> u16 {
        400
    }

    pub fn issues(&self) -> &[FilterError] {
        &self.issues
    }
}

impl From<FilterError> for FilterParseError {
    fn from(issue: FilterError) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

impl fmt::Display for FilterParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.as_slice() {
            [] => write!(f, "invalid filter"),
            [only] => write!(f, "invalid filter: {}", only),
            many => {
                write!(f, "{} invalid filters: ", many.len())?;
                for (i, issue) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for FilterParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_issue() {
        let err = FilterParseError::new(vec![
            FilterError::UnknownOperator {
                key: "filter[a][$x]".to_string(),
                segment: "x".to_string(),
            },
            FilterError::MissingOperation {
                key: "filter[b]".to_string(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 invalid filters"));
        assert!(text.contains("unknown operator 'x'"));
        assert!(text.contains("filter[b]"));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn single_issue_converts() {
        let err: FilterParseError = FilterError::UnknownField {
            field: "nope".to_string(),
        }
        .into();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].code(), "unknown_field");
    }
}
