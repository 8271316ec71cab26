//! Field types, typed values and operand coercion.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Declared type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    #[serde(alias = "date_time", alias = "timestamp")]
    DateTime,
    Uuid,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Uuid => "uuid",
        }
    }

    /// Whether `lt`/`lte`/`gt`/`gte` are meaningful for this type.
    pub fn is_orderable(self) -> bool {
        !matches!(self, Self::Boolean | Self::Uuid)
    }

    /// Coerce a raw query operand to this type.
    /// Strings are taken verbatim; every other type ignores surrounding whitespace.
    pub fn coerce(self, raw: &str) -> Option<Value> {
        if self == Self::String {
            return Some(Value::String(raw.to_string()));
        }
        let raw = raw.trim();
        match self {
            Self::String => Some(Value::String(raw.to_string())),
            Self::Integer => raw.parse::<i64>().ok().map(Value::Integer),
            Self::Decimal => parse_decimal(raw).map(Value::Decimal),
            Self::Boolean => parse_bool(raw).map(Value::Boolean),
            Self::Date => parse_date(raw).map(Value::Date),
            Self::DateTime => parse_datetime(raw).map(Value::DateTime),
            Self::Uuid => Uuid::parse_str(raw).ok().map(Value::Uuid),
        }
    }

    /// Read a record's JSON value as this type. JSON `null` becomes [`Value::Null`];
    /// values that do not fit the type yield `None`.
    pub fn from_json(self, json: &JsonValue) -> Option<Value> {
        match (self, json) {
            (_, JsonValue::Null) => Some(Value::Null),
            (Self::String, JsonValue::String(s)) => Some(Value::String(s.clone())),
            (Self::String, JsonValue::Number(n)) => Some(Value::String(n.to_string())),
            (Self::String, JsonValue::Bool(b)) => Some(Value::String(b.to_string())),
            (Self::Integer, JsonValue::Number(n)) => n.as_i64().map(Value::Integer),
            (Self::Decimal, JsonValue::Number(n)) => match n.as_i64() {
                Some(i) => Some(Value::Decimal(Decimal::from(i))),
                None => n
                    .as_f64()
                    .and_then(|f| Decimal::try_from(f).ok())
                    .map(Value::Decimal),
            },
            (Self::Boolean, JsonValue::Bool(b)) => Some(Value::Boolean(*b)),
            (_, JsonValue::String(s)) => self.coerce(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // A bare date means midnight UTC.
    parse_date(raw)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A typed field value or coerced operand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
}

impl Value {
    /// Null sentinel: JSON null, a missing field, or an empty string.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Order two values of compatible types. Integers and decimals compare
    /// numerically; any other mix is unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Decimal(b)) => Some(Decimal::from(*a).cmp(b)),
            (Value::Decimal(a), Value::Integer(b)) => Some(a.cmp(&Decimal::from(*b))),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality, optionally ignoring case for strings.
    pub fn equals(&self, other: &Value, ignore_case: bool) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) if ignore_case => {
                a.to_lowercase() == b.to_lowercase()
            }
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }
}

/// Case-insensitive map of field names to their declared types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, FieldType>")]
pub struct Schema {
    fields: BTreeMap<String, (String, FieldType)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.insert(name, field_type);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, field_type: FieldType) {
        let name = name.into();
        self.fields.insert(name.to_lowercase(), (name, field_type));
    }

    /// Declared name and type of a field, looked up ignoring case.
    pub fn resolve(&self, name: &str) -> Option<(&str, FieldType)> {
        self.fields
            .get(&name.to_lowercase())
            .map(|(declared, ty)| (declared.as_str(), *ty))
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.resolve(name).map(|(_, ty)| ty)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<BTreeMap<String, FieldType>> for Schema {
    fn from(map: BTreeMap<String, FieldType>) -> Self {
        let mut schema = Schema::new();
        for (name, ty) in map {
            schema.insert(name, ty);
        }
        schema
    }
}
