//! Shared helpers for query integration tests

#![allow(dead_code)]

use quarry_query::{FieldType, QueryParams, Schema};
use serde_json::{json, Value as JsonValue};

pub fn params(query: &str) -> QueryParams {
    QueryParams::parse(query)
}

/// Schema of the `books` content type used across tests.
pub fn books_schema() -> Schema {
    Schema::new()
        .with_field("title", FieldType::String)
        .with_field("author", FieldType::String)
        .with_field("pages", FieldType::Integer)
        .with_field("price", FieldType::Decimal)
        .with_field("published", FieldType::Date)
        .with_field("inPrint", FieldType::Boolean)
        .with_field("isbn", FieldType::String)
}

pub fn books() -> Vec<JsonValue> {
    vec![
        json!({"title": "Dune", "author": "Frank Herbert", "pages": 412, "price": 9.99, "published": "1965-08-01", "inPrint": true, "isbn": "978-0441013593"}),
        json!({"title": "Hyperion", "author": "Dan Simmons", "pages": 482, "price": 8.5, "published": "1989-05-26", "inPrint": true, "isbn": null}),
        json!({"title": "Neuromancer", "author": "William Gibson", "pages": 271, "price": 12, "published": "1984-07-01", "inPrint": false, "isbn": ""}),
        json!({"title": "The Dispossessed", "author": "Ursula K. Le Guin", "pages": 387, "price": 10.25, "published": "1974-05-01", "inPrint": true}),
    ]
}

pub fn titles(records: &[JsonValue]) -> Vec<&str> {
    records
        .iter()
        .filter_map(|r| r["title"].as_str())
        .collect()
}
