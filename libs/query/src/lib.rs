//! Quarry query shaping
//!
//! Request-time query layer for generated CRUD endpoints:
//! - **Filters**: `filter[name][$eq]=Bob` style keys compile to a [`FilterSet`]
//!   whose [`FilterSet::tree`] is the combinable predicate handed to storage
//! - **Binding**: a [`FilterSet`] bound to a [`Schema`] becomes a typed
//!   [`Predicate`] that can also be evaluated in memory
//! - **Includes**: `include=author.books,author.reviews` resolves to a
//!   deduplicated [`IncludeTree`] of relations to eager-load
//!
//! ```text
//! query string -> extract -> entry -> compile -> FilterSet -> bind -> Predicate
//!              -> include -> IncludeTree
//! ```
//!
//! Everything here is synchronous and free of shared state.

#![forbid(unsafe_code)]

pub mod ast;
pub mod compile;
pub mod config;
pub mod entry;
pub mod error;
pub mod extract;
#[cfg(feature = "axum")]
pub mod http;
pub mod include;
pub mod operation;
pub mod params;
pub mod predicate;
pub mod value;

pub use ast::{Comparison, FilterNode, Node};
pub use compile::{compile_filters, FilterCompiler, FilterSet};
pub use config::{FailurePolicy, QueryConfig};
pub use entry::FilterEntry;
pub use error::{FilterError, FilterParseError, Result};
pub use include::{resolve_includes, IncludeNode, IncludeResolver, IncludeTree};
pub use operation::{BoolOp, Operation, OperationSemantics};
pub use params::QueryParams;
pub use predicate::{Condition, Predicate, Record};
pub use value::{FieldType, Schema, Value};
