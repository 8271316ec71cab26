//! Axum extractors for filters and includes.
//!
//! Both read the request's query string. A [`QueryConfig`] (bare or in an
//! `Arc`) placed in the request extensions overrides the defaults.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::compile::{FilterCompiler, FilterSet};
use crate::config::QueryConfig;
use crate::error::FilterParseError;
use crate::include::{IncludeResolver, IncludeTree};
use crate::params::QueryParams;

/// Compiled filters of the request.
#[derive(Debug, Clone)]
pub struct Filters(pub FilterSet);

/// Include tree of the request.
#[derive(Debug, Clone)]
pub struct Includes(pub IncludeTree);

fn request_config(parts: &Parts) -> QueryConfig {
    parts
        .extensions
        .get::<Arc<QueryConfig>>()
        .map(|config| config.as_ref().clone())
        .or_else(|| parts.extensions.get::<QueryConfig>().cloned())
        .unwrap_or_default()
}

fn request_params(parts: &Parts) -> QueryParams {
    QueryParams::parse(parts.uri.query().unwrap_or(""))
}

#[async_trait]
impl<S> FromRequestParts<S> for Filters
where
    S: Send + Sync,
{
    type Rejection = FilterParseError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        FilterCompiler::new(request_config(parts))
            .compile(&request_params(parts))
            .map(Filters)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Includes
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Includes(
            IncludeResolver::new(request_config(parts)).resolve(&request_params(parts)),
        ))
    }
}

impl IntoResponse for FilterParseError {
    fn into_response(self) -> Response {
        let issues: Vec<_> = self
            .issues
            .iter()
            .map(|issue| {
                json!({
                    "code": issue.code(),
                    "message": issue.to_string(),
                })
            })
            .collect();

        let body = Json(json!({
            "error": "invalid_filter",
            "message": self.to_string(),
            "issues": issues,
        }));

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
