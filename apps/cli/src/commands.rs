//! Subcommand implementations, kept free of I/O so they can be tested directly

use quarry_query::{FilterCompiler, IncludeResolver, QueryConfig, QueryParams, Schema};
use serde_json::{json, Value as JsonValue};

/// Compile filters and includes of `query` into a JSON report.
pub fn parse(query: &str, config: &QueryConfig) -> anyhow::Result<JsonValue> {
    let params = QueryParams::parse(query);
    let filters = FilterCompiler::new(config.clone()).compile(&params)?;
    let includes = IncludeResolver::new(config.clone()).resolve(&params);

    tracing::info!(
        filters = filters.len(),
        includes = includes.paths().len(),
        "Parsed query"
    );

    Ok(json!({
        "filters": filters,
        "predicate": filters.tree(),
        "includes": includes.paths(),
        "include_tree": includes,
    }))
}

/// Keep the records of `records` that satisfy the filters of `query`.
pub fn eval(
    query: &str,
    schema: &Schema,
    records: Vec<JsonValue>,
    config: &QueryConfig,
) -> anyhow::Result<Vec<JsonValue>> {
    let compiler = FilterCompiler::new(config.clone());
    let filters = compiler.compile(&QueryParams::parse(query))?;
    let predicate = compiler.bind(&filters, schema)?;

    let total = records.len();
    let kept: Vec<JsonValue> = predicate.filter(records).collect();
    tracing::info!(total, kept = kept.len(), "Evaluated query");
    Ok(kept)
}
