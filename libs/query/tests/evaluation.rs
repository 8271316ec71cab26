//! End-to-end: query string -> filters -> bound predicate -> matching records

use quarry_query::{compile_filters, FailurePolicy, FilterCompiler, FilterError, QueryConfig};
use serde_json::Value as JsonValue;

mod support;

use support::{books, books_schema, params, titles};

fn run(query: &str) -> Vec<JsonValue> {
    let predicate = compile_filters(&params(query))
        .unwrap()
        .bind(&books_schema())
        .unwrap();
    predicate.filter(books()).collect()
}

#[test]
fn numeric_range() {
    let kept = run("filter[pages][$gte]=300&filter[pages][$lte]=450");
    assert_eq!(titles(&kept), vec!["Dune", "The Dispossessed"]);
}

#[test]
fn decimal_and_integer_operands() {
    let kept = run("filter[price][$lt]=10");
    assert_eq!(titles(&kept), vec!["Dune", "Hyperion"]);

    let kept = run("filter[price][$gte]=10.25");
    assert_eq!(titles(&kept), vec!["Neuromancer", "The Dispossessed"]);
}

#[test]
fn date_ordering() {
    let kept = run("filter[published][$gt]=1980-01-01");
    assert_eq!(titles(&kept), vec!["Hyperion", "Neuromancer"]);
}

#[test]
fn cross_field_search() {
    let kept = run("filter[title][author][$cic]=dan");
    assert_eq!(titles(&kept), vec!["Hyperion"]);

    let kept = run("filter[$or][title][$cic]=dune&filter[$or][author][$cic]=gibson");
    assert_eq!(titles(&kept), vec!["Dune", "Neuromancer"]);
}

#[test]
fn or_group_combined_with_plain_constraint() {
    let kept = run(
        "filter[$or][title][$cic]=dune&filter[$or][author][$cic]=gibson&filter[inPrint][$eq]=true",
    );
    assert_eq!(titles(&kept), vec!["Dune"]);
}

#[test]
fn membership() {
    let kept = run("filter[pages][$in]=271, 412");
    assert_eq!(titles(&kept), vec!["Dune", "Neuromancer"]);

    let kept = run("filter[title][$notin]=Dune,Hyperion");
    assert_eq!(titles(&kept), vec!["Neuromancer", "The Dispossessed"]);
}

#[test]
fn nullity_covers_missing_null_and_empty() {
    let kept = run("filter[isbn][$null]=");
    assert_eq!(
        titles(&kept),
        vec!["Hyperion", "Neuromancer", "The Dispossessed"]
    );

    let kept = run("filter[isbn][$notnull]=anything");
    assert_eq!(titles(&kept), vec!["Dune"]);
}

#[test]
fn field_names_are_matched_ignoring_case() {
    let kept = run("filter[INPRINT][$eq]=false");
    assert_eq!(titles(&kept), vec!["Neuromancer"]);
}

#[test]
fn binding_errors_are_aggregated() {
    let filters = compile_filters(&params(
        "filter[pages][$gt]=many&filter[inPrint][$gte]=true&filter[pages][$sw]=4",
    ))
    .unwrap();
    let err = filters.bind(&books_schema()).unwrap_err();
    let codes: Vec<&str> = err.issues().iter().map(FilterError::code).collect();
    assert_eq!(
        codes,
        vec!["type_coercion", "unorderable_field", "unsupported_operation"]
    );
    assert!(err.to_string().contains("many"));
}

#[test]
fn drop_policy_applies_to_binding() {
    let compiler =
        FilterCompiler::new(QueryConfig::default().with_failure_policy(FailurePolicy::Drop));
    let filters = compiler
        .compile(&params("filter[pages][$gt]=many&filter[title][$sw]=The"))
        .unwrap();
    let predicate = compiler.bind(&filters, &books_schema()).unwrap();
    let kept: Vec<JsonValue> = predicate.filter(books()).collect();
    assert_eq!(titles(&kept), vec!["The Dispossessed"]);
}
