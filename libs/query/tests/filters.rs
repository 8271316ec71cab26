use quarry_query::{
    compile_filters, BoolOp, Comparison, FailurePolicy, FilterCompiler, FilterError, Node,
    Operation, QueryConfig, QueryParams,
};

mod support;

use support::params;

fn cmp(field: &str, operation: Operation, value: &str) -> Node<Comparison> {
    Node::Test(Comparison {
        field: field.to_string(),
        operation,
        value: value.to_string(),
    })
}

#[test]
fn query_without_filter_keys_is_empty() {
    let set = compile_filters(&params("page=2&sort=-title&include=author")).unwrap();
    assert!(set.is_empty());
}

#[test]
fn single_equality_filter() {
    let set = compile_filters(&params("?filter[name][$eq]=Bob")).unwrap();
    assert_eq!(set.len(), 1);
    let entry = &set.entries()[0];
    assert_eq!(entry.fields, vec!["name"]);
    assert_eq!(entry.operation, Operation::Eq);
    assert_eq!(entry.value, "Bob");
    assert_eq!(entry.key, "filter[name][$eq]");
}

#[test]
fn or_group_across_two_keys_is_a_disjunction() {
    let set =
        compile_filters(&params("filter[$or][name][$cic]=bob&filter[$or][email][$cic]=bob"))
            .unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.iter().all(|e| e.group == Some(BoolOp::Or)));
    assert_eq!(
        set.tree(),
        Node::Any(vec![
            cmp("name", Operation::Cic, "bob"),
            cmp("email", Operation::Cic, "bob"),
        ])
    );
}

#[test]
fn or_group_within_one_key_is_the_same_disjunction() {
    let set = compile_filters(&params("filter[$or][name][email][$cic]=bob")).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(
        set.tree(),
        Node::Any(vec![
            cmp("name", Operation::Cic, "bob"),
            cmp("email", Operation::Cic, "bob"),
        ])
    );
}

#[test]
fn distinct_keys_are_anded() {
    let set = compile_filters(&params("filter[age][$gte]=30&filter[age][$lte]=40")).unwrap();
    assert_eq!(
        set.tree(),
        Node::All(vec![
            cmp("age", Operation::Gte, "30"),
            cmp("age", Operation::Lte, "40"),
        ])
    );
}

#[test]
fn or_group_is_one_conjunct_among_plain_filters() {
    let set = compile_filters(&params(
        "filter[$or][name][$cic]=bob&filter[active][$eq]=true&filter[$or][email][$cic]=bob",
    ))
    .unwrap();
    assert_eq!(
        set.tree(),
        Node::All(vec![
            cmp("active", Operation::Eq, "true"),
            Node::Any(vec![
                cmp("name", Operation::Cic, "bob"),
                cmp("email", Operation::Cic, "bob"),
            ]),
        ])
    );
}

#[test]
fn unknown_operator_identifies_segment_and_key() {
    let err = compile_filters(&params("filter[status][$bogus]=x")).unwrap_err();
    assert_eq!(
        err.issues(),
        [FilterError::UnknownOperator {
            key: "filter[status][$bogus]".to_string(),
            segment: "bogus".to_string(),
        }]
    );
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("bogus"));
}

#[test]
fn unknown_operator_is_dropped_under_drop_policy() {
    let compiler =
        FilterCompiler::new(QueryConfig::default().with_failure_policy(FailurePolicy::Drop));
    let set = compiler
        .compile(&params("filter[status][$bogus]=x&filter[status][$ne]=archived"))
        .unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.entries()[0].operation, Operation::Ne);
}

#[test]
fn operators_and_markers_ignore_case() {
    let set = compile_filters(&params("FILTER[$OR][name][$NotNull]=")).unwrap();
    assert_eq!(set.entries()[0].operation, Operation::Notnull);
    assert_eq!(set.entries()[0].group, Some(BoolOp::Or));
}

#[test]
fn every_operator_is_reachable_from_a_query() {
    for op in Operation::ALL {
        let query = format!("filter[f][${}]=v", op.as_str().to_uppercase());
        let set = compile_filters(&params(&query)).unwrap();
        assert_eq!(set.entries()[0].operation, op, "query {}", query);
    }
}

#[test]
fn repeated_key_uses_first_value() {
    let set = compile_filters(&params("filter[name][$eq]=first&filter[name][$eq]=second")).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.entries()[0].value, "first");
}

#[test]
fn boundaries_do_not_fail() {
    assert!(compile_filters(&params("")).unwrap().is_empty());
    assert!(compile_filters(&params("include=")).unwrap().is_empty());
    assert!(compile_filters(&params("filter=oops")).unwrap().is_empty());
    assert!(compile_filters(&params("myfilter")).unwrap().is_empty());
    assert!(compile_filters(&QueryParams::new()).unwrap().is_empty());
}

#[test]
fn key_order_is_preserved() {
    let set = compile_filters(&params("filter[b][$eq]=1&page=3&filter[a][$eq]=2")).unwrap();
    let fields: Vec<&str> = set.iter().map(|e| e.fields[0].as_str()).collect();
    assert_eq!(fields, vec!["b", "a"]);
}

#[test]
fn tree_serializes_for_the_execution_layer() {
    let set = compile_filters(&params("filter[age][$gte]=30&filter[age][$lte]=40")).unwrap();
    let json = serde_json::to_value(set.tree()).unwrap();
    assert_eq!(json["all"][0]["test"]["field"], "age");
    assert_eq!(json["all"][1]["test"]["operation"], "lte");
}
