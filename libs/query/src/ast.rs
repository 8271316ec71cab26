//! Predicate tree shared by compiled filters and bound predicates.
//!
//! Composition rules:
//! - fields of one entry fold with the entry's intra-operator (`or` by default)
//! - entries carrying an explicit `$or` marker form one disjunctive group
//! - every other entry, and that group, is an independent conjunct

use serde::{Deserialize, Serialize};

use crate::entry::FilterEntry;
use crate::operation::{BoolOp, Operation};

/// Boolean tree over leaves of type `T`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node<T> {
    All(Vec<Node<T>>),
    Any(Vec<Node<T>>),
    Test(T),
}

/// One raw comparison: `field <operation> value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub field: String,
    pub operation: Operation,
    pub value: String,
}

/// Predicate tree of a compiled, not yet bound, filter set.
pub type FilterNode = Node<Comparison>;

impl<T> Node<T> {
    /// Conjunction; a single child collapses to itself.
    pub fn all(mut nodes: Vec<Node<T>>) -> Self {
        if nodes.len() == 1 {
            if let Some(only) = nodes.pop() {
                return only;
            }
        }
        Node::All(nodes)
    }

    /// Disjunction; a single child collapses to itself.
    pub fn any(mut nodes: Vec<Node<T>>) -> Self {
        if nodes.len() == 1 {
            if let Some(only) = nodes.pop() {
                return only;
            }
        }
        Node::Any(nodes)
    }

    pub fn combine(op: BoolOp, nodes: Vec<Node<T>>) -> Self {
        match op {
            BoolOp::And => Self::all(nodes),
            BoolOp::Or => Self::any(nodes),
        }
    }

    /// Evaluate with `test` deciding each leaf. An empty `All` holds, an empty `Any` does not.
    pub fn evaluate<F>(&self, test: &F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        match self {
            Node::All(children) => children.iter().all(|c| c.evaluate(test)),
            Node::Any(children) => children.iter().any(|c| c.evaluate(test)),
            Node::Test(leaf) => test(leaf),
        }
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            Node::All(children) | Node::Any(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            Node::Test(leaf) => out.push(leaf),
        }
    }

    /// Whether the tree accepts everything (an empty conjunction).
    pub fn is_trivial(&self) -> bool {
        matches!(self, Node::All(children) if children.is_empty())
    }
}

/// One entry's contribution before cross-entry grouping.
pub(crate) struct Grouped<T> {
    pub group: Option<BoolOp>,
    pub node: Node<T>,
}

/// Fold per-entry sub-trees into the request predicate.
pub(crate) fn assemble<T>(entries: impl IntoIterator<Item = Grouped<T>>) -> Node<T> {
    let mut conjuncts = Vec::new();
    let mut or_group = Vec::new();

    for Grouped { group, node } in entries {
        if group == Some(BoolOp::Or) {
            or_group.push(node);
        } else {
            conjuncts.push(node);
        }
    }

    if !or_group.is_empty() {
        conjuncts.push(Node::any(or_group));
    }
    Node::all(conjuncts)
}

/// Raw sub-tree of one entry: one comparison per field, folded with the intra-operator.
pub(crate) fn entry_node(entry: &FilterEntry) -> FilterNode {
    let tests = entry
        .fields
        .iter()
        .map(|field| {
            Node::Test(Comparison {
                field: field.clone(),
                operation: entry.operation,
                value: entry.value.clone(),
            })
        })
        .collect();
    Node::combine(entry.intra_operator, tests)
}
