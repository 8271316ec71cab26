//! Nested include resolution.
//!
//! Turns `include=author.books,author.reviews` into a relation tree whose
//! siblings are unique ignoring case, so overlapping paths share one node.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::config::QueryConfig;
use crate::params::QueryParams;

/// One relation in the include tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncludeNode {
    /// Pascal-cased relation name; empty for the root.
    pub name: String,
    /// Children keyed by lowercased name.
    #[serde(serialize_with = "serialize_children")]
    children: BTreeMap<String, IncludeNode>,
}

fn serialize_children<S: Serializer>(
    children: &BTreeMap<String, IncludeNode>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(children.values())
}

impl IncludeNode {
    fn named(name: String) -> Self {
        Self {
            name,
            children: BTreeMap::new(),
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &IncludeNode> {
        self.children.values()
    }

    /// Child by name, ignoring case.
    pub fn child(&self, name: &str) -> Option<&IncludeNode> {
        self.children.get(&name.to_lowercase())
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Insert `segments` below this node, reusing existing children.
    fn upsert(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let name = pascal_case(first);
        let child = self
            .children
            .entry(name.to_lowercase())
            .or_insert_with(|| IncludeNode::named(name));
        child.upsert(rest);
    }

    fn merge(&mut self, other: IncludeNode) {
        for (key, theirs) in other.children {
            match self.children.get_mut(&key) {
                Some(ours) => ours.merge(theirs),
                None => {
                    self.children.insert(key, theirs);
                }
            }
        }
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for child in self.children.values() {
            let path = if prefix.is_empty() {
                child.name.clone()
            } else {
                format!("{}.{}", prefix, child.name)
            };
            if child.is_leaf() {
                out.push(path);
            } else {
                child.collect_paths(&path, out);
            }
        }
    }

    fn depth(&self) -> usize {
        self.children
            .values()
            .map(|c| 1 + c.depth())
            .max()
            .unwrap_or(0)
    }
}

/// Relations to eager-load alongside the primary query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IncludeTree {
    root: IncludeNode,
}

impl IncludeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }

    /// Top-level relations.
    pub fn children(&self) -> impl Iterator<Item = &IncludeNode> {
        self.root.children()
    }

    /// Node at a dotted path, ignoring case (`author.books`).
    pub fn get(&self, path: &str) -> Option<&IncludeNode> {
        let mut cursor = &self.root;
        let mut walked = false;
        for segment in split_path(path) {
            cursor = cursor.child(segment)?;
            walked = true;
        }
        walked.then_some(cursor)
    }

    /// Insert one dotted path. Empty segments are skipped.
    pub fn insert(&mut self, path: &str) {
        let segments = split_path(path);
        self.root.upsert(&segments);
    }

    /// Fold another tree into this one.
    pub fn merge(&mut self, other: IncludeTree) {
        self.root.merge(other.root);
    }

    /// Dotted root-to-leaf paths (`Author.Books`), in name order.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.collect_paths("", &mut out);
        out
    }

    /// Length of the longest path; zero for an empty tree.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

/// Uppercase the first character only.
pub fn pascal_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Include resolver carrying the parameter name and limits.
#[derive(Debug, Clone, Default)]
pub struct IncludeResolver {
    config: QueryConfig,
}

impl IncludeResolver {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Build the include tree. Never fails: malformed paths degrade to the
    /// segments that survive trimming, and paths over the limits are cut.
    pub fn resolve(&self, params: &QueryParams) -> IncludeTree {
        let mut tree = IncludeTree::new();
        let mut accepted = 0usize;

        for value in params.get_all_ignore_case(&self.config.include_param) {
            for path in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let segments = split_path(path);
                if segments.is_empty() {
                    tracing::debug!(path, "Ignoring include path without segments");
                    continue;
                }

                if accepted >= self.config.max_include_paths {
                    tracing::warn!(
                        path,
                        max = self.config.max_include_paths,
                        "Ignoring include path beyond limit"
                    );
                    continue;
                }

                let max_depth = self.config.max_include_depth;
                let segments = if segments.len() > max_depth {
                    tracing::warn!(
                        path,
                        depth = segments.len(),
                        max = max_depth,
                        "Truncating include path"
                    );
                    &segments[..max_depth]
                } else {
                    &segments[..]
                };

                tree.root.upsert(segments);
                accepted += 1;
            }
        }

        tree
    }
}

/// Resolve the include parameter of one request with the default configuration.
pub fn resolve_includes(params: &QueryParams) -> IncludeTree {
    IncludeResolver::default().resolve(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(query: &str) -> IncludeTree {
        resolve_includes(&QueryParams::parse(query))
    }

    #[test]
    fn shared_prefixes_merge() {
        let tree = resolve("include=author.books,author.reviews");
        let roots: Vec<&str> = tree.children().map(|n| n.name.as_str()).collect();
        assert_eq!(roots, vec!["Author"]);
        let author = tree.get("author").unwrap();
        let kids: Vec<&str> = author.children().map(|n| n.name.as_str()).collect();
        assert_eq!(kids, vec!["Books", "Reviews"]);
    }

    #[test]
    fn dotted_path_is_a_linear_chain() {
        let tree = resolve("include=a.b.c");
        assert_eq!(tree.paths(), vec!["A.B.C"]);
        assert_eq!(tree.depth(), 3);
        assert!(tree.get("A.b.C").unwrap().is_leaf());
    }

    #[test]
    fn self_reference_stays_linear() {
        let tree = resolve("include=author.author.author");
        assert_eq!(tree.paths(), vec!["Author.Author.Author"]);
    }

    #[test]
    fn case_insensitive_siblings_keep_first_spelling() {
        let tree = resolve("include=author&include=AUTHOR.books&Include=Author");
        assert_eq!(tree.children().count(), 1);
        assert_eq!(tree.paths(), vec!["Author.Books"]);
    }

    #[test]
    fn pascal_case_only_touches_first_character() {
        assert_eq!(pascal_case("createdBy"), "CreatedBy");
        assert_eq!(pascal_case("x"), "X");
        assert_eq!(pascal_case("éclair"), "Éclair");
        assert_eq!(pascal_case(""), "");
    }

    #[test]
    fn empty_and_malformed_inputs_degrade() {
        assert!(resolve("").is_empty());
        assert!(resolve("include=").is_empty());
        assert!(resolve("include= , ,. .").is_empty());
        assert_eq!(resolve("include=a..b, ,.c").paths(), vec!["A.B", "C"]);
        assert_eq!(resolve("include=a").get(""), None);
    }

    #[test]
    fn limits_truncate_and_ignore() {
        let resolver = IncludeResolver::new(QueryConfig {
            max_include_depth: 2,
            max_include_paths: 2,
            ..QueryConfig::default()
        });
        let tree = resolver.resolve(&QueryParams::parse("include=a.b.c.d,x,y"));
        assert_eq!(tree.paths(), vec!["A.B", "X"]);
    }

    #[test]
    fn merge_and_serialize() {
        let mut tree = resolve("include=author.books");
        tree.merge(resolve("include=Author.reviews,tags"));
        assert_eq!(
            tree.paths(),
            vec!["Author.Books", "Author.Reviews", "Tags"]
        );
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["children"][0]["name"], "Author");
        assert_eq!(json["children"][0]["children"][1]["name"], "Reviews");
    }
}
