//! Ordered query-parameter multimap handed over by the HTTP layer.

use std::collections::HashMap;

/// Query parameters in the order the HTTP layer delivered them.
///
/// Keys keep their first-appearance position; repeating a key appends to its
/// value list instead of creating a second entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ordered, already-decoded `(key, value)` pairs.
    pub fn from_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (k, v) in items {
            params.append(k, v);
        }
        params
    }

    /// Build from a map of values per key.
    ///
    /// Note: key order is whatever the map yields, so it is only deterministic
    /// for ordered maps; prefer `from_items` when the request order is known.
    pub fn from_params(params: &HashMap<String, Vec<String>>) -> Self {
        let mut out = Self::new();
        for (k, vs) in params {
            out.entries.push((k.clone(), vs.clone()));
        }
        out
    }

    /// Decode a raw `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored. An empty string yields no parameters.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_items(url::form_urlencoded::parse(query.as_bytes()).into_owned())
    }

    /// Append one value, keeping the first-appearance order of keys.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Values of an exact key.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, vs)| vs.as_slice())
            .unwrap_or(&[])
    }

    /// All values of every key equal to `key` ignoring ASCII case, in order.
    pub fn get_all_ignore_case(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .flat_map(|(_, vs)| vs.iter().map(String::as_str))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, vs)| (k.as_str(), vs.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_items(iter)
    }
}
