//! # Annotations
//!
//! Key/value pairs attached to a declaration through the trailing lines of its
//! documentation comment:
//!
//! ```text
//! /// Lists the users of a tenant.
//! ///
//! /// Path: /users
//! /// Method: post
//! ```
//!
//! Lines are scanned from the bottom up and scanning stops at the first line
//! without a `:` separator.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Marks a service or endpoint and carries its route path.
pub const PATH: &str = "path";
/// HTTP verb of an endpoint.
pub const METHOD: &str = "method";
/// Marks a free function as a custom resolver.
pub const RESOLVE: &str = "resolve";

/// Annotation set of a single declaration.
///
/// Keys are stored lower case, values verbatim (trimmed). Iteration follows
/// scan order, i.e. bottom line first.
/// Deserialized maps go through the same key normalization as [`parse`].
///
/// [`parse`]: Annotations::parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "IndexMap<String, String>",
    into = "IndexMap<String, String>"
)]
pub struct Annotations(IndexMap<String, String>);

impl Annotations {
    /// Parses the annotation block at the end of `doc`.
    ///
    /// On duplicate keys the first one encountered wins, which is the lowest
    /// physical line.
    ///
    /// # Examples
    /// ```
    /// use flowheater_core::annotations::Annotations;
    ///
    /// let a = Annotations::parse("Does things.\n\nPath: /a\nMETHOD: post");
    /// assert_eq!(a.get("path"), Some("/a"));
    /// assert_eq!(a.get("Method"), Some("post"));
    /// ```
    pub fn parse(doc: &str) -> Self {
        let mut entries = IndexMap::new();

        for line in doc.trim().lines().rev() {
            let Some((key, value)) = line.split_once(':') else {
                break;
            };
            entries
                .entry(key.trim().to_lowercase())
                .or_insert_with(|| value.trim().to_string());
        }

        Self(entries)
    }

    /// Returns the value stored under `key`. Keys are not case-sensitive.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Tests for the presence of `key`. Keys are not case-sensitive.
    pub fn exists(&self, key: &str) -> bool {
        self.0.contains_key(&key.to_lowercase())
    }

    /// Number of annotations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no annotation was found.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<IndexMap<String, String>> for Annotations {
    fn from(entries: IndexMap<String, String>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<Annotations> for IndexMap<String, String> {
    fn from(annotations: Annotations) -> Self {
        annotations.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Annotations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries = IndexMap::new();
        for (k, v) in iter {
            entries
                .entry(k.into().to_lowercase())
                .or_insert_with(|| v.into());
        }
        Self(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_stops_at_first_plain_line() {
        let doc = "Method: GET\nSome prose without separator\nPath: /users\nVersion: 2";
        let a = Annotations::parse(doc);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("path"), Some("/users"));
        assert_eq!(a.get("version"), Some("2"));
        assert!(!a.exists("method"));
    }

    #[test]
    fn test_key_case_is_normalized_value_is_not() {
        let a = Annotations::parse("  PaTh :  /Users/{ID}  ");
        assert_eq!(a.get("PATH"), Some("/Users/{ID}"));
        assert!(a.exists("path"));
    }

    #[test]
    fn test_duplicate_keeps_lowest_line() {
        let a = Annotations::parse("Path: /upper\nPath: /lower");
        assert_eq!(a.get("path"), Some("/lower"));
    }

    #[test]
    fn test_value_may_contain_separator() {
        let a = Annotations::parse("Path: /time/{hh:mm}");
        assert_eq!(a.get("path"), Some("/time/{hh:mm}"));
    }

    #[test]
    fn test_empty_doc() {
        let a = Annotations::parse("");
        assert!(a.is_empty());
        assert_eq!(a.get("path"), None);
    }

    #[test]
    fn test_blank_trailing_lines_are_trimmed() {
        let a = Annotations::parse("Intro.\n\nPath: /x\n\n");
        assert_eq!(a.get("path"), Some("/x"));
    }

    #[test]
    fn test_deserialized_keys_are_normalized() {
        let a: Annotations = serde_json::from_str(r#"{"Path": "/users", "METHOD": "post"}"#).unwrap();
        assert_eq!(a.get("path"), Some("/users"));
        assert!(a.exists("method"));

        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["path"], "/users");
    }
}
