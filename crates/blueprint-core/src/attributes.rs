//! Ordered style attribute maps.
//!
//! Attributes are free-form `key = value` pairs handed to the layout engine
//! (for Graphviz these become graph, node, cluster or edge attributes).
//! Insertion order is preserved so that serialized output is deterministic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An ordered map of style attributes.
///
/// Setting a key that already exists replaces its value in place, keeping the
/// original position.
///
/// # Examples
///
/// ```
/// use blueprint_core::Attributes;
///
/// let attrs = Attributes::new()
///     .with("fontsize", "20")
///     .with("bgcolor", "white");
///
/// assert_eq!(attrs.get("fontsize"), Some("20"));
/// assert_eq!(attrs.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Attributes(IndexMap<String, String>);

impl Attributes {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the map with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Sets `key` to `value` only if the key is not present yet.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Returns the value of `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    /// Copies every entry of `other` into this map. Entries of `other` win.
    pub fn merge(&mut self, other: &Attributes) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Returns a new map made of `self` overridden by `other`.
    pub fn merged(&self, other: &Attributes) -> Attributes {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}
