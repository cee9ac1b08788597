//! Ordered map type for decoded structs.
//!
//! [`TaggedMap`] wraps an [`IndexMap`] so struct fields keep the order in which
//! they were read. Escaped field buckets (`"__ion:<name>"`) are ordinary
//! entries of the map and sit at the position of the first duplicate.
//!
//! ## Examples
//!
//! ```rust
//! use ion_json::{TaggedMap, TaggedValue};
//!
//! let mut map = TaggedMap::new();
//! map.insert("name".to_string(), TaggedValue::from("Alice"));
//! map.insert("age".to_string(), TaggedValue::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::TaggedValue;
use indexmap::IndexMap;

/// An insertion-ordered map of field names to tagged values.
///
/// # Examples
///
/// ```rust
/// use ion_json::{TaggedMap, TaggedValue};
///
/// let mut map = TaggedMap::new();
/// map.insert("first".to_string(), TaggedValue::from(1));
/// map.insert("second".to_string(), TaggedValue::from(2));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaggedMap(IndexMap<String, TaggedValue>);

impl TaggedMap {
    #[must_use]
    pub fn new() -> Self {
        TaggedMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        TaggedMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, key: String, value: TaggedValue) -> Option<TaggedValue> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TaggedValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TaggedValue> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key, shifting later entries down to keep their order.
    pub fn shift_remove(&mut self, key: &str) -> Option<TaggedValue> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, TaggedValue> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, TaggedValue> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, TaggedValue> {
        self.0.iter()
    }
}

impl IntoIterator for TaggedMap {
    type Item = (String, TaggedValue);
    type IntoIter = indexmap::map::IntoIter<String, TaggedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TaggedMap {
    type Item = (&'a String, &'a TaggedValue);
    type IntoIter = indexmap::map::Iter<'a, String, TaggedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, TaggedValue)> for TaggedMap {
    fn from_iter<T: IntoIterator<Item = (String, TaggedValue)>>(iter: T) -> Self {
        TaggedMap(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_remove_keeps_order() {
        let mut map: TaggedMap = ["a", "b", "c"]
            .iter()
            .map(|k| (k.to_string(), TaggedValue::Null))
            .collect();
        map.shift_remove("a");
        map.insert("a".to_string(), TaggedValue::Null);
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "c", "a"]);
    }

    #[test]
    fn test_insert_existing_key_keeps_position() {
        let mut map = TaggedMap::new();
        map.insert("x".to_string(), TaggedValue::from(1));
        map.insert("y".to_string(), TaggedValue::from(2));
        let old = map.insert("x".to_string(), TaggedValue::from(3));
        assert_eq!(old, Some(TaggedValue::from(1)));
        assert_eq!(map.keys().next().map(String::as_str), Some("x"));
    }
}
