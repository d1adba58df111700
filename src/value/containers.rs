// Mapping and set containers
//
// Mappings carry their traversal-order contract explicitly instead of relying
// on the iteration order of a hash table.

use std::cmp::Ordering;

use crate::value::types::{Key, Value};

/// Traversal-order contract of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum MapOrder {
    /// Entries are visited in the order they were first inserted
    Insertion,
    /// Entries are visited in ascending key order, whatever the insertion history
    #[default]
    Sorted,
}

/// A key-unique associative container.
///
/// Entries are stored in visiting order: insertion order for
/// [`MapOrder::Insertion`], ascending key order for [`MapOrder::Sorted`].
/// Two sorted mappings with the same entries are therefore equal and iterate
/// identically regardless of how they were built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    order: MapOrder,
    entries: Vec<(Key, Value)>,
}

impl Mapping {
    /// Creates an empty mapping with the given order contract.
    pub fn new(order: MapOrder) -> Self {
        Self {
            order,
            entries: Vec::new(),
        }
    }

    /// Creates an empty insertion-ordered mapping.
    pub fn insertion() -> Self {
        Self::new(MapOrder::Insertion)
    }

    /// Creates an empty key-sorted mapping.
    pub fn sorted() -> Self {
        Self::new(MapOrder::Sorted)
    }

    /// Builds a mapping from key/value pairs. Later duplicates replace earlier ones.
    pub fn from_entries<I, K, V>(order: MapOrder, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        let mut mapping = Self::new(order);
        for (k, v) in entries {
            mapping.insert(k, v);
        }
        mapping
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts an entry, returning the previous value for the key if any.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.order {
            MapOrder::Insertion => match self.entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
                None => {
                    self.entries.push((key, value));
                    None
                }
            },
            MapOrder::Sorted => match self.entries.binary_search_by(|(k, _)| k.cmp(&key)) {
                Ok(pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
                Err(pos) => {
                    self.entries.insert(pos, (key, value));
                    None
                }
            },
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        match self.order {
            MapOrder::Insertion => self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            MapOrder::Sorted => self
                .entries
                .binary_search_by(|(k, _)| k.cmp(key))
                .ok()
                .map(|pos| &self.entries[pos].1),
        }
    }

    /// Returns true if `key` has an entry.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    /// Returns the order contract.
    pub fn order(&self) -> MapOrder {
        self.order
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in canonical visiting order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Keys in canonical visiting order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Values in canonical visiting order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

/// An unordered collection of unique values.
///
/// Elements are kept in insertion order for storage only; equality ignores
/// order and leaf extraction refuses to pick one implicitly.
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    items: Vec<Value>,
}

impl ValueSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Builds a set, dropping duplicate elements.
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut set = Self::new();
        for v in values {
            set.insert(v);
        }
        set
    }

    /// Adds an element. Returns false if an equal element was already present.
    pub fn insert(&mut self, value: impl Into<Value>) -> bool {
        let value = value.into();
        if self.items.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Returns true if an equal element is present.
    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the set has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in storage order. This order carries no meaning.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Elements sorted by the given comparison.
    pub fn sorted_by<F>(&self, mut cmp: F) -> Vec<&Value>
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        let mut items: Vec<&Value> = self.items.iter().collect();
        items.sort_by(|a, b| cmp(a, b));
        items
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len() && self.items.iter().all(|v| other.contains(v))
    }
}
