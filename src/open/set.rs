use super::{cursor::Cursor, iter::Keys, OpenHashMap};
use crate::{
    common::{error::ConfigError, error::CursorError, key::PrimitiveKey},
    policy::TablePolicy,
    TableBuilder,
};

use std::fmt;

/// A hash set of primitive keys, implemented with open addressing and linear
/// probing.
///
/// This is an [`OpenHashMap`][map] with `()` values, so the value array takes
/// no memory. See the map for the details of hashing, removal and resizing.
///
/// # Examples
///
/// ```rust
/// use primcoll::OpenHashSet;
///
/// let mut set: OpenHashSet<i64> = [3, 1, 4, 1, 5].into_iter().collect();
/// assert_eq!(set.len(), 4);
/// assert!(set.contains(4));
/// assert!(set.remove(1));
/// assert!(!set.remove(1));
/// ```
///
/// [map]: ./struct.OpenHashMap.html
#[derive(Clone)]
pub struct OpenHashSet<K> {
    pub(crate) map: OpenHashMap<K, ()>,
}

impl<K: PrimitiveKey> Default for OpenHashSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PrimitiveKey> OpenHashSet<K> {
    /// Creates an empty set with the default capacity and load factor.
    pub fn new() -> Self {
        Self {
            map: OpenHashMap::new(),
        }
    }

    /// Creates an empty set able to hold `expected` keys without growing.
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            map: OpenHashMap::with_capacity(expected),
        }
    }

    /// Creates an empty set able to hold `expected` keys without growing.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not within `(0.0, 1.0]`, or if the table
    /// would be too large.
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f64) -> Self {
        Self {
            map: OpenHashMap::with_capacity_and_load_factor(expected, load_factor),
        }
    }

    /// Creates an empty set able to hold `expected` keys without growing, or
    /// returns an error if the configuration is invalid.
    pub fn try_with_capacity_and_load_factor(
        expected: usize,
        load_factor: f64,
    ) -> Result<Self, ConfigError> {
        OpenHashMap::try_with_capacity_and_load_factor(expected, load_factor)
            .map(|map| Self { map })
    }

    /// Returns a builder for a set able to hold `expected` keys.
    pub fn builder(expected: usize) -> TableBuilder<Self> {
        TableBuilder::new(expected as u64)
    }

    pub(crate) fn try_with_policy(expected: u64, policy: TablePolicy) -> Result<Self, ConfigError> {
        OpenHashMap::try_with_policy(expected, policy).map(|map| Self { map })
    }

    /// Creates a set from a slice of keys.
    pub fn from_keys(keys: &[K]) -> Self {
        let mut set = Self::with_capacity(keys.len());
        set.extend(keys.iter().copied());
        set
    }

    /// Adds a key to the set. Returns `true` if the key was not present.
    pub fn insert(&mut self, key: K) -> bool {
        self.map.insert_if_absent(key, ()).is_none()
    }

    /// Removes a key from the set. Returns `true` if the key was present.
    pub fn remove(&mut self, key: K) -> bool {
        self.map.remove(key).is_some()
    }

    /// Retains only the keys for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(K) -> bool,
    {
        self.map.retain(|k, _| f(k));
    }

    /// Removes all keys, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Shrinks the table to the smallest size able to hold the current keys.
    pub fn trim(&mut self) {
        self.map.trim();
    }

    /// Shrinks the table to the smallest size able to hold `expected` keys,
    /// if that still holds the current keys.
    pub fn trim_to(&mut self, expected: usize) {
        self.map.trim_to(expected);
    }

    /// Grows the table, if necessary, so that it can hold `expected` keys.
    pub fn ensure_capacity(&mut self, expected: usize) {
        self.map.ensure_capacity(expected);
    }

    /// Returns a cursor over the keys, which can also remove them.
    pub fn cursor(&self) -> SetCursor<K> {
        SetCursor {
            inner: self.map.cursor(),
        }
    }

    /// Returns `true` if the set contains `key`.
    pub fn contains(&self, key: K) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the number of keys in the set.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of slots of the table.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Returns the load factor of the table.
    pub fn load_factor(&self) -> f64 {
        self.map.load_factor()
    }

    /// Returns the sizing policy of the table.
    pub fn policy(&self) -> TablePolicy {
        self.map.policy()
    }

    /// Returns an iterator over the keys.
    pub fn iter(&self) -> Keys<'_, K, ()> {
        self.map.keys()
    }
}

/// A cursor over the keys of an [`OpenHashSet`][set] that can remove the key
/// it last returned.
///
/// Behaves like the map [`Cursor`][cursor].
///
/// [set]: ./struct.OpenHashSet.html
/// [cursor]: ./struct.Cursor.html
#[derive(Clone, Debug)]
pub struct SetCursor<K> {
    inner: Cursor<K>,
}

impl<K: PrimitiveKey> SetCursor<K> {
    /// Returns the next key, or `None` when every key has been returned.
    pub fn next(&mut self, set: &OpenHashSet<K>) -> Result<Option<K>, CursorError> {
        self.inner.next(&set.map)
    }

    /// Removes the key last returned by this cursor, and returns it.
    pub fn remove(&mut self, set: &mut OpenHashSet<K>) -> Result<K, CursorError> {
        self.inner.remove(&mut set.map).map(|(k, _)| k)
    }
}

impl<K: PrimitiveKey> Extend<K> for OpenHashSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.map.extend(iter.into_iter().map(|k| (k, ())));
    }
}

impl<K: PrimitiveKey> FromIterator<K> for OpenHashSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, K: PrimitiveKey> IntoIterator for &'a OpenHashSet<K> {
    type Item = K;
    type IntoIter = Keys<'a, K, ()>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PrimitiveKey> fmt::Debug for OpenHashSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
