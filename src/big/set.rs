use super::{cursor::BigCursor, iter::BigKeys, BigOpenHashMap};
use crate::{
    common::{
        error::{ConfigError, CursorError},
        key::PrimitiveKey,
    },
    policy::TablePolicy,
    TableBuilder,
};

use std::fmt;

/// A hash set of primitive keys over segmented arrays.
///
/// This is a [`BigOpenHashMap`][map] with `()` values.
///
/// [map]: ./struct.BigOpenHashMap.html
#[derive(Clone)]
pub struct BigOpenHashSet<K> {
    map: BigOpenHashMap<K, ()>,
}

impl<K: PrimitiveKey> Default for BigOpenHashSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PrimitiveKey> BigOpenHashSet<K> {
    /// Creates an empty set with the default capacity, load factor and
    /// segment size.
    pub fn new() -> Self {
        Self {
            map: BigOpenHashMap::new(),
        }
    }

    /// Creates an empty set able to hold `expected` keys without growing.
    pub fn with_capacity(expected: u64) -> Self {
        Self {
            map: BigOpenHashMap::with_capacity(expected),
        }
    }

    /// Creates an empty set able to hold `expected` keys without growing.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not within `(0.0, 1.0]`.
    pub fn with_capacity_and_load_factor(expected: u64, load_factor: f64) -> Self {
        Self {
            map: BigOpenHashMap::with_capacity_and_load_factor(expected, load_factor),
        }
    }

    /// Creates an empty set able to hold `expected` keys without growing, or
    /// returns an error if the configuration is invalid.
    pub fn try_with_capacity_and_load_factor(
        expected: u64,
        load_factor: f64,
    ) -> Result<Self, ConfigError> {
        BigOpenHashMap::try_with_capacity_and_load_factor(expected, load_factor)
            .map(|map| Self { map })
    }

    /// Returns a builder for a set able to hold `expected` keys.
    pub fn builder(expected: u64) -> TableBuilder<Self> {
        TableBuilder::new(expected)
    }

    pub(crate) fn try_with_policy(
        expected: u64,
        policy: TablePolicy,
        segment_shift: u32,
    ) -> Result<Self, ConfigError> {
        BigOpenHashMap::try_with_policy(expected, policy, segment_shift).map(|map| Self { map })
    }

    /// Creates a set from a slice of keys.
    pub fn from_keys(keys: &[K]) -> Self {
        let mut set = Self::with_capacity(keys.len() as u64);
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
    pub fn trim_to(&mut self, expected: u64) {
        self.map.trim_to(expected);
    }

    /// Grows the table, if necessary, so that it can hold `expected` keys.
    pub fn ensure_capacity(&mut self, expected: u64) {
        self.map.ensure_capacity(expected);
    }

    /// Returns a cursor over the keys, which can also remove them.
    pub fn cursor(&self) -> BigSetCursor<K> {
        BigSetCursor {
            inner: self.map.cursor(),
        }
    }

    /// Returns `true` if the set contains `key`.
    pub fn contains(&self, key: K) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the number of keys in the set.
    pub fn len(&self) -> u64 {
        self.map.len()
    }

    /// Returns `true` if the set contains no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of slots of the table.
    pub fn capacity(&self) -> u64 {
        self.map.capacity()
    }

    /// Returns the number of segments the table is split into.
    pub fn num_segments(&self) -> usize {
        self.map.num_segments()
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
    pub fn iter(&self) -> BigKeys<'_, K, ()> {
        self.map.keys()
    }
}

/// A cursor over the keys of a [`BigOpenHashSet`][set] that can remove the
/// key it last returned.
///
/// Behaves like the map [`BigCursor`][cursor].
///
/// [set]: ./struct.BigOpenHashSet.html
/// [cursor]: ./struct.BigCursor.html
#[derive(Clone, Debug)]
pub struct BigSetCursor<K> {
    inner: BigCursor<K>,
}

impl<K: PrimitiveKey> BigSetCursor<K> {
    /// Returns the next key, or `None` when every key has been returned.
    pub fn next(&mut self, set: &BigOpenHashSet<K>) -> Result<Option<K>, CursorError> {
        self.inner.next(&set.map)
    }

    /// Removes the key last returned by this cursor, and returns it.
    pub fn remove(&mut self, set: &mut BigOpenHashSet<K>) -> Result<K, CursorError> {
        self.inner.remove(&mut set.map).map(|(k, _)| k)
    }
}

impl<K: PrimitiveKey> Extend<K> for BigOpenHashSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.map.extend(iter.into_iter().map(|k| (k, ())));
    }
}

impl<K: PrimitiveKey> FromIterator<K> for BigOpenHashSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, K: PrimitiveKey> IntoIterator for &'a BigOpenHashSet<K> {
    type Item = K;
    type IntoIter = BigKeys<'a, K, ()>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PrimitiveKey> fmt::Debug for BigOpenHashSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::BigOpenHashSet;

    #[test]
    fn set_over_small_segments() {
        let mut set = BigOpenHashSet::builder(50).segment_shift(2).build();
        for i in 0..50i32 {
            assert!(set.insert(i * 7));
        }
        assert!(!set.insert(49 * 7));
        assert_eq!(set.len(), 50);
        assert!(set.num_segments() > 1);
        set.retain(|k| k % 2 == 0);
        assert_eq!(set.len(), 25);
        assert!(set.contains(0));
        assert!(!set.contains(7));

        let mut cursor = set.cursor();
        let mut removed = 0;
        while let Some(k) = cursor.next(&set).unwrap() {
            if k > 100 {
                assert_eq!(cursor.remove(&mut set), Ok(k));
                removed += 1;
            }
        }
        assert_eq!(set.len(), 25 - removed);
        assert!(set.iter().all(|k| k <= 100));
    }

    #[test]
    fn default_is_empty() {
        let mut set = BigOpenHashSet::<i64>::default();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), BigOpenHashSet::<i64>::new().capacity());
        assert!(set.insert(-3));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![-3]);
    }
}
