//! An open addressing hash map over segmented arrays.

use super::{
    cursor::BigCursor,
    iter::{BigIter, BigIterMut, BigKeys, BigValues, BigValuesMut},
};
use crate::{
    common::{
        big_array::{BigArray, Pos},
        builder_utils,
        error::ConfigError,
        generation::Generation,
        hash::{self, DEFAULT_INITIAL_SIZE, DEFAULT_LOAD_FACTOR, DEFAULT_SEGMENT_SHIFT},
        key::PrimitiveKey,
    },
    policy::{ShrinkPolicy, TablePolicy},
    TableBuilder,
};

use std::{fmt, ops::AddAssign};

/// A hash map from primitive keys to values whose table is split into
/// segments, so it can grow beyond the size of a single allocation.
///
/// `BigOpenHashMap` behaves exactly like [`OpenHashMap`][map]: open
/// addressing, linear probing, backward shift deletion, and the same growth
/// and shrink rules. The difference is storage. The keys and values live in
/// arrays of segments of at most `2^segment_shift` slots each, and every
/// table index is split into a segment number and an offset. Sizes and
/// indices are `u64`, so the table is limited only by available memory.
///
/// The segment size defaults to `2^27` slots and can be set through the
/// [builder][builder].
///
/// # Examples
///
/// ```rust
/// use primcoll::BigOpenHashMap;
///
/// let mut map = BigOpenHashMap::<u64, u8>::builder(1000)
///     .segment_shift(6)
///     .build();
/// for i in 0..1000 {
///     map.insert(i, (i % 256) as u8);
/// }
/// assert_eq!(map.len(), 1000);
/// assert_eq!(map.get(300), Some(&44));
/// ```
///
/// [map]: ./struct.OpenHashMap.html
/// [builder]: ./struct.TableBuilder.html
#[derive(Clone)]
pub struct BigOpenHashMap<K, V> {
    pub(crate) keys: BigArray<K>,
    pub(crate) values: BigArray<Option<V>>,
    pub(crate) null_value: Option<V>,
    pub(crate) contains_null_key: bool,
    pub(crate) n: u64,
    mask: u64,
    max_fill: u64,
    min_n: u64,
    pub(crate) size: u64,
    segment_shift: u32,
    policy: TablePolicy,
    pub(crate) generation: Generation,
}

impl<K: PrimitiveKey, V> Default for BigOpenHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PrimitiveKey, V> BigOpenHashMap<K, V> {
    /// Creates an empty map with the default capacity, load factor and
    /// segment size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_SIZE as u64)
    }

    /// Creates an empty map able to hold `expected` entries without growing.
    ///
    /// # Panics
    ///
    /// Panics if the table for `expected` entries would exceed 2^62 slots.
    pub fn with_capacity(expected: u64) -> Self {
        Self::with_capacity_and_load_factor(expected, DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty map able to hold `expected` entries without growing.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not within `(0.0, 1.0]`, or if the table for
    /// `expected` entries would exceed 2^62 slots.
    pub fn with_capacity_and_load_factor(expected: u64, load_factor: f64) -> Self {
        builder_utils::or_panic(Self::try_with_capacity_and_load_factor(
            expected,
            load_factor,
        ))
    }

    /// Creates an empty map able to hold `expected` entries without growing,
    /// or returns an error if the configuration is invalid.
    pub fn try_with_capacity_and_load_factor(
        expected: u64,
        load_factor: f64,
    ) -> Result<Self, ConfigError> {
        let policy = TablePolicy::new(load_factor, ShrinkPolicy::default())?;
        Self::try_with_policy(expected, policy, DEFAULT_SEGMENT_SHIFT)
    }

    /// Returns a builder for a map able to hold `expected` entries.
    pub fn builder(expected: u64) -> TableBuilder<Self> {
        TableBuilder::new(expected)
    }

    pub(crate) fn try_with_policy(
        expected: u64,
        policy: TablePolicy,
        segment_shift: u32,
    ) -> Result<Self, ConfigError> {
        builder_utils::ensure_segment_shift(segment_shift)?;
        let load_factor = policy.load_factor();
        let n = hash::checked_table_size_for(expected, load_factor).ok_or(
            ConfigError::CapacityOverflow {
                expected,
                load_factor,
            },
        )?;

        Ok(Self {
            keys: BigArray::with_fn(n, segment_shift, || K::NULL),
            values: BigArray::new(n, segment_shift),
            null_value: None,
            contains_null_key: false,
            n,
            mask: n - 1,
            max_fill: hash::fill_threshold(n, load_factor),
            min_n: n,
            size: 0,
            segment_shift,
            policy,
            generation: Generation::new(),
        })
    }

    /// Creates a map from parallel slices of keys and values. Later duplicates
    /// of a key overwrite earlier ones.
    ///
    /// # Panics
    ///
    /// Panics if the slices have different lengths.
    pub fn from_keys_values(keys: &[K], values: &[V]) -> Self
    where
        V: Clone,
    {
        assert_eq!(
            keys.len(),
            values.len(),
            "keys and values must have the same length"
        );
        let mut map = Self::with_capacity(keys.len() as u64);
        for (k, v) in keys.iter().zip(values) {
            map.insert(*k, v.clone());
        }
        map
    }

    /// Inserts a key-value pair into the map, returning the previous value of
    /// the key, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.find_insert_slot(key) {
            Ok(slot) => self.value_slot_mut(slot).replace(value),
            Err(slot) => {
                self.insert_at(slot, key, value);
                None
            }
        }
    }

    /// Inserts a key-value pair only if the key is absent. Returns the current
    /// value if the key was already present.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> Option<&V> {
        match self.find_insert_slot(key) {
            Ok(slot) => self.value_at(slot),
            Err(slot) => {
                self.insert_at(slot, key, value);
                None
            }
        }
    }

    /// Replaces the value of a key only if the key is present, returning the
    /// previous value.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        let slot = self.find_slot(key)?;
        self.value_slot_mut(slot).replace(value)
    }

    /// Adds `increment` to the value of `key`, treating an absent key as
    /// holding the default value. Returns the previous value.
    pub fn add_to(&mut self, key: K, increment: V) -> V
    where
        V: AddAssign + Copy + Default,
    {
        match self.find_insert_slot(key) {
            Ok(slot) => {
                let value = self.value_slot_mut(slot).get_or_insert_with(V::default);
                let old = *value;
                *value += increment;
                old
            }
            Err(slot) => {
                let mut value = V::default();
                value += increment;
                self.insert_at(slot, key, value);
                V::default()
            }
        }
    }

    /// Returns a clone of the value of `key`, or the default value if the key
    /// is absent.
    pub fn get_or_default(&self, key: K) -> V
    where
        V: Clone + Default,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Removes a key from the map, returning its value if it was present.
    pub fn remove(&mut self, key: K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and its value if
    /// the key was present.
    pub fn remove_entry(&mut self, key: K) -> Option<(K, V)> {
        let slot = self.find_slot(key)?;
        let entry = self.remove_at(slot, |_| ());
        self.maybe_shrink();
        entry
    }

    /// Retains only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(K, &mut V) -> bool,
    {
        let mut cursor = self.cursor();
        loop {
            let step = cursor.advance(self);
            debug_assert!(step.is_ok(), "retain lost track of the table: {step:?}");
            let Ok(Some(slot)) = step else {
                break;
            };
            let key = self.key_at(slot);
            let keep = self.value_at_mut(slot).map_or(true, |value| f(key, value));
            if !keep {
                let removed = cursor.remove(self);
                debug_assert!(removed.is_ok(), "retain failed to remove {key:?}");
                if removed.is_err() {
                    break;
                }
            }
        }
    }

    /// Removes all entries, keeping the allocated capacity.
    pub fn clear(&mut self) {
        if self.size == 0 {
            return;
        }
        self.size = 0;
        self.contains_null_key = false;
        self.null_value = None;
        self.keys.iter_mut().for_each(|k| *k = K::NULL);
        self.values.iter_mut().for_each(|v| *v = None);
        self.generation.bump();
    }

    /// Shrinks the table to the smallest size able to hold the current
    /// entries.
    pub fn trim(&mut self) {
        self.trim_to(self.size);
    }

    /// Shrinks the table to the smallest size able to hold `expected`
    /// entries, as long as that size can still hold the current entries.
    pub fn trim_to(&mut self, expected: u64) {
        let load_factor = self.policy.load_factor();
        let Some(l) = hash::checked_table_size_for(expected, load_factor) else {
            return;
        };
        if l >= self.n || self.size > hash::fill_threshold(l, load_factor) {
            return;
        }
        self.rehash(l);
    }

    /// Grows the table, if necessary, so that it can hold `expected` entries
    /// in total without growing again.
    pub fn ensure_capacity(&mut self, expected: u64) {
        let needed = hash::table_size_for(expected, self.policy.load_factor());
        if needed > self.n {
            self.rehash(needed);
        }
    }

    /// Returns a cursor over the entries, which can also remove them.
    pub fn cursor(&self) -> BigCursor<K> {
        BigCursor::new(self)
    }

    fn insert_at(&mut self, slot: Option<Pos>, key: K, value: V) {
        match slot {
            None => {
                self.contains_null_key = true;
                self.null_value = Some(value);
            }
            Some(pos) => {
                *self.keys.at_mut(pos) = key;
                *self.values.at_mut(pos) = Some(value);
            }
        }
        self.size += 1;
        self.generation.bump();

        if self.size > self.max_fill {
            let n = hash::table_size_for(self.size + 1, self.policy.load_factor());
            self.rehash(n);
        }
    }

    pub(crate) fn remove_at(
        &mut self,
        slot: Option<Pos>,
        on_wrap: impl FnMut(K),
    ) -> Option<(K, V)> {
        let (key, value) = match slot {
            None => {
                self.contains_null_key = false;
                (K::NULL, self.null_value.take())
            }
            Some(pos) => {
                let entry = (*self.keys.at(pos), self.values.at_mut(pos).take());
                let index = self.keys.index_of(pos);
                self.shift_keys(index, on_wrap);
                entry
            }
        };
        self.size -= 1;
        self.generation.bump();
        value.map(|value| (key, value))
    }

    /// Closes the gap at logical index `pos`. Works on logical indices so the
    /// cyclic range test is independent of the segment layout.
    fn shift_keys(&mut self, mut pos: u64, mut on_wrap: impl FnMut(K)) {
        loop {
            let last = pos;
            pos = (pos + 1) & self.mask;
            let curr = loop {
                let curr = *self.keys.get(pos);
                if curr.is_null() {
                    self.keys.set(last, K::NULL);
                    return;
                }
                let slot = hash::mix(curr.key_bits()) & self.mask;
                if !hash::stays_behind_gap(last, slot, pos) {
                    break curr;
                }
                pos = (pos + 1) & self.mask;
            };
            if pos < last {
                on_wrap(curr);
            }
            self.keys.set(last, curr);
            let value = self.values.take(pos);
            self.values.set(last, value);
        }
    }

    fn maybe_shrink(&mut self) {
        let shrink =
            self.policy
                .shrink_policy()
                .should_shrink(self.n, self.min_n, self.size, self.max_fill);
        if shrink {
            self.rehash(self.n / 2);
        }
    }

    fn rehash(&mut self, new_n: u64) {
        debug_assert!(new_n.is_power_of_two());
        let mask = new_n - 1;
        let mut keys = BigArray::with_fn(new_n, self.segment_shift, || K::NULL);
        let mut values = BigArray::<Option<V>>::new(new_n, self.segment_shift);

        for (key, value) in self.keys.iter().zip(self.values.iter_mut()) {
            if key.is_null() {
                continue;
            }
            let mut pos = keys.pos(hash::mix(key.key_bits()) & mask);
            while !keys.at(pos).is_null() {
                pos = keys.next_pos(pos);
            }
            *keys.at_mut(pos) = *key;
            *values.at_mut(pos) = value.take();
        }

        #[cfg(feature = "logging")]
        log::debug!(
            "Rehashed a BigOpenHashMap of {} entries from {} to {} slots ({} segments)",
            self.size,
            self.n,
            new_n,
            keys.num_segments()
        );

        self.keys = keys;
        self.values = values;
        self.n = new_n;
        self.mask = mask;
        self.max_fill = hash::fill_threshold(new_n, self.policy.load_factor());
        self.generation.bump();
    }
}

impl<K: PrimitiveKey, V> BigOpenHashMap<K, V> {
    /// Returns the number of entries in the map.
    pub fn len(&self) -> u64 {
        self.size
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots of the table.
    pub fn capacity(&self) -> u64 {
        self.n
    }

    /// Returns the number of segments the table is split into.
    pub fn num_segments(&self) -> usize {
        self.keys.num_segments()
    }

    /// Returns the base-2 logarithm of the maximum segment length.
    pub fn segment_shift(&self) -> u32 {
        self.segment_shift
    }

    /// Returns the load factor of the table.
    pub fn load_factor(&self) -> f64 {
        self.policy.load_factor()
    }

    /// Returns the sizing policy of the table.
    pub fn policy(&self) -> TablePolicy {
        self.policy
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: K) -> bool {
        self.find_slot(key).is_some()
    }

    /// Returns a reference to the value of `key`.
    pub fn get(&self, key: K) -> Option<&V> {
        self.find_slot(key).and_then(|slot| self.value_at(slot))
    }

    /// Returns a mutable reference to the value of `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let slot = self.find_slot(key)?;
        self.value_at_mut(slot)
    }

    /// Returns an iterator over the entries, in table order.
    pub fn iter(&self) -> BigIter<'_, K, V> {
        BigIter::new(
            self.null_value.as_ref(),
            self.keys.segments(),
            self.values.segments(),
            self.size,
        )
    }

    /// Returns an iterator over the entries, with mutable references to the
    /// values.
    pub fn iter_mut(&mut self) -> BigIterMut<'_, K, V> {
        BigIterMut::new(
            self.null_value.as_mut(),
            self.keys.segments(),
            self.values.segments_mut(),
            self.size,
        )
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> BigKeys<'_, K, V> {
        BigKeys::new(self.iter())
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> BigValues<'_, K, V> {
        BigValues::new(self.iter())
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> BigValuesMut<'_, K, V> {
        BigValuesMut::new(self.iter_mut())
    }

    #[inline]
    fn ideal_pos(&self, key: K) -> Pos {
        self.keys.pos(hash::mix(key.key_bits()) & self.mask)
    }

    pub(crate) fn find_slot(&self, key: K) -> Option<Option<Pos>> {
        if key.is_null() {
            return self.contains_null_key.then_some(None);
        }
        let mut pos = self.ideal_pos(key);
        loop {
            let curr = *self.keys.at(pos);
            if curr.is_null() {
                return None;
            }
            if curr.same_key(key) {
                return Some(Some(pos));
            }
            pos = self.keys.next_pos(pos);
        }
    }

    fn find_insert_slot(&self, key: K) -> Result<Option<Pos>, Option<Pos>> {
        if key.is_null() {
            return if self.contains_null_key {
                Ok(None)
            } else {
                Err(None)
            };
        }
        let mut pos = self.ideal_pos(key);
        loop {
            let curr = *self.keys.at(pos);
            if curr.is_null() {
                return Err(Some(pos));
            }
            if curr.same_key(key) {
                return Ok(Some(pos));
            }
            pos = self.keys.next_pos(pos);
        }
    }

    #[inline]
    pub(crate) fn key_at(&self, slot: Option<Pos>) -> K {
        slot.map_or(K::NULL, |pos| *self.keys.at(pos))
    }

    #[inline]
    pub(crate) fn value_at(&self, slot: Option<Pos>) -> Option<&V> {
        match slot {
            None => self.null_value.as_ref(),
            Some(pos) => self.values.at(pos).as_ref(),
        }
    }

    #[inline]
    pub(crate) fn value_at_mut(&mut self, slot: Option<Pos>) -> Option<&mut V> {
        self.value_slot_mut(slot).as_mut()
    }

    #[inline]
    fn value_slot_mut(&mut self, slot: Option<Pos>) -> &mut Option<V> {
        match slot {
            None => &mut self.null_value,
            Some(pos) => self.values.at_mut(pos),
        }
    }
}

impl<K: PrimitiveKey, V> Extend<(K, V)> for BigOpenHashMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let lower = lower as u64;
        let expected = if self.policy.load_factor() <= 0.5 {
            lower
        } else {
            self.size.saturating_add(lower)
        };
        if let Some(needed) = hash::checked_table_size_for(expected, self.policy.load_factor()) {
            if needed > self.n {
                self.rehash(needed);
            }
        }
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: PrimitiveKey, V> FromIterator<(K, V)> for BigOpenHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K: PrimitiveKey, V> IntoIterator for &'a BigOpenHashMap<K, V> {
    type Item = (K, &'a V);
    type IntoIter = BigIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: PrimitiveKey, V> IntoIterator for &'a mut BigOpenHashMap<K, V> {
    type Item = (K, &'a mut V);
    type IntoIter = BigIterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K: PrimitiveKey, V: fmt::Debug> fmt::Debug for BigOpenHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
