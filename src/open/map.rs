//! An open addressing hash map with linear probing for primitive keys.

use super::{
    cursor::Cursor,
    iter::{Iter, IterMut, Keys, Values, ValuesMut},
};
use crate::{
    common::{
        builder_utils,
        error::ConfigError,
        generation::Generation,
        hash::{self, DEFAULT_INITIAL_SIZE, DEFAULT_LOAD_FACTOR},
        key::PrimitiveKey,
    },
    policy::{ShrinkPolicy, TablePolicy},
    TableBuilder,
};

use std::{fmt, ops::AddAssign};

/// A hash map from primitive keys to values, implemented with open addressing
/// and linear probing.
///
/// Keys are stored unboxed in a flat array whose length is a power of two, and
/// values in a parallel array. A key is looked up by scrambling its bit pattern
/// with [`mix`][mix] and scanning forward from the resulting slot until either
/// the key or an empty slot is found.
///
/// The all-zero bit pattern marks an empty slot. The key with that pattern
/// (`0`, `0.0`, `false`, `'\0'`) is nevertheless a valid key: its presence is
/// tracked by a flag and its value is kept outside the arrays.
///
/// Removal does not leave tombstones behind. Instead, the entries following
/// the freed slot are shifted backward, so lookups never scan more than the
/// cluster a key belongs to.
///
/// The table grows synchronously when the number of entries exceeds the fill
/// threshold given by the load factor, and shrinks after removals according to
/// its [`ShrinkPolicy`][shrink-policy], never below the capacity it was created
/// with.
///
/// A free slot holds no value, so values need not implement `Default`.
/// [`OpenHashSet`][set] is this map with `()` values.
///
/// # Examples
///
/// ```rust
/// use primcoll::OpenHashMap;
///
/// let mut prices = OpenHashMap::new();
/// prices.insert(3.5f64, "latte");
/// prices.insert(0.0, "water");
///
/// assert_eq!(prices.get(3.5), Some(&"latte"));
/// assert_eq!(prices.get(0.0), Some(&"water"));
/// assert_eq!(prices.remove(3.5), Some("latte"));
/// assert!(!prices.contains_key(3.5));
/// assert_eq!(prices.len(), 1);
/// ```
///
/// [mix]: ./hash/fn.mix.html
/// [shrink-policy]: ./enum.ShrinkPolicy.html
/// [set]: ./struct.OpenHashSet.html
#[derive(Clone)]
pub struct OpenHashMap<K, V> {
    pub(crate) keys: Box<[K]>,
    pub(crate) values: Box<[Option<V>]>,
    pub(crate) null_value: Option<V>,
    pub(crate) contains_null_key: bool,
    pub(crate) n: usize,
    pub(crate) mask: usize,
    pub(crate) max_fill: usize,
    min_n: usize,
    pub(crate) size: usize,
    policy: TablePolicy,
    pub(crate) generation: Generation,
}

impl<K: PrimitiveKey, V> Default for OpenHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PrimitiveKey, V> OpenHashMap<K, V> {
    /// Creates an empty map able to hold the default number of entries without
    /// growing, with the default load factor.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_SIZE)
    }

    /// Creates an empty map able to hold `expected` entries without growing,
    /// with the default load factor.
    ///
    /// # Panics
    ///
    /// Panics if the table for `expected` entries would exceed
    /// [`MAX_FLAT_CAPACITY`][max] slots.
    ///
    /// [max]: ./hash/constant.MAX_FLAT_CAPACITY.html
    pub fn with_capacity(expected: usize) -> Self {
        Self::with_capacity_and_load_factor(expected, DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty map able to hold `expected` entries without growing.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is not within `(0.0, 1.0]`, or if the table for
    /// `expected` entries would exceed [`MAX_FLAT_CAPACITY`][max] slots.
    ///
    /// [max]: ./hash/constant.MAX_FLAT_CAPACITY.html
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f64) -> Self {
        builder_utils::or_panic(Self::try_with_capacity_and_load_factor(
            expected,
            load_factor,
        ))
    }

    /// Creates an empty map able to hold `expected` entries without growing,
    /// or returns an error if the configuration is invalid.
    pub fn try_with_capacity_and_load_factor(
        expected: usize,
        load_factor: f64,
    ) -> Result<Self, ConfigError> {
        let policy = TablePolicy::new(load_factor, ShrinkPolicy::default())?;
        Self::try_with_policy(expected as u64, policy)
    }

    /// Returns a builder for a map able to hold `expected` entries.
    pub fn builder(expected: usize) -> TableBuilder<Self> {
        TableBuilder::new(expected as u64)
    }

    pub(crate) fn try_with_policy(expected: u64, policy: TablePolicy) -> Result<Self, ConfigError> {
        let load_factor = policy.load_factor();
        let n = hash::checked_flat_table_size_for(expected, load_factor).ok_or(
            ConfigError::CapacityOverflow {
                expected,
                load_factor,
            },
        )?;

        Ok(Self {
            keys: vec![K::NULL; n].into_boxed_slice(),
            values: empty_values(n),
            null_value: None,
            contains_null_key: false,
            n,
            mask: n - 1,
            max_fill: hash::fill_threshold(n as u64, load_factor) as usize,
            min_n: n,
            size: 0,
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
        let mut map = Self::with_capacity(keys.len());
        for (k, v) in keys.iter().zip(values) {
            map.insert(*k, v.clone());
        }
        map
    }

    /// Inserts a key-value pair into the map, returning the previous value of
    /// the key, if any.
    ///
    /// If the insertion pushes the number of entries above the fill threshold,
    /// the table grows before this method returns.
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
    /// value if the key was already present, in which case `value` is dropped.
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
    ///
    /// ```rust
    /// use primcoll::OpenHashMap;
    ///
    /// let mut counts = OpenHashMap::<char, u32>::new();
    /// for c in "hello".chars() {
    ///     counts.add_to(c, 1);
    /// }
    /// assert_eq!(counts.get('l'), Some(&2));
    /// ```
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
    ///
    /// May shrink the table, depending on the shrink policy.
    pub fn remove_entry(&mut self, key: K) -> Option<(K, V)> {
        let slot = self.find_slot(key)?;
        let entry = self.remove_at(slot, |_| ());
        self.maybe_shrink();
        entry
    }

    /// Retains only the entries for which `f` returns `true`.
    ///
    /// The table is never shrunk while the entries are being visited.
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
        self.keys.fill(K::NULL);
        self.values.fill_with(|| None);
        self.generation.bump();
    }

    /// Shrinks the table to the smallest size able to hold the current
    /// entries.
    pub fn trim(&mut self) {
        self.trim_to(self.size);
    }

    /// Shrinks the table to the smallest size able to hold `expected`
    /// entries, as long as that size can still hold the current entries and is
    /// smaller than the current one.
    pub fn trim_to(&mut self, expected: usize) {
        let load_factor = self.policy.load_factor();
        let Some(l) = hash::checked_flat_table_size_for(expected as u64, load_factor) else {
            return;
        };
        if l >= self.n || self.size > hash::fill_threshold(l as u64, load_factor) as usize {
            return;
        }
        self.rehash(l);
    }

    /// Grows the table, if necessary, so that it can hold `expected` entries
    /// in total without growing again.
    ///
    /// # Panics
    ///
    /// Panics if the table would exceed [`MAX_FLAT_CAPACITY`][max] slots.
    ///
    /// [max]: ./hash/constant.MAX_FLAT_CAPACITY.html
    pub fn ensure_capacity(&mut self, expected: usize) {
        let needed = hash::flat_table_size_for(expected as u64, self.policy.load_factor());
        if needed > self.n {
            self.rehash(needed);
        }
    }

    /// Returns a cursor over the entries, which can also remove them.
    pub fn cursor(&self) -> Cursor<K> {
        Cursor::new(self)
    }

    // Places a new entry into a free slot found by `find_insert_slot`, and
    // grows the table if it is now over its fill threshold.
    fn insert_at(&mut self, slot: Option<usize>, key: K, value: V) {
        match slot {
            None => {
                self.contains_null_key = true;
                self.null_value = Some(value);
            }
            Some(pos) => {
                self.keys[pos] = key;
                self.values[pos] = Some(value);
            }
        }
        self.size += 1;
        self.generation.bump();

        if self.size > self.max_fill {
            let n = hash::flat_table_size_for(self.size as u64 + 1, self.policy.load_factor());
            self.rehash(n);
        }
    }

    /// Removes the entry in `slot` without shrinking the table. Entries moved
    /// by the backward shift from a lower index to a higher one are passed to
    /// `on_wrap`.
    pub(crate) fn remove_at(
        &mut self,
        slot: Option<usize>,
        on_wrap: impl FnMut(K),
    ) -> Option<(K, V)> {
        let (key, value) = match slot {
            None => {
                self.contains_null_key = false;
                (K::NULL, self.null_value.take())
            }
            Some(pos) => {
                let entry = (self.keys[pos], self.values[pos].take());
                self.shift_keys(pos, on_wrap);
                entry
            }
        };
        self.size -= 1;
        self.generation.bump();
        value.map(|value| (key, value))
    }

    /// Closes the gap at `pos` by moving back every following entry of the
    /// cluster whose ideal slot does not lie between the gap and itself.
    fn shift_keys(&mut self, mut pos: usize, mut on_wrap: impl FnMut(K)) {
        loop {
            let last = pos;
            pos = (pos + 1) & self.mask;
            let curr = loop {
                let curr = self.keys[pos];
                if curr.is_null() {
                    self.keys[last] = K::NULL;
                    return;
                }
                let slot = self.ideal_slot(curr);
                if !hash::stays_behind_gap(last as u64, slot as u64, pos as u64) {
                    break curr;
                }
                pos = (pos + 1) & self.mask;
            };
            if pos < last {
                on_wrap(curr);
            }
            self.keys[last] = curr;
            self.values[last] = self.values[pos].take();
        }
    }

    fn maybe_shrink(&mut self) {
        let shrink = self.policy.shrink_policy().should_shrink(
            self.n as u64,
            self.min_n as u64,
            self.size as u64,
            self.max_fill as u64,
        );
        if shrink {
            self.rehash(self.n / 2);
        }
    }

    /// Moves every entry into freshly allocated arrays of `new_n` slots.
    fn rehash(&mut self, new_n: usize) {
        debug_assert!(new_n.is_power_of_two());
        let mask = new_n - 1;
        let mut keys = vec![K::NULL; new_n].into_boxed_slice();
        let mut values = empty_values::<V>(new_n);

        for (key, value) in self.keys.iter().zip(self.values.iter_mut()) {
            if key.is_null() {
                continue;
            }
            let mut pos = hash::mix(key.key_bits()) as usize & mask;
            while !keys[pos].is_null() {
                pos = (pos + 1) & mask;
            }
            keys[pos] = *key;
            values[pos] = value.take();
        }

        #[cfg(feature = "logging")]
        log::debug!(
            "Rehashed an OpenHashMap of {} entries from {} to {} slots",
            self.size,
            self.n,
            new_n
        );

        self.keys = keys;
        self.values = values;
        self.n = new_n;
        self.mask = mask;
        self.max_fill = hash::fill_threshold(new_n as u64, self.policy.load_factor()) as usize;
        self.generation.bump();
    }
}

impl<K: PrimitiveKey, V> OpenHashMap<K, V> {
    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots of the table.
    pub fn capacity(&self) -> usize {
        self.n
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
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(
            self.null_value.as_ref(),
            &self.keys,
            &self.values,
            self.size,
        )
    }

    /// Returns an iterator over the entries, with mutable references to the
    /// values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(
            self.null_value.as_mut(),
            &self.keys,
            &mut self.values,
            self.size,
        )
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    // A slot is `None` for the null key and `Some(pos)` for a table position.

    #[inline]
    pub(crate) fn ideal_slot(&self, key: K) -> usize {
        hash::mix(key.key_bits()) as usize & self.mask
    }

    pub(crate) fn find_slot(&self, key: K) -> Option<Option<usize>> {
        if key.is_null() {
            return self.contains_null_key.then_some(None);
        }
        let mut pos = self.ideal_slot(key);
        loop {
            let curr = self.keys[pos];
            if curr.is_null() {
                return None;
            }
            if curr.same_key(key) {
                return Some(Some(pos));
            }
            pos = (pos + 1) & self.mask;
        }
    }

    /// Returns `Ok(slot)` if the key is present, or `Err(slot)` with the free
    /// slot where it belongs.
    fn find_insert_slot(&self, key: K) -> Result<Option<usize>, Option<usize>> {
        if key.is_null() {
            return if self.contains_null_key {
                Ok(None)
            } else {
                Err(None)
            };
        }
        let mut pos = self.ideal_slot(key);
        loop {
            let curr = self.keys[pos];
            if curr.is_null() {
                return Err(Some(pos));
            }
            if curr.same_key(key) {
                return Ok(Some(pos));
            }
            pos = (pos + 1) & self.mask;
        }
    }

    #[inline]
    pub(crate) fn key_at(&self, slot: Option<usize>) -> K {
        slot.map_or(K::NULL, |pos| self.keys[pos])
    }

    // The value of an occupied slot is always `Some`.

    #[inline]
    pub(crate) fn value_at(&self, slot: Option<usize>) -> Option<&V> {
        match slot {
            None => self.null_value.as_ref(),
            Some(pos) => self.values[pos].as_ref(),
        }
    }

    #[inline]
    pub(crate) fn value_at_mut(&mut self, slot: Option<usize>) -> Option<&mut V> {
        self.value_slot_mut(slot).as_mut()
    }

    #[inline]
    fn value_slot_mut(&mut self, slot: Option<usize>) -> &mut Option<V> {
        match slot {
            None => &mut self.null_value,
            Some(pos) => &mut self.values[pos],
        }
    }
}

fn empty_values<V>(n: usize) -> Box<[Option<V>]> {
    std::iter::repeat_with(|| None)
        .take(n)
        .collect::<Vec<_>>()
        .into_boxed_slice()
}

impl<K: PrimitiveKey, V> Extend<(K, V)> for OpenHashMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        // With a low load factor the table is roomy already, so only make sure
        // the incoming entries alone fit.
        let expected = if self.policy.load_factor() <= 0.5 {
            lower
        } else {
            self.size.saturating_add(lower)
        };
        if let Some(needed) =
            hash::checked_flat_table_size_for(expected as u64, self.policy.load_factor())
        {
            if needed > self.n {
                self.rehash(needed);
            }
        }
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: PrimitiveKey, V> FromIterator<(K, V)> for OpenHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K: PrimitiveKey, V> IntoIterator for &'a OpenHashMap<K, V> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: PrimitiveKey, V> IntoIterator for &'a mut OpenHashMap<K, V> {
    type Item = (K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K: PrimitiveKey, V: fmt::Debug> fmt::Debug for OpenHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
