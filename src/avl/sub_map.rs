//! Range views over an `AvlTreeMap`.
//!
//! A view holds the backing map and a half-open key range `[from, to)`. A
//! missing bound means the view is unbounded on that side. Every operation is
//! answered by the backing tree and filtered by the bounds.

use super::{
    iter::{Iter, Keys, Values},
    node::NodeId,
    AvlTreeMap,
};
use crate::common::{error::RangeError, key::PrimitiveKey};

use std::{cmp::Ordering, fmt};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Bounds<K> {
    from: Option<K>,
    to: Option<K>,
}

impl<K: PrimitiveKey> Bounds<K> {
    pub(crate) fn new(from: Option<K>, to: Option<K>) -> Self {
        Self { from, to }
    }

    fn too_low<V>(&self, map: &AvlTreeMap<K, V>, key: K) -> bool {
        matches!(self.from, Some(from) if map.compare(key, from) == Ordering::Less)
    }

    fn too_high<V>(&self, map: &AvlTreeMap<K, V>, key: K) -> bool {
        matches!(self.to, Some(to) if map.compare(key, to) != Ordering::Less)
    }

    fn contains<V>(&self, map: &AvlTreeMap<K, V>, key: K) -> bool {
        !self.too_low(map, key) && !self.too_high(map, key)
    }

    /// Returns whether `key` may be a bound of a view nested in this one. The
    /// upper bound is exclusive, so it is itself a valid bound.
    fn admits_bound<V>(&self, map: &AvlTreeMap<K, V>, key: K) -> bool {
        !self.too_low(map, key)
            && !matches!(self.to, Some(to) if map.compare(key, to) == Ordering::Greater)
    }

    /// Creates the bounds of a view nested in this one. A missing bound is
    /// inherited.
    fn nested<V>(
        &self,
        map: &AvlTreeMap<K, V>,
        from: Option<K>,
        to: Option<K>,
    ) -> Result<Self, RangeError> {
        if let (Some(from), Some(to)) = (from, to) {
            if map.compare(from, to) == Ordering::Greater {
                return Err(RangeError::InvalidRange);
            }
        }
        let within = |bound: Option<K>| bound.map_or(true, |k| self.admits_bound(map, k));
        if !within(from) || !within(to) {
            return Err(RangeError::BoundsOutsideView);
        }
        Ok(Self {
            from: from.or(self.from),
            to: to.or(self.to),
        })
    }

    /// Returns the node with the smallest key in range.
    fn first<V>(&self, map: &AvlTreeMap<K, V>) -> Option<NodeId> {
        let id = match self.from {
            None => map.first?,
            Some(from) => {
                let id = map.locate(from)?;
                if map.compare(map.nodes[id].key, from) == Ordering::Less {
                    map.successor(id)?
                } else {
                    id
                }
            }
        };
        (!self.too_high(map, map.nodes[id].key)).then_some(id)
    }

    /// Returns the node with the largest key in range.
    fn last<V>(&self, map: &AvlTreeMap<K, V>) -> Option<NodeId> {
        let id = match self.to {
            None => map.last?,
            Some(to) => {
                let id = map.locate(to)?;
                if map.compare(map.nodes[id].key, to) == Ordering::Less {
                    id
                } else {
                    map.predecessor(id)?
                }
            }
        };
        (!self.too_low(map, map.nodes[id].key)).then_some(id)
    }

    fn len<V>(&self, map: &AvlTreeMap<K, V>) -> usize {
        let (Some(mut id), Some(last)) = (self.first(map), self.last(map)) else {
            return 0;
        };
        let mut len = 1;
        while id != last {
            match map.successor(id) {
                Some(next) => id = next,
                None => break,
            }
            len += 1;
        }
        len
    }

    fn iter<'a, V>(&self, map: &'a AvlTreeMap<K, V>) -> Iter<'a, K, V> {
        Iter::new(&map.nodes, self.first(map), self.last(map), self.len(map))
    }

    fn get<'a, V>(&self, map: &'a AvlTreeMap<K, V>, key: K) -> Option<&'a V> {
        if self.contains(map, key) {
            map.get(key)
        } else {
            None
        }
    }
}

/// A read-only view of the entries of an [`AvlTreeMap`][map] whose keys lie
/// within a range.
///
/// Created by [`AvlTreeMap::head_map`][head-map] and its siblings.
///
/// [map]: ./struct.AvlTreeMap.html
/// [head-map]: ./struct.AvlTreeMap.html#method.head_map
pub struct SubMap<'a, K, V> {
    map: &'a AvlTreeMap<K, V>,
    bounds: Bounds<K>,
}

impl<'a, K: PrimitiveKey, V> SubMap<'a, K, V> {
    pub(crate) fn new(map: &'a AvlTreeMap<K, V>, bounds: Bounds<K>) -> Self {
        Self { map, bounds }
    }

    /// Returns the value of `key`, if the key is in the view.
    pub fn get(&self, key: K) -> Option<&'a V> {
        self.bounds.get(self.map, key)
    }

    /// Returns `true` if `key` is in the view and present in the map.
    pub fn contains_key(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of entries in the view.
    ///
    /// This walks the entries, so it takes time linear in the result.
    pub fn len(&self) -> usize {
        self.bounds.len(self.map)
    }

    /// Returns `true` if the view contains no entries.
    pub fn is_empty(&self) -> bool {
        self.bounds.first(self.map).is_none()
    }

    /// Returns the smallest key of the view.
    pub fn first_key(&self) -> Option<K> {
        self.bounds.first(self.map).map(|id| self.map.nodes[id].key)
    }

    /// Returns the largest key of the view.
    pub fn last_key(&self) -> Option<K> {
        self.bounds.last(self.map).map(|id| self.map.nodes[id].key)
    }

    /// Returns an iterator over the entries of the view, in ascending key
    /// order.
    pub fn iter(&self) -> Iter<'a, K, V> {
        self.bounds.iter(self.map)
    }

    /// Returns an iterator over the keys of the view, in ascending order.
    pub fn keys(&self) -> Keys<'a, K, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over the values of the view, in ascending key
    /// order.
    pub fn values(&self) -> Values<'a, K, V> {
        Values::new(self.iter())
    }

    /// Returns a view of the entries of this view whose keys are less than
    /// `to`.
    ///
    /// Fails with `RangeError::BoundsOutsideView` if `to` is outside of this
    /// view.
    pub fn head_map(&self, to: K) -> Result<SubMap<'a, K, V>, RangeError> {
        let bounds = self.bounds.nested(self.map, None, Some(to))?;
        Ok(SubMap::new(self.map, bounds))
    }

    /// Returns a view of the entries of this view whose keys are greater than
    /// or equal to `from`.
    pub fn tail_map(&self, from: K) -> Result<SubMap<'a, K, V>, RangeError> {
        let bounds = self.bounds.nested(self.map, Some(from), None)?;
        Ok(SubMap::new(self.map, bounds))
    }

    /// Returns a view of the entries of this view whose keys are within
    /// `[from, to)`.
    pub fn sub_map(&self, from: K, to: K) -> Result<SubMap<'a, K, V>, RangeError> {
        let bounds = self.bounds.nested(self.map, Some(from), Some(to))?;
        Ok(SubMap::new(self.map, bounds))
    }
}

impl<'a, K: PrimitiveKey, V> IntoIterator for &SubMap<'a, K, V> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K: PrimitiveKey, V: fmt::Debug> fmt::Debug for SubMap<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// A view of the entries of an [`AvlTreeMap`][map] whose keys lie within a
/// range, through which the map can be modified.
///
/// Created by [`AvlTreeMap::head_map_mut`][head-map-mut] and its siblings.
/// Insertions of keys outside of the range are rejected.
///
/// # Examples
///
/// ```rust
/// use primcoll::{AvlTreeMap, RangeError};
///
/// let mut map: AvlTreeMap<i32, &str> = AvlTreeMap::new();
/// let mut view = map.sub_map_mut(10, 20).unwrap();
/// assert_eq!(view.insert(15, "in"), Ok(None));
/// assert_eq!(view.insert(20, "out"), Err(RangeError::KeyOutOfRange));
/// assert_eq!(map.len(), 1);
/// ```
///
/// [map]: ./struct.AvlTreeMap.html
/// [head-map-mut]: ./struct.AvlTreeMap.html#method.head_map_mut
pub struct SubMapMut<'a, K, V> {
    map: &'a mut AvlTreeMap<K, V>,
    bounds: Bounds<K>,
}

impl<'a, K: PrimitiveKey, V> SubMapMut<'a, K, V> {
    pub(crate) fn new(map: &'a mut AvlTreeMap<K, V>, bounds: Bounds<K>) -> Self {
        Self { map, bounds }
    }

    /// Returns a read-only view with the same bounds.
    pub fn as_view(&self) -> SubMap<'_, K, V> {
        SubMap::new(self.map, self.bounds)
    }

    /// Returns the value of `key`, if the key is in the view.
    pub fn get(&self, key: K) -> Option<&V> {
        self.bounds.get(self.map, key)
    }

    /// Returns a mutable reference to the value of `key`, if the key is in
    /// the view.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        if self.bounds.contains(self.map, key) {
            self.map.get_mut(key)
        } else {
            None
        }
    }

    /// Returns `true` if `key` is in the view and present in the map.
    pub fn contains_key(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of entries in the view, by walking them.
    pub fn len(&self) -> usize {
        self.bounds.len(self.map)
    }

    /// Returns `true` if the view contains no entries.
    pub fn is_empty(&self) -> bool {
        self.bounds.first(self.map).is_none()
    }

    /// Returns the smallest key of the view.
    pub fn first_key(&self) -> Option<K> {
        self.as_view().first_key()
    }

    /// Returns the largest key of the view.
    pub fn last_key(&self) -> Option<K> {
        self.as_view().last_key()
    }

    /// Returns an iterator over the entries of the view, in ascending key
    /// order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.bounds.iter(self.map)
    }

    /// Returns an iterator over the keys of the view, in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over the values of the view, in ascending key
    /// order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Inserts a key-value pair into the backing map, returning the previous
    /// value of the key, if any.
    ///
    /// Fails with `RangeError::KeyOutOfRange`, leaving the map untouched, if
    /// the key is outside of the view.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, RangeError> {
        if self.bounds.contains(self.map, key) {
            Ok(self.map.insert(key, value))
        } else {
            Err(RangeError::KeyOutOfRange)
        }
    }

    /// Returns a modifiable view of the entries of this view whose keys are
    /// less than `to`.
    pub fn head_map_mut(&mut self, to: K) -> Result<SubMapMut<'_, K, V>, RangeError> {
        let bounds = self.bounds.nested(self.map, None, Some(to))?;
        Ok(SubMapMut::new(self.map, bounds))
    }

    /// Returns a modifiable view of the entries of this view whose keys are
    /// greater than or equal to `from`.
    pub fn tail_map_mut(&mut self, from: K) -> Result<SubMapMut<'_, K, V>, RangeError> {
        let bounds = self.bounds.nested(self.map, Some(from), None)?;
        Ok(SubMapMut::new(self.map, bounds))
    }

    /// Returns a modifiable view of the entries of this view whose keys are
    /// within `[from, to)`.
    pub fn sub_map_mut(&mut self, from: K, to: K) -> Result<SubMapMut<'_, K, V>, RangeError> {
        let bounds = self.bounds.nested(self.map, Some(from), Some(to))?;
        Ok(SubMapMut::new(self.map, bounds))
    }

    /// Removes a key from the backing map, returning its value. Keys outside
    /// of the view are not removed.
    pub fn remove(&mut self, key: K) -> Option<V> {
        if self.bounds.contains(self.map, key) {
            self.map.remove(key)
        } else {
            None
        }
    }

    /// Removes every entry of the view from the backing map.
    pub fn clear(&mut self) {
        let Some(last) = self.bounds.last(self.map) else {
            return;
        };
        // Removal splices nodes out without moving the others, so the ids
        // taken before a removal stay valid.
        let mut next = self.bounds.first(self.map);
        while let Some(id) = next {
            next = if id == last {
                None
            } else {
                self.map.successor(id)
            };
            let key = self.map.nodes[id].key;
            self.map.remove_entry(key);
        }
    }
}

impl<'a, K: PrimitiveKey, V: fmt::Debug> fmt::Debug for SubMapMut<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{AvlTreeMap, RangeError};

    fn odd_keys() -> AvlTreeMap<i32, i32> {
        (0..50).map(|i| (2 * i + 1, i)).collect()
    }

    #[test]
    fn view_bounds_are_half_open() {
        let map = odd_keys();
        let view = map.sub_map(11, 21).unwrap();
        assert_eq!(view.keys().collect::<Vec<_>>(), vec![11, 13, 15, 17, 19]);
        assert_eq!(view.len(), 5);
        assert_eq!(view.first_key(), Some(11));
        assert_eq!(view.last_key(), Some(19));
        assert!(view.contains_key(11));
        assert!(!view.contains_key(21));
        assert_eq!(view.get(21), None);
        assert_eq!(map.get(21), Some(&10));

        // Bounds between keys.
        let view = map.sub_map(10, 20).unwrap();
        assert_eq!(view.keys().collect::<Vec<_>>(), vec![11, 13, 15, 17, 19]);
        assert_eq!(view.keys().rev().next(), Some(19));
    }

    #[test]
    fn head_and_tail_views() {
        let map = odd_keys();
        assert_eq!(map.head_map(5).keys().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(map.head_map(1).len(), 0);
        assert!(map.head_map(0).is_empty());
        assert_eq!(map.tail_map(96).keys().collect::<Vec<_>>(), vec![97, 99]);
        assert_eq!(map.tail_map(99).len(), 1);
        assert!(map.tail_map(100).is_empty());
        assert_eq!(map.tail_map(-5).len(), 50);
        assert_eq!(map.head_map(1000).last_key(), Some(99));
    }

    #[test]
    fn empty_ranges() {
        let map = odd_keys();
        let view = map.sub_map(12, 12).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.first_key(), None);
        assert_eq!(view.iter().next(), None);
        // No key between the bounds.
        assert!(map.sub_map(12, 13).unwrap().is_empty());
        assert_eq!(map.sub_map(5, 3).err(), Some(RangeError::InvalidRange));

        let empty = AvlTreeMap::<u8, ()>::new();
        assert!(empty.tail_map(3).is_empty());
        assert_eq!(empty.head_map(3).last_key(), None);
    }

    #[test]
    fn nested_views() {
        let map = odd_keys();
        let view = map.sub_map(10, 40).unwrap();
        let inner = view.sub_map(20, 30).unwrap();
        assert_eq!(inner.keys().collect::<Vec<_>>(), vec![21, 23, 25, 27, 29]);
        let inner = view.head_map(40).unwrap().tail_map(35).unwrap();
        assert_eq!(inner.keys().collect::<Vec<_>>(), vec![35, 37, 39]);
        let tail = map.tail_map(90);
        assert_eq!(tail.head_map(95).unwrap().len(), 2);

        assert_eq!(view.head_map(41).err(), Some(RangeError::BoundsOutsideView));
        assert_eq!(view.tail_map(9).err(), Some(RangeError::BoundsOutsideView));
        assert_eq!(view.sub_map(30, 20).err(), Some(RangeError::InvalidRange));
        assert_eq!(tail.head_map(80).err(), Some(RangeError::BoundsOutsideView));
    }

    #[test]
    fn mutable_views() {
        let mut map = odd_keys();
        {
            let mut view = map.head_map_mut(10);
            assert_eq!(view.insert(4, -4), Ok(None));
            assert_eq!(view.insert(3, -3), Ok(Some(1)));
            assert_eq!(view.insert(10, 0), Err(RangeError::KeyOutOfRange));
            assert_eq!(view.remove(11), None);
            assert_eq!(view.remove(1), Some(0));
            *view.get_mut(5).unwrap() += 100;
            assert!(view.get_mut(11).is_none());
            assert_eq!(view.keys().collect::<Vec<_>>(), vec![3, 4, 5, 7, 9]);
        }
        map.assert_invariants();
        assert_eq!(map.get(5), Some(&102));
        assert_eq!(map.get(11), Some(&5));
        assert!(!map.contains_key(10));
        assert_eq!(map.len(), 50);
    }

    #[test]
    fn clearing_a_view() {
        let mut map = odd_keys();
        map.sub_map_mut(20, 60).unwrap().clear();
        map.assert_invariants();
        assert_eq!(map.len(), 30);
        assert_eq!(map.sub_map(20, 60).unwrap().len(), 0);
        assert!(map.contains_key(19));
        assert!(map.contains_key(61));

        map.tail_map_mut(0).clear();
        assert!(map.is_empty());
        map.assert_invariants();
    }

    #[test]
    fn nested_mutable_views() {
        let mut map = odd_keys();
        let mut view = map.tail_map_mut(50);
        let mut inner = view.sub_map_mut(60, 70).unwrap();
        assert_eq!(inner.insert(62, 0), Ok(None));
        assert_eq!(inner.insert(70, 0), Err(RangeError::KeyOutOfRange));
        inner.clear();
        assert_eq!(view.as_view().first_key(), Some(51));
        assert!(view.sub_map_mut(40, 60).is_err());
        assert_eq!(view.len(), 20);
        assert_eq!(map.len(), 45);
    }
}
