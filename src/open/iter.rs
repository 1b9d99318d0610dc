use crate::common::key::PrimitiveKey;

use std::{
    iter::{Rev, Zip},
    slice,
};

// A free slot holds no value.
type Slots<'i, K, V> = Rev<Zip<slice::Iter<'i, K>, slice::Iter<'i, Option<V>>>>;
type SlotsMut<'i, K, V> = Rev<Zip<slice::Iter<'i, K>, slice::IterMut<'i, Option<V>>>>;

/// An iterator over the entries of an [`OpenHashMap`][map].
///
/// Yields the null key first, if present, then the table from the highest slot
/// down.
///
/// [map]: ./struct.OpenHashMap.html
pub struct Iter<'i, K, V> {
    null_entry: Option<&'i V>,
    slots: Slots<'i, K, V>,
    remaining: usize,
}

impl<'i, K, V> Iter<'i, K, V> {
    pub(crate) fn new(
        null_entry: Option<&'i V>,
        keys: &'i [K],
        values: &'i [Option<V>],
        len: usize,
    ) -> Self {
        Self {
            null_entry,
            slots: keys.iter().zip(values.iter()).rev(),
            remaining: len,
        }
    }
}

impl<'i, K, V> Clone for Iter<'i, K, V> {
    fn clone(&self) -> Self {
        Self {
            null_entry: self.null_entry,
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for Iter<'i, K, V> {
    type Item = (K, &'i V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if let Some(value) = self.null_entry.take() {
            return Some((K::NULL, value));
        }
        self.slots
            .by_ref()
            .find_map(|(k, v)| v.as_ref().map(|v| (*k, v)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'i, K: PrimitiveKey, V> ExactSizeIterator for Iter<'i, K, V> {}

/// An iterator over the entries of an [`OpenHashMap`][map], with mutable
/// references to the values.
///
/// [map]: ./struct.OpenHashMap.html
pub struct IterMut<'i, K, V> {
    null_entry: Option<&'i mut V>,
    slots: SlotsMut<'i, K, V>,
    remaining: usize,
}

impl<'i, K, V> IterMut<'i, K, V> {
    pub(crate) fn new(
        null_entry: Option<&'i mut V>,
        keys: &'i [K],
        values: &'i mut [Option<V>],
        len: usize,
    ) -> Self {
        Self {
            null_entry,
            slots: keys.iter().zip(values.iter_mut()).rev(),
            remaining: len,
        }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for IterMut<'i, K, V> {
    type Item = (K, &'i mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if let Some(value) = self.null_entry.take() {
            return Some((K::NULL, value));
        }
        self.slots
            .by_ref()
            .find_map(|(k, v)| v.as_mut().map(|v| (*k, v)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'i, K: PrimitiveKey, V> ExactSizeIterator for IterMut<'i, K, V> {}

/// An iterator over the keys of an [`OpenHashMap`][map].
///
/// [map]: ./struct.OpenHashMap.html
pub struct Keys<'i, K, V> {
    inner: Iter<'i, K, V>,
}

impl<'i, K, V> Keys<'i, K, V> {
    pub(crate) fn new(inner: Iter<'i, K, V>) -> Self {
        Self { inner }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for Keys<'i, K, V> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'i, K: PrimitiveKey, V> ExactSizeIterator for Keys<'i, K, V> {}

/// An iterator over the values of an [`OpenHashMap`][map].
///
/// [map]: ./struct.OpenHashMap.html
pub struct Values<'i, K, V> {
    inner: Iter<'i, K, V>,
}

impl<'i, K, V> Values<'i, K, V> {
    pub(crate) fn new(inner: Iter<'i, K, V>) -> Self {
        Self { inner }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for Values<'i, K, V> {
    type Item = &'i V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'i, K: PrimitiveKey, V> ExactSizeIterator for Values<'i, K, V> {}

/// An iterator over mutable references to the values of an
/// [`OpenHashMap`][map].
///
/// [map]: ./struct.OpenHashMap.html
pub struct ValuesMut<'i, K, V> {
    inner: IterMut<'i, K, V>,
}

impl<'i, K, V> ValuesMut<'i, K, V> {
    pub(crate) fn new(inner: IterMut<'i, K, V>) -> Self {
        Self { inner }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for ValuesMut<'i, K, V> {
    type Item = &'i mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'i, K: PrimitiveKey, V> ExactSizeIterator for ValuesMut<'i, K, V> {}

#[cfg(test)]
mod tests {
    use crate::OpenHashMap;

    #[test]
    fn null_key_comes_first() {
        let mut map = OpenHashMap::new();
        for k in [3i32, 0, -7, 12] {
            map.insert(k, k * 10);
        }
        let mut iter = map.iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some((0, &0)));
        let mut rest: Vec<_> = iter.map(|(k, v)| (k, *v)).collect();
        rest.sort_unstable();
        assert_eq!(rest, vec![(-7, -70), (3, 30), (12, 120)]);
    }

    #[test]
    fn mutable_iteration() {
        let mut map: OpenHashMap<u64, u64> = (0..50).map(|i| (i, i)).collect();
        for (k, v) in map.iter_mut() {
            *v += k;
        }
        for v in map.values_mut() {
            *v += 1;
        }
        assert!(map.iter().all(|(k, v)| *v == 2 * k + 1));
        assert_eq!(map.keys().len(), 50);
        assert_eq!(map.values().copied().sum::<u64>(), 2 * (0..50).sum::<u64>() + 50);
    }
}
