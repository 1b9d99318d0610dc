use crate::common::key::PrimitiveKey;

use std::{
    iter::{Rev, Zip},
    slice,
};

// A free slot holds no value.
type Segments<'i, K, V> =
    Rev<Zip<slice::Iter<'i, Box<[K]>>, slice::Iter<'i, Box<[Option<V>]>>>>;
type Slots<'i, K, V> = Rev<Zip<slice::Iter<'i, K>, slice::Iter<'i, Option<V>>>>;

type SegmentsMut<'i, K, V> =
    Rev<Zip<slice::Iter<'i, Box<[K]>>, slice::IterMut<'i, Box<[Option<V>]>>>>;
type SlotsMut<'i, K, V> = Rev<Zip<slice::Iter<'i, K>, slice::IterMut<'i, Option<V>>>>;

/// An iterator over the entries of a [`BigOpenHashMap`][map].
///
/// Yields the null key first, if present, then the table from the highest slot
/// of the last segment down.
///
/// [map]: ./struct.BigOpenHashMap.html
pub struct BigIter<'i, K, V> {
    null_entry: Option<&'i V>,
    segments: Segments<'i, K, V>,
    slots: Slots<'i, K, V>,
    remaining: u64,
}

impl<'i, K, V> BigIter<'i, K, V> {
    pub(crate) fn new(
        null_entry: Option<&'i V>,
        keys: &'i [Box<[K]>],
        values: &'i [Box<[Option<V>]>],
        len: u64,
    ) -> Self {
        Self {
            null_entry,
            segments: keys.iter().zip(values.iter()).rev(),
            slots: <&[K]>::default()
                .iter()
                .zip(<&[Option<V>]>::default())
                .rev(),
            remaining: len,
        }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for BigIter<'i, K, V> {
    type Item = (K, &'i V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if let Some(value) = self.null_entry.take() {
            return Some((K::NULL, value));
        }
        loop {
            let entry = self
                .slots
                .by_ref()
                .find_map(|(k, v)| v.as_ref().map(|v| (*k, v)));
            if entry.is_some() {
                return entry;
            }
            let (keys, values) = self.segments.next()?;
            self.slots = keys.iter().zip(values.iter()).rev();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, usize::try_from(self.remaining).ok())
    }
}

/// An iterator over the entries of a [`BigOpenHashMap`][map], with mutable
/// references to the values.
///
/// [map]: ./struct.BigOpenHashMap.html
pub struct BigIterMut<'i, K, V> {
    null_entry: Option<&'i mut V>,
    segments: SegmentsMut<'i, K, V>,
    slots: SlotsMut<'i, K, V>,
    remaining: u64,
}

impl<'i, K, V> BigIterMut<'i, K, V> {
    pub(crate) fn new(
        null_entry: Option<&'i mut V>,
        keys: &'i [Box<[K]>],
        values: &'i mut [Box<[Option<V>]>],
        len: u64,
    ) -> Self {
        Self {
            null_entry,
            segments: keys.iter().zip(values.iter_mut()).rev(),
            slots: <&[K]>::default()
                .iter()
                .zip(<&mut [Option<V>]>::default())
                .rev(),
            remaining: len,
        }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for BigIterMut<'i, K, V> {
    type Item = (K, &'i mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if let Some(value) = self.null_entry.take() {
            return Some((K::NULL, value));
        }
        loop {
            let entry = self
                .slots
                .by_ref()
                .find_map(|(k, v)| v.as_mut().map(|v| (*k, v)));
            if entry.is_some() {
                return entry;
            }
            let (keys, values) = self.segments.next()?;
            self.slots = keys.iter().zip(values.iter_mut()).rev();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, usize::try_from(self.remaining).ok())
    }
}

/// An iterator over the keys of a [`BigOpenHashMap`][map].
///
/// [map]: ./struct.BigOpenHashMap.html
pub struct BigKeys<'i, K, V> {
    inner: BigIter<'i, K, V>,
}

impl<'i, K, V> BigKeys<'i, K, V> {
    pub(crate) fn new(inner: BigIter<'i, K, V>) -> Self {
        Self { inner }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for BigKeys<'i, K, V> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the values of a [`BigOpenHashMap`][map].
///
/// [map]: ./struct.BigOpenHashMap.html
pub struct BigValues<'i, K, V> {
    inner: BigIter<'i, K, V>,
}

impl<'i, K, V> BigValues<'i, K, V> {
    pub(crate) fn new(inner: BigIter<'i, K, V>) -> Self {
        Self { inner }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for BigValues<'i, K, V> {
    type Item = &'i V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over mutable references to the values of a
/// [`BigOpenHashMap`][map].
///
/// [map]: ./struct.BigOpenHashMap.html
pub struct BigValuesMut<'i, K, V> {
    inner: BigIterMut<'i, K, V>,
}

impl<'i, K, V> BigValuesMut<'i, K, V> {
    pub(crate) fn new(inner: BigIterMut<'i, K, V>) -> Self {
        Self { inner }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for BigValuesMut<'i, K, V> {
    type Item = &'i mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
