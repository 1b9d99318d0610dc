use super::node::{self, Node, NodeId};
use crate::common::key::PrimitiveKey;

use std::iter::FusedIterator;

/// An iterator over the entries of an [`AvlTreeMap`][map] or of one of its
/// views, in ascending key order.
///
/// The iterator follows the threads of the tree, so each step takes amortized
/// constant time and no extra memory. It can also be walked from the back.
///
/// [map]: ./struct.AvlTreeMap.html
pub struct Iter<'i, K, V> {
    nodes: &'i [Node<K, V>],
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'i, K, V> Iter<'i, K, V> {
    pub(crate) fn new(
        nodes: &'i [Node<K, V>],
        front: Option<NodeId>,
        back: Option<NodeId>,
        len: usize,
    ) -> Self {
        Self {
            nodes,
            front,
            back,
            remaining: len,
        }
    }
}

impl<'i, K, V> Clone for Iter<'i, K, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'i, K: PrimitiveKey, V> Iterator for Iter<'i, K, V> {
    type Item = (K, &'i V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.remaining -= 1;
        self.front = node::successor(self.nodes, id);
        let node = &self.nodes[id];
        Some((node.key, node.value.as_ref()?))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'i, K: PrimitiveKey, V> DoubleEndedIterator for Iter<'i, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.remaining -= 1;
        self.back = node::predecessor(self.nodes, id);
        let node = &self.nodes[id];
        Some((node.key, node.value.as_ref()?))
    }
}

impl<'i, K: PrimitiveKey, V> ExactSizeIterator for Iter<'i, K, V> {}

impl<'i, K: PrimitiveKey, V> FusedIterator for Iter<'i, K, V> {}

/// An iterator over the keys of an [`AvlTreeMap`][map], in ascending order.
///
/// [map]: ./struct.AvlTreeMap.html
#[derive(Clone)]
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

impl<'i, K: PrimitiveKey, V> DoubleEndedIterator for Keys<'i, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<'i, K: PrimitiveKey, V> ExactSizeIterator for Keys<'i, K, V> {}

/// An iterator over the values of an [`AvlTreeMap`][map], in ascending key
/// order.
///
/// [map]: ./struct.AvlTreeMap.html
#[derive(Clone)]
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

impl<'i, K: PrimitiveKey, V> DoubleEndedIterator for Values<'i, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<'i, K: PrimitiveKey, V> ExactSizeIterator for Values<'i, K, V> {}

#[cfg(test)]
mod tests {
    use crate::AvlTreeMap;

    #[test]
    fn iterates_from_both_ends() {
        let map: AvlTreeMap<i32, i32> = (1..=9).map(|i| (i, i * 100)).collect();
        let mut iter = map.iter();
        assert_eq!(iter.len(), 9);
        assert_eq!(iter.next(), Some((1, &100)));
        assert_eq!(iter.next_back(), Some((9, &900)));
        assert_eq!(iter.next_back(), Some((8, &800)));
        assert_eq!(iter.len(), 6);

        let rest: Vec<_> = iter.clone().map(|(k, _)| k).collect();
        assert_eq!(rest, vec![2, 3, 4, 5, 6, 7]);
        let rest: Vec<_> = iter.rev().map(|(k, _)| k).collect();
        assert_eq!(rest, vec![7, 6, 5, 4, 3, 2]);

        assert_eq!(map.keys().rev().next(), Some(9));
        assert_eq!(map.values().sum::<i32>(), 4500);
    }

    #[test]
    fn front_and_back_meet() {
        let map: AvlTreeMap<u8, ()> = (0..5).map(|i| (i, ())).collect();
        let mut keys = map.keys();
        let mut seen = Vec::new();
        while let Some(k) = keys.next() {
            seen.push(k);
            if let Some(k) = keys.next_back() {
                seen.push(k);
            }
        }
        assert_eq!(seen, vec![0, 4, 1, 3, 2]);
        assert_eq!(keys.next(), None);
        assert_eq!(keys.next_back(), None);
    }
}
