use super::{node::NodeId, AvlTreeMap};
use crate::common::{error::CursorError, key::PrimitiveKey};

/// A cursor over the entries of an [`AvlTreeMap`][map], in ascending key
/// order, that can remove the entry it last returned.
///
/// Like the cursors of the hash tables, it does not borrow the map, and fails
/// with [`CursorError::ConcurrentModification`][cme] once the map was
/// structurally modified by anything but this cursor.
///
/// # Examples
///
/// ```rust
/// use primcoll::AvlTreeMap;
///
/// let mut map: AvlTreeMap<i32, i32> = (0..10).map(|i| (i, i)).collect();
/// let mut cursor = map.cursor();
/// while let Some(key) = cursor.next(&map).unwrap() {
///     if key % 2 == 1 {
///         cursor.remove(&mut map).unwrap();
///     }
/// }
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);
/// ```
///
/// [map]: ./struct.AvlTreeMap.html
/// [cme]: ./enum.CursorError.html#variant.ConcurrentModification
#[derive(Clone, Debug)]
pub struct AvlCursor {
    next: Option<NodeId>,
    last: Option<NodeId>,
    remaining: usize,
    generation: u64,
}

impl AvlCursor {
    pub(crate) fn new<K, V>(map: &AvlTreeMap<K, V>) -> Self {
        Self {
            next: map.first,
            last: None,
            remaining: map.count,
            generation: map.generation.stamp(),
        }
    }

    /// Returns the next key, or `None` after the largest key.
    pub fn next<K: PrimitiveKey, V>(
        &mut self,
        map: &AvlTreeMap<K, V>,
    ) -> Result<Option<K>, CursorError> {
        Ok(self.advance(map)?.map(|id| map.nodes[id].key))
    }

    /// Returns the next entry, or `None` after the largest key.
    pub fn next_entry<'m, K: PrimitiveKey, V>(
        &mut self,
        map: &'m AvlTreeMap<K, V>,
    ) -> Result<Option<(K, &'m V)>, CursorError> {
        let Some(id) = self.advance(map)? else {
            return Ok(None);
        };
        map.entry(id)
            .map(Some)
            .ok_or(CursorError::ConcurrentModification)
    }

    /// Returns the number of entries not returned yet.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Removes the entry last returned by this cursor, and returns it.
    pub fn remove<K: PrimitiveKey, V>(
        &mut self,
        map: &mut AvlTreeMap<K, V>,
    ) -> Result<(K, V), CursorError> {
        self.check(map)?;
        let id = self.last.take().ok_or(CursorError::NoCurrentElement)?;
        // The next node keeps its id, since removal only relinks nodes.
        let key = map.nodes[id].key;
        let entry = map
            .remove_entry(key)
            .ok_or(CursorError::ConcurrentModification)?;
        self.generation = map.generation.stamp();
        Ok(entry)
    }

    fn advance<K: PrimitiveKey, V>(
        &mut self,
        map: &AvlTreeMap<K, V>,
    ) -> Result<Option<NodeId>, CursorError> {
        self.check(map)?;
        let Some(id) = self.next else {
            self.last = None;
            return Ok(None);
        };
        self.next = map.successor(id);
        self.last = Some(id);
        self.remaining = self.remaining.saturating_sub(1);
        Ok(Some(id))
    }

    fn check<K, V>(&self, map: &AvlTreeMap<K, V>) -> Result<(), CursorError> {
        let in_arena = |id: &NodeId| *id < map.nodes.len();
        if self.generation == map.generation.stamp()
            && self.next.iter().all(in_arena)
            && self.last.iter().all(in_arena)
        {
            Ok(())
        } else {
            Err(CursorError::ConcurrentModification)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{AvlTreeMap, CursorError};

    #[test]
    fn removes_while_walking() {
        let mut map: AvlTreeMap<u32, u32> = (0..500).map(|i| (i, i * 3)).collect();
        let mut cursor = map.cursor();
        assert_eq!(cursor.remaining(), 500);
        let mut expected = 0;
        while let Some((key, value)) = cursor.next_entry(&map).unwrap() {
            assert_eq!(key, expected);
            assert_eq!(*value, key * 3);
            expected += 1;
            if key % 5 != 0 {
                assert_eq!(cursor.remove(&mut map), Ok((key, key * 3)));
            }
        }
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(expected, 500);
        assert_eq!(map.len(), 100);
        map.assert_invariants();
        assert!(map.keys().all(|k| k % 5 == 0));
    }

    #[test]
    fn remove_needs_a_current_entry() {
        let mut map: AvlTreeMap<i8, ()> = [(1, ()), (2, ())].into_iter().collect();
        let mut cursor = map.cursor();
        assert_eq!(cursor.remove(&mut map), Err(CursorError::NoCurrentElement));
        assert_eq!(cursor.next(&map), Ok(Some(1)));
        assert_eq!(cursor.remove(&mut map), Ok((1, ())));
        assert_eq!(cursor.remove(&mut map), Err(CursorError::NoCurrentElement));
        assert_eq!(cursor.next(&map), Ok(Some(2)));
        assert_eq!(cursor.next(&map), Ok(None));
        assert_eq!(cursor.remove(&mut map), Err(CursorError::NoCurrentElement));
    }

    #[test]
    fn rejects_other_maps() {
        let mut big: AvlTreeMap<u32, u32> = (0..1000).map(|i| (i, i)).collect();
        let mut small = AvlTreeMap::new();
        small.insert(1u32, 1u32);

        // Walk far enough that the next node id does not exist in `small`.
        let mut cursor = big.cursor();
        for _ in 0..900 {
            cursor.next(&big).unwrap();
        }
        assert_eq!(cursor.next(&small), Err(CursorError::ConcurrentModification));
        assert_eq!(
            cursor.remove(&mut small),
            Err(CursorError::ConcurrentModification)
        );
        assert_eq!(small.len(), 1);

        let mut copy = big.clone();
        assert_eq!(cursor.next(&copy), Err(CursorError::ConcurrentModification));
        assert_eq!(
            cursor.remove(&mut copy),
            Err(CursorError::ConcurrentModification)
        );
        assert_eq!(cursor.remove(&mut big), Ok((899, 899)));
        assert_eq!(copy.len(), 1000);
    }

    #[test]
    fn stale_cursor_fails() {
        let mut map: AvlTreeMap<i64, i64> = (0..10).map(|i| (i, i)).collect();
        let mut cursor = map.cursor();
        assert_eq!(cursor.next(&map), Ok(Some(0)));

        // Replacing a value is not a structural modification.
        map.insert(5, 50);
        assert_eq!(cursor.next(&map), Ok(Some(1)));

        map.remove(7);
        assert_eq!(
            cursor.next(&map),
            Err(CursorError::ConcurrentModification)
        );
        assert_eq!(
            cursor.remove(&mut map),
            Err(CursorError::ConcurrentModification)
        );
    }
}
