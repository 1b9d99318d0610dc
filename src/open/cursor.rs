use super::OpenHashMap;
use crate::common::{error::CursorError, key::PrimitiveKey};

use smallvec::SmallVec;
use std::mem;

// What the last call to `advance` returned, so that `remove` can find it.
#[derive(Clone, Copy, Debug)]
enum Last<K> {
    None,
    Null,
    Slot(usize),
    Wrapped(K),
}

/// A cursor over the entries of an [`OpenHashMap`][map] that can remove the
/// entry it last returned.
///
/// The cursor does not borrow the map. Instead, every call takes the map as an
/// argument, and fails with [`CursorError::ConcurrentModification`][cme] if the
/// map was structurally modified by anything but this cursor since the cursor
/// was created.
///
/// Removing through a cursor never shrinks the table, and every entry present
/// when the cursor was created and not removed is returned exactly once.
///
/// # Examples
///
/// ```rust
/// use primcoll::OpenHashMap;
///
/// let mut map: OpenHashMap<u32, u32> = (0..100).map(|i| (i, i * i)).collect();
/// let mut cursor = map.cursor();
/// while let Some(key) = cursor.next(&map).unwrap() {
///     if key % 10 != 0 {
///         cursor.remove(&mut map).unwrap();
///     }
/// }
/// assert_eq!(map.len(), 10);
/// ```
///
/// [map]: ./struct.OpenHashMap.html
/// [cme]: ./enum.CursorError.html#variant.ConcurrentModification
#[derive(Clone, Debug)]
pub struct Cursor<K> {
    // The table is scanned downwards; the next slot to look at is `pos - 1`.
    pos: usize,
    last: Last<K>,
    remaining: usize,
    must_return_null_key: bool,
    // Keys moved by a backward shift from the unscanned part of the table to
    // the scanned part. They are returned, by lookup, once the scan is done.
    wrapped: SmallVec<[K; 4]>,
    generation: u64,
}

impl<K: PrimitiveKey> Cursor<K> {
    pub(crate) fn new<V>(map: &OpenHashMap<K, V>) -> Self {
        Self {
            pos: map.n,
            last: Last::None,
            remaining: map.size,
            must_return_null_key: map.contains_null_key,
            wrapped: SmallVec::new(),
            generation: map.generation.stamp(),
        }
    }

    /// Returns the next key, or `None` when every entry has been returned.
    pub fn next<V>(&mut self, map: &OpenHashMap<K, V>) -> Result<Option<K>, CursorError> {
        Ok(self.advance(map)?.map(|slot| map.key_at(slot)))
    }

    /// Returns the next entry, or `None` when every entry has been returned.
    pub fn next_entry<'m, V>(
        &mut self,
        map: &'m OpenHashMap<K, V>,
    ) -> Result<Option<(K, &'m V)>, CursorError> {
        let Some(slot) = self.advance(map)? else {
            return Ok(None);
        };
        let value = map
            .value_at(slot)
            .ok_or(CursorError::ConcurrentModification)?;
        Ok(Some((map.key_at(slot), value)))
    }

    /// Returns the number of entries not returned yet.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Removes the entry last returned by this cursor, and returns it.
    pub fn remove<V>(
        &mut self,
        map: &mut OpenHashMap<K, V>,
    ) -> Result<(K, V), CursorError> {
        self.check(map)?;
        let entry = match mem::replace(&mut self.last, Last::None) {
            Last::None => return Err(CursorError::NoCurrentElement),
            Last::Null => map.remove_at(None, |_| ()),
            Last::Slot(pos) => {
                let wrapped = &mut self.wrapped;
                map.remove_at(Some(pos), |key| {
                    #[cfg(feature = "logging")]
                    log::trace!("Key {:?} wrapped around behind the cursor", key);
                    wrapped.push(key);
                })
            }
            Last::Wrapped(key) => {
                let slot = map
                    .find_slot(key)
                    .ok_or(CursorError::ConcurrentModification)?;
                map.remove_at(slot, |_| ())
            }
        };
        self.generation = map.generation.stamp();
        entry.ok_or(CursorError::ConcurrentModification)
    }

    /// Moves to the next entry and returns its slot: `None` for the null key,
    /// `Some(pos)` for a table position.
    pub(crate) fn advance<V>(
        &mut self,
        map: &OpenHashMap<K, V>,
    ) -> Result<Option<Option<usize>>, CursorError> {
        self.check(map)?;
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        if self.must_return_null_key {
            self.must_return_null_key = false;
            self.last = Last::Null;
            return Ok(Some(None));
        }

        while self.pos > 0 {
            self.pos -= 1;
            if !map.keys[self.pos].is_null() {
                self.last = Last::Slot(self.pos);
                return Ok(Some(Some(self.pos)));
            }
        }

        let key = self
            .wrapped
            .pop()
            .ok_or(CursorError::ConcurrentModification)?;
        let slot = map
            .find_slot(key)
            .ok_or(CursorError::ConcurrentModification)?;
        self.last = Last::Wrapped(key);
        Ok(Some(slot))
    }

    fn check<V>(&self, map: &OpenHashMap<K, V>) -> Result<(), CursorError> {
        // The position bound keeps a stale cursor from indexing past the table.
        if self.generation == map.generation.stamp() && self.pos <= map.n {
            Ok(())
        } else {
            Err(CursorError::ConcurrentModification)
        }
    }
}
