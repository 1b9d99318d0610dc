use super::BigOpenHashMap;
use crate::common::{big_array::Pos, error::CursorError, key::PrimitiveKey};

use smallvec::SmallVec;
use std::mem;

#[derive(Clone, Copy, Debug)]
enum Last<K> {
    None,
    Null,
    Slot(Pos),
    Wrapped(K),
}

/// A cursor over the entries of a [`BigOpenHashMap`][map] that can remove the
/// entry it last returned.
///
/// Works like the flat [`Cursor`][cursor]: it does not borrow the map, fails
/// fast on outside modifications, and never shrinks the table.
///
/// [map]: ./struct.BigOpenHashMap.html
/// [cursor]: ./struct.Cursor.html
#[derive(Clone, Debug)]
pub struct BigCursor<K> {
    // Logical index; the next slot to look at is `pos - 1`.
    pos: u64,
    last: Last<K>,
    remaining: u64,
    must_return_null_key: bool,
    wrapped: SmallVec<[K; 4]>,
    generation: u64,
}

impl<K: PrimitiveKey> BigCursor<K> {
    pub(crate) fn new<V>(map: &BigOpenHashMap<K, V>) -> Self {
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
    pub fn next<V>(&mut self, map: &BigOpenHashMap<K, V>) -> Result<Option<K>, CursorError> {
        Ok(self.advance(map)?.map(|slot| map.key_at(slot)))
    }

    /// Returns the next entry, or `None` when every entry has been returned.
    pub fn next_entry<'m, V>(
        &mut self,
        map: &'m BigOpenHashMap<K, V>,
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
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Removes the entry last returned by this cursor, and returns it.
    pub fn remove<V>(
        &mut self,
        map: &mut BigOpenHashMap<K, V>,
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

    pub(crate) fn advance<V>(
        &mut self,
        map: &BigOpenHashMap<K, V>,
    ) -> Result<Option<Option<Pos>>, CursorError> {
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
            let pos = map.keys.pos(self.pos);
            if !map.keys.at(pos).is_null() {
                self.last = Last::Slot(pos);
                return Ok(Some(Some(pos)));
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

    fn check<V>(&self, map: &BigOpenHashMap<K, V>) -> Result<(), CursorError> {
        // The position bound keeps a stale cursor from indexing past the table.
        if self.generation == map.generation.stamp() && self.pos <= map.n {
            Ok(())
        } else {
            Err(CursorError::ConcurrentModification)
        }
    }
}
