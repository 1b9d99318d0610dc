//! Provides open addressing hash tables whose slot arrays are split into
//! segments, for tables larger than a single allocation should be.

mod cursor;
mod iter;
mod map;
mod set;

pub use {
    cursor::BigCursor,
    iter::{BigIter, BigIterMut, BigKeys, BigValues, BigValuesMut},
    map::BigOpenHashMap,
    set::{BigOpenHashSet, BigSetCursor},
};
