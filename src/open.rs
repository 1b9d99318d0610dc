//! Provides flat open addressing hash tables with linear probing.

mod cursor;
mod iter;
mod map;
mod set;

pub use {
    cursor::Cursor,
    iter::{Iter, IterMut, Keys, Values, ValuesMut},
    map::OpenHashMap,
    set::{OpenHashSet, SetCursor},
};
