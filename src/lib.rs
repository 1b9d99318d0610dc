#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Primcoll provides collections specialized for primitive keys: integers,
//! floating point numbers, `bool` and `char`.
//!
//! Keys are stored unboxed, and compared and hashed by their bit pattern.
//! There are three families of collections:
//!
//! - Open addressing hash tables with linear probing,
//!   [`OpenHashMap`][open-map] and [`OpenHashSet`][open-set]. Removal moves
//!   entries back into the gap it leaves (backward shift), so the tables never
//!   hold tombstones. The tables grow and shrink with their contents according
//!   to their load factor and [`ShrinkPolicy`][shrink-policy].
//! - Big hash tables, [`BigOpenHashMap`][big-map] and
//!   [`BigOpenHashSet`][big-set]. They work like the flat tables, but split
//!   their slot arrays into segments, so they can hold more entries than a
//!   single allocation should.
//! - A sorted map, [`AvlTreeMap`][avl-map], implemented as a threaded AVL tree.
//!   It supports iteration in both directions and range views (`head_map`,
//!   `tail_map` and `sub_map`).
//!
//! Besides the borrowing iterators, every collection offers a _cursor_, which
//! does not borrow the collection and can remove the entry it last returned.
//!
//! # Example
//!
//! ```rust
//! use primcoll::{AvlTreeMap, OpenHashMap};
//!
//! let mut counts = OpenHashMap::new();
//! for word_len in [3u32, 5, 3, 0, 7, 3] {
//!     counts.add_to(word_len, 1u64);
//! }
//! assert_eq!(counts.get(3), Some(&3));
//! // The all-zero key is a key like any other.
//! assert_eq!(counts.get(0), Some(&1));
//!
//! let sorted: AvlTreeMap<u32, u64> = counts.iter().map(|(k, v)| (k, *v)).collect();
//! assert_eq!(sorted.keys().collect::<Vec<_>>(), vec![0, 3, 5, 7]);
//! ```
//!
//! # Minimum Supported Rust Versions
//!
//! This crate's minimum supported Rust version (MSRV) is 1.65.
//!
//! [open-map]: ./struct.OpenHashMap.html
//! [open-set]: ./struct.OpenHashSet.html
//! [big-map]: ./struct.BigOpenHashMap.html
//! [big-set]: ./struct.BigOpenHashSet.html
//! [avl-map]: ./struct.AvlTreeMap.html
//! [shrink-policy]: ./enum.ShrinkPolicy.html

pub mod avl;
pub mod big;
pub mod open;

mod builder;
mod common;
mod policy;

pub use {
    avl::{AvlCursor, AvlTreeMap, Comparator, SubMap, SubMapMut},
    big::{BigCursor, BigOpenHashMap, BigOpenHashSet, BigSetCursor},
    builder::TableBuilder,
    common::{
        error::{ConfigError, CursorError, RangeError},
        hash,
        key::PrimitiveKey,
    },
    open::{Cursor, OpenHashMap, OpenHashSet, SetCursor},
    policy::{ShrinkPolicy, TablePolicy},
};

#[cfg(test)]
mod tests {
    #[test]
    fn collections_are_send_and_sync() {
        fn is_send_sync<T: Send + Sync>() {}

        is_send_sync::<crate::OpenHashMap<u64, String>>();
        is_send_sync::<crate::BigOpenHashSet<f32>>();
        is_send_sync::<crate::AvlTreeMap<i32, Vec<u8>>>();
        is_send_sync::<crate::Cursor<char>>();
    }
}
