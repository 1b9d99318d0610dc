//! Provides a sorted map of primitive keys implemented as a threaded AVL tree,
//! with range views over it.

mod cursor;
mod iter;
mod map;
mod node;
mod sub_map;

pub use {
    cursor::AvlCursor,
    iter::{Iter, Keys, Values},
    map::{AvlTreeMap, Comparator},
    sub_map::{SubMap, SubMapMut},
};
