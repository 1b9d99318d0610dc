//! A sorted map implemented as a threaded AVL tree.

use super::{
    cursor::AvlCursor,
    iter::{Iter, Keys, Values},
    node::{self, Link, Node, NodeId},
    sub_map::{Bounds, SubMap, SubMapMut},
};
use crate::common::{error::RangeError, generation::Generation, key::PrimitiveKey};

use smallvec::SmallVec;
use std::{cmp::Ordering, fmt, sync::Arc};

/// A comparison function for the keys of an [`AvlTreeMap`][map].
///
/// [map]: ./struct.AvlTreeMap.html
pub type Comparator<K> = Arc<dyn Fn(K, K) -> Ordering + Send + Sync>;

// Directions taken from the deepest unbalanced node down to a new leaf. An AVL
// tree of height 64 would hold more nodes than fit in memory.
type DirPath = SmallVec<[bool; 64]>;

// Ancestors of a node being removed, with the direction taken from each.
type AncestorPath = SmallVec<[(NodeId, bool); 64]>;

/// A map from primitive keys to values, sorted by key, implemented as a
/// threaded AVL tree.
///
/// Keys are ordered by their natural order (see
/// [`PrimitiveKey::natural_cmp`][natural-cmp]) or by a custom
/// [`Comparator`][comparator]. Lookups, insertions and removals take
/// `O(log n)` time.
///
/// The missing children of every node are replaced by links to its in-order
/// neighbors. Iteration in either direction therefore needs neither parent
/// pointers nor a stack, and the first and last entries are cached, so
/// `first_key` and `last_key` are `O(1)`.
///
/// Range views over the map are created with [`head_map`](#method.head_map),
/// [`tail_map`](#method.tail_map) and [`sub_map`](#method.sub_map), and with
/// their `_mut` counterparts for views that can modify the map.
///
/// # Examples
///
/// ```rust
/// use primcoll::AvlTreeMap;
///
/// let mut map = AvlTreeMap::new();
/// for k in [5.0, 3.0, 8.0, 1.0, 4.0, 7.0, 9.0] {
///     map.insert(k, k as i32 * 10);
/// }
/// assert_eq!(map.first_key(), Some(1.0));
/// assert_eq!(map.last_key(), Some(9.0));
///
/// let head = map.head_map(7.0);
/// assert_eq!(head.keys().collect::<Vec<_>>(), vec![1.0, 3.0, 4.0, 5.0]);
/// ```
///
/// [natural-cmp]: ./trait.PrimitiveKey.html#tymethod.natural_cmp
/// [comparator]: ./type.Comparator.html
#[derive(Clone)]
pub struct AvlTreeMap<K, V> {
    pub(crate) nodes: Vec<Node<K, V>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    pub(crate) first: Option<NodeId>,
    pub(crate) last: Option<NodeId>,
    pub(crate) count: usize,
    comparator: Option<Comparator<K>>,
    pub(crate) generation: Generation,
}

impl<K: PrimitiveKey, V> Default for AvlTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PrimitiveKey, V> AvlTreeMap<K, V> {
    /// Creates an empty map ordered by the natural order of the keys.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            first: None,
            last: None,
            count: 0,
            comparator: None,
            generation: Generation::new(),
        }
    }

    /// Creates an empty map ordered by `comparator`.
    ///
    /// The comparator must be a total order. Keys it considers equal are the
    /// same key as far as the map is concerned.
    ///
    /// ```rust
    /// use primcoll::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::with_comparator(|a: i32, b: i32| b.cmp(&a));
    /// map.extend([(1, 'a'), (3, 'c'), (2, 'b')]);
    /// assert_eq!(map.keys().collect::<Vec<_>>(), vec![3, 2, 1]);
    /// ```
    pub fn with_comparator<F>(comparator: F) -> Self
    where
        F: Fn(K, K) -> Ordering + Send + Sync + 'static,
    {
        Self {
            comparator: Some(Arc::new(comparator)),
            ..Self::new()
        }
    }

    /// Returns the comparator of this map, or `None` if the map uses the
    /// natural order of the keys.
    pub fn comparator(&self) -> Option<&Comparator<K>> {
        self.comparator.as_ref()
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: K) -> bool {
        self.find(key).is_some()
    }

    /// Returns a reference to the value of `key`.
    pub fn get(&self, key: K) -> Option<&V> {
        self.find(key).and_then(|id| self.nodes[id].value.as_ref())
    }

    /// Returns a mutable reference to the value of `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let id = self.find(key)?;
        self.nodes[id].value.as_mut()
    }

    /// Returns the smallest key.
    pub fn first_key(&self) -> Option<K> {
        self.first.map(|id| self.nodes[id].key)
    }

    /// Returns the largest key.
    pub fn last_key(&self) -> Option<K> {
        self.last.map(|id| self.nodes[id].key)
    }

    /// Returns the entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(K, &V)> {
        self.first.and_then(|id| self.entry(id))
    }

    /// Returns the entry with the largest key.
    pub fn last_key_value(&self) -> Option<(K, &V)> {
        self.last.and_then(|id| self.entry(id))
    }

    /// Returns an iterator over the entries, in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.first, self.last, self.count)
    }

    /// Returns an iterator over the keys, in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over the values, in ascending key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Returns a view of the entries whose keys are less than `to`.
    pub fn head_map(&self, to: K) -> SubMap<'_, K, V> {
        SubMap::new(self, Bounds::new(None, Some(to)))
    }

    /// Returns a view of the entries whose keys are greater than or equal to
    /// `from`.
    pub fn tail_map(&self, from: K) -> SubMap<'_, K, V> {
        SubMap::new(self, Bounds::new(Some(from), None))
    }

    /// Returns a view of the entries whose keys are within `[from, to)`.
    ///
    /// Fails with `RangeError::InvalidRange` if `from` is greater than `to`.
    pub fn sub_map(&self, from: K, to: K) -> Result<SubMap<'_, K, V>, RangeError> {
        let bounds = self.checked_bounds(from, to)?;
        Ok(SubMap::new(self, bounds))
    }

    /// Returns a modifiable view of the entries whose keys are less than `to`.
    pub fn head_map_mut(&mut self, to: K) -> SubMapMut<'_, K, V> {
        SubMapMut::new(self, Bounds::new(None, Some(to)))
    }

    /// Returns a modifiable view of the entries whose keys are greater than or
    /// equal to `from`.
    pub fn tail_map_mut(&mut self, from: K) -> SubMapMut<'_, K, V> {
        SubMapMut::new(self, Bounds::new(Some(from), None))
    }

    /// Returns a modifiable view of the entries whose keys are within
    /// `[from, to)`.
    pub fn sub_map_mut(&mut self, from: K, to: K) -> Result<SubMapMut<'_, K, V>, RangeError> {
        let bounds = self.checked_bounds(from, to)?;
        Ok(SubMapMut::new(self, bounds))
    }

    /// Returns a cursor over the entries in ascending key order, which can
    /// also remove them.
    pub fn cursor(&self) -> AvlCursor {
        AvlCursor::new(self)
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.first = None;
        self.last = None;
        self.count = 0;
        self.generation.bump();
    }

    /// Inserts a key-value pair into the map, returning the previous value of
    /// the key, if any.
    ///
    /// Replacing the value of an existing key does not change the shape of
    /// the tree.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let Some(root) = self.root else {
            let id = self.alloc(Node::new(key, value, Link::Thread(None), Link::Thread(None)));
            self.root = Some(id);
            self.first = Some(id);
            self.last = Some(id);
            self.count = 1;
            self.generation.bump();
            return None;
        };

        // `y` is the deepest node on the way down whose balance is not zero,
        // the only node that may need a rotation. `z` is its parent.
        let mut p = root;
        let mut q = None;
        let mut y = root;
        let mut z = None;
        let mut path = DirPath::new();

        let e = loop {
            let ord = self.compare(key, self.nodes[p].key);
            if ord == Ordering::Equal {
                return self.nodes[p].value.replace(value);
            }
            if self.nodes[p].balance != 0 {
                path.clear();
                z = q;
                y = p;
            }
            let right = ord == Ordering::Greater;
            path.push(right);

            let Node { left, right: right_link, .. } = self.nodes[p];
            if right {
                match right_link {
                    Link::Child(c) => {
                        q = Some(p);
                        p = c;
                    }
                    Link::Thread(succ) => {
                        let e = self.alloc(Node::new(
                            key,
                            value,
                            Link::Thread(Some(p)),
                            Link::Thread(succ),
                        ));
                        self.nodes[p].right = Link::Child(e);
                        if succ.is_none() {
                            self.last = Some(e);
                        }
                        break e;
                    }
                }
            } else {
                match left {
                    Link::Child(c) => {
                        q = Some(p);
                        p = c;
                    }
                    Link::Thread(pred) => {
                        let e = self.alloc(Node::new(
                            key,
                            value,
                            Link::Thread(pred),
                            Link::Thread(Some(p)),
                        ));
                        self.nodes[p].left = Link::Child(e);
                        if pred.is_none() {
                            self.first = Some(e);
                        }
                        break e;
                    }
                }
            }
        };
        self.count += 1;
        self.generation.bump();

        // Every node from the pivot down to the new leaf was balanced, and
        // now leans towards the leaf.
        let mut p = y;
        for &right in &path {
            let node = &mut self.nodes[p];
            let next = if right {
                node.balance += 1;
                node.right.child()
            } else {
                node.balance -= 1;
                node.left.child()
            };
            match next {
                Some(next) => p = next,
                None => break,
            }
        }
        debug_assert_eq!(p, e);

        let w = match self.nodes[y].balance {
            -2 => {
                let Some(x) = self.nodes[y].left.child() else {
                    return None;
                };
                if self.nodes[x].balance == -1 {
                    self.rotate_right(y, x);
                    self.nodes[x].balance = 0;
                    self.nodes[y].balance = 0;
                    x
                } else {
                    self.rotate_left_right(y, x)
                }
            }
            2 => {
                let Some(x) = self.nodes[y].right.child() else {
                    return None;
                };
                if self.nodes[x].balance == 1 {
                    self.rotate_left(y, x);
                    self.nodes[x].balance = 0;
                    self.nodes[y].balance = 0;
                    x
                } else {
                    self.rotate_right_left(y, x)
                }
            }
            _ => return None,
        };
        self.replace_child(z, y, w);
        None
    }

    pub(crate) fn compare(&self, a: K, b: K) -> Ordering {
        match &self.comparator {
            Some(comparator) => comparator(a, b),
            None => a.natural_cmp(b),
        }
    }

    pub(crate) fn find(&self, key: K) -> Option<NodeId> {
        let mut next = self.root;
        while let Some(id) = next {
            let node = &self.nodes[id];
            next = match self.compare(key, node.key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => node.left.child(),
                Ordering::Greater => node.right.child(),
            };
        }
        None
    }

    /// Returns the node holding `key`, or else the last node visited while
    /// looking for it. That node is the closest key on one side of `key`.
    pub(crate) fn locate(&self, key: K) -> Option<NodeId> {
        let mut id = self.root?;
        loop {
            let node = &self.nodes[id];
            let next = match self.compare(key, node.key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => node.left.child(),
                Ordering::Greater => node.right.child(),
            };
            match next {
                Some(next) => id = next,
                None => return Some(id),
            }
        }
    }

    #[inline]
    pub(crate) fn entry(&self, id: NodeId) -> Option<(K, &V)> {
        let node = &self.nodes[id];
        node.value.as_ref().map(|value| (node.key, value))
    }

    #[inline]
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        node::successor(&self.nodes, id)
    }

    #[inline]
    pub(crate) fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        node::predecessor(&self.nodes, id)
    }

    fn checked_bounds(&self, from: K, to: K) -> Result<Bounds<K>, RangeError> {
        if self.compare(from, to) == Ordering::Greater {
            Err(RangeError::InvalidRange)
        } else {
            Ok(Bounds::new(Some(from), Some(to)))
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Points the link of `parent` that leads to `old` at `new` instead, or
    /// makes `new` the root.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            None => self.root = Some(new),
            Some(q) => {
                let q = &mut self.nodes[q];
                if q.left == Link::Child(old) {
                    q.left = Link::Child(new);
                } else {
                    q.right = Link::Child(new);
                }
            }
        }
    }

    // The rotations below only relink nodes. The callers set the balances
    // of single rotations; double rotations set their own.

    /// Lifts `x`, the left child of `y`, above `y`.
    fn rotate_right(&mut self, y: NodeId, x: NodeId) {
        self.nodes[y].left = self.nodes[x].right.or_thread_to(x);
        self.nodes[x].right = Link::Child(y);
    }

    /// Lifts `x`, the right child of `y`, above `y`.
    fn rotate_left(&mut self, y: NodeId, x: NodeId) {
        self.nodes[y].right = self.nodes[x].left.or_thread_to(x);
        self.nodes[x].left = Link::Child(y);
    }

    /// Lifts the right child `w` of `x`, itself the left child of `y`, above
    /// both. Returns `w`.
    fn rotate_left_right(&mut self, y: NodeId, x: NodeId) -> NodeId {
        let Some(w) = self.nodes[x].right.child() else {
            debug_assert!(false, "left-right rotation without a grandchild");
            return x;
        };
        self.nodes[x].right = self.nodes[w].left.or_thread_to(w);
        self.nodes[y].left = self.nodes[w].right.or_thread_to(w);
        self.nodes[w].left = Link::Child(x);
        self.nodes[w].right = Link::Child(y);

        let (x_balance, y_balance) = match self.nodes[w].balance {
            -1 => (0, 1),
            0 => (0, 0),
            _ => (-1, 0),
        };
        self.nodes[x].balance = x_balance;
        self.nodes[y].balance = y_balance;
        self.nodes[w].balance = 0;
        w
    }

    /// Lifts the left child `w` of `x`, itself the right child of `y`, above
    /// both. Returns `w`.
    fn rotate_right_left(&mut self, y: NodeId, x: NodeId) -> NodeId {
        let Some(w) = self.nodes[x].left.child() else {
            debug_assert!(false, "right-left rotation without a grandchild");
            return x;
        };
        self.nodes[x].left = self.nodes[w].right.or_thread_to(w);
        self.nodes[y].right = self.nodes[w].left.or_thread_to(w);
        self.nodes[w].right = Link::Child(x);
        self.nodes[w].left = Link::Child(y);

        let (x_balance, y_balance) = match self.nodes[w].balance {
            1 => (0, -1),
            0 => (0, 0),
            _ => (1, 0),
        };
        self.nodes[x].balance = x_balance;
        self.nodes[y].balance = y_balance;
        self.nodes[w].balance = 0;
        w
    }
}

impl<K: PrimitiveKey, V> AvlTreeMap<K, V> {
    /// Removes a key from the map, returning its value if it was present.
    pub fn remove(&mut self, key: K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and its value if
    /// the key was present.
    ///
    /// Other entries stay in their nodes; only links change.
    pub fn remove_entry(&mut self, key: K) -> Option<(K, V)> {
        let mut path = AncestorPath::new();
        let mut p = self.root?;
        loop {
            let ord = self.compare(key, self.nodes[p].key);
            if ord == Ordering::Equal {
                break;
            }
            let right = ord == Ordering::Greater;
            let next = if right {
                self.nodes[p].right
            } else {
                self.nodes[p].left
            };
            match next {
                Link::Child(c) => {
                    path.push((p, right));
                    p = c;
                }
                Link::Thread(_) => return None,
            }
        }

        self.unlink(p, path);
        self.count -= 1;
        self.generation.bump();
        self.dealloc(p)
    }

    /// Retains only the entries for which `f` returns `true`, visiting them
    /// in ascending key order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(K, &mut V) -> bool,
    {
        let mut next = self.first;
        while let Some(id) = next {
            next = self.successor(id);
            let node = &mut self.nodes[id];
            let key = node.key;
            let keep = node.value.as_mut().map_or(true, |value| f(key, value));
            if !keep {
                self.remove_entry(key);
            }
        }
    }

    fn dealloc(&mut self, id: NodeId) -> Option<(K, V)> {
        let node = &mut self.nodes[id];
        node.left = Link::Thread(None);
        node.right = Link::Thread(None);
        node.balance = 0;
        let key = node.key;
        let value = node.value.take();
        self.free.push(id);
        value.map(|value| (key, value))
    }

    /// Takes node `p` out of the tree and rebalances. `path` holds the
    /// ancestors of `p`.
    fn unlink(&mut self, p: NodeId, mut path: AncestorPath) {
        let Node { left, right, .. } = self.nodes[p];
        if left == Link::Thread(None) {
            self.first = self.successor(p);
        }
        if right == Link::Thread(None) {
            self.last = self.predecessor(p);
        }
        let parent = path.last().map(|&(q, _)| q);

        match (left, right) {
            (Link::Thread(_), Link::Thread(_)) => match path.last() {
                Some(&(q, true)) => self.nodes[q].right = right,
                Some(&(q, false)) => self.nodes[q].left = left,
                None => self.root = None,
            },
            (Link::Child(l), Link::Thread(_)) => {
                // The predecessor of `p` threads to it; make it thread past it.
                let pred = node::rightmost(&self.nodes, l);
                self.nodes[pred].right = right;
                self.replace_child(parent, p, l);
            }
            (_, Link::Child(r)) => match self.nodes[r].left.child() {
                None => {
                    // The right child has no left subtree: it takes the place
                    // of `p`, and its right subtree is one level shorter.
                    self.nodes[r].left = left;
                    if let Link::Child(l) = left {
                        let pred = node::rightmost(&self.nodes, l);
                        self.nodes[pred].right = Link::Thread(Some(r));
                    }
                    self.replace_child(parent, p, r);
                    self.nodes[r].balance = self.nodes[p].balance;
                    path.push((r, true));
                }
                Some(mut s) => {
                    // The successor `s` of `p` is the leftmost node of the
                    // right subtree. Splice it out and put it in place of `p`.
                    let mut chain = SmallVec::<[NodeId; 64]>::new();
                    chain.push(r);
                    while let Link::Child(next) = self.nodes[s].left {
                        chain.push(s);
                        s = next;
                    }
                    let s_parent = chain[chain.len() - 1];
                    self.nodes[s_parent].left = self.nodes[s].right.or_thread_to(s);

                    self.nodes[s].left = left;
                    if let Link::Child(l) = left {
                        let pred = node::rightmost(&self.nodes, l);
                        self.nodes[pred].right = Link::Thread(Some(s));
                    }
                    self.nodes[s].right = right;
                    self.replace_child(parent, p, s);
                    self.nodes[s].balance = self.nodes[p].balance;

                    path.push((s, true));
                    path.extend(chain.into_iter().map(|id| (id, false)));
                }
            },
        }

        self.rebalance_after_removal(path);
    }

    /// Walks up `path`, whose last node lost height on the recorded side,
    /// until a subtree keeps its height.
    fn rebalance_after_removal(&mut self, mut path: AncestorPath) {
        while let Some((y, right_shrank)) = path.pop() {
            let parent = path.last().map(|&(q, _)| q);

            if !right_shrank {
                self.nodes[y].balance += 1;
                match self.nodes[y].balance {
                    1 => break,
                    2 => {
                        let Some(x) = self.nodes[y].right.child() else {
                            debug_assert!(false, "right-heavy node without a right child");
                            break;
                        };
                        if self.nodes[x].balance == -1 {
                            let w = self.rotate_right_left(y, x);
                            self.replace_child(parent, y, w);
                        } else {
                            self.replace_child(parent, y, x);
                            self.rotate_left(y, x);
                            if self.nodes[x].balance == 0 {
                                self.nodes[x].balance = -1;
                                self.nodes[y].balance = 1;
                                break;
                            }
                            self.nodes[x].balance = 0;
                            self.nodes[y].balance = 0;
                        }
                    }
                    _ => {}
                }
            } else {
                self.nodes[y].balance -= 1;
                match self.nodes[y].balance {
                    -1 => break,
                    -2 => {
                        let Some(x) = self.nodes[y].left.child() else {
                            debug_assert!(false, "left-heavy node without a left child");
                            break;
                        };
                        if self.nodes[x].balance == 1 {
                            let w = self.rotate_left_right(y, x);
                            self.replace_child(parent, y, w);
                        } else {
                            self.replace_child(parent, y, x);
                            self.rotate_right(y, x);
                            if self.nodes[x].balance == 0 {
                                self.nodes[x].balance = 1;
                                self.nodes[y].balance = -1;
                                break;
                            }
                            self.nodes[x].balance = 0;
                            self.nodes[y].balance = 0;
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

impl<K: PrimitiveKey, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: PrimitiveKey, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K: PrimitiveKey, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PrimitiveKey, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
