//! Nodes of the threaded AVL tree and in-order navigation over them.
//!
//! Nodes live in an arena and refer to each other by index. A missing child is
//! not stored as an empty link: instead the link threads to the in-order
//! predecessor (left) or successor (right) of the node, or to nothing at the
//! ends of the tree. This lets iterators walk the tree in both directions
//! without parent pointers or a stack.

pub(crate) type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Link {
    /// A real child.
    Child(NodeId),
    /// No child on this side. Points to the in-order neighbor on this side,
    /// if any.
    Thread(Option<NodeId>),
}

impl Link {
    #[inline]
    pub(crate) fn child(self) -> Option<NodeId> {
        match self {
            Self::Child(id) => Some(id),
            Self::Thread(_) => None,
        }
    }

    /// Keeps a real child as it is, and turns a thread into a thread to
    /// `target`. Rotations use this when a subtree moves under a new parent.
    #[inline]
    pub(crate) fn or_thread_to(self, target: NodeId) -> Self {
        match self {
            Self::Child(id) => Self::Child(id),
            Self::Thread(_) => Self::Thread(Some(target)),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    /// `None` once the node is on the free list.
    pub(crate) value: Option<V>,
    pub(crate) left: Link,
    pub(crate) right: Link,
    /// Height of the right subtree minus height of the left subtree.
    pub(crate) balance: i8,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, left: Link, right: Link) -> Self {
        Self {
            key,
            value: Some(value),
            left,
            right,
            balance: 0,
        }
    }
}

pub(crate) fn successor<K, V>(nodes: &[Node<K, V>], id: NodeId) -> Option<NodeId> {
    match nodes[id].right {
        Link::Thread(next) => next,
        Link::Child(mut next) => {
            while let Link::Child(left) = nodes[next].left {
                next = left;
            }
            Some(next)
        }
    }
}

pub(crate) fn predecessor<K, V>(nodes: &[Node<K, V>], id: NodeId) -> Option<NodeId> {
    match nodes[id].left {
        Link::Thread(prev) => prev,
        Link::Child(mut prev) => {
            while let Link::Child(right) = nodes[prev].right {
                prev = right;
            }
            Some(prev)
        }
    }
}

pub(crate) fn rightmost<K, V>(nodes: &[Node<K, V>], mut id: NodeId) -> NodeId {
    while let Link::Child(right) = nodes[id].right {
        id = right;
    }
    id
}
