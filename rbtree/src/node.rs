/// Color of a tree node. Absent children count as [`Black`].
///
/// [`Black`]: Color::Black
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns `true` if the color is [`Red`].
    ///
    /// [`Red`]: Color::Red
    #[must_use]
    pub fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    /// Returns `true` if the color is [`Black`].
    ///
    /// [`Black`]: Color::Black
    #[must_use]
    pub fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }
}

/// Handle to a node of a [`RedBlackTree`].
///
/// A handle stays valid until the node it names is removed from the tree.
/// After that every lookup through it reports the node as absent, even if the
/// underlying slot has since been reused for a new key.
///
/// [`RedBlackTree`]: crate::RedBlackTree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) color: Color,
    pub(crate) parent: Option<usize>,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}

impl<K> Node<K> {
    /// New nodes start out red and detached.
    pub(crate) fn new(key: K) -> Self {
        Self {
            key,
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
        }
    }
}

/// One arena cell. `node` is `None` while the slot sits on the free list.
pub(crate) struct Slot<K> {
    pub(crate) generation: u32,
    pub(crate) node: Option<Node<K>>,
}

/// Where a node hangs relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodePos {
    Root,
    Left,
    Right,
}
