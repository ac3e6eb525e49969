use thiserror::Error;

/// Failures reported by the mutating operations of [`RedBlackTree`].
///
/// [`RedBlackTree`]: crate::RedBlackTree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("key is already present in the tree")]
    DuplicateKey,
    #[error("node handle does not refer to a live node in this tree")]
    StaleNode,
}

/// A broken red-black or binary-search-tree property found by
/// [`RedBlackTree::validate`].
///
/// [`RedBlackTree::validate`]: crate::RedBlackTree::validate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root node is red")]
    RedRoot,
    #[error("red node has a red child")]
    RedRedParentChild,
    #[error("black height differs between subtrees (left {left}, right {right})")]
    BlackHeightMismatch { left: usize, right: usize },
    #[error("in-order keys are not strictly increasing")]
    OutOfOrder,
    #[error("child does not point back to its parent")]
    BrokenParentLink,
    #[error("tree reports {expected} nodes but {found} are reachable")]
    LengthMismatch { expected: usize, found: usize },
}
