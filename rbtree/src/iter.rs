use std::iter::FusedIterator;

use crate::red_black_tree::RedBlackTree;

/// In-order iterator over the keys of a [`RedBlackTree`].
///
/// Walks successor links, so it needs no stack.
pub struct Iter<'a, K> {
    tree: &'a RedBlackTree<K>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(tree: &'a RedBlackTree<K>) -> Self {
        Self {
            tree,
            next: tree.root.map(|root| tree.min_of(root)),
            remaining: tree.len(),
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = self.tree.successor_index(node);
        self.remaining -= 1;
        Some(&self.tree.node(node).key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

/// Pre-order iterator over the keys of a [`RedBlackTree`].
pub struct PreorderIter<'a, K> {
    tree: &'a RedBlackTree<K>,
    // right subtrees still to visit, top is next
    stack: Vec<usize>,
}

impl<'a, K> PreorderIter<'a, K> {
    pub(crate) fn new(tree: &'a RedBlackTree<K>) -> Self {
        Self {
            tree,
            stack: tree.root.into_iter().collect(),
        }
    }
}

impl<'a, K> Iterator for PreorderIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.node(self.stack.pop()?);
        self.stack.extend(node.right);
        self.stack.extend(node.left);
        Some(&node.key)
    }
}

impl<K> FusedIterator for PreorderIter<'_, K> {}

impl<'a, K> IntoIterator for &'a RedBlackTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        let tree = RedBlackTree::<i32>::new();
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.iter_preorder().next(), None);
        assert_eq!(tree.iter().len(), 0);
    }

    #[test]
    fn in_order() {
        let mut tree = RedBlackTree::new();
        for k in [40, 8, 61, 3, 17, 80, 11, 29, 73, 22] {
            tree.insert(k).unwrap();
        }

        let mut iter = tree.iter();
        assert_eq!(iter.len(), 10);
        iter.next();
        assert_eq!(iter.size_hint(), (9, Some(9)));

        let keys: Vec<_> = (&tree).into_iter().copied().collect();
        assert_eq!(keys, [3, 8, 11, 17, 22, 29, 40, 61, 73, 80]);
    }

    #[test]
    fn pre_order_matches_visitor() {
        let mut tree = RedBlackTree::new();
        for k in 0..50 {
            tree.insert(k * 7 % 50).unwrap();
        }

        let mut visited = Vec::new();
        tree.preorder_for_each(|k, _| visited.push(*k));
        let iterated: Vec<_> = tree.iter_preorder().copied().collect();
        assert_eq!(visited, iterated);
        assert_eq!(iterated.first(), tree.root().and_then(|r| tree.key(r)));
    }

    #[test]
    fn fresh_call_restarts() {
        let mut tree = RedBlackTree::new();
        for k in [2, 1, 3] {
            tree.insert(k).unwrap();
        }

        let mut iter = tree.iter();
        assert_eq!(iter.by_ref().count(), 3);
        assert_eq!(iter.next(), None);
        assert_eq!(tree.iter().count(), 3);
    }
}
