use crate::error::InvariantViolation;
use crate::red_black_tree::RedBlackTree;

impl<K: Ord> RedBlackTree<K> {
    /// Checks every red-black and binary-search-tree property along with the
    /// parent links and the stored length.
    ///
    /// Returns the black height of the tree: the number of black nodes on any
    /// path from the root down to a leaf, the root included.
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        let root = match self.root {
            Some(root) => root,
            None if self.len == 0 => return Ok(0),
            None => {
                return Err(InvariantViolation::LengthMismatch {
                    expected: self.len,
                    found: 0,
                })
            }
        };

        let node = self.node(root);
        if node.parent.is_some() {
            return Err(InvariantViolation::BrokenParentLink);
        }
        if node.color.is_red() {
            return Err(InvariantViolation::RedRoot);
        }

        let mut count = 0;
        let mut prev = None;
        let black_height = self.validate_subtree(root, &mut count, &mut prev)?;
        if count != self.len {
            return Err(InvariantViolation::LengthMismatch {
                expected: self.len,
                found: count,
            });
        }

        Ok(black_height)
    }

    /// Walks the subtree in order, `prev` is the last key visited.
    fn validate_subtree<'a>(
        &'a self,
        index: usize,
        count: &mut usize,
        prev: &mut Option<&'a K>,
    ) -> Result<usize, InvariantViolation> {
        let node = self.node(index);
        for child in [node.left, node.right].into_iter().flatten() {
            let child = self.node(child);
            if child.parent != Some(index) {
                return Err(InvariantViolation::BrokenParentLink);
            }
            if node.color.is_red() && child.color.is_red() {
                return Err(InvariantViolation::RedRedParentChild);
            }
        }

        let left = match node.left {
            Some(left) => self.validate_subtree(left, count, prev)?,
            None => 0,
        };

        if prev.is_some_and(|prev| *prev >= node.key) {
            return Err(InvariantViolation::OutOfOrder);
        }
        *prev = Some(&node.key);
        *count += 1;

        let right = match node.right {
            Some(right) => self.validate_subtree(right, count, prev)?,
            None => 0,
        };

        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch { left, right });
        }

        Ok(left + usize::from(node.color.is_black()))
    }
}

#[cfg(test)]
mod tests {
    use crate::node::Color;

    use super::*;

    fn three() -> RedBlackTree<i32> {
        //  +- 2:b -+
        //  |       |
        // 1:r     3:r
        let mut tree = RedBlackTree::new();
        for k in [2, 1, 3] {
            tree.insert(k).unwrap();
        }
        tree
    }

    fn index_of(tree: &RedBlackTree<i32>, key: i32) -> usize {
        tree.search(&key).unwrap().index
    }

    #[test]
    fn valid_trees() {
        assert_eq!(RedBlackTree::<i32>::new().validate(), Ok(0));
        assert_eq!(three().validate(), Ok(1));

        let mut tree = RedBlackTree::new();
        for k in 1..=15 {
            tree.insert(k).unwrap();
        }
        assert!(tree.validate().unwrap() >= 2);
    }

    #[test]
    fn red_root() {
        let mut tree = three();
        let root = tree.root.unwrap();
        tree.node_mut(root).color = Color::Red;
        assert_eq!(tree.validate(), Err(InvariantViolation::RedRoot));
    }

    #[test]
    fn red_red() {
        let mut tree = three();
        tree.insert(4).unwrap();
        // 4 forced 1 and 3 black, make 3 red again
        let i = index_of(&tree, 3);
        tree.node_mut(i).color = Color::Red;
        assert_eq!(tree.validate(), Err(InvariantViolation::RedRedParentChild));
    }

    #[test]
    fn black_height() {
        let mut tree = three();
        let i = index_of(&tree, 1);
        tree.node_mut(i).color = Color::Black;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BlackHeightMismatch { left: 1, right: 0 })
        );
    }

    #[test]
    fn out_of_order() {
        let mut tree = three();
        let i = index_of(&tree, 1);
        tree.node_mut(i).key = 10;
        assert_eq!(tree.validate(), Err(InvariantViolation::OutOfOrder));
    }

    #[test]
    fn broken_parent_link() {
        let mut tree = three();
        let i = index_of(&tree, 3);
        tree.node_mut(i).parent = None;
        assert_eq!(tree.validate(), Err(InvariantViolation::BrokenParentLink));
    }

    #[test]
    fn length_mismatch() {
        let mut tree = three();
        tree.len = 4;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::LengthMismatch {
                expected: 4,
                found: 3
            })
        );
    }
}
