use core::fmt;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

use log::{debug, trace};

use crate::error::Error;
use crate::iter::{Iter, PreorderIter};
use crate::node::{Color, Node, NodePos, NodeRef, Slot};

/// A red-black tree based ordered set.
///
/// Duplicate keys are rejected. The height never exceeds `2 * log2(len + 1)`,
/// so every lookup and mutation is `O(log n)`.
///
/// The tree is not synchronized. Sharing it between threads requires external
/// locking around every mutation.
pub struct RedBlackTree<K> {
    // INVARIANTS:
    //  * `root` is `None` iff `len == 0`
    //  * every index reachable from `root` names an occupied slot
    //  * every index in `free` names a vacant slot
    pub(crate) root: Option<usize>,
    pub(crate) len: usize,
    pub(crate) slots: Vec<Slot<K>>,
    free: Vec<usize>,
}

impl<K> fmt::Debug for RedBlackTree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct TreeDebug<'a, K> {
            tree: &'a RedBlackTree<K>,
            root: usize,
        }

        impl<K> fmt::Debug for TreeDebug<'_, K>
        where
            K: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut f = f.debug_list();

                let mut func = |node: usize| {
                    let node = self.tree.node(node);
                    f.entry(&(&node.key, node.color));
                };

                self.tree.inorder_for_each_core(self.root, &mut func);
                f.finish()
            }
        }

        let mut f = f.debug_struct("RedBlackTree");
        f.field("len", &self.len);

        match self.root {
            None => {
                f.field("root", &None::<K>);
                let nodes: &[K] = &[];
                f.field("nodes", &nodes);
            }
            Some(root) => {
                let node = self.node(root);
                f.field("root", &Some((&node.key, node.color)));
                f.field(
                    "nodes",
                    &TreeDebug {
                        tree: self,
                        root,
                    },
                );
            }
        }

        f.finish()
    }
}

impl<K> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

// Arena plumbing.
impl<K> RedBlackTree<K> {
    #[inline]
    pub(crate) fn node(&self, index: usize) -> &Node<K> {
        match self.slots[index].node.as_ref() {
            Some(node) => node,
            None => unreachable!("link to vacant slot {index}"),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, index: usize) -> &mut Node<K> {
        match self.slots[index].node.as_mut() {
            Some(node) => node,
            None => unreachable!("link to vacant slot {index}"),
        }
    }

    #[inline]
    fn parent_of(&self, index: usize) -> Option<usize> {
        self.node(index).parent
    }

    #[inline]
    fn left_of(&self, index: usize) -> Option<usize> {
        self.node(index).left
    }

    #[inline]
    fn right_of(&self, index: usize) -> Option<usize> {
        self.node(index).right
    }

    #[inline]
    fn set_parent(&mut self, index: usize, new_parent: Option<usize>) {
        self.node_mut(index).parent = new_parent;
    }

    #[inline]
    fn set_left(&mut self, index: usize, new_left: Option<usize>) {
        self.node_mut(index).left = new_left;
    }

    #[inline]
    fn set_right(&mut self, index: usize, new_right: Option<usize>) {
        self.node_mut(index).right = new_right;
    }

    #[inline]
    fn set_color(&mut self, index: usize, new_color: Color) {
        self.node_mut(index).color = new_color;
    }

    /// Color of a possibly absent node. Absent nodes are the black NIL leaves.
    #[inline]
    pub(crate) fn color_of(&self, index: Option<usize>) -> Color {
        index.map_or(Color::Black, |index| self.node(index).color)
    }

    fn pos(&self, index: usize) -> NodePos {
        match self.parent_of(index) {
            None => NodePos::Root,
            Some(p) if self.left_of(p) == Some(index) => NodePos::Left,
            Some(p) => {
                debug_assert_eq!(self.right_of(p), Some(index));
                NodePos::Right
            }
        }
    }

    fn alloc(&mut self, node: Node<K>) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    /// Vacates the slot and invalidates every handle pointing at it.
    fn release(&mut self, index: usize) -> Node<K> {
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        let node = match slot.node.take() {
            Some(node) => node,
            None => unreachable!("slot {index} released twice"),
        };
        self.free.push(index);
        node
    }

    #[inline]
    fn handle(&self, index: usize) -> NodeRef {
        NodeRef {
            index,
            generation: self.slots[index].generation,
        }
    }

    #[inline]
    fn resolve(&self, node: NodeRef) -> Option<usize> {
        match self.slots.get(node.index) {
            Some(slot) if slot.generation == node.generation && slot.node.is_some() => {
                Some(node.index)
            }
            _ => None,
        }
    }

    fn swap_keys(&mut self, a: usize, b: usize) {
        debug_assert_ne!(a, b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(hi);
        match (head[lo].node.as_mut(), tail[0].node.as_mut()) {
            (Some(x), Some(y)) => mem::swap(&mut x.key, &mut y.key),
            _ => unreachable!("swapping keys of vacant slots {a} and {b}"),
        }
    }
}

impl<K> RedBlackTree<K> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Creates an empty tree with room for `capacity` nodes before the arena
    /// has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            root: None,
            len: 0,
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<NodeRef> {
        self.root.map(|root| self.handle(root))
    }

    /// Returns the key stored in `node`, or `None` if the handle is stale.
    pub fn key(&self, node: NodeRef) -> Option<&K> {
        self.resolve(node).map(|index| &self.node(index).key)
    }

    pub fn color(&self, node: NodeRef) -> Option<Color> {
        self.resolve(node).map(|index| self.node(index).color)
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        let parent = self.parent_of(self.resolve(node)?)?;
        Some(self.handle(parent))
    }

    pub fn left(&self, node: NodeRef) -> Option<NodeRef> {
        let left = self.left_of(self.resolve(node)?)?;
        Some(self.handle(left))
    }

    pub fn right(&self, node: NodeRef) -> Option<NodeRef> {
        let right = self.right_of(self.resolve(node)?)?;
        Some(self.handle(right))
    }

    /// Number of nodes on the longest path from the root down to a leaf.
    pub fn height(&self) -> usize {
        fn inner<K>(tree: &RedBlackTree<K>, node: Option<usize>) -> usize {
            match node {
                Some(node) => {
                    1 + inner(tree, tree.left_of(node)).max(inner(tree, tree.right_of(node)))
                }
                None => 0,
            }
        }

        inner(self, self.root)
    }

    /// Calls `f` with every key and its color in ascending key order.
    pub fn inorder_for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, Color),
    {
        if let Some(root) = self.root {
            let mut f = |node: usize| {
                let node = self.node(node);
                f(&node.key, node.color)
            };
            self.inorder_for_each_core(root, &mut f);
        }
    }

    fn inorder_for_each_core<F>(&self, node: usize, f: &mut F)
    where
        F: FnMut(usize),
    {
        if let Some(l) = self.left_of(node) {
            self.inorder_for_each_core(l, f);
        }
        f(node);
        if let Some(r) = self.right_of(node) {
            self.inorder_for_each_core(r, f);
        }
    }

    /// Calls `f` with every key and its color, visiting each node before its
    /// left subtree and the left subtree before the right one.
    pub fn preorder_for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, Color),
    {
        if let Some(root) = self.root {
            let mut f = |node: usize| {
                let node = self.node(node);
                f(&node.key, node.color)
            };
            self.preorder_for_each_core(root, &mut f);
        }
    }

    fn preorder_for_each_core<F>(&self, node: usize, f: &mut F)
    where
        F: FnMut(usize),
    {
        f(node);
        if let Some(l) = self.left_of(node) {
            self.preorder_for_each_core(l, f);
        }
        if let Some(r) = self.right_of(node) {
            self.preorder_for_each_core(r, f);
        }
    }

    /// Iterates over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Iterates over the keys in pre-order (node, left subtree, right subtree).
    pub fn iter_preorder(&self) -> PreorderIter<'_, K> {
        PreorderIter::new(self)
    }

    pub fn search<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search_index(key).map(|node| self.handle(node))
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search_index(key).map(|node| &self.node(node).key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search_index(key).is_some()
    }

    fn search_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut x = self.root;
        while let Some(node) = x {
            match key.cmp(self.node(node).key.borrow()) {
                Ordering::Less => x = self.left_of(node),
                Ordering::Equal => return Some(node),
                Ordering::Greater => x = self.right_of(node),
            }
        }

        None
    }

    pub fn min(&self) -> Option<NodeRef> {
        self.root.map(|root| self.handle(self.min_of(root)))
    }

    pub(crate) fn min_of(&self, root: usize) -> usize {
        let mut x = root;
        while let Some(left) = self.left_of(x) {
            x = left;
        }

        x
    }

    pub fn max(&self) -> Option<NodeRef> {
        self.root.map(|root| self.handle(self.max_of(root)))
    }

    fn max_of(&self, root: usize) -> usize {
        let mut x = root;
        while let Some(right) = self.right_of(x) {
            x = right;
        }

        x
    }

    /// Returns the node with the smallest key greater than `node`'s key.
    ///
    /// `None` if `node` holds the maximum or the handle is stale.
    pub fn successor(&self, node: NodeRef) -> Option<NodeRef> {
        let node = self.resolve(node)?;
        self.successor_index(node).map(|node| self.handle(node))
    }

    pub(crate) fn successor_index(&self, mut node: usize) -> Option<usize> {
        //       +-------- 40 --------+
        //       |                    |
        // +---- 8 ----+              61 --+
        // |           |                   |
        // 3      +--- 17 --+         +-- 80
        //        |         |         |
        //        11     +- 29       73
        //               |
        //               22
        match self.right_of(node) {
            // 8 -> 11, 17 -> 22, 61 -> 73
            //
            // Everything in the right subtree is larger than node, and smaller
            // than any larger key outside of it.
            Some(right) => Some(self.min_of(right)),
            None => {
                // 3 -> 8, 29 -> 40, 80 -> None
                //
                // Climb while we are a right child. The first ancestor we reach
                // from its left side is the successor.
                let mut node_parent = self.parent_of(node);
                while let Some(parent) = node_parent {
                    if self.left_of(parent) == Some(node) {
                        break;
                    }
                    node = parent;
                    node_parent = self.parent_of(node);
                }

                node_parent
            }
        }
    }

    /// Returns the node with the largest key smaller than `node`'s key.
    ///
    /// `None` if `node` holds the minimum or the handle is stale.
    pub fn predecessor(&self, node: NodeRef) -> Option<NodeRef> {
        let node = self.resolve(node)?;
        self.predecessor_index(node).map(|node| self.handle(node))
    }

    fn predecessor_index(&self, mut node: usize) -> Option<usize> {
        // Mirror of `successor_index`.
        match self.left_of(node) {
            Some(left) => Some(self.max_of(left)),
            None => {
                let mut node_parent = self.parent_of(node);
                while let Some(parent) = node_parent {
                    if self.right_of(parent) == Some(node) {
                        break;
                    }
                    node = parent;
                    node_parent = self.parent_of(node);
                }

                node_parent
            }
        }
    }

    /// Promotes `pivot` over its parent. `pivot` must be a right child.
    pub(crate) fn rotate_left(&mut self, pivot: usize) {
        //       g                         g
        //       |                         |
        //  +--- p ---+              +-- pivot --+
        //  |         |      -->     |           |
        //  a   +-- pivot --+     +- p -+        c
        //      |           |     |     |
        //      b           c     a     b
        // where a, b, c can be any subtrees
        let p = match self.parent_of(pivot) {
            Some(p) => p,
            None => unreachable!("rotation pivot {pivot} has no parent"),
        };
        debug_assert_eq!(self.right_of(p), Some(pivot));

        // attach b to p
        let b = self.left_of(pivot);
        self.set_right(p, b);
        if let Some(b) = b {
            self.set_parent(b, Some(p));
        }

        // attach pivot to g
        self.replace_subtree(p, Some(pivot));

        // attach p to pivot
        self.set_left(pivot, Some(p));
        self.set_parent(p, Some(pivot));
    }

    /// Promotes `pivot` over its parent. `pivot` must be a left child.
    pub(crate) fn rotate_right(&mut self, pivot: usize) {
        //             g                   g
        //             |                   |
        //        +--- p ---+        +-- pivot --+
        //        |         |  -->   |           |
        //  +-- pivot --+   c        a        +- p -+
        //  |           |                     |     |
        //  a           b                     b     c
        // where a, b, c can be any subtrees
        let p = match self.parent_of(pivot) {
            Some(p) => p,
            None => unreachable!("rotation pivot {pivot} has no parent"),
        };
        debug_assert_eq!(self.left_of(p), Some(pivot));

        // attach b to p
        let b = self.right_of(pivot);
        self.set_left(p, b);
        if let Some(b) = b {
            self.set_parent(b, Some(p));
        }

        // attach pivot to g
        self.replace_subtree(p, Some(pivot));

        // attach p to pivot
        self.set_right(pivot, Some(p));
        self.set_parent(p, Some(pivot));
    }

    /// Makes the parent of `old` (or the root slot) point to `new` and `new`
    /// point back to that parent. `old`'s own links are left untouched.
    fn replace_subtree(&mut self, old: usize, new: Option<usize>) {
        let parent = self.parent_of(old);
        match parent {
            None => self.root = new,
            Some(p) if self.left_of(p) == Some(old) => self.set_left(p, new),
            Some(p) => self.set_right(p, new),
        }

        if let Some(new) = new {
            self.set_parent(new, parent);
        }
    }

    /// Inserts `key` and returns a handle to its node.
    ///
    /// If an equal key is already stored the tree is left untouched and
    /// [`Error::DuplicateKey`] is returned.
    pub fn insert(&mut self, key: K) -> Result<NodeRef, Error>
    where
        K: Ord,
    {
        // Move left/right down the tree until we find empty slot
        let mut parent = None;
        let mut pos = NodePos::Root;
        let mut maybe_node = self.root;
        while let Some(node) = maybe_node {
            parent = maybe_node;
            match key.cmp(&self.node(node).key) {
                Ordering::Less => {
                    pos = NodePos::Left;
                    maybe_node = self.left_of(node);
                }
                Ordering::Equal => {
                    debug!("insert rejected, key already present");
                    return Err(Error::DuplicateKey);
                }
                Ordering::Greater => {
                    pos = NodePos::Right;
                    maybe_node = self.right_of(node);
                }
            }
        }

        let mut new_node = Node::new(key);
        new_node.parent = parent;
        // new_node is a leaf, it cannot have left or right subtrees
        let new_node = self.alloc(new_node);
        match (parent, pos) {
            (Some(parent), NodePos::Left) => self.set_left(parent, Some(new_node)),
            (Some(parent), _) => self.set_right(parent, Some(new_node)),
            (None, _) => self.root = Some(new_node),
        }

        self.len += 1;
        self.insert_fixup(new_node);
        Ok(self.handle(new_node))
    }

    fn insert_fixup(&mut self, new_node: usize) {
        let mut node = new_node;
        loop {
            let mut parent = match self.parent_of(node) {
                None => {
                    // node is the root, which is always black
                    self.set_color(node, Color::Black);
                    break;
                }
                Some(parent) if self.node(parent).color.is_black() => break,
                Some(parent) => parent,
            };

            // A red parent with a red child is the only violation left at this
            // point. The red parent cannot be the root, so the grand parent exists.
            debug_assert!(self.node(node).color.is_red());
            let grand_parent = match self.parent_of(parent) {
                Some(grand_parent) => grand_parent,
                None => unreachable!("red node {parent} is the root"),
            };
            debug_assert!(self.node(grand_parent).color.is_black());

            let parent_pos = self.pos(parent);
            let uncle = match parent_pos {
                NodePos::Left => self.right_of(grand_parent),
                NodePos::Right => self.left_of(grand_parent),
                NodePos::Root => unreachable!(),
            };

            if let Some(uncle) = uncle.filter(|&uncle| self.node(uncle).color.is_red()) {
                //     +--- gp:b ---+               +--- gp:r ---+
                //     |            |               |            |
                //  + p:r +      + u:r +   -->   + p:b +      + u:b +
                //  |     |      |     |         |     |      |     |
                // n:r   a:b    b:b   c:b       n:r   a:b    b:b   c:b
                //
                // Black heights are unchanged, but gp may now have a red parent.
                // Repeat with gp as the offending node.
                trace!("insert fixup: red uncle, recoloring and moving up");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grand_parent, Color::Red);
                node = grand_parent;
                continue;
            }

            match parent_pos {
                NodePos::Left => {
                    if let NodePos::Right = self.pos(node) {
                        //       +-- gp:b --+                 +-- gp:b --+
                        //       |          |                 |          |
                        //  +-- p:r --+    u:b  -->       +- n:r --+    u:b
                        //  |         |                   |        |
                        // a:b    +- n:r -+           +- p:r -+   c:b
                        //        |       |           |       |
                        //       b:b     c:b         a:b     b:b
                        //
                        // straighten the zig-zag, then n and p trade roles
                        trace!("insert fixup: inner grandchild, rotating left");
                        self.rotate_left(node);
                        mem::swap(&mut parent, &mut node);
                    }

                    //           +-- gp:b --+            +----- p:b -----+
                    //           |          |            |               |
                    //      +-- p:r --+    u:b  -->   +- n:r -+     +- gp:r -+
                    //      |         |               |       |     |        |
                    //  +- n:r -+    c:b             a:b     b:b   c:b      u:b
                    //  |       |
                    // a:b     b:b
                    trace!("insert fixup: outer grandchild, rotating right");
                    self.set_color(parent, Color::Black);
                    self.set_color(grand_parent, Color::Red);
                    self.rotate_right(parent);
                }
                NodePos::Right => {
                    if let NodePos::Left = self.pos(node) {
                        trace!("insert fixup: inner grandchild, rotating right");
                        self.rotate_right(node);
                        mem::swap(&mut parent, &mut node);
                    }

                    trace!("insert fixup: outer grandchild, rotating left");
                    self.set_color(parent, Color::Black);
                    self.set_color(grand_parent, Color::Red);
                    self.rotate_left(parent);
                }
                NodePos::Root => unreachable!(),
            }

            // parent is now a black subtree root, nothing above it changed
            break;
        }
    }

    /// Removes `node` from the tree and returns its key.
    ///
    /// If `node` has two children its key is swapped with the key of its
    /// in-order predecessor and the predecessor's node is the one unlinked.
    /// `node` therefore stays valid (holding the predecessor's key) while
    /// handles to the predecessor become stale.
    ///
    /// Handles of nodes that were already removed yield [`Error::StaleNode`].
    /// Passing a handle obtained from a different tree is a caller error; it
    /// either fails the same way or removes an unrelated node of this tree.
    pub fn delete(&mut self, node: NodeRef) -> Result<K, Error> {
        let mut node = match self.resolve(node) {
            Some(node) => node,
            None => {
                debug!("delete rejected, stale node handle {node:?}");
                return Err(Error::StaleNode);
            }
        };

        //       +-------- 40 --------+
        //       |                    |
        // +---- 8 ----+              61 --+
        // |           |                   |
        // 3      +--- 17 --+         +-- 80
        //        |         |         |
        //        11     +- 29       73
        //               |
        //               22
        if let (Some(left), Some(_)) = (self.left_of(node), self.right_of(node)) {
            // 8 -> 3, 17 -> 11, 40 -> 29
            //
            // The predecessor is the maximum of the left subtree, so it has no
            // right child. Moving its key up keeps the in-order sequence intact
            // and leaves a node with at most one child to unlink.
            let predecessor = self.max_of(left);
            debug!("deleting node with two children through its predecessor");
            self.swap_keys(node, predecessor);
            node = predecessor;
        }

        // 3, 11, 22, 61, 80 -> `node` has at most one child which takes its place
        let replacement = self.left_of(node).or(self.right_of(node));
        let parent = self.parent_of(node);
        self.replace_subtree(node, replacement);

        let removed = self.release(node);
        self.len -= 1;
        self.delete_fixup(removed.color, replacement, parent);
        Ok(removed.key)
    }

    /// Removes the node holding `key`, if any, and returns the stored key.
    pub fn delete_key<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.search(key)?;
        self.delete(node).ok()
    }

    /// `x` is the subtree that took the place of a removed node of color
    /// `removed_color`, `x_parent` is the parent of that place.
    fn delete_fixup(
        &mut self,
        removed_color: Color,
        mut x: Option<usize>,
        mut x_parent: Option<usize>,
    ) {
        // Removing a red node changes no black height.
        if removed_color.is_red() {
            return;
        }

        // A red replacement can absorb the lost black.
        if let Some(x) = x.filter(|&x| self.node(x).color.is_red()) {
            self.set_color(x, Color::Black);
            return;
        }

        // Every path through x is now one black node short. If x is the root
        // the deficit is shared by all paths and there is nothing to fix.
        while let Some(p) = x_parent {
            // x's sibling must exist: before the removal the paths through x
            // had at least one black node more than x has now, the sibling side
            // still has them.
            //
            // If x is absent, `left_of(p) == x` is true exactly when the
            // sibling hangs on the right.
            if self.left_of(p) == x {
                let mut sibling = match self.right_of(p) {
                    Some(sibling) => sibling,
                    None => unreachable!("doubly black node without a sibling"),
                };

                if self.node(sibling).color.is_red() {
                    //     +--- p:b ---+                +--- p:r ---+                    +--- s:b ---+
                    //     |           |                |           |                    |           |
                    // +- x:b -+   +- s:r -+   -->  +- x:b -+   +- s:b -+   -->      +- p:r -+      d:b
                    // |       |   |       |        |       |   |       |            |       |
                    // a       b  c:b     d:b       a       b  c:b     d:b       +- x:b -+  c:b
                    //                                                           |       |
                    //                                                           a       b
                    // x still lacks a black node, but now has a red parent and
                    // a black sibling, which one of the cases below resolves.
                    trace!("delete fixup: red sibling, rotating left");
                    debug_assert!(self.node(p).color.is_black());
                    self.set_color(sibling, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(sibling);
                    sibling = match self.right_of(p) {
                        Some(sibling) => sibling,
                        None => unreachable!("red sibling without black children"),
                    };
                }

                debug_assert!(self.node(sibling).color.is_black());
                let near = self.left_of(sibling);
                let far = self.right_of(sibling);

                if self.color_of(near).is_black() && self.color_of(far).is_black() {
                    //     +--- p:c ---+                +--- p:c ---+
                    //     |           |                |           |
                    // +- x:b -+   +- s:b -+   -->  +- x:b -+   +- s:r -+
                    // |       |   |       |        |       |   |       |
                    // a       b  c:b     d:b       a       b  c:b     d:b
                    //
                    // Both subtrees of p are now short by one. A red p pays for
                    // it by turning black, a black p passes the deficit up.
                    self.set_color(sibling, Color::Red);
                    if self.node(p).color.is_red() {
                        trace!("delete fixup: black nephews, red parent absorbs deficit");
                        self.set_color(p, Color::Black);
                        return;
                    }
                    trace!("delete fixup: black nephews, moving deficit up");
                    x = Some(p);
                    x_parent = self.parent_of(p);
                    continue;
                }

                if self.color_of(far).is_black() {
                    //    +----- p:c -----+                +--- p:c ---+
                    //    |               |                |           |
                    // +- x:b -+      +- s:b -+   -->  +- x:b -+   +- c:b -+
                    // |       |      |       |        |       |   |       |
                    // a       b  +- c:r -+  d:b       a       b   e   +- s:r -+
                    //            |       |                            |       |
                    //            e       f                            f      d:b
                    // near nephew is red, turn it into the far red case
                    trace!("delete fixup: red near nephew, rotating right");
                    let near = match near {
                        Some(near) => near,
                        None => unreachable!(),
                    };
                    self.set_color(near, Color::Black);
                    self.set_color(sibling, Color::Red);
                    self.rotate_right(near);
                    sibling = near;
                }

                //     +--- p:c ---+                     +-- s:c --+
                //     |           |                     |         |
                // +- x:b -+   +- s:b -+   -->       +- p:b -+    d:b
                // |       |   |       |             |       |
                // a       b  c:?     d:r        +- x:b -+  c:?
                //                               |       |
                //                               a       b
                // x gains a black ancestor, d's paths keep theirs through its
                // own recoloring. The subtree root keeps p's old color.
                trace!("delete fixup: red far nephew, rotating left");
                let far = match self.right_of(sibling) {
                    Some(far) => far,
                    None => unreachable!(),
                };
                let parent_color = self.node(p).color;
                self.set_color(sibling, parent_color);
                self.set_color(p, Color::Black);
                self.set_color(far, Color::Black);
                self.rotate_left(sibling);
                return;
            } else {
                // same as the branch above with left/right switched
                let mut sibling = match self.left_of(p) {
                    Some(sibling) => sibling,
                    None => unreachable!("doubly black node without a sibling"),
                };

                if self.node(sibling).color.is_red() {
                    trace!("delete fixup: red sibling, rotating right");
                    debug_assert!(self.node(p).color.is_black());
                    self.set_color(sibling, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(sibling);
                    sibling = match self.left_of(p) {
                        Some(sibling) => sibling,
                        None => unreachable!("red sibling without black children"),
                    };
                }

                debug_assert!(self.node(sibling).color.is_black());
                let near = self.right_of(sibling);
                let far = self.left_of(sibling);

                if self.color_of(near).is_black() && self.color_of(far).is_black() {
                    self.set_color(sibling, Color::Red);
                    if self.node(p).color.is_red() {
                        trace!("delete fixup: black nephews, red parent absorbs deficit");
                        self.set_color(p, Color::Black);
                        return;
                    }
                    trace!("delete fixup: black nephews, moving deficit up");
                    x = Some(p);
                    x_parent = self.parent_of(p);
                    continue;
                }

                if self.color_of(far).is_black() {
                    trace!("delete fixup: red near nephew, rotating left");
                    let near = match near {
                        Some(near) => near,
                        None => unreachable!(),
                    };
                    self.set_color(near, Color::Black);
                    self.set_color(sibling, Color::Red);
                    self.rotate_left(near);
                    sibling = near;
                }

                trace!("delete fixup: red far nephew, rotating right");
                let far = match self.left_of(sibling) {
                    Some(far) => far,
                    None => unreachable!(),
                };
                let parent_color = self.node(p).color;
                self.set_color(sibling, parent_color);
                self.set_color(p, Color::Black);
                self.set_color(far, Color::Black);
                self.rotate_right(sibling);
                return;
            }
        }
    }
}
