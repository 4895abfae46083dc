//! An arena red-black tree without keys.
//!
//! The position of a value is decided by the caller (`insert_successor`), not by a comparator,
//! since the order of beach-line arcs depends on the sweep position. Every node is also threaded
//! with `prev`/`next` links, so in-order neighbors are O(1).
//!
//! Nodes are addressed by [`NodeIdx`] and never reused: a removed node keeps its value but is
//! detached from the tree.

use std::fmt::Debug;


pub type NodeIdx = u32;

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    parent: Option<NodeIdx>,
    left: Option<NodeIdx>,
    right: Option<NodeIdx>,
    prev: Option<NodeIdx>,
    next: Option<NodeIdx>,
    red: bool,
    linked: bool,
}

#[derive(Clone)]
pub struct RbTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<NodeIdx>,
    len: usize,
}

impl<T> Default for RbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RbTree<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        RbTree {
            nodes: Vec::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    /// Number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<NodeIdx> {
        self.root
    }

    pub fn get(&self, idx: NodeIdx) -> &T {
        &self.nodes[idx as usize].value
    }

    pub fn get_mut(&mut self, idx: NodeIdx) -> &mut T {
        &mut self.nodes[idx as usize].value
    }

    pub fn is_linked(&self, idx: NodeIdx) -> bool {
        self.nodes[idx as usize].linked
    }

    pub fn left(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.node(idx).left
    }

    pub fn right(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.node(idx).right
    }

    /// The in-order predecessor.
    pub fn prev(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.node(idx).prev
    }

    /// The in-order successor.
    pub fn next(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.node(idx).next
    }

    pub fn first(&self) -> Option<NodeIdx> {
        self.root.map(|r| self.leftmost(r))
    }

    /// Iterate the linked values in order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &T)> + '_ {
        std::iter::successors(self.first(), |&i| self.next(i)).map(|i| (i, self.get(i)))
    }

    fn node(&self, idx: NodeIdx) -> &Node<T> {
        &self.nodes[idx as usize]
    }

    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node<T> {
        &mut self.nodes[idx as usize]
    }

    fn is_red(&self, idx: Option<NodeIdx>) -> bool {
        idx.is_some_and(|i| self.node(i).red)
    }

    fn set_red(&mut self, idx: NodeIdx, red: bool) {
        self.node_mut(idx).red = red;
    }

    fn leftmost(&self, mut idx: NodeIdx) -> NodeIdx {
        while let Some(l) = self.node(idx).left {
            idx = l;
        }
        idx
    }

    /// Replace `old` by `new` in the child slot of `parent` (or as the root).
    fn replace_child(&mut self, parent: Option<NodeIdx>, old: NodeIdx, new: Option<NodeIdx>) {
        match parent {
            Some(p) if self.node(p).left == Some(old) => self.node_mut(p).left = new,
            Some(p) => self.node_mut(p).right = new,
            None => self.root = new,
        }
    }

    fn rotate_left(&mut self, p: NodeIdx) {
        let q = self.node(p).right.expect("rotate_left needs a right child");
        let parent = self.node(p).parent;
        self.replace_child(parent, p, Some(q));
        self.node_mut(q).parent = parent;
        self.node_mut(p).parent = Some(q);
        let inner = self.node(q).left;
        self.node_mut(p).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(p);
        }
        self.node_mut(q).left = Some(p);
    }

    fn rotate_right(&mut self, p: NodeIdx) {
        let q = self.node(p).left.expect("rotate_right needs a left child");
        let parent = self.node(p).parent;
        self.replace_child(parent, p, Some(q));
        self.node_mut(q).parent = parent;
        self.node_mut(p).parent = Some(q);
        let inner = self.node(q).right;
        self.node_mut(p).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(p);
        }
        self.node_mut(q).right = Some(p);
    }

    /// Insert `value` immediately after `after` in the in-order sequence. If `after` is `None`,
    /// the value becomes the first element.
    pub fn insert_successor(&mut self, after: Option<NodeIdx>, value: T) -> NodeIdx {
        let idx = self.nodes.len() as NodeIdx;
        self.nodes.push(Node {
            value,
            parent: None,
            left: None,
            right: None,
            prev: None,
            next: None,
            red: true,
            linked: true,
        });
        self.len += 1;

        let parent = if let Some(node) = after {
            debug_assert!(self.is_linked(node));
            let next = self.node(node).next;
            self.node_mut(idx).prev = Some(node);
            self.node_mut(idx).next = next;
            if let Some(next) = next {
                self.node_mut(next).prev = Some(idx);
            }
            self.node_mut(node).next = Some(idx);

            if let Some(right) = self.node(node).right {
                let p = self.leftmost(right);
                self.node_mut(p).left = Some(idx);
                Some(p)
            } else {
                self.node_mut(node).right = Some(idx);
                Some(node)
            }
        } else if let Some(root) = self.root {
            let first = self.leftmost(root);
            self.node_mut(idx).next = Some(first);
            self.node_mut(first).prev = Some(idx);
            self.node_mut(first).left = Some(idx);
            Some(first)
        } else {
            self.root = Some(idx);
            None
        };
        self.node_mut(idx).parent = parent;

        self.fix_insert(idx);
        idx
    }

    fn fix_insert(&mut self, mut node: NodeIdx) {
        while let Some(mut parent) = self.node(node).parent {
            if !self.node(parent).red {
                break;
            }
            // a red node is never the root, so it has a parent
            let Some(grandpa) = self.node(parent).parent else {
                break;
            };

            if self.node(grandpa).left == Some(parent) {
                let uncle = self.node(grandpa).right;
                if let Some(uncle) = uncle.filter(|&u| self.node(u).red) {
                    self.set_red(parent, false);
                    self.set_red(uncle, false);
                    self.set_red(grandpa, true);
                    node = grandpa;
                } else {
                    if self.node(parent).right == Some(node) {
                        self.rotate_left(parent);
                        node = parent;
                        parent = self.node(node).parent.unwrap_or(grandpa);
                    }
                    self.set_red(parent, false);
                    self.set_red(grandpa, true);
                    self.rotate_right(grandpa);
                }
            } else {
                let uncle = self.node(grandpa).left;
                if let Some(uncle) = uncle.filter(|&u| self.node(u).red) {
                    self.set_red(parent, false);
                    self.set_red(uncle, false);
                    self.set_red(grandpa, true);
                    node = grandpa;
                } else {
                    if self.node(parent).left == Some(node) {
                        self.rotate_right(parent);
                        node = parent;
                        parent = self.node(node).parent.unwrap_or(grandpa);
                    }
                    self.set_red(parent, false);
                    self.set_red(grandpa, true);
                    self.rotate_left(grandpa);
                }
            }
        }

        if let Some(root) = self.root {
            self.set_red(root, false);
        }
    }

    /// Unlink `idx` from the tree. Its value stays readable through [`RbTree::get`].
    pub fn remove(&mut self, idx: NodeIdx) {
        debug_assert!(self.is_linked(idx), "node {idx} removed twice");
        if !self.is_linked(idx) {
            return;
        }

        let (prev, next) = (self.node(idx).prev, self.node(idx).next);
        if let Some(next) = next {
            self.node_mut(next).prev = prev;
        }
        if let Some(prev) = prev {
            self.node_mut(prev).next = next;
        }

        let node = self.node(idx);
        let (parent, left, right, red) = (node.parent, node.left, node.right, node.red);

        let successor = match (left, right) {
            (None, _) => right,
            (_, None) => left,
            (Some(_), Some(right)) => Some(self.leftmost(right)),
        };
        self.replace_child(parent, idx, successor);

        // `child` takes the place of the removed (or moved) node, under `parent`.
        let (removed_red, child, mut parent) = match (left, right, successor) {
            (Some(left), Some(right), Some(next)) => {
                let next_red = self.node(next).red;
                self.node_mut(next).red = red;
                self.node_mut(next).left = Some(left);
                self.node_mut(left).parent = Some(next);
                if next != right {
                    let next_parent = self.node(next).parent;
                    self.node_mut(next).parent = parent;
                    let child = self.node(next).right;
                    if let Some(np) = next_parent {
                        self.node_mut(np).left = child;
                    }
                    self.node_mut(next).right = Some(right);
                    self.node_mut(right).parent = Some(next);
                    (next_red, child, next_parent)
                } else {
                    self.node_mut(next).parent = parent;
                    (next_red, self.node(next).right, Some(next))
                }
            }
            _ => (red, successor, parent),
        };

        if let Some(child) = child {
            self.node_mut(child).parent = parent;
        }

        {
            let node = self.node_mut(idx);
            node.linked = false;
            node.parent = None;
            node.left = None;
            node.right = None;
            node.prev = None;
            node.next = None;
        }
        self.len -= 1;

        if removed_red {
            return;
        }
        if let Some(child) = child.filter(|&c| self.node(c).red) {
            self.set_red(child, false);
            return;
        }

        let mut node = child;
        loop {
            if node == self.root {
                break;
            }
            let Some(p) = parent else {
                break;
            };

            let sibling = if self.node(p).left == node {
                let mut sibling = self.node(p).right.expect("black height violated");
                if self.node(sibling).red {
                    self.set_red(sibling, false);
                    self.set_red(p, true);
                    self.rotate_left(p);
                    sibling = self.node(p).right.expect("black height violated");
                }
                let (sl, sr) = (self.node(sibling).left, self.node(sibling).right);
                if self.is_red(sl) || self.is_red(sr) {
                    if !self.is_red(sr) {
                        if let Some(sl) = sl {
                            self.set_red(sl, false);
                        }
                        self.set_red(sibling, true);
                        self.rotate_right(sibling);
                        sibling = self.node(p).right.expect("black height violated");
                    }
                    let parent_red = self.node(p).red;
                    self.set_red(sibling, parent_red);
                    self.set_red(p, false);
                    if let Some(sr) = self.node(sibling).right {
                        self.set_red(sr, false);
                    }
                    self.rotate_left(p);
                    node = self.root;
                    break;
                }
                sibling
            } else {
                let mut sibling = self.node(p).left.expect("black height violated");
                if self.node(sibling).red {
                    self.set_red(sibling, false);
                    self.set_red(p, true);
                    self.rotate_right(p);
                    sibling = self.node(p).left.expect("black height violated");
                }
                let (sl, sr) = (self.node(sibling).left, self.node(sibling).right);
                if self.is_red(sl) || self.is_red(sr) {
                    if !self.is_red(sl) {
                        if let Some(sr) = sr {
                            self.set_red(sr, false);
                        }
                        self.set_red(sibling, true);
                        self.rotate_left(sibling);
                        sibling = self.node(p).left.expect("black height violated");
                    }
                    let parent_red = self.node(p).red;
                    self.set_red(sibling, parent_red);
                    self.set_red(p, false);
                    if let Some(sl) = self.node(sibling).left {
                        self.set_red(sl, false);
                    }
                    self.rotate_right(p);
                    node = self.root;
                    break;
                }
                sibling
            };

            self.set_red(sibling, true);
            node = Some(p);
            parent = self.node(p).parent;
            if self.node(p).red {
                break;
            }
        }

        if let Some(node) = node {
            self.set_red(node, false);
        }
    }

    /// Check the red-black and threading invariants. Returns the black height.
    #[cfg(test)]
    fn check(&self) -> usize {
        fn walk<T>(tree: &RbTree<T>, idx: Option<NodeIdx>, out: &mut Vec<NodeIdx>) -> usize {
            let Some(i) = idx else {
                return 1;
            };
            let node = tree.node(i);
            assert!(node.linked);
            if node.red {
                assert!(!tree.is_red(node.left), "red node {i} has a red child");
                assert!(!tree.is_red(node.right), "red node {i} has a red child");
            }
            for child in [node.left, node.right].into_iter().flatten() {
                assert_eq!(tree.node(child).parent, Some(i));
            }
            let lh = walk(tree, node.left, out);
            out.push(i);
            let rh = walk(tree, node.right, out);
            assert_eq!(lh, rh, "black height differs under {i}");
            lh + usize::from(!node.red)
        }

        assert!(!self.is_red(self.root));
        let mut in_order = Vec::new();
        let height = walk(self, self.root, &mut in_order);
        let threaded = self.iter().map(|(i, _)| i).collect::<Vec<_>>();
        assert_eq!(in_order, threaded);
        assert_eq!(in_order.len(), self.len);
        height
    }
}

impl<T: Debug> Debug for RbTree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(|(_, v)| v)).finish()
    }
}
