// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The operation tree: an order-statistic red–black tree holding pending
//! positional edits, keyed by the element index the caller currently
//! observes.
//!
//! Two lazy augmentations ride along with the usual red–black metadata:
//!
//! - `shift`, an additive key modifier handed down a subtree at a time, so
//!   an edit can re-index everything to its right in O(1);
//! - `balance`, the net number of elements a subtree's pending operations
//!   add to the sequence, which turns index translation into an
//!   order-statistic query.
//!
//! The single discipline that keeps both sound: push before you observe or
//! restructure.

mod audit;
mod drain;
mod node;
mod rebalance;
mod slot;

pub use drain::{Drain, OpRecord};

use crate::Error;
use node::{Color, Node, NodeId, NIL};
use slot::{Fuse, Op, OpSlot};

/// Result of a point lookup against the pending operations.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    /// The element at the queried index is pending in the tree.
    Pending(&'a T),
    /// The element is not affected by pending operations; it lives at this
    /// index of the committed storage.
    Committed(usize),
}

/// Red–black tree of pending positional edits over a committed sequence.
///
/// Records inserts, sets and removes keyed by the *current* index as seen
/// through all earlier pending edits, fusing colocated operations into a
/// single vertex. Vertices live in an arena; arena slot 0 is the sentinel
/// leaf.
pub struct OpTree<T> {
    nodes: Vec<Node<T>>,
    free: Vec<NodeId>,
    root: NodeId,
    len: usize,
}

impl<T> Default for OpTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OpTree<T> {
    /// Creates a new empty operation tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel()],
            free: Vec::new(),
            root: NIL,
            len: 0,
        }
    }

    /// Returns the number of vertices (fused edit sites) in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len
    }

    /// Returns `true` if no edits are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Net change in sequence length due to all pending operations.
    #[must_use]
    pub fn net_index_balance(&self) -> i64 {
        self.node(self.root).balance
    }

    /// Upper bound on the tree height: ⌊2·log₂(nodes + 1)⌋.
    ///
    /// Callers use this as a cheap performance indicator to decide when to
    /// settle pending edits into the backing storage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn height_bound(&self) -> usize {
        let m = (self.len as u128) + 1;
        (m * m).ilog2() as usize
    }

    /// Drops all pending operations.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.free.clear();
        self.root = NIL;
        self.len = 0;
    }

    #[allow(clippy::indexing_slicing)]
    fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.0]
    }

    #[allow(clippy::indexing_slicing)]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.0]
    }

    fn root_id(&self) -> NodeId {
        self.root
    }

    fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }

    /// Applies a vertex's lazy key shift to itself and hands it down to
    /// both children. Idempotent; a no-op on the sentinel.
    fn push_down(&mut self, id: NodeId) {
        if id == NIL {
            return;
        }
        let shift = self.node(id).shift;
        if shift == 0 {
            return;
        }
        let (left, right) = {
            let n = self.node_mut(id);
            n.key += shift;
            n.shift = 0;
            (n.left, n.right)
        };
        self.add_shift(left, shift);
        self.add_shift(right, shift);
    }

    /// Writes through the sentinel are silently discarded.
    fn add_shift(&mut self, id: NodeId, delta: i64) {
        if id != NIL {
            self.node_mut(id).shift += delta;
        }
    }

    /// Writes through the sentinel are silently discarded.
    fn set_color(&mut self, id: NodeId, color: Color) {
        if id != NIL {
            self.node_mut(id).color = color;
        }
    }

    /// Adds `delta` to the index balance of `from` and every ancestor.
    fn propagate_balance(&mut self, from: NodeId, delta: i64) {
        if delta == 0 {
            return;
        }
        let mut x = from;
        while x != NIL {
            self.node_mut(x).balance += delta;
            x = self.node(x).parent;
        }
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        self.len += 1;
        if let Some(id) = self.free.pop() {
            *self.node_mut(id) = node;
            id
        } else {
            let id = NodeId(self.nodes.len());
            self.nodes.push(node);
            id
        }
    }

    /// Returns an arena slot to the free list, dropping its payload.
    fn release(&mut self, id: NodeId) {
        debug_assert!(id != NIL, "released the sentinel");
        self.len -= 1;
        let n = self.node_mut(id);
        n.slot = OpSlot::placeholder();
        n.parent = NIL;
        n.left = NIL;
        n.right = NIL;
        self.free.push(id);
    }
}

impl<T: Clone> OpTree<T> {
    /// Records an insertion of `value` before the element currently at
    /// `key`. O(log n) expected.
    ///
    /// # Errors
    ///
    /// Returns an error on an internal consistency failure; the tree must
    /// then be discarded.
    pub fn apply_insert(&mut self, key: usize, value: T) -> crate::Result<()> {
        self.apply(key, Op::Insert(value))
    }

    /// Records an overwrite of the element currently at `key`. O(log n)
    /// expected.
    ///
    /// # Errors
    ///
    /// Returns an error on an internal consistency failure; the tree must
    /// then be discarded.
    pub fn apply_set(&mut self, key: usize, value: T) -> crate::Result<()> {
        self.apply(key, Op::Set(value))
    }

    /// Records a removal of the element currently at `key`. O(log n)
    /// expected.
    ///
    /// # Errors
    ///
    /// Returns an error on an internal consistency failure; the tree must
    /// then be discarded.
    pub fn apply_remove(&mut self, key: usize) -> crate::Result<()> {
        self.apply(key, Op::Remove { count: 1 })
    }

    /// Looks up the element at current index `key`.
    ///
    /// Pushes lazy shifts down along the descent (a benign mutation). The
    /// tree performs no range validation; it trusts its caller.
    #[allow(clippy::cast_sign_loss)]
    pub fn find(&mut self, key: usize) -> Lookup<'_, T> {
        #[allow(clippy::cast_possible_wrap)]
        let k = key as i64;
        let mut shift = 0i64;
        let mut c = self.root;

        while c != NIL {
            self.push_down(c);
            if k < self.node(c).key {
                c = self.node(c).left;
                continue;
            }

            let left = self.node(c).left;
            shift += self.node(left).balance + self.node(c).slot.weight();

            if k == self.node(c).key {
                debug_assert!(k - shift >= 0, "fallback index underflow");
                return match &self.node(c).slot {
                    // the Set always names the element visible at this key
                    OpSlot::Paired { value, .. }
                    | OpSlot::Single(Op::Insert(value) | Op::Set(value)) => {
                        Lookup::Pending(value)
                    }
                    // the element at `key` is among the removed run; what
                    // remains visible here is a committed element
                    OpSlot::Single(Op::Remove { .. }) => Lookup::Committed((k - shift) as usize),
                };
            }

            c = self.node(c).right;
        }

        debug_assert!(k - shift >= 0, "fallback index underflow");
        Lookup::Committed((k - shift) as usize)
    }

    fn apply(&mut self, key: usize, op: Op<T>) -> crate::Result<()> {
        #[allow(clippy::cast_possible_wrap)]
        let k = key as i64;
        let w = op.weight();
        let is_remove = matches!(op, Op::Remove { .. });

        if self.root == NIL {
            let id = self.alloc(Node::new(k, OpSlot::Single(op)));
            self.node_mut(id).color = Color::Black;
            self.node_mut(id).balance = w;
            self.root = id;
            return Ok(());
        }

        let mut c = self.root;
        let mut op = op;

        let target = loop {
            self.push_down(c);
            let ck = self.node(c).key;

            if k < ck {
                // everything from `c` rightwards moves by `w`
                if w != 0 {
                    let right = self.node(c).right;
                    self.add_shift(right, w);
                    self.node_mut(c).key += w;
                }
                let left = self.node(c).left;
                if left == NIL {
                    break self.attach(c, true, k, op, w)?;
                }
                c = left;
            } else if k == ck {
                // keys strictly greater than k always move by `w`
                if w != 0 {
                    let right = self.node(c).right;
                    self.add_shift(right, w);
                }

                let old_weight = self.node(c).slot.weight();
                match self.node_mut(c).slot.fuse(op)? {
                    Fuse::Fused => {
                        let delta = self.node(c).slot.weight() - old_weight;
                        self.propagate_balance(c, delta);
                        if is_remove {
                            self.absorb_duplicate(c)?;
                        }
                        return Ok(());
                    }
                    Fuse::Annihilated => {
                        // the slot still carries the cancelled Insert, so
                        // the deletion path subtracts the correct weight
                        return self.remove_node(c);
                    }
                    Fuse::Rejected(returned) => {
                        // an Insert at an occupied key shifts this vertex
                        // right and claims the key for itself
                        self.node_mut(c).key += w;
                        let left = self.node(c).left;
                        if left == NIL {
                            break self.attach(c, true, k, returned, w)?;
                        }
                        op = returned;
                        c = left;
                    }
                }
            } else {
                let right = self.node(c).right;
                if right == NIL {
                    break self.attach(c, false, k, op, w)?;
                }
                c = right;
            }
        };

        if is_remove {
            self.absorb_duplicate(target)?;
        }
        Ok(())
    }

    fn attach(
        &mut self,
        parent: NodeId,
        left_side: bool,
        key: i64,
        op: Op<T>,
        weight: i64,
    ) -> crate::Result<NodeId> {
        let id = self.alloc(Node::new(key, OpSlot::Single(op)));
        self.node_mut(id).parent = parent;
        if left_side {
            self.node_mut(parent).left = id;
        } else {
            self.node_mut(parent).right = id;
        }
        self.propagate_balance(id, weight);
        self.insert_fixup(id)?;
        Ok(id)
    }

    /// Re-merges a vertex whose key collapsed onto `x`'s after a removal.
    ///
    /// A Remove at key k re-indexes the vertex that sat at k + 1 down to
    /// k. If such a vertex exists it is the in-order successor of `x`: its
    /// operations are replayed into `x` through fusion, then it is
    /// deleted. The walk down into the right subtree pushes shifts
    /// explicitly (the equality step has just lazily re-indexed it); an
    /// up-walk successor must already be pushed.
    fn absorb_duplicate(&mut self, x: NodeId) -> crate::Result<()> {
        let k = self.node(x).key;

        let right = self.node(x).right;
        let succ = if right == NIL {
            let mut child = x;
            let mut p = self.node(x).parent;
            while p != NIL && self.node(p).right == child {
                child = p;
                p = self.node(p).parent;
            }
            if p != NIL && self.node(p).shift != 0 {
                return Err(Error::DanglingKeyShift);
            }
            p
        } else {
            let mut s = right;
            self.push_down(s);
            loop {
                let left = self.node(s).left;
                if left == NIL {
                    break;
                }
                s = left;
                self.push_down(s);
            }
            s
        };

        if succ == NIL || self.node(succ).key != k {
            return Ok(());
        }

        let (first, second) = self.node(succ).slot.to_ops();
        let old_weight = self.node(x).slot.weight();
        for op in std::iter::once(first).chain(second) {
            match self.node_mut(x).slot.fuse(op)? {
                Fuse::Fused => {}
                _ => return Err(Error::IllegalFusion),
            }
        }
        let delta = self.node(x).slot.weight() - old_weight;
        self.propagate_balance(x, delta);

        self.remove_node(succ)
    }
}
