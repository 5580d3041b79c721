// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Rotations and red–black fix-ups.
//!
//! Every rotation first pushes the lazy key shift down on both pivots,
//! then re-derives their subtree index balances from the new child
//! subtrees. The delete fix-up tracks the parent explicitly, so the
//! sentinel never needs a writable parent field.

use super::node::{Color, NodeId, NIL};
use super::OpTree;
use crate::Error;

impl<T> OpTree<T> {
    /// Left-rotates around `x`, promoting its right child.
    ///
    /// Rotation invariant: the promoted child must not be the sentinel.
    pub(super) fn rotate_left(&mut self, x: NodeId) -> crate::Result<()> {
        let y = self.node(x).right;
        if y == NIL {
            return Err(Error::SentinelRotation);
        }

        self.push_down(x);
        self.push_down(y);

        // re-derive subtree balances before relinking
        let x_balance = self.node(x).balance;
        let y_balance = self.node(y).balance;
        let y_left = self.node(y).left;
        let y_left_balance = self.node(y_left).balance;
        self.node_mut(x).balance = x_balance + y_left_balance - y_balance;
        self.node_mut(y).balance = x_balance;

        self.node_mut(x).right = y_left;
        if y_left != NIL {
            self.node_mut(y_left).parent = x;
        }

        let parent = self.node(x).parent;
        self.node_mut(y).parent = parent;
        if parent == NIL {
            self.set_root(y);
        } else if self.node(parent).left == x {
            self.node_mut(parent).left = y;
        } else {
            self.node_mut(parent).right = y;
        }

        self.node_mut(y).left = x;
        self.node_mut(x).parent = y;
        Ok(())
    }

    /// Right-rotates around `x`, promoting its left child.
    ///
    /// Rotation invariant: the promoted child must not be the sentinel.
    pub(super) fn rotate_right(&mut self, x: NodeId) -> crate::Result<()> {
        let y = self.node(x).left;
        if y == NIL {
            return Err(Error::SentinelRotation);
        }

        self.push_down(x);
        self.push_down(y);

        let x_balance = self.node(x).balance;
        let y_balance = self.node(y).balance;
        let y_right = self.node(y).right;
        let y_right_balance = self.node(y_right).balance;
        self.node_mut(x).balance = x_balance + y_right_balance - y_balance;
        self.node_mut(y).balance = x_balance;

        self.node_mut(x).left = y_right;
        if y_right != NIL {
            self.node_mut(y_right).parent = x;
        }

        let parent = self.node(x).parent;
        self.node_mut(y).parent = parent;
        if parent == NIL {
            self.set_root(y);
        } else if self.node(parent).left == x {
            self.node_mut(parent).left = y;
        } else {
            self.node_mut(parent).right = y;
        }

        self.node_mut(y).right = x;
        self.node_mut(x).parent = y;
        Ok(())
    }

    /// Restores the red–black properties after attaching the Red vertex
    /// `z`.
    pub(super) fn insert_fixup(&mut self, mut z: NodeId) -> crate::Result<()> {
        loop {
            let parent = self.node(z).parent;
            if self.node(parent).color == Color::Black {
                break;
            }
            let grandparent = self.node(parent).parent;

            if parent == self.node(grandparent).left {
                let uncle = self.node(grandparent).right;
                if self.node(uncle).color == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    z = grandparent;
                } else {
                    if z == self.node(parent).right {
                        z = parent;
                        self.rotate_left(z)?;
                    }
                    let parent = self.node(z).parent;
                    let grandparent = self.node(parent).parent;
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_right(grandparent)?;
                }
            } else {
                let uncle = self.node(grandparent).left;
                if self.node(uncle).color == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    z = grandparent;
                } else {
                    if z == self.node(parent).left {
                        z = parent;
                        self.rotate_right(z)?;
                    }
                    let parent = self.node(z).parent;
                    let grandparent = self.node(parent).parent;
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_left(grandparent)?;
                }
            }
        }

        let root = self.root_id();
        self.set_color(root, Color::Black);
        Ok(())
    }

    /// Replaces the subtree rooted at `u` with the one rooted at `v`.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let parent = self.node(u).parent;
        if parent == NIL {
            self.set_root(v);
        } else if self.node(parent).left == u {
            self.node_mut(parent).left = v;
        } else {
            self.node_mut(parent).right = v;
        }
        if v != NIL {
            self.node_mut(v).parent = parent;
        }
    }

    /// Physically deletes `z`, keeping all augmentations consistent.
    ///
    /// The victim's weight is subtracted from every ancestor. The
    /// two-children case copies the in-order successor's key and
    /// operations into the victim (the successor walk pushes shifts down;
    /// an unpushed shift on either participant at the splice is a
    /// consistency failure), then splices the successor out.
    pub(super) fn remove_node(&mut self, z: NodeId) -> crate::Result<()> {
        self.push_down(z);
        let z_weight = self.node(z).slot.weight();
        self.propagate_balance(z, -z_weight);

        let z_left = self.node(z).left;
        let z_right = self.node(z).right;

        let removed_color;
        let fix_parent;
        let fix_child;
        let freed;
        if z_left == NIL {
            removed_color = self.node(z).color;
            fix_parent = self.node(z).parent;
            fix_child = z_right;
            self.transplant(z, z_right);
            freed = z;
        } else if z_right == NIL {
            removed_color = self.node(z).color;
            fix_parent = self.node(z).parent;
            fix_child = z_left;
            self.transplant(z, z_left);
            freed = z;
        } else {
            let mut s = z_right;
            self.push_down(s);
            loop {
                let left = self.node(s).left;
                if left == NIL {
                    break;
                }
                s = left;
                self.push_down(s);
            }
            if self.node(z).shift != 0 || self.node(s).shift != 0 {
                return Err(Error::DanglingKeyShift);
            }

            let s_weight = self.node(s).slot.weight();
            self.propagate_balance(s, -s_weight);

            let slot = std::mem::replace(
                &mut self.node_mut(s).slot,
                super::slot::OpSlot::placeholder(),
            );
            let key = self.node(s).key;
            {
                let victim = self.node_mut(z);
                victim.key = key;
                victim.slot = slot;
            }
            self.propagate_balance(z, s_weight);

            // the successor has no left child; splice it out
            removed_color = self.node(s).color;
            fix_parent = self.node(s).parent;
            fix_child = self.node(s).right;
            self.transplant(s, fix_child);
            freed = s;
        }

        self.release(freed);
        if removed_color == Color::Black {
            self.delete_fixup(fix_parent, fix_child)?;
        }
        Ok(())
    }

    /// Textbook red–black delete fix-up on the child that replaced the
    /// removed vertex. `x` may be the sentinel; its position is pinned by
    /// `parent`.
    fn delete_fixup(&mut self, mut parent: NodeId, mut x: NodeId) -> crate::Result<()> {
        while x != self.root_id() && self.node(x).color == Color::Black {
            if parent == NIL {
                return Err(Error::Corrupted("delete fix-up lost its parent"));
            }

            if x == self.node(parent).left {
                let mut sibling = self.node(parent).right;
                if self.node(sibling).color == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent)?;
                    sibling = self.node(parent).right;
                }
                if sibling == NIL {
                    return Err(Error::Corrupted("black-height violation: nil sibling"));
                }

                let near = self.node(sibling).left;
                let far = self.node(sibling).right;
                if self.node(near).color == Color::Black && self.node(far).color == Color::Black {
                    self.set_color(sibling, Color::Red);
                    x = parent;
                    parent = self.node(x).parent;
                } else {
                    if self.node(far).color == Color::Black {
                        self.set_color(near, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling)?;
                        sibling = self.node(parent).right;
                    }
                    let parent_color = self.node(parent).color;
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let far = self.node(sibling).right;
                    self.set_color(far, Color::Black);
                    self.rotate_left(parent)?;
                    x = self.root_id();
                    parent = NIL;
                }
            } else {
                let mut sibling = self.node(parent).left;
                if self.node(sibling).color == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent)?;
                    sibling = self.node(parent).left;
                }
                if sibling == NIL {
                    return Err(Error::Corrupted("black-height violation: nil sibling"));
                }

                let near = self.node(sibling).right;
                let far = self.node(sibling).left;
                if self.node(near).color == Color::Black && self.node(far).color == Color::Black {
                    self.set_color(sibling, Color::Red);
                    x = parent;
                    parent = self.node(x).parent;
                } else {
                    if self.node(far).color == Color::Black {
                        self.set_color(near, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling)?;
                        sibling = self.node(parent).left;
                    }
                    let parent_color = self.node(parent).color;
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let far = self.node(sibling).left;
                    self.set_color(far, Color::Black);
                    self.rotate_right(parent)?;
                    x = self.root_id();
                    parent = NIL;
                }
            }
        }

        self.set_color(x, Color::Black);
        Ok(())
    }
}
