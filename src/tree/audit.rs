// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::node::{Color, NodeId, NIL};
use super::slot::{Op, OpSlot};
use super::OpTree;
use crate::Error;

impl<T> OpTree<T> {
    /// Validates every structural invariant of the tree.
    ///
    /// Checks red–black validity, strict effective-key ordering, subtree
    /// index-balance sums, slot legality, parent-link consistency and the
    /// tracked height bound. Intended for tests and debugging; the check
    /// does not mutate the tree (effective keys are derived by
    /// accumulating unpushed shifts instead of pushing them down).
    ///
    /// # Errors
    ///
    /// Returns the violated invariant; the tree must then be discarded.
    pub fn check_invariants(&self) -> crate::Result<()> {
        let sentinel = self.node(NIL);
        if sentinel.shift != 0 || sentinel.balance != 0 {
            return Err(Error::Corrupted("sentinel carries augmentation data"));
        }
        if sentinel.color != Color::Black {
            return Err(Error::Corrupted("sentinel is not black"));
        }

        let root = self.root_id();
        if root == NIL {
            return Ok(());
        }
        if self.node(root).color != Color::Black {
            return Err(Error::Corrupted("root is not black"));
        }
        if self.node(root).parent != NIL {
            return Err(Error::Corrupted("root has a parent"));
        }

        let mut prev_key = None;
        let (_, height) = self.audit_walk(root, 0, &mut prev_key)?;

        let bound = self.height_bound();
        if height > bound + 1 {
            return Err(Error::HeightOutOfBounds(height, bound));
        }

        Ok(())
    }

    /// Returns (black height, height) of the subtree at `id`.
    fn audit_walk(
        &self,
        id: NodeId,
        shift_acc: i64,
        prev_key: &mut Option<i64>,
    ) -> crate::Result<(usize, usize)> {
        if id == NIL {
            return Ok((1, 0));
        }

        let node = self.node(id);
        let shift_acc = shift_acc + node.shift;

        if node.color == Color::Red
            && (self.node(node.left).color == Color::Red
                || self.node(node.right).color == Color::Red)
        {
            return Err(Error::Corrupted("red vertex has a red child"));
        }

        match &node.slot {
            OpSlot::Single(Op::Remove { count: 0 }) => {
                return Err(Error::Corrupted("zero-length remove run"));
            }
            OpSlot::Paired { count: 0, .. } => {
                return Err(Error::Corrupted("zero-length remove run in a pair"));
            }
            _ => {}
        }

        let expected = node.slot.weight()
            + self.node(node.left).balance
            + self.node(node.right).balance;
        if node.balance != expected {
            return Err(Error::Corrupted("subtree index balance out of sync"));
        }

        for child in [node.left, node.right] {
            if child != NIL && self.node(child).parent != id {
                return Err(Error::Corrupted("parent link out of sync"));
            }
        }

        let (left_black, left_height) = self.audit_walk(node.left, shift_acc, prev_key)?;

        let effective = node.key + shift_acc;
        if prev_key.is_some_and(|prev| prev >= effective) {
            return Err(Error::Corrupted("effective keys not strictly increasing"));
        }
        *prev_key = Some(effective);

        let (right_black, right_height) = self.audit_walk(node.right, shift_acc, prev_key)?;

        if left_black != right_black {
            return Err(Error::Corrupted("black height differs between paths"));
        }

        let black = left_black + usize::from(node.color == Color::Black);
        Ok((black, 1 + left_height.max(right_height)))
    }
}
