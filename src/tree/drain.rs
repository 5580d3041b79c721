// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::node::{NodeId, NIL};
use super::slot::{Op, OpSlot};
use super::OpTree;

/// A pending operation as emitted by [`OpTree::drain`], keyed by its
/// position in the settled sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpRecord<T> {
    /// Insert `value` before the element at `key`.
    Insert {
        /// Target position in the settled sequence.
        key: usize,
        /// The value to insert.
        value: T,
    },
    /// Overwrite the element at `key` with `value`.
    Set {
        /// Target position in the settled sequence.
        key: usize,
        /// The new value.
        value: T,
    },
    /// Remove `count` consecutive elements starting at `key`.
    Remove {
        /// Target position in the settled sequence.
        key: usize,
        /// Length of the removed run.
        count: usize,
    },
    /// Terminal record; `key` is the sequence length after all operations.
    End {
        /// The settled sequence length.
        key: usize,
    },
}

impl<T> OpRecord<T> {
    /// The record's position in the settled sequence.
    #[must_use]
    pub fn key(&self) -> usize {
        match self {
            Self::Insert { key, .. }
            | Self::Set { key, .. }
            | Self::Remove { key, .. }
            | Self::End { key } => *key,
        }
    }
}

/// Lazy in-order emission of all pending operations, in ascending key
/// order, terminated by a single [`OpRecord::End`].
///
/// A fused Remove+Set pair emits as two records at the same key, Remove
/// first. Traversal pushes lazy key shifts down on first visit; the tree
/// is otherwise not mutated, so dropping the cursor early is harmless.
pub struct Drain<'a, T> {
    tree: &'a mut OpTree<T>,
    stack: Vec<NodeId>,
    queued: Option<OpRecord<T>>,
    end: Option<usize>,
}

impl<T: Clone> OpTree<T> {
    /// Emits all pending operations in index order, terminated by an
    /// [`OpRecord::End`] at `committed_len + net_index_balance`.
    ///
    /// The tree still holds the operations afterwards; call
    /// [`OpTree::clear`] once they have been applied.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn drain(&mut self, committed_len: usize) -> Drain<'_, T> {
        let end = committed_len as i64 + self.net_index_balance();
        debug_assert!(end >= 0, "pending operations shrink the sequence below zero");

        let root = self.root_id();
        let mut drain = Drain {
            tree: self,
            stack: Vec::new(),
            queued: None,
            end: Some(end as usize),
        };
        drain.push_left_spine(root);
        drain
    }
}

impl<T> Drain<'_, T> {
    fn push_left_spine(&mut self, mut id: NodeId) {
        while id != NIL {
            self.tree.push_down(id);
            self.stack.push(id);
            id = self.tree.node(id).left;
        }
    }
}

impl<T: Clone> Iterator for Drain<'_, T> {
    type Item = OpRecord<T>;

    #[allow(clippy::cast_sign_loss)]
    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.queued.take() {
            return Some(record);
        }

        if let Some(id) = self.stack.pop() {
            let right = self.tree.node(id).right;
            self.push_left_spine(right);

            debug_assert!(self.tree.node(id).key >= 0, "negative emission key");
            let key = self.tree.node(id).key as usize;

            let (record, queued) = match &self.tree.node(id).slot {
                OpSlot::Single(Op::Insert(value)) => (
                    OpRecord::Insert {
                        key,
                        value: value.clone(),
                    },
                    None,
                ),
                OpSlot::Single(Op::Set(value)) => (
                    OpRecord::Set {
                        key,
                        value: value.clone(),
                    },
                    None,
                ),
                OpSlot::Single(Op::Remove { count }) => (
                    OpRecord::Remove {
                        key,
                        count: *count,
                    },
                    None,
                ),
                OpSlot::Paired { count, value } => (
                    OpRecord::Remove {
                        key,
                        count: *count,
                    },
                    Some(OpRecord::Set {
                        key,
                        value: value.clone(),
                    }),
                ),
            };
            self.queued = queued;
            return Some(record);
        }

        self.end.take().map(|key| OpRecord::End { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn empty_tree_emits_only_the_end_record() {
        let mut tree = OpTree::<i32>::new();
        let records: Vec<_> = tree.drain(5).collect();
        assert_eq!(vec![OpRecord::End { key: 5 }], records);
    }

    #[test]
    fn emission_is_in_key_order_with_terminal_end() {
        let mut tree = OpTree::new();
        tree.apply_insert(0, 'a').unwrap();
        tree.apply_insert(1, 'b').unwrap();
        tree.apply_insert(0, 'c').unwrap();

        let records: Vec<_> = tree.drain(0).collect();
        assert_eq!(
            vec![
                OpRecord::Insert { key: 0, value: 'c' },
                OpRecord::Insert { key: 1, value: 'a' },
                OpRecord::Insert { key: 2, value: 'b' },
                OpRecord::End { key: 3 },
            ],
            records,
        );
    }

    #[test]
    fn paired_slot_emits_remove_then_set_at_the_same_key() {
        let mut tree = OpTree::new();
        tree.apply_remove(1).unwrap();
        tree.apply_remove(1).unwrap();
        tree.apply_insert(1, 'v').unwrap();

        let records: Vec<_> = tree.drain(4).collect();
        assert_eq!(
            vec![
                OpRecord::Remove { key: 1, count: 1 },
                OpRecord::Set { key: 1, value: 'v' },
                OpRecord::End { key: 3 },
            ],
            records,
        );
    }

    #[test]
    fn emission_does_not_consume_the_tree() {
        let mut tree = OpTree::new();
        tree.apply_set(2, 'x').unwrap();

        let first: Vec<_> = tree.drain(3).collect();
        let second: Vec<_> = tree.drain(3).collect();
        assert_eq!(first, second);
        assert_eq!(1, tree.node_count());
    }

    #[test]
    fn dropping_the_cursor_early_is_benign() {
        let mut tree = OpTree::new();
        for i in 0..100 {
            tree.apply_insert(i, i).unwrap();
        }

        // abandon the traversal after a few records; partial push-downs
        // must not disturb subsequent edits
        let _ = tree.drain(0).take(3).count();
        tree.check_invariants().unwrap();

        tree.apply_insert(0, 999).unwrap();
        tree.apply_remove(50).unwrap();
        tree.check_invariants().unwrap();

        let records: Vec<_> = tree.drain(0).collect();
        assert_eq!(tree.node_count() + 1, records.len());
        let keys: Vec<_> = records.iter().map(OpRecord::key).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, keys);
    }
}
