// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Merges a drained operation stream into the committed storage.
//!
//! A single linear pass: committed elements displaced by the rewrite wait
//! in a small FIFO until their final position comes up, removed runs are
//! dropped from the front of that logical stream, and the terminal `End`
//! record drains the tail uniformly.

use crate::tree::OpRecord;
use crate::Error;
use std::collections::VecDeque;

/// Applies an in-order operation stream to `items` in place.
///
/// Writes past the current length append, so no reallocation happens as
/// long as the capacity suffices; a shrinking stream ends with a truncate.
pub(crate) fn apply<T: Clone, I: Iterator<Item = OpRecord<T>>>(
    items: &mut Vec<T>,
    ops: I,
) -> crate::Result<()> {
    let committed = items.len();
    let mut write = 0_usize;
    let mut read = 0_usize;
    let mut displaced: VecDeque<T> = VecDeque::new();
    let mut pending_set: Option<T> = None;

    for record in ops {
        let key = record.key();

        // carry elements forward until the record's position comes up
        while write < key {
            if read < committed {
                if let Some(v) = items.get(read) {
                    displaced.push_back(v.clone());
                }
                read += 1;
            }
            let value = if let Some(v) = pending_set.take() {
                // the set replaces whatever would surface here
                if displaced.pop_front().is_none() {
                    return Err(Error::Corrupted("set without a target element"));
                }
                v
            } else if let Some(v) = displaced.pop_front() {
                v
            } else {
                return Err(Error::Corrupted("commit stream ran dry"));
            };
            put(items, write, value);
            write += 1;
        }

        match record {
            OpRecord::Insert { value, .. } => {
                if read < committed {
                    if let Some(v) = items.get(read) {
                        displaced.push_back(v.clone());
                    }
                    read += 1;
                }
                put(items, write, value);
                write += 1;
            }
            OpRecord::Set { value, .. } => {
                debug_assert!(pending_set.is_none(), "overlapping set values");
                pending_set = Some(value);
            }
            OpRecord::Remove { count, .. } => {
                for _ in 0..count {
                    if displaced.pop_front().is_none() {
                        if read >= committed {
                            return Err(Error::Corrupted("removal past the end"));
                        }
                        read += 1;
                    }
                }
            }
            OpRecord::End { key } => {
                debug_assert!(displaced.is_empty(), "unconsumed displaced elements");
                items.truncate(key);
            }
        }
    }

    Ok(())
}

fn put<T>(items: &mut Vec<T>, index: usize, value: T) {
    if let Some(slot) = items.get_mut(index) {
        *slot = value;
    } else {
        debug_assert_eq!(index, items.len(), "non-contiguous write");
        items.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::OpTree;
    use test_log::test;

    fn settle<T: Clone>(items: &mut Vec<T>, tree: &mut OpTree<T>) {
        let len = items.len();
        apply(items, tree.drain(len)).unwrap();
        tree.clear();
    }

    #[test]
    fn inserts_into_empty_storage() {
        let mut tree = OpTree::new();
        tree.apply_insert(0, 'a').unwrap();
        tree.apply_insert(1, 'b').unwrap();
        tree.apply_insert(0, 'c').unwrap();

        let mut items = Vec::new();
        settle(&mut items, &mut tree);
        assert_eq!(vec!['c', 'a', 'b'], items);
    }

    #[test]
    fn remove_run_shifts_the_tail() {
        let mut tree = OpTree::new();
        tree.apply_remove(1).unwrap();
        tree.apply_remove(1).unwrap();

        let mut items = vec![10, 20, 30, 40, 50];
        settle(&mut items, &mut tree);
        assert_eq!(vec![10, 40, 50], items);
    }

    #[test]
    fn annihilated_edits_leave_storage_unchanged() {
        let mut tree = OpTree::new();
        tree.apply_insert(1, 99).unwrap();
        tree.apply_remove(1).unwrap();

        let mut items = vec![10, 20, 30];
        settle(&mut items, &mut tree);
        assert_eq!(vec![10, 20, 30], items);
    }

    #[test]
    fn paired_remove_and_set_replace_in_place() {
        let mut tree = OpTree::new();
        tree.apply_remove(1).unwrap();
        tree.apply_insert(1, 77).unwrap();

        let mut items = vec![10, 20, 30];
        settle(&mut items, &mut tree);
        assert_eq!(vec![10, 77, 30], items);
    }

    #[test]
    fn set_at_the_last_index() {
        let mut tree = OpTree::new();
        tree.apply_set(2, 99).unwrap();

        let mut items = vec![10, 20, 30];
        settle(&mut items, &mut tree);
        assert_eq!(vec![10, 20, 99], items);
    }

    #[test]
    fn trailing_removes_truncate() {
        let mut tree = OpTree::new();
        tree.apply_remove(2).unwrap();
        tree.apply_remove(1).unwrap();

        let mut items = vec![10, 20, 30];
        settle(&mut items, &mut tree);
        assert_eq!(vec![10], items);
    }

    #[test]
    fn interleaved_batch_matches_naive_replay() {
        // (kind, index, value): 0 = insert, 1 = remove, 2 = set
        let script: &[(u8, usize, i32)] = &[
            (0, 3, 100),
            (2, 0, 101),
            (1, 4, 0),
            (0, 0, 102),
            (1, 2, 0),
            (2, 3, 103),
            (0, 6, 104),
            (1, 0, 0),
        ];

        let mut naive: Vec<i32> = (0..6).collect();
        let mut items = naive.clone();
        let mut tree = OpTree::new();

        for &(kind, index, value) in script {
            match kind {
                0 => {
                    naive.insert(index, value);
                    tree.apply_insert(index, value).unwrap();
                }
                1 => {
                    naive.remove(index);
                    tree.apply_remove(index).unwrap();
                }
                _ => {
                    *naive.get_mut(index).unwrap() = value;
                    tree.apply_set(index, value).unwrap();
                }
            }
        }

        settle(&mut items, &mut tree);
        assert_eq!(naive, items);
    }

    #[test]
    fn growth_stays_within_reserved_capacity() {
        let mut items: Vec<usize> = (0..1000).collect();
        items.reserve(1000);
        let capacity = items.capacity();

        let mut tree = OpTree::new();
        for i in 0..1000 {
            tree.apply_insert(i, i).unwrap();
        }

        settle(&mut items, &mut tree);
        assert_eq!(2000, items.len());
        assert_eq!(capacity, items.capacity());

        let naive: Vec<usize> = {
            let mut v: Vec<usize> = (0..1000).collect();
            for i in 0..1000 {
                v.insert(i, i);
            }
            v
        };
        assert_eq!(naive, items);
    }
}
