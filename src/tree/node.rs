// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::slot::OpSlot;

/// Index of a tree vertex inside the arena.
///
/// Index 0 is reserved for the sentinel, which doubles as the universal
/// leaf and the root's parent. Ids never escape the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct NodeId(pub(super) usize);

/// The sentinel id ("nil").
pub(super) const NIL: NodeId = NodeId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Color {
    Red,
    Black,
}

/// A tree vertex.
///
/// `key` is the element's index in the post-operation sequence as of the
/// last push-down; adding the unpushed `shift`s on the root path yields the
/// effective key. `balance` is the net number of elements the pending
/// operations in this vertex's subtree add to the sequence.
pub(super) struct Node<T> {
    pub(super) key: i64,
    pub(super) shift: i64,
    pub(super) balance: i64,
    pub(super) color: Color,
    pub(super) parent: NodeId,
    pub(super) left: NodeId,
    pub(super) right: NodeId,
    pub(super) slot: OpSlot<T>,
}

impl<T> Node<T> {
    /// A fresh, unlinked Red vertex.
    pub(super) fn new(key: i64, slot: OpSlot<T>) -> Self {
        Self {
            key,
            shift: 0,
            balance: 0,
            color: Color::Red,
            parent: NIL,
            left: NIL,
            right: NIL,
            slot,
        }
    }

    /// The sentinel vertex occupying arena slot 0.
    ///
    /// Black, self-linked, zero shift and balance. Its placeholder slot has
    /// weight 0 and is never emitted.
    pub(super) fn sentinel() -> Self {
        Self {
            key: 0,
            shift: 0,
            balance: 0,
            color: Color::Black,
            parent: NIL,
            left: NIL,
            right: NIL,
            slot: OpSlot::placeholder(),
        }
    }
}
