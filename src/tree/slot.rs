// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::Error;

/// A single pending positional operation.
///
/// `Remove` carries a run length; external edits always arrive with
/// `count == 1`, runs only form through fusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Op<T> {
    Insert(T),
    Set(T),
    Remove { count: usize },
}

impl<T> Op<T> {
    /// Net sequence-length contribution of this operation.
    pub(super) fn weight(&self) -> i64 {
        match self {
            Self::Insert(_) => 1,
            Self::Set(_) => 0,
            #[allow(clippy::cast_possible_wrap)]
            Self::Remove { count } => -(*count as i64),
        }
    }
}

/// The pending-operation slot of a tree vertex.
///
/// Either a single operation, or a Remove run fused with the Set that
/// targets the element emerging at the same index. There is no empty
/// variant: a slot that would become empty annihilates its vertex instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum OpSlot<T> {
    Single(Op<T>),
    Paired { count: usize, value: T },
}

/// Outcome of fusing a new operation into an existing slot.
pub(super) enum Fuse<T> {
    /// The operation was merged into the slot.
    Fused,
    /// A pending Insert was cancelled outright; the vertex must be deleted.
    Annihilated,
    /// No legal fusion; the operation is handed back and the caller
    /// descends left.
    Rejected(Op<T>),
}

impl<T> OpSlot<T> {
    /// Weight-0 filler for the sentinel and freed arena slots.
    pub(super) fn placeholder() -> Self {
        Self::Single(Op::Remove { count: 0 })
    }

    /// Net sequence-length contribution of this slot.
    ///
    /// The Set carried in a pair does not contribute.
    pub(super) fn weight(&self) -> i64 {
        match self {
            Self::Single(op) => op.weight(),
            #[allow(clippy::cast_possible_wrap)]
            Self::Paired { count, .. } => -(*count as i64),
        }
    }

    /// Fuses `op` into this slot.
    ///
    /// Implements the colocation rules: a Set installs or overwrites, a
    /// Remove supersedes a Set, extends a Remove run or annihilates a
    /// pending Insert, and an Insert un-does one pending removal (turning
    /// it into a Set) or is rejected so the caller can shift this vertex
    /// aside and descend.
    pub(super) fn fuse(&mut self, op: Op<T>) -> crate::Result<Fuse<T>> {
        match op {
            Op::Set(value) => {
                match self {
                    Self::Single(Op::Insert(v) | Op::Set(v)) => *v = value,
                    Self::Single(Op::Remove { count }) => {
                        let count = *count;
                        if count == 0 {
                            return Err(Error::IllegalFusion);
                        }
                        *self = Self::Paired { count, value };
                    }
                    Self::Paired { value: v, .. } => *v = value,
                }
                Ok(Fuse::Fused)
            }
            Op::Remove { count: run } => {
                if run == 0 {
                    return Err(Error::IllegalFusion);
                }
                match self {
                    Self::Single(Op::Insert(_)) => {
                        // A run can only cancel a single insert.
                        if run > 1 {
                            return Err(Error::IllegalFusion);
                        }
                        Ok(Fuse::Annihilated)
                    }
                    Self::Single(Op::Set(_)) => {
                        *self = Self::Single(Op::Remove { count: run });
                        Ok(Fuse::Fused)
                    }
                    Self::Single(Op::Remove { count }) => {
                        *count += run;
                        Ok(Fuse::Fused)
                    }
                    Self::Paired { count, .. } => {
                        let count = *count;
                        *self = Self::Single(Op::Remove { count: count + run });
                        Ok(Fuse::Fused)
                    }
                }
            }
            Op::Insert(value) => match self {
                Self::Single(Op::Insert(_) | Op::Set(_)) | Self::Paired { .. } => {
                    Ok(Fuse::Rejected(Op::Insert(value)))
                }
                Self::Single(Op::Remove { count }) => match *count {
                    0 => Err(Error::IllegalFusion),
                    1 => {
                        *self = Self::Single(Op::Set(value));
                        Ok(Fuse::Fused)
                    }
                    count => {
                        *self = Self::Paired { count: count - 1, value };
                        Ok(Fuse::Fused)
                    }
                },
            },
        }
    }

    /// The slot's operations in emission order (Remove before Set).
    pub(super) fn to_ops(&self) -> (Op<T>, Option<Op<T>>)
    where
        T: Clone,
    {
        match self {
            Self::Single(op) => (op.clone(), None),
            Self::Paired { count, value } => (
                Op::Remove { count: *count },
                Some(Op::Set(value.clone())),
            ),
        }
    }
}
