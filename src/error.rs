// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Represents errors that can occur in the deferred list
///
/// Everything except [`Error::IndexOutOfBounds`] signifies an internal
/// consistency failure: the structure is in an undefined state and must be
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Index was out of bounds for the current sequence length (index, len)
    IndexOutOfBounds(usize, usize),

    /// A rotation was attempted around the sentinel
    SentinelRotation,

    /// A node carried an unpushed key shift at a point where none may remain
    DanglingKeyShift,

    /// The pending-operation slot reached an illegal configuration
    IllegalFusion,

    /// Measured tree height exceeded the tracked bound (measured, bound)
    HeightOutOfBounds(usize, usize),

    /// Internal bookkeeping did not add up
    Corrupted(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeferredListError: {self:?}")
    }
}

impl std::error::Error for Error {}

/// List result
pub type Result<T> = std::result::Result<T, Error>;
