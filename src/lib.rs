// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A K.I.S.S. implementation of an edit-deferring sequence container
//! (deferred list).
//!
//! ##### About
//!
//! This crate exports a [`DeferredList`] that supports a subset of the
//! `Vec` API.
//!
//! Positional inserts and removes on a flat array are O(n) each, because
//! the tail has to shift. Instead of updating the array in place, a
//! deferred list records edits (inserts, sets and removes) in an in-memory
//! operation tree ([`OpTree`]), keyed by the element index the caller
//! currently observes. Edits are then merged into the backing array in a
//! single linear pass, as the pending tree reaches some threshold or when
//! explicitly committing.
//!
//! The operation tree is an order-statistic red–black tree with two lazy
//! augmentations: a subtree-wide key shift (so one edit re-indexes
//! everything to its right in O(1)) and a subtree index balance (so reads
//! can translate observed indices into committed positions). Colocated
//! edits fuse into a single vertex: a remove followed by an insert at the
//! same index degrades to a plain overwrite, adjacent removes collapse
//! into one run, and an insert cancelled by a remove vanishes entirely.
//!
//! Because maintaining the flat representation is deferred to the commit
//! pass, editing a deferred list is O(log n) per operation; reads stay
//! O(log n) while edits are pending and O(1) after settling.
//!
//! # Example usage
//!
//! ```
//! use deferred_list::DeferredList;
//!
//! // A list behaves like a Vec whose edits are batched
//! let mut list = DeferredList::from(vec![10, 20, 30, 40]);
//!
//! // Note compared to the Vec API, operations return a Result<T>
//! // So you can handle consistency errors if they occur
//! list.insert(1, 15)?;
//! list.remove(3)?;
//! list.set(0, 11)?;
//!
//! // Reads observe pending edits transparently
//! assert_eq!(4, list.len());
//! assert_eq!(&15, list.get(1)?);
//!
//! // Settle everything into the backing array in one linear pass.
//! // Iteration does this implicitly; there is no stable iteration
//! // over a dirty list.
//! list.commit()?;
//! assert_eq!(&[11, 15, 20, 40], list.as_slice()?);
//! #
//! # Ok::<(), deferred_list::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::multiple_crate_versions)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]

mod commit;
mod error;
mod list;
mod tree;

pub use {
    error::{Error, Result},
    list::DeferredList,
    tree::{Drain, Lookup, OpRecord, OpTree},
};
