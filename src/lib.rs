//! Persistent AVL-backed sequences for Rust.
//!
//! This crate provides [`ImmutableList`], an indexable sequence whose edits return new
//! lists that share structure with the old ones, together with [`ListBuilder`], its
//! single-owner mutable companion, and [`Enumerator`], the cursor both are walked with.
//!
//! - [`ImmutableList::get`] / indexing - O(log n) positional access
//! - [`ImmutableList::insert`], [`remove`](ImmutableList::remove), [`set`](ImmutableList::set) -
//!   O(log n) persistent edits
//! - [`Enumerator`] - windowed, forward or reverse enumeration with O(log n) start-up,
//!   amortized O(1) steps and no heap allocation
//!
//! # Example
//!
//! ```
//! use wabi_seq::{ImmutableList, Window};
//!
//! let list: ImmutableList<i32> = (1..=10).collect();
//! let edited = list.set(0, 100);
//!
//! // The original is untouched.
//! assert_eq!(list[0], 1);
//! assert_eq!(edited[0], 100);
//!
//! // Walk four elements backwards from index 7.
//! let window = Window::all().reversed().starting_at(7).take(4);
//! let values: Vec<_> = list.iter_window(window).unwrap().copied().collect();
//! assert_eq!(values, [8, 7, 6, 5]);
//! ```
//!
//! # Mutation fencing
//!
//! Enumerators created from a [`Snapshot`] of a [`ListBuilder`] check the builder's
//! [`VersionFence`] on every step and fail with [`Error::ConcurrentMutation`] once the
//! builder has been modified. Enumerators over a plain [`ImmutableList`] are never fenced:
//! the list cannot change.
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Structural sharing** - Clones are O(1); edits copy only the path they touch
//! - **Bounded enumeration** - At most `height - INDEXED_HEIGHT` stack slots, held inline
//!
//! # Implementation
//!
//! Every [`Node`] caches the height and element count of its subtree. Counts make
//! positional lookup and window start-up logarithmic; heights keep the tree AVL-balanced
//! and bound the enumerator's stack. Subtrees no taller than [`INDEXED_HEIGHT`] are walked
//! by direct positional lookup instead of through the stack.

#![cfg_attr(not(test), no_std)]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod enumerator;
mod error;
mod raw;
mod version;
mod window;

pub mod immutable_list;
pub mod node;

pub use enumerator::{Enumerator, INDEXED_HEIGHT, Iter};
pub use error::{Error, Result};
pub use immutable_list::{ImmutableList, ListBuilder, Snapshot};
pub use node::{Branch, Node};
pub use raw::STACK_CAPACITY;
pub use version::VersionFence;
pub use window::Window;
