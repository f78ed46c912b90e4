//! Container types with explicit control over storage layout
//!
//! This module provides ordered and sequential containers that own their
//! backing storage outright: no garbage collection, no hidden copies, and
//! allocation failure surfaced as an error value rather than a panic.
//!
//! ## Containers
//!
//! - **`OrderedSet<T, C>`** - Sorted unique values over a balancing search
//!   tree; the recommended entry point for ordered data
//! - **`RbTree<T, C>`** - The underlying red-black tree with a stable
//!   cursor API for position-based insertion and erasure
//! - **`SegDeque<T>`** - Double-ended queue over segmented block storage
//!   with O(1) random access and no element movement on push/pop

pub mod ordered_set;
pub mod rb_tree;
pub mod seg_deque;

pub use ordered_set::OrderedSet;
pub use rb_tree::{Cursor, RbTree};
pub use seg_deque::SegDeque;
