//! # Sequora: Ordered Containers with Explicit Storage Control
//!
//! This crate provides generic containers and the algorithms that bind them
//! together, built for programmers who want explicit control over storage
//! layout, allocation, and object lifetime — no garbage collection, no
//! hidden copies.
//!
//! ## Key Features
//!
//! - **Ordered Set**: Unique sorted values over a self-balancing search tree
//! - **Balancing Search Tree**: Red-black tree with arena-backed nodes and
//!   cursors that stay valid across unrelated mutations
//! - **Segmented Deque**: Block-indexed double-ended queue with O(1) random
//!   access and amortized O(1) pushes at both ends
//! - **Sorted-Sequence Algorithms**: Union, intersection, and difference
//!   over any ordered iterators
//! - **Fallible Allocation**: Every allocating operation reports failure as
//!   an error value and leaves the container in its prior state
//! - **Memory Safety**: Cursor and iterator misuse degrades to `None` or a
//!   reported error, never to undefined behavior
//!
//! ## Quick Start
//!
//! ```rust
//! use sequora::{OrderedSet, SegDeque};
//! use sequora::algorithms::intersection_sorted;
//! use sequora::Natural;
//!
//! // Sorted unique values with logarithmic operations
//! let mut set: OrderedSet<i32> = OrderedSet::new();
//! for key in [5, 3, 8, 1] {
//!     set.insert(key)?;
//! }
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 5, 8]);
//!
//! // Double-ended queue with O(1) indexing
//! let mut deque = SegDeque::new();
//! deque.push_back(2)?;
//! deque.push_front(1)?;
//! assert_eq!(deque[0], 1);
//!
//! // Set algebra over the containers' sorted iterators
//! let other = OrderedSet::from([3, 8, 9]);
//! let common = intersection_sorted(set.iter().copied(), other.iter().copied(), &Natural);
//! assert_eq!(common, [3, 8]);
//! # Ok::<(), sequora::SequoraError>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod algorithms;
pub mod compare;
pub mod containers;
pub mod error;

// Re-export core types
pub use compare::{Compare, Natural, Reverse};
pub use containers::{Cursor, OrderedSet, RbTree, SegDeque};
pub use error::{Result, SequoraError};
