//! Persistent summary-augmented 2-3 tree and the segmented sparse list
//! built on top of it.
//!
//! [`FingerTree`] is an immutable sequence with O(log n) random access,
//! update, split and concatenation, where every subtree carries a cached
//! application-defined associative summary ([`Reducer`]). Positions can be
//! addressed by raw leaf index or by any monotonic metric derived from the
//! summaries.
//!
//! [`SparseList`] specializes the tree to a list whose positions are each
//! present (a materialized, memoized value) or absent (void), stored in one
//! leaf per run instead of one per position, so memoization and selective
//! eviction stay cheap under inserts, removals and splices. Edits publish
//! new structurally-shared snapshots through an RCU-style cell: readers are
//! lock-free and reentrant readers keep their own consistent snapshot.

pub mod error;
pub mod reduce;
pub mod segment;
pub mod slice;
pub mod sparse;
pub mod tree;

// Re-export core types
pub use error::{Error, Result};
pub use reduce::{Index, Reducer};
pub use segment::{Segment, Stats, StatsReducer};
pub use slice::{Leaves, TreeSlice};
pub use sparse::SparseList;
pub use tree::FingerTree;
