//! Sparse list of present/absent positions over a segment tree

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::reduce::Index;
use crate::segment::{Segment, Stats, StatsReducer};
use crate::tree::FingerTree;

type SegTree<E> = FingerTree<Segment<E>, StatsReducer>;

#[inline]
fn by_size(stats: &Stats) -> usize {
    stats.size
}

#[inline]
fn by_present(stats: &Stats) -> usize {
    stats.present
}

/// A list of length N whose positions are each present (holding a
/// materialized value) or absent, stored in O(run count) tree leaves.
///
/// The list owns a single snapshot cell: readers get immutable, fully built
/// trees (lock-free), and every edit publishes a new structurally-shared
/// tree atomically. Mutation is single-writer; concurrent writers are
/// undefined behavior of the contract, not a supported mode. A caller that
/// captured a snapshot (for example a fold that triggers a reentrant edit)
/// keeps seeing its own consistent, now-stale tree.
pub struct SparseList<E> {
    /// Current immutable snapshot for readers.
    snapshot: ArcSwap<SegTree<E>>,
    /// Monotonic version counter, bumped on every publish.
    version: AtomicU64,
}

impl<E: Clone> SparseList<E> {
    /// New empty list.
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(FingerTree::new(StatsReducer)),
            version: AtomicU64::new(0),
        }
    }

    fn load(&self) -> Arc<SegTree<E>> {
        self.snapshot.load_full()
    }

    fn publish(&self, tree: SegTree<E>) {
        debug_assert!(Self::segments_coherent(&tree));
        self.snapshot.store(Arc::new(tree));
        self.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of publishes since creation.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Relaxed)
    }

    // === Whole-list stats ===

    fn stats(&self) -> Stats {
        self.load().summary().copied().unwrap_or_default()
    }

    /// Total number of positions, present or absent.
    pub fn len(&self) -> usize {
        self.stats().size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of present positions.
    pub fn present_count(&self) -> usize {
        self.stats().present
    }

    /// Number of tree leaves, i.e. present/absent runs.
    pub fn segment_count(&self) -> usize {
        self.load().leaf_count()
    }

    // === Position queries ===

    /// Whether position `index` holds a materialized value.
    pub fn is_present(&self, index: usize) -> Result<bool> {
        let tree = self.load();
        let idx = Self::locate_position(&tree, index)?;
        Ok(tree.leaf(idx.major)?.is_present())
    }

    /// Value at position `index`, `None` when the position is absent.
    pub fn get(&self, index: usize) -> Result<Option<E>> {
        let tree = self.load();
        let idx = Self::locate_position(&tree, index)?;
        Ok(tree.leaf(idx.major)?.value(idx.minor).cloned())
    }

    /// Value at position `index`, failing with [`Error::NoSuchElement`] when
    /// the position is absent.
    pub fn get_or_err(&self, index: usize) -> Result<E> {
        self.get(index)?.ok_or(Error::NoSuchElement { index })
    }

    /// Value of the `present_index`-th present position, addressing only the
    /// present sub-sequence.
    pub fn get_present(&self, present_index: usize) -> Result<E> {
        let tree = self.load();
        let count = self.present_count();
        if present_index >= count {
            return Err(Error::OutOfRange {
                index: present_index,
                bound: count,
            });
        }
        let idx = tree.locate_progressively(by_present, present_index)?;
        match tree.leaf(idx.major)? {
            Segment::Present(values) => Ok(values[idx.minor].clone()),
            Segment::Absent(_) => unreachable!("present metric located an absent run"),
        }
    }

    /// Absolute position of the `present_index`-th present value.
    pub fn index_of_present_item(&self, present_index: usize) -> Result<usize> {
        let tree = self.load();
        let count = self.present_count();
        if present_index >= count {
            return Err(Error::OutOfRange {
                index: present_index,
                bound: count,
            });
        }
        let idx = tree.locate_progressively(by_present, present_index)?;
        let before = tree
            .summary_between_leafs(0..idx.major)?
            .map_or(0, |s| s.size);
        // Inside a present run the metric offset is the position offset.
        Ok(before + idx.minor)
    }

    /// Number of present positions strictly before `position`.
    pub fn present_count_before(&self, position: usize) -> Result<usize> {
        let tree = self.load();
        let size = tree.measure(by_size);
        if position > size {
            return Err(Error::OutOfRange {
                index: position,
                bound: size,
            });
        }
        Ok(tree
            .summary_between(by_size, 0..position, Segment::sub_stats)?
            .map_or(0, |s| s.present))
    }

    /// Number of present positions at or after `position`.
    pub fn present_count_after(&self, position: usize) -> Result<usize> {
        Ok(self.present_count() - self.present_count_before(position)?)
    }

    /// Number of present positions in `from..to`.
    pub fn present_count_between(&self, from: usize, to: usize) -> Result<usize> {
        let range = self.present_items_range(from, to)?;
        Ok(range.end - range.start)
    }

    /// Present-index range corresponding to the position range `from..to`.
    pub fn present_items_range(&self, from: usize, to: usize) -> Result<Range<usize>> {
        if from > to {
            return Err(Error::InvertedRange { from, to });
        }
        Ok(self.present_count_before(from)?..self.present_count_before(to)?)
    }

    // === Materialization ===

    /// All present values in position order.
    pub fn collect(&self) -> Vec<E> {
        self.load().fold(Vec::new(), |mut acc, seg| {
            if let Segment::Present(values) = seg {
                acc.extend(values.iter().cloned());
            }
            acc
        })
    }

    /// Present values within the position range `from..to`, in order.
    /// O(log n + number of values returned) plus the runs overlapped.
    pub fn collect_range(&self, from: usize, to: usize) -> Result<Vec<E>> {
        if from > to {
            return Err(Error::InvertedRange { from, to });
        }
        self.load().fold_between(
            Vec::new(),
            by_size,
            from..to,
            |mut acc, seg| {
                if let Segment::Present(values) = seg {
                    acc.extend(values.iter().cloned());
                }
                acc
            },
            |mut acc, seg, lo, hi| {
                if let Segment::Present(values) = seg {
                    acc.extend(values[lo..hi].iter().cloned());
                }
                acc
            },
        )
    }

    // === Edits ===

    /// Write `value` at position `index`. A present position is overwritten
    /// without changing any run boundaries; an absent position is promoted
    /// to a one-element present run, merging with adjoining present runs.
    pub fn set(&self, index: usize, value: E) -> Result<()> {
        let tree = self.load();
        let idx = Self::locate_position(&tree, index)?;
        match tree.leaf(idx.major)? {
            Segment::Present(values) => {
                // Size and present count are unchanged, so only the path to
                // the run is rebuilt and every cached summary stays valid.
                let mut values = values.clone();
                values[idx.minor] = value;
                let next = tree.update_leaf(idx.major, Segment::Present(values))?;
                self.publish(next);
                Ok(())
            }
            Segment::Absent(_) => {
                self.splice_segments(index, index + 1, vec![Segment::Present(vec![value])])
            }
        }
    }

    /// Write `value` only if position `index` is absent; reports whether a
    /// write occurred.
    pub fn set_if_absent(&self, index: usize, value: E) -> Result<bool> {
        if self.is_present(index)? {
            Ok(false)
        } else {
            self.set(index, value)?;
            Ok(true)
        }
    }

    /// Insert a single present value before `position`.
    pub fn insert(&self, position: usize, value: E) -> Result<()> {
        self.splice_segments(position, position, vec![Segment::Present(vec![value])])
    }

    /// Insert a run of present values before `position`.
    pub fn insert_all<I>(&self, position: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
    {
        let values: Vec<E> = values.into_iter().collect();
        self.splice_segments(position, position, vec![Segment::Present(values)])
    }

    /// Insert `len` absent positions before `position`.
    pub fn insert_void(&self, position: usize, len: usize) -> Result<()> {
        self.splice_segments(position, position, vec![Segment::Absent(len)])
    }

    /// Remove the positions `from..to`.
    pub fn remove(&self, from: usize, to: usize) -> Result<()> {
        self.splice_segments(from, to, Vec::new())
    }

    /// Replace the positions `from..to` with a run of present values.
    pub fn splice<I>(&self, from: usize, to: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
    {
        let values: Vec<E> = values.into_iter().collect();
        self.splice_segments(from, to, vec![Segment::Present(values)])
    }

    /// Replace the positions `from..to` with `len` absent positions.
    pub fn splice_by_void(&self, from: usize, to: usize, len: usize) -> Result<()> {
        self.splice_segments(from, to, vec![Segment::Absent(len)])
    }

    // === Internals ===

    /// Locate the run containing position `index` (not a boundary form:
    /// `index` must be a real position, so minor always falls inside the
    /// run).
    fn locate_position(tree: &SegTree<E>, index: usize) -> Result<Index> {
        let size = tree.measure(by_size);
        if index >= size {
            return Err(Error::OutOfRange { index, bound: size });
        }
        tree.locate_progressively(by_size, index)
    }

    /// Split at a position, cutting the boundary run in two when the
    /// position falls inside it.
    fn split_at_position(tree: &SegTree<E>, position: usize) -> Result<(SegTree<E>, SegTree<E>)> {
        let size = tree.measure(by_size);
        if position == 0 {
            return Ok((FingerTree::new(StatsReducer), tree.clone()));
        }
        if position == size {
            return Ok((tree.clone(), FingerTree::new(StatsReducer)));
        }
        let idx = tree.locate_progressively(by_size, position)?;
        let (mut left, mut right) = tree.split(idx.major)?;
        if idx.minor > 0 {
            let (head, tail) = {
                let seg = right.leaf(0)?;
                (seg.slice(0, idx.minor), seg.slice(idx.minor, seg.len()))
            };
            // The cut run's left neighbor is the opposite kind, so plain
            // append keeps runs maximal on the left side.
            left = left.append_leaf(head);
            right = right.update_leaf(0, tail)?;
        }
        Ok((left, right))
    }

    /// Append a run, merging it into the last run when both are the same
    /// kind. Compaction is locally greedy: only the immediate neighbor is
    /// considered.
    fn append_merged(tree: SegTree<E>, segment: Segment<E>) -> Result<SegTree<E>> {
        let n = tree.leaf_count();
        if n == 0 {
            return Ok(FingerTree::singleton(segment, StatsReducer));
        }
        if tree.leaf(n - 1)?.mergeable(&segment) {
            let merged = tree.leaf(n - 1)?.clone().merged(segment);
            tree.update_leaf(n - 1, merged)
        } else {
            Ok(tree.append_leaf(segment))
        }
    }

    /// Join two run sequences, merging the seam pair when mergeable.
    fn join_merged(left: SegTree<E>, right: SegTree<E>) -> Result<SegTree<E>> {
        if left.is_empty() {
            return Ok(right);
        }
        if right.is_empty() {
            return Ok(left);
        }
        let n = left.leaf_count();
        if left.leaf(n - 1)?.mergeable(right.leaf(0)?) {
            let merged = left.leaf(n - 1)?.clone().merged(right.leaf(0)?.clone());
            let left = left.update_leaf(n - 1, merged)?;
            let (_, rest) = right.split(1)?;
            Ok(left.join(&rest))
        } else {
            Ok(left.join(&right))
        }
    }

    /// Replace the position range `from..to` with the given runs: split at
    /// both boundaries (trimming the cut runs to their surviving
    /// sub-ranges), drop the middle, insert the replacements, and rejoin
    /// with greedy seam merging.
    fn splice_segments(&self, from: usize, to: usize, middle: Vec<Segment<E>>) -> Result<()> {
        let tree = self.load();
        let size = tree.measure(by_size);
        if from > to {
            return Err(Error::InvertedRange { from, to });
        }
        if to > size {
            return Err(Error::OutOfRange {
                index: to,
                bound: size,
            });
        }
        if from == to && middle.iter().all(Segment::is_empty) {
            return Ok(());
        }

        let added: usize = middle.iter().map(Segment::len).sum();
        let (left, _) = Self::split_at_position(&tree, from)?;
        let (_, right) = Self::split_at_position(&tree, to)?;

        let mut next = left;
        for segment in middle {
            if !segment.is_empty() {
                next = Self::append_merged(next, segment)?;
            }
        }
        let next = Self::join_merged(next, right)?;

        trace!(from, to, removed = to - from, added, "splice");
        self.publish(next);
        Ok(())
    }

    /// Run invariants: no empty runs, runs maximal (adjacent runs differ in
    /// kind), cached stats consistent with the runs. Checked on every
    /// publish in debug builds.
    fn segments_coherent(tree: &SegTree<E>) -> bool {
        let slice = tree.as_slice();
        let mut prev_kind: Option<bool> = None;
        let mut stats = Stats::default();
        for seg in slice.iter() {
            if seg.is_empty() {
                return false;
            }
            if prev_kind == Some(seg.is_present()) {
                return false;
            }
            prev_kind = Some(seg.is_present());
            stats = stats + seg.stats();
        }
        tree.summary().copied().unwrap_or_default() == stats
    }
}

impl<E: Clone> Default for SparseList<E> {
    fn default() -> Self {
        Self::new()
    }
}
