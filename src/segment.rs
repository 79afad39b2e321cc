//! Run-length segments and the size/present-count summary

use std::ops::Add;

use crate::reduce::Reducer;

/// A maximal run of adjacent positions sharing present/absent status.
///
/// A present run stores its materialized values in order; an absent run
/// stores only its length. Zero-length segments never enter a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment<E> {
    Present(Vec<E>),
    Absent(usize),
}

impl<E> Segment<E> {
    /// Number of positions covered by this run.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Segment::Present(values) => values.len(),
            Segment::Absent(len) => *len,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this run holds materialized values.
    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, Segment::Present(_))
    }

    #[inline]
    pub fn present_count(&self) -> usize {
        match self {
            Segment::Present(values) => values.len(),
            Segment::Absent(_) => 0,
        }
    }

    /// Value at `offset` within the run, `None` on an absent run.
    pub fn value(&self, offset: usize) -> Option<&E> {
        match self {
            Segment::Present(values) => values.get(offset),
            Segment::Absent(_) => None,
        }
    }

    #[inline]
    pub fn stats(&self) -> Stats {
        Stats {
            size: self.len(),
            present: self.present_count(),
        }
    }

    /// Stats of the sub-run `from..to`, used as the boundary sub-summary in
    /// range queries.
    pub fn sub_stats(&self, from: usize, to: usize) -> Stats {
        debug_assert!(from <= to && to <= self.len());
        Stats {
            size: to - from,
            present: match self {
                Segment::Present(_) => to - from,
                Segment::Absent(_) => 0,
            },
        }
    }

    /// Two runs merge iff they are the same kind; the merged run is again a
    /// single maximal run.
    pub fn mergeable(&self, other: &Segment<E>) -> bool {
        self.is_present() == other.is_present()
    }

    /// Concatenate a same-kind run onto the end of this one.
    pub fn merged(self, other: Segment<E>) -> Segment<E> {
        match (self, other) {
            (Segment::Present(mut a), Segment::Present(b)) => {
                a.extend(b);
                Segment::Present(a)
            }
            (Segment::Absent(a), Segment::Absent(b)) => Segment::Absent(a + b),
            _ => unreachable!("merged() requires same-kind segments"),
        }
    }
}

impl<E: Clone> Segment<E> {
    /// Copy of the sub-run `from..to`.
    pub fn slice(&self, from: usize, to: usize) -> Segment<E> {
        debug_assert!(from <= to && to <= self.len());
        match self {
            Segment::Present(values) => Segment::Present(values[from..to].to_vec()),
            Segment::Absent(_) => Segment::Absent(to - from),
        }
    }
}

/// Subtree summary for segment trees: total positions and how many of them
/// are present. Invariant: `present <= size`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub size: usize,
    pub present: usize,
}

impl Stats {
    pub fn new(size: usize, present: usize) -> Self {
        debug_assert!(present <= size);
        Self { size, present }
    }
}

impl Add for Stats {
    type Output = Stats;

    fn add(self, rhs: Stats) -> Stats {
        Stats {
            size: self.size + rhs.size,
            present: self.present + rhs.present,
        }
    }
}

/// [`Reducer`] producing [`Stats`] summaries for segment trees.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatsReducer;

impl<E> Reducer<Segment<E>> for StatsReducer {
    type Summary = Stats;

    fn apply(&self, segment: &Segment<E>) -> Stats {
        segment.stats()
    }

    fn reduce(&self, left: Stats, right: Stats) -> Stats {
        left + right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_stats_of_present_counts_every_position() {
        let seg = Segment::Present(vec![1, 2, 3, 4]);
        assert_eq!(seg.sub_stats(1, 3), Stats::new(2, 2));
        assert_eq!(seg.sub_stats(0, 4), seg.stats());
    }

    #[test]
    fn sub_stats_of_absent_counts_nothing() {
        let seg: Segment<i32> = Segment::Absent(5);
        assert_eq!(seg.sub_stats(2, 5), Stats::new(3, 0));
    }

    #[test]
    fn merge_is_kind_preserving() {
        let a = Segment::Present(vec![1, 2]);
        let b = Segment::Present(vec![3]);
        assert!(a.mergeable(&b));
        assert_eq!(a.merged(b), Segment::Present(vec![1, 2, 3]));

        let v: Segment<i32> = Segment::Absent(2);
        let w = Segment::Absent(3);
        assert_eq!(v.merged(w), Segment::Absent(5));

        let p = Segment::Present(vec![1]);
        let q: Segment<i32> = Segment::Absent(1);
        assert!(!p.mergeable(&q));
    }
}
