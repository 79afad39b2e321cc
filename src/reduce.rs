//! Summary reduction trait and metric-location index

/// Produces and combines per-subtree summaries.
///
/// `reduce` must be associative and order-preserving; it is not required to
/// be commutative. Summaries are computed once per node at construction and
/// cached, so both methods should be cheap relative to a tree walk.
pub trait Reducer<T> {
    type Summary: Clone;

    /// Summary of a single leaf element.
    fn apply(&self, item: &T) -> Self::Summary;

    /// Left-to-right combination of two adjacent summaries.
    fn reduce(&self, left: Self::Summary, right: Self::Summary) -> Self::Summary;
}

/// Location produced by metric-based search: a leaf ordinal plus an offset
/// inside that leaf's contribution to the metric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Index {
    /// Leaf ordinal, counted from the left.
    pub major: usize,
    /// Offset within the leaf, in metric units.
    pub minor: usize,
}

impl Index {
    pub fn new(major: usize, minor: usize) -> Self {
        Self { major, minor }
    }
}
