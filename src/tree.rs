//! Persistent summary-augmented 2-3 tree with O(log n) split and join

use std::ops::Range;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::reduce::{Index, Reducer};
use crate::slice::TreeSlice;

// === Core Types ===

/// Immutable sequence of `T` where every subtree caches an associative
/// summary produced by the tree's [`Reducer`].
///
/// Cloning is O(1): versions produced by edits share every subtree off the
/// rebuilt path with their predecessor.
pub struct FingerTree<T, R: Reducer<T>> {
    root: Option<Arc<Node<T, R::Summary>>>,
    reducer: R,
}

/// Tree node - a single element or a branch of 2-3 same-depth children.
///
/// Branch summaries and leaf counts are computed once at construction and
/// never recomputed. The empty tree is the absence of a root, so no node
/// variant represents emptiness and non-empty-only code never sees it.
pub(crate) enum Node<T, S> {
    Leaf {
        item: T,
        summary: S,
    },
    Branch {
        children: Children<T, S>,
        depth: usize,
        leaf_count: usize,
        summary: S,
    },
}

/// Branch arity is part of the type: there is no way to build a branch with
/// fewer than 2 or more than 3 children.
pub(crate) enum Children<T, S> {
    Two([Arc<Node<T, S>>; 2]),
    Three([Arc<Node<T, S>>; 3]),
}

impl<T, S> Children<T, S> {
    #[inline]
    pub(crate) fn as_slice(&self) -> &[Arc<Node<T, S>>] {
        match self {
            Children::Two(c) => c,
            Children::Three(c) => c,
        }
    }

    fn from_slice(nodes: &[Arc<Node<T, S>>]) -> Self {
        match nodes {
            [a, b] => Children::Two([a.clone(), b.clone()]),
            [a, b, c] => Children::Three([a.clone(), b.clone(), c.clone()]),
            _ => unreachable!("branch arity must be 2 or 3, got {}", nodes.len()),
        }
    }
}

impl<T, S> Node<T, S> {
    #[inline]
    pub(crate) fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Branch { depth, .. } => *depth,
        }
    }

    #[inline]
    pub(crate) fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Branch { leaf_count, .. } => *leaf_count,
        }
    }

    #[inline]
    pub(crate) fn summary(&self) -> &S {
        match self {
            Node::Leaf { summary, .. } | Node::Branch { summary, .. } => summary,
        }
    }

    /// Item of the `i`-th leaf under this node. `i` must be within
    /// `0..leaf_count()`.
    fn leaf_item(&self, mut i: usize) -> &T {
        let mut node = self;
        'descend: loop {
            match node {
                Node::Leaf { item, .. } => return item,
                Node::Branch { children, .. } => {
                    for child in children.as_slice() {
                        let lc = child.leaf_count();
                        if i < lc {
                            node = child;
                            continue 'descend;
                        }
                        i -= lc;
                    }
                    unreachable!("leaf index exceeds branch leaf count");
                }
            }
        }
    }

    /// Structural invariants: child depth uniformity and leaf-count sums.
    /// Summary consistency is checked by callers that can compare summaries.
    /// Checked via `debug_assert!` after every structural edit.
    fn structure_ok(&self) -> bool {
        match self {
            Node::Leaf { .. } => true,
            Node::Branch {
                children,
                depth,
                leaf_count,
                ..
            } => {
                let slice = children.as_slice();
                slice
                    .iter()
                    .all(|c| c.depth() + 1 == *depth && c.structure_ok())
                    && slice.iter().map(|c| c.leaf_count()).sum::<usize>() == *leaf_count
            }
        }
    }
}

/// Result of concatenating two subtrees: either a single node, or two nodes
/// of equal depth for the caller to absorb.
enum Joined<T, S> {
    One(Arc<Node<T, S>>),
    Two(Arc<Node<T, S>>, Arc<Node<T, S>>),
}

// === Construction ===

fn leaf<T, R: Reducer<T>>(reducer: &R, item: T) -> Arc<Node<T, R::Summary>> {
    Arc::new(Node::Leaf {
        summary: reducer.apply(&item),
        item,
    })
}

fn branch<T, R: Reducer<T>>(
    reducer: &R,
    nodes: &[Arc<Node<T, R::Summary>>],
) -> Arc<Node<T, R::Summary>> {
    debug_assert!(matches!(nodes.len(), 2 | 3));
    debug_assert!(nodes.windows(2).all(|w| w[0].depth() == w[1].depth()));

    let mut summary = nodes[0].summary().clone();
    for node in &nodes[1..] {
        summary = reducer.reduce(summary, node.summary().clone());
    }
    Arc::new(Node::Branch {
        depth: nodes[0].depth() + 1,
        leaf_count: nodes.iter().map(|n| n.leaf_count()).sum(),
        summary,
        children: Children::from_slice(nodes),
    })
}

impl<T, R: Reducer<T> + Clone> FingerTree<T, R> {
    /// The empty tree.
    pub fn new(reducer: R) -> Self {
        Self {
            root: None,
            reducer,
        }
    }

    /// Tree holding a single leaf.
    pub fn singleton(item: T, reducer: R) -> Self {
        Self {
            root: Some(leaf(&reducer, item)),
            reducer,
        }
    }

    /// O(n) bottom-up build: each level is grouped into threes, except that
    /// a remainder of exactly 4 or 2 nodes is taken as twos, so every branch
    /// ends up with 2 or 3 children and all leaves at equal depth.
    pub fn from_items<I>(items: I, reducer: R) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut level: Vec<Arc<Node<T, R::Summary>>> =
            items.into_iter().map(|item| leaf(&reducer, item)).collect();

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len() / 2 + 1);
            let mut rest: &[Arc<Node<T, R::Summary>>] = &level;
            while !rest.is_empty() {
                let take = match rest.len() {
                    2 | 4 => 2,
                    _ => 3,
                };
                let (group, tail) = rest.split_at(take);
                next.push(branch(&reducer, group));
                rest = tail;
            }
            level = next;
        }

        let tree = Self {
            root: level.pop(),
            reducer,
        };
        debug_assert!(tree.structure_ok());
        tree
    }

    // === Measures ===

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, |r| r.leaf_count())
    }

    /// Height of the tree; the empty tree has no defined depth.
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(|r| r.depth())
    }

    /// Combined summary of all leaves, `None` when empty.
    pub fn summary(&self) -> Option<&R::Summary> {
        self.root.as_ref().map(|r| r.summary())
    }

    /// Total measure of the tree under `metric`; 0 when empty.
    pub fn measure<M>(&self, metric: M) -> usize
    where
        M: Fn(&R::Summary) -> usize,
    {
        self.root.as_ref().map_or(0, |r| metric(r.summary()))
    }

    // === Leaf access ===

    /// Item of the `index`-th leaf, O(log n).
    pub fn leaf(&self, index: usize) -> Result<&T> {
        match self.root.as_deref() {
            Some(root) if index < root.leaf_count() => Ok(root.leaf_item(index)),
            _ => Err(Error::OutOfRange {
                index,
                bound: self.leaf_count(),
            }),
        }
    }

    /// New tree with the `index`-th leaf replaced, sharing every subtree off
    /// the rebuilt path. O(log n).
    pub fn update_leaf(&self, index: usize, item: T) -> Result<Self> {
        let n = self.leaf_count();
        let Some(root) = self.root.as_ref().filter(|_| index < n) else {
            return Err(Error::OutOfRange { index, bound: n });
        };
        let tree = Self {
            root: Some(Self::replaced(root, index, item, &self.reducer)),
            reducer: self.reducer.clone(),
        };
        debug_assert!(tree.structure_ok());
        Ok(tree)
    }

    fn replaced(
        node: &Arc<Node<T, R::Summary>>,
        index: usize,
        item: T,
        reducer: &R,
    ) -> Arc<Node<T, R::Summary>> {
        match node.as_ref() {
            Node::Leaf { .. } => leaf(reducer, item),
            Node::Branch { children, .. } => {
                let slice = children.as_slice();
                let mut offset = 0;
                let mut at = slice.len() - 1;
                for (k, child) in slice.iter().enumerate() {
                    let lc = child.leaf_count();
                    if index < offset + lc {
                        at = k;
                        break;
                    }
                    offset += lc;
                }
                let mut kids = slice.to_vec();
                kids[at] = Self::replaced(&slice[at], index - offset, item, reducer);
                branch(reducer, &kids)
            }
        }
    }

    // === Metric-based location ===

    /// Translate a position under a monotonic metric into an [`Index`].
    ///
    /// At an exact boundary between two leaves the *following* leaf is
    /// returned at minor 0, so leaves measuring zero under `metric` are
    /// skipped over. Requires `0 <= pos <= measure(metric)`.
    pub fn locate_progressively<M>(&self, metric: M, pos: usize) -> Result<Index>
    where
        M: Fn(&R::Summary) -> usize,
    {
        let root = self.checked_locate_root(&metric, pos)?;
        let (major, minor) = Self::locate_prog_node(root, &metric, pos);
        Ok(Index::new(major, minor))
    }

    /// Like [`locate_progressively`](Self::locate_progressively), but at an
    /// exact boundary the *preceding* leaf is returned at its full metric
    /// length.
    pub fn locate_regressively<M>(&self, metric: M, pos: usize) -> Result<Index>
    where
        M: Fn(&R::Summary) -> usize,
    {
        let root = self.checked_locate_root(&metric, pos)?;
        let (major, minor) = Self::locate_regr_node(root, &metric, pos);
        Ok(Index::new(major, minor))
    }

    fn checked_locate_root<M>(&self, metric: &M, pos: usize) -> Result<&Node<T, R::Summary>>
    where
        M: Fn(&R::Summary) -> usize,
    {
        match self.root.as_deref() {
            None => Err(Error::NoSuchElement { index: pos }),
            Some(root) => {
                let total = metric(root.summary());
                if pos > total {
                    Err(Error::OutOfRange {
                        index: pos,
                        bound: total,
                    })
                } else {
                    Ok(root)
                }
            }
        }
    }

    fn locate_prog_node<M>(node: &Node<T, R::Summary>, metric: &M, pos: usize) -> (usize, usize)
    where
        M: Fn(&R::Summary) -> usize,
    {
        match node {
            Node::Leaf { .. } => (0, pos),
            Node::Branch { children, .. } => {
                let slice = children.as_slice();
                let mut pos = pos;
                let mut major = 0;
                for (k, child) in slice.iter().enumerate() {
                    let m = metric(child.summary());
                    if pos < m || k == slice.len() - 1 {
                        let (maj, min) = Self::locate_prog_node(child, metric, pos);
                        return (major + maj, min);
                    }
                    pos -= m;
                    major += child.leaf_count();
                }
                unreachable!("branch has children");
            }
        }
    }

    fn locate_regr_node<M>(node: &Node<T, R::Summary>, metric: &M, pos: usize) -> (usize, usize)
    where
        M: Fn(&R::Summary) -> usize,
    {
        match node {
            Node::Leaf { .. } => (0, pos),
            Node::Branch { children, .. } => {
                let slice = children.as_slice();
                let mut pos = pos;
                let mut major = 0;
                for (k, child) in slice.iter().enumerate() {
                    let m = metric(child.summary());
                    if pos <= m || k == slice.len() - 1 {
                        let (maj, min) = Self::locate_regr_node(child, metric, pos);
                        return (major + maj, min);
                    }
                    pos -= m;
                    major += child.leaf_count();
                }
                unreachable!("branch has children");
            }
        }
    }

    /// Validate a half-open range against an upper bound: inverted ranges
    /// and ends past the bound are distinct errors.
    fn check_range(range: &Range<usize>, bound: usize) -> Result<()> {
        if range.start > range.end {
            return Err(Error::InvertedRange {
                from: range.start,
                to: range.end,
            });
        }
        if range.end > bound {
            return Err(Error::OutOfRange {
                index: range.end,
                bound,
            });
        }
        Ok(())
    }

    // === Folds ===

    /// Linear left-to-right reduction over every leaf.
    pub fn fold<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        match self.root.as_deref() {
            None => init,
            Some(root) => Self::fold_node(root, init, &mut f),
        }
    }

    fn fold_node<B, F>(node: &Node<T, R::Summary>, acc: B, f: &mut F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        match node {
            Node::Leaf { item, .. } => f(acc, item),
            Node::Branch { children, .. } => children
                .as_slice()
                .iter()
                .fold(acc, |acc, child| Self::fold_node(child, acc, f)),
        }
    }

    /// Reduction over the leaves in `range` (leaf indices), pruned by cached
    /// leaf counts so only intersecting subtrees are visited.
    pub fn fold_leafs_between<B, F>(&self, init: B, range: Range<usize>, mut f: F) -> Result<B>
    where
        F: FnMut(B, &T) -> B,
    {
        let n = self.leaf_count();
        Self::check_range(&range, n)?;
        if range.start == range.end {
            return Ok(init);
        }
        let root = self
            .root
            .as_deref()
            .unwrap_or_else(|| unreachable!("non-empty range implies a root"));
        Ok(Self::fold_leaf_range_node(
            root,
            init,
            range.start,
            range.end,
            &mut f,
        ))
    }

    fn fold_leaf_range_node<B, F>(
        node: &Node<T, R::Summary>,
        mut acc: B,
        from: usize,
        to: usize,
        f: &mut F,
    ) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        match node {
            Node::Leaf { item, .. } => f(acc, item),
            Node::Branch { children, .. } => {
                let mut offset = 0;
                for child in children.as_slice() {
                    let lc = child.leaf_count();
                    let lo = from.max(offset);
                    let hi = to.min(offset + lc);
                    if lo < hi {
                        acc = Self::fold_leaf_range_node(child, acc, lo - offset, hi - offset, f);
                    }
                    offset += lc;
                }
                acc
            }
        }
    }

    /// Reduction over the metric interval `range`. Fully covered leaves go
    /// through `whole`; the partially covered boundary leaves go through
    /// `partial` with the sub-interval expressed in leaf-local metric units.
    /// Visits only leaves intersecting the interval: O(log n + k).
    pub fn fold_between<B, M, W, P>(
        &self,
        init: B,
        metric: M,
        range: Range<usize>,
        mut whole: W,
        mut partial: P,
    ) -> Result<B>
    where
        M: Fn(&R::Summary) -> usize,
        W: FnMut(B, &T) -> B,
        P: FnMut(B, &T, usize, usize) -> B,
    {
        let total = self.measure(&metric);
        Self::check_range(&range, total)?;
        if range.start == range.end {
            return Ok(init);
        }
        let root = self
            .root
            .as_deref()
            .unwrap_or_else(|| unreachable!("positive measure implies a root"));
        Ok(Self::fold_metric_node(
            root,
            init,
            &metric,
            range.start,
            range.end,
            &mut whole,
            &mut partial,
        ))
    }

    fn fold_metric_node<B, M, W, P>(
        node: &Node<T, R::Summary>,
        mut acc: B,
        metric: &M,
        from: usize,
        to: usize,
        whole: &mut W,
        partial: &mut P,
    ) -> B
    where
        M: Fn(&R::Summary) -> usize,
        W: FnMut(B, &T) -> B,
        P: FnMut(B, &T, usize, usize) -> B,
    {
        match node {
            Node::Leaf { item, summary } => {
                if from == 0 && to == metric(summary) {
                    whole(acc, item)
                } else {
                    partial(acc, item, from, to)
                }
            }
            Node::Branch { children, .. } => {
                let mut offset = 0;
                for child in children.as_slice() {
                    let m = metric(child.summary());
                    let lo = from.max(offset);
                    let hi = to.min(offset + m);
                    if lo < hi {
                        acc = Self::fold_metric_node(
                            child,
                            acc,
                            metric,
                            lo - offset,
                            hi - offset,
                            whole,
                            partial,
                        );
                    }
                    offset += m;
                }
                acc
            }
        }
    }

    // === Range summaries ===

    /// Combined summary of the leaves in `range` (leaf indices), reusing the
    /// cached summary of every fully covered subtree. `None` for an empty
    /// range.
    pub fn summary_between_leafs(&self, range: Range<usize>) -> Result<Option<R::Summary>> {
        let n = self.leaf_count();
        Self::check_range(&range, n)?;
        if range.start == range.end {
            return Ok(None);
        }
        let root = self
            .root
            .as_deref()
            .unwrap_or_else(|| unreachable!("non-empty range implies a root"));
        Ok(Some(Self::summary_leaf_range_node(
            root,
            &self.reducer,
            range.start,
            range.end,
        )))
    }

    fn summary_leaf_range_node(
        node: &Node<T, R::Summary>,
        reducer: &R,
        from: usize,
        to: usize,
    ) -> R::Summary {
        if from == 0 && to == node.leaf_count() {
            return node.summary().clone();
        }
        match node {
            Node::Leaf { .. } => unreachable!("partial coverage of a single leaf"),
            Node::Branch { children, .. } => {
                let mut offset = 0;
                let mut acc: Option<R::Summary> = None;
                for child in children.as_slice() {
                    let lc = child.leaf_count();
                    let lo = from.max(offset);
                    let hi = to.min(offset + lc);
                    if lo < hi {
                        let part =
                            Self::summary_leaf_range_node(child, reducer, lo - offset, hi - offset);
                        acc = Some(match acc {
                            None => part,
                            Some(prev) => reducer.reduce(prev, part),
                        });
                    }
                    offset += lc;
                }
                acc.unwrap_or_else(|| unreachable!("non-empty range intersects a child"))
            }
        }
    }

    /// Combined summary of the metric interval `range`: interior full-leaf
    /// summaries come from the cache, the two boundary partial leaves from
    /// `sub_summary(item, from, to)` (leaf-local metric units). `None` for
    /// an empty range.
    pub fn summary_between<M, F>(
        &self,
        metric: M,
        range: Range<usize>,
        sub_summary: F,
    ) -> Result<Option<R::Summary>>
    where
        M: Fn(&R::Summary) -> usize,
        F: Fn(&T, usize, usize) -> R::Summary,
    {
        let total = self.measure(&metric);
        Self::check_range(&range, total)?;
        if range.start == range.end {
            return Ok(None);
        }
        let root = self
            .root
            .as_deref()
            .unwrap_or_else(|| unreachable!("positive measure implies a root"));
        Ok(Some(Self::summary_metric_range_node(
            root,
            &self.reducer,
            &metric,
            range.start,
            range.end,
            &sub_summary,
        )))
    }

    fn summary_metric_range_node<M, F>(
        node: &Node<T, R::Summary>,
        reducer: &R,
        metric: &M,
        from: usize,
        to: usize,
        sub_summary: &F,
    ) -> R::Summary
    where
        M: Fn(&R::Summary) -> usize,
        F: Fn(&T, usize, usize) -> R::Summary,
    {
        if from == 0 && to == metric(node.summary()) {
            return node.summary().clone();
        }
        match node {
            Node::Leaf { item, .. } => sub_summary(item, from, to),
            Node::Branch { children, .. } => {
                let mut offset = 0;
                let mut acc: Option<R::Summary> = None;
                for child in children.as_slice() {
                    let m = metric(child.summary());
                    let lo = from.max(offset);
                    let hi = to.min(offset + m);
                    if lo < hi {
                        let part = Self::summary_metric_range_node(
                            child,
                            reducer,
                            metric,
                            lo - offset,
                            hi - offset,
                            sub_summary,
                        );
                        acc = Some(match acc {
                            None => part,
                            Some(prev) => reducer.reduce(prev, part),
                        });
                    }
                    offset += m;
                }
                acc.unwrap_or_else(|| unreachable!("non-empty range intersects a child"))
            }
        }
    }

    // === Split and join ===

    /// Split into the leaves before `index` and the leaves from `index` on.
    /// Rebuilds only the path to the split point; `split(0)` is
    /// `(empty, self)`. O(log n).
    pub fn split(&self, index: usize) -> Result<(Self, Self)> {
        let n = self.leaf_count();
        if index > n {
            return Err(Error::OutOfRange { index, bound: n });
        }
        match self.root.as_ref() {
            None => Ok((self.clone(), self.clone())),
            Some(root) => {
                let (left, right) = Self::split_node(root, index, &self.reducer);
                let left = Self {
                    root: left,
                    reducer: self.reducer.clone(),
                };
                let right = Self {
                    root: right,
                    reducer: self.reducer.clone(),
                };
                debug_assert!(left.structure_ok() && right.structure_ok());
                Ok((left, right))
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn split_node(
        node: &Arc<Node<T, R::Summary>>,
        index: usize,
        reducer: &R,
    ) -> (
        Option<Arc<Node<T, R::Summary>>>,
        Option<Arc<Node<T, R::Summary>>>,
    ) {
        if index == 0 {
            return (None, Some(node.clone()));
        }
        if index == node.leaf_count() {
            return (Some(node.clone()), None);
        }
        match node.as_ref() {
            Node::Leaf { .. } => unreachable!("leaf splits are 0 or 1 and handled above"),
            Node::Branch { children, .. } => {
                let slice = children.as_slice();
                let mut offset = 0;
                for (k, child) in slice.iter().enumerate() {
                    let lc = child.leaf_count();
                    if index < offset + lc {
                        if index == offset {
                            // Clean boundary between children: no subtree is cut.
                            return (
                                Self::concat_all(&slice[..k], reducer),
                                Self::concat_all(&slice[k..], reducer),
                            );
                        }
                        let (cl, cr) = Self::split_node(child, index - offset, reducer);
                        let left =
                            Self::concat_opt(Self::concat_all(&slice[..k], reducer), cl, reducer);
                        let right = Self::concat_opt(
                            cr,
                            Self::concat_all(&slice[k + 1..], reducer),
                            reducer,
                        );
                        return (left, right);
                    }
                    offset += lc;
                }
                unreachable!("split index within branch leaf count");
            }
        }
    }

    fn concat_all(
        nodes: &[Arc<Node<T, R::Summary>>],
        reducer: &R,
    ) -> Option<Arc<Node<T, R::Summary>>> {
        nodes.iter().fold(None, |acc, node| {
            Some(match acc {
                None => node.clone(),
                Some(prev) => Self::concat(&prev, node, reducer),
            })
        })
    }

    fn concat_opt(
        a: Option<Arc<Node<T, R::Summary>>>,
        b: Option<Arc<Node<T, R::Summary>>>,
        reducer: &R,
    ) -> Option<Arc<Node<T, R::Summary>>> {
        match (a, b) {
            (None, other) | (other, None) => other,
            (Some(a), Some(b)) => Some(Self::concat(&a, &b, reducer)),
        }
    }

    /// Concatenate with `other`. Touches only nodes along the seam, so the
    /// cost is O(|depth delta| + 1) and the resulting depth is within 1 of
    /// the deeper input.
    pub fn join(&self, other: &Self) -> Self {
        let tree = match (self.root.as_ref(), other.root.as_ref()) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) => Self {
                root: Some(Self::concat(a, b, &self.reducer)),
                reducer: self.reducer.clone(),
            },
        };
        debug_assert!(tree.structure_ok());
        tree
    }

    fn concat(
        a: &Arc<Node<T, R::Summary>>,
        b: &Arc<Node<T, R::Summary>>,
        reducer: &R,
    ) -> Arc<Node<T, R::Summary>> {
        match Self::append(a, b, reducer) {
            Joined::One(node) => node,
            Joined::Two(x, y) => branch(reducer, &[x, y]),
        }
    }

    /// Merge two subtrees of arbitrary relative depth into one or two nodes
    /// of depth `max(depth(a), depth(b))`.
    fn append(
        a: &Arc<Node<T, R::Summary>>,
        b: &Arc<Node<T, R::Summary>>,
        reducer: &R,
    ) -> Joined<T, R::Summary> {
        use std::cmp::Ordering;
        match a.depth().cmp(&b.depth()) {
            Ordering::Equal => Joined::Two(a.clone(), b.clone()),
            Ordering::Greater => {
                let Node::Branch { children, .. } = a.as_ref() else {
                    unreachable!("deeper node is a branch");
                };
                let slice = children.as_slice();
                let (prefix, last) = slice.split_at(slice.len() - 1);
                let seam = Self::append(&last[0], b, reducer);
                Self::absorb(prefix, seam, &[], reducer)
            }
            Ordering::Less => {
                let Node::Branch { children, .. } = b.as_ref() else {
                    unreachable!("deeper node is a branch");
                };
                let slice = children.as_slice();
                let (first, suffix) = slice.split_at(1);
                let seam = Self::append(a, &first[0], reducer);
                Self::absorb(&[], seam, suffix, reducer)
            }
        }
    }

    /// Re-group a seam result with the untouched siblings into 2-3 branches.
    fn absorb(
        prefix: &[Arc<Node<T, R::Summary>>],
        seam: Joined<T, R::Summary>,
        suffix: &[Arc<Node<T, R::Summary>>],
        reducer: &R,
    ) -> Joined<T, R::Summary> {
        let mut kids: Vec<Arc<Node<T, R::Summary>>> =
            Vec::with_capacity(prefix.len() + suffix.len() + 2);
        kids.extend_from_slice(prefix);
        match seam {
            Joined::One(n) => kids.push(n),
            Joined::Two(x, y) => {
                kids.push(x);
                kids.push(y);
            }
        }
        kids.extend_from_slice(suffix);
        match kids.len() {
            2 | 3 => Joined::One(branch(reducer, &kids)),
            4 => Joined::Two(branch(reducer, &kids[..2]), branch(reducer, &kids[2..])),
            n => unreachable!("seam absorption produced {n} children"),
        }
    }

    // === Compositional edits ===

    /// Insert a leaf before position `index` (`index == leaf_count` appends).
    pub fn insert_leaf(&self, index: usize, item: T) -> Result<Self> {
        let (left, right) = self.split(index)?;
        Ok(left.append_leaf(item).join(&right))
    }

    /// Append a leaf at the end. O(log n).
    pub fn append_leaf(&self, item: T) -> Self {
        let single = leaf(&self.reducer, item);
        let root = match self.root.as_ref() {
            None => single,
            Some(root) => Self::concat(root, &single, &self.reducer),
        };
        Self {
            root: Some(root),
            reducer: self.reducer.clone(),
        }
    }

    /// Remove the leaves in `range` (leaf indices).
    pub fn remove_leafs(&self, range: Range<usize>) -> Result<Self> {
        Self::check_range(&range, self.leaf_count())?;
        let (prefix, rest) = self.split(range.start)?;
        let (_, suffix) = rest.split(range.end - range.start)?;
        Ok(prefix.join(&suffix))
    }

    // === Views ===

    /// O(1) lazy list view over all leaves.
    pub fn as_slice(&self) -> TreeSlice<T, R> {
        TreeSlice::new(self.clone(), 0..self.leaf_count())
    }

    pub(crate) fn root_node(&self) -> Option<&Node<T, R::Summary>> {
        self.root.as_deref()
    }

    fn structure_ok(&self) -> bool {
        self.root.as_ref().map_or(true, |r| r.structure_ok())
    }
}

impl<T, R: Reducer<T> + Clone> Clone for FingerTree<T, R> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            reducer: self.reducer.clone(),
        }
    }
}

impl<T: std::fmt::Debug, R: Reducer<T> + Clone> std::fmt::Debug for FingerTree<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice().iter()).finish()
    }
}
