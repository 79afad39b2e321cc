//! Lazy list views over a tree with stack-based cursor iteration

use std::ops::Range;

use crate::error::{Error, Result};
use crate::reduce::Reducer;
use crate::tree::{FingerTree, Node};

/// A lazy, immutable list view over a contiguous leaf range of a
/// [`FingerTree`].
///
/// The view holds its own O(1) handle to the tree snapshot it was created
/// from, so it stays valid (and unchanged) across later edits to the source.
/// Retaining a view pins the shared subtrees it covers from collection;
/// that is the documented cost of laziness, not a defect.
pub struct TreeSlice<T, R: Reducer<T>> {
    tree: FingerTree<T, R>,
    range: Range<usize>,
}

impl<T, R: Reducer<T> + Clone> TreeSlice<T, R> {
    pub(crate) fn new(tree: FingerTree<T, R>, range: Range<usize>) -> Self {
        debug_assert!(range.start <= range.end && range.end <= tree.leaf_count());
        Self { tree, range }
    }

    pub fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Element at `index` within the view, O(log n).
    pub fn get(&self, index: usize) -> Result<&T> {
        if index >= self.len() {
            return Err(Error::OutOfRange {
                index,
                bound: self.len(),
            });
        }
        self.tree.leaf(self.range.start + index)
    }

    /// Narrowed view with ordinary list slicing semantics. The new view is
    /// itself lazy and shares the same snapshot.
    pub fn sub_slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end {
            return Err(Error::InvertedRange {
                from: range.start,
                to: range.end,
            });
        }
        if range.end > self.len() {
            return Err(Error::OutOfRange {
                index: range.end,
                bound: self.len(),
            });
        }
        Ok(Self {
            tree: self.tree.clone(),
            range: self.range.start + range.start..self.range.start + range.end,
        })
    }

    /// Double-ended leaf iterator: O(n) total for a full walk, O(1)
    /// amortized per step, with a bounded O(log n) stack.
    pub fn iter(&self) -> Leaves<'_, T, R::Summary> {
        Leaves::new(self.tree.root_node(), self.range.clone())
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T: std::fmt::Debug, R: Reducer<T> + Clone> std::fmt::Debug for TreeSlice<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSlice")
            .field("tree", &self.tree)
            .field("range", &self.range)
            .finish()
    }
}

impl<'a, T, R: Reducer<T> + Clone> IntoIterator for &'a TreeSlice<T, R> {
    type Item = &'a T;
    type IntoIter = Leaves<'a, T, R::Summary>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the leaves of a [`TreeSlice`].
///
/// Both ends keep a stack of pending subtrees; a shared remaining count
/// makes mixed `next`/`next_back` stop at the meeting point.
pub struct Leaves<'a, T, S> {
    front: Vec<&'a Node<T, S>>,
    back: Vec<&'a Node<T, S>>,
    remaining: usize,
}

impl<'a, T, S> Leaves<'a, T, S> {
    fn new(root: Option<&'a Node<T, S>>, range: Range<usize>) -> Self {
        let mut iter = Self {
            front: Vec::new(),
            back: Vec::new(),
            remaining: range.end - range.start,
        };
        if let Some(root) = root {
            if !range.is_empty() {
                iter.seed_front(root, range.start);
                iter.seed_back(root, root.leaf_count() - range.end);
            }
        }
        iter
    }

    /// Descend to the leaf `skip` positions in, stacking the later siblings
    /// encountered along the path for the forward walk.
    fn seed_front(&mut self, mut node: &'a Node<T, S>, mut skip: usize) {
        loop {
            match node {
                Node::Leaf { .. } => {
                    self.front.push(node);
                    return;
                }
                Node::Branch { children, .. } => {
                    let slice = children.as_slice();
                    let mut offset = 0;
                    let mut at = slice.len() - 1;
                    for (k, child) in slice.iter().enumerate() {
                        let lc = child.leaf_count();
                        if skip < offset + lc {
                            at = k;
                            break;
                        }
                        offset += lc;
                    }
                    for child in slice[at + 1..].iter().rev() {
                        self.front.push(child);
                    }
                    node = &slice[at];
                    skip -= offset;
                }
            }
        }
    }

    /// Mirror of `seed_front`: descend to the leaf `skip` positions from the
    /// right end, stacking earlier siblings for the backward walk.
    fn seed_back(&mut self, mut node: &'a Node<T, S>, mut skip: usize) {
        loop {
            match node {
                Node::Leaf { .. } => {
                    self.back.push(node);
                    return;
                }
                Node::Branch { children, .. } => {
                    let slice = children.as_slice();
                    let mut offset = 0;
                    let mut at = 0;
                    for (k, child) in slice.iter().enumerate().rev() {
                        let lc = child.leaf_count();
                        if skip < offset + lc {
                            at = k;
                            break;
                        }
                        offset += lc;
                    }
                    for child in &slice[..at] {
                        self.back.push(child);
                    }
                    node = &slice[at];
                    skip -= offset;
                }
            }
        }
    }
}

impl<'a, T, S> Iterator for Leaves<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            match self.front.pop()? {
                Node::Leaf { item, .. } => {
                    self.remaining -= 1;
                    return Some(item);
                }
                Node::Branch { children, .. } => {
                    for child in children.as_slice().iter().rev() {
                        self.front.push(child);
                    }
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, S> DoubleEndedIterator for Leaves<'_, T, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            match self.back.pop()? {
                Node::Leaf { item, .. } => {
                    self.remaining -= 1;
                    return Some(item);
                }
                Node::Branch { children, .. } => {
                    for child in children.as_slice() {
                        self.back.push(child);
                    }
                }
            }
        }
    }
}

impl<T, S> ExactSizeIterator for Leaves<'_, T, S> {}
