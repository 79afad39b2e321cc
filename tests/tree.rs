use sparse_seq::{Error, FingerTree, Index, Reducer};

/// Counts leaves; every leaf measures 1.
#[derive(Clone, Copy)]
struct Count;

impl Reducer<i64> for Count {
    type Summary = usize;

    fn apply(&self, _: &i64) -> usize {
        1
    }

    fn reduce(&self, a: usize, b: usize) -> usize {
        a + b
    }
}

/// Length-and-sum summary over runs of numbers, for metric tests where
/// leaves measure differently (including zero).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct LenSum {
    len: usize,
    sum: i64,
}

#[derive(Clone, Copy)]
struct LenSumReducer;

impl Reducer<Vec<i64>> for LenSumReducer {
    type Summary = LenSum;

    fn apply(&self, run: &Vec<i64>) -> LenSum {
        LenSum {
            len: run.len(),
            sum: run.iter().sum(),
        }
    }

    fn reduce(&self, a: LenSum, b: LenSum) -> LenSum {
        LenSum {
            len: a.len + b.len,
            sum: a.sum + b.sum,
        }
    }
}

fn by_len(s: &LenSum) -> usize {
    s.len
}

fn count_tree(n: i64) -> FingerTree<i64, Count> {
    FingerTree::from_items(0..n, Count)
}

#[test]
fn test_build_and_leaf_access() {
    for n in [0, 1, 2, 3, 4, 5, 7, 16, 100] {
        let tree = count_tree(n);
        assert_eq!(tree.leaf_count(), n as usize);
        for i in 0..n as usize {
            assert_eq!(*tree.leaf(i).unwrap(), i as i64);
        }
        assert_eq!(
            tree.leaf(n as usize),
            Err(Error::OutOfRange {
                index: n as usize,
                bound: n as usize
            })
        );
    }
}

#[test]
fn test_empty_tree() {
    let tree = count_tree(0);
    assert!(tree.is_empty());
    assert_eq!(tree.summary(), None);
    assert_eq!(tree.depth(), None);
    assert_eq!(
        tree.locate_progressively(|&c| c, 0),
        Err(Error::NoSuchElement { index: 0 })
    );
    let (l, r) = tree.split(0).unwrap();
    assert!(l.is_empty() && r.is_empty());
}

#[test]
fn test_depth_stays_logarithmic() {
    let tree = count_tree(1000);
    let depth = tree.depth().unwrap();
    // log3(1000) <= depth <= log2(1000)
    assert!((7..=10).contains(&depth), "depth {depth}");
}

#[test]
fn test_summary_is_reduced_over_all_leaves() {
    let tree = FingerTree::from_items(vec![vec![1, 2], vec![], vec![3, 4, 5]], LenSumReducer);
    assert_eq!(tree.summary(), Some(&LenSum { len: 5, sum: 15 }));
    assert_eq!(tree.measure(by_len), 5);
}

#[test]
fn test_update_leaf_shares_off_path() {
    let tree = count_tree(10);
    let updated = tree.update_leaf(3, 42).unwrap();
    assert_eq!(*updated.leaf(3).unwrap(), 42);
    // Other leaves and the original tree are untouched.
    for i in (0..10).filter(|&i| i != 3) {
        assert_eq!(*updated.leaf(i).unwrap(), i as i64);
    }
    assert_eq!(*tree.leaf(3).unwrap(), 3);
    assert_eq!(
        tree.update_leaf(10, 0).unwrap_err(),
        Error::OutOfRange {
            index: 10,
            bound: 10
        }
    );
}

#[test]
fn test_split_join_round_trip() {
    for n in [1, 2, 3, 5, 8, 13, 27] {
        let tree = count_tree(n);
        let expected: Vec<i64> = (0..n).collect();
        for k in 0..=n as usize {
            let (left, right) = tree.split(k).unwrap();
            assert_eq!(left.leaf_count(), k);
            assert_eq!(right.leaf_count(), n as usize - k);
            let rejoined = left.join(&right);
            assert_eq!(rejoined.as_slice().to_vec(), expected);
        }
    }
}

#[test]
fn test_join_associativity() {
    let a = count_tree(5);
    let b = FingerTree::from_items(100..117, Count);
    let c = FingerTree::from_items(200..202, Count);

    let left_first = a.join(&b).join(&c);
    let right_first = a.join(&b.join(&c));
    assert_eq!(
        left_first.as_slice().to_vec(),
        right_first.as_slice().to_vec()
    );
    assert_eq!(left_first.leaf_count(), 24);
}

#[test]
fn test_join_depth_near_deeper_input() {
    let big = count_tree(243);
    let small = FingerTree::from_items(0..2, Count);
    let joined = big.join(&small);
    let deeper = big.depth().unwrap().max(small.depth().unwrap());
    assert!(joined.depth().unwrap() <= deeper + 1);
    assert_eq!(joined.leaf_count(), 245);
}

#[test]
fn test_insert_and_remove_leafs() {
    let tree = count_tree(6);
    let inserted = tree.insert_leaf(2, 99).unwrap();
    assert_eq!(inserted.as_slice().to_vec(), vec![0, 1, 99, 2, 3, 4, 5]);

    let removed = inserted.remove_leafs(1..4).unwrap();
    assert_eq!(removed.as_slice().to_vec(), vec![0, 3, 4, 5]);

    let appended = removed.append_leaf(7);
    assert_eq!(appended.as_slice().to_vec(), vec![0, 3, 4, 5, 7]);

    // `insert_leaf(leaf_count)` appends; one past that is out of range.
    assert_eq!(
        appended.insert_leaf(6, 9).unwrap_err(),
        Error::OutOfRange { index: 6, bound: 5 }
    );
    assert_eq!(
        appended.remove_leafs(2..6).unwrap_err(),
        Error::OutOfRange { index: 6, bound: 5 }
    );
}

#[test]
fn test_inverted_ranges_are_rejected() {
    let tree = count_tree(6);
    assert_eq!(
        tree.remove_leafs(4..2).unwrap_err(),
        Error::InvertedRange { from: 4, to: 2 }
    );
    assert_eq!(
        tree.fold_leafs_between(0i64, 5..1, |acc, &x| acc + x),
        Err(Error::InvertedRange { from: 5, to: 1 })
    );
    assert_eq!(
        tree.summary_between_leafs(3..0),
        Err(Error::InvertedRange { from: 3, to: 0 })
    );
    assert_eq!(
        tree.as_slice().sub_slice(4..1).unwrap_err(),
        Error::InvertedRange { from: 4, to: 1 }
    );
}

#[test]
fn test_locate_progressively_boundaries() {
    let tree = FingerTree::from_items(vec![vec![1, 2], vec![3], vec![4, 5, 6]], LenSumReducer);
    // measure = 6 over leaves of metric lengths 2, 1, 3
    assert_eq!(
        tree.locate_progressively(by_len, 0).unwrap(),
        Index::new(0, 0)
    );
    assert_eq!(
        tree.locate_progressively(by_len, 1).unwrap(),
        Index::new(0, 1)
    );
    // Exact boundary goes to the following leaf at minor 0.
    assert_eq!(
        tree.locate_progressively(by_len, 2).unwrap(),
        Index::new(1, 0)
    );
    assert_eq!(
        tree.locate_progressively(by_len, 3).unwrap(),
        Index::new(2, 0)
    );
    assert_eq!(
        tree.locate_progressively(by_len, 5).unwrap(),
        Index::new(2, 2)
    );
    assert_eq!(
        tree.locate_progressively(by_len, 7),
        Err(Error::OutOfRange { index: 7, bound: 6 })
    );
}

#[test]
fn test_locate_regressively_boundaries() {
    let tree = FingerTree::from_items(vec![vec![1, 2], vec![3], vec![4, 5, 6]], LenSumReducer);
    assert_eq!(
        tree.locate_regressively(by_len, 0).unwrap(),
        Index::new(0, 0)
    );
    // Exact boundary goes to the preceding leaf at its full metric length.
    assert_eq!(
        tree.locate_regressively(by_len, 2).unwrap(),
        Index::new(0, 2)
    );
    assert_eq!(
        tree.locate_regressively(by_len, 3).unwrap(),
        Index::new(1, 1)
    );
    // The total measure addresses the last leaf, never past the end.
    assert_eq!(
        tree.locate_regressively(by_len, 6).unwrap(),
        Index::new(2, 3)
    );
    assert_eq!(
        tree.locate_regressively(by_len, 7),
        Err(Error::OutOfRange { index: 7, bound: 6 })
    );
}

#[test]
fn test_locate_progressively_skips_zero_measure_leaves() {
    let tree = FingerTree::from_items(vec![vec![1, 2], vec![], vec![3]], LenSumReducer);
    // Position 2 sits at the end of leaf 0; the empty leaf contributes no
    // measure, so the progressive form lands on leaf 2.
    assert_eq!(
        tree.locate_progressively(by_len, 2).unwrap(),
        Index::new(2, 0)
    );
    assert_eq!(
        tree.locate_regressively(by_len, 2).unwrap(),
        Index::new(0, 2)
    );
}

#[test]
fn test_fold_and_fold_leafs_between() {
    let tree = count_tree(10);
    assert_eq!(tree.fold(0i64, |acc, &x| acc + x), 45);
    assert_eq!(
        tree.fold_leafs_between(0i64, 2..5, |acc, &x| acc + x)
            .unwrap(),
        2 + 3 + 4
    );
    assert_eq!(
        tree.fold_leafs_between(0i64, 4..4, |acc, &x| acc + x)
            .unwrap(),
        0
    );
    assert!(tree
        .fold_leafs_between(0i64, 4..11, |acc, &x| acc + x)
        .is_err());
}

#[test]
fn test_fold_between_visits_partial_boundaries() {
    let tree = FingerTree::from_items(vec![vec![1, 2], vec![3], vec![4, 5, 6]], LenSumReducer);
    // Sum over metric positions 1..5 = 2 + 3 + 4 + 5
    let sum = tree
        .fold_between(
            0i64,
            by_len,
            1..5,
            |acc, run| acc + run.iter().sum::<i64>(),
            |acc, run, lo, hi| acc + run[lo..hi].iter().sum::<i64>(),
        )
        .unwrap();
    assert_eq!(sum, 14);
}

#[test]
fn test_summary_between_leafs() {
    let tree = count_tree(10);
    assert_eq!(tree.summary_between_leafs(2..7).unwrap(), Some(5));
    assert_eq!(tree.summary_between_leafs(3..3).unwrap(), None);
    assert!(tree.summary_between_leafs(3..11).is_err());
}

#[test]
fn test_summary_between_metric_range() {
    let tree = FingerTree::from_items(vec![vec![1, 2], vec![3], vec![4, 5, 6]], LenSumReducer);
    let sub = |run: &Vec<i64>, lo: usize, hi: usize| LenSum {
        len: hi - lo,
        sum: run[lo..hi].iter().sum(),
    };
    assert_eq!(
        tree.summary_between(by_len, 1..5, sub).unwrap(),
        Some(LenSum { len: 4, sum: 14 })
    );
    assert_eq!(
        tree.summary_between(by_len, 0..6, sub).unwrap(),
        Some(LenSum { len: 6, sum: 21 })
    );
    assert_eq!(tree.summary_between(by_len, 4..4, sub).unwrap(), None);
}

#[test]
fn test_slice_matches_source_and_sub_slices() {
    let items: Vec<i64> = (0..50).collect();
    let tree = FingerTree::from_items(items.clone(), Count);
    let slice = tree.as_slice();
    assert_eq!(slice.to_vec(), items);

    // Repeated narrowing matches ordinary list slicing.
    let sub = slice.sub_slice(10..40).unwrap();
    assert_eq!(sub.to_vec(), items[10..40].to_vec());
    let sub_sub = sub.sub_slice(5..20).unwrap();
    assert_eq!(sub_sub.to_vec(), items[15..30].to_vec());
    assert_eq!(*sub_sub.get(0).unwrap(), 15);
    assert!(sub_sub.get(15).is_err());
    assert!(sub.sub_slice(5..31).is_err());
}

#[test]
fn test_slice_iteration_both_ways() {
    let tree = count_tree(20);
    let slice = tree.as_slice();
    let sub = slice.sub_slice(3..17).unwrap();

    let forward: Vec<i64> = sub.iter().copied().collect();
    assert_eq!(forward, (3..17).collect::<Vec<i64>>());

    let backward: Vec<i64> = sub.iter().rev().copied().collect();
    assert_eq!(backward, (3..17).rev().collect::<Vec<i64>>());

    // Mixed consumption meets in the middle without overlap.
    let mut iter = sub.iter();
    assert_eq!(iter.len(), 14);
    let mut seen = Vec::new();
    loop {
        let item = if seen.len() % 2 == 0 {
            iter.next()
        } else {
            iter.next_back()
        };
        match item {
            Some(&x) => seen.push(x),
            None => break,
        }
    }
    seen.sort_unstable();
    assert_eq!(seen, (3..17).collect::<Vec<i64>>());
}

#[test]
fn test_slice_view_survives_source_edits() {
    let tree = count_tree(8);
    let slice = tree.as_slice();
    let edited = tree.update_leaf(0, 100).unwrap();
    // The view still sees the snapshot it was created from.
    assert_eq!(*slice.get(0).unwrap(), 0);
    assert_eq!(*edited.as_slice().get(0).unwrap(), 100);
}
