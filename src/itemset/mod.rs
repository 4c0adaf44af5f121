//! Itemset algebra over sorted, duplicate-free item code sequences
//!
//! Every function expects its inputs sorted ascending without duplicates.
//! The empty slice plays the role of the "absent" itemset: it is a subset of
//! everything, and nothing non-empty is a subset of it.
//!
//! Unsorted input is a programming error and panics.

use crate::core::ItemCode;

/// True if `itemset` is sorted strictly ascending
pub fn is_canonical(itemset: &[ItemCode]) -> bool {
    itemset.windows(2).all(|w| w[0] < w[1])
}

/// True iff every code of `a` appears in `b`.
///
/// Single merge-style scan, O(|a| + |b|).
pub fn is_subset(a: &[ItemCode], b: &[ItemCode]) -> bool {
    assert!(is_canonical(a), "unsorted itemset: {a:?}");
    assert!(is_canonical(b), "unsorted itemset: {b:?}");

    if a.len() > b.len() {
        return false;
    }

    let mut rest = b.iter();
    'outer: for &x in a {
        for &y in rest.by_ref() {
            if y == x {
                continue 'outer;
            }
            if y > x {
                return false;
            }
        }
        return false;
    }
    true
}

/// Set union of `a` and `b`.
///
/// Computed as a merge, so the result is itself sorted and duplicate-free.
pub fn union(a: &[ItemCode], b: &[ItemCode]) -> Vec<ItemCode> {
    assert!(is_canonical(a), "unsorted itemset: {a:?}");
    assert!(is_canonical(b), "unsorted itemset: {b:?}");

    let mut result = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                result.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                result.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result.extend_from_slice(&a[i..]);
    result.extend_from_slice(&b[j..]);
    result
}

/// Elements of `a` that are also in `b`, in `a`'s order
pub fn intersect(a: &[ItemCode], b: &[ItemCode]) -> Vec<ItemCode> {
    assert!(is_canonical(a), "unsorted itemset: {a:?}");
    assert!(is_canonical(b), "unsorted itemset: {b:?}");

    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let mut j = 0;
    for &x in a {
        while j < b.len() && b[j] < x {
            j += 1;
        }
        if j == b.len() {
            break;
        }
        if b[j] == x {
            result.push(x);
        }
    }
    result
}

/// Positional append without de-duplication; callers guarantee disjointness
pub fn concatenate(a: &[ItemCode], b: &[ItemCode]) -> Vec<ItemCode> {
    let mut result = Vec::with_capacity(a.len() + b.len());
    result.extend_from_slice(a);
    result.extend_from_slice(b);
    result
}

/// Insert `x` into a sorted itemset, keeping it ascending.
///
/// `x` must not already be a member.
pub fn add_new_element(itemset: &[ItemCode], x: ItemCode) -> Vec<ItemCode> {
    assert!(is_canonical(itemset), "unsorted itemset: {itemset:?}");

    let pos = itemset.partition_point(|&v| v < x);
    assert!(itemset.get(pos) != Some(&x), "{x} is already in {itemset:?}");

    let mut result = Vec::with_capacity(itemset.len() + 1);
    result.extend_from_slice(&itemset[..pos]);
    result.push(x);
    result.extend_from_slice(&itemset[pos..]);
    result
}

/// All subsets of `itemset` with exactly one element removed, in removal order
pub fn subsets_without_one(itemset: &[ItemCode]) -> impl Iterator<Item = Vec<ItemCode>> + '_ {
    (0..itemset.len()).map(move |skip| {
        itemset
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip)
            .map(|(_, &v)| v)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_subset_of_everything() {
        assert!(is_subset(&[], &[]));
        assert!(is_subset(&[], &[1, 2, 3]));
    }

    #[test]
    fn test_nothing_non_empty_is_subset_of_empty() {
        assert!(!is_subset(&[0], &[]));
        assert!(!is_subset(&[1, 2], &[]));
    }

    #[test]
    fn test_is_subset() {
        assert!(is_subset(&[1, 3], &[0, 1, 2, 3]));
        assert!(is_subset(&[0, 1, 2, 3], &[0, 1, 2, 3]));
        assert!(!is_subset(&[1, 4], &[0, 1, 2, 3]));
        assert!(!is_subset(&[0, 5], &[1, 5]));
        assert!(!is_subset(&[1, 2, 3], &[1, 2]));
    }

    #[test]
    fn test_union_sorted_and_deduplicated() {
        assert_eq!(union(&[1, 3, 5], &[2, 3, 6]), vec![1, 2, 3, 5, 6]);
        assert_eq!(union(&[], &[4, 7]), vec![4, 7]);
        assert_eq!(union(&[4, 7], &[]), vec![4, 7]);
    }

    #[test]
    fn test_union_commutative_and_idempotent() {
        let a = [0, 2, 4, 9];
        let b = [1, 2, 3, 9, 10];
        assert_eq!(union(&a, &b), union(&b, &a));
        assert_eq!(union(&a, &a), a.to_vec());
        assert_eq!(union(&union(&a, &b), &b), union(&a, &b));
    }

    #[test]
    fn test_intersect() {
        assert_eq!(intersect(&[1, 2, 3, 4], &[2, 4, 6]), vec![2, 4]);
        assert_eq!(intersect(&[1, 2], &[3, 4]), Vec::<ItemCode>::new());
        assert_eq!(intersect(&[], &[3, 4]), Vec::<ItemCode>::new());
        assert_eq!(intersect(&[5, 8], &[]), Vec::<ItemCode>::new());
    }

    #[test]
    fn test_concatenate_keeps_positions() {
        assert_eq!(concatenate(&[1, 2], &[7, 8]), vec![1, 2, 7, 8]);
        assert_eq!(concatenate(&[7], &[1]), vec![7, 1]);
    }

    #[test]
    fn test_add_new_element() {
        assert_eq!(add_new_element(&[1, 3, 5], 4), vec![1, 3, 4, 5]);
        assert_eq!(add_new_element(&[1, 3, 5], 0), vec![0, 1, 3, 5]);
        assert_eq!(add_new_element(&[1, 3, 5], 9), vec![1, 3, 5, 9]);
        assert_eq!(add_new_element(&[], 2), vec![2]);
    }

    #[test]
    fn test_subsets_without_one() {
        let subsets: Vec<_> = subsets_without_one(&[1, 2, 3]).collect();
        assert_eq!(subsets, vec![vec![2, 3], vec![1, 3], vec![1, 2]]);
        assert_eq!(subsets_without_one(&[]).count(), 0);
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical(&[]));
        assert!(is_canonical(&[0, 4, 9]));
        assert!(!is_canonical(&[4, 4]));
        assert!(!is_canonical(&[5, 1]));
    }

    #[test]
    #[should_panic(expected = "unsorted itemset")]
    fn test_is_subset_rejects_unsorted_input() {
        is_subset(&[3, 1], &[1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "unsorted itemset")]
    fn test_union_rejects_unsorted_input() {
        union(&[1, 2], &[4, 4]);
    }

    #[test]
    #[should_panic(expected = "unsorted itemset")]
    fn test_intersect_rejects_unsorted_input() {
        intersect(&[2, 0], &[0, 2]);
    }

    #[test]
    #[should_panic(expected = "already in")]
    fn test_add_new_element_rejects_member() {
        add_new_element(&[1, 3], 3);
    }
}
