//! Small combinatorics helpers for building choice sets.

/// All orderings of a slice, in a deterministic order.
///
/// Reference models for containers with unspecified iteration order use
/// this to enumerate the acceptable next elements or full traversals.
/// Factorial growth makes this practical only for the small instance
/// counts a test sequence produces.
#[must_use]
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.is_empty() {
        return vec![vec![]];
    }
    let mut result = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let mut rest: Vec<T> = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            let mut perm = Vec::with_capacity(items.len());
            perm.push(item.clone());
            perm.append(&mut tail);
            result.push(perm);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_empty_has_one_permutation() {
        assert_eq!(permutations::<i32>(&[]), vec![Vec::<i32>::new()]);
    }

    #[test]
    fn test_single_element() {
        assert_eq!(permutations(&[7]), vec![vec![7]]);
    }

    #[test]
    fn test_three_elements_count_and_uniqueness() {
        let perms = permutations(&[1, 2, 3]);
        assert_eq!(perms.len(), 6);
        let unique: HashSet<Vec<i32>> = perms.iter().cloned().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_each_permutation_is_a_reordering() {
        for perm in permutations(&[1, 2, 3, 4]) {
            let mut sorted = perm.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_first_permutation_is_identity_order() {
        let perms = permutations(&['a', 'b', 'c']);
        assert_eq!(perms[0], vec!['a', 'b', 'c']);
    }
}
