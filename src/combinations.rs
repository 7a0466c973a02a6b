//! The `combinations` module enumerates all subsets of a given size of the indices
//! `0..size` in lexicographic order.
//!
//! Only the current combination is kept in memory, so the memory usage is `O(k)` regardless
//! of the number of combinations.
//!

use crate::math::binomial;

/// This struct is an iterator over all `k`-subsets of `0..size`.
///
/// Each subset is returned as a strictly increasing vector of indices.
#[derive(Clone, Debug)]
pub struct Combinations {
    /// The size of the index range.
    size: usize,
    /// The current combination, or `None` once the enumeration is exhausted.
    indices: Option<Vec<usize>>,
    /// The number of remaining combinations, if it fits into a `u64`.
    remaining: Option<u64>,
}

impl Combinations {
    /// The function creates a new iterator over all `k`-subsets of `0..size`.
    ///
    /// * `size` - The size of the index range.
    /// * `k` - The size of the subsets.
    pub fn new(size: usize, k: usize) -> Self {
        let indices = if k <= size {
            Some((0..k).collect())
        } else {
            None
        };
        Combinations {
            size,
            indices,
            remaining: binomial(size, k),
        }
    }

    /// The function advances the given combination to its lexicographic successor.
    ///
    /// The rightmost index that is not at its maximum position `size - k + offset` is
    /// incremented and all indices to its right are reset to consecutive values. The function
    /// returns false if there is no successor.
    fn advance(indices: &mut [usize], size: usize) -> bool {
        let k = indices.len();
        match (0..k).rev().find(|&offset| indices[offset] != size - k + offset) {
            Some(offset) => {
                indices[offset] += 1;
                for position in offset + 1..k {
                    indices[position] = indices[position - 1] + 1;
                }
                true
            }
            None => false,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.indices.take()?;
        let mut successor = current.clone();
        if Self::advance(&mut successor, self.size) {
            self.indices = Some(successor);
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(remaining) if remaining <= usize::MAX as u64 => {
                (remaining as usize, Some(remaining as usize))
            }
            _ => (usize::MAX, None),
        }
    }
}

/// The function returns an iterator over all `k`-subsets of `0..size` in lexicographic order.
///
/// The iterator yields exactly `C(size, k)` combinations. Every call returns a fresh
/// iterator.
///
/// * `size` - The size of the index range.
/// * `k` - The size of the subsets.
pub fn enumerate(size: usize, k: usize) -> Combinations {
    Combinations::new(size, k)
}

// ******************************** TESTS ********************************

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    /// The function verifies the enumeration order for a small example.
    fn test_lexicographic_order() {
        let combinations: Vec<Vec<usize>> = enumerate(4, 2).collect();
        assert_eq!(
            combinations,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[test]
    /// The function verifies the number, ordering, and uniqueness of the combinations.
    fn test_enumeration_properties() {
        for size in 1..=9 {
            for k in 1..=size {
                let combinations: Vec<Vec<usize>> = enumerate(size, k).collect();
                assert_eq!(combinations.len() as u64, binomial(size, k).unwrap());
                let unique: HashSet<&Vec<usize>> = combinations.iter().collect();
                assert_eq!(unique.len(), combinations.len());
                for combination in &combinations {
                    assert_eq!(combination.len(), k);
                    assert!(combination.windows(2).all(|pair| pair[0] < pair[1]));
                    assert!(combination.iter().all(|&index| index < size));
                }
                // The combinations are sorted lexicographically.
                assert!(combinations.windows(2).all(|pair| pair[0] < pair[1]));
                // Every index is covered.
                let covered: HashSet<usize> = combinations.iter().flatten().cloned().collect();
                assert_eq!(covered.len(), size);
            }
        }
    }

    #[test]
    /// The function tests the edge cases of the enumeration.
    fn test_edge_cases() {
        assert_eq!(enumerate(5, 5).collect::<Vec<_>>(), vec![vec![0, 1, 2, 3, 4]]);
        assert_eq!(enumerate(3, 4).count(), 0);
        assert_eq!(enumerate(3, 0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
        assert_eq!(enumerate(0, 0).count(), 1);
    }

    #[test]
    /// The function verifies that the size hint is exact and that iterators are restartable.
    fn test_size_hint_and_restart() {
        let mut combinations = enumerate(6, 3);
        assert_eq!(combinations.size_hint(), (20, Some(20)));
        combinations.next();
        assert_eq!(combinations.size_hint(), (19, Some(19)));
        assert_eq!(combinations.count(), 19);
        assert_eq!(enumerate(6, 3).count(), 20);
    }
}
