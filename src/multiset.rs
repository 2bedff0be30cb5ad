//! # Multiset permutations
//!
//! Lazy generation of the distinct orderings of a multiset of labels, and the
//! closed-form count of those orderings.
//!
//! [`UniquePermutations`] steps through the orderings with the classic
//! "next lexicographic permutation" rule, so every distinct arrangement is
//! produced exactly once, in lexicographic order, starting from the sorted
//! multiset. No seen-set is kept and the full factorial list is never built.
//!
//! [`colourings`] builds on it to produce every assignment of `dim` sites
//! from a set of colours, with unrestricted occupancy.

use std::{collections::BTreeMap, iter::FusedIterator};

use itertools::{Either, Itertools};

/// Iterator over every distinct ordering of a multiset, in lexicographic order.
///
/// # Examples
///
/// ```
/// use sitesym::multiset::unique_permutations;
///
/// let orderings: Vec<_> = unique_permutations(vec![1, 0, 1]).collect();
/// assert_eq!(orderings, vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]]);
/// ```
#[derive(Debug, Clone)]
pub struct UniquePermutations<T> {
    current: Vec<T>,
    done: bool,
}

impl<T: Ord + Clone> UniquePermutations<T> {
    pub fn new(mut multiset: Vec<T>) -> Self {
        multiset.sort();
        UniquePermutations {
            current: multiset,
            done: false,
        }
    }

    /// Advances `current` to its lexicographic successor.
    /// Returns `false` once the sequence is weakly decreasing.
    fn advance(&mut self) -> bool {
        let a = &mut self.current;
        if a.len() < 2 {
            return false;
        }
        // Find longest non-increasing suffix
        let mut i = a.len() - 2;
        while a[i] >= a[i + 1] {
            if i == 0 {
                return false;
            }
            i -= 1;
        }
        // Find rightmost successor to pivot
        let mut j = a.len() - 1;
        while a[j] <= a[i] {
            j -= 1;
        }
        a.swap(i, j);
        // Reverse suffix
        a[i + 1..].reverse();
        true
    }
}

impl<T: Ord + Clone> Iterator for UniquePermutations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.current.clone();
        if !self.advance() {
            self.done = true;
        }
        Some(item)
    }
}

impl<T: Ord + Clone> FusedIterator for UniquePermutations<T> {}

/// Every distinct ordering of `multiset`, lazily, in lexicographic order.
pub fn unique_permutations<T: Ord + Clone>(multiset: Vec<T>) -> UniquePermutations<T> {
    UniquePermutations::new(multiset)
}

/// The number of distinct orderings of `multiset`: the multinomial coefficient
/// `n! / (n1! · n2! · …)`. Returns `None` if the count does not fit in a `u128`.
///
/// # Examples
///
/// ```
/// # use sitesym::multiset::number_of_unique_permutations;
/// assert_eq!(number_of_unique_permutations(&[1, 1, 0, 0]), Some(6));
/// ```
pub fn number_of_unique_permutations<T: Ord>(multiset: &[T]) -> Option<u128> {
    let mut multiplicities: BTreeMap<&T, u128> = BTreeMap::new();
    for item in multiset {
        *multiplicities.entry(item).or_default() += 1;
    }
    multinomial(multiplicities.into_values())
}

/// `(k1 + k2 + …)! / (k1! · k2! · …)` as a product of binomial coefficients,
/// so intermediate values never exceed the result by more than a factor `n`.
fn multinomial<I: IntoIterator<Item = u128>>(multiplicities: I) -> Option<u128> {
    let mut total = 0u128;
    let mut result = 1u128;
    for k in multiplicities {
        // result *= C(total + k, k), built up one factor at a time
        for i in 1..=k {
            result = result.checked_mul(total + i)? / i;
        }
        total += k;
    }
    Some(result)
}

/// Expands a label → multiplicity table into a flat multiset.
///
/// ```
/// # use std::collections::BTreeMap;
/// # use sitesym::multiset::flatten_distribution;
/// let distribution = BTreeMap::from([('a', 1), ('b', 2)]);
/// assert_eq!(flatten_distribution(&distribution), vec!['a', 'b', 'b']);
/// ```
pub fn flatten_distribution<L: Clone>(distribution: &BTreeMap<L, usize>) -> Vec<L> {
    distribution
        .iter()
        .flat_map(|(label, &count)| std::iter::repeat(label.clone()).take(count))
        .collect()
}

/// Every assignment of `dim` sites drawn, with repetition, from `colours`.
///
/// Each unordered choice of `dim` colours (a combination with repetition) is
/// expanded through [`unique_permutations`]; the choices are distinct
/// multisets, so the union has no duplicates. Repeated colours in the input
/// are ignored.
///
/// ```
/// # use sitesym::multiset::colourings;
/// assert_eq!(colourings(&[0, 1], 2).count(), 4);
/// ```
pub fn colourings<T: Ord + Clone>(colours: &[T], dim: usize) -> impl Iterator<Item = Vec<T>> {
    let mut alphabet = colours.to_vec();
    alphabet.sort();
    alphabet.dedup();
    let choices = if dim == 0 {
        Either::Left(std::iter::once(Vec::new()))
    } else {
        Either::Right(alphabet.into_iter().combinations_with_replacement(dim))
    };
    choices.flat_map(unique_permutations)
}

/// The number of items [`colourings`] yields: `colours^dim`, or `None` on overflow.
pub fn number_of_colourings(colours: usize, dim: usize) -> Option<u128> {
    let exponent = u32::try_from(dim).ok()?;
    (colours as u128).checked_pow(exponent)
}
