//! # Permutations
//!
//! This module provides a `Permutation` struct for representing bijections of
//! the site indices `0..n`. It is the index-array form that every symmetry
//! operation in this crate is stored in.
//!
//! ## Key Features:
//!
//! - **Representation**: A `Permutation` is stored by its direct mapping (`map[i]` is
//!   the image of `i`) and its inverse mapping.
//! - **Construction**:
//!   - Identity permutation: `Permutation::id(n)`.
//!   - From a mapping vector, validated: `Permutation::try_from_map(vec![...])`.
//! - **Basic Operations**:
//!   - Inverse: `p.inverse()`.
//!   - Composition: `p1.compose(&p2)` (applies `p2` then `p1`).
//!   - Apply to slices: `p.apply_slice(data)` (the value at `i` moves to `map[i]`).
//!   - Fixed points: `p.fixed_points()` (the trace of the permutation matrix).
//! - **Closure**: `Permutation::closure(generators)` enumerates every product of
//!   the generators, in a deterministic breadth-first order.

use bitvec::bitvec;
use indexmap::IndexSet;
use thiserror::Error;

/// A permutation of `0..n`, with the ability to apply itself to slices.
///
/// # Examples
///
/// ```
/// use sitesym::permutation::Permutation;
///
/// // 0->2, 1->0, 2->1, 3->3
/// let p = Permutation::try_from_map(vec![2, 0, 1, 3]).unwrap();
///
/// let data = vec![10, 20, 30, 40];
/// assert_eq!(p.apply_slice(&data), vec![20, 30, 10, 40]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct Permutation {
    map: Vec<usize>,
    inv: Vec<usize>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermutationError {
    #[error("index {index} is out of bounds for a permutation of size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("index {index} is the image of more than one element")]
    NotABijection { index: usize },

    #[error("Invalid generator length")]
    InvalidGeneratorLength,

    #[error("Empty generators")]
    EmptyGenerators,
}

impl Permutation {
    // --------------------------------------------------------------------------------------------
    // Basic Constructors and Accessors
    // --------------------------------------------------------------------------------------------

    /// Creates the identity permutation of length `n`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sitesym::permutation::Permutation;
    /// let p = Permutation::id(4);
    /// assert_eq!(p.apply_slice(&[10,20,30,40]), vec![10,20,30,40]);
    /// ```
    pub fn id(n: usize) -> Self {
        Permutation {
            map: (0..n).collect(),
            inv: (0..n).collect(),
        }
    }

    /// Creates a permutation from a mapping vector, checking that every index
    /// of `0..map.len()` appears exactly once.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sitesym::permutation::{Permutation, PermutationError};
    /// assert!(Permutation::try_from_map(vec![1, 2, 0]).is_ok());
    /// assert_eq!(
    ///     Permutation::try_from_map(vec![1, 1, 0]),
    ///     Err(PermutationError::NotABijection { index: 1 })
    /// );
    /// ```
    pub fn try_from_map(map: Vec<usize>) -> Result<Self, PermutationError> {
        let size = map.len();
        let mut seen = bitvec![0; size];
        for &j in &map {
            if j >= size {
                return Err(PermutationError::IndexOutOfBounds { index: j, size });
            }
            if seen.replace(j, true) {
                return Err(PermutationError::NotABijection { index: j });
            }
        }
        Ok(Self::from_map(map))
    }

    /// Builds the permutation without validation; `map` must already be a bijection.
    pub(crate) fn from_map(map: Vec<usize>) -> Self {
        let mut inv = vec![0; map.len()];
        for (i, &j) in map.iter().enumerate() {
            inv[j] = i;
        }
        Permutation { map, inv }
    }

    /// Returns the internal mapping as a slice.
    pub fn map(&self) -> &[usize] {
        &self.map
    }

    /// Returns the inverse mapping as a slice.
    ///
    /// `inv[i]` is the index whose value lands on `i`, which is exactly the
    /// gather table used by [`Permutation::apply_slice`].
    pub fn inv(&self) -> &[usize] {
        &self.inv
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    // --------------------------------------------------------------------------------------------
    // Basic Operations
    // --------------------------------------------------------------------------------------------

    /// Returns the inverse of the permutation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sitesym::permutation::Permutation;
    /// let p = Permutation::try_from_map(vec![2, 0, 1]).unwrap();
    /// let inv = p.inverse();
    /// assert_eq!(inv.apply_slice(&[10,20,30]), vec![30, 10, 20]);
    /// ```
    pub fn inverse(&self) -> Self {
        Permutation {
            map: self.inv.clone(),
            inv: self.map.clone(),
        }
    }

    /// Applies `self` to a slice, returning a new `Vec<T>` in permuted order.
    pub fn apply_slice<T: Clone, S>(&self, slice: S) -> Vec<T>
    where
        S: AsRef<[T]>,
    {
        let s = slice.as_ref();
        self.inv.iter().map(|&idx| s[idx].clone()).collect()
    }

    /// Composes `self` with another permutation `other`, returning a new permutation:
    /// `(self ◦ other)(i) = self.map[other.map[i]]`.
    ///
    /// Both permutations must have the same length.
    pub fn compose(&self, other: &Self) -> Self {
        let map = other.map.iter().map(|&i| self.map[i]).collect();
        Self::from_map(map)
    }

    /// Number of indices mapped onto themselves.
    pub fn fixed_points(&self) -> usize {
        self.map.iter().enumerate().filter(|(i, &m)| *i == m).count()
    }

    /// Every product of one or more generators.
    ///
    /// The generators come first, in the order given (duplicates removed),
    /// followed by new products in breadth-first order. For a finite set of
    /// permutations this is the group they generate.
    pub fn closure<'a, I>(generators: I) -> Result<IndexSet<Permutation>, PermutationError>
    where
        I: IntoIterator<Item = &'a Permutation>,
    {
        let generators: Vec<&Permutation> = generators.into_iter().collect();
        let size = if let Some(generator) = generators.first() {
            generator.len()
        } else {
            return Err(PermutationError::EmptyGenerators);
        };
        if generators.iter().any(|g| g.len() != size) {
            return Err(PermutationError::InvalidGeneratorLength);
        }

        let mut all: IndexSet<Permutation> = generators.iter().map(|&g| g.clone()).collect();
        let mut frontier = 0;
        while frontier < all.len() {
            let current = all[frontier].clone();
            for g in &generators {
                all.insert(current.compose(g));
            }
            frontier += 1;
        }
        log::trace!(
            "closure of {} generators has {} elements",
            generators.len(),
            all.len()
        );
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(map: &[usize]) -> Permutation {
        Permutation::try_from_map(map.to_vec()).unwrap()
    }

    #[test]
    fn test_try_from_map_rejects_invalid() {
        assert_eq!(
            Permutation::try_from_map(vec![0, 3, 1]),
            Err(PermutationError::IndexOutOfBounds { index: 3, size: 3 })
        );
        assert_eq!(
            Permutation::try_from_map(vec![2, 0, 2]),
            Err(PermutationError::NotABijection { index: 2 })
        );
        assert!(Permutation::try_from_map(vec![]).unwrap().is_empty());
    }

    #[test]
    fn test_apply_slice() {
        let p = perm(&[2, 0, 1]);
        assert_eq!(p.apply_slice([10, 20, 30]), vec![20, 30, 10]);
        assert_eq!(p.inverse().apply_slice(p.apply_slice([10, 20, 30])), vec![10, 20, 30]);
    }

    #[test]
    fn test_compose() {
        let p1 = perm(&[1, 2, 0]);
        let p2 = perm(&[0, 2, 1]);
        let data = ['a', 'b', 'c'];

        // p1 ◦ p2 applies p2 first
        assert_eq!(
            p1.compose(&p2).apply_slice(data),
            p1.apply_slice(p2.apply_slice(data))
        );
        assert_eq!(p1.compose(&p1.inverse()), Permutation::id(3));
    }

    #[test]
    fn test_fixed_points() {
        let p = perm(&[2, 0, 1, 3]);
        assert_eq!(p.fixed_points(), 1);
        assert_eq!(Permutation::id(5).fixed_points(), 5);
    }

    #[test]
    fn closure_of_cyclic_generator() {
        let c4 = perm(&[1, 2, 3, 0]);
        let group = Permutation::closure([&c4]).unwrap();
        assert_eq!(group.len(), 4);
        assert_eq!(group[0], c4);
        assert!(group.contains(&Permutation::id(4)));
    }

    #[test]
    fn closure_of_dihedral_generators() {
        let rotation = perm(&[1, 3, 0, 2]);
        let reflection = perm(&[1, 0, 3, 2]);
        let group = Permutation::closure([&rotation, &reflection]).unwrap();
        assert_eq!(group.len(), 8);
        for a in &group {
            for b in &group {
                assert!(group.contains(&a.compose(b)));
            }
        }
    }

    #[test]
    fn closure_rejects_bad_generators() {
        assert_eq!(
            Permutation::closure(std::iter::empty()),
            Err(PermutationError::EmptyGenerators)
        );
        let a = Permutation::id(2);
        let b = Permutation::id(3);
        assert_eq!(
            Permutation::closure([&a, &b]),
            Err(PermutationError::InvalidGeneratorLength)
        );
    }
}
