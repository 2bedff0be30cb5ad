//! # Symmetry operations
//!
//! A [`SymmetryOperation`] relabels site *positions*: it moves the label on
//! site `j` to site `vector[j]`. It is stored as a [`Permutation`] whose
//! inverse map is the gather table `index_mapping`, so applying it to a
//! configuration is a single O(n) pass:
//! `result[i] = configuration[index_mapping[i]]`.
//!
//! The operation's permutation matrix `M` (with `M[i][index_mapping[i]] = 1`)
//! is only materialised on request; composition, inversion and similarity
//! transforms work on the index arrays directly and agree with the
//! corresponding matrix products.
//!
//! The [`SiteOperation`] and [`OperateOn`] traits are the seam shared with
//! [`crate::colour_operation::ColourOperation`].

use std::{fmt, ops::Mul};

use thiserror::Error;

use crate::{
    configuration::{Configuration, Label},
    permutation::{Permutation, PermutationError},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Not a square matrix: {rows} rows, but a row of length {columns}")]
    NotSquare { rows: usize, columns: usize },

    #[error("Not a permutation matrix")]
    NotPermutationMatrix,

    #[error("invalid site mapping: {0}")]
    InvalidVector(#[from] PermutationError),

    #[error("dimension mismatch: expected {expected} sites, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("colour table for site {site} has no entry for {label}")]
    IncompleteColourMapping { site: usize, label: String },

    #[error("colour table for site {site} uses {label}, which is outside the alphabet")]
    ColourOutsideAlphabet { site: usize, label: String },

    #[error("expected {expected} colour tables, found {found}")]
    ColourMappingLength { expected: usize, found: usize },

    #[error("cannot recolour {label} on site {site}")]
    UnmappedColour { site: usize, label: String },

    #[error("colour operations are defined over different alphabets")]
    AlphabetMismatch,
}

/// An operation acting on the sites of a configuration space.
pub trait SiteOperation {
    /// Number of sites the operation acts on.
    fn dim(&self) -> usize;

    fn label(&self) -> Option<&str>;
}

/// Application of an operation to a configuration over labels `L`.
pub trait OperateOn<L: Label>: SiteOperation {
    fn operate_on(&self, configuration: &Configuration<L>)
        -> Result<Configuration<L>, OperationError>;

    /// Labels the operation can produce besides the ones it is given.
    ///
    /// Operations that only move labels between sites produce nothing new.
    fn colour_alphabet(&self) -> &[L] {
        &[]
    }
}

/// A site permutation with an optional human readable label.
///
/// # Examples
///
/// ```
/// use sitesym::{Configuration, SymmetryOperation};
/// use sitesym::symmetry_operation::OperateOn;
///
/// // site 1 -> 2, site 2 -> 3, site 3 -> 1
/// let so = SymmetryOperation::from_vector(&[2, 3, 1], false).unwrap();
/// let moved = so.operate_on(&Configuration::new(vec![1, 2, 3])).unwrap();
/// assert_eq!(moved.vector(), &[3, 1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct SymmetryOperation {
    permutation: Permutation,
    label: Option<String>,
}

impl SymmetryOperation {
    pub fn identity(dim: usize) -> Self {
        Self::from_permutation(Permutation::id(dim))
    }

    pub fn from_permutation(permutation: Permutation) -> Self {
        SymmetryOperation {
            permutation,
            label: None,
        }
    }

    /// Builds an operation from a square 0/1 matrix given as rows.
    ///
    /// Row `i` must hold a single `1`, in column `index_mapping[i]`, and
    /// every column must hold a single `1`.
    pub fn from_matrix<T, R>(matrix: &[R]) -> Result<Self, OperationError>
    where
        T: Copy + PartialEq + From<u8>,
        R: AsRef<[T]>,
    {
        let (zero, one) = (T::from(0u8), T::from(1u8));
        let rows = matrix.len();
        let mut index_mapping = Vec::with_capacity(rows);
        for row in matrix {
            let row = row.as_ref();
            if row.len() != rows {
                return Err(OperationError::NotSquare {
                    rows,
                    columns: row.len(),
                });
            }
            let mut column = None;
            for (j, &entry) in row.iter().enumerate() {
                if entry == one {
                    if column.replace(j).is_some() {
                        return Err(OperationError::NotPermutationMatrix);
                    }
                } else if entry != zero {
                    return Err(OperationError::NotPermutationMatrix);
                }
            }
            index_mapping.push(column.ok_or(OperationError::NotPermutationMatrix)?);
        }

        // index_mapping is the inverse map; a repeated column means it is not a bijection
        let gather = Permutation::try_from_map(index_mapping)
            .map_err(|_| OperationError::NotPermutationMatrix)?;
        Ok(Self::from_permutation(gather.inverse()))
    }

    /// Builds an operation from a site mapping: site `j` is sent to `vector[j]`.
    ///
    /// Indices count from one unless `count_from_zero` is set.
    pub fn from_vector(vector: &[usize], count_from_zero: bool) -> Result<Self, OperationError> {
        let map = if count_from_zero {
            vector.to_vec()
        } else {
            vector
                .iter()
                .map(|&x| {
                    x.checked_sub(1)
                        .ok_or(PermutationError::IndexOutOfBounds {
                            index: x,
                            size: vector.len(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(Self::from_permutation(Permutation::try_from_map(map)?))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// `index_mapping[i]` is the site whose label lands on site `i`.
    pub fn index_mapping(&self) -> &[usize] {
        self.permutation.inv()
    }

    /// The inverse operation (the transposed matrix). The label is not carried over.
    pub fn invert(&self) -> Self {
        Self::from_permutation(self.permutation.inverse())
    }

    /// The operation `self · other`: apply `other`, then `self`.
    pub fn compose(&self, other: &Self) -> Result<Self, OperationError> {
        check_dim(self.dim(), other.dim())?;
        Ok(Self::from_permutation(
            self.permutation.compose(&other.permutation),
        ))
    }

    /// `s⁻¹ · (self · s)`, the operation `self` seen from the frame reached through `s`.
    pub fn similarity_transform(&self, s: &Self) -> Result<Self, OperationError> {
        s.invert().compose(&self.compose(s)?)
    }

    /// The trace of the permutation matrix: the number of sites left in place.
    pub fn character(&self) -> usize {
        self.permutation.fixed_points()
    }

    /// The site mapping this operation was built from, see [`SymmetryOperation::from_vector`].
    pub fn as_vector(&self, count_from_zero: bool) -> Vec<usize> {
        let offset = usize::from(!count_from_zero);
        self.permutation.map().iter().map(|&x| x + offset).collect()
    }

    pub fn as_matrix(&self) -> Vec<Vec<u8>> {
        let dim = self.dim();
        self.index_mapping()
            .iter()
            .map(|&column| {
                let mut row = vec![0; dim];
                row[column] = 1;
                row
            })
            .collect()
    }
}

pub(crate) fn check_dim(expected: usize, found: usize) -> Result<(), OperationError> {
    if expected != found {
        return Err(OperationError::DimensionMismatch { expected, found });
    }
    Ok(())
}

impl SiteOperation for SymmetryOperation {
    fn dim(&self) -> usize {
        self.permutation.len()
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<L: Label> OperateOn<L> for SymmetryOperation {
    fn operate_on(
        &self,
        configuration: &Configuration<L>,
    ) -> Result<Configuration<L>, OperationError> {
        check_dim(self.dim(), configuration.dim())?;
        Ok(Configuration::new(
            self.permutation.apply_slice(configuration.vector()),
        ))
    }
}

impl Mul for &SymmetryOperation {
    type Output = Result<SymmetryOperation, OperationError>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl<L: Label> Mul<&Configuration<L>> for &SymmetryOperation {
    type Output = Result<Configuration<L>, OperationError>;

    fn mul(self, rhs: &Configuration<L>) -> Self::Output {
        self.operate_on(rhs)
    }
}

impl fmt::Display for SymmetryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :", self.label().unwrap_or("---"))?;
        for x in self.as_vector(false) {
            write!(f, " {x}")?;
        }
        Ok(())
    }
}
