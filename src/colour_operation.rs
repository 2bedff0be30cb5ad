//! # Colour operations
//!
//! A [`ColourOperation`] moves labels between sites like a
//! [`SymmetryOperation`] and then relabels the value that arrived on each
//! destination site through a per-site table. This covers symmetries that
//! swap two species as well as positions.

use std::{collections::BTreeMap, fmt, ops::Mul};

use crate::{
    configuration::{Configuration, Label},
    symmetry_operation::{check_dim, OperateOn, OperationError, SiteOperation, SymmetryOperation},
};

/// Per-site relabelling tables over a fixed alphabet.
///
/// `tables[site][rank]` is the image of `alphabet[rank]` on `site`. Every
/// table is complete: each alphabet label has exactly one image, and every
/// image is itself in the alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct ColourMapping<L> {
    alphabet: Vec<L>,
    tables: Vec<Vec<L>>,
}

impl<L: Label> ColourMapping<L> {
    /// Builds the tables from one `label -> label` map per site.
    ///
    /// ```
    /// # use std::collections::BTreeMap;
    /// # use sitesym::colour_operation::ColourMapping;
    /// let swap = BTreeMap::from([(0, 1), (1, 0)]);
    /// let keep = BTreeMap::from([(0, 0), (1, 1)]);
    /// let mapping = ColourMapping::new([0, 1], vec![swap, keep]).unwrap();
    /// assert_eq!(mapping.relabel(0, &0).unwrap(), &1);
    /// assert_eq!(mapping.relabel(1, &0).unwrap(), &0);
    /// ```
    pub fn new<I>(alphabet: I, tables: Vec<BTreeMap<L, L>>) -> Result<Self, OperationError>
    where
        I: IntoIterator<Item = L>,
    {
        let mut alphabet: Vec<L> = alphabet.into_iter().collect();
        alphabet.sort();
        alphabet.dedup();

        let mut dense = Vec::with_capacity(tables.len());
        for (site, table) in tables.into_iter().enumerate() {
            if let Some(stray) = table
                .iter()
                .flat_map(|(from, to)| [from, to])
                .find(|label| alphabet.binary_search(label).is_err())
            {
                return Err(OperationError::ColourOutsideAlphabet {
                    site,
                    label: format!("{stray:?}"),
                });
            }
            let row = alphabet
                .iter()
                .map(|label| {
                    table
                        .get(label)
                        .cloned()
                        .ok_or_else(|| OperationError::IncompleteColourMapping {
                            site,
                            label: format!("{label:?}"),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            dense.push(row);
        }

        Ok(ColourMapping {
            alphabet,
            tables: dense,
        })
    }

    /// The same table on each of `sites` sites.
    pub fn uniform<I>(alphabet: I, table: BTreeMap<L, L>, sites: usize) -> Result<Self, OperationError>
    where
        I: IntoIterator<Item = L>,
    {
        Self::new(alphabet, vec![table; sites])
    }

    /// Tables that leave every label unchanged.
    pub fn identity<I>(alphabet: I, sites: usize) -> Self
    where
        I: IntoIterator<Item = L>,
    {
        let mut alphabet: Vec<L> = alphabet.into_iter().collect();
        alphabet.sort();
        alphabet.dedup();
        let tables = vec![alphabet.clone(); sites];
        ColourMapping { alphabet, tables }
    }

    pub fn alphabet(&self) -> &[L] {
        &self.alphabet
    }

    /// Number of per-site tables.
    pub fn sites(&self) -> usize {
        self.tables.len()
    }

    /// The image of `label` on `site`.
    pub fn relabel(&self, site: usize, label: &L) -> Result<&L, OperationError> {
        self.alphabet
            .binary_search(label)
            .ok()
            .and_then(|rank| self.tables.get(site).map(|table| &table[rank]))
            .ok_or_else(|| OperationError::UnmappedColour {
                site,
                label: format!("{label:?}"),
            })
    }

    /// The table of `site` as a map.
    pub fn table(&self, site: usize) -> Option<BTreeMap<L, L>> {
        self.tables.get(site).map(|table| {
            self.alphabet
                .iter()
                .cloned()
                .zip(table.iter().cloned())
                .collect()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct ColourOperation<L> {
    operation: SymmetryOperation,
    colour_mapping: ColourMapping<L>,
}

impl<L: Label> ColourOperation<L> {
    /// Pairs a site permutation with one relabelling table per site.
    pub fn new(
        operation: SymmetryOperation,
        colour_mapping: ColourMapping<L>,
    ) -> Result<Self, OperationError> {
        if colour_mapping.sites() != operation.dim() {
            return Err(OperationError::ColourMappingLength {
                expected: operation.dim(),
                found: colour_mapping.sites(),
            });
        }
        Ok(ColourOperation {
            operation,
            colour_mapping,
        })
    }

    pub fn from_matrix<T, R>(
        matrix: &[R],
        colour_mapping: ColourMapping<L>,
    ) -> Result<Self, OperationError>
    where
        T: Copy + PartialEq + From<u8>,
        R: AsRef<[T]>,
    {
        Self::new(SymmetryOperation::from_matrix(matrix)?, colour_mapping)
    }

    pub fn from_vector(
        vector: &[usize],
        colour_mapping: ColourMapping<L>,
        count_from_zero: bool,
    ) -> Result<Self, OperationError> {
        Self::new(
            SymmetryOperation::from_vector(vector, count_from_zero)?,
            colour_mapping,
        )
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.operation.set_label(label);
        self
    }

    pub fn operation(&self) -> &SymmetryOperation {
        &self.operation
    }

    pub fn colour_mapping(&self) -> &ColourMapping<L> {
        &self.colour_mapping
    }

    /// `self · other`: apply `other`, then `self`.
    ///
    /// A label is relabelled by `other`'s table at the site it lands on
    /// under `other`, then by `self`'s table at its final site.
    pub fn compose(&self, other: &Self) -> Result<Self, OperationError> {
        check_dim(self.dim(), other.dim())?;
        if self.colour_mapping.alphabet != other.colour_mapping.alphabet {
            return Err(OperationError::AlphabetMismatch);
        }
        let alphabet = &self.colour_mapping.alphabet;

        let tables = self
            .operation
            .index_mapping()
            .iter()
            .zip(&self.colour_mapping.tables)
            .map(|(&intermediate, outer)| {
                other.colour_mapping.tables[intermediate]
                    .iter()
                    .map(|mid| -> Result<L, OperationError> {
                        // every image lies in the shared alphabet
                        let rank = alphabet
                            .binary_search(mid)
                            .map_err(|_| OperationError::AlphabetMismatch)?;
                        Ok(outer[rank].clone())
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ColourOperation {
            operation: self.operation.compose(&other.operation)?,
            colour_mapping: ColourMapping {
                alphabet: alphabet.clone(),
                tables,
            },
        })
    }
}

impl<L> SiteOperation for ColourOperation<L> {
    fn dim(&self) -> usize {
        self.operation.dim()
    }

    fn label(&self) -> Option<&str> {
        self.operation.label()
    }
}

impl<L: Label> OperateOn<L> for ColourOperation<L> {
    fn operate_on(
        &self,
        configuration: &Configuration<L>,
    ) -> Result<Configuration<L>, OperationError> {
        let moved = self.operation.operate_on(configuration)?;
        moved
            .vector()
            .iter()
            .enumerate()
            .map(|(site, label)| self.colour_mapping.relabel(site, label).cloned())
            .collect()
    }

    fn colour_alphabet(&self) -> &[L] {
        self.colour_mapping.alphabet()
    }
}

impl<L: Label> Mul for &ColourOperation<L> {
    type Output = Result<ColourOperation<L>, OperationError>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl<L: Label> Mul<&Configuration<L>> for &ColourOperation<L> {
    type Output = Result<Configuration<L>, OperationError>;

    fn mul(self, rhs: &Configuration<L>) -> Self::Output {
        self.operate_on(rhs)
    }
}

impl<L: fmt::Debug> fmt::Display for ColourOperation<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        for (site, table) in self.colour_mapping.tables.iter().enumerate() {
            write!(f, "\n  {}:", site + 1)?;
            for (from, to) in self.colour_mapping.alphabet.iter().zip(table) {
                write!(f, " {from:?}->{to:?}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swap() -> BTreeMap<i32, i32> {
        BTreeMap::from([(0, 1), (1, 0)])
    }

    fn keep() -> BTreeMap<i32, i32> {
        BTreeMap::from([(0, 0), (1, 1)])
    }

    #[test]
    fn test_from_matrix() {
        let mapping = ColourMapping::new([0, 1], vec![swap(), keep()]).unwrap();
        let co = ColourOperation::from_matrix(&[[1, 0], [0, 1]], mapping.clone())
            .unwrap()
            .with_label("E");
        assert_eq!(co.operation().as_matrix(), vec![vec![1, 0], vec![0, 1]]);
        assert_eq!(co.colour_mapping(), &mapping);
        assert_eq!(co.label(), Some("E"));
        assert_eq!(mapping.table(0), Some(swap()));
        assert_eq!(mapping.table(2), None);
    }

    #[test]
    fn test_from_vector() {
        let mapping = ColourMapping::new([0, 1], vec![swap(), keep(), keep()]).unwrap();
        let expected = vec![vec![0, 0, 1], vec![1, 0, 0], vec![0, 1, 0]];
        let co = ColourOperation::from_vector(&[2, 3, 1], mapping.clone(), false).unwrap();
        assert_eq!(co.operation().as_matrix(), expected);
        let co = ColourOperation::from_vector(&[1, 2, 0], mapping, true).unwrap();
        assert_eq!(co.operation().as_matrix(), expected);
    }

    #[test]
    fn mapping_length_must_match_sites() {
        let mapping = ColourMapping::new([0, 1], vec![swap(), keep()]).unwrap();
        assert_eq!(
            ColourOperation::from_vector(&[2, 3, 1], mapping, false),
            Err(OperationError::ColourMappingLength {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn incomplete_or_stray_tables_are_rejected() {
        assert_eq!(
            ColourMapping::new([0, 1], vec![keep(), BTreeMap::from([(0, 1)])]),
            Err(OperationError::IncompleteColourMapping {
                site: 1,
                label: "1".into()
            })
        );
        assert_eq!(
            ColourMapping::new([0, 1], vec![BTreeMap::from([(0, 2), (1, 1)])]),
            Err(OperationError::ColourOutsideAlphabet {
                site: 0,
                label: "2".into()
            })
        );
    }

    #[test]
    fn test_operate_on() {
        let tables = vec![
            BTreeMap::from([(1, 1), (2, 2), (3, 3)]),
            BTreeMap::from([(1, 2), (2, 3), (3, 1)]),
            BTreeMap::from([(1, 3), (2, 2), (3, 1)]),
        ];
        let mapping = ColourMapping::new([1, 2, 3], tables).unwrap();
        let co =
            ColourOperation::from_matrix(&[[0, 1, 0], [0, 0, 1], [1, 0, 0]], mapping).unwrap();
        let configuration = Configuration::new(vec![1, 2, 3]);
        assert_eq!(co.operate_on(&configuration).unwrap().vector(), &[2, 1, 3]);
        assert_eq!(
            &co * &Configuration::new(vec![1, 2, 4]),
            Err(OperationError::UnmappedColour {
                site: 1,
                label: "4".into()
            })
        );
    }

    #[test]
    fn test_mul() {
        let uniform = || ColourMapping::uniform([0, 1], swap(), 2).unwrap();
        let co_a = ColourOperation::from_matrix(&[[1, 0], [0, 1]], uniform()).unwrap();
        let co_b = ColourOperation::from_matrix(&[[0, 1], [1, 0]], uniform()).unwrap();
        let co_c = (&co_a * &co_b).unwrap();
        assert_eq!(co_c.operation().as_matrix(), vec![vec![0, 1], vec![1, 0]]);
        assert_eq!(co_c.colour_mapping(), &ColourMapping::identity([0, 1], 2));
    }

    #[test]
    fn composition_matches_sequential_application() {
        let a_tables = vec![swap(), keep(), keep()];
        let b_tables = vec![keep(), swap(), keep()];
        let a = ColourOperation::from_vector(
            &[2, 3, 1],
            ColourMapping::new([0, 1], a_tables).unwrap(),
            false,
        )
        .unwrap();
        let b = ColourOperation::from_vector(
            &[1, 3, 2],
            ColourMapping::new([0, 1], b_tables).unwrap(),
            false,
        )
        .unwrap();
        let ab = a.compose(&b).unwrap();
        for vector in [vec![0, 0, 1], vec![1, 0, 0], vec![1, 1, 0], vec![0, 1, 0]] {
            let configuration = Configuration::new(vector);
            assert_eq!(
                ab.operate_on(&configuration).unwrap(),
                a.operate_on(&b.operate_on(&configuration).unwrap()).unwrap()
            );
        }
    }

    #[test]
    fn composition_requires_shared_alphabet() {
        let a = ColourOperation::new(
            SymmetryOperation::identity(1),
            ColourMapping::identity([0, 1], 1),
        )
        .unwrap();
        let b = ColourOperation::new(
            SymmetryOperation::identity(1),
            ColourMapping::identity([0, 1, 2], 1),
        )
        .unwrap();
        assert_eq!(a.compose(&b), Err(OperationError::AlphabetMismatch));
    }

    #[test]
    fn test_display() {
        let co = ColourOperation::from_vector(
            &[2, 1],
            ColourMapping::new([0, 1], vec![swap(), keep()]).unwrap(),
            false,
        )
        .unwrap()
        .with_label("S");
        insta::assert_snapshot!(co.to_string(), @r"
        S : 2 1
          1: 0->1 1->0
          2: 0->0 1->1
        ");
    }
}
