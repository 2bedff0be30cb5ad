//! # Symmetry groups
//!
//! [`SymmetryGroup`] is an ordered list of operations. It is not required to
//! be closed under composition, nor minimal; enumeration uses exactly the
//! operations it holds. [`SymmetryGroup::closure`] completes a set of
//! generators when a genuine group is wanted.
//!
//! ## Text format
//!
//! One operation per line, as a 1-based site mapping (`vector[j]` is the site
//! that site `j` is sent to), optionally preceded by a label:
//!
//! ```text
//! # a pair of equivalent sites
//! E  1 2
//! C2 2 1
//! ```
//!
//! Blank lines and anything after `#` are ignored.

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
    str::FromStr,
};

use thiserror::Error;

use crate::{
    permutation::{Permutation, PermutationError},
    symmetry_operation::{OperationError, SiteOperation, SymmetryOperation},
};

#[derive(Error, Debug)]
pub enum GroupFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: cannot read {token:?} as a site index")]
    Parse { line: usize, token: String },

    #[error("line {line}: expected {expected} site indices, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: {source}")]
    Operation {
        line: usize,
        #[source]
        source: OperationError,
    },
}

/// Whether rows of a symmetry table carry a leading label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    Plain,
    Labelled,
    /// Labelled if the first token of the first row is not a site index.
    #[default]
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct SymmetryGroup<O = SymmetryOperation> {
    symmetry_operations: Vec<O>,
}

pub type SpaceGroup = SymmetryGroup;
pub type PointGroup = SymmetryGroup;

impl<O> Default for SymmetryGroup<O> {
    fn default() -> Self {
        SymmetryGroup {
            symmetry_operations: Vec::new(),
        }
    }
}

impl<O> SymmetryGroup<O> {
    pub fn new(symmetry_operations: Vec<O>) -> Self {
        SymmetryGroup {
            symmetry_operations,
        }
    }

    pub fn operations(&self) -> &[O] {
        &self.symmetry_operations
    }

    pub fn into_operations(self) -> Vec<O> {
        self.symmetry_operations
    }

    pub fn len(&self) -> usize {
        self.symmetry_operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symmetry_operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, O> {
        self.symmetry_operations.iter()
    }

    pub fn append(&mut self, operation: O) -> &mut Self {
        self.symmetry_operations.push(operation);
        self
    }
}

impl<O: SiteOperation> SymmetryGroup<O> {
    /// The first operation carrying `label`.
    pub fn by_label(&self, label: &str) -> Option<&O> {
        self.iter().find(|so| so.label() == Some(label))
    }

    pub fn labels(&self) -> Vec<Option<&str>> {
        self.iter().map(|so| so.label()).collect()
    }

    /// Number of sites the first operation acts on.
    pub fn dim(&self) -> Option<usize> {
        self.symmetry_operations.first().map(SiteOperation::dim)
    }

    /// The position of the first operation whose size differs from `dim`,
    /// with that size.
    pub fn find_dim_mismatch(&self, dim: usize) -> Option<(usize, usize)> {
        self.iter()
            .enumerate()
            .find(|(_, so)| so.dim() != dim)
            .map(|(index, so)| (index, so.dim()))
    }
}

impl SymmetryGroup<SymmetryOperation> {
    /// The group holding only the identity on `dim` sites, labelled `E`.
    pub fn trivial(dim: usize) -> Self {
        Self::new(vec![SymmetryOperation::identity(dim).with_label("E")])
    }

    /// Every product of the operations in `self`.
    ///
    /// The operations already present come first, in their original order
    /// and with their labels, and products not yet present follow
    /// unlabelled, in breadth-first order. Repeated operations are dropped.
    ///
    /// ```
    /// # use sitesym::{SymmetryGroup, SymmetryOperation};
    /// let c4 = SymmetryOperation::from_vector(&[2, 4, 1, 3], false).unwrap();
    /// let group = SymmetryGroup::new(vec![c4]).closure().unwrap();
    /// assert_eq!(group.len(), 4);
    /// ```
    pub fn closure(&self) -> Result<Self, OperationError> {
        if self.is_empty() {
            return Ok(self.clone());
        }
        let closed = Permutation::closure(self.iter().map(SymmetryOperation::permutation))
            .map_err(|e| match e {
                PermutationError::InvalidGeneratorLength => {
                    let expected = self.symmetry_operations[0].dim();
                    let found = self
                        .find_dim_mismatch(expected)
                        .map_or(expected, |(_, found)| found);
                    OperationError::DimensionMismatch { expected, found }
                }
                other => OperationError::InvalidVector(other),
            })?;

        let operations = closed
            .into_iter()
            .map(|permutation| {
                self.iter()
                    .find(|so| so.permutation() == &permutation)
                    .cloned()
                    .unwrap_or_else(|| SymmetryOperation::from_permutation(permutation))
            })
            .collect::<Vec<_>>();
        log::debug!(
            "closure of {} operations has {} elements",
            self.len(),
            operations.len()
        );
        Ok(Self::new(operations))
    }

    pub fn read_from<R: BufRead>(reader: R, format: TableFormat) -> Result<Self, GroupFileError> {
        let mut labelled = match format {
            TableFormat::Plain => Some(false),
            TableFormat::Labelled => Some(true),
            TableFormat::Auto => None,
        };
        let mut width = None;
        let mut operations = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line?;
            let data = line.split('#').next().unwrap_or_default();
            let mut tokens = data.split_whitespace().peekable();
            let Some(&first) = tokens.peek() else {
                continue;
            };

            let has_label = *labelled.get_or_insert_with(|| first.parse::<usize>().is_err());
            let label = if has_label { tokens.next() } else { None };

            let vector = tokens
                .map(|token| {
                    token.parse::<usize>().map_err(|_| GroupFileError::Parse {
                        line: line_number,
                        token: token.to_owned(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let expected = *width.get_or_insert(vector.len());
            if vector.len() != expected {
                return Err(GroupFileError::RaggedRow {
                    line: line_number,
                    expected,
                    found: vector.len(),
                });
            }

            let mut operation = SymmetryOperation::from_vector(&vector, false).map_err(
                |source| GroupFileError::Operation {
                    line: line_number,
                    source,
                },
            )?;
            if let Some(label) = label {
                operation.set_label(label);
            }
            operations.push(operation);
        }

        log::debug!("read {} symmetry operations", operations.len());
        Ok(Self::new(operations))
    }

    /// Reads an unlabelled table.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, GroupFileError> {
        Self::read_from(BufReader::new(File::open(path)?), TableFormat::Plain)
    }

    /// Reads a table whose rows all start with a label.
    pub fn read_from_file_with_labels(path: impl AsRef<Path>) -> Result<Self, GroupFileError> {
        Self::read_from(BufReader::new(File::open(path)?), TableFormat::Labelled)
    }

    /// Writes one row per operation, in the format [`SymmetryGroup::read_from`] reads.
    ///
    /// With `with_labels`, each row starts with the operation's label, or
    /// `---` if it has none.
    pub fn write_vectors_to<W: Write>(&self, mut writer: W, with_labels: bool) -> io::Result<()> {
        for so in self {
            if with_labels {
                write!(writer, "{} ", so.label().unwrap_or("---"))?;
            }
            let row = so
                .as_vector(false)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{row}")?;
        }
        writer.flush()
    }

    pub fn save_symmetry_operation_vectors_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        self.write_vectors_to(BufWriter::new(File::create(path)?), false)
    }
}

impl FromStr for SymmetryGroup<SymmetryOperation> {
    type Err = GroupFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::read_from(s.as_bytes(), TableFormat::Auto)
    }
}

impl<O> Extend<O> for SymmetryGroup<O> {
    fn extend<I: IntoIterator<Item = O>>(&mut self, iter: I) {
        self.symmetry_operations.extend(iter);
    }
}

impl<O> FromIterator<O> for SymmetryGroup<O> {
    fn from_iter<I: IntoIterator<Item = O>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, O> IntoIterator for &'a SymmetryGroup<O> {
    type Item = &'a O;
    type IntoIter = std::slice::Iter<'a, O>;

    fn into_iter(self) -> Self::IntoIter {
        self.symmetry_operations.iter()
    }
}

impl<O> IntoIterator for SymmetryGroup<O> {
    type Item = O;
    type IntoIter = std::vec::IntoIter<O>;

    fn into_iter(self) -> Self::IntoIter {
        self.symmetry_operations.into_iter()
    }
}

impl fmt::Display for SymmetryGroup<SymmetryOperation> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SymmetryGroup")?;
        for so in self {
            writeln!(
                f,
                "{}\t{:?}",
                so.label().unwrap_or("---"),
                so.as_vector(false)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D4_LABELLED: &str = "\
# square, sites numbered row by row
E    1 2 3 4
C4   2 4 1 3
C2   4 3 2 1
C4i  3 1 4 2
m_v  2 1 4 3
m_h  3 4 1 2
m_d  1 3 2 4
m_a  4 2 3 1
";

    #[test]
    fn reads_labelled_table() {
        let group: SymmetryGroup = D4_LABELLED.parse().unwrap();
        assert_eq!(group.len(), 8);
        assert_eq!(group.dim(), Some(4));
        assert_eq!(
            group.by_label("C4").unwrap().as_vector(false),
            vec![2, 4, 1, 3]
        );
        assert!(group.by_label("S4").is_none());
        assert_eq!(group.labels()[..3], [Some("E"), Some("C4"), Some("C2")]);
    }

    #[test]
    fn reads_plain_table() {
        let text = "1 2\n\n2 1  # swap\n";
        let group = SymmetryGroup::read_from(text.as_bytes(), TableFormat::Plain).unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.labels(), vec![None, None]);
        let auto: SymmetryGroup = text.parse().unwrap();
        assert_eq!(auto, group);
    }

    #[test]
    fn explicit_labelled_format_allows_numeric_labels() {
        let group =
            SymmetryGroup::read_from("1 1 2\n2 2 1\n".as_bytes(), TableFormat::Labelled).unwrap();
        assert_eq!(group.labels(), vec![Some("1"), Some("2")]);
        assert_eq!(group.operations()[1].as_vector(false), vec![2, 1]);
    }

    #[test]
    fn table_errors_report_line_numbers() {
        let ragged = "1 2 3\n# comment\n2 1\n".parse::<SymmetryGroup>();
        assert!(matches!(
            ragged,
            Err(GroupFileError::RaggedRow {
                line: 3,
                expected: 3,
                found: 2
            })
        ));

        let bad_token = "E 1 2\nC2 2 x\n".parse::<SymmetryGroup>();
        assert!(matches!(
            bad_token,
            Err(GroupFileError::Parse { line: 2, ref token }) if token == "x"
        ));

        let not_bijective = "1 1\n".parse::<SymmetryGroup>();
        insta::assert_snapshot!(
            not_bijective.unwrap_err().to_string(),
            @"line 1: invalid site mapping: index 0 is the image of more than one element"
        );
    }

    #[test]
    fn writes_readable_tables() {
        let mut group: SymmetryGroup = D4_LABELLED.parse().unwrap();
        group.append(SymmetryOperation::identity(4));

        let mut plain = Vec::new();
        group.write_vectors_to(&mut plain, false).unwrap();
        let reread =
            SymmetryGroup::read_from(plain.as_slice(), TableFormat::Plain).unwrap();
        assert_eq!(reread.len(), 9);
        assert!(reread
            .iter()
            .zip(&group)
            .all(|(a, b)| a.permutation() == b.permutation()));

        let mut labelled = Vec::new();
        group.write_vectors_to(&mut labelled, true).unwrap();
        let text = String::from_utf8(labelled).unwrap();
        assert!(text.starts_with("E 1 2 3 4\nC4 2 4 1 3\n"));
        assert!(text.ends_with("--- 1 2 3 4\n"));
    }

    #[test]
    fn saves_and_reads_files() {
        let path = std::env::temp_dir().join(format!("sitesym-group-{}.txt", std::process::id()));
        let group: SymmetryGroup = D4_LABELLED.parse().unwrap();
        group.save_symmetry_operation_vectors_to(&path).unwrap();
        let reread = SymmetryGroup::read_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            reread.iter().map(|so| so.as_vector(false)).collect::<Vec<_>>(),
            group.iter().map(|so| so.as_vector(false)).collect::<Vec<_>>()
        );
        assert!(matches!(
            SymmetryGroup::read_from_file_with_labels(&path),
            Err(GroupFileError::Io(_))
        ));
    }

    #[test]
    fn test_append_and_extend() {
        let mut group = SymmetryGroup::trivial(2);
        group.append(SymmetryOperation::from_vector(&[2, 1], false).unwrap());
        group.extend([SymmetryOperation::identity(2), SymmetryOperation::identity(2)]);
        assert_eq!(group.len(), 4);
        assert_eq!(group.find_dim_mismatch(2), None);
        group.append(SymmetryOperation::identity(3));
        assert_eq!(group.find_dim_mismatch(2), Some((4, 3)));
    }

    #[test]
    fn closure_completes_square_group() {
        let generators: SymmetryGroup = "E 1 2 3 4\nm_v 2 1 4 3\nC4 2 4 1 3\n".parse().unwrap();
        let d4 = generators.closure().unwrap();
        assert_eq!(d4.len(), 8);
        assert_eq!(d4.labels()[..3], [Some("E"), Some("m_v"), Some("C4")]);
        assert!(d4.labels()[3..].iter().all(Option::is_none));
        // closing a group is a no-op
        assert_eq!(d4.closure().unwrap(), d4);

        let full: SymmetryGroup = D4_LABELLED.parse().unwrap();
        let mut expected: Vec<_> = full.iter().map(|so| so.as_vector(false)).collect();
        let mut found: Vec<_> = d4.iter().map(|so| so.as_vector(false)).collect();
        expected.sort();
        found.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn closure_rejects_mixed_sizes() {
        let mut group = SymmetryGroup::trivial(2);
        group.append(SymmetryOperation::identity(3));
        assert_eq!(
            group.closure(),
            Err(OperationError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        );
        assert!(SymmetryGroup::<SymmetryOperation>::default()
            .closure().unwrap().is_empty());
    }

    #[test]
    fn test_display() {
        let mut group = SymmetryGroup::trivial(2);
        group.append(SymmetryOperation::from_vector(&[2, 1], false).unwrap());
        insta::assert_snapshot!(group.to_string(), @r"
        SymmetryGroup
        E	[1, 2]
        ---	[2, 1]
        ");
    }
}
