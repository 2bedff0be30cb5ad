//! # Configurations
//!
//! A [`Configuration`] is one assignment of labels to every site: an immutable
//! occupation vector. Configurations compare by their vector alone; the orbit
//! size recorded by the enumeration is bookkeeping and takes no part in
//! equality or hashing.

use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Display},
    hash::{Hash, Hasher},
};

use ahash::AHashSet;
use thiserror::Error;

use crate::{
    fingerprint::{Alphabet, Fingerprint, FingerprintError},
    symmetry_operation::{OperateOn, OperationError},
};

/// Anything that can sit on a site.
pub trait Label: Clone + Ord + Hash + Debug {}

impl<T: Clone + Ord + Hash + Debug> Label for T {}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrbitError {
    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct Configuration<L> {
    vector: Vec<L>,
    count: Option<usize>,
}

impl<L> Configuration<L> {
    pub fn new(vector: Vec<L>) -> Self {
        Configuration {
            vector,
            count: None,
        }
    }

    pub fn vector(&self) -> &[L] {
        &self.vector
    }

    pub fn into_vector(self) -> Vec<L> {
        self.vector
    }

    /// Number of sites.
    pub fn dim(&self) -> usize {
        self.vector.len()
    }

    /// Orbit size, once this configuration has been accepted as an orbit representative.
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub(crate) fn set_count(&mut self, count: usize) {
        debug_assert!(self.count.is_none(), "orbit size assigned twice");
        self.count = Some(count);
    }
}

impl<L: Label> Configuration<L> {
    /// Test whether this configuration is equal to another configuration.
    pub fn matches(&self, other: &Self) -> bool {
        self.vector == other.vector
    }

    /// Whether any of `operations` maps `self` onto `other`.
    pub fn is_equivalent_to<O: OperateOn<L>>(
        &self,
        other: &Self,
        operations: &[O],
    ) -> Result<bool, OperationError> {
        for operation in operations {
            if operation.operate_on(self)?.matches(other) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn fingerprint(&self, alphabet: &Alphabet<L>) -> Result<Fingerprint, FingerprintError> {
        alphabet.fingerprint(&self.vector)
    }

    /// The image of `self` under each operation, in operation order.
    pub fn images<O: OperateOn<L>>(
        &self,
        operations: &[O],
    ) -> Result<Vec<Configuration<L>>, OperationError> {
        operations.iter().map(|o| o.operate_on(self)).collect()
    }

    /// Fingerprints of the image under each operation, duplicates kept.
    pub fn numeric_equivalents<O: OperateOn<L>>(
        &self,
        operations: &[O],
        alphabet: &Alphabet<L>,
    ) -> Result<Vec<Fingerprint>, OrbitError> {
        operations
            .iter()
            .map(|o| -> Result<Fingerprint, OrbitError> {
                Ok(o.operate_on(self)?.fingerprint(alphabet)?)
            })
            .collect()
    }

    /// The smallest fingerprint among the images of `self`.
    ///
    /// When `operations` form a group this is the same for every member of
    /// the orbit. Returns `None` for an empty operation list.
    pub fn lowest_numeric_representation<O: OperateOn<L>>(
        &self,
        operations: &[O],
        alphabet: &Alphabet<L>,
    ) -> Result<Option<Fingerprint>, OrbitError> {
        Ok(self
            .numeric_equivalents(operations, alphabet)?
            .into_iter()
            .min())
    }

    /// The distinct fingerprints of `self` and its images under `operations`.
    pub fn orbit<O: OperateOn<L>>(
        &self,
        operations: &[O],
        alphabet: &Alphabet<L>,
    ) -> Result<AHashSet<Fingerprint>, OrbitError> {
        let mut orbit = AHashSet::with_capacity(operations.len() + 1);
        orbit.insert(self.fingerprint(alphabet)?);
        for operation in operations {
            orbit.insert(operation.operate_on(self)?.fingerprint(alphabet)?);
        }
        Ok(orbit)
    }

    /// Site indices carrying `label`.
    pub fn position(&self, label: &L) -> Vec<usize> {
        self.vector
            .iter()
            .enumerate()
            .filter_map(|(i, l)| (l == label).then_some(i))
            .collect()
    }

    /// Groups `objects` by the label on their site.
    ///
    /// `objects[i]` belongs to site `i`; surplus objects or sites are ignored.
    pub fn map_objects<T: Clone>(&self, objects: &[T]) -> BTreeMap<L, Vec<T>> {
        let mut mapped: BTreeMap<L, Vec<T>> = BTreeMap::new();
        for (label, object) in self.vector.iter().zip(objects) {
            mapped.entry(label.clone()).or_default().push(object.clone());
        }
        mapped
    }
}

impl<L: PartialEq> PartialEq for Configuration<L> {
    fn eq(&self, other: &Self) -> bool {
        self.vector == other.vector
    }
}

impl<L: Eq> Eq for Configuration<L> {}

impl<L: Hash> Hash for Configuration<L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vector.hash(state);
    }
}

impl<L> From<Vec<L>> for Configuration<L> {
    fn from(vector: Vec<L>) -> Self {
        Configuration::new(vector)
    }
}

impl<L> FromIterator<L> for Configuration<L> {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Configuration::new(iter.into_iter().collect())
    }
}

impl<L: Display> Display for Configuration<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.vector.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{label}")?;
        }
        Ok(())
    }
}
