//! # Configuration spaces
//!
//! A [`ConfigurationSpace`] pairs the objects naming its sites with the
//! symmetry operations acting on them, and enumerates one representative
//! configuration per symmetry orbit.
//!
//! Enumeration screens a stream of candidate label vectors. A candidate whose
//! fingerprint has been seen before belongs to an orbit already reported and
//! is dropped without further work. Otherwise it becomes a representative:
//! its orbit is computed by applying every operation of the group, the
//! number of distinct fingerprints in the orbit is recorded as its
//! degeneracy, and the whole orbit is marked as seen.
//!
//! The candidate streams are lexicographically ordered, so each
//! representative is the first member of its orbit in that order. The
//! operations are used as given: when they are not closed under
//! composition, orbits may be split across several representatives.
//! Use [`SymmetryGroup::closure`] beforehand to avoid that.

use std::{collections::BTreeMap, fmt};

use ahash::AHashSet;
use log::{debug, info};
use thiserror::Error;

use crate::{
    configuration::{Configuration, Label, OrbitError},
    fingerprint::{Alphabet, Fingerprint, FingerprintError},
    multiset::{
        colourings, flatten_distribution, number_of_colourings, number_of_unique_permutations,
        unique_permutations,
    },
    symmetry_group::SymmetryGroup,
    symmetry_operation::{OperateOn, SiteOperation, SymmetryOperation},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    #[error("symmetry operation {index} acts on {found} sites, but the space has {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("site distribution places {found} labels on {expected} sites")]
    DistributionMismatch { expected: usize, found: usize },

    #[error("expected {expected} entries, one per object, found {found}")]
    ObjectCount { expected: usize, found: usize },

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error(transparent)]
    Orbit(#[from] OrbitError),
}

/// Progress of an enumeration, reported after each candidate is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationProgress {
    /// Representatives accepted so far.
    pub found: usize,
    /// Candidates classified so far.
    pub screened: usize,
    /// Distinct configurations covered by the accepted orbits.
    pub seen: usize,
    /// Number of candidates in the stream, when known.
    pub total: Option<u128>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationSpace<T, O = SymmetryOperation> {
    objects: Vec<T>,
    symmetry_group: SymmetryGroup<O>,
}

impl<T> ConfigurationSpace<T, SymmetryOperation> {
    /// A space over `objects`, one site per object.
    ///
    /// Without a group, the space gets the trivial group and enumeration
    /// performs no reduction.
    pub fn new(objects: Vec<T>, symmetry_group: Option<SymmetryGroup>) -> Result<Self, SpaceError> {
        let dim = objects.len();
        let group = symmetry_group.unwrap_or_else(|| SymmetryGroup::trivial(dim));
        Self::with_group(objects, group)
    }
}

impl<T, O: SiteOperation> ConfigurationSpace<T, O> {
    /// Fails if any operation does not act on exactly `objects.len()` sites.
    pub fn with_group(objects: Vec<T>, symmetry_group: SymmetryGroup<O>) -> Result<Self, SpaceError> {
        let expected = objects.len();
        if let Some((index, found)) = symmetry_group.find_dim_mismatch(expected) {
            return Err(SpaceError::DimensionMismatch {
                index,
                expected,
                found,
            });
        }
        Ok(ConfigurationSpace {
            objects,
            symmetry_group,
        })
    }

    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    pub fn symmetry_group(&self) -> &SymmetryGroup<O> {
        &self.symmetry_group
    }

    /// Number of sites.
    pub fn dim(&self) -> usize {
        self.objects.len()
    }

    /// One representative per orbit among the arrangements of `site_distribution`.
    ///
    /// `site_distribution` maps each label to the number of sites it occupies;
    /// the counts must add up to the number of sites. Each returned
    /// configuration carries the size of its orbit in
    /// [`Configuration::count`], and the sizes add up to the number of
    /// distinct arrangements.
    ///
    /// ```
    /// # use std::collections::BTreeMap;
    /// # use sitesym::{ConfigurationSpace, SymmetryGroup};
    /// let pair: SymmetryGroup = "E 1 2\nC2 2 1".parse().unwrap();
    /// let space = ConfigurationSpace::new(vec!['a', 'b'], Some(pair)).unwrap();
    /// let unique = space
    ///     .unique_configurations(&BTreeMap::from([(0, 1), (1, 1)]))
    ///     .unwrap();
    /// assert_eq!(unique.len(), 1);
    /// assert_eq!(unique[0].vector(), &[0, 1]);
    /// assert_eq!(unique[0].count(), Some(2));
    /// ```
    pub fn unique_configurations<L>(
        &self,
        site_distribution: &BTreeMap<L, usize>,
    ) -> Result<Vec<Configuration<L>>, SpaceError>
    where
        L: Label,
        O: OperateOn<L>,
    {
        self.unique_configurations_with_progress(site_distribution, |_| {})
    }

    pub fn unique_configurations_with_progress<L, F>(
        &self,
        site_distribution: &BTreeMap<L, usize>,
        progress: F,
    ) -> Result<Vec<Configuration<L>>, SpaceError>
    where
        L: Label,
        O: OperateOn<L>,
        F: FnMut(EnumerationProgress),
    {
        let placed = site_distribution
            .values()
            .try_fold(0usize, |total, &count| total.checked_add(count));
        if placed != Some(self.dim()) {
            return Err(SpaceError::DistributionMismatch {
                expected: self.dim(),
                found: placed.unwrap_or(usize::MAX),
            });
        }
        let alphabet = self.fingerprint_alphabet(
            site_distribution
                .iter()
                .filter(|&(_, &count)| count > 0)
                .map(|(label, _)| label.clone()),
        );
        let multiset = flatten_distribution(site_distribution);
        let total = number_of_unique_permutations(&multiset);

        info!("total number of sites: {}", self.dim());
        self.enumerate_configurations(unique_permutations(multiset), &alphabet, total, progress)
    }

    /// One representative per orbit among all assignments of `colours` to the sites,
    /// with any number of sites per colour.
    pub fn unique_colourings<L>(&self, colours: &[L]) -> Result<Vec<Configuration<L>>, SpaceError>
    where
        L: Label,
        O: OperateOn<L>,
    {
        self.unique_colourings_with_progress(colours, |_| {})
    }

    pub fn unique_colourings_with_progress<L, F>(
        &self,
        colours: &[L],
        progress: F,
    ) -> Result<Vec<Configuration<L>>, SpaceError>
    where
        L: Label,
        O: OperateOn<L>,
        F: FnMut(EnumerationProgress),
    {
        let palette = Alphabet::new(colours.iter().cloned(), self.dim());
        let alphabet = self.fingerprint_alphabet(palette.labels().iter().cloned());
        let total = number_of_colourings(palette.radix(), self.dim());

        info!(
            "colouring {} sites with {} colours",
            self.dim(),
            palette.radix()
        );
        self.enumerate_configurations(
            colourings(palette.labels(), self.dim()),
            &alphabet,
            total,
            progress,
        )
    }

    /// The alphabet orbits are fingerprinted over: `labels` together with
    /// every label the operations can relabel into.
    fn fingerprint_alphabet<L>(&self, labels: impl Iterator<Item = L>) -> Alphabet<L>
    where
        L: Label,
        O: OperateOn<L>,
    {
        let relabelled = self
            .symmetry_group
            .iter()
            .flat_map(|operation| OperateOn::<L>::colour_alphabet(operation).iter().cloned());
        Alphabet::new(labels.chain(relabelled), self.dim())
    }

    /// Orbit screening over an arbitrary stream of candidate vectors.
    ///
    /// Every candidate must have one label per site, drawn from `alphabet`,
    /// and `alphabet` must be sized for this space. `total` is passed through
    /// to `progress` untouched. Representatives are returned in the order the
    /// stream first reaches their orbit.
    pub fn enumerate_configurations<L, I, F>(
        &self,
        candidates: I,
        alphabet: &Alphabet<L>,
        total: Option<u128>,
        mut progress: F,
    ) -> Result<Vec<Configuration<L>>, SpaceError>
    where
        L: Label,
        O: OperateOn<L>,
        I: IntoIterator<Item = Vec<L>>,
        F: FnMut(EnumerationProgress),
    {
        let operations = self.symmetry_group.operations();
        info!("using {} symmetry operations", operations.len());

        let mut seen: AHashSet<Fingerprint> = AHashSet::new();
        let mut unique_configurations = Vec::new();

        for (index, candidate) in candidates.into_iter().enumerate() {
            if !seen.contains(&alphabet.fingerprint(&candidate)?) {
                let mut configuration = Configuration::new(candidate);
                let orbit = configuration.orbit(operations, alphabet)?;
                configuration.set_count(orbit.len());
                seen.extend(orbit);
                unique_configurations.push(configuration);
                debug!(
                    "found {}, screened {}",
                    unique_configurations.len(),
                    seen.len()
                );
            }
            progress(EnumerationProgress {
                found: unique_configurations.len(),
                screened: index + 1,
                seen: seen.len(),
                total,
            });
        }

        info!("unique configurations: {}", unique_configurations.len());
        Ok(unique_configurations)
    }
}

impl<T: fmt::Debug> fmt::Display for ConfigurationSpace<T, SymmetryOperation> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ConfigurationSpace")?;
        writeln!(f, "{:?}", self.objects)?;
        for so in &self.symmetry_group {
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
