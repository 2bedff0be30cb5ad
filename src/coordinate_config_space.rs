//! # Coordinate configuration spaces
//!
//! A [`CoordinateConfigSpace`] is a [`ConfigurationSpace`] whose sites carry
//! coordinates. Its enumeration is the plain one; each representative is
//! then projected onto the coordinates, grouped by label.

use std::{collections::BTreeMap, ops::Deref};

use crate::{
    configuration::Label,
    configuration_space::{ConfigurationSpace, SpaceError},
    symmetry_group::SymmetryGroup,
    symmetry_operation::{OperateOn, SiteOperation, SymmetryOperation},
};

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateConfigSpace<C, T = usize, O = SymmetryOperation> {
    space: ConfigurationSpace<T, O>,
    coordinates: Vec<C>,
}

impl<C> CoordinateConfigSpace<C, usize, SymmetryOperation> {
    /// One site per coordinate, the sites named `1..=n`.
    pub fn new(coordinates: Vec<C>, symmetry_group: Option<SymmetryGroup>) -> Result<Self, SpaceError> {
        let objects = (1..=coordinates.len()).collect();
        Self::with_objects(coordinates, objects, symmetry_group)
    }
}

impl<C, T> CoordinateConfigSpace<C, T, SymmetryOperation> {
    pub fn with_objects(
        coordinates: Vec<C>,
        objects: Vec<T>,
        symmetry_group: Option<SymmetryGroup>,
    ) -> Result<Self, SpaceError> {
        check_coordinates(&coordinates, &objects)?;
        Ok(CoordinateConfigSpace {
            space: ConfigurationSpace::new(objects, symmetry_group)?,
            coordinates,
        })
    }
}

impl<C, T, O: SiteOperation> CoordinateConfigSpace<C, T, O> {
    pub fn with_group(
        coordinates: Vec<C>,
        objects: Vec<T>,
        symmetry_group: SymmetryGroup<O>,
    ) -> Result<Self, SpaceError> {
        check_coordinates(&coordinates, &objects)?;
        Ok(CoordinateConfigSpace {
            space: ConfigurationSpace::with_group(objects, symmetry_group)?,
            coordinates,
        })
    }

    pub fn space(&self) -> &ConfigurationSpace<T, O> {
        &self.space
    }

    pub fn coordinates(&self) -> &[C] {
        &self.coordinates
    }

    /// For each orbit representative, the coordinates of the sites holding each label.
    ///
    /// ```
    /// # use std::collections::BTreeMap;
    /// # use sitesym::CoordinateConfigSpace;
    /// let space = CoordinateConfigSpace::new(vec![[0.0, 0.0], [0.5, 0.5]], None).unwrap();
    /// let unique = space
    ///     .unique_coordinates(&BTreeMap::from([("Li", 1), ("vac", 1)]))
    ///     .unwrap();
    /// assert_eq!(unique[0]["Li"], vec![[0.0, 0.0]]);
    /// assert_eq!(unique[1]["Li"], vec![[0.5, 0.5]]);
    /// ```
    pub fn unique_coordinates<L>(
        &self,
        site_distribution: &BTreeMap<L, usize>,
    ) -> Result<Vec<BTreeMap<L, Vec<C>>>, SpaceError>
    where
        L: Label,
        O: OperateOn<L>,
        C: Clone,
    {
        Ok(self
            .space
            .unique_configurations(site_distribution)?
            .iter()
            .map(|configuration| configuration.map_objects(&self.coordinates))
            .collect())
    }
}

fn check_coordinates<C, T>(coordinates: &[C], objects: &[T]) -> Result<(), SpaceError> {
    if coordinates.len() != objects.len() {
        return Err(SpaceError::ObjectCount {
            expected: objects.len(),
            found: coordinates.len(),
        });
    }
    Ok(())
}

impl<C, T, O> Deref for CoordinateConfigSpace<C, T, O> {
    type Target = ConfigurationSpace<T, O>;

    fn deref(&self) -> &Self::Target {
        &self.space
    }
}
