//! # Sitesym
//!
//! Sitesym enumerates the symmetry-inequivalent ways of placing labels on a
//! finite set of sites. Given the site permutations that leave a system
//! unchanged, it produces one representative configuration per orbit
//! together with the orbit size.
//!
//! ```
//! use std::collections::BTreeMap;
//! use sitesym::{ConfigurationSpace, SymmetryGroup};
//!
//! // 2x2 grid, sites numbered row by row
//! let d4: SymmetryGroup = "\
//!     E 1 2 3 4\n C4 2 4 1 3\n C2 4 3 2 1\n C4i 3 1 4 2\n\
//!     m_v 2 1 4 3\n m_h 3 4 1 2\n m_d 1 3 2 4\n m_a 4 2 3 1"
//!     .parse()
//!     .unwrap();
//! let space = ConfigurationSpace::new(vec![1, 2, 3, 4], Some(d4)).unwrap();
//! let unique = space
//!     .unique_configurations(&BTreeMap::from([(1, 2), (0, 2)]))
//!     .unwrap();
//!
//! // two occupied sites sit either on an edge or on a diagonal
//! assert_eq!(unique.len(), 2);
//! assert_eq!(unique[0].count(), Some(4));
//! assert_eq!(unique[1].count(), Some(2));
//! ```

pub mod colour_operation;
pub mod configuration;
pub mod configuration_space;
pub mod coordinate_config_space;
pub mod fingerprint;
pub mod multiset;
pub mod permutation;
pub mod sites;
pub mod symmetry_group;
pub mod symmetry_operation;

pub use colour_operation::{ColourMapping, ColourOperation};
pub use configuration::{Configuration, Label};
pub use configuration_space::{ConfigurationSpace, EnumerationProgress, SpaceError};
pub use coordinate_config_space::CoordinateConfigSpace;
pub use fingerprint::{Alphabet, Fingerprint};
pub use multiset::{number_of_unique_permutations, unique_permutations};
pub use symmetry_group::{PointGroup, SpaceGroup, SymmetryGroup};
pub use symmetry_operation::{OperateOn, OperationError, SiteOperation, SymmetryOperation};
