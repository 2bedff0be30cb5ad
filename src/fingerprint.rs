//! # Fingerprints
//!
//! A [`Fingerprint`] is a label vector read as a number: each label is replaced
//! by its rank in a sorted [`Alphabet`] and the ranks are read as the digits of
//! a base-`radix` integer, most significant site first. For vectors of a fixed
//! length this encoding is injective and order preserving, which makes it a
//! cheap set key for orbit screening.
//!
//! Alphabets whose largest fingerprint fits in a `u128` produce
//! [`Fingerprint::Narrow`] keys. Larger ones fall back to arbitrary precision
//! [`Fingerprint::Wide`] keys, so every alphabet and vector length can be
//! fingerprinted.

use std::fmt::Debug;

use derive_more::{Display, From};
use num_bigint::BigUint;
use thiserror::Error;

use crate::configuration::Label;

/// All fingerprints taken over one [`Alphabet`] share a variant.
#[derive(Clone, Debug, Display, From, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fingerprint {
    Narrow(u128),
    Wide(BigUint),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("label {label} is not part of the alphabet")]
    UnknownLabel { label: String },

    #[error("expected a vector of {expected} labels, found {found}")]
    Length { expected: usize, found: usize },
}

/// The sorted, duplicate free set of labels a fingerprint is taken over,
/// together with the vector length it was sized for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet<L> {
    labels: Vec<L>,
    sites: usize,
    wide: bool,
}

/// Whether `radix^sites - 1`, the largest fingerprint, fits in a `u128`.
fn fits_u128(radix: usize, sites: usize) -> bool {
    if radix <= 1 || sites == 0 {
        return true;
    }
    let Ok(exponent) = u32::try_from(sites - 1) else {
        return false;
    };
    // radix^sites - 1 == p * (radix - 1) + (p - 1) with p = radix^(sites - 1)
    (radix as u128)
        .checked_pow(exponent)
        .and_then(|p| p.checked_mul(radix as u128 - 1)?.checked_add(p - 1))
        .is_some()
}

impl<L: Label> Alphabet<L> {
    /// ```
    /// # use sitesym::fingerprint::{Alphabet, Fingerprint};
    /// let alphabet = Alphabet::new(['b', 'a', 'b'], 3);
    /// assert_eq!(alphabet.labels(), &['a', 'b']);
    /// assert_eq!(alphabet.fingerprint(&['b', 'a', 'b']), Ok(Fingerprint::Narrow(0b101)));
    /// assert!(Alphabet::new([0u8, 1, 2], 100).is_wide());
    /// ```
    pub fn new<I: IntoIterator<Item = L>>(labels: I, sites: usize) -> Self {
        let mut labels: Vec<L> = labels.into_iter().collect();
        labels.sort();
        labels.dedup();

        let wide = !fits_u128(labels.len(), sites);
        if wide {
            log::debug!(
                "{sites} sites over {} labels need arbitrary precision fingerprints",
                labels.len()
            );
        }
        Alphabet {
            labels,
            sites,
            wide,
        }
    }

    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn radix(&self) -> usize {
        self.labels.len()
    }

    pub fn sites(&self) -> usize {
        self.sites
    }

    /// Whether fingerprints over this alphabet are [`Fingerprint::Wide`].
    pub fn is_wide(&self) -> bool {
        self.wide
    }

    pub fn contains(&self, label: &L) -> bool {
        self.labels.binary_search(label).is_ok()
    }

    /// The digit `label` contributes to a fingerprint.
    pub fn digit(&self, label: &L) -> Result<usize, FingerprintError> {
        self.labels
            .binary_search(label)
            .map_err(|_| FingerprintError::UnknownLabel {
                label: format!("{label:?}"),
            })
    }

    pub fn fingerprint(&self, vector: &[L]) -> Result<Fingerprint, FingerprintError> {
        if vector.len() != self.sites {
            return Err(FingerprintError::Length {
                expected: self.sites,
                found: vector.len(),
            });
        }
        if self.wide {
            let radix = self.radix() as u64;
            let mut total = BigUint::default();
            for label in vector {
                total = total * radix + self.digit(label)? as u64;
            }
            return Ok(Fingerprint::Wide(total));
        }
        let radix = self.radix() as u128;
        let mut total = 0u128;
        for label in vector {
            // cannot overflow: checked by fits_u128 at construction
            total = total * radix + self.digit(label)? as u128;
        }
        Ok(Fingerprint::Narrow(total))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn binary_fingerprint_reads_as_number() {
        let alphabet = Alphabet::new([0, 1], 5);
        assert_eq!(
            alphabet.fingerprint(&[1, 1, 0, 0, 1]),
            Ok(Fingerprint::Narrow(0b11001))
        );
    }

    #[test]
    fn decimal_alphabet_matches_decimal_digits() {
        let alphabet = Alphabet::new(0..10u8, 5);
        assert_eq!(
            alphabet.fingerprint(&[1, 1, 0, 0, 1]),
            Ok(Fingerprint::Narrow(11001))
        );
    }

    #[test]
    fn fingerprint_preserves_order() {
        let alphabet = Alphabet::new(["Li", "Ti", "vac"], 3);
        let low = alphabet.fingerprint(&["Li", "vac", "vac"]).unwrap();
        let high = alphabet.fingerprint(&["Ti", "Li", "Li"]).unwrap();
        assert!(low < high);
    }

    #[test]
    fn single_label_alphabet() {
        let alphabet = Alphabet::new(['x'], 500);
        assert!(!alphabet.is_wide());
        assert_eq!(alphabet.fingerprint(&['x'; 500]), Ok(Fingerprint::Narrow(0)));
    }

    #[test]
    fn narrow_up_to_full_width() {
        let alphabet = Alphabet::new([0, 1], 128);
        assert!(!alphabet.is_wide());
        assert_eq!(alphabet.fingerprint(&[1; 128]), Ok(Fingerprint::Narrow(u128::MAX)));

        assert!(Alphabet::new([0, 1], 129).is_wide());
        assert!(!Alphabet::new([0, 1, 2], 80).is_wide());
        assert!(Alphabet::new([0, 1, 2], 81).is_wide());
    }

    #[test]
    fn wide_fingerprints_past_u128() {
        let alphabet = Alphabet::new([0, 1], 200);
        let mut vector = vec![0; 200];
        vector[0] = 1;
        assert_eq!(
            alphabet.fingerprint(&vector),
            Ok(Fingerprint::Wide(BigUint::from(1u8) << 199))
        );

        let last = alphabet.fingerprint(&[1; 200]).unwrap();
        assert_eq!(
            last,
            Fingerprint::Wide((BigUint::from(1u8) << 200) - 1u8)
        );
        assert!(alphabet.fingerprint(&vector).unwrap() < last);
    }

    #[test]
    fn fingerprint_errors() {
        let alphabet = Alphabet::new([0, 1], 2);
        insta::assert_snapshot!(
            alphabet.fingerprint(&[0, 2]).unwrap_err().to_string(),
            @"label 2 is not part of the alphabet"
        );
        insta::assert_snapshot!(
            alphabet.fingerprint(&[0]).unwrap_err().to_string(),
            @"expected a vector of 2 labels, found 1"
        );
    }

    fn label_pair() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
        (0usize..12).prop_flat_map(|n| {
            (
                prop::collection::vec(0u8..5, n),
                prop::collection::vec(0u8..5, n),
            )
        })
    }

    fn long_label_pair() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
        (60usize..90).prop_flat_map(|n| {
            (
                prop::collection::vec(0u8..5, n),
                prop::collection::vec(0u8..5, n),
            )
        })
    }

    proptest! {
        #[test]
        fn fingerprint_is_injective_and_monotone((a, b) in label_pair()) {
            let alphabet = Alphabet::new(0u8..5, a.len());
            let (fa, fb) = (alphabet.fingerprint(&a).unwrap(), alphabet.fingerprint(&b).unwrap());
            prop_assert_eq!(fa == fb, a == b);
            prop_assert_eq!(fa.cmp(&fb), a.cmp(&b));
        }

        #[test]
        fn wide_fingerprint_is_injective_and_monotone((a, b) in long_label_pair()) {
            let alphabet = Alphabet::new(0u8..5, a.len());
            prop_assert!(alphabet.is_wide());
            let (fa, fb) = (alphabet.fingerprint(&a).unwrap(), alphabet.fingerprint(&b).unwrap());
            prop_assert_eq!(fa == fb, a == b);
            prop_assert_eq!(fa.cmp(&fb), a.cmp(&b));
        }
    }
}
