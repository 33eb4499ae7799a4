//! Scheme-generic encryption parameters and their content-addressed identity.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use sha2::{Digest, Sha256};

use crate::coeff_modulus::CoeffModulus;
use crate::errors::{ParametersError, Result};
use crate::qualifiers::EncryptionParameterQualifiers;
use crate::zq::Modulus;

/// Largest number of primes allowed in a coefficient modulus chain.
pub(crate) const COEFF_MODULUS_COUNT_MAX: usize = 64;

/// Smallest supported polynomial modulus degree.
pub(crate) const POLY_MODULUS_DEGREE_MIN: usize = 1024;

/// Largest supported polynomial modulus degree.
pub(crate) const POLY_MODULUS_DEGREE_MAX: usize = 32768;

/// The type of encryption scheme a parameter set targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeType {
    /// Brakerski/Fan-Vercauteren: exact arithmetic modulo a plain modulus.
    Bfv,
    /// Cheon-Kim-Kim-Song: approximate arithmetic, no plain modulus.
    Ckks,
    /// Brakerski-Gentry-Vaikuntanathan: exact arithmetic modulo a plain modulus.
    Bgv,
}

impl SchemeType {
    /// Returns whether the scheme encodes plaintexts modulo a plain modulus.
    #[must_use]
    pub const fn uses_plain_modulus(self) -> bool {
        matches!(self, SchemeType::Bfv | SchemeType::Bgv)
    }
}

impl From<SchemeType> for u8 {
    fn from(scheme: SchemeType) -> Self {
        match scheme {
            SchemeType::Bfv => 1,
            SchemeType::Ckks => 2,
            SchemeType::Bgv => 3,
        }
    }
}

impl TryFrom<u8> for SchemeType {
    type Error = crate::Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(SchemeType::Bfv),
            2 => Ok(SchemeType::Ckks),
            3 => Ok(SchemeType::Bgv),
            _ => Err(ParametersError::InvalidScheme(tag).into()),
        }
    }
}

impl fmt::Display for SchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeType::Bfv => write!(f, "BFV"),
            SchemeType::Ckks => write!(f, "CKKS"),
            SchemeType::Bgv => write!(f, "BGV"),
        }
    }
}

/// Content-addressed fingerprint of a parameter set.
///
/// Two parameter sets with identical fields always carry the same id, across
/// processes and runs; any single field change produces a different id. The
/// id doubles as the chain-level key inside a [`crate::Context`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParmsId([u64; 4]);

impl fmt::Display for ParmsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:016x}{:016x}{:016x}{:016x}",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl fmt::Debug for ParmsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParmsId({self})")
    }
}

fn compute_parms_id(
    scheme: SchemeType,
    poly_modulus_degree: usize,
    coeff_modulus: &[Modulus],
    plain_modulus: Option<&Modulus>,
) -> ParmsId {
    let mut hasher = Sha256::new();
    hasher.update((u8::from(scheme) as u64).to_le_bytes());
    hasher.update((poly_modulus_degree as u64).to_le_bytes());
    for q in coeff_modulus {
        hasher.update(q.value().to_le_bytes());
    }
    hasher.update(plain_modulus.map_or(0, Modulus::value).to_le_bytes());

    let digest = hasher.finalize();
    let mut words = [0u64; 4];
    for (word, chunk) in words.iter_mut().zip(digest.chunks_exact(8)) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        *word = u64::from_le_bytes(bytes);
    }
    ParmsId(words)
}

/// An immutable bundle of encryption parameters.
///
/// Holds the scheme type, the polynomial modulus degree, the coefficient
/// modulus chain, and (for BFV/BGV) the plain modulus, together with the
/// cached [`ParmsId`] fingerprint. Construction goes through
/// [`EncryptionParametersBuilder`]; semantic validity is established by
/// qualifier evaluation when a [`crate::Context`] is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionParameters {
    scheme: SchemeType,
    poly_modulus_degree: usize,
    coeff_modulus: Vec<Modulus>,
    plain_modulus: Option<Modulus>,
    parms_id: ParmsId,
}

impl EncryptionParameters {
    /// Returns the scheme type.
    #[must_use]
    pub const fn scheme(&self) -> SchemeType {
        self.scheme
    }

    /// Returns the polynomial modulus degree.
    #[must_use]
    pub const fn poly_modulus_degree(&self) -> usize {
        self.poly_modulus_degree
    }

    /// Returns the coefficient modulus chain.
    #[must_use]
    pub fn coeff_modulus(&self) -> &[Modulus] {
        &self.coeff_modulus
    }

    /// Returns the total bit count of the coefficient modulus.
    #[must_use]
    pub fn coeff_modulus_bit_count(&self) -> usize {
        self.coeff_modulus.iter().map(Modulus::bit_count).sum()
    }

    /// Returns the plain modulus, if the scheme has one.
    #[must_use]
    pub fn plain_modulus(&self) -> Option<&Modulus> {
        self.plain_modulus.as_ref()
    }

    /// Returns the fingerprint of this parameter set.
    #[must_use]
    pub fn parms_id(&self) -> &ParmsId {
        &self.parms_id
    }

    /// Evaluates the qualifiers of this parameter set.
    #[must_use]
    pub fn qualifiers(&self) -> EncryptionParameterQualifiers {
        EncryptionParameterQualifiers::evaluate(self)
    }

    /// Returns the parameters one chain level down: the same set with the
    /// smallest coefficient modulus prime removed, under a fresh fingerprint.
    ///
    /// Callers must guarantee at least two primes remain.
    pub(crate) fn without_smallest_modulus(&self) -> EncryptionParameters {
        debug_assert!(self.coeff_modulus.len() > 1);
        let mut coeff_modulus = self.coeff_modulus.clone();
        if let Some(smallest) = coeff_modulus
            .iter()
            .enumerate()
            .min_by_key(|(_, q)| q.value())
            .map(|(i, _)| i)
        {
            coeff_modulus.remove(smallest);
        }
        let parms_id = compute_parms_id(
            self.scheme,
            self.poly_modulus_degree,
            &coeff_modulus,
            self.plain_modulus.as_ref(),
        );
        EncryptionParameters {
            scheme: self.scheme,
            poly_modulus_degree: self.poly_modulus_degree,
            coeff_modulus,
            plain_modulus: self.plain_modulus,
            parms_id,
        }
    }
}

/// Builder for [`EncryptionParameters`].
#[derive(Debug)]
pub struct EncryptionParametersBuilder {
    scheme: SchemeType,
    poly_modulus_degree: usize,
    coeff_modulus: Vec<Modulus>,
    coeff_modulus_values: Vec<u64>,
    coeff_modulus_sizes: Vec<usize>,
    plain_modulus: Option<Modulus>,
    plain_modulus_value: Option<u64>,
}

impl EncryptionParametersBuilder {
    /// Creates a new builder for the given scheme.
    #[must_use]
    pub fn new(scheme: SchemeType) -> Self {
        Self {
            scheme,
            poly_modulus_degree: Default::default(),
            coeff_modulus: Default::default(),
            coeff_modulus_values: Default::default(),
            coeff_modulus_sizes: Default::default(),
            plain_modulus: None,
            plain_modulus_value: None,
        }
    }

    /// Sets the polynomial modulus degree.
    pub fn set_poly_modulus_degree(&mut self, poly_modulus_degree: usize) -> &mut Self {
        self.poly_modulus_degree = poly_modulus_degree;
        self
    }

    /// Sets the coefficient modulus chain. Only one of `set_coeff_modulus`,
    /// `set_coeff_moduli` and `set_coeff_modulus_sizes` can be specified.
    pub fn set_coeff_modulus(&mut self, coeff_modulus: &[Modulus]) -> &mut Self {
        coeff_modulus.clone_into(&mut self.coeff_modulus);
        self
    }

    /// Sets the coefficient modulus chain from raw values, each validated
    /// through [`Modulus::new`] at build time. Only one of
    /// `set_coeff_modulus`, `set_coeff_moduli` and `set_coeff_modulus_sizes`
    /// can be specified.
    pub fn set_coeff_moduli(&mut self, coeff_moduli: &[u64]) -> &mut Self {
        coeff_moduli.clone_into(&mut self.coeff_modulus_values);
        self
    }

    /// Sets the bit sizes of a coefficient modulus chain to generate at build
    /// time, NTT-compatible with the degree. Only one of `set_coeff_modulus`,
    /// `set_coeff_moduli` and `set_coeff_modulus_sizes` can be specified.
    pub fn set_coeff_modulus_sizes(&mut self, sizes: &[usize]) -> &mut Self {
        sizes.clone_into(&mut self.coeff_modulus_sizes);
        self
    }

    /// Sets the plain modulus.
    pub fn set_plain_modulus(&mut self, plain_modulus: Modulus) -> &mut Self {
        self.plain_modulus = Some(plain_modulus);
        self
    }

    /// Sets the plain modulus from a raw value, validated at build time.
    pub fn set_plain_modulus_u64(&mut self, plain_modulus: u64) -> &mut Self {
        self.plain_modulus_value = Some(plain_modulus);
        self
    }

    /// Build a new [`EncryptionParameters`] inside an `Arc`.
    pub fn build_arc(&self) -> Result<Arc<EncryptionParameters>> {
        self.build().map(Arc::new)
    }

    /// Build a new [`EncryptionParameters`].
    pub fn build(&self) -> Result<EncryptionParameters> {
        // Check that exactly one of the coefficient modulus specifications was
        // given.
        let specified = [
            !self.coeff_modulus.is_empty(),
            !self.coeff_modulus_values.is_empty(),
            !self.coeff_modulus_sizes.is_empty(),
        ];
        match specified.iter().filter(|&&s| s).count() {
            0 => return Err(ParametersError::MissingCoeffModulus.into()),
            1 => (),
            _ => return Err(ParametersError::CoeffModulusSpecifiedTwice.into()),
        }

        let coeff_modulus = if !self.coeff_modulus.is_empty() {
            self.coeff_modulus.clone()
        } else if !self.coeff_modulus_values.is_empty() {
            self.coeff_modulus_values
                .iter()
                .map(|&v| Modulus::new(v))
                .try_collect()?
        } else {
            CoeffModulus::create(self.poly_modulus_degree, &self.coeff_modulus_sizes)?
        };

        let plain_modulus = match (self.plain_modulus, self.plain_modulus_value) {
            (Some(_), Some(_)) => return Err(ParametersError::PlainModulusSpecifiedTwice.into()),
            (Some(t), None) => Some(t),
            (None, Some(t)) => Some(Modulus::new(t)?),
            (None, None) => None,
        };
        if plain_modulus.is_some() && !self.scheme.uses_plain_modulus() {
            return Err(ParametersError::PlainModulusNotSupported(self.scheme).into());
        }

        let parms_id = compute_parms_id(
            self.scheme,
            self.poly_modulus_degree,
            &coeff_modulus,
            plain_modulus.as_ref(),
        );
        Ok(EncryptionParameters {
            scheme: self.scheme,
            poly_modulus_degree: self.poly_modulus_degree,
            coeff_modulus,
            plain_modulus,
            parms_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{EncryptionParametersBuilder, SchemeType};
    use crate::zq::Modulus;
    use crate::{Error, ParametersError};

    fn moduli(values: &[u64]) -> Vec<Modulus> {
        values.iter().map(|&v| Modulus::new(v).unwrap()).collect()
    }

    #[test]
    fn scheme_tags_round_trip() {
        for scheme in [SchemeType::Bfv, SchemeType::Ckks, SchemeType::Bgv] {
            assert_eq!(SchemeType::try_from(u8::from(scheme)).unwrap(), scheme);
        }
        assert_eq!(
            SchemeType::try_from(0).unwrap_err(),
            Error::ParametersError(ParametersError::InvalidScheme(0))
        );
        assert_eq!(
            SchemeType::try_from(4).unwrap_err(),
            Error::ParametersError(ParametersError::InvalidScheme(4))
        );
    }

    #[test]
    fn parms_id_is_deterministic() {
        let build = || {
            EncryptionParametersBuilder::new(SchemeType::Bfv)
                .set_poly_modulus_degree(4096)
                .set_coeff_modulus(&moduli(&[0xffffee001, 0xffffc4001, 0x1ffffe0001]))
                .set_plain_modulus_u64(786433)
                .build()
                .unwrap()
        };
        assert_eq!(build().parms_id(), build().parms_id());
        assert_eq!(build(), build());
    }

    #[test]
    fn parms_id_separates_fields() {
        let base = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(4096)
            .set_coeff_modulus(&moduli(&[0xffffee001, 0xffffc4001]))
            .set_plain_modulus_u64(786433)
            .build()
            .unwrap();

        let other_scheme = EncryptionParametersBuilder::new(SchemeType::Bgv)
            .set_poly_modulus_degree(4096)
            .set_coeff_modulus(&moduli(&[0xffffee001, 0xffffc4001]))
            .set_plain_modulus_u64(786433)
            .build()
            .unwrap();
        assert_ne!(base.parms_id(), other_scheme.parms_id());

        let other_degree = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(8192)
            .set_coeff_modulus(&moduli(&[0xffffee001, 0xffffc4001]))
            .set_plain_modulus_u64(786433)
            .build()
            .unwrap();
        assert_ne!(base.parms_id(), other_degree.parms_id());

        let other_moduli = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(4096)
            .set_coeff_modulus(&moduli(&[0xffffee001]))
            .set_plain_modulus_u64(786433)
            .build()
            .unwrap();
        assert_ne!(base.parms_id(), other_moduli.parms_id());

        let other_plain = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(4096)
            .set_coeff_modulus(&moduli(&[0xffffee001, 0xffffc4001]))
            .set_plain_modulus_u64(65537)
            .build()
            .unwrap();
        assert_ne!(base.parms_id(), other_plain.parms_id());
    }

    #[test]
    fn builder_rejects_conflicts() {
        let err = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(4096)
            .set_coeff_modulus(&moduli(&[0xffffee001]))
            .set_coeff_modulus_sizes(&[36, 36])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::ParametersError(ParametersError::CoeffModulusSpecifiedTwice)
        );

        let err = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(4096)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::ParametersError(ParametersError::MissingCoeffModulus)
        );

        let err = EncryptionParametersBuilder::new(SchemeType::Ckks)
            .set_poly_modulus_degree(4096)
            .set_coeff_modulus(&moduli(&[0xffffee001]))
            .set_plain_modulus_u64(786433)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::ParametersError(ParametersError::PlainModulusNotSupported(SchemeType::Ckks))
        );
    }

    #[test]
    fn builder_accepts_raw_moduli() {
        let parms = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(4096)
            .set_coeff_moduli(&[0xffffee001, 0xffffc4001])
            .set_plain_modulus_u64(786433)
            .build()
            .unwrap();
        assert_eq!(
            parms.coeff_modulus(),
            &moduli(&[0xffffee001, 0xffffc4001])[..]
        );

        let err = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(4096)
            .set_coeff_moduli(&[0xffffee001, 1])
            .set_plain_modulus_u64(786433)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::InvalidModulus(1));

        let err = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(4096)
            .set_coeff_moduli(&[0xffffee001])
            .set_coeff_modulus_sizes(&[36])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::ParametersError(ParametersError::CoeffModulusSpecifiedTwice)
        );
    }

    #[test]
    fn builder_generates_moduli_from_sizes() {
        let parms = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(4096)
            .set_coeff_modulus_sizes(&[36, 36, 37])
            .set_plain_modulus_u64(786433)
            .build()
            .unwrap();
        assert_eq!(parms.coeff_modulus().len(), 3);
        assert_eq!(parms.coeff_modulus_bit_count(), 109);
        for q in parms.coeff_modulus() {
            assert!(q.is_prime());
            assert!(q.supports_ntt(4096));
        }
    }

    #[test]
    fn smallest_modulus_removal() {
        let parms = EncryptionParametersBuilder::new(SchemeType::Bfv)
            .set_poly_modulus_degree(4096)
            .set_coeff_modulus(&moduli(&[0x1ffffe0001, 0xffffee001, 0xffffc4001]))
            .set_plain_modulus_u64(786433)
            .build()
            .unwrap();

        let reduced = parms.without_smallest_modulus();
        assert_eq!(
            reduced.coeff_modulus(),
            &moduli(&[0x1ffffe0001, 0xffffee001])[..]
        );
        assert_ne!(parms.parms_id(), reduced.parms_id());
        assert_eq!(reduced.scheme(), parms.scheme());
        assert_eq!(reduced.plain_modulus(), parms.plain_modulus());
    }

    proptest! {
        #[test]
        fn parms_id_content_addressing(a in 2u64..1 << 20, b in 2u64..1 << 20) {
            let build = |plain: u64| {
                EncryptionParametersBuilder::new(SchemeType::Bfv)
                    .set_poly_modulus_degree(4096)
                    .set_coeff_modulus(&[Modulus::new(0xffffee001).unwrap()])
                    .set_plain_modulus_u64(plain)
                    .build()
                    .unwrap()
            };
            prop_assert_eq!(*build(a).parms_id() == *build(b).parms_id(), a == b);
        }
    }
}
