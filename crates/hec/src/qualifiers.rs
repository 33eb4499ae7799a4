//! Derivation of parameter qualifiers from a set of encryption parameters.

use itertools::Itertools;

use crate::coeff_modulus::{estimate_security_level, SecurityLevel};
use crate::errors::QualifierFailure;
use crate::parameters::{
    EncryptionParameters, SchemeType, COEFF_MODULUS_COUNT_MAX, POLY_MODULUS_DEGREE_MAX,
    POLY_MODULUS_DEGREE_MIN,
};
use crate::zq::Modulus;

/// Attributes of a set of [`EncryptionParameters`], derived purely from the
/// parameters themselves.
///
/// Qualifiers determine which algorithmic paths the parameters support. They
/// are computed by [`EncryptionParameterQualifiers::evaluate`] and, once the
/// parameters are folded into a [`crate::Context`], silently travel with each
/// chain level; they never change independently of their parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionParameterQualifiers {
    /// Why evaluation failed, or `None` when the parameters are valid.
    failure: Option<QualifierFailure>,

    /// Whether the polynomial modulus is of the form `X^N + 1` with `N` a
    /// power of two, enabling FFT-based polynomial multiplication. Parameters
    /// cannot be valid without this.
    pub using_fft: bool,

    /// Whether every prime in the coefficient modulus is congruent to 1
    /// modulo `2N`, enabling number-theoretic transforms modulo each prime.
    pub using_ntt: bool,

    /// Whether plaintexts can be viewed as 2-by-(N/2) matrices of slot values
    /// operated on in a SIMD fashion. For BFV/BGV this requires the plain
    /// modulus to be congruent to 1 modulo `2N`; for CKKS it comes with NTT
    /// support.
    pub using_batching: bool,

    /// Whether the plain modulus is smaller than every coefficient modulus
    /// prime, enabling plaintext lifting without base conversion.
    pub using_fast_plain_lift: bool,

    /// Whether the coefficient modulus primes are strictly decreasing,
    /// letting chain derivation drop the trailing prime at every level.
    pub using_descending_modulus_chain: bool,

    /// Whether the coefficient modulus holds more than one prime, which is
    /// what makes key-switching (relinearization, rotation) keys possible.
    pub using_keyswitching: bool,

    /// The highest standard security level the total coefficient modulus bit
    /// count satisfies at this degree, or [`SecurityLevel::None`].
    pub security_level: SecurityLevel,
}

impl EncryptionParameterQualifiers {
    /// Returns whether the parameters passed every structural check.
    #[must_use]
    pub const fn parameters_set(&self) -> bool {
        self.failure.is_none()
    }

    /// Returns why evaluation failed, if it did.
    #[must_use]
    pub const fn failure(&self) -> Option<QualifierFailure> {
        self.failure
    }

    fn invalid(failure: QualifierFailure) -> Self {
        Self {
            failure: Some(failure),
            using_fft: false,
            using_ntt: false,
            using_batching: false,
            using_fast_plain_lift: false,
            using_descending_modulus_chain: false,
            using_keyswitching: false,
            security_level: SecurityLevel::None,
        }
    }

    /// Evaluates the qualifiers of a parameter set.
    ///
    /// This never fails: structurally invalid parameters yield a value whose
    /// [`parameters_set`](Self::parameters_set) is false and whose
    /// [`failure`](Self::failure) names the first rule violated.
    #[must_use]
    pub fn evaluate(parms: &EncryptionParameters) -> Self {
        let degree = parms.poly_modulus_degree();
        if !degree.is_power_of_two()
            || !(POLY_MODULUS_DEGREE_MIN..=POLY_MODULUS_DEGREE_MAX).contains(&degree)
        {
            return Self::invalid(QualifierFailure::InvalidDegree(degree));
        }

        // Individual primes are bounded by construction of Modulus; only the
        // chain length remains to check here.
        let coeff_modulus = parms.coeff_modulus();
        if coeff_modulus.is_empty() || coeff_modulus.len() > COEFF_MODULUS_COUNT_MAX {
            return Self::invalid(QualifierFailure::ModulusTooLarge);
        }

        let plain_modulus = if parms.scheme().uses_plain_modulus() {
            match parms.plain_modulus() {
                None => return Self::invalid(QualifierFailure::PlainModulusRequired),
                Some(t) if coeff_modulus.iter().any(|q| t.value() >= q.value()) => {
                    return Self::invalid(QualifierFailure::PlainModulusTooLarge);
                }
                Some(t) => Some(t),
            }
        } else {
            None
        };

        let using_ntt = coeff_modulus.iter().all(|q| q.supports_ntt(degree));
        let using_batching = match parms.scheme() {
            SchemeType::Bfv | SchemeType::Bgv => {
                using_ntt && plain_modulus.is_some_and(|t| t.supports_ntt(degree))
            }
            SchemeType::Ckks => using_ntt,
        };
        let using_fast_plain_lift =
            plain_modulus.is_some_and(|t| coeff_modulus.iter().all(|q| t.value() < q.value()));
        let using_descending_modulus_chain = coeff_modulus
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.value() > b.value());

        Self {
            failure: None,
            using_fft: true,
            using_ntt,
            using_batching,
            using_fast_plain_lift,
            using_descending_modulus_chain,
            using_keyswitching: coeff_modulus.len() > 1,
            security_level: estimate_security_level(degree, total_bit_count(coeff_modulus)),
        }
    }
}

fn total_bit_count(coeff_modulus: &[Modulus]) -> usize {
    coeff_modulus.iter().map(Modulus::bit_count).sum()
}
