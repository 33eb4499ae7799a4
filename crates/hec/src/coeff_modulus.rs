//! Coefficient and plain modulus selection following the
//! HomomorphicEncryption.org security tables.

use std::fmt;

use itertools::Itertools;

use crate::errors::{ParametersError, Result};
use crate::zq::{primes::generate_prime, Modulus};

/// Bit sizes accepted by [`CoeffModulus::create`].
const MODULUS_SIZE_MIN: usize = 10;
const MODULUS_SIZE_MAX: usize = 60;

/// Degrees with entries in the security tables.
const TABLE_DEGREES: [usize; 6] = [1024, 2048, 4096, 8192, 16384, 32768];

/// Largest total coefficient modulus bit counts per degree, from the
/// HomomorphicEncryption.org security standard.
const TC128_MAX_BITS: [usize; 6] = [27, 54, 109, 218, 438, 881];
const TC192_MAX_BITS: [usize; 6] = [19, 37, 75, 152, 305, 611];
const TC256_MAX_BITS: [usize; 6] = [14, 29, 58, 118, 237, 476];

/// A standard security level classification.
///
/// The ordering reflects strength: `None < Tc128 < Tc192 < Tc256`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecurityLevel {
    /// No security enforced.
    #[default]
    None,
    /// 128-bit classical security.
    Tc128,
    /// 192-bit classical security.
    Tc192,
    /// 256-bit classical security.
    Tc256,
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityLevel::None => write!(f, "none"),
            SecurityLevel::Tc128 => write!(f, "tc128"),
            SecurityLevel::Tc192 => write!(f, "tc192"),
            SecurityLevel::Tc256 => write!(f, "tc256"),
        }
    }
}

impl SecurityLevel {
    /// Returns the largest total coefficient modulus bit count meeting this
    /// security level at the given degree. Returns `None` when the level is
    /// unbounded ([`SecurityLevel::None`]) or the degree has no table entry.
    #[must_use]
    pub fn max_bit_count(self, poly_modulus_degree: usize) -> Option<usize> {
        let index = TABLE_DEGREES
            .iter()
            .position(|&n| n == poly_modulus_degree)?;
        match self {
            SecurityLevel::None => None,
            SecurityLevel::Tc128 => Some(TC128_MAX_BITS[index]),
            SecurityLevel::Tc192 => Some(TC192_MAX_BITS[index]),
            SecurityLevel::Tc256 => Some(TC256_MAX_BITS[index]),
        }
    }
}

/// Returns the highest standard level whose bound the given total coefficient
/// modulus bit count satisfies at the given degree.
pub(crate) fn estimate_security_level(
    poly_modulus_degree: usize,
    total_bit_count: usize,
) -> SecurityLevel {
    for level in [
        SecurityLevel::Tc256,
        SecurityLevel::Tc192,
        SecurityLevel::Tc128,
    ] {
        if let Some(bound) = level.max_bit_count(poly_modulus_degree) {
            if total_bit_count <= bound {
                return level;
            }
        }
    }
    SecurityLevel::None
}

/// Per-degree bit-size decompositions for [`CoeffModulus::bfv_default`],
/// summing exactly to the table bound of the (degree, level) pair.
fn default_bit_sizes(
    poly_modulus_degree: usize,
    sec_level: SecurityLevel,
) -> Result<&'static [usize]> {
    let sizes: &[&[usize]] = match sec_level {
        SecurityLevel::Tc128 => &[
            &[27],
            &[54],
            &[36, 36, 37],
            &[43, 43, 44, 44, 44],
            &[48, 48, 48, 49, 49, 49, 49, 49, 49],
            &[55, 55, 55, 55, 55, 55, 55, 55, 55, 55, 55, 55, 55, 55, 55, 56],
        ],
        SecurityLevel::Tc192 => &[
            &[19],
            &[37],
            &[37, 38],
            &[50, 50, 52],
            &[50, 50, 51, 51, 51, 52],
            &[55, 55, 55, 55, 55, 56, 56, 56, 56, 56, 56],
        ],
        SecurityLevel::Tc256 => &[
            &[14],
            &[29],
            &[58],
            &[39, 39, 40],
            &[47, 47, 47, 48, 48],
            &[59, 59, 59, 59, 60, 60, 60, 60],
        ],
        SecurityLevel::None => {
            return Err(ParametersError::UnsupportedParameters(poly_modulus_degree, sec_level).into())
        }
    };
    TABLE_DEGREES
        .iter()
        .position(|&n| n == poly_modulus_degree)
        .map(|index| sizes[index])
        .ok_or_else(|| {
            ParametersError::UnsupportedParameters(poly_modulus_degree, sec_level).into()
        })
}

/// Selection of coefficient modulus chains.
#[derive(Debug)]
pub struct CoeffModulus;

impl CoeffModulus {
    /// Returns a default coefficient modulus chain for BFV/BGV whose total bit
    /// count matches the security table bound for the `(degree, level)` pair.
    /// Every prime is NTT-compatible with the degree and distinct. Fails with
    /// `UnsupportedParameters` when the degree has no table entry or the
    /// requested level is [`SecurityLevel::None`].
    pub fn bfv_default(
        poly_modulus_degree: usize,
        sec_level: SecurityLevel,
    ) -> Result<Vec<Modulus>> {
        Self::create(
            poly_modulus_degree,
            default_bit_sizes(poly_modulus_degree, sec_level)?,
        )
    }

    /// Deterministically generates one distinct prime per requested bit size,
    /// each congruent to 1 modulo `2 * poly_modulus_degree`, searched downward
    /// from the top of its bit range.
    pub fn create(poly_modulus_degree: usize, bit_sizes: &[usize]) -> Result<Vec<Modulus>> {
        if poly_modulus_degree < 2 || !poly_modulus_degree.is_power_of_two() {
            return Err(ParametersError::InvalidDegree(poly_modulus_degree).into());
        }

        let mut moduli: Vec<u64> = Vec::with_capacity(bit_sizes.len());
        for size in bit_sizes {
            if !(MODULUS_SIZE_MIN..=MODULUS_SIZE_MAX).contains(size) {
                return Err(ParametersError::InvalidModulusSize {
                    size: *size,
                    min: MODULUS_SIZE_MIN,
                    max: MODULUS_SIZE_MAX,
                }
                .into());
            }

            let mut upper_bound = 1u64 << size;
            loop {
                match generate_prime(*size, 2 * poly_modulus_degree as u64, upper_bound) {
                    Some(prime) if !moduli.contains(&prime) => {
                        moduli.push(prime);
                        break;
                    }
                    // Already taken by an earlier equal-sized request; resume
                    // the search below it.
                    Some(prime) => upper_bound = prime,
                    None => {
                        return Err(ParametersError::ModulusSearchExhausted {
                            size: *size,
                            modulo: 2 * poly_modulus_degree as u64,
                        }
                        .into());
                    }
                }
            }
        }

        moduli.into_iter().map(Modulus::new).try_collect()
    }
}

/// Selection of plain moduli for BFV/BGV.
#[derive(Debug)]
pub struct PlainModulus;

impl PlainModulus {
    /// Returns a `bit_size`-bit prime plain modulus congruent to 1 modulo
    /// `2 * poly_modulus_degree`, which is the congruence enabling batching.
    pub fn batching(poly_modulus_degree: usize, bit_size: usize) -> Result<Modulus> {
        let mut primes = CoeffModulus::create(poly_modulus_degree, &[bit_size])?;
        // create() returns exactly one modulus per requested size.
        primes.pop().ok_or_else(|| {
            ParametersError::ModulusSearchExhausted {
                size: bit_size,
                modulo: 2 * poly_modulus_degree as u64,
            }
            .into()
        })
    }
}
