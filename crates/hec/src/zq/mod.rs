//! Prime moduli for RNS coefficient chains, up to 61 bits.

pub mod primes;

use std::fmt;
use std::ops::Deref;

use crate::errors::{Error, Result};

/// Largest bit count a modulus may have.
pub(crate) const MOD_BIT_COUNT_MAX: usize = 61;

/// Structure encapsulating an integer modulus up to 61 bits.
///
/// The bit count and primality are computed once at construction; the value is
/// immutable afterwards. Equality and ordering are by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Modulus {
    value: u64,
    bit_count: usize,
    is_prime: bool,
}

// Override the dereference to return the underlying modulus.
impl Deref for Modulus {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl fmt::Display for Modulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Modulus {
    /// Create a modulus from an integer of at most 61 bits.
    pub fn new(value: u64) -> Result<Self> {
        if value <= 1 || (value >> MOD_BIT_COUNT_MAX) != 0 {
            Err(Error::InvalidModulus(value))
        } else {
            Ok(Self {
                value,
                bit_count: hec_util::bit_length(value),
                is_prime: hec_util::is_prime(value),
            })
        }
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Returns the number of bits needed to represent the value.
    #[must_use]
    pub const fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Returns whether the value is prime.
    #[must_use]
    pub const fn is_prime(&self) -> bool {
        self.is_prime
    }

    /// Returns whether negacyclic NTTs of the given degree exist modulo this
    /// value, i.e. whether `value == 1 (mod 2 * degree)`.
    #[must_use]
    pub const fn supports_ntt(&self, poly_modulus_degree: usize) -> bool {
        poly_modulus_degree != 0 && (self.value - 1) % (2 * poly_modulus_degree as u64) == 0
    }
}
