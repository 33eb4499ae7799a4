use thiserror::Error;

use crate::coeff_modulus::SecurityLevel;
use crate::parameters::ParmsId;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that a modulus value is out of bounds.
    #[error("Invalid modulus: {0} is not an integer in [2, 2^61)")]
    InvalidModulus(u64),

    /// Indicates a parameter error.
    #[error("{0}")]
    ParametersError(ParametersError),

    /// Indicates that context construction was attempted from parameters that
    /// fail qualifier evaluation.
    #[error("Invalid encryption parameters: {0}")]
    InvalidParameters(QualifierFailure),

    /// Indicates that the parameters do not reach the security level requested
    /// at context construction.
    #[error("Security level too low: parameters reach {actual} but {requested} was requested")]
    SecurityLevelTooLow {
        /// The floor requested at context construction.
        requested: SecurityLevel,
        /// The level the key-level parameters actually reach.
        actual: SecurityLevel,
    },

    /// Indicates that no chain level carries the given parameters id.
    #[error("No context data for parameters id {0}")]
    UnknownParmsId(ParmsId),
}

impl From<ParametersError> for Error {
    fn from(e: ParametersError) -> Self {
        Error::ParametersError(e)
    }
}

/// Separate enum to indicate parameters-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParametersError {
    /// Indicates that a scheme identifier does not name a known scheme.
    #[error("Invalid scheme identifier: {0}")]
    InvalidScheme(u8),

    /// Indicates that the degree is invalid.
    #[error("Invalid degree: {0} is not a power of 2")]
    InvalidDegree(usize),

    /// Indicates that a requested modulus size is invalid.
    #[error("Invalid modulus size: {size}, expected an integer between {min} and {max}")]
    InvalidModulusSize {
        /// The requested bit size.
        size: usize,
        /// Smallest supported bit size.
        min: usize,
        /// Largest supported bit size.
        max: usize,
    },

    /// Indicates that the security tables have no entry for the degree.
    #[error("No security table entry for degree {0} at level {1}")]
    UnsupportedParameters(usize, SecurityLevel),

    /// Indicates that the downward prime search ran out of candidates.
    #[error("Exhausted the {size}-bit primes congruent to 1 modulo {modulo}")]
    ModulusSearchExhausted {
        /// The requested bit size.
        size: usize,
        /// The congruence constraint, i.e. twice the polynomial degree.
        modulo: u64,
    },

    /// Indicates that no coefficient modulus was specified.
    #[error("A coefficient modulus is required: set moduli or modulus sizes")]
    MissingCoeffModulus,

    /// Indicates that the coefficient modulus was specified twice.
    #[error("Only one of the coefficient moduli and the modulus sizes can be specified")]
    CoeffModulusSpecifiedTwice,

    /// Indicates that the plain modulus was specified twice.
    #[error("Only one of `set_plain_modulus` and `set_plain_modulus_u64` can be used")]
    PlainModulusSpecifiedTwice,

    /// Indicates that a plain modulus was given to a scheme that has none.
    #[error("The {0} scheme does not use a plain modulus")]
    PlainModulusNotSupported(crate::parameters::SchemeType),
}

/// The reason a set of encryption parameters fails qualifier evaluation.
///
/// Qualifier evaluation itself never fails; this value travels inside the
/// returned qualifiers, and becomes a hard [`Error::InvalidParameters`] only
/// when a [`crate::Context`] is built from the failing parameters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QualifierFailure {
    /// The degree is not a power of two within the supported range.
    #[error("degree {0} is not a power of 2 in [1024, 32768]")]
    InvalidDegree(usize),

    /// The coefficient modulus is empty or has too many primes.
    #[error("the coefficient modulus must hold between 1 and 64 primes")]
    ModulusTooLarge,

    /// The scheme requires a plain modulus and none was given.
    #[error("the scheme requires a plain modulus")]
    PlainModulusRequired,

    /// The plain modulus is not smaller than every coefficient modulus prime.
    #[error("the plain modulus must be smaller than every coefficient modulus prime")]
    PlainModulusTooLarge,
}
