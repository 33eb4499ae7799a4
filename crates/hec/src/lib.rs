#![crate_name = "hec"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]
#![doc = include_str!("../README.md")]

#[cfg(test)]
#[macro_use]
extern crate proptest;

mod coeff_modulus;
mod context;
mod errors;
mod parameters;
mod qualifiers;

pub mod zq;

pub use coeff_modulus::{CoeffModulus, PlainModulus, SecurityLevel};
pub use context::{Context, ContextData};
pub use errors::{Error, ParametersError, QualifierFailure, Result};
pub use parameters::{EncryptionParameters, EncryptionParametersBuilder, ParmsId, SchemeType};
pub use qualifiers::EncryptionParameterQualifiers;
