//! Validation of encryption parameters and construction of the
//! modulus-switching chain.

use std::collections::HashMap;
use std::sync::Arc;

use num_bigint::BigUint;

use crate::coeff_modulus::SecurityLevel;
use crate::errors::{Error, Result};
use crate::parameters::{EncryptionParameters, ParmsId};
use crate::qualifiers::EncryptionParameterQualifiers;

/// One level of the modulus-switching chain: a parameter set, its qualifiers,
/// and its position in the chain.
///
/// Created only by [`Context::new`], immutable afterwards, and owned by the
/// context for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextData {
    parms: EncryptionParameters,
    qualifiers: EncryptionParameterQualifiers,
    total_coeff_modulus: BigUint,
    chain_index: usize,
    parent_index: Option<usize>,
    is_last: bool,
}

impl ContextData {
    fn new(
        parms: EncryptionParameters,
        qualifiers: EncryptionParameterQualifiers,
        chain_index: usize,
        parent_index: Option<usize>,
    ) -> Self {
        let total_coeff_modulus = parms
            .coeff_modulus()
            .iter()
            .map(|q| BigUint::from(q.value()))
            .product();
        Self {
            parms,
            qualifiers,
            total_coeff_modulus,
            chain_index,
            parent_index,
            is_last: false,
        }
    }

    /// Returns the parameters of this level.
    #[must_use]
    pub fn parms(&self) -> &EncryptionParameters {
        &self.parms
    }

    /// Returns the fingerprint of this level's parameters.
    #[must_use]
    pub fn parms_id(&self) -> &ParmsId {
        self.parms.parms_id()
    }

    /// Returns the qualifiers of this level's parameters.
    #[must_use]
    pub fn qualifiers(&self) -> &EncryptionParameterQualifiers {
        &self.qualifiers
    }

    /// Returns the product of this level's coefficient modulus primes.
    #[must_use]
    pub fn total_coeff_modulus(&self) -> &BigUint {
        &self.total_coeff_modulus
    }

    /// Returns the bit count of the total coefficient modulus.
    #[must_use]
    pub fn total_coeff_modulus_bit_count(&self) -> usize {
        self.total_coeff_modulus.bits() as usize
    }

    /// Returns the position of this level in the chain; 0 is the key level.
    #[must_use]
    pub const fn chain_index(&self) -> usize {
        self.chain_index
    }

    /// Returns the chain position of the level this one was derived from, or
    /// `None` at the key level.
    #[must_use]
    pub const fn parent_index(&self) -> Option<usize> {
        self.parent_index
    }

    /// Returns whether this is the terminal level of the chain.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.is_last
    }
}

/// Validated encryption parameters and their modulus-switching chain.
///
/// A context either constructs fully, yielding a chain of [`ContextData`]
/// levels ordered from the key level down to the terminal level, or fails
/// construction; there is no half-built state. Once built, a context is
/// read-only and can be shared freely between key generation, encryptors,
/// evaluators and encoders.
#[derive(Debug)]
pub struct Context {
    /// Levels in derivation order; index 0 is the key level.
    chain: Vec<ContextData>,
    index: HashMap<ParmsId, usize>,
    first_index: usize,
    using_keyswitching: bool,
    security_level: SecurityLevel,
}

impl Context {
    /// Validates `parms` and builds the modulus-switching chain.
    ///
    /// The given parameters become the key level. When they enable
    /// key-switching and `expand_mod_chain` is set, successive levels are
    /// derived by dropping the smallest coefficient modulus prime and
    /// re-evaluating, until a single prime remains or the reduced set stops
    /// qualifying. `sec_level` is the minimum the key level must reach;
    /// [`SecurityLevel::None`] disables the check.
    pub fn new(
        parms: EncryptionParameters,
        expand_mod_chain: bool,
        sec_level: SecurityLevel,
    ) -> Result<Self> {
        let qualifiers = EncryptionParameterQualifiers::evaluate(&parms);
        if let Some(failure) = qualifiers.failure() {
            return Err(Error::InvalidParameters(failure));
        }
        let using_keyswitching = qualifiers.using_keyswitching;

        let mut chain = vec![ContextData::new(parms, qualifiers, 0, None)];
        if using_keyswitching && expand_mod_chain {
            loop {
                let prev = &chain[chain.len() - 1];
                if prev.parms.coeff_modulus().len() == 1 {
                    break;
                }
                let reduced = prev.parms.without_smallest_modulus();
                let reduced_qualifiers = EncryptionParameterQualifiers::evaluate(&reduced);
                if !reduced_qualifiers.parameters_set() {
                    break;
                }
                let chain_index = chain.len();
                chain.push(ContextData::new(
                    reduced,
                    reduced_qualifiers,
                    chain_index,
                    Some(chain_index - 1),
                ));
            }
        }
        if let Some(last) = chain.last_mut() {
            last.is_last = true;
        }

        // Enforce the requested security floor against the key level.
        let actual = chain[0].qualifiers.security_level;
        if sec_level != SecurityLevel::None && actual < sec_level {
            return Err(Error::SecurityLevelTooLow {
                requested: sec_level,
                actual,
            });
        }

        let index = chain
            .iter()
            .enumerate()
            .map(|(i, data)| (*data.parms_id(), i))
            .collect();
        let first_index = usize::from(using_keyswitching && chain.len() > 1);

        Ok(Self {
            chain,
            index,
            first_index,
            using_keyswitching,
            security_level: sec_level,
        })
    }

    /// Like [`Context::new`], inside an `Arc` for sharing with downstream
    /// consumers.
    pub fn new_arc(
        parms: EncryptionParameters,
        expand_mod_chain: bool,
        sec_level: SecurityLevel,
    ) -> Result<Arc<Self>> {
        Self::new(parms, expand_mod_chain, sec_level).map(Arc::new)
    }

    /// The top level, holding the parameters key material is generated under.
    #[must_use]
    pub fn key_context_data(&self) -> &ContextData {
        &self.chain[0]
    }

    /// The highest level usable for fresh encryptions: the level right below
    /// the key level when key-switching is in use, otherwise the key level.
    #[must_use]
    pub fn first_context_data(&self) -> &ContextData {
        &self.chain[self.first_index]
    }

    /// The terminal level of the chain.
    #[must_use]
    pub fn last_context_data(&self) -> &ContextData {
        &self.chain[self.chain.len() - 1]
    }

    /// Returns the level carrying the given parameters id.
    pub fn get_context_data(&self, parms_id: &ParmsId) -> Result<&ContextData> {
        self.index
            .get(parms_id)
            .map(|&i| &self.chain[i])
            .ok_or(Error::UnknownParmsId(*parms_id))
    }

    /// Returns the level one step down the chain from the given id, or `None`
    /// at the terminal level. Fails when the id is unknown.
    pub fn next_context_data(&self, parms_id: &ParmsId) -> Result<Option<&ContextData>> {
        let i = self.get_context_data(parms_id)?.chain_index;
        Ok(self.chain.get(i + 1))
    }

    /// Returns the level the given one was derived from, or `None` at the key
    /// level. Fails when the id is unknown.
    pub fn prev_context_data(&self, parms_id: &ParmsId) -> Result<Option<&ContextData>> {
        let data = self.get_context_data(parms_id)?;
        Ok(data.parent_index.map(|i| &self.chain[i]))
    }

    /// The parameters id of the key level.
    #[must_use]
    pub fn key_parms_id(&self) -> &ParmsId {
        self.key_context_data().parms_id()
    }

    /// The parameters id of the first data level.
    #[must_use]
    pub fn first_parms_id(&self) -> &ParmsId {
        self.first_context_data().parms_id()
    }

    /// The parameters id of the terminal level.
    #[must_use]
    pub fn last_parms_id(&self) -> &ParmsId {
        self.last_context_data().parms_id()
    }

    /// Whether the key level supports key-switching, i.e. carries more than
    /// one coefficient modulus prime.
    #[must_use]
    pub const fn using_keyswitching(&self) -> bool {
        self.using_keyswitching
    }

    /// The security floor enforced at construction.
    #[must_use]
    pub const fn security_level(&self) -> SecurityLevel {
        self.security_level
    }

    /// The number of levels in the chain.
    #[must_use]
    pub fn chain_length(&self) -> usize {
        self.chain.len()
    }

    /// Iterates over the levels from the key level down to the terminal one.
    pub fn iter(&self) -> impl Iterator<Item = &ContextData> {
        self.chain.iter()
    }
}
